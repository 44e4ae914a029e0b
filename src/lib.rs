pub mod config;
pub mod errors;
pub mod events;
pub mod loan;
pub mod money;
pub mod payments;
pub mod serialization;
pub mod state;
pub mod types;

// re-export key types
pub use config::LoanConfig;
pub use errors::{LoanError, Result};
pub use events::{Event, EventStore};
pub use loan::{Loan, LoanBuilder, RepaymentOutcome};
pub use money::{CurrencyCode, Money};
pub use payments::{
    allocate, plan, Allocation, AmortizationPlanner, AmortizationSchedule, InstallmentApplication,
    PlannedInstallment, RepaymentAllocator, RepaymentRequest,
};
pub use state::{ReceivedRepayment, ScheduledInstallment};
pub use types::{
    InstallmentId, InstallmentStatus, LoanId, LoanStatus, RemainderPlacement, RepaymentId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
