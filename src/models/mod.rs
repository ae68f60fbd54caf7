//! Data models for circulation

pub mod fine;
pub mod loan;

// Re-export commonly used types
pub use fine::{BorrowerFines, Fine, PaymentOutcome, RefreshSummary};
pub use loan::{CheckinOutcome, CheckoutReceipt, Loan, LoanQuery, LoanView};
