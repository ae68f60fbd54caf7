//! Fine model and accrual rules

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// $0.25 per late day
pub const DAILY_FINE_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

/// Fine row from database, one per late loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Fine {
    pub loan_id: i64,
    pub amount: Decimal,
    /// Once true the amount is frozen
    pub paid: bool,
}

/// Fine owed for `days_late`, rounded to cents. `None` when not late.
pub fn fine_for(days_late: i64) -> Option<Decimal> {
    if days_late <= 0 {
        return None;
    }
    Some((Decimal::from(days_late) * DAILY_FINE_RATE).round_dp(2))
}

/// What a refresh pass must do for one loan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FineAction {
    /// Loan is not late; any existing fine is left alone
    NotLate,
    Insert(Decimal),
    Update(Decimal),
    Unchanged,
    /// Paid fines are never recomputed
    Frozen,
}

pub fn reconcile(existing: Option<&Fine>, days_late: i64) -> FineAction {
    let Some(amount) = fine_for(days_late) else {
        return FineAction::NotLate;
    };

    match existing {
        None => FineAction::Insert(amount),
        Some(fine) if fine.paid => FineAction::Frozen,
        Some(fine) if fine.amount == amount => FineAction::Unchanged,
        Some(_) => FineAction::Update(amount),
    }
}

/// Loan dates with the loan's fine, if any, as read by a refresh pass
#[derive(Debug, Clone, FromRow)]
pub struct AccrualRow {
    pub loan_id: i64,
    pub due_date: NaiveDate,
    pub date_in: Option<NaiveDate>,
    pub fine_amount: Option<Decimal>,
    pub fine_paid: Option<bool>,
}

impl AccrualRow {
    pub fn fine(&self) -> Option<Fine> {
        Some(Fine {
            loan_id: self.loan_id,
            amount: self.fine_amount?,
            paid: self.fine_paid?,
        })
    }
}

/// Fine total per borrower
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowerFines {
    pub card_id: String,
    pub name: String,
    pub total: Decimal,
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct FinesQuery {
    /// Include paid fines in the totals
    pub show_paid: Option<bool>,
}

/// Counts from one refresh pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RefreshSummary {
    pub examined: u64,
    pub inserted: u64,
    pub updated: u64,
}

/// Result of settling a borrower's fines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaymentOutcome {
    pub card_id: String,
    pub paid_rows: u64,
}
