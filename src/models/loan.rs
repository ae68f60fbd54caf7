//! Loan model and circulation rules

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

/// Days between checkout and due date
pub const LOAN_PERIOD_DAYS: i64 = 14;
/// Maximum simultaneous active loans per borrower
pub const MAX_ACTIVE_LOANS: i64 = 3;
/// Maximum loan ids accepted by a single checkin
pub const MAX_CHECKIN_BATCH: usize = 3;

/// Loan row from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub loan_id: i64,
    pub isbn: String,
    pub card_id: String,
    pub date_out: NaiveDate,
    pub due_date: NaiveDate,
    /// Set once by checkin; `None` while the book is out
    pub date_in: Option<NaiveDate>,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.date_in.is_none()
    }

    pub fn days_late(&self, today: NaiveDate) -> i64 {
        days_late(self.due_date, self.date_in, today)
    }
}

pub fn due_date_for(date_out: NaiveDate) -> NaiveDate {
    date_out + Duration::days(LOAN_PERIOD_DAYS)
}

/// Days past due, measured at return for returned loans and at `today`
/// otherwise. Zero or negative means not late.
pub fn days_late(due_date: NaiveDate, date_in: Option<NaiveDate>, today: NaiveDate) -> i64 {
    (date_in.unwrap_or(today) - due_date).num_days()
}

/// Active loan joined with its borrower
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanView {
    pub loan_id: i64,
    pub isbn: String,
    pub card_id: String,
    pub borrower_name: String,
    pub date_out: NaiveDate,
    pub due_date: NaiveDate,
}

/// Active loan search filters, all optional and combined with AND
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    /// Exact ISBN
    pub isbn: Option<String>,
    /// Exact borrower card id
    pub card_id: Option<String>,
    /// Case-insensitive substring of the borrower name
    pub name: Option<String>,
}

impl LoanQuery {
    /// Drop blank filters. The rest are matched exactly as given.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Self {
            isbn: clean(self.isbn),
            card_id: clean(self.card_id),
            name: clean(self.name),
        }
    }
}

/// Confirmation returned by a successful checkout
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutReceipt {
    pub loan_id: i64,
    pub isbn: String,
    pub card_id: String,
    pub date_out: NaiveDate,
    pub due_date: NaiveDate,
    pub message: String,
}

impl From<Loan> for CheckoutReceipt {
    fn from(loan: Loan) -> Self {
        Self {
            loan_id: loan.loan_id,
            isbn: loan.isbn,
            card_id: loan.card_id,
            date_out: loan.date_out,
            due_date: loan.due_date,
            message: "Book has been checked out".to_string(),
        }
    }
}

/// Result of a checkin batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckinOutcome {
    /// Loans actually moved from active to returned
    pub checked_in: u64,
    pub message: String,
}

impl CheckinOutcome {
    pub fn new(checked_in: u64) -> Self {
        Self {
            checked_in,
            message: format!("Checked in {} book(s)", checked_in),
        }
    }
}

/// State read inside the checkout transaction, evaluated in rule order
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutEligibility {
    pub borrower_exists: bool,
    pub unpaid_balance: Decimal,
    pub active_loans: i64,
    pub book_on_loan: bool,
}

impl CheckoutEligibility {
    /// First violated rule wins: unknown borrower, unpaid fines, loan limit,
    /// then book availability.
    pub fn evaluate(&self, card_id: &str, isbn: &str) -> AppResult<()> {
        if !self.borrower_exists {
            return Err(AppError::BorrowerNotFound(card_id.to_string()));
        }
        if self.unpaid_balance > Decimal::ZERO {
            return Err(AppError::UnpaidFines {
                card_id: card_id.to_string(),
                amount: self.unpaid_balance,
            });
        }
        if self.active_loans >= MAX_ACTIVE_LOANS {
            return Err(AppError::LoanLimitReached {
                card_id: card_id.to_string(),
                active: self.active_loans,
            });
        }
        if self.book_on_loan {
            return Err(AppError::BookUnavailable(isbn.to_string()));
        }
        Ok(())
    }
}

/// Reject empty or oversized checkin batches before touching the store
pub fn validate_checkin_batch(loan_ids: &[i64]) -> AppResult<()> {
    if loan_ids.is_empty() {
        return Err(AppError::InvalidRequest(
            "loan_ids must contain at least one loan id".to_string(),
        ));
    }
    if loan_ids.len() > MAX_CHECKIN_BATCH {
        return Err(AppError::InvalidRequest(format!(
            "A maximum of {} check-ins allowed per request",
            MAX_CHECKIN_BATCH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn eligible() -> CheckoutEligibility {
        CheckoutEligibility {
            borrower_exists: true,
            unpaid_balance: Decimal::ZERO,
            active_loans: 0,
            book_on_loan: false,
        }
    }

    #[test]
    fn due_date_is_two_weeks_out() {
        assert_eq!(due_date_for(date(2024, 2, 20)), date(2024, 3, 5));
    }

    #[test]
    fn days_late_uses_return_date_when_present() {
        let due = date(2024, 1, 15);
        assert_eq!(days_late(due, Some(date(2024, 1, 18)), date(2024, 2, 1)), 3);
        assert_eq!(days_late(due, None, date(2024, 2, 1)), 17);
        assert_eq!(days_late(due, None, date(2024, 1, 10)), -5);
        assert_eq!(days_late(due, Some(due), date(2024, 2, 1)), 0);
    }

    #[test]
    fn loan_activity_follows_date_in() {
        let mut loan = Loan {
            loan_id: 1,
            isbn: "111".into(),
            card_id: "ID000001".into(),
            date_out: date(2024, 1, 1),
            due_date: date(2024, 1, 15),
            date_in: None,
        };
        assert!(loan.is_active());
        assert_eq!(loan.days_late(date(2024, 1, 21)), 6);

        loan.date_in = Some(date(2024, 1, 16));
        assert!(!loan.is_active());
        assert_eq!(loan.days_late(date(2024, 3, 1)), 1);
    }

    #[test]
    fn eligible_borrower_passes() {
        assert!(eligible().evaluate("ID000001", "111").is_ok());
        let two_loans = CheckoutEligibility { active_loans: 2, ..eligible() };
        assert!(two_loans.evaluate("ID000001", "111").is_ok());
    }

    #[test]
    fn missing_borrower_wins_over_everything() {
        let state = CheckoutEligibility {
            borrower_exists: false,
            unpaid_balance: dec!(3.00),
            active_loans: 3,
            book_on_loan: true,
        };
        let err = state.evaluate("ID999999", "111").unwrap_err();
        assert!(matches!(err, AppError::BorrowerNotFound(ref id) if id == "ID999999"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn unpaid_fines_win_over_loan_limit_and_availability() {
        let state = CheckoutEligibility {
            unpaid_balance: dec!(0.25),
            active_loans: 3,
            book_on_loan: true,
            ..eligible()
        };
        let err = state.evaluate("ID000001", "111").unwrap_err();
        assert!(matches!(err, AppError::UnpaidFines { amount, .. } if amount == dec!(0.25)));
    }

    #[test]
    fn loan_limit_wins_over_availability() {
        let state = CheckoutEligibility {
            active_loans: 3,
            book_on_loan: true,
            ..eligible()
        };
        let err = state.evaluate("ID000001", "111").unwrap_err();
        assert!(matches!(err, AppError::LoanLimitReached { active: 3, .. }));
    }

    #[test]
    fn book_on_loan_is_unavailable() {
        let state = CheckoutEligibility { book_on_loan: true, ..eligible() };
        let err = state.evaluate("ID000001", "0451524934").unwrap_err();
        assert!(matches!(err, AppError::BookUnavailable(ref isbn) if isbn == "0451524934"));
        assert_eq!(err.kind(), ErrorKind::BusinessRule);
    }

    #[test]
    fn checkin_batch_bounds() {
        assert!(validate_checkin_batch(&[1]).is_ok());
        assert!(validate_checkin_batch(&[1, 2, 3]).is_ok());

        let empty = validate_checkin_batch(&[]).unwrap_err();
        assert_eq!(empty.kind(), ErrorKind::Validation);

        let oversized = validate_checkin_batch(&[1, 2, 3, 4]).unwrap_err();
        assert!(matches!(oversized, AppError::InvalidRequest(_)));
    }

    #[test]
    fn blank_filters_are_dropped() {
        let query = LoanQuery {
            isbn: Some("  ".into()),
            card_id: Some("".into()),
            name: None,
        }
        .normalized();

        assert_eq!(query.isbn, None);
        assert_eq!(query.card_id, None);
        assert_eq!(query.name, None);
    }

    #[test]
    fn filters_are_kept_verbatim() {
        let query = LoanQuery {
            isbn: Some("111".into()),
            card_id: Some(" ID000001 ".into()),
            name: Some("ada ".into()),
        }
        .normalized();

        assert_eq!(query.isbn.as_deref(), Some("111"));
        assert_eq!(query.card_id.as_deref(), Some(" ID000001 "));
        assert_eq!(query.name.as_deref(), Some("ada "));
    }

    #[test]
    fn checkin_outcome_message() {
        assert_eq!(CheckinOutcome::new(2).message, "Checked in 2 book(s)");
    }
}
