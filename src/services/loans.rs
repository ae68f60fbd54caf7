//! Loan management service

use std::sync::Arc;

use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;

use crate::{
    error::AppResult,
    models::loan::{
        due_date_for, validate_checkin_batch, CheckinOutcome, CheckoutEligibility, CheckoutReceipt,
        Loan, LoanQuery, LoanView,
    },
    repository::Repository,
    services::fines::FineEngine,
};

#[derive(Clone)]
pub struct LoanService {
    repository: Repository,
    fines: FineEngine,
    time: Arc<SafeTimeProvider>,
}

impl LoanService {
    pub fn new(repository: Repository, fines: FineEngine, time: Arc<SafeTimeProvider>) -> Self {
        Self {
            repository,
            fines,
            time,
        }
    }

    fn today(&self) -> NaiveDate {
        self.time.now().date_naive()
    }

    /// Check a book out to a borrower.
    ///
    /// Eligibility is read and the loan written in one transaction holding
    /// the borrower's row lock, so checkouts and payments for the same card
    /// run one after another and each sees what the previous one committed.
    /// Two cards racing for one book are settled by the active-isbn index.
    pub async fn checkout(&self, isbn: &str, card_id: &str) -> AppResult<CheckoutReceipt> {
        let today = self.today();
        let mut tx = self.repository.begin().await?;

        let eligibility = if self.repository.borrowers.lock(&mut tx, card_id).await? {
            CheckoutEligibility {
                borrower_exists: true,
                unpaid_balance: self.fines.unpaid_balance(&mut tx, card_id).await?,
                active_loans: self.repository.loans.count_active(&mut tx, card_id).await?,
                book_on_loan: self.repository.loans.is_on_loan(&mut tx, isbn).await?,
            }
        } else {
            CheckoutEligibility {
                borrower_exists: false,
                unpaid_balance: Decimal::ZERO,
                active_loans: 0,
                book_on_loan: false,
            }
        };

        if let Err(e) = eligibility.evaluate(card_id, isbn) {
            tracing::warn!(card_id, isbn, reason = %e, "Checkout refused");
            return Err(e);
        }

        let loan = self
            .repository
            .loans
            .insert(&mut tx, isbn, card_id, today, due_date_for(today))
            .await?;
        tx.commit().await?;

        tracing::info!(loan_id = loan.loan_id, card_id, isbn, due_date = %loan.due_date, "Book checked out");

        Ok(CheckoutReceipt::from(loan))
    }

    /// Return up to three loans.
    ///
    /// Each loan is updated in its own statement, guarded on still being
    /// active, so unknown or already returned ids are skipped.
    pub async fn checkin(&self, loan_ids: &[i64]) -> AppResult<CheckinOutcome> {
        validate_checkin_batch(loan_ids)?;

        let today = self.today();
        let mut conn = self.repository.pool.acquire().await?;

        let mut checked_in = 0;
        for &loan_id in loan_ids {
            let changed = self.repository.loans.mark_returned(&mut conn, loan_id, today).await?;
            if changed == 0 {
                tracing::debug!(loan_id, "Loan not active, skipped");
            }
            checked_in += changed;
        }

        tracing::info!(requested = loan_ids.len(), checked_in, "Books checked in");

        Ok(CheckinOutcome::new(checked_in))
    }

    /// Active loans matching all given filters, ordered by loan id
    pub async fn search_loans(&self, query: LoanQuery) -> AppResult<Vec<LoanView>> {
        let query = query.normalized();
        let mut conn = self.repository.pool.acquire().await?;
        self.repository.loans.search_active(&mut conn, &query).await
    }

    /// Get loan by ID
    pub async fn get_loan(&self, loan_id: i64) -> AppResult<Loan> {
        let mut conn = self.repository.pool.acquire().await?;
        self.repository.loans.get_by_id(&mut conn, loan_id).await
    }
}
