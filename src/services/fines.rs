//! Fine accrual and settlement

use std::sync::Arc;

use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::{
    error::{AppError, AppResult},
    models::{
        fine::{reconcile, BorrowerFines, Fine, FineAction, PaymentOutcome, RefreshSummary},
        loan::days_late,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct FineEngine {
    repository: Repository,
    time: Arc<SafeTimeProvider>,
}

impl FineEngine {
    pub fn new(repository: Repository, time: Arc<SafeTimeProvider>) -> Self {
        Self { repository, time }
    }

    /// Unpaid fine total for a borrower, read on the caller's connection so
    /// checkout can evaluate it inside its own transaction.
    pub async fn unpaid_balance(&self, conn: &mut PgConnection, card_id: &str) -> AppResult<Decimal> {
        self.repository.fines.unpaid_balance(conn, card_id).await
    }

    /// Recompute fines for every loan.
    ///
    /// Late loans get a fine inserted on first detection and revised while
    /// unpaid. Paid fines and loans that are not late are left untouched.
    pub async fn refresh_fines(&self) -> AppResult<RefreshSummary> {
        let today = self.time.now().date_naive();
        let mut tx = self.repository.begin().await?;

        let rows = self.repository.fines.accrual_rows(&mut tx).await?;
        let mut summary = RefreshSummary {
            examined: rows.len() as u64,
            ..RefreshSummary::default()
        };

        for row in &rows {
            let late = days_late(row.due_date, row.date_in, today);
            match reconcile(row.fine().as_ref(), late) {
                FineAction::Insert(amount) => {
                    summary.inserted += self.repository.fines.insert(&mut tx, row.loan_id, amount).await?;
                }
                FineAction::Update(amount) => {
                    summary.updated += self
                        .repository
                        .fines
                        .update_unpaid_amount(&mut tx, row.loan_id, amount)
                        .await?;
                }
                FineAction::NotLate | FineAction::Unchanged | FineAction::Frozen => {}
            }
        }

        tx.commit().await?;

        tracing::info!(
            examined = summary.examined,
            inserted = summary.inserted,
            updated = summary.updated,
            "Fines refreshed"
        );

        Ok(summary)
    }

    /// Fine totals per borrower
    pub async fn get_borrower_fines(&self, show_paid: bool) -> AppResult<Vec<BorrowerFines>> {
        let mut conn = self.repository.pool.acquire().await?;
        self.repository.fines.borrower_totals(&mut conn, show_paid).await
    }

    /// Fine attached to a loan, if any
    pub async fn get_loan_fine(&self, loan_id: i64) -> AppResult<Option<Fine>> {
        let mut conn = self.repository.pool.acquire().await?;
        self.repository.fines.get_by_loan(&mut conn, loan_id).await
    }

    /// Pay all of a borrower's unpaid fines at once.
    ///
    /// Rejected with `OutstandingLoan` while any unpaid fine belongs to a book
    /// that is still out; nothing is paid in that case. A card with nothing
    /// to pay, known or not, settles zero rows.
    pub async fn pay_fines(&self, card_id: &str) -> AppResult<PaymentOutcome> {
        let mut tx = self.repository.begin().await?;

        if !self.repository.borrowers.lock(&mut tx, card_id).await? {
            tracing::debug!(card_id, "No borrower for card, nothing to pay");
            return Ok(PaymentOutcome {
                card_id: card_id.to_string(),
                paid_rows: 0,
            });
        }

        let outstanding = self
            .repository
            .fines
            .count_unpaid_on_active_loans(&mut tx, card_id)
            .await?;
        if outstanding > 0 {
            tracing::warn!(card_id, outstanding, "Fine payment rejected: books still out");
            return Err(AppError::OutstandingLoan(card_id.to_string()));
        }

        let paid_rows = self.repository.fines.settle(&mut tx, card_id).await?;
        tx.commit().await?;

        tracing::info!(card_id, paid_rows, "Fines paid");

        Ok(PaymentOutcome {
            card_id: card_id.to_string(),
            paid_rows,
        })
    }
}
