//! Fines repository for database operations

use rust_decimal::Decimal;
use sqlx::PgConnection;

use crate::{
    error::AppResult,
    models::fine::{AccrualRow, BorrowerFines, Fine},
};

#[derive(Clone, Copy, Default)]
pub struct FinesRepository;

impl FinesRepository {
    /// Get the fine attached to a loan, if any
    pub async fn get_by_loan(&self, conn: &mut PgConnection, loan_id: i64) -> AppResult<Option<Fine>> {
        let fine = sqlx::query_as::<_, Fine>(
            "SELECT loan_id, amount, paid FROM fines WHERE loan_id = $1",
        )
        .bind(loan_id)
        .fetch_optional(conn)
        .await?;
        Ok(fine)
    }

    /// Sum of a borrower's unpaid fines, zero when there are none
    pub async fn unpaid_balance(&self, conn: &mut PgConnection, card_id: &str) -> AppResult<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(f.amount), 0)
            FROM fines f
            JOIN book_loans l ON f.loan_id = l.loan_id
            WHERE l.card_id = $1 AND f.paid = FALSE
            "#,
        )
        .bind(card_id)
        .fetch_one(conn)
        .await?;
        Ok(total)
    }

    /// Every loan with its fine, if any, ordered by loan id
    pub async fn accrual_rows(&self, conn: &mut PgConnection) -> AppResult<Vec<AccrualRow>> {
        let rows = sqlx::query_as::<_, AccrualRow>(
            r#"
            SELECT l.loan_id, l.due_date, l.date_in,
                   f.amount AS fine_amount, f.paid AS fine_paid
            FROM book_loans l
            LEFT JOIN fines f ON f.loan_id = l.loan_id
            ORDER BY l.loan_id
            "#,
        )
        .fetch_all(conn)
        .await?;
        Ok(rows)
    }

    /// Create an unpaid fine. Returns 0 if a fine already exists for the loan.
    pub async fn insert(&self, conn: &mut PgConnection, loan_id: i64, amount: Decimal) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO fines (loan_id, amount, paid)
            VALUES ($1, $2, FALSE)
            ON CONFLICT (loan_id) DO NOTHING
            "#,
        )
        .bind(loan_id)
        .bind(amount)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Revise the amount of an unpaid fine. Paid fines never match.
    pub async fn update_unpaid_amount(
        &self,
        conn: &mut PgConnection,
        loan_id: i64,
        amount: Decimal,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE fines SET amount = $1 WHERE loan_id = $2 AND paid = FALSE AND amount <> $1",
        )
        .bind(amount)
        .bind(loan_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Fine totals per borrower, restricted to unpaid rows unless `show_paid`.
    /// Borrowers whose total is zero are omitted.
    pub async fn borrower_totals(
        &self,
        conn: &mut PgConnection,
        show_paid: bool,
    ) -> AppResult<Vec<BorrowerFines>> {
        let totals = sqlx::query_as::<_, BorrowerFines>(
            r#"
            SELECT l.card_id, b.name, SUM(f.amount) AS total
            FROM fines f
            JOIN book_loans l ON f.loan_id = l.loan_id
            JOIN borrowers b ON b.card_id = l.card_id
            WHERE ($1 OR f.paid = FALSE)
            GROUP BY l.card_id, b.name
            HAVING SUM(f.amount) > 0
            ORDER BY l.card_id
            "#,
        )
        .bind(show_paid)
        .fetch_all(conn)
        .await?;
        Ok(totals)
    }

    /// Unpaid fines whose loan is still out
    pub async fn count_unpaid_on_active_loans(
        &self,
        conn: &mut PgConnection,
        card_id: &str,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM book_loans l
            JOIN fines f ON f.loan_id = l.loan_id
            WHERE l.card_id = $1
              AND l.date_in IS NULL
              AND f.paid = FALSE
            "#,
        )
        .bind(card_id)
        .fetch_one(conn)
        .await?;
        Ok(count)
    }

    /// Mark the borrower's unpaid fines on returned loans as paid
    pub async fn settle(&self, conn: &mut PgConnection, card_id: &str) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE fines
            SET paid = TRUE
            WHERE paid = FALSE
              AND loan_id IN (
                  SELECT loan_id FROM book_loans WHERE card_id = $1 AND date_in IS NOT NULL
              )
            "#,
        )
        .bind(card_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
