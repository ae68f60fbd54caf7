//! Loans repository for database operations

use chrono::NaiveDate;
use sqlx::PgConnection;

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanQuery, LoanView},
};

/// Partial unique index allowing one active loan per isbn
const ACTIVE_ISBN_INDEX: &str = "book_loans_active_isbn_idx";

#[derive(Clone, Copy, Default)]
pub struct LoansRepository;

impl LoansRepository {
    /// Get loan by ID
    pub async fn get_by_id(&self, conn: &mut PgConnection, loan_id: i64) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            "SELECT loan_id, isbn, card_id, date_out, due_date, date_in FROM book_loans WHERE loan_id = $1",
        )
        .bind(loan_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))
    }

    /// Count a borrower's active loans
    pub async fn count_active(&self, conn: &mut PgConnection, card_id: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_loans WHERE card_id = $1 AND date_in IS NULL",
        )
        .bind(card_id)
        .fetch_one(conn)
        .await?;
        Ok(count)
    }

    /// Whether the book currently has an active loan
    pub async fn is_on_loan(&self, conn: &mut PgConnection, isbn: &str) -> AppResult<bool> {
        let on_loan: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM book_loans WHERE isbn = $1 AND date_in IS NULL)",
        )
        .bind(isbn)
        .fetch_one(conn)
        .await?;
        Ok(on_loan)
    }

    /// Insert a new active loan.
    ///
    /// A concurrent checkout of the same book that committed first trips the
    /// active-isbn index; that is reported as `BookUnavailable`. An isbn with no
    /// catalog entry trips the foreign key and is reported as `NotFound`.
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        isbn: &str,
        card_id: &str,
        date_out: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<Loan> {
        let result = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO book_loans (isbn, card_id, date_out, due_date, date_in)
            VALUES ($1, $2, $3, $4, NULL)
            RETURNING loan_id, isbn, card_id, date_out, due_date, date_in
            "#,
        )
        .bind(isbn)
        .bind(card_id)
        .bind(date_out)
        .bind(due_date)
        .fetch_one(conn)
        .await;

        match result {
            Ok(loan) => Ok(loan),
            Err(sqlx::Error::Database(db_err)) => {
                if db_err.is_unique_violation() && db_err.constraint() == Some(ACTIVE_ISBN_INDEX) {
                    Err(AppError::BookUnavailable(isbn.to_string()))
                } else if db_err.is_foreign_key_violation() {
                    Err(AppError::NotFound(format!("Book {} not found", isbn)))
                } else {
                    Err(AppError::Database(sqlx::Error::Database(db_err)))
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Set `date_in` on an active loan. Returns rows changed: 1 when the loan
    /// was active, 0 when it was already returned or does not exist.
    pub async fn mark_returned(
        &self,
        conn: &mut PgConnection,
        loan_id: i64,
        date_in: NaiveDate,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE book_loans SET date_in = $1 WHERE loan_id = $2 AND date_in IS NULL",
        )
        .bind(date_in)
        .bind(loan_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Search active loans, ordered by loan id
    pub async fn search_active(
        &self,
        conn: &mut PgConnection,
        query: &LoanQuery,
    ) -> AppResult<Vec<LoanView>> {
        let loans = sqlx::query_as::<_, LoanView>(
            r#"
            SELECT l.loan_id, l.isbn, l.card_id, b.name AS borrower_name,
                   l.date_out, l.due_date
            FROM book_loans l
            JOIN borrowers b ON b.card_id = l.card_id
            WHERE l.date_in IS NULL
              AND ($1::text IS NULL OR l.isbn = $1)
              AND ($2::text IS NULL OR l.card_id = $2)
              AND ($3::text IS NULL OR POSITION(LOWER($3) IN LOWER(b.name)) > 0)
            ORDER BY l.loan_id
            "#,
        )
        .bind(&query.isbn)
        .bind(&query.card_id)
        .bind(&query.name)
        .fetch_all(conn)
        .await?;

        Ok(loans)
    }
}
