//! Repository layer for database operations
//!
//! Repositories hold no connection of their own: every query runs on the
//! connection or transaction handed in by the caller, so the caller decides
//! what is atomic.

pub mod borrowers;
pub mod fines;
pub mod loans;

use sqlx::{Pool, Postgres, Transaction};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub borrowers: borrowers::BorrowersRepository,
    pub loans: loans::LoansRepository,
    pub fines: fines::FinesRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            borrowers: borrowers::BorrowersRepository,
            loans: loans::LoansRepository,
            fines: fines::FinesRepository,
            pool,
        }
    }

    /// Begin a read committed transaction. Dropping it without commit rolls back.
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }

    /// Round-trip to the database
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
