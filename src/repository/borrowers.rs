//! Borrowers repository (read-only)

use sqlx::PgConnection;

use crate::error::AppResult;

#[derive(Clone, Copy, Default)]
pub struct BorrowersRepository;

impl BorrowersRepository {
    /// Whether the card exists. When it does, its row stays locked until the
    /// transaction ends, so checkouts and payments for the same card queue.
    pub async fn lock(&self, conn: &mut PgConnection, card_id: &str) -> AppResult<bool> {
        let found: Option<String> =
            sqlx::query_scalar("SELECT card_id FROM borrowers WHERE card_id = $1 FOR UPDATE")
                .bind(card_id)
                .fetch_optional(conn)
                .await?;

        Ok(found.is_some())
    }
}
