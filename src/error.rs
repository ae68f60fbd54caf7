//! Error types for the circulation server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Stable numeric codes returned in error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    DbFailure = 3,
    NoSuchBorrower = 4,
    BookNotAvailable = 7,
    MaxLoansReached = 11,
    BadValue = 18,
    NoSuchData = 20,
    UnpaidFines = 22,
    OutstandingLoan = 23,
}

/// Coarse classification of failures, for callers that branch on the kind of
/// failure rather than on the specific rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    BusinessRule,
    Storage,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Borrower {0} not found")]
    BorrowerNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Borrower {card_id} has unpaid fines ({amount})")]
    UnpaidFines { card_id: String, amount: Decimal },

    #[error("Borrower {card_id} already has {active} active loans")]
    LoanLimitReached { card_id: String, active: i64 },

    #[error("Book {0} is already checked out")]
    BookUnavailable(String),

    #[error("Borrower {0} still has books out with unpaid fines")]
    OutstandingLoan(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidRequest(_) => ErrorKind::Validation,
            AppError::BorrowerNotFound(_) | AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::UnpaidFines { .. }
            | AppError::LoanLimitReached { .. }
            | AppError::BookUnavailable(_)
            | AppError::OutstandingLoan(_) => ErrorKind::BusinessRule,
            AppError::Database(_) | AppError::Migration(_) => ErrorKind::Storage,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidRequest(_) => ErrorCode::BadValue,
            AppError::BorrowerNotFound(_) => ErrorCode::NoSuchBorrower,
            AppError::NotFound(_) => ErrorCode::NoSuchData,
            AppError::UnpaidFines { .. } => ErrorCode::UnpaidFines,
            AppError::LoanLimitReached { .. } => ErrorCode::MaxLoansReached,
            AppError::BookUnavailable(_) => ErrorCode::BookNotAvailable,
            AppError::OutstandingLoan(_) => ErrorCode::OutstandingLoan,
            AppError::Database(_) | AppError::Migration(_) => ErrorCode::DbFailure,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::BorrowerNotFound(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BookUnavailable(_) => StatusCode::CONFLICT,
            AppError::UnpaidFines { .. }
            | AppError::LoanLimitReached { .. }
            | AppError::OutstandingLoan(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) | AppError::Migration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidRequest(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub kind: ErrorKind,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Migration(e) => {
                tracing::error!("Migration error: {:?}", e);
                "Database error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            kind: self.kind(),
            error: format!("{:?}", code),
            message,
        });

        (self.status(), body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
