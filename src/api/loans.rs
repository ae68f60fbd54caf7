//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::loan::{CheckinOutcome, CheckoutReceipt, Loan, LoanQuery, LoanView},
    AppState,
};

/// Checkout request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    /// Book ISBN
    #[validate(length(min = 1, message = "isbn is required"))]
    pub isbn: String,
    /// Borrower card id
    #[validate(length(min = 1, message = "card_id is required"))]
    pub card_id: String,
}

/// Checkin request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckinRequest {
    /// One to three loan ids
    #[validate(length(min = 1, max = 3, message = "between 1 and 3 loan ids required"))]
    pub loan_ids: Vec<i64>,
}

/// Check a book out
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Book checked out", body = CheckoutReceipt),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Borrower or book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book already checked out", body = crate::error::ErrorResponse),
        (status = 422, description = "Unpaid fines or loan limit reached", body = crate::error::ErrorResponse)
    )
)]
pub async fn checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<CheckoutReceipt>)> {
    request.validate()?;

    let receipt = state
        .services
        .loans
        .checkout(&request.isbn, &request.card_id)
        .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Search active loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(LoanQuery),
    responses(
        (status = 200, description = "Active loans", body = Vec<LoanView>)
    )
)]
pub async fn search_loans(
    State(state): State<AppState>,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<Vec<LoanView>>> {
    let loans = state.services.loans.search_loans(query).await?;
    Ok(Json(loans))
}

/// Get a loan by id
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan", body = Loan),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    Path(loan_id): Path<i64>,
) -> AppResult<Json<Loan>> {
    let loan = state.services.loans.get_loan(loan_id).await?;
    Ok(Json(loan))
}

/// Return up to three books
#[utoipa::path(
    post,
    path = "/loans/checkin",
    tag = "loans",
    request_body = CheckinRequest,
    responses(
        (status = 200, description = "Loans returned", body = CheckinOutcome),
        (status = 400, description = "Empty or oversized batch", body = crate::error::ErrorResponse)
    )
)]
pub async fn checkin(
    State(state): State<AppState>,
    Json(request): Json<CheckinRequest>,
) -> AppResult<Json<CheckinOutcome>> {
    request.validate()?;

    let outcome = state.services.loans.checkin(&request.loan_ids).await?;
    Ok(Json(outcome))
}
