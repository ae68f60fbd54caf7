//! Fine endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::fine::{BorrowerFines, Fine, FinesQuery, PaymentOutcome, RefreshSummary},
    AppState,
};

/// Recompute fines for all late loans
#[utoipa::path(
    post,
    path = "/fines/refresh",
    tag = "fines",
    responses(
        (status = 200, description = "Fines refreshed", body = RefreshSummary)
    )
)]
pub async fn refresh_fines(State(state): State<AppState>) -> AppResult<Json<RefreshSummary>> {
    let summary = state.services.fines.refresh_fines().await?;
    Ok(Json(summary))
}

/// Fine totals per borrower
#[utoipa::path(
    get,
    path = "/fines",
    tag = "fines",
    params(FinesQuery),
    responses(
        (status = 200, description = "Borrowers with a positive fine total", body = Vec<BorrowerFines>)
    )
)]
pub async fn list_borrower_fines(
    State(state): State<AppState>,
    Query(query): Query<FinesQuery>,
) -> AppResult<Json<Vec<BorrowerFines>>> {
    let fines = state
        .services
        .fines
        .get_borrower_fines(query.show_paid.unwrap_or(false))
        .await?;
    Ok(Json(fines))
}

/// Pay all unpaid fines of a borrower
#[utoipa::path(
    post,
    path = "/borrowers/{card_id}/fines/pay",
    tag = "fines",
    params(
        ("card_id" = String, Path, description = "Borrower card id")
    ),
    responses(
        (status = 200, description = "Fines paid; zero rows when there was nothing to pay", body = PaymentOutcome),
        (status = 422, description = "Borrower still has books out with unpaid fines", body = crate::error::ErrorResponse)
    )
)]
pub async fn pay_fines(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> AppResult<Json<PaymentOutcome>> {
    let outcome = state.services.fines.pay_fines(&card_id).await?;
    Ok(Json(outcome))
}

/// Fine attached to a loan
#[utoipa::path(
    get,
    path = "/loans/{id}/fine",
    tag = "fines",
    params(
        ("id" = i64, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Fine for the loan", body = Fine),
        (status = 404, description = "Loan has no fine", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan_fine(
    State(state): State<AppState>,
    Path(loan_id): Path<i64>,
) -> AppResult<Json<Fine>> {
    let fine = state
        .services
        .fines
        .get_loan_fine(loan_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No fine for loan {}", loan_id)))?;
    Ok(Json(fine))
}
