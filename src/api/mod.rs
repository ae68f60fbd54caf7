//! API handlers for circulation REST endpoints

pub mod fines;
pub mod health;
pub mod loans;
pub mod openapi;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Loans
        .route("/loans", get(loans::search_loans).post(loans::checkout))
        .route("/loans/checkin", post(loans::checkin))
        .route("/loans/:id", get(loans::get_loan))
        .route("/loans/:id/fine", get(fines::get_loan_fine))
        // Fines
        .route("/fines", get(fines::list_borrower_fines))
        .route("/fines/refresh", post(fines::refresh_fines))
        .route("/borrowers/:card_id/fines/pay", post(fines::pay_fines))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
