//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{fines, health, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulation API",
        version = "1.0.0",
        description = "Library circulation: checkout, checkin and fines",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Loans
        loans::checkout,
        loans::search_loans,
        loans::get_loan,
        loans::checkin,
        // Fines
        fines::refresh_fines,
        fines::list_borrower_fines,
        fines::pay_fines,
        fines::get_loan_fine,
    ),
    components(
        schemas(
            // Loans
            loans::CheckoutRequest,
            loans::CheckinRequest,
            crate::models::loan::Loan,
            crate::models::loan::LoanView,
            crate::models::loan::LoanQuery,
            crate::models::loan::CheckoutReceipt,
            crate::models::loan::CheckinOutcome,
            // Fines
            crate::models::fine::Fine,
            crate::models::fine::FinesQuery,
            crate::models::fine::BorrowerFines,
            crate::models::fine::RefreshSummary,
            crate::models::fine::PaymentOutcome,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorKind,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "loans", description = "Checkout, checkin and active loans"),
        (name = "fines", description = "Fine accrual and payment")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
