//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{approvals, books, genres, health, loans, settings, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pustaka API",
        version = "1.0.0",
        description = "Digital Library Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Catalog
        books::list_books,
        books::get_book,
        books::create_book,
        genres::list_genres,
        // Approvals
        approvals::list_pending_books,
        approvals::decide_book,
        // Loans
        loans::list_loans,
        loans::create_loan,
        loans::decide_loan,
        loans::return_loan,
        users::get_user_loans,
        // Settings
        settings::get_fine_settings,
        settings::update_fine_settings,
    ),
    components(
        schemas(
            // Catalog
            crate::models::book::Book,
            crate::models::book::BookSummary,
            crate::models::book::CreateBook,
            crate::models::book::ApprovalStatus,
            crate::models::book::ApprovalDecision,
            crate::models::genre::Genre,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanStatus,
            crate::models::loan::LoanDecision,
            crate::models::loan::FineSettings,
            loans::CreateLoanRequest,
            loans::LoanResponse,
            loans::DecideLoanRequest,
            loans::ReturnLoanRequest,
            loans::ReturnResponse,
            // Approvals
            approvals::DecideBookRequest,
            // Users
            crate::models::user::User,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Catalog browsing and staff submission"),
        (name = "approvals", description = "Admin approval workflow"),
        (name = "loans", description = "Borrow, decision and return workflow"),
        (name = "settings", description = "Fine and duration policy")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
