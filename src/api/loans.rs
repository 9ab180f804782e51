//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{Loan, LoanDecision, LoanDetails},
        user::Role,
    },
};

use super::AuthenticatedUser;

/// Ledger query parameters
#[derive(Deserialize, IntoParams)]
pub struct LoansQuery {
    /// Member whose ledger to list (members may only list their own)
    pub user_id: Option<i32>,
}

/// Borrow request
#[derive(Deserialize, ToSchema)]
pub struct CreateLoanRequest {
    /// Borrowing member (defaults to the caller; admin may borrow for anyone)
    pub user_id: Option<i32>,
    /// Book ID
    pub book_id: i32,
    /// Loan duration in days (defaults from settings)
    pub duration_days: Option<i16>,
    /// Optional note
    pub note: Option<String>,
}

/// Borrow response
#[derive(Serialize, ToSchema)]
pub struct LoanResponse {
    /// Loan ID
    pub id: i32,
    /// Due date
    pub due_at: DateTime<Utc>,
    /// Loan status
    pub status: String,
    /// Status message
    pub message: String,
}

/// Loan decision request
#[derive(Deserialize, ToSchema)]
pub struct DecideLoanRequest {
    /// Decision to apply
    pub decision: LoanDecision,
}

/// Return request
#[derive(Deserialize, ToSchema)]
pub struct ReturnLoanRequest {
    /// Member returning the loan (defaults to the caller)
    pub member_id: Option<i32>,
    /// The copy was lost or damaged; fined flat and not restocked
    pub lost: Option<bool>,
    /// Optional note
    pub note: Option<String>,
}

/// Return response
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    /// Fine owed, zero when returned on time
    pub fine: i64,
    /// Closed loan
    pub loan: Loan,
}

/// Get the loan ledger for a member
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoansQuery),
    responses(
        (status = 200, description = "Member's loans", body = Vec<LoanDetails>),
        (status = 403, description = "Members may only list their own loans"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoansQuery>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    claims.require_any(&[Role::Member, Role::Staff, Role::Admin])?;

    let user_id = match claims.role {
        Role::Member => {
            let requested = query.user_id.unwrap_or(claims.user_id);
            if requested != claims.user_id {
                return Err(AppError::Authorization(
                    "Members may only list their own loans".to_string(),
                ));
            }
            requested
        }
        _ => query.user_id.ok_or_else(|| {
            AppError::Validation("user_id query parameter required".to_string())
        })?,
    };

    let loans = state.services.loans.get_user_loans(user_id).await?;
    Ok(Json(loans))
}

/// Request a loan (borrow a book)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan requested", body = LoanResponse),
        (status = 400, description = "Not approved, out of stock or already borrowed"),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<LoanResponse>)> {
    claims.require_any(&[Role::Member, Role::Admin])?;

    let user_id = request.user_id.unwrap_or(claims.user_id);
    if claims.role == Role::Member && user_id != claims.user_id {
        return Err(AppError::Authorization(
            "Members may only borrow for themselves".to_string(),
        ));
    }

    let loan = state
        .services
        .loans
        .borrow(user_id, request.book_id, request.duration_days, request.note)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(LoanResponse {
            id: loan.id,
            due_at: loan.due_at,
            status: loan.status.to_string(),
            message: "Loan requested".to_string(),
        }),
    ))
}

/// Decide a pending loan request (staff)
#[utoipa::path(
    post,
    path = "/loans/{id}/decision",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body = DecideLoanRequest,
    responses(
        (status = 200, description = "Decision applied", body = Loan),
        (status = 403, description = "Staff privileges required"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan is not pending")
    )
)]
pub async fn decide_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
    Json(request): Json<DecideLoanRequest>,
) -> AppResult<Json<Loan>> {
    claims.require_staff()?;

    let loan = state.services.loans.decide(loan_id, request.decision).await?;
    Ok(Json(loan))
}

/// Return a borrowed book
#[utoipa::path(
    put,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    request_body = ReturnLoanRequest,
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 404, description = "Loan not found, or not this member's loan"),
        (status = 409, description = "Loan is not open")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(loan_id): Path<i32>,
    Json(request): Json<ReturnLoanRequest>,
) -> AppResult<Json<ReturnResponse>> {
    claims.require_any(&[Role::Member, Role::Admin])?;

    let expected_owner = match claims.role {
        Role::Member => {
            let member_id = request.member_id.unwrap_or(claims.user_id);
            if member_id != claims.user_id {
                return Err(AppError::Authorization(
                    "Members may only return their own loans".to_string(),
                ));
            }
            Some(member_id)
        }
        // Admin returns on behalf of whichever member is given, if any
        _ => request.member_id,
    };

    let loan = state
        .services
        .loans
        .return_loan(
            loan_id,
            expected_owner,
            request.lost.unwrap_or(false),
            request.note,
        )
        .await?;

    Ok(Json(ReturnResponse {
        status: "returned".to_string(),
        fine: loan.fine,
        loan,
    }))
}
