//! Loan management service

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::loan::{CreateLoan, FineSettings, Loan, LoanDecision, LoanDetails},
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    defaults: LoansConfig,
}

impl LoansService {
    pub fn new(repository: Repository, defaults: LoansConfig) -> Self {
        Self {
            repository,
            defaults,
        }
    }

    /// The live fine/duration policy, falling back to configuration when
    /// the settings row is missing.
    async fn policy(&self) -> AppResult<FineSettings> {
        Ok(self
            .repository
            .settings
            .get_fine_settings()
            .await?
            .unwrap_or_else(|| FineSettings::from(&self.defaults)))
    }

    /// Ledger for a member. Open loans past due are swept to overdue
    /// first, so listings never show a stale `dipinjam`.
    pub async fn get_user_loans(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.mark_overdue().await?;
        self.repository.loans.list_for_user(user_id).await
    }

    /// Request a loan (borrow a book)
    pub async fn borrow(
        &self,
        user_id: i32,
        book_id: i32,
        duration_days: Option<i16>,
        note: Option<String>,
    ) -> AppResult<Loan> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;

        let policy = self.policy().await?;
        let duration_days = duration_days.unwrap_or(policy.default_loan_days);
        if duration_days < 1 || duration_days > policy.max_loan_days {
            return Err(AppError::Validation(format!(
                "Loan duration must be between 1 and {} days",
                policy.max_loan_days
            )));
        }

        self.repository
            .loans
            .borrow(&CreateLoan {
                user_id,
                book_id,
                duration_days,
                note,
            })
            .await
    }

    /// Staff decision on a pending loan request
    pub async fn decide(&self, loan_id: i32, decision: LoanDecision) -> AppResult<Loan> {
        self.repository.loans.decide(loan_id, decision).await
    }

    /// Return a borrowed book, computing any fine
    pub async fn return_loan(
        &self,
        loan_id: i32,
        expected_owner: Option<i32>,
        lost: bool,
        note: Option<String>,
    ) -> AppResult<Loan> {
        let policy = self.policy().await?;
        self.repository
            .loans
            .return_loan(loan_id, expected_owner, lost, note.as_deref(), &policy)
            .await
    }
}
