//! Book approval workflow service

use crate::{
    config::ApprovalConfig,
    error::AppResult,
    models::book::{ApprovalDecision, Book},
    repository::Repository,
};

#[derive(Clone)]
pub struct ApprovalsService {
    repository: Repository,
    config: ApprovalConfig,
}

impl ApprovalsService {
    pub fn new(repository: Repository, config: ApprovalConfig) -> Self {
        Self { repository, config }
    }

    /// Books awaiting a decision, newest first
    pub async fn pending_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_pending().await
    }

    /// Apply an admin decision to a book
    pub async fn decide(
        &self,
        book_id: i32,
        decision: ApprovalDecision,
        decider_id: i32,
    ) -> AppResult<Book> {
        self.repository
            .books
            .decide(book_id, decision, decider_id, self.config.strict_transitions)
            .await
    }
}
