//! Catalog management service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        book::{Book, BookSummary, CreateBook},
        genre::Genre,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List the approved catalog
    pub async fn list_books(&self) -> AppResult<Vec<BookSummary>> {
        self.repository.books.list_approved().await
    }

    /// Get an approved book
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_approved(id).await
    }

    /// Submit a new book for approval (staff)
    pub async fn create_book(&self, book: CreateBook, created_by: i32) -> AppResult<Book> {
        book.validate()?;
        // Anchor the submitter before writing
        self.repository.users.get_by_id(created_by).await?;
        self.repository.books.create(&book, created_by).await
    }

    /// List all genres
    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }
}
