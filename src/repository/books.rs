//! Books repository: catalog reads, staff submission, admin decision

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{ApprovalDecision, Book, BookSummary, CreateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID regardless of approval state
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book by ID, only if approved. Members never learn whether a
    /// missing title is unknown or merely undecided.
    pub async fn get_approved(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 AND status = 'approved'")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotApproved("Book not found or not approved".to_string()))
    }

    /// List the approved catalog with genre names
    pub async fn list_approved(&self) -> AppResult<Vec<BookSummary>> {
        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT b.id, b.title, b.author, b.cover_url, b.genre_id,
                   g.name AS genre_name,
                   b.stock_available, b.stock_total
            FROM books b
            LEFT JOIN genres g ON b.genre_id = g.id
            WHERE b.status = 'approved'
            ORDER BY b.title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// List books awaiting an approval decision, newest first
    pub async fn list_pending(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE status = 'pending' ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Create a staff-submitted book. It enters the catalog as pending
    /// with its full stock available once approved.
    pub async fn create(&self, book: &CreateBook, created_by: i32) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                title, author, publisher, publication_year, isbn, pages,
                description, cover_url, genre_id,
                stock_available, stock_total, status, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, 'pending', $11)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .bind(book.publication_year)
        .bind(&book.isbn)
        .bind(book.pages)
        .bind(&book.description)
        .bind(&book.cover_url)
        .bind(book.genre_id)
        .bind(book.stock_total)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Apply an admin decision to a book, recording the decider and the
    /// decision timestamp.
    ///
    /// When `strict` is false any prior decision is overwritten; when true
    /// only pending books can be decided.
    pub async fn decide(
        &self,
        book_id: i32,
        decision: ApprovalDecision,
        decider_id: i32,
        strict: bool,
    ) -> AppResult<Book> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if strict && book.status.is_decided() {
            return Err(AppError::InvalidState(format!(
                "Book is already {}, cannot decide again",
                book.status
            )));
        }

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET status = $2, approved_by = $3, approved_at = $4, updated_at = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(decision.resulting_status())
        .bind(decider_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            book_id,
            decider_id,
            status = %updated.status,
            "book approval decision applied"
        );

        Ok(updated)
    }
}
