//! Loans repository: the transactional borrow/decision/return engine.
//!
//! Every stock mutation is paired with its loan mutation inside one
//! transaction, with the book row locked (`FOR UPDATE`) for the duration.
//! Early error returns drop the `Transaction`, which rolls back, so no
//! partial effect is ever observable.

use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{ApprovalStatus, Book},
        loan::{late_fee, CreateLoan, FineSettings, Loan, LoanDecision, LoanDetails, LoanStatus},
    },
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Ledger rows for a member, newest first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(
            r#"
            SELECT l.id, l.user_id, l.book_id, b.title, b.cover_url,
                   l.borrowed_at, l.due_at, l.returned_at, l.status, l.fine
            FROM loans l
            JOIN books b ON l.book_id = b.id
            WHERE l.user_id = $1
            ORDER BY l.borrowed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Mark open loans past their due date as overdue. Idempotent: already
    /// overdue and closed loans are untouched, and fines are not computed
    /// here (that happens once, at return).
    pub async fn mark_overdue(&self) -> AppResult<u64> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE loans SET status = 'terlambat', updated_at = $1 \
             WHERE status = 'dipinjam' AND due_at < $1",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Borrow a book: create a pending loan and take one copy out of
    /// stock, atomically.
    pub async fn borrow(&self, req: &CreateLoan) -> AppResult<Loan> {
        let now = Utc::now();
        let due_at = now + Duration::days(req.duration_days as i64);

        let mut tx = self.pool.begin().await?;

        // Lock the book row so the stock check and the decrement are
        // serialized against concurrent borrows.
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(req.book_id)
            .fetch_optional(&mut *tx)
            .await?;

        let book = match book {
            Some(b) if b.status == ApprovalStatus::Approved => b,
            _ => {
                return Err(AppError::NotApproved(
                    "Book not found or not approved".to_string(),
                ))
            }
        };

        if book.stock_available <= 0 {
            return Err(AppError::OutOfStock(format!(
                "No copies of \"{}\" available",
                book.title
            )));
        }

        let already_borrowed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans \
             WHERE user_id = $1 AND book_id = $2 AND status IN ('dipinjam', 'terlambat'))",
        )
        .bind(req.user_id)
        .bind(req.book_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_borrowed {
            return Err(AppError::AlreadyBorrowed(
                "An open loan for this book already exists".to_string(),
            ));
        }

        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (user_id, book_id, borrowed_at, due_at, status, note)
            VALUES ($1, $2, $3, $4, 'pending', $5)
            RETURNING *
            "#,
        )
        .bind(req.user_id)
        .bind(req.book_id)
        .bind(now)
        .bind(due_at)
        .bind(&req.note)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET stock_available = stock_available - 1, updated_at = $2 WHERE id = $1")
            .bind(req.book_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            loan_id = loan.id,
            user_id = req.user_id,
            book_id = req.book_id,
            due_at = %due_at,
            "loan requested"
        );

        Ok(loan)
    }

    /// Staff decision on a pending loan request. Approval hands the copy
    /// over; rejection releases the copy held since the request.
    pub async fn decide(&self, loan_id: i32, decision: LoanDecision) -> AppResult<Loan> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(loan_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if loan.status != LoanStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "Loan is {}, only pending requests can be decided",
                loan.status
            )));
        }

        let updated = match decision {
            LoanDecision::Approve => {
                sqlx::query_as::<_, Loan>(
                    "UPDATE loans SET status = 'dipinjam', updated_at = $2 WHERE id = $1 RETURNING *",
                )
                .bind(loan_id)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?
            }
            LoanDecision::Reject => {
                let updated = sqlx::query_as::<_, Loan>(
                    "UPDATE loans SET status = 'rejected', updated_at = $2 WHERE id = $1 RETURNING *",
                )
                .bind(loan_id)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?;

                // The copy was held at request time; give it back.
                sqlx::query(
                    "UPDATE books SET stock_available = stock_available + 1, updated_at = $2 WHERE id = $1",
                )
                .bind(loan.book_id)
                .bind(now)
                .execute(&mut *tx)
                .await?;

                updated
            }
        };

        tx.commit().await?;

        tracing::info!(loan_id, status = %updated.status, "loan request decided");

        Ok(updated)
    }

    /// Return a loan: close it, compute the fine once, and put the copy
    /// back in stock — all atomically.
    ///
    /// `expected_owner` enforces "not your loan" for member calls; a lost
    /// copy is fined flat and removed from the collection instead of
    /// restocked.
    pub async fn return_loan(
        &self,
        loan_id: i32,
        expected_owner: Option<i32>,
        lost: bool,
        note: Option<&str>,
        settings: &FineSettings,
    ) -> AppResult<Loan> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(loan_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if let Some(owner) = expected_owner {
            if loan.user_id != owner {
                return Err(AppError::NotFound(format!(
                    "Loan with id {} not found for this member",
                    loan_id
                )));
            }
        }

        if !loan.status.is_open() {
            return Err(AppError::InvalidState(format!(
                "Loan is {}, only borrowed or overdue loans can be returned",
                loan.status
            )));
        }

        let mut fine = late_fee(loan.due_at, now, settings.fine_per_day);
        if lost {
            fine += settings.lost_book_fine;
        }

        let updated = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET status = 'dikembalikan', returned_at = $2, fine = $3,
                note = COALESCE($4, note), updated_at = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(loan_id)
        .bind(now)
        .bind(fine)
        .bind(note)
        .fetch_one(&mut *tx)
        .await?;

        if lost {
            // The copy left the collection; it never goes back on the shelf.
            sqlx::query(
                "UPDATE books SET stock_total = stock_total - 1, updated_at = $2 WHERE id = $1",
            )
            .bind(loan.book_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query(
                "UPDATE books SET stock_available = stock_available + 1, updated_at = $2 WHERE id = $1",
            )
            .bind(loan.book_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            loan_id,
            fine = updated.fine,
            lost,
            "loan returned"
        );

        Ok(updated)
    }
}
