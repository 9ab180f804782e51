//! Loan (borrow) model, status machine and fine computation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

/// Loan lifecycle states.
///
/// The stored string values (`dipinjam`, `terlambat`, `dikembalikan`) are
/// the legacy vocabulary existing clients depend on and are kept verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "dipinjam")]
    Borrowed,
    #[serde(rename = "terlambat")]
    Overdue,
    #[serde(rename = "dikembalikan")]
    Returned,
    #[serde(rename = "rejected")]
    Rejected,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Borrowed => "dipinjam",
            LoanStatus::Overdue => "terlambat",
            LoanStatus::Returned => "dikembalikan",
            LoanStatus::Rejected => "rejected",
        }
    }

    /// An open loan holds a copy of the book out of stock and blocks the
    /// member from borrowing the same title again.
    pub fn is_open(&self) -> bool {
        matches!(self, LoanStatus::Borrowed | LoanStatus::Overdue)
    }

    /// Allowed forward transitions. Returned and Rejected are terminal.
    pub fn can_transition_to(&self, next: LoanStatus) -> bool {
        match self {
            LoanStatus::Pending => matches!(next, LoanStatus::Borrowed | LoanStatus::Rejected),
            LoanStatus::Borrowed => matches!(next, LoanStatus::Overdue | LoanStatus::Returned),
            LoanStatus::Overdue => matches!(next, LoanStatus::Returned),
            LoanStatus::Returned => false,
            LoanStatus::Rejected => false,
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LoanStatus::Pending),
            "dipinjam" => Ok(LoanStatus::Borrowed),
            "terlambat" => Ok(LoanStatus::Overdue),
            "dikembalikan" => Ok(LoanStatus::Returned),
            "rejected" => Ok(LoanStatus::Rejected),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus (stored as TEXT)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Decision applied to a pending loan request by staff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanDecision {
    Approve,
    Reject,
}

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub fine: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ledger row for display: loan joined with its book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub title: String,
    pub cover_url: Option<String>,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub fine: i64,
}

/// Borrow request passed to the engine
#[derive(Debug, Clone)]
pub struct CreateLoan {
    pub user_id: i32,
    pub book_id: i32,
    pub duration_days: i16,
    pub note: Option<String>,
}

/// Runtime fine/duration policy (single row, admin-editable)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Validate, ToSchema)]
pub struct FineSettings {
    /// Fine per day a loan is overdue
    #[validate(range(min = 0, message = "Fine must not be negative"))]
    pub fine_per_day: i64,
    /// Loan duration applied when the borrower does not pick one
    #[validate(range(min = 1, max = 365, message = "Default duration out of range"))]
    pub default_loan_days: i16,
    /// Upper bound a borrower may request
    #[validate(range(min = 1, max = 365, message = "Maximum duration out of range"))]
    pub max_loan_days: i16,
    /// Flat fine for a lost or damaged copy
    #[validate(range(min = 0, message = "Fine must not be negative"))]
    pub lost_book_fine: i64,
}

impl From<&crate::config::LoansConfig> for FineSettings {
    fn from(c: &crate::config::LoansConfig) -> Self {
        Self {
            fine_per_day: c.fine_per_day,
            default_loan_days: c.default_loan_days,
            max_loan_days: c.max_loan_days,
            lost_book_fine: c.lost_book_fine,
        }
    }
}

/// Fine for a late return: whole days late (rounded up) times the daily
/// rate. Zero when returned on or before the due date.
pub fn late_fee(due_at: DateTime<Utc>, returned_at: DateTime<Utc>, fine_per_day: i64) -> i64 {
    if returned_at <= due_at {
        return 0;
    }
    let late_seconds = (returned_at - due_at).num_seconds();
    let late_days = (late_seconds + 86_399) / 86_400;
    late_days * fine_per_day
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn status_round_trip_keeps_legacy_vocabulary() {
        for (status, s) in [
            (LoanStatus::Pending, "pending"),
            (LoanStatus::Borrowed, "dipinjam"),
            (LoanStatus::Overdue, "terlambat"),
            (LoanStatus::Returned, "dikembalikan"),
            (LoanStatus::Rejected, "rejected"),
        ] {
            assert_eq!(status.as_str(), s);
            assert_eq!(s.parse::<LoanStatus>().unwrap(), status);
        }
        assert!("approved".parse::<LoanStatus>().is_err());
    }

    #[test]
    fn transitions_are_strictly_forward() {
        use LoanStatus::*;
        assert!(Pending.can_transition_to(Borrowed));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Borrowed.can_transition_to(Overdue));
        assert!(Borrowed.can_transition_to(Returned));
        assert!(Overdue.can_transition_to(Returned));

        assert!(!Pending.can_transition_to(Returned));
        assert!(!Borrowed.can_transition_to(Pending));
        assert!(!Overdue.can_transition_to(Borrowed));
        assert!(!Returned.can_transition_to(Borrowed));
        assert!(!Rejected.can_transition_to(Borrowed));
    }

    #[test]
    fn only_borrowed_and_overdue_are_open() {
        assert!(LoanStatus::Borrowed.is_open());
        assert!(LoanStatus::Overdue.is_open());
        assert!(!LoanStatus::Pending.is_open());
        assert!(!LoanStatus::Returned.is_open());
        assert!(!LoanStatus::Rejected.is_open());
    }

    #[test]
    fn on_time_return_has_no_fine() {
        let due = Utc::now();
        assert_eq!(late_fee(due, due, 2000), 0);
        assert_eq!(late_fee(due, due - Duration::days(2), 2000), 0);
    }

    #[test]
    fn partial_late_day_rounds_up() {
        let due = Utc::now();
        assert_eq!(late_fee(due, due + Duration::hours(1), 2000), 2000);
        assert_eq!(late_fee(due, due + Duration::days(1), 2000), 2000);
        assert_eq!(
            late_fee(due, due + Duration::days(1) + Duration::seconds(1), 2000),
            2 * 2000
        );
    }

    #[test]
    fn seven_day_loan_returned_after_ten_days_owes_three_days() {
        let borrowed = Utc::now();
        let due = borrowed + Duration::days(7);
        let returned = borrowed + Duration::days(10);
        assert_eq!(late_fee(due, returned, 2000), 3 * 2000);
    }
}
