//! Repository layer for database operations

pub mod books;
pub mod genres;
pub mod loans;
pub mod settings;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub genres: genres::GenresRepository,
    pub loans: loans::LoansRepository,
    pub settings: settings::SettingsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            genres: genres::GenresRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            settings: settings::SettingsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}
