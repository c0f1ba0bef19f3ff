//! User repository for database operations.
//!
//! Queries use runtime-checked `sqlx::query_as` with positional parameter
//! binding; user input is never interpolated into SQL text.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::user::{NewUser, User};

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up a user by their Google subject id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_google_id(
        &self,
        google_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT google_id, display_name, email, location, mobile_number, address, zip,
                   created_at
            FROM users
            WHERE google_id = $1
            ",
        )
        .bind(google_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Insert a new user row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a row for the same `google_id`
    /// already exists (resubmitted registration form).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (google_id, display_name, email, location, mobile_number, address, zip)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING google_id, display_name, email, location, mobile_number, address, zip,
                      created_at
            ",
        )
        .bind(&new_user.google_id)
        .bind(&new_user.display_name)
        .bind(&new_user.email)
        .bind(&new_user.location)
        .bind(&new_user.mobile_number)
        .bind(&new_user.address)
        .bind(&new_user.zip)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("user already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(user)
    }
}
