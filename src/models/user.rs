//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user.
///
/// One row per Google identity; created once at registration and never
/// updated or deleted by this application.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Google-issued stable subject identifier (primary key).
    pub google_id: String,
    /// Display name as supplied by Google at registration time.
    pub display_name: String,
    /// Email address as supplied by Google at registration time.
    pub email: String,
    /// User-supplied location.
    pub location: String,
    /// User-supplied mobile number.
    pub mobile_number: String,
    /// User-supplied street address.
    pub address: String,
    /// User-supplied ZIP code.
    pub zip: String,
    /// When the row was inserted.
    pub created_at: DateTime<Utc>,
}

/// Data required to insert a new user row.
///
/// Combines the identity claims held in the session with the supplementary
/// fields from the registration form.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub google_id: String,
    pub display_name: String,
    pub email: String,
    pub location: String,
    pub mobile_number: String,
    pub address: String,
    pub zip: String,
}
