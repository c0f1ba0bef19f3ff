//! HTTP route handlers for the portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                - Sign-in page
//! GET  /health          - Health check
//!
//! # Google OAuth
//! GET  /signin          - Redirect to Google's authorization page
//! GET  /oauth2callback  - Handle OAuth callback
//!
//! # Registration (first sign-in only)
//! GET  /additional-info - Supplementary details form
//! POST /submit-info     - Create the user row
//!
//! # Protected
//! GET  /home            - Welcome page (requires authenticated session)
//! ```

pub mod auth;
pub mod home;
pub mod registration;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .route("/signin", get(auth::signin))
        .route("/oauth2callback", get(auth::callback))
        .route("/additional-info", get(registration::additional_info_page))
        .route("/submit-info", post(registration::submit_info))
        .route("/home", get(home::home))
}
