//! Session-related types.
//!
//! The whole authentication lifecycle is held under a single session key as
//! a tagged enum, so a session can never simultaneously carry pending
//! registration claims and an authenticated marker.

use serde::{Deserialize, Serialize};

/// Identity claims held in the session between the OAuth callback and the
/// registration form submission.
///
/// Created on first callback for an unknown identity, consumed (and
/// discarded with the session state) when the form is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    /// Google-issued subject identifier.
    pub google_id: String,
    /// Display name from the verified ID token.
    pub display_name: String,
    /// Email address from the verified ID token.
    pub email: String,
}

/// Where this browser session is in the sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthFlow {
    /// No sign-in attempted, or signed out.
    #[default]
    Anonymous,
    /// First-ever sign-in for this identity; awaiting the registration form.
    PendingRegistration {
        claims: PendingRegistration,
    },
    /// Sign-in complete; `google_id` references an existing user row.
    Authenticated {
        google_id: String,
    },
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for the [`super::AuthFlow`] state.
    pub const AUTH_FLOW: &str = "auth_flow";

    /// Key for the OAuth `state` parameter (CSRF protection, one-time use).
    pub const OAUTH_STATE: &str = "oauth_state";
}
