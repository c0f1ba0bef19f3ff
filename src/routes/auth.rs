//! Google OAuth route handlers.
//!
//! Handles the authorization-code flow:
//! - Sign-in: redirects to Google's authorization page
//! - Callback: exchanges the code, verifies the ID token, and routes the
//!   browser to registration (unknown identity) or home (known identity)

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::{Result, set_sentry_user};
use crate::google::GoogleIdentity;
use crate::middleware::set_auth_flow;
use crate::models::{AuthFlow, PendingRegistration, session_keys};
use crate::state::AppState;

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed (e.g. access denied).
    pub error: Option<String>,
}

/// Where a verified identity lands after the callback.
#[derive(Debug, PartialEq, Eq)]
pub enum SignInOutcome {
    /// A user row exists for this subject id; sign straight in.
    Returning { google_id: String, email: String },
    /// No row yet; registration must complete first.
    NewIdentity { claims: PendingRegistration },
}

/// Resolve a verified identity against the user table.
///
/// A known subject id signs straight in; an unknown one carries its claims
/// forward to the registration form.
///
/// # Errors
///
/// Returns `AppError::Database` if the lookup fails.
pub async fn resolve_identity(
    repo: &UserRepository<'_>,
    identity: GoogleIdentity,
) -> Result<SignInOutcome> {
    match repo.find_by_google_id(&identity.sub).await? {
        Some(user) => Ok(SignInOutcome::Returning {
            google_id: user.google_id,
            email: user.email,
        }),
        None => Ok(SignInOutcome::NewIdentity {
            claims: PendingRegistration {
                google_id: identity.sub,
                display_name: identity.name,
                email: identity.email,
            },
        }),
    }
}

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

/// Initiate Google sign-in.
///
/// Generates a state parameter, stores it in the session, and redirects to
/// Google's authorization page.
///
/// # Route
///
/// `GET /signin`
pub async fn signin(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = generate_random_string(32);

    // Store in session for validation on callback
    if let Err(e) = session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Failed to store OAuth state in session: {}", e);
        return Redirect::to("/?error=session").into_response();
    }

    let auth_url = state.google().authorization_url(&oauth_state);

    Redirect::to(&auth_url).into_response()
}

/// Handle the Google OAuth callback.
///
/// Validates the state parameter, exchanges the authorization code, and
/// verifies the ID token. A known identity gets an authenticated session and
/// goes to `/home`; a first-time identity gets its claims stashed in the
/// session and goes to the registration form.
///
/// # Route
///
/// `GET /oauth2callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Response> {
    // Check for OAuth errors from Google (e.g. the user denied access)
    if let Some(error) = query.error {
        tracing::warn!("Google OAuth error: {}", error);
        return Ok(Redirect::to("/?error=denied").into_response());
    }

    // Verify we have an authorization code
    let Some(code) = query.code else {
        tracing::warn!("Google OAuth callback missing code");
        return Ok(Redirect::to("/?error=missing_code").into_response());
    };

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("Google OAuth callback missing state");
        return Ok(Redirect::to("/?error=missing_state").into_response());
    };

    let stored_state: Option<String> = session.get(session_keys::OAUTH_STATE).await.ok().flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("Google OAuth state mismatch");
        return Ok(Redirect::to("/?error=invalid_state").into_response());
    }

    // Clear the stored state (one-time use)
    let _ = session.remove::<String>(session_keys::OAUTH_STATE).await;

    // Exchange code for tokens and verify the identity token
    let tokens = state.google().exchange_code(&code).await?;
    let identity = state.google().verify_id_token(&tokens.id_token).await?;

    let repo = UserRepository::new(state.pool());

    match resolve_identity(&repo, identity).await? {
        SignInOutcome::Returning { google_id, email } => {
            // Returning user: mark the session authenticated
            set_auth_flow(
                &session,
                &AuthFlow::Authenticated {
                    google_id: google_id.clone(),
                },
            )
            .await?;
            set_sentry_user(&google_id, Some(&email));

            tracing::info!(google_id = %google_id, "returning user signed in");
            Ok(Redirect::to("/home").into_response())
        }
        SignInOutcome::NewIdentity { claims } => {
            // First sign-in for this identity: stash the claims and collect
            // the rest through the registration form
            tracing::info!(google_id = %claims.google_id, "new identity, redirecting to registration");
            set_auth_flow(&session, &AuthFlow::PendingRegistration { claims }).await?;

            Ok(Redirect::to("/additional-info").into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_string_length() {
        assert_eq!(generate_random_string(32).len(), 32);
    }

    #[test]
    fn test_generate_random_string_charset() {
        let s = generate_random_string(64);
        assert!(s.chars().all(char::is_alphanumeric));
    }

    #[test]
    fn test_generate_random_string_unique() {
        // Two draws colliding would mean the RNG is broken
        assert_ne!(generate_random_string(32), generate_random_string(32));
    }
}
