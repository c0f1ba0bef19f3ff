//! Authentication extractors over the session-held sign-in flow state.
//!
//! The session stores a single [`AuthFlow`] value; these helpers read and
//! write it so handlers never juggle raw session keys.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{AuthFlow, session_keys};

/// Extractor that requires an authenticated session marker.
///
/// Yields the `google_id` stored in the session. Anything short of an
/// `Authenticated` flow state redirects to the sign-in page; whether the
/// referenced user row still exists is the handler's concern.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(google_id): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {google_id}!")
/// }
/// ```
pub struct RequireAuth(pub String);

/// Error returned when authentication is required but missing.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        Redirect::to("/").into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts.extensions.get::<Session>().ok_or(AuthRejection)?;

        let flow: AuthFlow = session
            .get(session_keys::AUTH_FLOW)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();

        match flow {
            AuthFlow::Authenticated { google_id } => Ok(Self(google_id)),
            AuthFlow::Anonymous | AuthFlow::PendingRegistration { .. } => Err(AuthRejection),
        }
    }
}

/// Read the current sign-in flow state, defaulting to `Anonymous`.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn auth_flow(session: &Session) -> Result<AuthFlow, tower_sessions::session::Error> {
    Ok(session
        .get(session_keys::AUTH_FLOW)
        .await?
        .unwrap_or_default())
}

/// Replace the sign-in flow state in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_auth_flow(
    session: &Session,
    flow: &AuthFlow,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::AUTH_FLOW, flow).await
}
