//! Sign-in and home page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Query parameters for error display on the sign-in page.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub error: Option<String>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub display_name: String,
}

/// Display the sign-in page.
///
/// # Route
///
/// `GET /`
pub async fn index(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    IndexTemplate { error: query.error }
}

/// Display the home page.
///
/// Requires an authenticated session marker *and* a matching user row; a
/// marker whose row has since been deleted falls back to the sign-in page.
///
/// # Route
///
/// `GET /home`
pub async fn home(
    State(state): State<AppState>,
    RequireAuth(google_id): RequireAuth,
) -> Result<Response> {
    let repo = UserRepository::new(state.pool());

    match repo.find_by_google_id(&google_id).await? {
        Some(user) => Ok(HomeTemplate {
            display_name: user.display_name,
        }
        .into_response()),
        None => {
            tracing::warn!(google_id = %google_id, "session marker without user row");
            Ok(Redirect::to("/").into_response())
        }
    }
}
