//! Registration route handlers.
//!
//! First-time sign-ins land here: the OAuth callback has stashed the
//! verified identity claims in the session, and the form collects the
//! supplementary fields needed to create the user row.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::{Result, set_sentry_user};
use crate::middleware::{auth_flow, set_auth_flow};
use crate::models::{AuthFlow, NewUser};
use crate::state::AppState;

/// Supplementary details form data.
#[derive(Debug, Deserialize)]
pub struct AdditionalInfoForm {
    pub location: String,
    pub mobile: String,
    pub address: String,
    pub zip: String,
}

/// Registration form template.
#[derive(Template, WebTemplate)]
#[template(path = "additional_info.html")]
pub struct AdditionalInfoTemplate {
    pub display_name: String,
}

/// Display the supplementary details form.
///
/// A direct visit without a pending registration in the session is bounced
/// back to the sign-in page instead of rendering a form that could only
/// fail at submission.
///
/// # Route
///
/// `GET /additional-info`
pub async fn additional_info_page(session: Session) -> Result<Response> {
    match auth_flow(&session).await? {
        AuthFlow::PendingRegistration { claims } => Ok(AdditionalInfoTemplate {
            display_name: claims.display_name,
        }
        .into_response()),
        AuthFlow::Authenticated { .. } => Ok(Redirect::to("/home").into_response()),
        AuthFlow::Anonymous => {
            tracing::warn!("registration form visited without pending claims");
            Ok(Redirect::to("/").into_response())
        }
    }
}

/// Handle the supplementary details form submission.
///
/// Combines the session-held identity claims with the form fields, inserts
/// the user row, and marks the session authenticated. A resubmission after
/// the row exists surfaces as a conflict from the storage layer rather than
/// a second row.
///
/// # Route
///
/// `POST /submit-info`
pub async fn submit_info(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AdditionalInfoForm>,
) -> Result<Response> {
    let AuthFlow::PendingRegistration { claims } = auth_flow(&session).await? else {
        tracing::warn!("registration submitted without pending claims");
        return Ok(Redirect::to("/").into_response());
    };

    let new_user = NewUser {
        google_id: claims.google_id,
        display_name: claims.display_name,
        email: claims.email,
        location: form.location,
        mobile_number: form.mobile,
        address: form.address,
        zip: form.zip,
    };

    let repo = UserRepository::new(state.pool());
    let user = repo.create(&new_user).await?;

    set_auth_flow(
        &session,
        &AuthFlow::Authenticated {
            google_id: user.google_id.clone(),
        },
    )
    .await?;
    set_sentry_user(&user.google_id, Some(&user.email));

    tracing::info!(google_id = %user.google_id, "user registered");
    Ok(Redirect::to("/home").into_response())
}
