//! Google OAuth2 / `OpenID` Connect client.
//!
//! Wraps the three provider operations the sign-in flow needs:
//!
//! 1. Generate the authorization URL with `authorization_url()`
//! 2. Exchange the callback code for tokens with `exchange_code()`
//! 3. Verify and decode the ID token with `verify_id_token()`
//!
//! ID-token verification checks the RS256 signature against Google's
//! published JWKS, the audience against the configured client id, and the
//! issuer and expiry. The key set is cached; an unknown `kid` forces a
//! refetch (Google rotates keys).
//!
//! # Example
//!
//! ```rust,ignore
//! let google = GoogleClient::new(&config.google, config.redirect_uri());
//!
//! let auth_url = google.authorization_url(&oauth_state);
//!
//! // After the OAuth callback:
//! let tokens = google.exchange_code(&code).await?;
//! let identity = google.verify_id_token(&tokens.id_token).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GoogleOAuthConfig;

/// Google's OAuth2 authorization endpoint.
const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google's OAuth2 token endpoint.
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Google's JWKS endpoint for ID-token signature verification.
const JWKS_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Accepted `iss` values for Google ID tokens.
const VALID_ISSUERS: &[&str] = &["https://accounts.google.com", "accounts.google.com"];

/// How long cached JWKS entries stay valid before a refetch.
const JWKS_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Errors from the Google OAuth2 client.
#[derive(Debug, Error)]
pub enum GoogleAuthError {
    /// Network failure talking to Google.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Token endpoint rejected the exchange (invalid, expired, or
    /// already-consumed code).
    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// Token response carried no ID token.
    #[error("token response missing id_token")]
    MissingIdToken,

    /// ID token header carried no key id.
    #[error("id token missing kid header")]
    MissingKeyId,

    /// No JWKS entry for the token's key id, even after a refetch.
    #[error("no Google signing key with kid {0}")]
    UnknownKeyId(String),

    /// Signature, audience, issuer, or expiry check failed.
    #[error("invalid id token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Verified token lacked a claim the flow needs.
    #[error("id token missing {0} claim")]
    MissingClaim(&'static str),
}

/// Token set returned by a successful code exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleTokens {
    /// Bearer token for Google APIs (unused by this portal, kept for parity
    /// with the token response).
    pub access_token: String,
    /// The `OpenID` Connect identity token.
    pub id_token: String,
    /// Refresh token, present because the flow requests offline access.
    pub refresh_token: Option<String>,
    /// Lifetime of the access token in seconds.
    pub expires_in: Option<i64>,
}

/// The identity claims this portal consumes from a verified ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleIdentity {
    /// Stable, provider-issued subject identifier.
    pub sub: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    id_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwksKey>,
}

#[derive(Debug, Clone, Deserialize)]
struct JwksKey {
    kid: String,
    /// RSA modulus, base64url.
    n: String,
    /// RSA exponent, base64url.
    e: String,
}

/// Claims deserialized from the ID token payload.
#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    name: Option<String>,
    email: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Client for Google's OAuth2 endpoints.
///
/// Cheap to clone; all state lives behind an `Arc`.
#[derive(Clone)]
pub struct GoogleClient {
    inner: Arc<GoogleClientInner>,
}

struct GoogleClientInner {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    /// JWKS entries keyed by `kid`.
    jwks: Cache<String, JwksKey>,
}

impl GoogleClient {
    /// Create a new Google OAuth2 client.
    #[must_use]
    pub fn new(config: &GoogleOAuthConfig, redirect_uri: String) -> Self {
        Self {
            inner: Arc::new(GoogleClientInner {
                http: reqwest::Client::new(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
                redirect_uri,
                jwks: Cache::builder().time_to_live(JWKS_CACHE_TTL).build(),
            }),
        }
    }

    /// Get the OAuth client ID (safe to expose).
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    /// Generate the authorization URL for Google sign-in.
    ///
    /// Requests the `openid profile email` scopes with offline access, and
    /// forces the account chooser on every invocation so a previously chosen
    /// account is never silently reused.
    ///
    /// # Arguments
    ///
    /// * `state` - A random string stored in the session to prevent CSRF attacks
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20profile%20email&\
            access_type=offline&\
            prompt=select_account&\
            state={}",
            AUTHORIZATION_ENDPOINT,
            urlencoding::encode(&self.inner.client_id),
            urlencoding::encode(&self.inner.redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns `GoogleAuthError::TokenExchange` if Google rejects the code
    /// (invalid, expired, or already consumed), `GoogleAuthError::Http` on
    /// network failure, and `GoogleAuthError::MissingIdToken` if the
    /// response carries no identity token.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleTokens, GoogleAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", &self.inner.client_id),
            ("client_secret", &self.inner.client_secret),
            ("code", code),
            ("redirect_uri", &self.inner.redirect_uri),
        ];

        let response = self
            .inner
            .http
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GoogleAuthError::TokenExchange(text));
        }

        let token_response: TokenResponse = response.json().await?;
        let id_token = token_response
            .id_token
            .ok_or(GoogleAuthError::MissingIdToken)?;

        Ok(GoogleTokens {
            access_token: token_response.access_token,
            id_token,
            refresh_token: token_response.refresh_token,
            expires_in: token_response.expires_in,
        })
    }

    /// Verify an ID token and extract the identity claims.
    ///
    /// Checks the RS256 signature against Google's JWKS, the audience
    /// against the configured client id, and issuer and expiry.
    ///
    /// # Errors
    ///
    /// Returns `GoogleAuthError::InvalidToken` if any verification check
    /// fails, `GoogleAuthError::UnknownKeyId` if the signing key cannot be
    /// found, and `GoogleAuthError::MissingClaim` if a verified token lacks
    /// the name or email claim.
    pub async fn verify_id_token(&self, id_token: &str) -> Result<GoogleIdentity, GoogleAuthError> {
        let header = jsonwebtoken::decode_header(id_token)?;
        let kid = header.kid.ok_or(GoogleAuthError::MissingKeyId)?;

        let key = self.signing_key(&kid).await?;
        let decoding_key = jsonwebtoken::DecodingKey::from_rsa_components(&key.n, &key.e)?;

        let mut validation = jsonwebtoken::Validation::new(jsonwebtoken::Algorithm::RS256);
        validation.set_audience(&[&self.inner.client_id]);
        validation.set_issuer(VALID_ISSUERS);

        let token_data =
            jsonwebtoken::decode::<IdTokenClaims>(id_token, &decoding_key, &validation)?;
        let claims = token_data.claims;

        Ok(GoogleIdentity {
            sub: claims.sub,
            name: claims.name.ok_or(GoogleAuthError::MissingClaim("name"))?,
            email: claims.email.ok_or(GoogleAuthError::MissingClaim("email"))?,
        })
    }

    /// Look up the JWKS entry for `kid`, refetching the key set on a miss.
    async fn signing_key(&self, kid: &str) -> Result<JwksKey, GoogleAuthError> {
        if let Some(key) = self.inner.jwks.get(kid).await {
            return Ok(key);
        }

        self.refresh_jwks().await?;

        self.inner
            .jwks
            .get(kid)
            .await
            .ok_or_else(|| GoogleAuthError::UnknownKeyId(kid.to_string()))
    }

    /// Fetch Google's JWKS and populate the cache.
    async fn refresh_jwks(&self) -> Result<(), GoogleAuthError> {
        let response = self
            .inner
            .http
            .get(JWKS_ENDPOINT)
            .send()
            .await?
            .error_for_status()?;

        let jwks: JwksResponse = response.json().await?;
        tracing::debug!(keys = jwks.keys.len(), "refreshed Google JWKS");

        for key in jwks.keys {
            self.inner.jwks.insert(key.kid.clone(), key).await;
        }

        Ok(())
    }
}
