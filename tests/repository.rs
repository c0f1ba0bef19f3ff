//! Database-backed tests for the user repository and the post-verification
//! sign-in decision.
//!
//! These tests require a running `PostgreSQL` database reachable via
//! `PORTAL_DATABASE_URL` (or `DATABASE_URL`). Each test works with its own
//! generated subject id and deletes its rows afterwards.

use accounts_portal::db::{RepositoryError, UserRepository, create_pool};
use accounts_portal::google::GoogleIdentity;
use accounts_portal::models::{NewUser, PendingRegistration};
use accounts_portal::routes::auth::{SignInOutcome, resolve_identity};
use secrecy::SecretString;
use sqlx::PgPool;

async fn test_pool() -> PgPool {
    let url = std::env::var("PORTAL_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("PORTAL_DATABASE_URL must be set for database tests");

    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("Failed to create pool");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Subject ids unique per test run so reruns never collide.
fn unique_google_id(tag: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("g-test-{tag}-{nanos}")
}

fn new_user(google_id: &str) -> NewUser {
    NewUser {
        google_id: google_id.to_string(),
        display_name: "Ada".to_string(),
        email: "ada@x.com".to_string(),
        location: "NYC".to_string(),
        mobile_number: "555-1234".to_string(),
        address: "1 Main St".to_string(),
        zip: "10001".to_string(),
    }
}

async fn delete_user(pool: &PgPool, google_id: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE google_id = $1")
        .bind(google_id)
        .execute(pool)
        .await;
}

// ============================================================================
// Registration idempotence
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_duplicate_registration_is_rejected() {
    let pool = test_pool().await;
    let repo = UserRepository::new(&pool);
    let google_id = unique_google_id("dup");

    let first = repo
        .create(&new_user(&google_id))
        .await
        .expect("first insert must succeed");
    assert_eq!(first.google_id, google_id);

    // Resubmitting the same registration must hit the primary key, not
    // create a second row
    let mut resubmission = new_user(&google_id);
    resubmission.location = "Boston".to_string();
    let second = repo.create(&resubmission).await;
    assert!(matches!(second, Err(RepositoryError::Conflict(_))));

    // The stored row still carries the first submission's values
    let stored = repo
        .find_by_google_id(&google_id)
        .await
        .expect("lookup must succeed")
        .expect("row must exist");
    assert_eq!(stored.location, "NYC");

    delete_user(&pool, &google_id).await;
}

// ============================================================================
// Callback branching
// ============================================================================

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_known_identity_signs_straight_in() {
    let pool = test_pool().await;
    let repo = UserRepository::new(&pool);
    let google_id = unique_google_id("known");

    repo.create(&new_user(&google_id))
        .await
        .expect("insert must succeed");

    let identity = GoogleIdentity {
        sub: google_id.clone(),
        name: "Ada".to_string(),
        email: "ada@x.com".to_string(),
    };
    let outcome = resolve_identity(&repo, identity)
        .await
        .expect("resolve must succeed");

    // A stored identity must never be routed back through registration
    assert_eq!(
        outcome,
        SignInOutcome::Returning {
            google_id: google_id.clone(),
            email: "ada@x.com".to_string(),
        }
    );

    delete_user(&pool, &google_id).await;
}

#[tokio::test]
#[ignore = "Requires PostgreSQL"]
async fn test_unknown_identity_carries_exact_claims_to_registration() {
    let pool = test_pool().await;
    let repo = UserRepository::new(&pool);
    let google_id = unique_google_id("unknown");

    let identity = GoogleIdentity {
        sub: google_id.clone(),
        name: "Grace Hopper".to_string(),
        email: "grace@x.com".to_string(),
    };
    let outcome = resolve_identity(&repo, identity)
        .await
        .expect("resolve must succeed");

    // The pending claims must match the token payload exactly
    assert_eq!(
        outcome,
        SignInOutcome::NewIdentity {
            claims: PendingRegistration {
                google_id: google_id.clone(),
                display_name: "Grace Hopper".to_string(),
                email: "grace@x.com".to_string(),
            },
        }
    );

    // Resolving never creates a row on its own
    let stored = repo
        .find_by_google_id(&google_id)
        .await
        .expect("lookup must succeed");
    assert!(stored.is_none());
}
