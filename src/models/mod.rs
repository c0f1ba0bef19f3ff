//! Domain models for the portal.

pub mod session;
pub mod user;

pub use session::{AuthFlow, PendingRegistration, session_keys};
pub use user::{NewUser, User};
