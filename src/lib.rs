//! Accounts portal library.
//!
//! Google sign-in and registration portal: authenticates users via Google's
//! OAuth2 authorization-code flow, collects supplementary profile data on
//! first login, and persists a user record in `PostgreSQL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod google;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
