//! Authentication module for logging users in against the hosted backend.
//!
//! This module provides:
//! - `PocketBaseClient`: HTTP client for the backend's password auth endpoint
//! - `AuthStore`: the client's in-memory token and user record
//! - `AuthBridge`: login wrapper that copies the session token into a cookie
//!
//! Token issuance, renewal and credential storage all live in the backend.

pub mod bridge;
pub mod client;
pub mod store;

pub use bridge::{AuthBridge, LoginOutcome, TOKEN_COOKIE};
pub use client::{AuthBackend, PocketBaseClient, RecordService, DEFAULT_BASE_URL, USERS_COLLECTION};
pub use store::{AuthRecord, AuthStore};
