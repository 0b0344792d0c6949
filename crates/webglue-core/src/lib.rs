//! Client-side glue for a site backed by a hosted backend.
//!
//! Two independent pieces:
//! - [`auth::AuthBridge`] logs a user in and copies the session token into
//!   a `token` cookie.
//! - [`fragment::FragmentLoader`] fetches the shared header and footer
//!   fragments and splices them into their mount elements.

pub mod auth;
pub mod config;
pub mod cookie;
pub mod error;
pub mod fragment;

pub use auth::{AuthBackend, AuthBridge, AuthStore, LoginOutcome, PocketBaseClient};
pub use config::Config;
pub use cookie::{Cookie, CookieJar, FileCookieJar, MemoryCookieJar};
pub use error::{ApiError, LoginError, MountError, StoreError};
pub use fragment::{Document, FragmentLoader, FragmentSource, HttpFragmentSource, MemoryDocument};
