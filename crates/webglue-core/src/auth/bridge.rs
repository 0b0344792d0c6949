use tracing::{info, warn};

use super::client::AuthBackend;
use crate::cookie::{Cookie, CookieJar};
use crate::error::LoginError;

/// Name of the cookie the session token is copied into
pub const TOKEN_COOKIE: &str = "token";

/// Result of an authentication call that completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The backend issued a valid session; its token is now in the cookie jar.
    Authenticated { token: String },
    /// The call completed but the store holds no valid session.
    SessionInvalid,
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated { .. })
    }
}

/// Logs a user in through the backend and copies the session token into
/// a cookie.
///
/// The cookie is written as plain `token=<value>` with no expiry, `Secure`
/// or `HttpOnly` attributes, so it is readable by any script on the page
/// and lives until the jar is cleared. Treat it as unsafe for anything
/// beyond same-origin convenience.
pub struct AuthBridge<B, J> {
    backend: B,
    cookies: J,
}

impl<B: AuthBackend, J: CookieJar> AuthBridge<B, J> {
    pub fn new(backend: B, cookies: J) -> Self {
        Self { backend, cookies }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cookies(&self) -> &J {
        &self.cookies
    }

    /// Authenticate `user` with `pass`.
    ///
    /// A failed authentication call (rejected credentials, network error)
    /// is returned as `LoginError::AuthCall`. A call that completes without
    /// leaving a valid session yields `LoginOutcome::SessionInvalid` and
    /// leaves the cookie jar untouched.
    pub async fn login(&self, user: &str, pass: &str) -> Result<LoginOutcome, LoginError> {
        self.backend.auth_with_password(user, pass).await?;

        match self.backend.auth_store().valid_token() {
            Some(token) => {
                self.cookies.set(Cookie::new(TOKEN_COOKIE, token.clone()))?;
                info!(user = user, "Login succeeded, session cookie written");
                Ok(LoginOutcome::Authenticated { token })
            }
            None => {
                warn!(user = user, "Authentication completed without a valid session");
                Ok(LoginOutcome::SessionInvalid)
            }
        }
    }

    /// End the client's session and give back the cookie jar.
    ///
    /// Only the auth store is cleared; an already written cookie stays.
    pub fn logout(self) -> J {
        self.backend.auth_store().clear();
        self.cookies
    }
}
