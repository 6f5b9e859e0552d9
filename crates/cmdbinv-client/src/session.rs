//! Authenticated session handling
//!
//! A session holds one AR-JWT token from login until logout. Use
//! [`with_session`] so the logout runs whatever the body returns.

use std::future::Future;

use tracing::{debug, instrument, warn};

use crate::error::{ClientError, Result};
use crate::traits::{CmdbApi, Credentials, Token};

/// Logged-in session
pub struct Session<'a, A: CmdbApi + ?Sized> {
    api: &'a A,
    token: Token,
}

impl<'a, A: CmdbApi + ?Sized> Session<'a, A> {
    /// Log in and hold the resulting token.
    ///
    /// # Errors
    /// Returns `ClientError::Authentication` if the login is rejected, or a
    /// transport error if the server cannot be reached. No retry is made.
    #[instrument(skip_all)]
    pub async fn acquire(api: &'a A, credentials: &Credentials) -> Result<Self> {
        let token = api.login(credentials).await?;
        debug!("session acquired");
        Ok(Self { api, token })
    }

    /// The session token
    #[must_use]
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Log out. Failures are logged and otherwise ignored.
    #[instrument(skip_all)]
    pub async fn release(self) {
        match self.api.logout(&self.token).await {
            Ok(()) => debug!("session released"),
            Err(e) => warn!(error = %e, "logout failed, ignoring"),
        }
    }
}

/// Run `body` inside a logged-in session.
///
/// Logs in, hands a copy of the token to `body`, and logs out once `body`
/// completes, whether it succeeded or not. The result of `body` is returned
/// unchanged.
///
/// # Errors
/// Returns the login error if authentication fails (`body` is not run), or
/// whatever error `body` returns.
pub async fn with_session<A, T, E, F, Fut>(
    api: &A,
    credentials: &Credentials,
    body: F,
) -> std::result::Result<T, E>
where
    A: CmdbApi + ?Sized,
    E: From<ClientError>,
    F: FnOnce(Token) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let session = Session::acquire(api, credentials).await?;
    let result = body(session.token().clone()).await;
    session.release().await;
    result
}
