//! CMDB API trait and credential types

use std::fmt;

use async_trait::async_trait;
use cmdbinv_core::{QuerySpec, Record};

use crate::error::Result;

/// Login credentials
#[derive(Clone)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// AR-JWT bearer token
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw token text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("AR-JWT {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Remote CMDB operations
#[async_trait]
pub trait CmdbApi: Send + Sync {
    /// Exchange credentials for a token
    async fn login(&self, credentials: &Credentials) -> Result<Token>;

    /// Invalidate a token
    async fn logout(&self, token: &Token) -> Result<()>;

    /// Run one record search
    async fn search(&self, token: &Token, query: &QuerySpec) -> Result<Vec<Record>>;
}
