//! HTTP client for the BMC Remedy REST API

use std::time::Duration;

use async_trait::async_trait;
use cmdbinv_core::{QuerySpec, Record};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ClientError, Result};
use crate::fetch::parse_search_response;
use crate::traits::{CmdbApi, Credentials, Token};

/// Form holding computer system CIs
pub const DEFAULT_FORM: &str = "AST:ComputerSystem";

const LOGIN_PATH: &str = "/api/jwt/login";
const LOGOUT_PATH: &str = "/api/jwt/logout";
const ENTRY_PATH: &str = "/api/arsys/v1.0/entry";

/// Settings for the underlying `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Per-request timeout
    pub timeout: Duration,
    /// Skip TLS certificate verification
    pub insecure: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            insecure: false,
        }
    }
}

impl ClientOptions {
    /// Build a `reqwest::Client` from these options
    ///
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn build(&self) -> Result<Client> {
        Ok(Client::builder()
            .timeout(self.timeout)
            .danger_accept_invalid_certs(self.insecure)
            .build()?)
    }
}

/// Base URL for an instance: bare hostnames get `https://`
///
/// # Errors
/// Returns an error if the result is not a valid URL.
pub fn base_url_for(instance: &str) -> Result<Url> {
    let instance = instance.trim().trim_end_matches('/');
    if instance.contains("://") {
        Ok(Url::parse(instance)?)
    } else {
        Ok(Url::parse(&format!("https://{instance}"))?)
    }
}

/// Remedy REST client
#[derive(Debug, Clone)]
pub struct RemedyClient {
    client: Client,
    base_url: Url,
    form: String,
}

impl RemedyClient {
    /// Create a client with default options
    ///
    /// # Errors
    /// Returns an error if the instance address is invalid.
    ///
    /// # Example
    /// ```no_run
    /// use cmdbinv_client::RemedyClient;
    ///
    /// let client = RemedyClient::new("remedy.example.com")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(instance: &str) -> Result<Self> {
        Self::with_client(instance, ClientOptions::default().build()?)
    }

    /// Create a client with a custom `reqwest::Client`
    ///
    /// # Errors
    /// Returns an error if the instance address is invalid.
    pub fn with_client(instance: &str, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            base_url: base_url_for(instance)?,
            form: DEFAULT_FORM.to_string(),
        })
    }

    /// Search a different form
    #[must_use]
    pub fn with_form(mut self, form: impl Into<String>) -> Self {
        self.form = form.into();
        self
    }

    /// Build a full URL from a path
    fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(ClientError::Url)
    }

    /// URL for a search, with the selection and filter as query parameters
    fn search_url(&self, query: &QuerySpec) -> Result<Url> {
        let mut url = self.url(&format!("{ENTRY_PATH}/{}", self.form))?;
        url.query_pairs_mut()
            .append_pair("fields", &query.fields)
            .append_pair("q", &query.filter);
        Ok(url)
    }

    /// Turn an error status into `ClientError::Api`
    async fn check(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        Err(ClientError::Api { status, message })
    }
}

#[async_trait]
impl CmdbApi for RemedyClient {
    #[instrument(skip_all, fields(username = %credentials.username))]
    async fn login(&self, credentials: &Credentials) -> Result<Token> {
        let url = self.url(LOGIN_PATH)?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("username", &credentials.username)
            .append_pair("password", &credentials.password)
            .finish();

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Authentication { status, message });
        }

        let token = response.text().await?;
        let token = token.trim();
        if token.is_empty() {
            return Err(ClientError::Authentication {
                status,
                message: "login returned an empty token".to_string(),
            });
        }

        debug!("login succeeded");
        Ok(Token::new(token))
    }

    #[instrument(skip_all)]
    async fn logout(&self, token: &Token) -> Result<()> {
        let url = self.url(LOGOUT_PATH)?;
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, token.authorization())
            .send()
            .await?;
        Self::check(response).await?;

        debug!("logout succeeded");
        Ok(())
    }

    #[instrument(skip_all, fields(form = %self.form))]
    async fn search(&self, token: &Token, query: &QuerySpec) -> Result<Vec<Record>> {
        let url = self.search_url(query)?;
        debug!(filter = %query.filter, "searching entries");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, token.authorization())
            .send()
            .await?;
        let body = Self::check(response).await?.text().await?;

        parse_search_response(&body)
    }
}
