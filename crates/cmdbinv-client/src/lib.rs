//! cmdbinv-client: BMC Remedy REST client
//!
//! Provides the token session, the record fetch, and a reqwest-based
//! implementation of [`CmdbApi`].
//!
//! # Example
//!
//! ```no_run
//! use cmdbinv_client::{Credentials, RemedyClient, fetch_records, with_session};
//! use cmdbinv_core::{InventoryConfig, QuerySpec};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RemedyClient::new("remedy.example.com")?;
//! let credentials = Credentials::new("svc-ansible", "secret");
//! let query = QuerySpec::build(&InventoryConfig::default(), None);
//!
//! let api = &client;
//! let records = with_session(api, &credentials, |token| async move {
//!     fetch_records(api, &token, &query).await
//! })
//! .await?;
//! println!("{} records", records.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fetch;
pub mod http;
pub mod session;
pub mod traits;

pub use error::{ClientError, Result};
pub use fetch::fetch_records;
pub use http::{ClientOptions, RemedyClient};
pub use session::{Session, with_session};
pub use traits::{CmdbApi, Credentials, Token};
