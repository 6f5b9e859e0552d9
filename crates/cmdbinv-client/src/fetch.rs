//! Record fetching

use cmdbinv_core::{QuerySpec, Record};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::{ClientError, Result};
use crate::traits::{CmdbApi, Token};

#[derive(Deserialize)]
struct SearchResponse {
    entries: Vec<Entry>,
}

#[derive(Deserialize)]
struct Entry {
    values: Record,
}

/// Parse a search response body into records.
///
/// # Errors
/// Returns `ClientError::InvalidResponse` if the body is not JSON or lacks the
/// `entries[].values` structure.
pub fn parse_search_response(body: &str) -> Result<Vec<Record>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| ClientError::InvalidResponse(format!("search response: {e}")))?;

    Ok(response.entries.into_iter().map(|e| e.values).collect())
}

/// Fetch every record matching the query in a single request.
///
/// # Errors
/// Returns a transport error if the request fails and a parse error if the
/// response is malformed.
#[instrument(skip_all)]
pub async fn fetch_records<A>(api: &A, token: &Token, query: &QuerySpec) -> Result<Vec<Record>>
where
    A: CmdbApi + ?Sized,
{
    let records = api.search(token, query).await?;
    info!(count = records.len(), "fetched records");
    Ok(records)
}
