//! Grants Client: the single point of entry for grants-database searches.
//!
//! The response body is passed through untouched; callers treat it as opaque JSON.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Public Grants.gov search endpoint, used when `GRANTS_API_URL` is not set.
pub const DEFAULT_GRANTS_API_URL: &str = "https://api.grants.gov/v1/api/search2";
/// Opportunity statuses worth reporting on: upcoming and open.
const OPEN_STATUSES: &str = "forecasted|posted";
const DEFAULT_ROWS: u32 = 25;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum GrantsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantsQuery {
    pub keyword: String,
    pub rows: u32,
    pub opp_statuses: String,
}

impl GrantsQuery {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            rows: DEFAULT_ROWS,
            opp_statuses: OPEN_STATUSES.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct GrantsClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl GrantsClient {
    pub fn new(url: String, api_key: Option<String>) -> Result<Self, GrantsError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            url,
            api_key,
        })
    }

    pub async fn search(&self, query: &GrantsQuery) -> Result<Value, GrantsError> {
        let mut request = self.client.post(&self.url).json(query);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GrantsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        debug!("Grants search for {:?} succeeded", query.keyword);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_serializes_camel_case() {
        let query = GrantsQuery::keyword("food security");
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["keyword"], "food security");
        assert_eq!(value["rows"], 25);
        assert_eq!(value["oppStatuses"], "forecasted|posted");
    }
}
