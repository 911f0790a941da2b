// crates/edge/src/graphql.rs

//! CMS transport: reqwest-backed GraphQL client.

use std::time::Duration;

use async_trait::async_trait;
use domain::error::FetchError;
use reqwest::Client;
use serde_json::{json, Value as Json};
use serve::source::QueryClient;
use tracing::debug;

use crate::queries;

/// One client per process; reqwest pools connections internally.
#[derive(Clone)]
pub struct GraphqlClient {
    http: Client,
    endpoint: String,
}

impl GraphqlClient {
    /// `timeout` bounds the whole request. An elapsed bound surfaces as
    /// `FetchError::Timeout`, never as a generic network failure.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts a raw envelope and returns the upstream envelope untouched,
    /// GraphQL errors included. The in-app proxy route uses this; typed
    /// execution goes through [`QueryClient::execute`].
    pub async fn forward(&self, body: Json) -> Result<Json, FetchError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }
        response.json().await.map_err(classify)
    }
}

fn classify(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(error.to_string())
    }
}

#[async_trait]
impl QueryClient for GraphqlClient {
    async fn execute(&self, name: &str, variables: Json) -> Result<Json, FetchError> {
        let Some(document) = queries::document(name) else {
            return Err(FetchError::GraphQl(format!("unknown query: {name}")));
        };
        debug!(query = name, "executing CMS query");

        let envelope = self
            .forward(json!({ "query": document, "variables": variables }))
            .await?;

        if let Some(message) = first_error(&envelope) {
            return Err(FetchError::GraphQl(message));
        }
        match envelope.get("data") {
            Some(data) if !data.is_null() => Ok(data.clone()),
            _ => Err(FetchError::GraphQl("response carried no data".to_owned())),
        }
    }
}

fn first_error(envelope: &Json) -> Option<String> {
    envelope.get("errors")?.as_array()?.first().map(|e| {
        e.get("message")
            .and_then(Json::as_str)
            .unwrap_or("unnamed GraphQL error")
            .to_owned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_reads_the_leading_message() {
        let envelope = json!({
            "errors": [
                { "message": "Cannot query field \"posts\"" },
                { "message": "second" }
            ]
        });
        assert_eq!(
            first_error(&envelope),
            Some("Cannot query field \"posts\"".to_owned())
        );

        assert_eq!(first_error(&json!({ "data": {} })), None);
        // An empty errors array is not an error.
        assert_eq!(first_error(&json!({ "errors": [] })), None);
    }

    #[tokio::test]
    async fn unknown_query_names_fail_before_any_network_call() {
        let client = GraphqlClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = client
            .execute("drop_all_tables", Json::Null)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FetchError::GraphQl("unknown query: drop_all_tables".to_owned())
        );
    }
}
