//! Remote fetch collaborator
//!
//! Remote tables never talk to the network themselves. They describe each
//! request as a [`RemoteRequest`] and hand it to a [`RemoteFetcher`], which
//! owns transport, retries and decoding of the HTTP body into JSON.

use async_trait::async_trait;
use serde_json::Value;

use crate::DataError;

/// Endpoints exposed by a remote table server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    GetFilteredRows,
    GetAllValues,
    GetNumericSpec,
}

impl RemoteOperation {
    /// Path segment appended to the connector URL
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteOperation::GetFilteredRows => "get_filtered_rows",
            RemoteOperation::GetAllValues => "get_all_values",
            RemoteOperation::GetNumericSpec => "get_numeric_spec",
        }
    }
}

/// A single request against a remote table
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub operation: RemoteOperation,
    /// `{base_url}/{operation}`
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl RemoteRequest {
    pub fn new(base_url: &str, operation: RemoteOperation) -> Self {
        Self {
            operation,
            url: format!("{}/{}", base_url.trim_end_matches('/'), operation.as_str()),
            headers: Vec::new(),
            query: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Look up a header value by name (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a query parameter by name
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Performs remote requests and returns the decoded JSON body
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    async fn fetch(&self, request: RemoteRequest) -> Result<Value, DataError>;
}
