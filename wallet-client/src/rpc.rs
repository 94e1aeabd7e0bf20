//! JSON-RPC envelope shared by the node and bundler clients.

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

use crate::error::WalletError;

/// JSON-RPC request wrapper
#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Vec<serde_json::Value>,
    id: u64,
}

/// JSON-RPC response wrapper
#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcResponse<T> {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    result: Option<T>,
    error: Option<JsonRpcError>,
    #[allow(dead_code)]
    id: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcError {
    code: i32,
    message: String,
}

/// Thin JSON-RPC caller over a single endpoint.
pub(crate) struct RpcCaller {
    client: Client,
    base_url: String,
}

impl RpcCaller {
    pub fn new(base_url: &str) -> Result<Self, WalletError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| WalletError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one request and returns the result, which may be JSON null.
    pub async fn call_optional<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<Option<T>, WalletError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        let response: JsonRpcResponse<T> = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                WalletError::Transport(format!(
                    "failed to send {method} request to {}: {e}",
                    self.base_url
                ))
            })?
            .json()
            .await
            .map_err(|e| {
                WalletError::Transport(format!(
                    "failed to parse {method} response from {}: {e}",
                    self.base_url
                ))
            })?;

        if let Some(error) = response.error {
            return Err(WalletError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result)
    }

    /// Sends one request, treating a missing result as a decode failure.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<T, WalletError> {
        self.call_optional(method, params)
            .await?
            .ok_or_else(|| WalletError::Decode(format!("no result in {method} response")))
    }
}
