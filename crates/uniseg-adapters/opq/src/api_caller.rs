//! Host-supplied API call mechanisms for OPQ.
//!
//! # Overview
//!
//! The adapter does not own a network transport. [`OpqBot`](crate::bot::OpqBot)
//! holds an `Arc<dyn ApiCaller>` supplied by the host and is unaware of how
//! requests actually reach the OPQ instance.
//!
//! | Caller | Strategy |
//! |--------|----------|
//! | [`HttpApiCaller`] | Delegates to a host closure that POSTs the request body and returns the response body. |
//! | [`DisabledApiCaller`] | Rejects every call; for receive-only connections. |

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::{Value, json};
use tracing::debug;

use uniseg_core::{ApiError, ApiResult};

// =============================================================================
// ApiCaller trait
// =============================================================================

/// Transport-specific API call mechanism.
#[async_trait]
pub trait ApiCaller: Send + Sync {
    /// Makes an API call and returns the raw response.
    ///
    /// # Arguments
    /// * `action` – Action name (e.g. `"send_group_msg"`).
    /// * `params` – JSON parameters for the action.
    ///
    /// # Errors
    /// Returns an [`ApiError`] if the call fails or the connection is lost.
    async fn call(&self, _action: &str, _params: Value) -> ApiResult<Value> {
        Err(ApiError::NotSupported)
    }
}

// =============================================================================
// DisabledApiCaller
// =============================================================================

/// [`ApiCaller`] for connections that cannot issue API calls.
pub struct DisabledApiCaller;

impl DisabledApiCaller {
    /// Creates a new disabled caller.
    pub fn new() -> Self {
        Self
    }
}

impl Default for DisabledApiCaller {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiCaller for DisabledApiCaller {}

// =============================================================================
// HttpApiCaller
// =============================================================================

/// Host closure that POSTs a JSON body and yields the JSON response.
///
/// The closure captures the endpoint URL and any authentication.
pub type PostJsonFn =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, String>> + Send + Sync>;

/// [`ApiCaller`] that forwards every call to a [`PostJsonFn`].
pub struct HttpApiCaller {
    post_json: PostJsonFn,
}

impl HttpApiCaller {
    /// Creates a new `HttpApiCaller`.
    pub fn new(post_json: PostJsonFn) -> Self {
        Self { post_json }
    }
}

#[async_trait]
impl ApiCaller for HttpApiCaller {
    async fn call(&self, action: &str, params: Value) -> ApiResult<Value> {
        let body = json!({
            "action": action,
            "params": params,
        });

        debug!(action = %action, "Calling OPQ API via HTTP");

        (self.post_json)(body)
            .await
            .map_err(|e| ApiError::Transport(format!("HTTP request failed: {e}")))
    }
}
