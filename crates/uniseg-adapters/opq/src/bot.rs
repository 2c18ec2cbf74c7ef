//! OPQ Bot implementation.
//!
//! `OpqBot` wraps a host-supplied [`ApiCaller`] and exposes the send
//! operations the exporter dispatches to.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use uniseg_adapter_opq::{HttpApiCaller, OpqBot, OpqMessage};
//!
//! let bot = OpqBot::new("10000", Arc::new(HttpApiCaller::new(post_json)));
//! bot.send_group_msg(1001, &OpqMessage::from("Hello!"), Default::default())
//!     .await?;
//! ```

use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tokio::time::{Duration, timeout};
use tracing::{debug, trace};

use uniseg_core::{ApiError, ApiResult, Bot, Event, SendOptions, SupportAdapter};

use crate::api_caller::ApiCaller;
use crate::model::message::OpqMessage;

/// Default API call timeout.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// OpqBot
// =============================================================================

/// An OPQ bot handle.
pub struct OpqBot {
    /// Bot account id.
    self_id: String,
    /// Host transport.
    caller: Arc<dyn ApiCaller>,
    /// API call timeout duration.
    api_timeout: Duration,
}

impl OpqBot {
    /// Creates a new OpqBot with the default timeout.
    pub fn new(self_id: impl Into<String>, caller: Arc<dyn ApiCaller>) -> Self {
        Self {
            self_id: self_id.into(),
            caller,
            api_timeout: DEFAULT_API_TIMEOUT,
        }
    }

    /// Sets the API call timeout.
    pub fn with_timeout(mut self, api_timeout: Duration) -> Self {
        self.api_timeout = api_timeout;
        self
    }

    /// Returns the API call timeout.
    pub fn api_timeout(&self) -> Duration {
        self.api_timeout
    }

    // =========================================================================
    // Message APIs
    // =========================================================================

    /// Sends a message to a group.
    pub async fn send_group_msg(
        &self,
        group_id: i64,
        message: &OpqMessage,
        options: SendOptions,
    ) -> ApiResult<Value> {
        let params = merge_options(
            json!({
                "group_id": group_id,
                "message": message,
            }),
            options,
        );
        self.call_api("send_group_msg", params).await
    }

    /// Sends a message to a friend.
    pub async fn send_private_msg(
        &self,
        user_id: i64,
        message: &OpqMessage,
        options: SendOptions,
    ) -> ApiResult<Value> {
        let params = merge_options(
            json!({
                "user_id": user_id,
                "message": message,
            }),
            options,
        );
        self.call_api("send_private_msg", params).await
    }

    /// Uploads a local file to a group.
    pub async fn upload_group_file(
        &self,
        group_id: i64,
        filename: &str,
        file: &Path,
        options: SendOptions,
    ) -> ApiResult<Value> {
        let params = merge_options(
            json!({
                "group_id": group_id,
                "filename": filename,
                "file": file.to_string_lossy(),
            }),
            options,
        );
        self.call_api("upload_group_file", params).await
    }

    /// Replies to the conversation an event came from.
    ///
    /// Sends to the group if the event has a group id, otherwise to the
    /// sender.
    pub async fn send(
        &self,
        event: &dyn Event,
        message: &OpqMessage,
        options: SendOptions,
    ) -> ApiResult<Value> {
        if let Some(group_id) = event.group_id() {
            let group_id = parse_session_id("group_id", &group_id)?;
            return self.send_group_msg(group_id, message, options).await;
        }
        if let Some(user_id) = event.user_id() {
            let user_id = parse_session_id("user_id", &user_id)?;
            return self.send_private_msg(user_id, message, options).await;
        }
        Err(ApiError::MissingSession(
            "event has neither group_id nor user_id".to_string(),
        ))
    }
}

/// Adds caller options to the request params. Keys already set by the
/// request take precedence.
fn merge_options(base: Value, options: SendOptions) -> Value {
    let mut params = match base {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (key, value) in options {
        params.entry(key).or_insert(value);
    }
    Value::Object(params)
}

fn parse_session_id(field: &str, value: &str) -> ApiResult<i64> {
    value
        .parse()
        .map_err(|_| ApiError::MissingSession(format!("non-numeric {field} `{value}`")))
}

// =============================================================================
// Bot Trait Implementation
// =============================================================================

#[async_trait]
impl Bot for OpqBot {
    fn self_id(&self) -> &str {
        &self.self_id
    }

    fn adapter(&self) -> SupportAdapter {
        SupportAdapter::Opq
    }

    async fn call_api(&self, action: &str, params: Value) -> ApiResult<Value> {
        debug!(action = %action, bot = %self.self_id, "Calling OPQ API");
        trace!(params = %params, "API request");

        let response = match timeout(self.api_timeout, self.caller.call(action, params)).await {
            Ok(result) => result?,
            Err(_) => return Err(ApiError::Timeout),
        };

        trace!(response = %response, "API response");

        // Check for API error
        if let Some(base) = response.get("CgiBaseResponse")
            && let Some(ret) = base.get("Ret").and_then(Value::as_i64)
            && ret != 0
        {
            let message = base
                .get("ErrMsg")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string();
            return Err(ApiError::Api {
                retcode: ret,
                message,
            });
        }

        // Return the response data if present, otherwise the whole response
        Ok(response
            .get("ResponseData")
            .filter(|data| !data.is_null())
            .cloned()
            .unwrap_or(response))
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::event::MessageEvent;
    use crate::testing::RecordingCaller;

    fn bot_with(caller: &Arc<RecordingCaller>) -> OpqBot {
        OpqBot::new("10000", Arc::clone(caller) as Arc<dyn ApiCaller>)
    }

    #[tokio::test]
    async fn test_send_group_msg_params() {
        let caller = Arc::new(RecordingCaller::new());
        let bot = bot_with(&caller);

        let mut options = SendOptions::new();
        options.insert("group_id".into(), json!(1));
        options.insert("extra".into(), json!(true));

        bot.send_group_msg(1001, &OpqMessage::from("hi"), options)
            .await
            .unwrap();

        let calls = caller.calls();
        assert_eq!(calls.len(), 1);
        let (action, params) = &calls[0];
        assert_eq!(action, "send_group_msg");
        assert_eq!(params["group_id"], 1001);
        assert_eq!(params["extra"], true);
        assert_eq!(params["message"][0]["data"]["text"], "hi");
    }

    #[tokio::test]
    async fn test_send_uses_event_session() {
        let caller = Arc::new(RecordingCaller::new());
        let bot = bot_with(&caller);

        let private = MessageEvent {
            self_id: 10000,
            user_id: Some(42),
            ..Default::default()
        };
        bot.send(&private, &OpqMessage::from("hi"), SendOptions::new())
            .await
            .unwrap();
        assert_eq!(caller.calls()[0].0, "send_private_msg");

        let empty = MessageEvent::default();
        let err = bot
            .send(&empty, &OpqMessage::from("hi"), SendOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingSession(_)));
        assert_eq!(caller.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_call_api_checks_ret() {
        let caller = Arc::new(RecordingCaller::responding(json!({
            "CgiBaseResponse": {"Ret": 34, "ErrMsg": "denied"},
            "ResponseData": null
        })));
        let err = bot_with(&caller)
            .call_api("send_group_msg", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Api { retcode: 34, ref message } if message == "denied"));
    }

    #[tokio::test]
    async fn test_call_api_unwraps_response_data() {
        let caller = Arc::new(RecordingCaller::responding(json!({
            "CgiBaseResponse": {"Ret": 0, "ErrMsg": ""},
            "ResponseData": {"MsgSeq": 9}
        })));
        let data = bot_with(&caller)
            .call_api("send_group_msg", json!({}))
            .await
            .unwrap();
        assert_eq!(data, json!({"MsgSeq": 9}));
    }

    #[tokio::test]
    async fn test_call_api_timeout() {
        struct Stalled;

        #[async_trait]
        impl ApiCaller for Stalled {
            async fn call(&self, _action: &str, _params: Value) -> ApiResult<Value> {
                futures::future::pending().await
            }
        }

        let bot = OpqBot::new("10000", Arc::new(Stalled)).with_timeout(Duration::from_millis(10));
        let err = bot.call_api("send_group_msg", json!({})).await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout));
    }
}
