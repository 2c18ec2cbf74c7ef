//! Test doubles shared by the adapter's unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use uniseg_core::ApiResult;

use crate::api_caller::ApiCaller;

/// An [`ApiCaller`] that records every call and answers with a fixed body.
pub(crate) struct RecordingCaller {
    calls: Mutex<Vec<(String, Value)>>,
    response: Value,
}

impl RecordingCaller {
    pub(crate) fn new() -> Self {
        Self::responding(json!({
            "CgiBaseResponse": {"Ret": 0, "ErrMsg": ""},
            "ResponseData": {"MsgSeq": 1, "MsgTime": 1700000000}
        }))
    }

    pub(crate) fn responding(response: Value) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            response,
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiCaller for RecordingCaller {
    async fn call(&self, action: &str, params: Value) -> ApiResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((action.to_string(), params));
        Ok(self.response.clone())
    }
}

/// A `tracing` layer that counts WARN events.
#[derive(Debug, Clone, Default)]
pub(crate) struct WarnCounter(Arc<AtomicUsize>);

impl WarnCounter {
    pub(crate) fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}
