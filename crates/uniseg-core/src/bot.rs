//! Bot handle seam.
//!
//! A bot is the live platform handle that performs API calls. The universal
//! layer only needs its identity; concrete adapters expose strongly-typed
//! send methods on their own bot types.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiResult;
use crate::target::SupportAdapter;

/// The core Bot trait.
///
/// Concrete implementations (e.g. `OpqBot`) provide strongly-typed API
/// methods on top of [`call_api`](Bot::call_api).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Returns the bot's own account id.
    fn self_id(&self) -> &str;

    /// Returns the adapter this bot belongs to.
    fn adapter(&self) -> SupportAdapter;

    /// Calls a raw platform API with the given action name and parameters.
    async fn call_api(&self, action: &str, params: Value) -> ApiResult<Value>;

    /// Returns self as an `Arc<dyn Any>` for safe downcasting.
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// A boxed Bot trait object.
pub type BoxedBot = Arc<dyn Bot>;

/// Attempts to downcast a [`BoxedBot`] to a specific concrete type.
pub fn downcast_bot<T: Bot + 'static>(bot: BoxedBot) -> Option<Arc<T>> {
    Arc::downcast::<T>(bot.as_any()).ok()
}
