use super::ConnectionState;
use crate::auth::AuthorizerResult;
use crate::infrastructure::Callback;
use crate::types::{Member, PusherEvent};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Application authorizer: `(channel_name, socket_id)` -> credentials.
///
/// Returning `None` rejects the request; the subscription then fails.
pub type AuthorizerCallback =
    Arc<dyn Fn(String, String) -> BoxFuture<'static, Option<AuthorizerResult>> + Send + Sync>;

type ChannelCallback<T> = Arc<dyn Fn(String, T) + Send + Sync + 'static>;

/// Global callbacks passed to [`Pusher::init`](super::Pusher::init).
///
/// Every callback is optional. Channel-scoped callbacks receive the channel name first and run
/// before the channel's own [`ChannelHooks`](crate::ChannelHooks).
#[derive(Clone, Default)]
pub struct PusherHandlers {
    pub(crate) on_connection_state_change:
        Option<Arc<dyn Fn(ConnectionState, ConnectionState) + Send + Sync>>,
    pub(crate) on_authorizer: Option<AuthorizerCallback>,
    pub(crate) on_error: Option<Arc<dyn Fn(String, Option<i64>, String) + Send + Sync>>,
    pub(crate) on_event: Option<Callback<PusherEvent>>,
    pub(crate) on_subscription_succeeded: Option<ChannelCallback<Value>>,
    pub(crate) on_subscription_error: Option<Arc<dyn Fn(String, String, String) + Send + Sync>>,
    pub(crate) on_subscription_count: Option<ChannelCallback<u64>>,
    pub(crate) on_decryption_failure: Option<Arc<dyn Fn(String, String) + Send + Sync>>,
    pub(crate) on_member_added: Option<ChannelCallback<Member>>,
    pub(crate) on_member_removed: Option<ChannelCallback<Member>>,
}

impl PusherHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with `(previous, current)` on every connection state change.
    pub fn on_connection_state_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(ConnectionState, ConnectionState) + Send + Sync + 'static,
    {
        self.on_connection_state_change = Some(Arc::new(callback));
        self
    }

    /// Installs the application authorizer used for private, presence and encrypted channels.
    ///
    /// Mutually exclusive with [`PusherOptions::auth_endpoint`](super::PusherOptions).
    pub fn on_authorizer<F, Fut>(mut self, callback: F) -> Self
    where
        F: Fn(String, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<AuthorizerResult>> + Send + 'static,
    {
        self.on_authorizer = Some(Arc::new(move |channel_name: String, socket_id: String| {
            callback(channel_name, socket_id).boxed()
        }));
        self
    }

    /// Called with `(message, code, error)` for connection-level errors.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(String, Option<i64>, String) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(PusherEvent) + Send + Sync + 'static,
    {
        self.on_event = Some(Arc::new(callback));
        self
    }

    pub fn on_subscription_succeeded<F>(mut self, callback: F) -> Self
    where
        F: Fn(String, Value) + Send + Sync + 'static,
    {
        self.on_subscription_succeeded = Some(Arc::new(callback));
        self
    }

    /// Called with `(channel_name, message, error_type)`.
    pub fn on_subscription_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(String, String, String) + Send + Sync + 'static,
    {
        self.on_subscription_error = Some(Arc::new(callback));
        self
    }

    pub fn on_subscription_count<F>(mut self, callback: F) -> Self
    where
        F: Fn(String, u64) + Send + Sync + 'static,
    {
        self.on_subscription_count = Some(Arc::new(callback));
        self
    }

    /// Called with `(event_name, reason)`.
    pub fn on_decryption_failure<F>(mut self, callback: F) -> Self
    where
        F: Fn(String, String) + Send + Sync + 'static,
    {
        self.on_decryption_failure = Some(Arc::new(callback));
        self
    }

    pub fn on_member_added<F>(mut self, callback: F) -> Self
    where
        F: Fn(String, Member) + Send + Sync + 'static,
    {
        self.on_member_added = Some(Arc::new(callback));
        self
    }

    pub fn on_member_removed<F>(mut self, callback: F) -> Self
    where
        F: Fn(String, Member) + Send + Sync + 'static,
    {
        self.on_member_removed = Some(Arc::new(callback));
        self
    }

    pub fn has_authorizer(&self) -> bool {
        self.on_authorizer.is_some()
    }
}

impl std::fmt::Debug for PusherHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PusherHandlers")
            .field("on_authorizer", &self.on_authorizer.is_some())
            .field("on_event", &self.on_event.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}
