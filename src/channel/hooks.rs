use crate::infrastructure::Callback;
use crate::types::{Member, PusherEvent};
use serde_json::Value;
use std::sync::Arc;

/// Subscription error callback: `(message, error_type)`.
pub type ChannelErrorCallback = Arc<dyn Fn(String, String) + Send + Sync + 'static>;

/// Per-channel callback overrides, dispatched after the global handlers.
///
/// # Example
///
/// ```
/// use pusher_realtime_rs::ChannelHooks;
///
/// let hooks = ChannelHooks::new()
///     .on_event(|event| println!("got {}", event.event_name))
///     .on_member_added(|member| println!("{} joined", member.user_id));
/// ```
#[derive(Clone, Default)]
pub struct ChannelHooks {
    pub(crate) on_subscription_succeeded: Option<Callback<Value>>,
    pub(crate) on_subscription_error: Option<ChannelErrorCallback>,
    pub(crate) on_subscription_count: Option<Callback<u64>>,
    pub(crate) on_event: Option<Callback<PusherEvent>>,
    pub(crate) on_member_added: Option<Callback<Member>>,
    pub(crate) on_member_removed: Option<Callback<Member>>,
}

impl ChannelHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_subscription_succeeded<F>(mut self, callback: F) -> Self
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.on_subscription_succeeded = Some(Arc::new(callback));
        self
    }

    pub fn on_subscription_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(String, String) + Send + Sync + 'static,
    {
        self.on_subscription_error = Some(Arc::new(callback));
        self
    }

    pub fn on_subscription_count<F>(mut self, callback: F) -> Self
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        self.on_subscription_count = Some(Arc::new(callback));
        self
    }

    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(PusherEvent) + Send + Sync + 'static,
    {
        self.on_event = Some(Arc::new(callback));
        self
    }

    pub fn on_member_added<F>(mut self, callback: F) -> Self
    where
        F: Fn(Member) + Send + Sync + 'static,
    {
        self.on_member_added = Some(Arc::new(callback));
        self
    }

    pub fn on_member_removed<F>(mut self, callback: F) -> Self
    where
        F: Fn(Member) + Send + Sync + 'static,
    {
        self.on_member_removed = Some(Arc::new(callback));
        self
    }
}

impl std::fmt::Debug for ChannelHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelHooks")
            .field(
                "on_subscription_succeeded",
                &self.on_subscription_succeeded.is_some(),
            )
            .field("on_subscription_error", &self.on_subscription_error.is_some())
            .field("on_subscription_count", &self.on_subscription_count.is_some())
            .field("on_event", &self.on_event.is_some())
            .field("on_member_added", &self.on_member_added.is_some())
            .field("on_member_removed", &self.on_member_removed.is_some())
            .finish()
    }
}
