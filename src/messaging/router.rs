use super::{InboundEvent, TransportEvent};
use crate::auth::{AuthorizerResult, CorrelationRegistry};
use crate::channel::{ChannelStore, SubscriptionCountPayload, SubscriptionSucceededPayload};
use crate::client::{ConnectionState, PusherHandlers};
use crate::infrastructure::dispatch;
use crate::types::{Member, PusherEvent};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Reduces inbound transport events against the channel store and dispatches callbacks.
///
/// Channel-scoped events naming a channel absent from the store are dropped without any
/// callback; subscription errors are the exception since the failing channel may be absent.
pub struct EventRouter {
    store: Arc<ChannelStore>,
    handlers: Arc<PusherHandlers>,
    connection: Arc<watch::Sender<ConnectionState>>,
    registry: Arc<CorrelationRegistry<AuthorizerResult>>,
}

impl EventRouter {
    pub fn new(
        store: Arc<ChannelStore>,
        handlers: Arc<PusherHandlers>,
        connection: Arc<watch::Sender<ConnectionState>>,
        registry: Arc<CorrelationRegistry<AuthorizerResult>>,
    ) -> Self {
        Self {
            store,
            handlers,
            connection,
            registry,
        }
    }

    /// Drains `events` until the transport side hangs up.
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<TransportEvent>) {
        tracing::info!("Starting event router");
        while let Some(event) = events.recv().await {
            self.route(event);
        }
        tracing::info!("Event router finished");
    }

    /// Routes a single event.
    pub fn route(&self, event: TransportEvent) {
        let event = match InboundEvent::classify(event) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Dropping unclassifiable transport event: {}", e);
                return;
            }
        };

        match event {
            InboundEvent::ConnectionStateChange { previous, current } => {
                self.handle_connection_state_change(previous, current)
            }
            InboundEvent::SubscriptionSucceeded {
                channel_name,
                data,
                user_id,
            } => self.handle_subscription_succeeded(channel_name, data, user_id),
            InboundEvent::SubscriptionCount { channel_name, data } => {
                self.handle_subscription_count(channel_name, data)
            }
            InboundEvent::MemberAdded {
                channel_name,
                member,
            } => self.handle_member_added(channel_name, member),
            InboundEvent::MemberRemoved {
                channel_name,
                member,
            } => self.handle_member_removed(channel_name, member),
            InboundEvent::DecryptionFailure { event_name, reason } => {
                self.handle_decryption_failure(event_name, reason)
            }
            InboundEvent::SubscriptionError {
                channel_name,
                message,
                error_type,
            } => self.handle_subscription_error(channel_name, message, error_type),
            InboundEvent::TransportError {
                message,
                code,
                error,
            } => self.handle_transport_error(message, code, error),
            InboundEvent::Application(event) => self.handle_application_event(event),
        }
    }

    fn handle_connection_state_change(&self, previous: ConnectionState, current: ConnectionState) {
        self.connection.send_replace(current);
        tracing::info!("Connection state changed: {} -> {}", previous, current);

        // Pending authorizations were keyed on a socket id that no longer exists
        if current == ConnectionState::Disconnected {
            let expired = self.registry.expire_all();
            if expired > 0 {
                tracing::info!(
                    "Expired {} pending authorization(s) after disconnect",
                    expired
                );
            }
        }

        if let Some(callback) = &self.handlers.on_connection_state_change {
            dispatch("on_connection_state_change", || callback(previous, current));
        }
    }

    fn handle_subscription_succeeded(
        &self,
        channel_name: String,
        data: Value,
        user_id: Option<String>,
    ) {
        let Some(channel) = self.store.get(&channel_name) else {
            tracing::debug!(
                "Dropping subscription_succeeded for unknown channel: {}",
                channel_name
            );
            return;
        };

        let data = if channel.kind().is_presence() {
            match serde_json::from_value::<SubscriptionSucceededPayload>(data.clone()) {
                Ok(SubscriptionSucceededPayload {
                    presence: Some(snapshot),
                }) => {
                    let applied = channel
                        .state
                        .write()
                        .apply_presence_snapshot(snapshot, user_id.as_deref());
                    tracing::debug!("Applied {} member(s) on {}", applied, channel_name);
                }
                Ok(_) => {
                    tracing::warn!(
                        "Presence subscription on {} succeeded without member data",
                        channel_name
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to decode presence payload on {}: {}",
                        channel_name,
                        e
                    );
                }
            }
            data
        } else {
            // Only presence channels carry member data
            Value::Object(Default::default())
        };

        tracing::info!("Subscription succeeded: {}", channel_name);

        if let Some(callback) = &self.handlers.on_subscription_succeeded {
            dispatch("on_subscription_succeeded", || {
                callback(channel_name.clone(), data.clone())
            });
        }
        if let Some(callback) = &channel.hooks.on_subscription_succeeded {
            dispatch("channel.on_subscription_succeeded", || callback(data));
        }
    }

    fn handle_subscription_count(&self, channel_name: String, data: Value) {
        let Some(channel) = self.store.get(&channel_name) else {
            tracing::debug!(
                "Dropping subscription_count for unknown channel: {}",
                channel_name
            );
            return;
        };

        let count = match serde_json::from_value::<SubscriptionCountPayload>(data) {
            Ok(payload) => payload.subscription_count,
            Err(e) => {
                tracing::warn!(
                    "Failed to decode subscription_count on {}: {}",
                    channel_name,
                    e
                );
                return;
            }
        };

        channel.state.write().subscription_count = Some(count);

        if let Some(callback) = &self.handlers.on_subscription_count {
            dispatch("on_subscription_count", || {
                callback(channel_name.clone(), count)
            });
        }
        if let Some(callback) = &channel.hooks.on_subscription_count {
            dispatch("channel.on_subscription_count", || callback(count));
        }
    }

    fn handle_member_added(&self, channel_name: String, member: Member) {
        let Some(channel) = self.store.get(&channel_name) else {
            tracing::debug!("Dropping member_added for unknown channel: {}", channel_name);
            return;
        };
        if !channel.kind().is_presence() {
            tracing::warn!(
                "Ignoring member_added on non-presence channel {}",
                channel_name
            );
            return;
        }

        channel.state.write().upsert_member(member.clone());
        tracing::debug!("Member {} added to {}", member.user_id, channel_name);

        if let Some(callback) = &self.handlers.on_member_added {
            dispatch("on_member_added", || {
                callback(channel_name.clone(), member.clone())
            });
        }
        if let Some(callback) = &channel.hooks.on_member_added {
            dispatch("channel.on_member_added", || callback(member));
        }
    }

    fn handle_member_removed(&self, channel_name: String, member: Member) {
        let Some(channel) = self.store.get(&channel_name) else {
            tracing::debug!(
                "Dropping member_removed for unknown channel: {}",
                channel_name
            );
            return;
        };
        if !channel.kind().is_presence() {
            tracing::warn!(
                "Ignoring member_removed on non-presence channel {}",
                channel_name
            );
            return;
        }

        // May arrive before the matching add; removing an absent member is a no-op
        if channel.state.write().remove_member(&member.user_id).is_none() {
            tracing::debug!(
                "Member {} was not present on {}",
                member.user_id,
                channel_name
            );
        }

        if let Some(callback) = &self.handlers.on_member_removed {
            dispatch("on_member_removed", || {
                callback(channel_name.clone(), member.clone())
            });
        }
        if let Some(callback) = &channel.hooks.on_member_removed {
            dispatch("channel.on_member_removed", || callback(member));
        }
    }

    fn handle_decryption_failure(&self, event_name: String, reason: String) {
        tracing::warn!("Decryption failed for {}: {}", event_name, reason);

        if let Some(callback) = &self.handlers.on_decryption_failure {
            dispatch("on_decryption_failure", || callback(event_name, reason));
        }
    }

    fn handle_subscription_error(&self, channel_name: String, message: String, error_type: String) {
        tracing::warn!(
            "Subscription error on {} ({}): {}",
            channel_name,
            error_type,
            message
        );

        if let Some(callback) = &self.handlers.on_subscription_error {
            dispatch("on_subscription_error", || {
                callback(channel_name.clone(), message.clone(), error_type.clone())
            });
        }
        let Some(channel) = self.store.get(&channel_name) else {
            return;
        };
        if let Some(callback) = &channel.hooks.on_subscription_error {
            dispatch("channel.on_subscription_error", || {
                callback(message, error_type)
            });
        }

        // A failed channel must not satisfy the next subscribe for the same name
        if self.store.remove_exact(&channel) {
            tracing::debug!("Removed failed channel {}", channel_name);
        }
    }

    fn handle_transport_error(&self, message: String, code: Option<i64>, error: String) {
        tracing::error!("Transport error (code {:?}): {} {}", code, message, error);

        if let Some(callback) = &self.handlers.on_error {
            dispatch("on_error", || callback(message, code, error));
        }
    }

    fn handle_application_event(&self, event: PusherEvent) {
        let Some(channel) = self.store.get(&event.channel_name) else {
            tracing::debug!(
                "Dropping event {} for unknown channel: {}",
                event.event_name,
                event.channel_name
            );
            return;
        };

        tracing::debug!(
            "Routing event {} on channel {}",
            event.event_name,
            event.channel_name
        );

        if let Some(callback) = &self.handlers.on_event {
            dispatch("on_event", || callback(event.clone()));
        }
        if let Some(callback) = &channel.hooks.on_event {
            dispatch("channel.on_event", || callback(event));
        }
    }
}
