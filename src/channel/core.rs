use super::{ChannelHooks, ChannelKind, ChannelState};
use crate::client::{ClientInner, Pusher};
use crate::types::{Member, PusherError, PusherEvent, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Weak;

/// A subscribed channel and its locally tracked state.
///
/// Channels are created by [`Pusher::subscribe`] and live in the client's channel store until
/// unsubscribed or reset. Membership, `me` and the subscription count are maintained by the
/// event router; applications only read them.
///
/// # Example
///
/// ```no_run
/// use pusher_realtime_rs::{ChannelHooks, Pusher};
///
/// # async fn example(pusher: Pusher) -> Result<(), Box<dyn std::error::Error>> {
/// let channel = pusher
///     .subscribe(
///         "presence-room",
///         ChannelHooks::new().on_member_added(|m| println!("{} joined", m.user_id)),
///     )
///     .await?;
///
/// if let Some(me) = channel.me() {
///     println!("I am {}", me.user_id);
/// }
/// println!("{} members online", channel.members().len());
/// # Ok(())
/// # }
/// ```
pub struct PusherChannel {
    name: String,
    kind: ChannelKind,
    pub(crate) hooks: ChannelHooks,
    pub(crate) state: RwLock<ChannelState>,
    client: Weak<ClientInner>,
}

impl PusherChannel {
    pub(crate) fn new(name: String, hooks: ChannelHooks, client: Weak<ClientInner>) -> Self {
        Self {
            kind: ChannelKind::from_name(&name),
            name,
            hooks,
            state: RwLock::new(ChannelState::new()),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Snapshot of the current membership, keyed by user id.
    pub fn members(&self) -> HashMap<String, Member> {
        self.state.read().members.clone()
    }

    pub fn member(&self, user_id: &str) -> Option<Member> {
        self.state.read().members.get(user_id).cloned()
    }

    pub fn me(&self) -> Option<Member> {
        self.state.read().me.clone()
    }

    pub fn subscription_count(&self) -> Option<u64> {
        self.state.read().subscription_count
    }

    /// Unsubscribes this channel through the owning client.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::NotInitialized`] if the owning client is gone, or whatever
    /// [`Pusher::unsubscribe`] returns.
    pub async fn unsubscribe(&self) -> Result<()> {
        self.client()?.unsubscribe(&self.name).await
    }

    /// Triggers a client event on this channel through the owning client.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::ChannelMismatch`] if `event` names another channel, otherwise
    /// whatever [`Pusher::trigger`] returns.
    pub async fn trigger(&self, event: PusherEvent) -> Result<()> {
        if event.channel_name != self.name {
            return Err(PusherError::ChannelMismatch {
                channel_name: self.name.clone(),
                event_channel: event.channel_name,
            });
        }
        self.client()?.trigger(event).await
    }

    fn client(&self) -> Result<Pusher> {
        self.client
            .upgrade()
            .map(Pusher::from_inner)
            .ok_or(PusherError::NotInitialized)
    }
}

impl std::fmt::Debug for PusherChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PusherChannel")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("state", &*self.state.read())
            .finish()
    }
}
