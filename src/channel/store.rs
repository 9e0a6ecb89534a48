use super::{ChannelHooks, PusherChannel};
use crate::client::ClientInner;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Channel name -> channel record. At most one record per name.
pub struct ChannelStore {
    channels: RwLock<HashMap<String, Arc<PusherChannel>>>,
    client: Weak<ClientInner>,
}

impl ChannelStore {
    /// A store whose channels are not attached to any client.
    pub fn new() -> Self {
        Self::attached(Weak::new())
    }

    pub(crate) fn attached(client: Weak<ClientInner>) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            client,
        }
    }

    /// Returns the channel named `channel_name`, creating it with `hooks` if absent.
    ///
    /// The flag is `true` when this call created the record. `hooks` are ignored for an
    /// existing channel.
    pub fn ensure(&self, channel_name: &str, hooks: ChannelHooks) -> (Arc<PusherChannel>, bool) {
        if let Some(existing) = self.get(channel_name) {
            return (existing, false);
        }

        let mut channels = self.channels.write();
        if let Some(existing) = channels.get(channel_name) {
            return (Arc::clone(existing), false);
        }

        let channel = Arc::new(PusherChannel::new(
            channel_name.to_string(),
            hooks,
            self.client.clone(),
        ));
        channels.insert(channel_name.to_string(), Arc::clone(&channel));
        (channel, true)
    }

    pub fn get(&self, channel_name: &str) -> Option<Arc<PusherChannel>> {
        self.channels.read().get(channel_name).cloned()
    }

    pub fn remove(&self, channel_name: &str) -> Option<Arc<PusherChannel>> {
        self.channels.write().remove(channel_name)
    }

    /// Removes `channel` only if it is still the stored record for its name.
    pub(crate) fn remove_exact(&self, channel: &Arc<PusherChannel>) -> bool {
        let mut channels = self.channels.write();
        match channels.get(channel.name()) {
            Some(stored) if Arc::ptr_eq(stored, channel) => {
                channels.remove(channel.name());
                true
            }
            _ => false,
        }
    }

    /// Clears every channel, returning the removed records.
    pub fn reset(&self) -> Vec<Arc<PusherChannel>> {
        self.channels.write().drain().map(|(_, channel)| channel).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.channels.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.read().is_empty()
    }
}

impl Default for ChannelStore {
    fn default() -> Self {
        Self::new()
    }
}
