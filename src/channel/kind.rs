use crate::types::channel_prefixes;

/// Channel type, derived from the channel name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Public,
    Private,
    PrivateEncrypted,
    Presence,
}

impl ChannelKind {
    pub fn from_name(channel_name: &str) -> Self {
        // "private-encrypted-" also starts with "private-", so it must be checked first
        if channel_name.starts_with(channel_prefixes::PRIVATE_ENCRYPTED) {
            Self::PrivateEncrypted
        } else if channel_name.starts_with(channel_prefixes::PRIVATE) {
            Self::Private
        } else if channel_name.starts_with(channel_prefixes::PRESENCE) {
            Self::Presence
        } else {
            Self::Public
        }
    }

    pub fn is_presence(self) -> bool {
        self == Self::Presence
    }

    pub fn requires_authorization(self) -> bool {
        self != Self::Public
    }

    /// Whether clients may trigger events on this kind of channel.
    pub fn accepts_client_events(self) -> bool {
        matches!(self, Self::Private | Self::Presence)
    }
}
