// Module declarations
mod core;
mod hooks;
mod kind;
mod presence;
mod state;
mod store;

// Public API exports
pub use self::core::PusherChannel;
pub use hooks::{ChannelErrorCallback, ChannelHooks};
pub use kind::ChannelKind;
pub use presence::{
    MemberPayload, PresenceSnapshot, SubscriptionCountPayload, SubscriptionSucceededPayload,
};
pub use state::ChannelState;
pub use store::ChannelStore;
