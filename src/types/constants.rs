/// Pusher protocol event strings (magic strings layer)
pub mod pusher_events {
    pub const SUBSCRIPTION_SUCCEEDED: &str = "pusher:subscription_succeeded";
    pub const SUBSCRIPTION_COUNT: &str = "pusher:subscription_count";
    pub const SUBSCRIPTION_ERROR: &str = "pusher:subscription_error";
}

/// Canonical internal event names the router classifies on
pub mod internal_events {
    pub const SUBSCRIPTION_SUCCEEDED: &str = "pusher_internal:subscription_succeeded";
    pub const SUBSCRIPTION_COUNT: &str = "pusher_internal:subscription_count";
    pub const MEMBER_ADDED: &str = "pusher_internal:member_added";
    pub const MEMBER_REMOVED: &str = "pusher_internal:member_removed";
}

/// Channel name prefixes
pub mod channel_prefixes {
    pub const PRIVATE: &str = "private-";
    pub const PRIVATE_ENCRYPTED: &str = "private-encrypted-";
    pub const PRESENCE: &str = "presence-";
}

/// Subscription error types reported alongside the message
pub mod error_types {
    pub const SUBSCRIPTION_ERROR: &str = "SubscriptionError";
    pub const AUTH_ERROR: &str = "AuthError";
}

/// Auth value handed to the transport when the application answered without `auth`
pub const MISSING_AUTH_SENTINEL: &str = "<missing_auth_param>:error";

/// Auth value handed to the transport when the application never answered
pub const AUTHORIZER_TIMEOUT_SENTINEL: &str = "<authorizer_timeout>:error";

/// Default authorizer timeout (seconds)
pub const DEFAULT_AUTHORIZER_TIMEOUT_SECS: u64 = 10;

/// Default cluster when neither cluster nor host is given
pub const DEFAULT_CLUSTER: &str = "mt1";
