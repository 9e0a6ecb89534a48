use thiserror::Error;

/// Errors that can occur when using the Pusher Channels client.
#[derive(Error, Debug)]
pub enum PusherError {
    /// Bad or missing `init` arguments
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// `init` called twice without an intervening `reset`
    #[error("Pusher Channels already initialized")]
    AlreadyInitialized,

    /// Operation attempted before `init`
    #[error("Pusher Channels not initialized")]
    NotInitialized,

    /// Trigger on a channel kind that cannot carry client events
    #[error("Cannot trigger on channel '{channel_name}': client events are only for private and presence channels")]
    InvalidChannelKind { channel_name: String },

    /// Event handed to a channel it does not belong to
    #[error("Event for channel '{event_channel}' cannot be triggered on channel '{channel_name}'")]
    ChannelMismatch {
        channel_name: String,
        event_channel: String,
    },

    /// The transport rejected a subscription
    #[error("Subscription error on channel '{channel_name}': {message}")]
    Subscription {
        channel_name: String,
        message: String,
    },

    /// The application never answered an authorization request
    #[error("Authorization for channel '{channel_name}' timed out")]
    AuthorizationTimeout { channel_name: String },

    /// The authorizer refused or returned an unusable answer
    #[error("Authorization for channel '{channel_name}' rejected: {reason}")]
    AuthorizationRejected {
        channel_name: String,
        reason: String,
    },

    /// A correlation key is already pending
    #[error("Correlation key already pending: {0}")]
    DuplicateKey(String),

    /// An encrypted event could not be decrypted
    #[error("Failed to decrypt event '{event_name}': {reason}")]
    DecryptionFailure { event_name: String, reason: String },

    /// Connection-level failure reported by the transport
    #[error("Transport error: {0}")]
    Transport(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing error (malformed auth endpoint)
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// HTTP request error (endpoint authorizer)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience type alias for `Result<T, PusherError>`.
pub type Result<T> = std::result::Result<T, PusherError>;
