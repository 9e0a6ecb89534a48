use crate::channel::MemberPayload;
use crate::client::ConnectionState;
use crate::types::constants::{error_types, internal_events, pusher_events};
use crate::types::{Member, PusherEvent, Result};
use serde_json::Value;

/// Raw inbound event, as delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    ConnectionStateChange {
        previous_state: String,
        current_state: String,
    },
    /// Any channel event, including protocol-internal ones
    Event {
        channel_name: String,
        event_name: String,
        data: Value,
        user_id: Option<String>,
    },
    MemberAdded {
        channel_name: String,
        user: Member,
    },
    MemberRemoved {
        channel_name: String,
        user: Member,
    },
    SubscriptionError {
        channel_name: String,
        message: String,
        error_type: String,
    },
    DecryptionFailure {
        event_name: String,
        reason: String,
    },
    Error {
        message: String,
        code: Option<i64>,
        error: String,
    },
}

/// Inbound event after name normalization and classification.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    ConnectionStateChange {
        previous: ConnectionState,
        current: ConnectionState,
    },
    SubscriptionSucceeded {
        channel_name: String,
        data: Value,
        user_id: Option<String>,
    },
    SubscriptionCount {
        channel_name: String,
        data: Value,
    },
    MemberAdded {
        channel_name: String,
        member: Member,
    },
    MemberRemoved {
        channel_name: String,
        member: Member,
    },
    DecryptionFailure {
        event_name: String,
        reason: String,
    },
    SubscriptionError {
        channel_name: String,
        message: String,
        error_type: String,
    },
    TransportError {
        message: String,
        code: Option<i64>,
        error: String,
    },
    Application(PusherEvent),
}

impl InboundEvent {
    /// Classifies a raw transport event.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown connection state or an undecodable raw-named member
    /// event.
    pub fn classify(event: TransportEvent) -> Result<Self> {
        let classified = match event {
            TransportEvent::ConnectionStateChange {
                previous_state,
                current_state,
            } => Self::ConnectionStateChange {
                previous: previous_state.parse()?,
                current: current_state.parse()?,
            },
            TransportEvent::Event {
                channel_name,
                event_name,
                data,
                user_id,
            } => Self::classify_channel_event(channel_name, event_name, data, user_id)?,
            TransportEvent::MemberAdded { channel_name, user } => Self::MemberAdded {
                channel_name,
                member: user,
            },
            TransportEvent::MemberRemoved { channel_name, user } => Self::MemberRemoved {
                channel_name,
                member: user,
            },
            TransportEvent::SubscriptionError {
                channel_name,
                message,
                error_type,
            } => Self::SubscriptionError {
                channel_name,
                message,
                error_type,
            },
            TransportEvent::DecryptionFailure { event_name, reason } => {
                Self::DecryptionFailure { event_name, reason }
            }
            TransportEvent::Error {
                message,
                code,
                error,
            } => Self::TransportError {
                message,
                code,
                error,
            },
        };
        Ok(classified)
    }

    fn classify_channel_event(
        channel_name: String,
        event_name: String,
        data: Value,
        user_id: Option<String>,
    ) -> Result<Self> {
        let classified = match normalize_event_name(&event_name) {
            internal_events::SUBSCRIPTION_SUCCEEDED => Self::SubscriptionSucceeded {
                channel_name,
                data: decode_payload(data),
                user_id,
            },
            internal_events::SUBSCRIPTION_COUNT => Self::SubscriptionCount {
                channel_name,
                data: decode_payload(data),
            },
            internal_events::MEMBER_ADDED => Self::MemberAdded {
                channel_name,
                member: decode_member(data)?,
            },
            internal_events::MEMBER_REMOVED => Self::MemberRemoved {
                channel_name,
                member: decode_member(data)?,
            },
            pusher_events::SUBSCRIPTION_ERROR => {
                let data = decode_payload(data);
                Self::SubscriptionError {
                    channel_name,
                    message: subscription_error_message(&data),
                    error_type: error_types::SUBSCRIPTION_ERROR.to_string(),
                }
            }
            _ => Self::Application(PusherEvent {
                channel_name,
                event_name,
                data,
                user_id,
            }),
        };
        Ok(classified)
    }

    /// Channel the event is scoped to, if any.
    pub fn channel_name(&self) -> Option<&str> {
        match self {
            Self::SubscriptionSucceeded { channel_name, .. }
            | Self::SubscriptionCount { channel_name, .. }
            | Self::MemberAdded { channel_name, .. }
            | Self::MemberRemoved { channel_name, .. }
            | Self::SubscriptionError { channel_name, .. } => Some(channel_name),
            Self::Application(event) => Some(&event.channel_name),
            Self::ConnectionStateChange { .. }
            | Self::DecryptionFailure { .. }
            | Self::TransportError { .. } => None,
        }
    }
}

/// Maps platform-specific wire names of protocol-internal events to one canonical name.
pub fn normalize_event_name(event_name: &str) -> &str {
    match event_name {
        pusher_events::SUBSCRIPTION_SUCCEEDED => internal_events::SUBSCRIPTION_SUCCEEDED,
        pusher_events::SUBSCRIPTION_COUNT => internal_events::SUBSCRIPTION_COUNT,
        other => other,
    }
}

/// Decodes a payload that may arrive as JSON text instead of a structured value.
///
/// Strings that are not valid JSON are returned unchanged.
pub fn decode_payload(data: Value) -> Value {
    match data {
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(decoded) => decoded,
            Err(_) => Value::String(text),
        },
        other => other,
    }
}

fn decode_member(data: Value) -> Result<Member> {
    let payload: MemberPayload = serde_json::from_value(decode_payload(data))?;
    Ok(Member::new(payload.user_id, payload.user_info))
}

fn subscription_error_message(data: &Value) -> String {
    data.get("error")
        .or_else(|| data.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| data.to_string())
}
