use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An application-level event received on, or triggered to, a channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PusherEvent {
    pub channel_name: String,
    pub event_name: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl PusherEvent {
    pub fn new(
        channel_name: impl Into<String>,
        event_name: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            channel_name: channel_name.into(),
            event_name: event_name.into(),
            data,
            user_id: None,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Data as the transport expects it: strings verbatim, anything else as JSON text.
    pub(crate) fn wire_data(&self) -> String {
        match &self.data {
            Value::String(s) => s.clone(),
            Value::Null => "{}".to_string(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for PusherEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ channelName: {}, eventName: {}, data: {}, userId: {} }}",
            self.channel_name,
            self.event_name,
            self.data,
            self.user_id.as_deref().unwrap_or("none")
        )
    }
}

/// A presence channel member, identified by `user_id` within its channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub user_id: String,
    #[serde(default)]
    pub user_info: Value,
}

impl Member {
    pub fn new(user_id: impl Into<String>, user_info: Value) -> Self {
        Self {
            user_id: user_id.into(),
            user_info,
        }
    }
}

impl std::fmt::Display for Member {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ userId: {}, userInfo: {} }}",
            self.user_id, self.user_info
        )
    }
}
