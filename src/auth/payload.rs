use crate::types::{AUTHORIZER_TIMEOUT_SENTINEL, MISSING_AUTH_SENTINEL};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw authorization fields produced by an authorizer.
///
/// Wire shape: `{auth?, shared_secret?, channel_data?}`. For presence channels `channel_data`
/// is itself JSON text encoding `{user_id, user_info}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizerResult {
    /// Required for private channels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    /// Required for encrypted channels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_secret: Option<String>,
    /// Required for presence channels, stringified JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_data: Option<String>,
}

impl AuthorizerResult {
    pub fn new(auth: impl Into<String>) -> Self {
        Self {
            auth: Some(auth.into()),
            ..Default::default()
        }
    }

    pub fn with_channel_data(mut self, channel_data: impl Into<String>) -> Self {
        self.channel_data = Some(channel_data.into());
        self
    }

    /// Builds `channel_data` from a presence identity.
    pub fn with_presence(self, user_id: impl Into<String>, user_info: Value) -> Self {
        let channel_data = serde_json::json!({
            "user_id": user_id.into(),
            "user_info": user_info,
        });
        self.with_channel_data(channel_data.to_string())
    }

    pub fn with_shared_secret(mut self, shared_secret: impl Into<String>) -> Self {
        self.shared_secret = Some(shared_secret.into());
        self
    }

    /// Payload handed back when the authorizer never answered.
    pub fn timed_out() -> Self {
        Self::new(AUTHORIZER_TIMEOUT_SENTINEL)
    }

    /// Keeps the optional fields but marks the missing `auth` with the error sentinel.
    pub fn with_missing_auth_marked(self) -> Self {
        Self {
            auth: Some(MISSING_AUTH_SENTINEL.to_string()),
            ..self
        }
    }

    pub fn is_error_marked(&self) -> bool {
        self.auth
            .as_deref()
            .is_some_and(|auth| auth.ends_with(":error") && auth.starts_with('<'))
    }

    /// Serialized form handed to the transport.
    pub fn to_wire(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize authorization payload: {}", e);
                format!(r#"{{"auth":"{}"}}"#, MISSING_AUTH_SENTINEL)
            }
        }
    }
}
