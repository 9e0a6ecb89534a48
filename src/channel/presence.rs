use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Decoded `subscription_succeeded` payload. Only presence channels carry `presence`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionSucceededPayload {
    #[serde(default)]
    pub presence: Option<PresenceSnapshot>,
}

/// Membership snapshot sent when a presence subscription succeeds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PresenceSnapshot {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub ids: Vec<String>,
    /// userId -> userInfo
    #[serde(default)]
    pub hash: HashMap<String, Value>,
}

/// Decoded `subscription_count` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionCountPayload {
    pub subscription_count: u64,
}

/// Raw-named member event payload (`{user_id, user_info}`).
#[derive(Debug, Clone, Deserialize)]
pub struct MemberPayload {
    pub user_id: String,
    #[serde(default)]
    pub user_info: Value,
}
