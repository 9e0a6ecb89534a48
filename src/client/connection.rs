use crate::types::PusherError;
use std::str::FromStr;

/// Transport connection state, as reported by connection-state-change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnecting,
    Disconnected,
    Reconnecting,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "CONNECTING",
            Self::Connected => "CONNECTED",
            Self::Disconnecting => "DISCONNECTING",
            Self::Disconnected => "DISCONNECTED",
            Self::Reconnecting => "RECONNECTING",
        }
    }

    /// Connected, or on the way there.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Connected | Self::Reconnecting)
    }
}

impl FromStr for ConnectionState {
    type Err = PusherError;

    /// Parses transport state names case-insensitively (`"connected"`, `"CONNECTED"`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CONNECTING" => Ok(Self::Connecting),
            "CONNECTED" => Ok(Self::Connected),
            "DISCONNECTING" => Ok(Self::Disconnecting),
            "DISCONNECTED" => Ok(Self::Disconnected),
            "RECONNECTING" => Ok(Self::Reconnecting),
            other => Err(PusherError::Transport(format!(
                "unknown connection state '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of the client facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientStatus {
    Uninitialized,
    Initialized,
    Connecting,
    Connected,
    Disconnected,
}

impl ClientStatus {
    /// Derives the facade status from whether `init` ran, whether `connect` was ever asked
    /// for, and the latest transport state.
    pub fn derive(initialized: bool, connect_requested: bool, state: ConnectionState) -> Self {
        if !initialized {
            return Self::Uninitialized;
        }
        match state {
            ConnectionState::Connected => Self::Connected,
            ConnectionState::Connecting | ConnectionState::Reconnecting => Self::Connecting,
            ConnectionState::Disconnecting | ConnectionState::Disconnected => {
                if connect_requested {
                    Self::Disconnected
                } else {
                    Self::Initialized
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "connected".parse::<ConnectionState>().unwrap(),
            ConnectionState::Connected
        );
        assert_eq!(
            "Reconnecting".parse::<ConnectionState>().unwrap(),
            ConnectionState::Reconnecting
        );
        assert!("sleeping".parse::<ConnectionState>().is_err());
    }

    #[test]
    fn test_display_is_upper_case() {
        assert_eq!(ConnectionState::Disconnecting.to_string(), "DISCONNECTING");
    }

    #[test]
    fn test_status_derivation() {
        use ConnectionState::*;
        assert_eq!(
            ClientStatus::derive(false, true, Connected),
            ClientStatus::Uninitialized
        );
        assert_eq!(
            ClientStatus::derive(true, false, Disconnected),
            ClientStatus::Initialized
        );
        assert_eq!(
            ClientStatus::derive(true, true, Reconnecting),
            ClientStatus::Connecting
        );
        assert_eq!(
            ClientStatus::derive(true, true, Connected),
            ClientStatus::Connected
        );
        assert_eq!(
            ClientStatus::derive(true, true, Disconnected),
            ClientStatus::Disconnected
        );
    }
}
