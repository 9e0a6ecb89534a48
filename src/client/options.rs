use crate::types::{DEFAULT_AUTHORIZER_TIMEOUT_SECS, DEFAULT_CLUSTER, PusherError, Result};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Options recognized by [`Pusher::init`](super::Pusher::init).
///
/// Field names deserialize from the camelCase shape host runtimes pass (`apiKey`, `useTLS`,
/// `authorizerTimeoutInSeconds`, ...). Transport tuning fields are passed through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PusherOptions {
    pub api_key: String,
    pub cluster: Option<String>,
    /// Overrides `cluster` when set
    pub host: Option<String>,
    #[serde(rename = "useTLS")]
    pub use_tls: bool,
    pub activity_timeout: Option<u64>,
    pub pong_timeout: Option<u64>,
    pub max_reconnection_attempts: Option<u32>,
    pub max_reconnect_gap_in_seconds: Option<u64>,
    /// HTTP authorization endpoint. Mutually exclusive with an application authorizer.
    pub auth_endpoint: Option<String>,
    pub authorizer_timeout_in_seconds: Option<u64>,
    /// `host:port` of an HTTP proxy
    pub proxy: Option<String>,
}

impl Default for PusherOptions {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            cluster: None,
            host: None,
            use_tls: true,
            activity_timeout: None,
            pong_timeout: None,
            max_reconnection_attempts: None,
            max_reconnect_gap_in_seconds: None,
            auth_endpoint: None,
            authorizer_timeout_in_seconds: None,
            proxy: None,
        }
    }
}

/// Parsed `proxy` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAddress {
    pub host: String,
    pub port: u16,
}

impl PusherOptions {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn cluster(&self) -> &str {
        self.cluster.as_deref().unwrap_or(DEFAULT_CLUSTER)
    }

    pub fn authorizer_timeout(&self) -> Duration {
        Duration::from_secs(
            self.authorizer_timeout_in_seconds
                .unwrap_or(DEFAULT_AUTHORIZER_TIMEOUT_SECS),
        )
    }

    /// # Errors
    ///
    /// Returns [`PusherError::Configuration`] if `auth_endpoint` is not an absolute URL.
    pub fn auth_endpoint_url(&self) -> Result<Option<Url>> {
        self.auth_endpoint
            .as_deref()
            .map(|endpoint| {
                Url::parse(endpoint).map_err(|e| {
                    PusherError::Configuration(format!("Invalid authEndpoint '{endpoint}': {e}"))
                })
            })
            .transpose()
    }

    /// # Errors
    ///
    /// Returns [`PusherError::Configuration`] unless `proxy` is `host:port`.
    pub fn proxy_address(&self) -> Result<Option<ProxyAddress>> {
        let Some(proxy) = self.proxy.as_deref() else {
            return Ok(None);
        };

        let invalid = || PusherError::Configuration(format!("Invalid proxy '{proxy}', expected host:port"));
        let (host, port) = proxy.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse::<u16>().map_err(|_| invalid())?;

        Ok(Some(ProxyAddress {
            host: host.to_string(),
            port,
        }))
    }

    /// Checks the options before a transport is built from them.
    ///
    /// `has_application_authorizer` tells whether the handlers carry an authorizer callback.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::Configuration`] for a missing API key, both authorization methods
    /// at once, a zero authorizer timeout, or a malformed endpoint or proxy.
    pub fn validate(&self, has_application_authorizer: bool) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(PusherError::Configuration("API key is required".to_string()));
        }

        if self.auth_endpoint.is_some() && has_application_authorizer {
            return Err(PusherError::Configuration(
                "authEndpoint and an application authorizer cannot both be set".to_string(),
            ));
        }

        if self.authorizer_timeout_in_seconds == Some(0) {
            return Err(PusherError::Configuration(
                "authorizerTimeoutInSeconds must be positive".to_string(),
            ));
        }

        self.auth_endpoint_url()?;
        self.proxy_address()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = PusherOptions::new("key");
        assert!(options.use_tls);
        assert_eq!(options.cluster(), "mt1");
        assert_eq!(options.authorizer_timeout(), Duration::from_secs(10));
        assert!(options.validate(false).is_ok());
    }

    #[test]
    fn test_deserializes_host_shape() {
        let options: PusherOptions = serde_json::from_str(
            r#"{
                "apiKey": "app-key",
                "cluster": "eu",
                "useTLS": false,
                "activityTimeout": 30000,
                "maxReconnectionAttempts": 6,
                "authEndpoint": "https://example.com/pusher/auth",
                "authorizerTimeoutInSeconds": 3,
                "proxy": "10.0.0.1:8080"
            }"#,
        )
        .unwrap();

        assert_eq!(options.api_key, "app-key");
        assert_eq!(options.cluster(), "eu");
        assert!(!options.use_tls);
        assert_eq!(options.activity_timeout, Some(30000));
        assert_eq!(options.max_reconnection_attempts, Some(6));
        assert_eq!(options.authorizer_timeout(), Duration::from_secs(3));
        assert_eq!(
            options.proxy_address().unwrap(),
            Some(ProxyAddress {
                host: "10.0.0.1".to_string(),
                port: 8080
            })
        );
    }

    #[test]
    fn test_missing_api_key() {
        let err = PusherOptions::default().validate(false).unwrap_err();
        assert!(matches!(err, PusherError::Configuration(_)));
    }

    #[test]
    fn test_both_authorization_methods_rejected() {
        let options = PusherOptions {
            auth_endpoint: Some("https://example.com/auth".to_string()),
            ..PusherOptions::new("key")
        };
        assert!(options.validate(false).is_ok());
        assert!(matches!(
            options.validate(true),
            Err(PusherError::Configuration(_))
        ));
    }

    #[test]
    fn test_malformed_proxy() {
        for proxy in ["localhost", ":8080", "host:port", "host:70000"] {
            let options = PusherOptions {
                proxy: Some(proxy.to_string()),
                ..PusherOptions::new("key")
            };
            assert!(
                matches!(options.validate(false), Err(PusherError::Configuration(_))),
                "{proxy} should be rejected"
            );
        }
    }

    #[test]
    fn test_relative_auth_endpoint_rejected() {
        let options = PusherOptions {
            auth_endpoint: Some("/pusher/auth".to_string()),
            ..PusherOptions::new("key")
        };
        assert!(matches!(
            options.validate(false),
            Err(PusherError::Configuration(_))
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let options = PusherOptions {
            authorizer_timeout_in_seconds: Some(0),
            ..PusherOptions::new("key")
        };
        assert!(options.validate(false).is_err());
    }
}
