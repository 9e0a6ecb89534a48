use super::Authorizer;
use crate::types::{PusherError, Result};
use async_trait::async_trait;
use url::Url;

/// Authorizes channels by POSTing `socket_id` and `channel_name` to an auth endpoint.
///
/// The response body is handed to the transport verbatim as the serialized auth payload.
pub struct HttpAuthorizer {
    endpoint: Url,
    http_client: reqwest::Client,
}

impl HttpAuthorizer {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            http_client: reqwest::Client::new(),
        }
    }

    /// Parses `endpoint` and builds an authorizer for it.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::UrlParse`] for a malformed endpoint.
    pub fn parse(endpoint: &str) -> Result<Self> {
        Ok(Self::new(Url::parse(endpoint)?))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Authorizer for HttpAuthorizer {
    async fn authorize(&self, channel_name: &str, socket_id: &str) -> Result<String> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .form(&[("socket_id", socket_id), ("channel_name", channel_name)])
            .send()
            .await
            .map_err(|e| PusherError::AuthorizationRejected {
                channel_name: channel_name.to_string(),
                reason: format!("auth endpoint request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PusherError::AuthorizationRejected {
                channel_name: channel_name.to_string(),
                reason: format!("auth endpoint {} returned status {}", self.endpoint, status),
            });
        }

        let body = response.text().await?;
        tracing::debug!("Authorized {} via {}", channel_name, self.endpoint);
        Ok(body)
    }
}
