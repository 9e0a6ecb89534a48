use super::{AuthorizerResult, CorrelationRegistry, PendingHandle, Resolution};
use crate::types::{PusherError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Pull-based authorizer contract the transport calls for restricted channels.
///
/// Implementations return the serialized auth payload. Failures that the transport should
/// surface as a subscription error are encoded in the payload rather than returned as `Err`.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, channel_name: &str, socket_id: &str) -> Result<String>;
}

/// Notification sent to the application side when the transport needs credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub channel_name: String,
    pub socket_id: String,
}

/// Turns the transport's pull-based authorizer call into a push to the application and back.
///
/// Each call registers a pending entry keyed on `channel_name + socket_id`, notifies the
/// application, and suspends until [`respond`](Self::respond) or the timeout completes the
/// entry. The timer runs on the runtime captured at construction, never on the waiting thread.
pub struct AuthorizationBridge {
    registry: Arc<CorrelationRegistry<AuthorizerResult>>,
    requests: mpsc::UnboundedSender<AuthorizationRequest>,
    timeout: Duration,
    runtime: Handle,
}

impl AuthorizationBridge {
    /// Creates a bridge and the receiving end of its authorization notifications.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::Configuration`] when called outside a Tokio runtime.
    pub fn new(
        registry: Arc<CorrelationRegistry<AuthorizerResult>>,
        timeout: Duration,
    ) -> Result<(Self, mpsc::UnboundedReceiver<AuthorizationRequest>)> {
        let runtime = Handle::try_current().map_err(|e| {
            PusherError::Configuration(format!("Authorization bridge needs a Tokio runtime: {e}"))
        })?;
        let (tx, rx) = mpsc::unbounded_channel();

        let bridge = Self {
            registry,
            requests: tx,
            timeout,
            runtime,
        };
        Ok((bridge, rx))
    }

    pub fn correlation_key(channel_name: &str, socket_id: &str) -> String {
        format!("{channel_name}{socket_id}")
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn registry(&self) -> &Arc<CorrelationRegistry<AuthorizerResult>> {
        &self.registry
    }

    /// Requests credentials and waits cooperatively for the answer.
    pub async fn request(&self, channel_name: &str, socket_id: &str) -> String {
        let (handle, guard) = match self.begin(channel_name, socket_id) {
            Ok(pending) => pending,
            Err(e) => return Self::rejected(channel_name, e),
        };

        let resolution = handle.wait().await;
        guard.finish();
        Self::settle(channel_name, resolution)
    }

    /// Requests credentials and blocks the calling thread until the answer arrives.
    ///
    /// For transports that call the authorizer from a dedicated thread. Never call this from a
    /// runtime worker: the resolution is delivered by tasks on that runtime.
    pub fn request_blocking(&self, channel_name: &str, socket_id: &str) -> String {
        let (handle, guard) = match self.begin(channel_name, socket_id) {
            Ok(pending) => pending,
            Err(e) => return Self::rejected(channel_name, e),
        };

        let resolution = handle.wait_blocking();
        guard.finish();
        Self::settle(channel_name, resolution)
    }

    /// Delivers the application's answer for `(channel_name, socket_id)`.
    ///
    /// Returns `false` when no request is pending (already answered or timed out); the answer
    /// is dropped in that case.
    pub fn respond(&self, channel_name: &str, socket_id: &str, result: AuthorizerResult) -> bool {
        let key = Self::correlation_key(channel_name, socket_id);
        let delivered = self.registry.resolve(&key, result);
        if !delivered {
            tracing::debug!(
                "Dropping authorization response for {} (no pending request)",
                channel_name
            );
        }
        delivered
    }

    /// Expires every pending request, e.g. on teardown or when the socket is gone.
    pub fn expire_all(&self) -> usize {
        let expired = self.registry.expire_all();
        if expired > 0 {
            tracing::info!("Expired {} pending authorization request(s)", expired);
        }
        expired
    }

    fn begin(
        &self,
        channel_name: &str,
        socket_id: &str,
    ) -> Result<(PendingHandle<AuthorizerResult>, PendingGuard)> {
        let key = Self::correlation_key(channel_name, socket_id);
        let handle = self.registry.register(key.clone())?;

        let timer = {
            let registry = Arc::clone(&self.registry);
            let timeout = self.timeout;
            let key = key.clone();
            self.runtime.spawn(async move {
                tokio::time::sleep(timeout).await;
                if registry.expire(&key) {
                    tracing::warn!("Authorization request {} timed out after {:?}", key, timeout);
                }
            })
        };

        tracing::debug!("Requesting authorization for {}", channel_name);
        let request = AuthorizationRequest {
            channel_name: channel_name.to_string(),
            socket_id: socket_id.to_string(),
        };
        if self.requests.send(request).is_err() {
            tracing::warn!(
                "No application authorizer listening, expiring request for {}",
                channel_name
            );
            self.registry.expire(&key);
        }

        let guard = PendingGuard {
            registry: Arc::clone(&self.registry),
            key,
            timer,
            armed: true,
        };
        Ok((handle, guard))
    }

    fn settle(channel_name: &str, resolution: Resolution<AuthorizerResult>) -> String {
        let outcome = match resolution {
            Resolution::Resolved(result) if result.auth.is_some() => Ok(result),
            Resolution::Resolved(result) => Err((
                PusherError::AuthorizationRejected {
                    channel_name: channel_name.to_string(),
                    reason: "response has no auth field".to_string(),
                },
                result.with_missing_auth_marked(),
            )),
            Resolution::Expired => Err((
                PusherError::AuthorizationTimeout {
                    channel_name: channel_name.to_string(),
                },
                AuthorizerResult::timed_out(),
            )),
        };

        match outcome {
            Ok(result) => result.to_wire(),
            Err((e, marked)) => {
                tracing::warn!("{}", e);
                marked.to_wire()
            }
        }
    }

    fn rejected(channel_name: &str, e: PusherError) -> String {
        tracing::error!("Authorization for {} not started: {}", channel_name, e);
        AuthorizerResult::default().with_missing_auth_marked().to_wire()
    }
}

/// Owns the timeout timer of one request and expires its entry if the waiter goes away.
struct PendingGuard {
    registry: Arc<CorrelationRegistry<AuthorizerResult>>,
    key: String,
    timer: JoinHandle<()>,
    armed: bool,
}

impl PendingGuard {
    /// Called once the request settled; the entry is already gone.
    fn finish(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.timer.abort();
        if self.armed && self.registry.expire(&self.key) {
            tracing::debug!("Authorization request {} abandoned by its caller", self.key);
        }
    }
}

#[async_trait]
impl Authorizer for AuthorizationBridge {
    async fn authorize(&self, channel_name: &str, socket_id: &str) -> Result<String> {
        Ok(self.request(channel_name, socket_id).await)
    }
}
