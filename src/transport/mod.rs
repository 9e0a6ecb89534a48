// Transport module - The seam to the realtime wire-protocol implementation
use crate::auth::Authorizer;
use crate::client::PusherOptions;
use crate::messaging::TransportEvent;
use crate::types::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

/// The realtime wire-protocol implementation the facade drives.
///
/// A transport owns the socket, reconnection and protocol framing. It reports everything it
/// observes through the [`TransportLink`] it was created with and never calls back into the
/// facade directly.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&self) -> Result<()>;

    async fn disconnect(&self) -> Result<()>;

    /// Starts a subscription. Failures reported after this returns arrive as
    /// [`TransportEvent::SubscriptionError`].
    async fn subscribe(&self, channel_name: &str) -> Result<()>;

    async fn unsubscribe(&self, channel_name: &str) -> Result<()>;

    /// Sends a client event. `data` is already serialized.
    async fn trigger(&self, channel_name: &str, event_name: &str, data: String) -> Result<()>;

    /// Socket id assigned by the server, once connected.
    fn socket_id(&self) -> Option<String>;
}

/// Builds a transport for a validated set of options.
pub trait TransportFactory: Send + Sync {
    fn create(&self, options: &PusherOptions, link: TransportLink) -> Result<Arc<dyn Transport>>;
}

impl<F> TransportFactory for F
where
    F: Fn(&PusherOptions, TransportLink) -> Result<Arc<dyn Transport>> + Send + Sync,
{
    fn create(&self, options: &PusherOptions, link: TransportLink) -> Result<Arc<dyn Transport>> {
        self(options, link)
    }
}

/// What the facade hands a transport at creation: the inbound event sink and, for restricted
/// channels, the authorizer to pull credentials from.
#[derive(Clone)]
pub struct TransportLink {
    events: mpsc::UnboundedSender<TransportEvent>,
    authorizer: Option<Arc<dyn Authorizer>>,
}

impl TransportLink {
    pub(crate) fn new(
        events: mpsc::UnboundedSender<TransportEvent>,
        authorizer: Option<Arc<dyn Authorizer>>,
    ) -> Self {
        Self { events, authorizer }
    }

    /// Reports an inbound event. Returns `false` once the client has been reset.
    pub fn emit(&self, event: TransportEvent) -> bool {
        if self.events.send(event).is_err() {
            tracing::debug!("Event listener gone, dropping transport event");
            return false;
        }
        true
    }

    /// `None` when authorization is disabled; restricted subscriptions then fail.
    pub fn authorizer(&self) -> Option<Arc<dyn Authorizer>> {
        self.authorizer.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}

impl std::fmt::Debug for TransportLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportLink")
            .field("closed", &self.events.is_closed())
            .field("authorizer", &self.authorizer.is_some())
            .finish()
    }
}
