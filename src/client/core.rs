use super::{ClientState, ClientStatus, ConnectionState, PusherHandlers, PusherOptions};
use crate::auth::{
    AuthorizationBridge, AuthorizationRequest, Authorizer, AuthorizerResult, CorrelationRegistry,
    HttpAuthorizer,
};
use crate::channel::{ChannelHooks, ChannelKind, ChannelStore, PusherChannel};
use crate::infrastructure::dispatch;
use crate::messaging::EventRouter;
use crate::transport::{Transport, TransportFactory, TransportLink};
use crate::types::{PusherError, PusherEvent, Result, error_types};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};
use tokio::sync::{RwLock, mpsc, watch};

static INSTANCE: OnceLock<Pusher> = OnceLock::new();

pub(crate) struct ClientInner {
    store: Arc<ChannelStore>,
    registry: Arc<CorrelationRegistry<AuthorizerResult>>,
    connection: Arc<watch::Sender<ConnectionState>>,
    state: RwLock<ClientState>,
}

/// The entry point applications use to talk to Pusher Channels.
///
/// One client drives one transport. Most applications use the process-wide
/// [`Pusher::instance`]; independent clients can be built with [`Pusher::new`].
///
/// # Example
///
/// ```no_run
/// use pusher_realtime_rs::{
///     AuthorizerResult, ChannelHooks, Pusher, PusherHandlers, PusherOptions, TransportFactory,
/// };
///
/// # async fn example(factory: impl TransportFactory) -> Result<(), Box<dyn std::error::Error>> {
/// let pusher = Pusher::instance();
///
/// pusher
///     .init(
///         PusherOptions::new("app-key"),
///         PusherHandlers::new()
///             .on_connection_state_change(|prev, cur| println!("{prev} -> {cur}"))
///             .on_authorizer(|_channel, _socket_id| async {
///                 Some(AuthorizerResult::new("key:signature"))
///             }),
///         factory,
///     )
///     .await?;
///
/// pusher.connect().await?;
/// pusher
///     .subscribe("private-chat", ChannelHooks::new().on_event(|e| println!("{e}")))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Pusher {
    inner: Arc<ClientInner>,
}

impl Pusher {
    /// The process-wide client, created on first access.
    pub fn instance() -> &'static Pusher {
        INSTANCE.get_or_init(Pusher::new)
    }

    /// Creates an uninitialized client independent of [`Pusher::instance`].
    pub fn new() -> Self {
        let (connection, _) = watch::channel(ConnectionState::Disconnected);
        let inner = Arc::new_cyclic(|weak| ClientInner {
            store: Arc::new(ChannelStore::attached(weak.clone())),
            registry: Arc::new(CorrelationRegistry::new()),
            connection: Arc::new(connection),
            state: RwLock::new(ClientState::new()),
        });
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// Validates `options`, builds the transport and starts listening to it.
    ///
    /// An already initialized client is reported before the options are looked at.
    ///
    /// When `options.auth_endpoint` is set the transport authorizes against that endpoint over
    /// HTTP. When `handlers` carry an authorizer, requests are routed to it with a timeout of
    /// `options.authorizer_timeout_in_seconds`. With neither, restricted channels cannot be
    /// subscribed.
    ///
    /// # Errors
    ///
    /// - [`PusherError::Configuration`] for invalid options, or if the factory fails
    /// - [`PusherError::AlreadyInitialized`] if called again without [`reset`](Self::reset)
    pub async fn init(
        &self,
        options: PusherOptions,
        handlers: PusherHandlers,
        factory: impl TransportFactory,
    ) -> Result<()> {
        let mut state = self.inner.state.write().await;
        if state.is_initialized() {
            return Err(PusherError::AlreadyInitialized);
        }
        options.validate(handlers.has_authorizer())?;

        let handlers = Arc::new(handlers);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut requests = None;
        let authorizer: Option<Arc<dyn Authorizer>> =
            if let Some(endpoint) = options.auth_endpoint_url()? {
                tracing::info!("Authorizing restricted channels against {}", endpoint);
                Some(Arc::new(HttpAuthorizer::new(endpoint)))
            } else if handlers.has_authorizer() {
                let (bridge, rx) = AuthorizationBridge::new(
                    Arc::clone(&self.inner.registry),
                    options.authorizer_timeout(),
                )?;
                let bridge = Arc::new(bridge);
                requests = Some((Arc::clone(&bridge), rx));
                Some(bridge)
            } else {
                tracing::info!("No authorizer configured, restricted channels will fail");
                None
            };

        let transport = factory
            .create(&options, TransportLink::new(events_tx, authorizer))
            .map_err(|e| match e {
                PusherError::Configuration(message) => PusherError::Configuration(message),
                other => PusherError::Configuration(format!("Failed to create transport: {other}")),
            })?;

        let router = EventRouter::new(
            Arc::clone(&self.inner.store),
            Arc::clone(&handlers),
            Arc::clone(&self.inner.connection),
            Arc::clone(&self.inner.registry),
        );
        state.task_manager.spawn("event router", router.run(events_rx));

        if let Some((bridge, rx)) = requests {
            let handlers = Arc::clone(&handlers);
            state
                .task_manager
                .spawn("authorizer", listen_for_authorization(bridge, handlers, rx));
        }

        self.inner.connection.send_replace(ConnectionState::Disconnected);
        state.options = Some(options);
        state.handlers = handlers;
        state.transport = Some(transport);
        state.connect_requested = false;

        tracing::info!("Pusher Channels initialized");
        Ok(())
    }

    /// Asks the transport to connect. Resolves immediately if already connected or connecting.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::NotInitialized`] before `init`, or the transport's error.
    pub async fn connect(&self) -> Result<()> {
        let transport = {
            let mut state = self.inner.state.write().await;
            let transport = Self::require_transport(&state)?;
            state.connect_requested = true;
            transport
        };

        let current = self.connection_state();
        if current.is_active() {
            tracing::debug!("Already {}, not connecting again", current);
            return Ok(());
        }

        tracing::info!("Connecting");
        transport.connect().await
    }

    /// Asks the transport to disconnect. Resolves immediately if already disconnected.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::NotInitialized`] before `init`, or the transport's error.
    pub async fn disconnect(&self) -> Result<()> {
        let transport = self.transport().await?;

        if self.connection_state() == ConnectionState::Disconnected {
            tracing::debug!("Already disconnected");
            return Ok(());
        }

        tracing::info!("Disconnecting");
        transport.disconnect().await
    }

    /// Subscribes to `channel_name`, or returns the existing channel if already subscribed.
    ///
    /// `hooks` only apply when this call creates the channel. A failure reported by the
    /// transport later arrives through the subscription-error callbacks.
    ///
    /// # Errors
    ///
    /// - [`PusherError::NotInitialized`] before `init`
    /// - [`PusherError::Configuration`] for an empty channel name
    /// - [`PusherError::Subscription`] if the transport refuses the subscription; the
    ///   subscription-error callbacks fire as well and no channel is kept
    pub async fn subscribe(
        &self,
        channel_name: &str,
        hooks: ChannelHooks,
    ) -> Result<Arc<PusherChannel>> {
        if channel_name.is_empty() {
            return Err(PusherError::Configuration(
                "Channel name cannot be empty".to_string(),
            ));
        }
        let (transport, handlers) = {
            let state = self.inner.state.read().await;
            (Self::require_transport(&state)?, Arc::clone(&state.handlers))
        };

        let (channel, created) = self.inner.store.ensure(channel_name, hooks);
        if !created {
            tracing::debug!("Already subscribed to {}", channel_name);
            return Ok(channel);
        }

        tracing::info!("Subscribing to {}", channel_name);
        if let Err(e) = transport.subscribe(channel_name).await {
            self.inner.store.remove_exact(&channel);
            let message = e.to_string();
            tracing::warn!("Subscription to {} failed: {}", channel_name, message);

            if let Some(callback) = &handlers.on_subscription_error {
                dispatch("on_subscription_error", || {
                    callback(
                        channel_name.to_string(),
                        message.clone(),
                        error_types::SUBSCRIPTION_ERROR.to_string(),
                    )
                });
            }
            if let Some(callback) = &channel.hooks.on_subscription_error {
                dispatch("channel.on_subscription_error", || {
                    callback(message.clone(), error_types::SUBSCRIPTION_ERROR.to_string())
                });
            }

            return Err(PusherError::Subscription {
                channel_name: channel_name.to_string(),
                message,
            });
        }

        Ok(channel)
    }

    /// Removes the channel and unsubscribes it at the transport.
    ///
    /// Unsubscribing a channel that is not subscribed does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::NotInitialized`] before `init`, or the transport's error. The
    /// channel is removed locally either way.
    pub async fn unsubscribe(&self, channel_name: &str) -> Result<()> {
        let transport = self.transport().await?;

        if self.inner.store.remove(channel_name).is_none() {
            tracing::debug!("Not subscribed to {}, nothing to unsubscribe", channel_name);
            return Ok(());
        }

        tracing::info!("Unsubscribing from {}", channel_name);
        transport.unsubscribe(channel_name).await
    }

    /// Sends a client event. Only private and presence channels accept client events.
    ///
    /// String data is sent verbatim, anything else as its JSON text.
    ///
    /// # Errors
    ///
    /// - [`PusherError::NotInitialized`] before `init`
    /// - [`PusherError::InvalidChannelKind`] for public and encrypted channels
    /// - the transport's error
    pub async fn trigger(&self, event: PusherEvent) -> Result<()> {
        let transport = self.transport().await?;

        if !ChannelKind::from_name(&event.channel_name).accepts_client_events() {
            return Err(PusherError::InvalidChannelKind {
                channel_name: event.channel_name,
            });
        }

        tracing::debug!(
            "Triggering {} on {}",
            event.event_name,
            event.channel_name
        );
        transport
            .trigger(&event.channel_name, &event.event_name, event.wire_data())
            .await
    }

    /// The socket id assigned by the server, once connected.
    ///
    /// # Errors
    ///
    /// Returns [`PusherError::NotInitialized`] before `init`.
    pub async fn get_socket_id(&self) -> Result<Option<String>> {
        Ok(self.transport().await?.socket_id())
    }

    pub fn get_channel(&self, channel_name: &str) -> Option<Arc<PusherChannel>> {
        self.inner.store.get(channel_name)
    }

    /// Tears the client down so `init` can be called again.
    ///
    /// Stops the listeners, unsubscribes and forgets every channel, expires pending
    /// authorizations and disconnects the transport. Transport failures are logged, not
    /// returned.
    pub async fn reset(&self) {
        let transport = self.inner.state.write().await.clear();

        let channels = self.inner.store.reset();
        let expired = self.inner.registry.expire_all();
        if expired > 0 {
            tracing::info!("Expired {} pending authorization(s) on reset", expired);
        }

        if let Some(transport) = transport {
            for channel in &channels {
                if let Err(e) = transport.unsubscribe(channel.name()).await {
                    tracing::warn!("Failed to unsubscribe {} on reset: {}", channel.name(), e);
                }
            }
            if let Err(e) = transport.disconnect().await {
                tracing::warn!("Failed to disconnect on reset: {}", e);
            }
        }

        self.inner.connection.send_replace(ConnectionState::Disconnected);
        tracing::info!("Pusher Channels reset ({} channel(s) dropped)", channels.len());
    }

    pub async fn is_initialized(&self) -> bool {
        self.inner.state.read().await.is_initialized()
    }

    pub async fn status(&self) -> ClientStatus {
        let state = self.inner.state.read().await;
        ClientStatus::derive(
            state.is_initialized(),
            state.connect_requested,
            self.connection_state(),
        )
    }

    /// Latest connection state reported by the transport.
    pub fn connection_state(&self) -> ConnectionState {
        *self.inner.connection.borrow()
    }

    pub fn watch_connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection.subscribe()
    }

    /// Number of authorization requests waiting for an answer.
    pub fn pending_authorizations(&self) -> usize {
        self.inner.registry.len()
    }

    async fn transport(&self) -> Result<Arc<dyn Transport>> {
        Self::require_transport(&*self.inner.state.read().await)
    }

    fn require_transport(state: &ClientState) -> Result<Arc<dyn Transport>> {
        state.transport.clone().ok_or(PusherError::NotInitialized)
    }
}

impl Default for Pusher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Pusher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pusher")
            .field("connection", &self.connection_state())
            .field("channels", &self.inner.store.names())
            .finish_non_exhaustive()
    }
}

/// Forwards authorization requests to the application authorizer and its answers back.
///
/// A `None` answer, or a panicking authorizer, settles the request as rejected.
async fn listen_for_authorization(
    bridge: Arc<AuthorizationBridge>,
    handlers: Arc<PusherHandlers>,
    mut requests: mpsc::UnboundedReceiver<AuthorizationRequest>,
) {
    let Some(authorizer) = handlers.on_authorizer.clone() else {
        return;
    };
    tracing::info!("Starting authorization listener");

    while let Some(AuthorizationRequest {
        channel_name,
        socket_id,
    }) = requests.recv().await
    {
        let bridge = Arc::clone(&bridge);
        let authorizer = Arc::clone(&authorizer);
        tokio::spawn(async move {
            let answer = AssertUnwindSafe(async {
                authorizer(channel_name.clone(), socket_id.clone()).await
            })
            .catch_unwind()
            .await;

            let result = match answer {
                Ok(Some(result)) => result,
                Ok(None) => {
                    tracing::warn!("Authorizer declined {}", channel_name);
                    AuthorizerResult::default()
                }
                Err(_) => {
                    tracing::error!("Authorizer panicked for {}", channel_name);
                    AuthorizerResult::default()
                }
            };
            bridge.respond(&channel_name, &socket_id, result);
        });
    }

    tracing::info!("Authorization listener finished");
}
