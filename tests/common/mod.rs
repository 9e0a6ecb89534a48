//! Common test utilities for the client integration tests
//!
//! Provides an in-memory transport that records every call and plays back the events a real
//! Pusher connection would produce.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use pusher_realtime_rs::{
    AuthorizerResult, ChannelKind, PusherError, PusherOptions, Result, Transport, TransportEvent,
    TransportLink,
};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const SOCKET_ID: &str = "123.456";

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect,
    Disconnect,
    Subscribe(String),
    Unsubscribe(String),
    Trigger {
        channel_name: String,
        event_name: String,
        data: String,
    },
}

/// In-memory transport driven by the tests
pub struct MockTransport {
    pub options: PusherOptions,
    link: TransportLink,
    calls: Mutex<Vec<Call>>,
    socket_id: Mutex<Option<String>>,
    refused: Mutex<HashSet<String>>,
    auth_payloads: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockTransport {
    fn new(options: PusherOptions, link: TransportLink) -> Self {
        Self {
            options,
            link,
            calls: Mutex::new(Vec::new()),
            socket_id: Mutex::new(None),
            refused: Mutex::new(HashSet::new()),
            auth_payloads: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    /// Makes the next `subscribe(channel_name)` fail synchronously.
    pub fn refuse(&self, channel_name: &str) {
        self.refused.lock().insert(channel_name.to_string());
    }

    /// Serialized payloads the authorizer returned, per channel.
    pub fn auth_payloads(&self) -> Vec<(String, String)> {
        self.auth_payloads.lock().clone()
    }

    pub fn emit(&self, event: TransportEvent) {
        self.link.emit(event);
    }

    pub fn emit_state(&self, previous: &str, current: &str) {
        self.emit(TransportEvent::ConnectionStateChange {
            previous_state: previous.to_string(),
            current_state: current.to_string(),
        });
    }

    pub fn emit_event(&self, channel_name: &str, event_name: &str, data: Value, user_id: Option<&str>) {
        self.emit(TransportEvent::Event {
            channel_name: channel_name.to_string(),
            event_name: event_name.to_string(),
            data,
            user_id: user_id.map(str::to_string),
        });
    }

    /// Pulls credentials the way a real transport does and reports the outcome as events.
    fn authorize_in_background(&self, channel_name: String) {
        let link = self.link.clone();
        let socket_id = self.socket_id.lock().clone().unwrap_or_else(|| SOCKET_ID.to_string());
        let payloads = Arc::clone(&self.auth_payloads);

        tokio::spawn(async move {
            let Some(authorizer) = link.authorizer() else {
                link.emit(auth_error(&channel_name, "no authorizer configured"));
                return;
            };

            let payload = match authorizer.authorize(&channel_name, &socket_id).await {
                Ok(payload) => payload,
                Err(e) => {
                    link.emit(auth_error(&channel_name, &e.to_string()));
                    return;
                }
            };
            payloads.lock().push((channel_name.clone(), payload.clone()));

            match serde_json::from_str::<AuthorizerResult>(&payload) {
                Ok(result) if !result.is_error_marked() => {
                    link.emit(TransportEvent::Event {
                        channel_name: channel_name.clone(),
                        event_name: "pusher_internal:subscription_succeeded".to_string(),
                        data: presence_data(&result),
                        user_id: user_id(&result),
                    });
                }
                Ok(result) => {
                    let reason = result.auth.unwrap_or_default();
                    link.emit(auth_error(&channel_name, &reason));
                }
                Err(e) => {
                    link.emit(auth_error(&channel_name, &e.to_string()));
                }
            }
        });
    }
}

fn auth_error(channel_name: &str, message: &str) -> TransportEvent {
    TransportEvent::SubscriptionError {
        channel_name: channel_name.to_string(),
        message: message.to_string(),
        error_type: "AuthError".to_string(),
    }
}

fn user_id(result: &AuthorizerResult) -> Option<String> {
    let channel_data: Value = serde_json::from_str(result.channel_data.as_deref()?).ok()?;
    channel_data.get("user_id")?.as_str().map(str::to_string)
}

fn presence_data(result: &AuthorizerResult) -> Value {
    let Some(channel_data) = result
        .channel_data
        .as_deref()
        .and_then(|data| serde_json::from_str::<Value>(data).ok())
    else {
        return json!({});
    };
    let user_id = channel_data.get("user_id").cloned().unwrap_or(Value::Null);
    let user_info = channel_data.get("user_info").cloned().unwrap_or(json!({}));
    let key = user_id.as_str().unwrap_or_default().to_string();
    json!({"presence": {"count": 1, "ids": [key.clone()], "hash": {key: user_info}}})
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self) -> Result<()> {
        self.calls.lock().push(Call::Connect);
        self.emit_state("DISCONNECTED", "CONNECTING");
        *self.socket_id.lock() = Some(SOCKET_ID.to_string());
        self.emit_state("CONNECTING", "CONNECTED");
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.calls.lock().push(Call::Disconnect);
        *self.socket_id.lock() = None;
        self.emit_state("CONNECTED", "DISCONNECTED");
        Ok(())
    }

    async fn subscribe(&self, channel_name: &str) -> Result<()> {
        self.calls.lock().push(Call::Subscribe(channel_name.to_string()));
        if self.refused.lock().remove(channel_name) {
            return Err(PusherError::Transport(format!("refused {channel_name}")));
        }

        if ChannelKind::from_name(channel_name).requires_authorization() {
            self.authorize_in_background(channel_name.to_string());
        } else {
            self.emit_event(channel_name, "pusher:subscription_succeeded", json!({}), None);
        }
        Ok(())
    }

    async fn unsubscribe(&self, channel_name: &str) -> Result<()> {
        self.calls.lock().push(Call::Unsubscribe(channel_name.to_string()));
        Ok(())
    }

    async fn trigger(&self, channel_name: &str, event_name: &str, data: String) -> Result<()> {
        self.calls.lock().push(Call::Trigger {
            channel_name: channel_name.to_string(),
            event_name: event_name.to_string(),
            data,
        });
        Ok(())
    }

    fn socket_id(&self) -> Option<String> {
        self.socket_id.lock().clone()
    }
}

/// Builds mock transports and keeps hold of them for inspection
#[derive(Clone, Default)]
pub struct MockFactory {
    created: Arc<Mutex<Vec<Arc<MockTransport>>>>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory(
        &self,
    ) -> impl Fn(&PusherOptions, TransportLink) -> Result<Arc<dyn Transport>> + Send + Sync + 'static
    {
        let created = Arc::clone(&self.created);
        move |options: &PusherOptions, link: TransportLink| {
            let transport = Arc::new(MockTransport::new(options.clone(), link));
            created.lock().push(Arc::clone(&transport));
            let transport: Arc<dyn Transport> = transport;
            Ok(transport)
        }
    }

    /// The most recently created transport
    pub fn transport(&self) -> Arc<MockTransport> {
        self.created
            .lock()
            .last()
            .cloned()
            .expect("no transport created yet")
    }

    pub fn created(&self) -> usize {
        self.created.lock().len()
    }
}

/// Polls `condition` until it holds or ten seconds pass.
pub async fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..1000 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Awaits `future` with a five second bound.
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("timed out")
}

/// Installs a test log subscriber once; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
