//! # Pusher Realtime Rust
//!
//! Client core for Pusher Channels: channel and presence state, event routing, and the
//! authorization handshake between a realtime transport and application code.
//!
//! The wire protocol itself is provided by a [`Transport`] implementation, created through a
//! [`TransportFactory`] when the client is initialized.
//!
//! ## Example
//!
//! ```no_run
//! use pusher_realtime_rs::{
//!     ChannelHooks, Pusher, PusherEvent, PusherHandlers, PusherOptions, TransportFactory,
//! };
//! use serde_json::json;
//!
//! async fn run(factory: impl TransportFactory) -> Result<(), Box<dyn std::error::Error>> {
//!     let pusher = Pusher::instance();
//!     pusher
//!         .init(
//!             PusherOptions {
//!                 cluster: Some("eu".to_string()),
//!                 auth_endpoint: Some("https://example.com/pusher/auth".to_string()),
//!                 ..PusherOptions::new("app-key")
//!             },
//!             PusherHandlers::new().on_error(|message, code, _| {
//!                 eprintln!("connection error {code:?}: {message}");
//!             }),
//!             factory,
//!         )
//!         .await?;
//!
//!     pusher.connect().await?;
//!
//!     let room = pusher
//!         .subscribe(
//!             "presence-room",
//!             ChannelHooks::new().on_member_added(|member| println!("{member} joined")),
//!         )
//!         .await?;
//!
//!     room.trigger(PusherEvent::new("presence-room", "client-wave", json!({"hi": true})))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod channel;
pub mod client;
pub mod infrastructure;
pub mod messaging;
pub mod transport;
pub mod types;

pub use auth::{
    AuthorizationBridge, AuthorizationRequest, Authorizer, AuthorizerResult, CorrelationRegistry,
    HttpAuthorizer, Resolution,
};
pub use channel::{ChannelHooks, ChannelKind, ChannelStore, PusherChannel};
pub use client::{ClientStatus, ConnectionState, Pusher, PusherHandlers, PusherOptions};
pub use messaging::{EventRouter, TransportEvent};
pub use transport::{Transport, TransportFactory, TransportLink};
pub use types::{Member, PusherError, PusherEvent, Result};
