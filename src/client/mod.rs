// Module declarations
mod connection;
mod core;
mod handlers;
mod options;
mod state;

// Public API exports
pub use self::core::Pusher;
pub(crate) use self::core::ClientInner;
pub use connection::{ClientStatus, ConnectionState};
pub use handlers::{AuthorizerCallback, PusherHandlers};
pub use options::{ProxyAddress, PusherOptions};
pub use state::ClientState;
