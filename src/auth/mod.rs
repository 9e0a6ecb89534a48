// Auth module - Correlation registry and the cross-boundary authorization handshake
mod bridge;
mod http;
mod payload;
mod registry;

pub use bridge::{AuthorizationBridge, AuthorizationRequest, Authorizer};
pub use http::HttpAuthorizer;
pub use payload::AuthorizerResult;
pub use registry::{CorrelationRegistry, PendingHandle, Resolution};
