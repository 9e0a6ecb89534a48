// Messaging module - Inbound event classification and routing
pub mod event;
pub mod router;

pub use event::{InboundEvent, TransportEvent, decode_payload, normalize_event_name};
pub use router::EventRouter;
