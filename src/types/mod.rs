pub mod constants;
pub mod error;
pub mod event;

pub use constants::*;
pub use error::{PusherError, Result};
pub use event::{Member, PusherEvent};
