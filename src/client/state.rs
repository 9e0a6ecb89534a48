use super::{PusherHandlers, PusherOptions};
use crate::infrastructure::TaskManager;
use crate::transport::Transport;
use std::sync::Arc;

/// Consolidated mutable state of the facade, guarded by one lock.
///
/// `transport` is `Some` exactly while the client is initialized.
pub struct ClientState {
    pub options: Option<PusherOptions>,

    /// Global callbacks shared with the event router
    pub handlers: Arc<PusherHandlers>,

    pub transport: Option<Arc<dyn Transport>>,

    /// Whether `connect` was called since `init`
    pub connect_requested: bool,

    /// Event router and authorization listener tasks
    pub task_manager: TaskManager,
}

impl ClientState {
    pub fn new() -> Self {
        Self {
            options: None,
            handlers: Arc::new(PusherHandlers::default()),
            transport: None,
            connect_requested: false,
            task_manager: TaskManager::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.transport.is_some()
    }

    /// Returns to the uninitialized state, handing back the transport that was in use.
    pub fn clear(&mut self) -> Option<Arc<dyn Transport>> {
        self.task_manager.abort_all();
        self.options = None;
        self.handlers = Arc::new(PusherHandlers::default());
        self.connect_requested = false;
        self.transport.take()
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}
