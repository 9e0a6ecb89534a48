// Infrastructure module - Background task tracking and callback isolation
pub mod dispatch;
pub mod task_manager;

pub use dispatch::{Callback, dispatch};
pub use task_manager::TaskManager;
