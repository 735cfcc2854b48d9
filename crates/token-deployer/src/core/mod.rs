//! Core application services: shared context, storage, events and logging.

pub mod context;
pub mod events;
pub mod logging;
pub mod storage;

pub use context::Context;
pub use events::{EventBus, PipelineEvent};
pub use logging::init_logging;
pub use storage::Storage;
