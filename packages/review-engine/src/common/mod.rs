// Common types shared across domains and the kernel

pub mod entity_ids;
pub mod errors;
pub mod id;

pub use entity_ids::*;
pub use errors::{EngineResult, ReviewEngineError};
pub use id::Id;
