//! Agora Domain Model
//!
//! - **Value Objects**: ContentKind, ContentStatus
//! - **Aggregates**: ContentMeta
//! - **Domain Events**: ModerationEvent
//! - **Repositories**: Repository, InMemoryRepository

pub mod value_objects;
pub mod aggregates;
pub mod events;
pub mod repositories;

pub use value_objects::*;
pub use aggregates::*;
pub use events::*;
pub use repositories::*;
