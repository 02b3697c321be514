pub mod client;
pub mod memory;
pub mod mongo;

pub use client::{DocumentStore, JsonDocument, ListFilter, StoreError, UpdateOutcome};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
