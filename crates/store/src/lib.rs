//! `store` crate — the external record store, seen through a narrow trait.
//!
//! The engine treats persistence as a collaborator: rows are plain JSON
//! objects addressed by table name and equality filter.  The in-memory
//! implementation here is the default backend for the CLI, the tests, and
//! any deployment that doesn't need durability.

pub mod broadcast;
pub mod error;
pub mod memory;
pub mod record;

pub use broadcast::{Broadcast, ChannelBroadcast, Event};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use record::{filter, Filter, RecordStore};
