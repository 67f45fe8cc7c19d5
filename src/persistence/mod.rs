//! Match persistence.
//!
//! Match records are written once, when an item is created, onto the new item
//! and each counterpart. Reads filter and sort on the stored percentage only.

mod error;
pub mod memory;
pub mod reader;
pub mod recorder;
pub mod store;


pub use error::StoreError;
pub use memory::MemoryItemStore;
pub use reader::{ItemMatches, MatchReader};
pub use recorder::{CounterpartIssue, MatchRecorder, PersistReport};
pub use store::ItemStore;
