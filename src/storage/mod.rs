//! Record storage backends.
//!
//! The registry reads and rewrites records through the [`RecordStore`]
//! trait. It references records by location and never owns their storage.

mod memory;
mod traits;
mod vault;

pub use crate::error::StorageError;
pub use memory::InMemoryRecordStore;
pub use traits::RecordStore;
pub use vault::VaultStore;
