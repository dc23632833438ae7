//! Entity layer modules.
//!
//! This module groups canonical records, name normalization, the per-type
//! index, and tiered resolution against it.

#[allow(clippy::module_inception)]
pub mod entity;
pub mod index;
pub mod normalize;
pub mod resolution;

pub use entity::{EntityRecord, EntityType};
pub use index::{EntityIndex, RecordSlot};
pub use normalize::{extract_variants, normalize, similarity};
pub use resolution::find_in_index;
