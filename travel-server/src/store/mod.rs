//! Storage for the travel registry.
//!
//! Legs and users live in uniqueness-keyed stores with merge-on-insert
//! semantics; a secondary origin index groups leg identities by departure
//! location for itinerary search.

mod legs;
mod origin_index;
mod unique;
mod users;

pub use legs::{LegStore, LegStores};
pub use origin_index::OriginIndex;
pub use unique::{Keyed, Merge, UniqueStore};
pub use users::UserStore;
