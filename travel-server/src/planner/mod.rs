//! Itinerary planning.
//!
//! This module implements the core search that answers: "how do I get from
//! here to there on this date?" — enumerating every valid chain of legs
//! whose connections respect the stopover window, then ordering the results
//! however the caller asked.

mod config;
mod order;
mod search;

pub use config::SearchConfig;
pub use order::{InvalidSortKey, SortKey, Travel, TravelOrder};
pub use search::{ItinerarySearch, LegProvider};
