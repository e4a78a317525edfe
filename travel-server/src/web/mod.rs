//! Web layer for the travel registry.
//!
//! Provides HTTP endpoints for maintaining the catalog and searching legs
//! and itineraries.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;
