//! Domain error types.
//!
//! These errors represent validation failures and broken references in the
//! domain layer. They are distinct from transport/IO errors.

use chrono::NaiveDateTime;

use super::{LegRef, Location};

/// Domain-level errors for validation and reference resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// Leg field combination fails the validity predicate
    #[error("invalid leg: {0}")]
    InvalidLeg(&'static str),

    /// User record fails validation
    #[error("invalid user: {0}")]
    InvalidUser(&'static str),

    /// Leg cannot be appended because it has no free capacity
    #[error("leg {0} is fully booked")]
    LegFull(LegRef),

    /// Leg departs before the itinerary so far has arrived
    #[error("leg departs at {departs} before the chain arrives at {arrives}")]
    DepartsTooEarly {
        departs: NaiveDateTime,
        arrives: NaiveDateTime,
    },

    /// Leg does not depart from the itinerary's current endpoint
    #[error("leg departs from {found}, expected {expected}")]
    NotConnected { expected: Location, found: Location },

    /// Appending the leg would depart a location twice
    #[error("itinerary already departs from {0}")]
    OriginRevisited(Location),

    /// A referenced leg no longer exists in the registry
    #[error("no such leg: {0}")]
    UnknownLeg(LegRef),

    /// A referenced user does not exist in the registry
    #[error("no such user: {0}")]
    UnknownUser(String),
}
