//! Travel leg type.
//!
//! A `TravelLeg` is a single scheduled segment (one flight, one train, one
//! coach ride, one ferry crossing) between two locations. Legs are the edges
//! of the travel graph the itinerary search walks.

use std::fmt;

use chrono::{Duration, NaiveDateTime};

use super::{Category, DepartureWindow, DomainError, Location, time};

/// The identity of a leg: its category plus its id.
///
/// Leg ids are only unique within a category, so a bare id is not enough to
/// resolve a leg. Itineraries and bookings refer to legs by `LegRef` and
/// re-resolve them against the registry when freshness matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LegRef {
    category: Category,
    id: String,
}

impl LegRef {
    /// Create a reference from a category and id.
    pub fn new(category: Category, id: impl Into<String>) -> Self {
        LegRef {
            category,
            id: id.into(),
        }
    }

    /// Returns the category of the referenced leg.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns the id of the referenced leg.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for LegRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category, self.id)
    }
}

/// A single scheduled travel segment.
///
/// Validated at construction: the arrival never precedes the departure, the
/// origin and destination differ (case-insensitively), and the cost is
/// non-negative. Code receiving a `TravelLeg` can rely on these invariants.
///
/// The booking counter is live state, not part of the leg's definition:
/// two legs are equal when every definition field matches, regardless of
/// how many seats are taken.
///
/// # Examples
///
/// ```
/// use travel_server::domain::{Category, Location, TravelLeg, time};
///
/// let leg = TravelLeg::new(
///     Category::Flight,
///     "AC100",
///     time::parse_date_time("2016-03-14 16:37").unwrap(),
///     time::parse_date_time("2016-03-14 17:22").unwrap(),
///     Location::parse("London").unwrap(),
///     Location::parse("Paris").unwrap(),
///     212.50,
///     120,
///     "Air Canada",
/// )
/// .unwrap();
///
/// assert_eq!(leg.available_capacity(), 120);
/// assert_eq!(leg.duration(), chrono::Duration::minutes(45));
/// ```
#[derive(Debug, Clone)]
pub struct TravelLeg {
    category: Category,
    id: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    origin: Location,
    destination: Location,
    cost: f64,
    capacity: u32,
    provider: String,
    bookings: u32,
}

impl TravelLeg {
    /// Construct a leg, validating the field combination.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `end` is before `start`
    /// - `origin` equals `destination` (case-insensitively)
    /// - `cost` is negative or not a number
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        category: Category,
        id: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        origin: Location,
        destination: Location,
        cost: f64,
        capacity: u32,
        provider: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::InvalidLeg("end time precedes start time"));
        }
        if origin == destination {
            return Err(DomainError::InvalidLeg("origin equals destination"));
        }
        if !(cost >= 0.0) {
            return Err(DomainError::InvalidLeg("cost must be non-negative"));
        }

        Ok(TravelLeg {
            category,
            id: id.into(),
            start,
            end,
            origin,
            destination,
            cost,
            capacity,
            provider: provider.into(),
            bookings: 0,
        })
    }

    /// Returns the category of this leg.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns the id of this leg (unique within its category).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    /// Returns this leg's identity.
    pub fn leg_ref(&self) -> LegRef {
        LegRef::new(self.category, self.id.clone())
    }

    /// Returns the departure time.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Returns the arrival time.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Returns the departure location.
    pub fn origin(&self) -> &Location {
        &self.origin
    }

    /// Returns the arrival location.
    pub fn destination(&self) -> &Location {
        &self.destination
    }

    /// Returns the ticket cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Returns the total seat capacity.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the operator name.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Returns the number of seats currently booked.
    pub fn bookings(&self) -> u32 {
        self.bookings
    }

    /// Returns the number of free seats.
    pub fn available_capacity(&self) -> u32 {
        self.capacity - self.bookings
    }

    /// Returns true if no seats are free.
    pub fn is_full(&self) -> bool {
        self.bookings >= self.capacity
    }

    /// Returns the scheduled duration.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Take one seat. Returns false (and changes nothing) if the leg is full.
    pub fn book(&mut self) -> bool {
        if self.is_full() {
            return false;
        }
        self.bookings += 1;
        true
    }

    /// Release one seat. Does nothing if no seats are booked.
    pub fn cancel_booking(&mut self) {
        self.bookings = self.bookings.saturating_sub(1);
    }

    /// Drop every booking on this leg.
    pub fn reset_bookings(&mut self) {
        self.bookings = 0;
    }

    /// Returns whether this leg departs inside the window.
    pub fn starts_within(&self, window: &DepartureWindow) -> bool {
        window.contains(self.start)
    }

    /// Overwrite every definition field with `other`'s, keeping identity.
    ///
    /// The category and id stay as they are; the booking counter is not
    /// copied either (the registry resets it separately when an update
    /// invalidates existing bookings).
    pub fn update_from(&mut self, other: TravelLeg) {
        self.start = other.start;
        self.end = other.end;
        self.origin = other.origin;
        self.destination = other.destination;
        self.cost = other.cost;
        self.capacity = other.capacity;
        self.provider = other.provider;
    }

    /// Returns whether every definition field matches, ignoring the live
    /// booking counter.
    pub fn same_definition(&self, other: &TravelLeg) -> bool {
        self.category == other.category
            && self.id == other.id
            && self.start == other.start
            && self.end == other.end
            && self.origin == other.origin
            && self.destination == other.destination
            && self.cost == other.cost
            && self.capacity == other.capacity
            && self.provider == other.provider
    }

    /// Render this leg as a single comma-separated line:
    /// `id,start,end,provider,origin,destination[,cost]`.
    pub fn format_line(&self, include_cost: bool) -> String {
        let mut line = format!(
            "{},{},{},{},{},{}",
            self.id,
            time::format_date_time(self.start),
            time::format_date_time(self.end),
            self.provider,
            self.origin,
            self.destination,
        );
        if include_cost {
            line.push_str(&format!(",{:.2}", self.cost));
        }
        line
    }
}

impl PartialEq for TravelLeg {
    fn eq(&self, other: &Self) -> bool {
        self.same_definition(other)
    }
}

impl fmt::Display for TravelLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_line(true))
    }
}
