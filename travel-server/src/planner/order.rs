//! Result ordering for search results.
//!
//! Leg search and itinerary search both accept an optional caller-chosen
//! ordering applied after the results are materialized. Legs and
//! itineraries share the [`Travel`] trait so one ordering type covers both.

use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};

use crate::domain::{Itinerary, TravelLeg};

/// Common facts shared by anything travel-shaped.
pub trait Travel {
    /// Overall departure time.
    fn start_time(&self) -> NaiveDateTime;

    /// Overall arrival time.
    fn end_time(&self) -> NaiveDateTime;

    /// Overall cost.
    fn total_cost(&self) -> f64;

    /// Time between departure and arrival.
    fn travel_time(&self) -> Duration {
        self.end_time() - self.start_time()
    }
}

impl Travel for TravelLeg {
    fn start_time(&self) -> NaiveDateTime {
        self.start()
    }

    fn end_time(&self) -> NaiveDateTime {
        self.end()
    }

    fn total_cost(&self) -> f64 {
        self.cost()
    }
}

impl Travel for Itinerary {
    // Search results are never empty itineraries; an empty one sorts
    // before everything rather than panicking.
    fn start_time(&self) -> NaiveDateTime {
        self.start().unwrap_or(NaiveDateTime::MIN)
    }

    fn end_time(&self) -> NaiveDateTime {
        self.end().unwrap_or(NaiveDateTime::MIN)
    }

    fn total_cost(&self) -> f64 {
        self.cost()
    }
}

impl<T: Travel> Travel for &T {
    fn start_time(&self) -> NaiveDateTime {
        (*self).start_time()
    }

    fn end_time(&self) -> NaiveDateTime {
        (*self).end_time()
    }

    fn total_cost(&self) -> f64 {
        (*self).total_cost()
    }
}

/// Error returned when parsing an unknown sort key name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key: {0}")]
pub struct InvalidSortKey(String);

/// What to compare travels by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    TotalCost,
    TravelTime,
    StartTime,
    EndTime,
}

impl FromStr for SortKey {
    type Err = InvalidSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cost" => Ok(SortKey::TotalCost),
            "time" | "duration" => Ok(SortKey::TravelTime),
            "start" => Ok(SortKey::StartTime),
            "end" => Ok(SortKey::EndTime),
            _ => Err(InvalidSortKey(s.to_string())),
        }
    }
}

/// A sort key plus a direction.
#[derive(Debug, Clone, Copy)]
pub struct TravelOrder {
    key: SortKey,
    descending: bool,
}

impl TravelOrder {
    /// Smallest first.
    pub fn ascending(key: SortKey) -> Self {
        TravelOrder {
            key,
            descending: false,
        }
    }

    /// Largest first.
    pub fn descending(key: SortKey) -> Self {
        TravelOrder {
            key,
            descending: true,
        }
    }

    /// Compare two travels under this order.
    pub fn compare<T: Travel>(&self, a: &T, b: &T) -> Ordering {
        let ordering = match self.key {
            SortKey::TotalCost => a.total_cost().total_cmp(&b.total_cost()),
            SortKey::TravelTime => a.travel_time().cmp(&b.travel_time()),
            SortKey::StartTime => a.start_time().cmp(&b.start_time()),
            SortKey::EndTime => a.end_time().cmp(&b.end_time()),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }

    /// Sort a slice of travels under this order.
    pub fn sort<T: Travel>(&self, items: &mut [T]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}
