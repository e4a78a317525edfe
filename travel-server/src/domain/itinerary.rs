//! Itinerary type.
//!
//! An `Itinerary` is an ordered chain of travel legs forming one continuous
//! journey. The chain is validated at every append, so any itinerary handed
//! out by the search engine or rebuilt from a snapshot satisfies the time
//! and connectivity invariants.

use std::collections::HashMap;
use std::fmt;

use chrono::{Duration, NaiveDateTime};

use super::{DomainError, LegRef, Location, TravelLeg, time};

/// An ordered, validated chain of travel legs.
///
/// Legs are stored as snapshots: an itinerary does not observe later edits
/// to the registry until [`Itinerary::refresh`] re-resolves each leg by its
/// identity. Alongside the legs an index of lower-cased departure locations
/// is kept, which makes "does this journey already depart from X" an O(1)
/// question and guarantees no location is departed from twice.
///
/// # Invariants
///
/// For every adjacent pair of legs:
/// - the later leg departs no earlier than the earlier leg arrives
/// - the later leg departs from the earlier leg's destination
///
/// and no two legs share a departure location.
#[derive(Debug, Clone, Default)]
pub struct Itinerary {
    legs: Vec<TravelLeg>,
    // lower-cased origin -> position in `legs`
    visited: HashMap<String, usize>,
    cost: f64,
}

impl Itinerary {
    /// Creates an empty itinerary.
    pub fn new() -> Self {
        Itinerary::default()
    }

    /// Creates a single-leg itinerary.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the leg has no free capacity.
    pub fn single(leg: TravelLeg) -> Result<Self, DomainError> {
        let mut itinerary = Itinerary::new();
        itinerary.add(leg)?;
        Ok(itinerary)
    }

    /// Append a leg to the end of the chain.
    ///
    /// # Errors
    ///
    /// Returns `Err` (leaving the itinerary unchanged) if:
    /// - the leg has no free capacity
    /// - the leg departs before the chain's current arrival time
    /// - the chain already departs from the leg's origin
    /// - the leg does not depart from the chain's current destination
    pub fn add(&mut self, leg: TravelLeg) -> Result<(), DomainError> {
        if leg.is_full() {
            return Err(DomainError::LegFull(leg.leg_ref()));
        }
        if let Some(last) = self.legs.last() {
            if leg.start() < last.end() {
                return Err(DomainError::DepartsTooEarly {
                    departs: leg.start(),
                    arrives: last.end(),
                });
            }
            if self.contains_origin(leg.origin()) {
                return Err(DomainError::OriginRevisited(leg.origin().clone()));
            }
            if leg.origin() != last.destination() {
                return Err(DomainError::NotConnected {
                    expected: last.destination().clone(),
                    found: leg.origin().clone(),
                });
            }
        }

        self.visited.insert(leg.origin().key(), self.legs.len());
        self.cost += leg.cost();
        self.legs.push(leg);
        Ok(())
    }

    /// Returns the legs in travel order.
    pub fn legs(&self) -> &[TravelLeg] {
        &self.legs
    }

    /// Returns the number of legs.
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Returns true if the itinerary has no legs.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Returns whether any leg departs from the given location.
    pub fn contains_origin(&self, origin: &Location) -> bool {
        self.visited.contains_key(&origin.key())
    }

    /// Returns whether the chain contains the identified leg.
    pub fn contains_leg(&self, leg_ref: &LegRef) -> bool {
        self.legs.iter().any(|leg| leg.leg_ref() == *leg_ref)
    }

    /// Returns the overall departure location.
    pub fn origin(&self) -> Option<&Location> {
        self.legs.first().map(TravelLeg::origin)
    }

    /// Returns the overall arrival location.
    pub fn destination(&self) -> Option<&Location> {
        self.legs.last().map(TravelLeg::destination)
    }

    /// Returns the overall departure time.
    pub fn start(&self) -> Option<NaiveDateTime> {
        self.legs.first().map(TravelLeg::start)
    }

    /// Returns the overall arrival time.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.legs.last().map(TravelLeg::end)
    }

    /// Returns the summed cost of all legs.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Returns the time between overall departure and arrival, stopovers
    /// included. Zero for an empty itinerary.
    pub fn duration(&self) -> Duration {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => end - start,
            _ => Duration::zero(),
        }
    }

    /// Re-resolve every leg against the authoritative store.
    ///
    /// Each contained leg is replaced by the resolver's current copy for its
    /// `(category, id)` identity, picking up in-place edits.
    ///
    /// # Errors
    ///
    /// Returns `Err` naming the first missing leg if any referenced leg no
    /// longer resolves; the itinerary is left unchanged in that case.
    pub fn refresh<F>(&mut self, resolve: F) -> Result<(), DomainError>
    where
        F: Fn(&LegRef) -> Option<TravelLeg>,
    {
        let mut fresh = Vec::with_capacity(self.legs.len());
        for leg in &self.legs {
            let leg_ref = leg.leg_ref();
            fresh.push(resolve(&leg_ref).ok_or(DomainError::UnknownLeg(leg_ref))?);
        }
        self.replace_legs(fresh);
        Ok(())
    }

    /// Rewrite the id of a contained leg after a registry rename.
    pub(crate) fn rename_leg(&mut self, from: &LegRef, to: &str) {
        for leg in &mut self.legs {
            if leg.leg_ref() == *from {
                leg.set_id(to.to_string());
            }
        }
    }

    // Swap in resolved legs and rebuild the derived state. The incoming
    // legs come from refresh(), which preserves order; edits may have
    // changed origins, so the visited index is rebuilt from scratch.
    fn replace_legs(&mut self, legs: Vec<TravelLeg>) {
        self.visited.clear();
        self.cost = 0.0;
        for (position, leg) in legs.iter().enumerate() {
            self.visited.insert(leg.origin().key(), position);
            self.cost += leg.cost();
        }
        self.legs = legs;
    }
}

impl PartialEq for Itinerary {
    fn eq(&self, other: &Self) -> bool {
        self.legs == other.legs
    }
}

impl fmt::Display for Itinerary {
    /// One line per leg (without cost), then the total cost to two decimal
    /// places, then the total duration as `HH:MM`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for leg in &self.legs {
            writeln!(f, "{}", leg.format_line(false))?;
        }
        writeln!(f, "{:.2}", self.cost)?;
        write!(f, "{}", time::format_hhmm(self.duration()))
    }
}
