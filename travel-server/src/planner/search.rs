//! Itinerary enumeration.
//!
//! Finds every chain of legs from an origin to a destination on a given
//! date, where each connection falls inside the configured stopover window.
//! This is exhaustive enumeration, not optimization: all matching
//! itineraries are materialized and any ranking happens afterwards.

use tracing::warn;

use crate::domain::{DepartureWindow, Itinerary, Location, TravelLeg};

use super::config::SearchConfig;

/// Source of candidate legs for the search.
///
/// This abstraction allows the planner to be tested with mock data. The
/// production implementation answers from the origin index, which is why
/// search cost scales with legs departing the queried origin rather than
/// with the whole catalog.
pub trait LegProvider {
    /// Legs departing `origin` inside `window` that still have free
    /// capacity. Full legs must not be returned: a journey cannot be built
    /// over a segment nobody can board.
    fn departures(&self, origin: &Location, window: &DepartureWindow) -> Vec<&TravelLeg>;
}

/// Depth-first itinerary enumerator over a [`LegProvider`].
pub struct ItinerarySearch<'a, P: LegProvider> {
    provider: &'a P,
    config: &'a SearchConfig,
}

impl<'a, P: LegProvider> ItinerarySearch<'a, P> {
    /// Create a new search over a provider.
    pub fn new(provider: &'a P, config: &'a SearchConfig) -> Self {
        Self { provider, config }
    }

    /// Enumerate every itinerary from `origin` to `destination` departing
    /// on `date`.
    ///
    /// Searching from a location to itself is contradictory input: it is
    /// reported with a warning and yields an empty result, not an error.
    /// Otherwise the first leg may depart any time on `date`; each
    /// subsequent leg must depart within the stopover window after the
    /// previous arrival.
    pub fn search(
        &self,
        date: chrono::NaiveDate,
        origin: &Location,
        destination: &Location,
    ) -> Vec<Itinerary> {
        if origin == destination {
            warn!(%origin, "itinerary search with origin equal to destination");
            return Vec::new();
        }

        let mut results = Vec::new();
        self.explore(
            DepartureWindow::single_day(date),
            origin,
            destination,
            &Itinerary::new(),
            &mut results,
        );
        results
    }

    // One step of the enumeration: either the chain has reached the
    // destination, or it branches over every boardable departure.
    //
    // Each branch gets its own clone of the chain so far; no state is
    // shared or memoized between branches, because whether a leg is usable
    // depends on the whole prefix (visited origins), not just the current
    // location and time. Recursion depth is bounded by the number of
    // distinct locations, since every step adds a new departure origin.
    fn explore(
        &self,
        window: DepartureWindow,
        origin: &Location,
        destination: &Location,
        so_far: &Itinerary,
        results: &mut Vec<Itinerary>,
    ) {
        if origin == destination {
            results.push(so_far.clone());
            return;
        }

        for leg in self.provider.departures(origin, &window) {
            // a leg whose destination we already departed from would
            // revisit it; skip the whole branch
            if so_far.contains_origin(leg.destination()) {
                continue;
            }

            let next_window = DepartureWindow::bounded(
                leg.end() + self.config.min_stopover(),
                leg.end() + self.config.max_stopover(),
            );

            let mut branch = so_far.clone();
            match branch.add(leg.clone()) {
                Ok(()) => {
                    self.explore(next_window, leg.destination(), destination, &branch, results);
                }
                Err(error) => {
                    // the provider contract should make this unreachable
                    warn!(%error, leg = %leg.leg_ref(), "skipping unchainable candidate");
                }
            }
        }
    }
}
