//! Origin index for leg search.
//!
//! Itinerary search repeatedly asks "which legs depart from here?". Scanning
//! every category store per hop would make that quadratic in practice, so
//! the registry maintains this secondary index: lower-cased origin name to
//! the identities of the legs departing there, across all categories.

use std::collections::HashMap;

use crate::domain::{DepartureWindow, LegRef, Location, TravelLeg};

use super::legs::LegStores;

/// Secondary index from departure location to leg identities.
///
/// Buckets hold identities rather than copies, so queries always see the
/// canonical leg state (current capacity, current schedule) by resolving
/// through the category stores.
///
/// # Invariants
///
/// - a leg appears in exactly one bucket: the one for its own origin
/// - no bucket is empty (emptied buckets are removed outright)
///
/// The registry maintaining the index is responsible for keeping it in step
/// with the stores on every mutation.
#[derive(Debug, Clone, Default)]
pub struct OriginIndex {
    buckets: HashMap<String, Vec<LegRef>>,
}

impl OriginIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        OriginIndex::default()
    }

    /// Returns the number of indexed origins.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Index a leg under its origin, creating the bucket if needed.
    pub fn insert(&mut self, leg: &TravelLeg) {
        self.buckets
            .entry(leg.origin().key())
            .or_default()
            .push(leg.leg_ref());
    }

    /// Drop a leg's entry from its origin bucket, removing the bucket if it
    /// becomes empty. Silently does nothing if the leg is not indexed.
    pub fn remove(&mut self, origin: &Location, leg_ref: &LegRef) {
        let key = origin.key();
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.retain(|entry| entry != leg_ref);
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
        }
    }

    /// Rewrite an indexed identity in place after a leg id rename.
    pub fn replace(&mut self, origin: &Location, old: &LegRef, new: LegRef) {
        if let Some(bucket) = self.buckets.get_mut(&origin.key()) {
            for entry in bucket.iter_mut() {
                if entry == old {
                    *entry = new;
                    return;
                }
            }
        }
    }

    /// Returns the identities departing from an origin. Empty for unknown
    /// origins.
    pub fn bucket(&self, origin: &Location) -> &[LegRef] {
        self.buckets
            .get(&origin.key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns whether the leg is indexed under the origin.
    pub fn contains(&self, origin: &Location, leg_ref: &LegRef) -> bool {
        self.bucket(origin).contains(leg_ref)
    }

    /// All legs departing `origin`, filtered.
    ///
    /// The optional `destination` matches case-insensitively; the optional
    /// `window` constrains the departure time; full legs are skipped unless
    /// `include_full` is set. Identities that no longer resolve are skipped
    /// (the registry removes them eagerly, so none should exist).
    pub fn query<'a>(
        &self,
        legs: &'a LegStores,
        origin: &Location,
        destination: Option<&Location>,
        include_full: bool,
        window: Option<&DepartureWindow>,
    ) -> Vec<&'a TravelLeg> {
        self.bucket(origin)
            .iter()
            .filter_map(|leg_ref| legs.resolve(leg_ref))
            .filter(|leg| {
                destination.is_none_or(|d| leg.destination() == d)
                    && (include_full || leg.available_capacity() > 0)
                    && window.is_none_or(|w| leg.starts_within(w))
            })
            .collect()
    }

    /// Iterate over the indexed origin keys.
    pub fn origins(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Remove every bucket.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
