//! Per-category leg storage.

use crate::domain::{Category, DepartureWindow, LegRef, Location, TravelLeg};

use super::unique::{Keyed, Merge, UniqueStore};

impl Keyed for TravelLeg {
    type Key = String;

    fn key(&self) -> String {
        self.id().to_string()
    }

    fn set_key(&mut self, key: String) {
        self.set_id(key);
    }
}

impl Merge for TravelLeg {
    fn merge_from(&mut self, other: Self) {
        self.update_from(other);
    }
}

/// All legs of one category, keyed by leg id.
#[derive(Debug, Clone)]
pub struct LegStore {
    category: Category,
    legs: UniqueStore<TravelLeg>,
}

impl LegStore {
    /// Creates an empty store for one category.
    pub fn new(category: Category) -> Self {
        LegStore {
            category,
            legs: UniqueStore::new(),
        }
    }

    /// Returns the category this store holds.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Returns the number of stored legs.
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    /// Returns true if no legs are stored.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Look up a leg by id.
    pub fn get(&self, id: &str) -> Option<&TravelLeg> {
        self.legs.get(id)
    }

    /// Look up a leg by id, mutably.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut TravelLeg> {
        self.legs.get_mut(id)
    }

    /// Returns whether a leg with the id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.legs.contains(id)
    }

    /// Insert a leg, or fold it into the stored leg with the same id.
    /// Returns the canonical stored leg.
    pub fn put(&mut self, leg: TravelLeg) -> &mut TravelLeg {
        self.legs.put(leg)
    }

    /// Remove the leg with the id, silently if absent.
    pub fn remove(&mut self, id: &str) {
        self.legs.remove(id);
    }

    /// Change a leg's id. No-op (returning false) if the new id is taken
    /// or the old id does not exist.
    pub fn rename(&mut self, id: &str, new_id: String) -> bool {
        self.legs.rename(id, new_id)
    }

    /// Iterate over all legs in this store. Order is unspecified.
    pub fn values(&self) -> impl Iterator<Item = &TravelLeg> {
        self.legs.values()
    }

    /// Remove every leg.
    pub fn clear(&mut self) {
        self.legs.clear();
    }

    /// Flat scan: every leg matching the optional filters.
    ///
    /// `window` constrains the departure time, `origin` and `destination`
    /// match case-insensitively, and full legs are skipped unless
    /// `include_full` is set. Passing `None` for a filter matches all legs.
    pub fn search(
        &self,
        window: Option<&DepartureWindow>,
        origin: Option<&Location>,
        destination: Option<&Location>,
        include_full: bool,
    ) -> Vec<&TravelLeg> {
        self.legs
            .values()
            .filter(|leg| {
                window.is_none_or(|w| leg.starts_within(w))
                    && origin.is_none_or(|o| leg.origin() == o)
                    && (include_full || leg.available_capacity() > 0)
                    && destination.is_none_or(|d| leg.destination() == d)
            })
            .collect()
    }
}

/// One [`LegStore`] per category.
#[derive(Debug, Clone)]
pub struct LegStores {
    stores: [LegStore; Category::ALL.len()],
}

impl LegStores {
    /// Creates empty stores for every category.
    pub fn new() -> Self {
        LegStores {
            stores: Category::ALL.map(LegStore::new),
        }
    }

    /// Returns the store for a category.
    pub fn store(&self, category: Category) -> &LegStore {
        &self.stores[category.index()]
    }

    /// Returns the store for a category, mutably.
    pub fn store_mut(&mut self, category: Category) -> &mut LegStore {
        &mut self.stores[category.index()]
    }

    /// Resolve a leg reference to the canonical stored leg.
    pub fn resolve(&self, leg_ref: &LegRef) -> Option<&TravelLeg> {
        self.store(leg_ref.category()).get(leg_ref.id())
    }

    /// Resolve a leg reference to the canonical stored leg, mutably.
    pub fn resolve_mut(&mut self, leg_ref: &LegRef) -> Option<&mut TravelLeg> {
        self.store_mut(leg_ref.category()).get_mut(leg_ref.id())
    }

    /// Iterate over every leg of every category.
    pub fn iter_all(&self) -> impl Iterator<Item = &TravelLeg> {
        self.stores.iter().flat_map(LegStore::values)
    }

    /// Remove every leg of every category.
    pub fn clear(&mut self) {
        for store in &mut self.stores {
            store.clear();
        }
    }
}

impl Default for LegStores {
    fn default() -> Self {
        Self::new()
    }
}
