//! The travel registry.
//!
//! [`Registry`] composes one leg store per category, the origin index, and
//! the user store, and keeps them consistent across every mutation. All
//! reads and writes go through it; nothing else holds the stores.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::{
    Category, DepartureWindow, DomainError, Itinerary, LegRef, Location, TravelLeg, User,
};
use crate::planner::{ItinerarySearch, LegProvider, SearchConfig, TravelOrder};
use crate::store::{LegStores, OriginIndex, UserStore};

/// The catalog of legs and users, with search over both.
///
/// # Consistency
///
/// The origin index is updated inside every mutation, so at all times every
/// stored leg sits in exactly one bucket (the one for its current origin)
/// and every indexed identity resolves. Removing or redefining a leg also
/// cancels the booked itineraries referencing it, releasing the seats the
/// cancelled itineraries held on their other legs.
///
/// # Concurrency
///
/// The registry is a plain synchronous structure. Callers must serialize
/// access externally (the web layer wraps it in one exclusive lock): the
/// cascades walk and mutate every user's bookings, which is unsafe under
/// concurrent reads.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    legs: LegStores,
    origin_index: OriginIndex,
    users: UserStore,
    config: SearchConfig,
}

impl Registry {
    /// Creates an empty registry with the default search configuration.
    pub fn new() -> Self {
        Registry::default()
    }

    /// Creates an empty registry with a custom search configuration.
    pub fn with_config(config: SearchConfig) -> Self {
        Registry {
            config,
            ..Registry::default()
        }
    }

    /// Returns the search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    // ----- legs -----

    /// Add a leg, or redefine the existing leg with the same identity.
    ///
    /// Re-adding a leg identical in every field is a no-op. A differing
    /// re-add overwrites the stored leg's fields in place and, because the
    /// redefinition may have changed the schedule or capacity, cancels all
    /// existing bookings against it: booked itineraries referencing it are
    /// stripped from their users and its counter is zeroed. The origin
    /// index entry moves to the (possibly changed) origin.
    pub fn add_leg(&mut self, leg: TravelLeg) {
        let leg_ref = leg.leg_ref();
        if let Some(existing) = self.legs.resolve(&leg_ref) {
            if existing.same_definition(&leg) {
                debug!(leg = %leg_ref, "re-added identical leg; nothing to do");
                return;
            }
            info!(leg = %leg_ref, "redefining leg; existing bookings are cancelled");
            self.unlink_leg(&leg_ref);
        }

        let stored = self.legs.store_mut(leg.category()).put(leg);
        stored.reset_bookings();
        self.origin_index.insert(stored);
    }

    /// Add every leg in turn.
    pub fn add_legs(&mut self, legs: impl IntoIterator<Item = TravelLeg>) {
        for leg in legs {
            self.add_leg(leg);
        }
    }

    /// Remove a leg, silently if absent.
    ///
    /// Booked itineraries referencing the leg are cancelled first (see
    /// [`Registry::add_leg`] for the cascade), then the leg leaves its
    /// category store.
    pub fn remove_leg(&mut self, category: Category, id: &str) {
        let leg_ref = LegRef::new(category, id);
        if self.legs.resolve(&leg_ref).is_none() {
            return;
        }
        self.unlink_leg(&leg_ref);
        self.legs.store_mut(category).remove(id);
    }

    /// Change a leg's id. No-op if the new id is already taken in the
    /// category, or no leg has the old id.
    ///
    /// On success the new identity is rewritten into the origin index and
    /// into every booked itinerary referencing the leg, so bookings survive
    /// the rename.
    pub fn change_leg_id(&mut self, category: Category, id: &str, new_id: &str) {
        if !self.legs.store_mut(category).rename(id, new_id.to_string()) {
            debug!(category = %category, id, new_id, "leg rename skipped");
            return;
        }

        let old_ref = LegRef::new(category, id);
        let new_ref = LegRef::new(category, new_id);
        if let Some(origin) = self.legs.resolve(&new_ref).map(|leg| leg.origin().clone()) {
            self.origin_index.replace(&origin, &old_ref, new_ref.clone());
        }
        self.users.rename_leg(&old_ref, new_id);
    }

    /// Look up a leg by identity.
    pub fn get_leg(&self, category: Category, id: &str) -> Option<&TravelLeg> {
        self.legs.store(category).get(id)
    }

    /// All legs of one category. Order is unspecified.
    pub fn all_legs(&self, category: Category) -> impl Iterator<Item = &TravelLeg> {
        self.legs.store(category).values()
    }

    /// Legs matching the given filters, across categories unless one is
    /// named, in the given order (or scan order for `None`).
    ///
    /// When an origin is given and no category is named, the origin index
    /// answers directly; a search without an origin has no index key and
    /// scans every category's store.
    pub fn search_legs(
        &self,
        date: Option<NaiveDate>,
        origin: Option<&Location>,
        destination: Option<&Location>,
        category: Option<Category>,
        order: Option<TravelOrder>,
    ) -> Vec<TravelLeg> {
        let window = date.map(DepartureWindow::single_day);

        let mut results: Vec<TravelLeg> = match (category, origin) {
            (Some(category), origin) => self
                .legs
                .store(category)
                .search(window.as_ref(), origin, destination, true)
                .into_iter()
                .cloned()
                .collect(),
            (None, None) => Category::ALL
                .iter()
                .flat_map(|&category| {
                    self.legs
                        .store(category)
                        .search(window.as_ref(), None, destination, true)
                })
                .cloned()
                .collect(),
            (None, Some(origin)) => self
                .origin_index
                .query(&self.legs, origin, destination, true, window.as_ref())
                .into_iter()
                .cloned()
                .collect(),
        };

        if let Some(order) = order {
            order.sort(&mut results);
        }
        results
    }

    // ----- users -----

    /// Register a user, or fold the profile into the existing registration
    /// with the same email. The booked itineraries survive an update.
    pub fn add_user(&mut self, user: User) {
        self.users.put(user);
    }

    /// Register every user in turn.
    pub fn add_users(&mut self, users: impl IntoIterator<Item = User>) {
        for user in users {
            self.add_user(user);
        }
    }

    /// Look up a user by email.
    pub fn get_user(&self, email: &str) -> Option<&User> {
        self.users.get(email)
    }

    /// All registered users. Order is unspecified.
    pub fn all_users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Change a user's email. No-op if the new email is already registered
    /// or no user has the old one.
    pub fn change_user_email(&mut self, email: &str, new_email: &str) {
        if !self.users.rename(email, new_email.to_string()) {
            debug!(email, new_email, "user rename skipped");
        }
    }

    /// Users whose name contains `name` and whose email contains `email`,
    /// both case-insensitively.
    pub fn search_users(&self, name: &str, email: &str) -> Vec<&User> {
        self.users.search(name, email)
    }

    // ----- itineraries and bookings -----

    /// Every itinerary from `origin` to `destination` departing on `date`,
    /// in the given order (or discovery order for `None`).
    pub fn search_itineraries(
        &self,
        date: NaiveDate,
        origin: &Location,
        destination: &Location,
        order: Option<TravelOrder>,
    ) -> Vec<Itinerary> {
        let provider = IndexedLegs {
            legs: &self.legs,
            index: &self.origin_index,
        };
        let search = ItinerarySearch::new(&provider, &self.config);
        let mut results = search.search(date, origin, destination);

        if let Some(order) = order {
            order.sort(&mut results);
        }
        results
    }

    /// Book an itinerary for a user.
    ///
    /// Takes one seat on each of the itinerary's legs (a full leg keeps
    /// its counter at capacity) and records the itinerary on the user.
    /// Booking an already-booked itinerary is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the user is unknown or any referenced leg does not
    /// resolve; nothing is changed in that case.
    pub fn book(&mut self, email: &str, itinerary: Itinerary) -> Result<(), DomainError> {
        let Some(user) = self.users.get(email) else {
            return Err(DomainError::UnknownUser(email.to_string()));
        };
        if user.has_booked(&itinerary) {
            debug!(email, "itinerary already booked; nothing to do");
            return Ok(());
        }
        for leg in itinerary.legs() {
            let leg_ref = leg.leg_ref();
            if self.legs.resolve(&leg_ref).is_none() {
                return Err(DomainError::UnknownLeg(leg_ref));
            }
        }

        for leg in itinerary.legs() {
            if let Some(live) = self.legs.resolve_mut(&leg.leg_ref()) {
                if !live.book() {
                    warn!(leg = %live.leg_ref(), "booked itinerary over a full leg");
                }
            }
        }
        if let Some(user) = self.users.get_mut(email) {
            user.record_booking(itinerary);
        }
        Ok(())
    }

    /// Cancel a user's booking of an itinerary, releasing one seat on each
    /// of its legs. Cancelling an itinerary that is not booked is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `Err` only if the user is unknown.
    pub fn unbook(&mut self, email: &str, itinerary: &Itinerary) -> Result<(), DomainError> {
        let Some(user) = self.users.get_mut(email) else {
            return Err(DomainError::UnknownUser(email.to_string()));
        };
        if !user.drop_booking(itinerary) {
            return Ok(());
        }
        for leg in itinerary.legs() {
            if let Some(live) = self.legs.resolve_mut(&leg.leg_ref()) {
                live.cancel_booking();
            }
        }
        Ok(())
    }

    /// Re-resolve an itinerary's legs against the current catalog, picking
    /// up in-place edits.
    ///
    /// # Errors
    ///
    /// Returns `Err` naming the first missing leg if any referenced leg has
    /// been removed; the itinerary is left unchanged.
    pub fn refresh_itinerary(&self, itinerary: &mut Itinerary) -> Result<(), DomainError> {
        itinerary.refresh(|leg_ref| self.legs.resolve(leg_ref).cloned())
    }

    /// Remove everything: legs, index, users.
    pub fn clear(&mut self) {
        self.legs.clear();
        self.origin_index.clear();
        self.users.clear();
    }

    // Sever a leg from everything that references it: its origin bucket,
    // and every user's booked itineraries. Stripped itineraries release
    // the seats they held on their remaining legs; the severed leg's own
    // counter is zeroed. The leg itself stays in its category store.
    fn unlink_leg(&mut self, leg_ref: &LegRef) {
        if let Some(leg) = self.legs.resolve(leg_ref) {
            let origin = leg.origin().clone();
            self.origin_index.remove(&origin, leg_ref);
        }

        let stripped = self.users.remove_itineraries_with(leg_ref);
        if !stripped.is_empty() {
            info!(leg = %leg_ref, count = stripped.len(), "cancelled itineraries referencing leg");
        }
        for itinerary in &stripped {
            for leg in itinerary.legs() {
                if let Some(live) = self.legs.resolve_mut(&leg.leg_ref()) {
                    live.cancel_booking();
                }
            }
        }

        if let Some(live) = self.legs.resolve_mut(leg_ref) {
            live.reset_bookings();
        }
    }
}

/// [`LegProvider`] view over the registry's index and stores.
struct IndexedLegs<'a> {
    legs: &'a LegStores,
    index: &'a OriginIndex,
}

impl LegProvider for IndexedLegs<'_> {
    fn departures(&self, origin: &Location, window: &DepartureWindow) -> Vec<&TravelLeg> {
        self.index
            .query(self.legs, origin, None, false, Some(window))
    }
}

#[cfg(test)]
mod tests;
