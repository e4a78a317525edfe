//! Snapshot persistence.
//!
//! Captures the registry as a JSON document and rebuilds it by replaying
//! the capture: legs and users are re-added through the normal registry
//! operations, then each booked itinerary is reconstructed by resolving its
//! leg references against the restored catalog. An itinerary whose legs no
//! longer all resolve is discarded rather than restored half-broken.
//!
//! Encryption and scheduling of saves are outside this crate; this module
//! only defines the snapshot format and the replay.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{Category, Itinerary, LegRef, Location, TravelLeg, User, time};
use crate::registry::Registry;

/// Error from reading or writing snapshot files.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// A leg as stored in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegRecord {
    pub category: String,
    pub id: String,
    pub start: String,
    pub end: String,
    pub origin: String,
    pub destination: String,
    pub cost: f64,
    pub capacity: u32,
    pub provider: String,
}

impl LegRecord {
    fn capture(leg: &TravelLeg) -> Self {
        LegRecord {
            category: leg.category().to_string(),
            id: leg.id().to_string(),
            start: time::format_date_time(leg.start()),
            end: time::format_date_time(leg.end()),
            origin: leg.origin().to_string(),
            destination: leg.destination().to_string(),
            cost: leg.cost(),
            capacity: leg.capacity(),
            provider: leg.provider().to_string(),
        }
    }

    // Typed reconstruction; any malformed field makes the record invalid
    // as a whole.
    fn to_leg(&self) -> Option<TravelLeg> {
        let category: Category = self.category.parse().ok()?;
        let start = time::parse_date_time(&self.start).ok()?;
        let end = time::parse_date_time(&self.end).ok()?;
        let origin = Location::parse(&self.origin).ok()?;
        let destination = Location::parse(&self.destination).ok()?;

        TravelLeg::new(
            category,
            self.id.clone(),
            start,
            end,
            origin,
            destination,
            self.cost,
            self.capacity,
            self.provider.clone(),
        )
        .ok()
    }
}

/// A leg reference inside a booked itinerary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegRefRecord {
    pub category: String,
    pub id: String,
}

impl LegRefRecord {
    fn capture(leg_ref: &LegRef) -> Self {
        LegRefRecord {
            category: leg_ref.category().to_string(),
            id: leg_ref.id().to_string(),
        }
    }

    fn to_ref(&self) -> Option<LegRef> {
        let category: Category = self.category.parse().ok()?;
        Some(LegRef::new(category, self.id.clone()))
    }
}

/// A booked itinerary, stored as the ordered leg references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryRecord {
    pub legs: Vec<LegRefRecord>,
}

impl ItineraryRecord {
    fn capture(itinerary: &Itinerary) -> Self {
        ItineraryRecord {
            legs: itinerary
                .legs()
                .iter()
                .map(|leg| LegRefRecord::capture(&leg.leg_ref()))
                .collect(),
        }
    }

    // Rebuild against the restored catalog. None if any reference is
    // broken or the resolved legs no longer chain.
    fn to_itinerary(&self, registry: &Registry) -> Option<Itinerary> {
        let mut itinerary = Itinerary::new();
        for record in &self.legs {
            let leg_ref = record.to_ref()?;
            let leg = registry.get_leg(leg_ref.category(), leg_ref.id())?;
            itinerary.add(leg.clone()).ok()?;
        }
        if itinerary.is_empty() {
            return None;
        }
        Some(itinerary)
    }
}

/// A user as stored in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub first_names: String,
    pub last_name: String,
    pub address: String,
    pub credit_card: String,
    pub card_expiry: String,
    pub booked: Vec<ItineraryRecord>,
}

impl UserRecord {
    fn capture(user: &User) -> Self {
        UserRecord {
            email: user.email().to_string(),
            first_names: user.first_names().to_string(),
            last_name: user.last_name().to_string(),
            address: user.address().to_string(),
            credit_card: user.credit_card().to_string(),
            card_expiry: user.card_expiry().format(time::DATE_FORMAT).to_string(),
            booked: user.booked().iter().map(ItineraryRecord::capture).collect(),
        }
    }

    fn to_user(&self) -> Option<User> {
        let card_expiry =
            chrono::NaiveDate::parse_from_str(&self.card_expiry, time::DATE_FORMAT).ok()?;
        User::new(
            self.email.clone(),
            self.first_names.clone(),
            self.last_name.clone(),
            self.address.clone(),
            self.credit_card.clone(),
            card_expiry,
        )
        .ok()
    }
}

/// A complete capture of the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub legs: Vec<LegRecord>,
    pub users: Vec<UserRecord>,
}

impl Snapshot {
    /// Capture the current registry state.
    pub fn capture(registry: &Registry) -> Self {
        let legs = Category::ALL
            .iter()
            .flat_map(|&category| registry.all_legs(category))
            .map(LegRecord::capture)
            .collect();
        let users = registry.all_users().map(UserRecord::capture).collect();

        Snapshot { legs, users }
    }

    /// Rebuild a registry by replaying this snapshot.
    ///
    /// Malformed leg or user records are logged and skipped. Booked
    /// itineraries are reconstructed last, against the restored catalog;
    /// an itinerary is discarded if any of its legs is missing, and its
    /// seats are counted by booking it through the registry.
    pub fn restore(&self) -> Registry {
        let mut registry = Registry::new();

        for record in &self.legs {
            match record.to_leg() {
                Some(leg) => registry.add_leg(leg),
                None => warn!(id = %record.id, "skipping malformed leg record"),
            }
        }
        for record in &self.users {
            match record.to_user() {
                Some(user) => registry.add_user(user),
                None => warn!(email = %record.email, "skipping malformed user record"),
            }
        }

        for record in &self.users {
            for itinerary_record in &record.booked {
                match itinerary_record.to_itinerary(&registry) {
                    Some(itinerary) => {
                        if let Err(error) = registry.book(&record.email, itinerary) {
                            warn!(%error, email = %record.email, "could not restore booking");
                        }
                    }
                    None => {
                        info!(email = %record.email, "discarding booking with missing legs");
                    }
                }
            }
        }

        registry
    }

    /// Write this snapshot to a file as JSON.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Read a snapshot from a JSON file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;
    use chrono::NaiveDate;

    fn dt(s: &str) -> chrono::NaiveDateTime {
        time::parse_date_time(s).unwrap()
    }

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    fn leg(id: &str, from: &str, to: &str, start: &str, end: &str) -> TravelLeg {
        TravelLeg::new(
            Category::Flight,
            id,
            dt(start),
            dt(end),
            loc(from),
            loc(to),
            100.0,
            10,
            "Air Canada",
        )
        .unwrap()
    }

    fn user(email: &str) -> User {
        User::new(
            email,
            "Ada",
            "Lovelace",
            "12 Analytical Way",
            "4111111111111111",
            NaiveDate::from_ymd_opt(2019, 8, 1).unwrap(),
        )
        .unwrap()
    }

    fn populated() -> Registry {
        let mut registry = Registry::new();
        registry.add_leg(leg("A", "London", "Paris", "2016-03-14 16:37", "2016-03-14 17:22"));
        registry.add_leg(leg("B", "Paris", "Rome", "2016-03-14 19:22", "2016-03-14 22:40"));
        registry.add_user(user("ada@example.com"));

        let mut itinerary =
            Itinerary::single(registry.get_leg(Category::Flight, "A").unwrap().clone()).unwrap();
        itinerary
            .add(registry.get_leg(Category::Flight, "B").unwrap().clone())
            .unwrap();
        registry.book("ada@example.com", itinerary).unwrap();
        registry
    }

    #[test]
    fn capture_restore_roundtrip() {
        let registry = populated();
        let restored = Snapshot::capture(&registry).restore();

        let a = restored.get_leg(Category::Flight, "A").unwrap();
        assert_eq!(a.origin(), &loc("London"));
        assert_eq!(a.cost(), 100.0);

        let ada = restored.get_user("ada@example.com").unwrap();
        assert_eq!(ada.booked().len(), 1);
        assert_eq!(ada.booked()[0].len(), 2);

        // seats were re-counted through the booking replay
        assert_eq!(restored.get_leg(Category::Flight, "A").unwrap().bookings(), 1);
        assert_eq!(restored.get_leg(Category::Flight, "B").unwrap().bookings(), 1);
    }

    #[test]
    fn file_roundtrip() {
        let registry = populated();
        let snapshot = Snapshot::capture(&registry);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");

        snapshot.save_to_path(&path).unwrap();
        let loaded = Snapshot::load_from_path(&path).unwrap();
        let restored = loaded.restore();

        assert!(restored.get_leg(Category::Flight, "A").is_some());
        assert_eq!(restored.get_user("ada@example.com").unwrap().booked().len(), 1);
    }

    #[test]
    fn booking_with_missing_leg_is_discarded() {
        let registry = populated();
        let mut snapshot = Snapshot::capture(&registry);

        // drop leg B from the snapshot; the booking references it
        snapshot.legs.retain(|record| record.id != "B");
        let restored = snapshot.restore();

        assert!(restored.get_leg(Category::Flight, "B").is_none());
        assert!(restored.get_user("ada@example.com").unwrap().booked().is_empty());
        // no phantom seats on the surviving leg
        assert_eq!(restored.get_leg(Category::Flight, "A").unwrap().bookings(), 0);
    }

    #[test]
    fn malformed_records_are_skipped() {
        let registry = populated();
        let mut snapshot = Snapshot::capture(&registry);
        snapshot.legs.push(LegRecord {
            category: "zeppelin".into(),
            id: "Z1".into(),
            start: "2016-03-14 08:00".into(),
            end: "2016-03-14 09:00".into(),
            origin: "London".into(),
            destination: "Paris".into(),
            cost: 1.0,
            capacity: 1,
            provider: "Nope".into(),
        });
        snapshot.users.push(UserRecord {
            email: "not-an-email".into(),
            first_names: "X".into(),
            last_name: "Y".into(),
            address: String::new(),
            credit_card: String::new(),
            card_expiry: "2019-08-01".into(),
            booked: Vec::new(),
        });

        let restored = snapshot.restore();

        assert_eq!(
            Category::ALL
                .iter()
                .flat_map(|&c| restored.all_legs(c))
                .count(),
            2
        );
        assert_eq!(restored.all_users().count(), 1);
    }

    #[test]
    fn load_from_missing_file_is_an_io_error() {
        let result = Snapshot::load_from_path("/definitely/not/here.json");
        assert!(matches!(result, Err(PersistError::Io(_))));
    }
}
