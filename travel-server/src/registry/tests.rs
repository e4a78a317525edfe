//! Registry behavior tests.

use chrono::{NaiveDate, NaiveDateTime};

use super::*;
use crate::domain::time;
use crate::planner::SortKey;

fn dt(s: &str) -> NaiveDateTime {
    time::parse_date_time(s).unwrap()
}

fn date() -> NaiveDate {
    dt("2016-03-14 00:00").date()
}

fn loc(s: &str) -> Location {
    Location::parse(s).unwrap()
}

fn leg(
    category: Category,
    id: &str,
    from: &str,
    to: &str,
    start: &str,
    end: &str,
    cost: f64,
    capacity: u32,
) -> TravelLeg {
    TravelLeg::new(
        category, id,
        dt(start),
        dt(end),
        loc(from),
        loc(to),
        cost,
        capacity,
        "Operator",
    )
    .unwrap()
}

fn flight(id: &str, from: &str, to: &str, start: &str, end: &str) -> TravelLeg {
    leg(Category::Flight, id, from, to, start, end, 100.0, 10)
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

/// A registry with the London/Paris/Rome example network and one user.
fn populated() -> Registry {
    let mut registry = Registry::new();
    registry.add_leg(flight(
        "A",
        "London",
        "Paris",
        "2016-03-14 16:37",
        "2016-03-14 17:22",
    ));
    registry.add_leg(flight(
        "B",
        "Paris",
        "Rome",
        "2016-03-14 19:22",
        "2016-03-14 22:40",
    ));
    registry.add_leg(flight(
        "C",
        "London",
        "Rome",
        "2016-03-14 22:40",
        "2016-03-15 01:59",
    ));
    registry.add_user(user("ada@example.com"));
    registry
}

/// The origin-index consistency property: every stored leg is indexed
/// exactly once, under its own origin, and nothing else is indexed.
fn assert_index_consistent(registry: &Registry) {
    let mut indexed_total = 0;
    for origin_key in registry.origin_index.origins() {
        let origin = Location::parse(origin_key).unwrap();
        let bucket = registry.origin_index.bucket(&origin);
        assert!(!bucket.is_empty(), "empty bucket for {origin_key}");
        indexed_total += bucket.len();

        for leg_ref in bucket {
            let leg = registry
                .legs
                .resolve(leg_ref)
                .unwrap_or_else(|| panic!("dangling index entry {leg_ref}"));
            assert_eq!(leg.origin().key(), origin_key, "leg in wrong bucket");
        }
    }

    let stored_total = registry.legs.iter_all().count();
    assert_eq!(indexed_total, stored_total, "index and stores disagree");

    for leg in registry.legs.iter_all() {
        assert!(
            registry.origin_index.contains(leg.origin(), &leg.leg_ref()),
            "stored leg {} missing from its bucket",
            leg.leg_ref()
        );
    }
}

#[test]
fn add_and_get_leg() {
    let registry = populated();

    let found = registry.get_leg(Category::Flight, "A").unwrap();
    assert_eq!(found.origin(), &loc("London"));
    assert!(registry.get_leg(Category::Rail, "A").is_none());
    assert_index_consistent(&registry);
}

#[test]
fn idempotent_re_add_changes_nothing() {
    let mut registry = populated();

    // put a booking on A so a reset would be visible
    let itinerary = Itinerary::single(registry.get_leg(Category::Flight, "A").unwrap().clone())
        .unwrap();
    registry.book("ada@example.com", itinerary).unwrap();
    assert_eq!(registry.get_leg(Category::Flight, "A").unwrap().bookings(), 1);

    registry.add_leg(flight(
        "A",
        "London",
        "Paris",
        "2016-03-14 16:37",
        "2016-03-14 17:22",
    ));

    // no booking reset, no itinerary cancellation, no index churn
    assert_eq!(registry.get_leg(Category::Flight, "A").unwrap().bookings(), 1);
    assert_eq!(registry.get_user("ada@example.com").unwrap().booked().len(), 1);
    assert_index_consistent(&registry);
}

#[test]
fn update_resets_bookings_and_cancels_itineraries() {
    let mut registry = populated();

    let itinerary = Itinerary::single(registry.get_leg(Category::Flight, "A").unwrap().clone())
        .unwrap();
    registry.book("ada@example.com", itinerary).unwrap();

    // same identity, different capacity: an in-place redefinition
    registry.add_leg(leg(
        Category::Flight,
        "A",
        "London",
        "Paris",
        "2016-03-14 16:37",
        "2016-03-14 17:22",
        100.0,
        99,
    ));

    let updated = registry.get_leg(Category::Flight, "A").unwrap();
    assert_eq!(updated.capacity(), 99);
    assert_eq!(updated.bookings(), 0);
    assert!(registry.get_user("ada@example.com").unwrap().booked().is_empty());
    assert_index_consistent(&registry);
}

#[test]
fn update_relocates_origin_index_entry() {
    let mut registry = populated();

    // redefine A to depart from Berlin instead of London
    registry.add_leg(flight(
        "A",
        "Berlin",
        "Paris",
        "2016-03-14 16:37",
        "2016-03-14 17:22",
    ));

    let a_ref = LegRef::new(Category::Flight, "A");
    assert!(!registry.origin_index.contains(&loc("London"), &a_ref));
    assert!(registry.origin_index.contains(&loc("Berlin"), &a_ref));
    assert_index_consistent(&registry);
}

#[test]
fn remove_leg_cascades_to_bookings() {
    let mut registry = populated();

    // book the two-leg London -> Paris -> Rome itinerary
    let mut itinerary =
        Itinerary::single(registry.get_leg(Category::Flight, "A").unwrap().clone()).unwrap();
    itinerary
        .add(registry.get_leg(Category::Flight, "B").unwrap().clone())
        .unwrap();
    registry.book("ada@example.com", itinerary).unwrap();

    assert_eq!(registry.get_leg(Category::Flight, "A").unwrap().bookings(), 1);
    assert_eq!(registry.get_leg(Category::Flight, "B").unwrap().bookings(), 1);

    registry.remove_leg(Category::Flight, "A");

    // the itinerary is gone from the user, the surviving leg's seat is
    // released, and the removed leg no longer exists anywhere
    assert!(registry.get_user("ada@example.com").unwrap().booked().is_empty());
    assert_eq!(registry.get_leg(Category::Flight, "B").unwrap().bookings(), 0);
    assert!(registry.get_leg(Category::Flight, "A").is_none());
    assert!(registry
        .search_itineraries(date(), &loc("London"), &loc("Paris"), None)
        .is_empty());
    assert_index_consistent(&registry);
}

#[test]
fn remove_leg_keeps_unrelated_bookings() {
    let mut registry = populated();

    let direct = Itinerary::single(registry.get_leg(Category::Flight, "C").unwrap().clone())
        .unwrap();
    registry.book("ada@example.com", direct).unwrap();

    registry.remove_leg(Category::Flight, "A");

    assert_eq!(registry.get_user("ada@example.com").unwrap().booked().len(), 1);
    assert_eq!(registry.get_leg(Category::Flight, "C").unwrap().bookings(), 1);
    assert_index_consistent(&registry);
}

#[test]
fn remove_absent_leg_is_silent() {
    let mut registry = populated();
    registry.remove_leg(Category::Ferry, "nope");
    assert_index_consistent(&registry);
}

#[test]
fn rename_to_occupied_id_is_a_no_op() {
    let mut registry = populated();
    let before = registry.get_leg(Category::Flight, "A").unwrap().clone();

    registry.change_leg_id(Category::Flight, "A", "B");

    let after = registry.get_leg(Category::Flight, "A").unwrap();
    assert!(before.same_definition(after));
    assert!(registry.get_leg(Category::Flight, "B").unwrap().origin() == &loc("Paris"));
    assert_index_consistent(&registry);
}

#[test]
fn rename_moves_identity_everywhere() {
    let mut registry = populated();

    let itinerary = Itinerary::single(registry.get_leg(Category::Flight, "A").unwrap().clone())
        .unwrap();
    registry.book("ada@example.com", itinerary).unwrap();

    registry.change_leg_id(Category::Flight, "A", "A2");

    assert!(registry.get_leg(Category::Flight, "A").is_none());
    assert!(registry.get_leg(Category::Flight, "A2").is_some());

    // the booked itinerary follows the rename, so removing the leg under
    // its new id still cancels it
    let booked = &registry.get_user("ada@example.com").unwrap().booked()[0];
    assert!(booked.contains_leg(&LegRef::new(Category::Flight, "A2")));
    assert_index_consistent(&registry);

    registry.remove_leg(Category::Flight, "A2");
    assert!(registry.get_user("ada@example.com").unwrap().booked().is_empty());
}

#[test]
fn same_id_in_different_categories_coexists() {
    let mut registry = Registry::new();
    registry.add_leg(flight("X", "London", "Paris", "2016-03-14 08:00", "2016-03-14 09:00"));
    registry.add_leg(leg(
        Category::Rail,
        "X",
        "Madrid",
        "Lisbon",
        "2016-03-14 08:00",
        "2016-03-14 12:00",
        40.0,
        200,
    ));

    assert_eq!(registry.get_leg(Category::Flight, "X").unwrap().origin(), &loc("London"));
    assert_eq!(registry.get_leg(Category::Rail, "X").unwrap().origin(), &loc("Madrid"));
    assert_index_consistent(&registry);
}

#[test]
fn user_merge_and_rename() {
    let mut registry = populated();

    let mut updated = user("ada@example.com");
    updated.update_from(
        User::new(
            "ada@example.com",
            "Augusta Ada",
            "King",
            "Ockham Park",
            "4222222222222222",
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        )
        .unwrap(),
    );
    registry.add_user(updated);
    assert_eq!(registry.get_user("ada@example.com").unwrap().last_name(), "King");

    registry.change_user_email("ada@example.com", "countess@example.com");
    assert!(registry.get_user("ada@example.com").is_none());
    assert!(registry.get_user("countess@example.com").is_some());

    // renaming onto an existing registration is refused
    registry.add_user(user("grace@example.com"));
    registry.change_user_email("countess@example.com", "grace@example.com");
    assert!(registry.get_user("countess@example.com").is_some());
}

#[test]
fn booking_respects_capacity() {
    let mut registry = Registry::new();
    registry.add_leg(leg(
        Category::Flight,
        "S",
        "London",
        "Paris",
        "2016-03-14 08:00",
        "2016-03-14 09:00",
        50.0,
        2,
    ));
    registry.add_user(user("a@example.com"));
    registry.add_user(user("b@example.com"));
    registry.add_user(user("c@example.com"));

    let snapshot = registry.get_leg(Category::Flight, "S").unwrap().clone();
    registry
        .book("a@example.com", Itinerary::single(snapshot.clone()).unwrap())
        .unwrap();
    registry
        .book("b@example.com", Itinerary::single(snapshot.clone()).unwrap())
        .unwrap();
    assert_eq!(registry.get_leg(Category::Flight, "S").unwrap().bookings(), 2);

    // a third booking never pushes the counter past capacity
    registry
        .book("c@example.com", Itinerary::single(snapshot).unwrap())
        .unwrap();
    assert_eq!(registry.get_leg(Category::Flight, "S").unwrap().bookings(), 2);
}

#[test]
fn double_booking_is_a_no_op() {
    let mut registry = populated();
    let snapshot = registry.get_leg(Category::Flight, "A").unwrap().clone();

    registry
        .book("ada@example.com", Itinerary::single(snapshot.clone()).unwrap())
        .unwrap();
    registry
        .book("ada@example.com", Itinerary::single(snapshot).unwrap())
        .unwrap();

    assert_eq!(registry.get_leg(Category::Flight, "A").unwrap().bookings(), 1);
    assert_eq!(registry.get_user("ada@example.com").unwrap().booked().len(), 1);
}

#[test]
fn unbook_releases_seats() {
    let mut registry = populated();
    let snapshot = registry.get_leg(Category::Flight, "A").unwrap().clone();
    let itinerary = Itinerary::single(snapshot).unwrap();

    registry.book("ada@example.com", itinerary.clone()).unwrap();
    registry.unbook("ada@example.com", &itinerary).unwrap();

    assert_eq!(registry.get_leg(Category::Flight, "A").unwrap().bookings(), 0);
    assert!(registry.get_user("ada@example.com").unwrap().booked().is_empty());

    // unbooked again: nothing to do
    registry.unbook("ada@example.com", &itinerary).unwrap();
    assert_eq!(registry.get_leg(Category::Flight, "A").unwrap().bookings(), 0);
}

#[test]
fn booking_for_unknown_user_fails() {
    let mut registry = populated();
    let snapshot = registry.get_leg(Category::Flight, "A").unwrap().clone();

    let result = registry.book("nobody@example.com", Itinerary::single(snapshot).unwrap());
    assert!(matches!(result, Err(DomainError::UnknownUser(_))));
    assert_eq!(registry.get_leg(Category::Flight, "A").unwrap().bookings(), 0);
}

#[test]
fn refresh_itinerary_sees_edits_and_removals() {
    let mut registry = populated();
    let mut itinerary =
        Itinerary::single(registry.get_leg(Category::Flight, "A").unwrap().clone()).unwrap();

    // reprice A in place; the held snapshot is stale until refreshed
    registry.add_leg(leg(
        Category::Flight,
        "A",
        "London",
        "Paris",
        "2016-03-14 16:37",
        "2016-03-14 17:22",
        75.0,
        10,
    ));
    assert_eq!(itinerary.cost(), 100.0);

    registry.refresh_itinerary(&mut itinerary).unwrap();
    assert_eq!(itinerary.cost(), 75.0);

    registry.remove_leg(Category::Flight, "A");
    let result = registry.refresh_itinerary(&mut itinerary);
    assert!(matches!(result, Err(DomainError::UnknownLeg(_))));
}

#[test]
fn search_legs_by_category_scans_that_store() {
    let mut registry = populated();
    registry.add_leg(leg(
        Category::Rail,
        "R1",
        "London",
        "Paris",
        "2016-03-14 07:00",
        "2016-03-14 10:00",
        60.0,
        200,
    ));

    let flights = registry.search_legs(None, None, None, Some(Category::Flight), None);
    assert_eq!(flights.len(), 3);

    let rail = registry.search_legs(None, None, None, Some(Category::Rail), None);
    assert_eq!(rail.len(), 1);
}

#[test]
fn search_legs_without_origin_scans_all_categories() {
    let mut registry = populated();
    registry.add_leg(leg(
        Category::Rail,
        "R1",
        "Berlin",
        "Rome",
        "2016-03-14 07:00",
        "2016-03-14 13:00",
        60.0,
        200,
    ));

    let to_rome = registry.search_legs(None, None, Some(&loc("Rome")), None, None);
    assert_eq!(to_rome.len(), 3); // B, C, R1
}

#[test]
fn search_legs_with_origin_uses_the_index() {
    let registry = populated();

    let from_london = registry.search_legs(None, Some(&loc("LONDON")), None, None, None);
    assert_eq!(from_london.len(), 2);

    let on_day = registry.search_legs(
        Some(date()),
        Some(&loc("London")),
        Some(&loc("Rome")),
        None,
        None,
    );
    assert_eq!(on_day.len(), 1);
    assert_eq!(on_day[0].id(), "C");
}

#[test]
fn search_legs_includes_full_legs() {
    let mut registry = populated();

    // fill C completely; flat search still lists it
    let snapshot = registry.get_leg(Category::Flight, "C").unwrap().clone();
    for i in 0..10 {
        let email = format!("u{i}@example.com");
        registry.add_user(user(&email));
        registry
            .book(&email, Itinerary::single(snapshot.clone()).unwrap())
            .unwrap();
    }
    assert!(registry.get_leg(Category::Flight, "C").unwrap().is_full());

    let from_london = registry.search_legs(None, Some(&loc("London")), None, None, None);
    assert_eq!(from_london.len(), 2);

    // but itinerary search no longer offers it
    let results = registry.search_itineraries(date(), &loc("London"), &loc("Rome"), None);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].len(), 2);
}

#[test]
fn search_legs_sorted_by_cost() {
    let mut registry = Registry::new();
    registry.add_leg(leg(
        Category::Flight, "E", "London", "Paris",
        "2016-03-14 08:00", "2016-03-14 09:00", 300.0, 10,
    ));
    registry.add_leg(leg(
        Category::Flight, "F", "London", "Paris",
        "2016-03-14 10:00", "2016-03-14 11:00", 100.0, 10,
    ));

    let sorted = registry.search_legs(
        None,
        Some(&loc("London")),
        None,
        None,
        Some(TravelOrder::ascending(SortKey::TotalCost)),
    );
    assert_eq!(sorted[0].id(), "F");
    assert_eq!(sorted[1].id(), "E");
}

#[test]
fn search_itineraries_through_the_facade() {
    let registry = populated();

    let results = registry.search_itineraries(
        date(),
        &loc("London"),
        &loc("Rome"),
        Some(TravelOrder::ascending(SortKey::TotalCost)),
    );

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].cost(), 100.0); // the direct flight
    assert_eq!(results[1].cost(), 200.0); // the connection through Paris
    assert_eq!(results[1].len(), 2);
}

#[test]
fn invalid_leg_never_enters_the_registry() {
    // construction is where invalid field combinations are rejected; the
    // registry only ever sees validated legs
    let cyclic = TravelLeg::new(
        Category::Flight,
        "BAD",
        dt("2016-03-14 08:00"),
        dt("2016-03-14 09:00"),
        loc("London"),
        loc("LONDON"),
        10.0,
        5,
        "Operator",
    );
    assert!(cyclic.is_err());
}

#[test]
fn clear_empties_everything() {
    let mut registry = populated();
    registry.clear();

    assert_eq!(registry.all_legs(Category::Flight).count(), 0);
    assert_eq!(registry.all_users().count(), 0);
    assert!(registry
        .search_legs(None, Some(&loc("London")), None, None, None)
        .is_empty());
    assert_index_consistent(&registry);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8, u8, u8),    // id, origin, destination
        Remove(u8),         // id
        Rename(u8, u8),     // id, new id
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..8, 0u8..5, 0u8..5).prop_map(|(id, from, to)| Op::Add(id, from, to)),
            (0u8..8).prop_map(Op::Remove),
            (0u8..8, 0u8..8).prop_map(|(a, b)| Op::Rename(a, b)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// The origin index stays consistent with the stores under any
        /// sequence of adds, removes, and renames.
        #[test]
        fn index_stays_consistent(ops in proptest::collection::vec(op_strategy(), 0..40)) {
            let mut registry = Registry::new();

            for op in ops {
                match op {
                    Op::Add(id, from, to) => {
                        if from != to {
                            registry.add_leg(
                                TravelLeg::new(
                                    Category::Coach,
                                    format!("C{id}"),
                                    dt("2016-03-14 08:00"),
                                    dt("2016-03-14 10:00"),
                                    loc(&format!("Town{from}")),
                                    loc(&format!("Town{to}")),
                                    15.0,
                                    40,
                                    "Operator",
                                )
                                .unwrap(),
                            );
                        }
                    }
                    Op::Remove(id) => registry.remove_leg(Category::Coach, &format!("C{id}")),
                    Op::Rename(id, new_id) => registry.change_leg_id(
                        Category::Coach,
                        &format!("C{id}"),
                        &format!("C{new_id}"),
                    ),
                }
                assert_index_consistent(&registry);
            }
        }
    }
}
