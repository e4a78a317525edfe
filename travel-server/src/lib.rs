//! Travel registry server.
//!
//! A catalog of scheduled travel legs (flights, rail, coaches, ferries)
//! and registered users, answering flat leg searches and multi-leg
//! itinerary enumeration between locations.

pub mod domain;
pub mod persist;
pub mod planner;
pub mod registry;
pub mod store;
pub mod web;
