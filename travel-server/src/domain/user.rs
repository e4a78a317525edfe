//! Registered user type.

use std::fmt;

use chrono::NaiveDate;

use super::{DomainError, Itinerary, LegRef, time};

/// A registered user, identified by email address.
///
/// Users own their booked itineraries. Profile fields can be overwritten by
/// a re-registration with the same email ([`User::update_from`]); the booked
/// list survives such updates.
///
/// Credentials and privilege levels are handled by the surrounding
/// application, not stored here.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    email: String,
    first_names: String,
    last_name: String,
    address: String,
    credit_card: String,
    card_expiry: NaiveDate,
    booked: Vec<Itinerary>,
}

impl User {
    /// Construct a user, validating the email address.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the email does not contain exactly one `@` with a
    /// `.` somewhere after it.
    pub fn new(
        email: impl Into<String>,
        first_names: impl Into<String>,
        last_name: impl Into<String>,
        address: impl Into<String>,
        credit_card: impl Into<String>,
        card_expiry: NaiveDate,
    ) -> Result<Self, DomainError> {
        let email = email.into();
        if !valid_email(&email) {
            return Err(DomainError::InvalidUser("malformed email address"));
        }

        Ok(User {
            email,
            first_names: first_names.into(),
            last_name: last_name.into(),
            address: address.into(),
            credit_card: credit_card.into(),
            card_expiry,
            booked: Vec::new(),
        })
    }

    /// Returns the email address (the user's identity).
    pub fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn set_email(&mut self, email: String) {
        self.email = email;
    }

    /// Returns the user's first names.
    pub fn first_names(&self) -> &str {
        &self.first_names
    }

    /// Returns the user's last name.
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Returns the full name, first names first.
    pub fn name(&self) -> String {
        format!("{} {}", self.first_names, self.last_name)
    }

    /// Returns the postal address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the credit card number.
    pub fn credit_card(&self) -> &str {
        &self.credit_card
    }

    /// Returns the credit card expiry date.
    pub fn card_expiry(&self) -> NaiveDate {
        self.card_expiry
    }

    /// Returns the booked itineraries, oldest booking first.
    pub fn booked(&self) -> &[Itinerary] {
        &self.booked
    }

    /// Returns whether an equal itinerary is already booked.
    pub fn has_booked(&self, itinerary: &Itinerary) -> bool {
        self.booked.contains(itinerary)
    }

    /// Record a booked itinerary. Seat counting happens in the registry.
    pub(crate) fn record_booking(&mut self, itinerary: Itinerary) {
        self.booked.push(itinerary);
    }

    /// Drop a booked itinerary. Returns false if it was not booked.
    pub(crate) fn drop_booking(&mut self, itinerary: &Itinerary) -> bool {
        match self.booked.iter().position(|b| b == itinerary) {
            Some(position) => {
                self.booked.remove(position);
                true
            }
            None => false,
        }
    }

    /// Remove and return every booked itinerary containing the given leg.
    pub(crate) fn remove_itineraries_with(&mut self, leg_ref: &LegRef) -> Vec<Itinerary> {
        let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.booked)
            .into_iter()
            .partition(|itinerary| itinerary.contains_leg(leg_ref));
        self.booked = kept;
        gone
    }

    /// Rewrite a renamed leg id inside every booked itinerary.
    pub(crate) fn rename_leg(&mut self, from: &LegRef, to: &str) {
        for itinerary in &mut self.booked {
            itinerary.rename_leg(from, to);
        }
    }

    /// Overwrite profile fields with `other`'s, keeping identity and the
    /// booked itineraries.
    pub fn update_from(&mut self, other: User) {
        self.first_names = other.first_names;
        self.last_name = other.last_name;
        self.address = other.address;
        self.credit_card = other.credit_card;
        self.card_expiry = other.card_expiry;
        // booked itineraries are deliberately untouched
    }

    /// Render this user as a single comma-separated line:
    /// `last,first,email,address,card,expiry`.
    pub fn format_line(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.last_name,
            self.first_names,
            self.email,
            self.address,
            self.credit_card,
            self.card_expiry.format(time::DATE_FORMAT),
        )
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_line())
    }
}

// Exactly one '@', with a '.' somewhere after it.
fn valid_email(email: &str) -> bool {
    let Some(at) = email.find('@') else {
        return false;
    };
    email.rfind('@') == Some(at) && email[at..].rfind('.') > Some(0)
}
