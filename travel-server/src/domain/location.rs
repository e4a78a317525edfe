//! Location name type.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Error returned when parsing an invalid location name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid location: {reason}")]
pub struct InvalidLocation {
    reason: &'static str,
}

/// A named place that legs depart from and arrive at.
///
/// Locations are free-form strings ("London", "new york") compared
/// case-insensitively: `Location::parse("Rome")` and
/// `Location::parse("ROME")` are equal and hash identically. The original
/// spelling is preserved for display.
///
/// # Examples
///
/// ```
/// use travel_server::domain::Location;
///
/// let a = Location::parse("London").unwrap();
/// let b = Location::parse("LONDON").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "London");
///
/// // Empty names are rejected
/// assert!(Location::parse("").is_err());
/// assert!(Location::parse("   ").is_err());
/// ```
#[derive(Clone)]
pub struct Location(String);

impl Location {
    /// Parse a location name from a string.
    ///
    /// The input must contain at least one non-whitespace character.
    pub fn parse(s: &str) -> Result<Self, InvalidLocation> {
        if s.trim().is_empty() {
            return Err(InvalidLocation {
                reason: "must not be empty",
            });
        }
        Ok(Location(s.to_string()))
    }

    /// Returns the location name as entered.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the lower-cased form used as an index key.
    ///
    /// Two equal locations always produce the same key.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({})", self.0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
