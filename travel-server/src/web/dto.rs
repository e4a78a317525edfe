//! Data transfer objects for web requests and responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::domain::{Category, DomainError, Itinerary, LegRef, Location, TravelLeg, User, time};
use crate::planner::{SortKey, TravelOrder};

/// Application-level error mapped onto HTTP statuses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    NotFound { message: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound {
            message: message.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::UnknownLeg(_) | DomainError::UnknownUser(_) => AppError::NotFound {
                message: error.to_string(),
            },
            _ => AppError::BadRequest {
                message: error.to_string(),
            },
        }
    }
}

/// Error body returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Request to add or redefine a leg.
#[derive(Debug, Deserialize)]
pub struct LegRequest {
    pub category: String,
    pub id: String,
    /// Departure time, `YYYY-MM-DD HH:MM`
    pub start: String,
    /// Arrival time, `YYYY-MM-DD HH:MM`
    pub end: String,
    pub origin: String,
    pub destination: String,
    pub cost: f64,
    pub capacity: u32,
    pub provider: String,
}

impl LegRequest {
    /// Build the validated domain leg.
    pub fn to_leg(&self) -> Result<TravelLeg, AppError> {
        let category = parse_category(&self.category)?;
        let start = time::parse_date_time(&self.start)
            .map_err(|e| AppError::bad_request(format!("invalid start time: {e}")))?;
        let end = time::parse_date_time(&self.end)
            .map_err(|e| AppError::bad_request(format!("invalid end time: {e}")))?;
        let origin = parse_location(&self.origin)?;
        let destination = parse_location(&self.destination)?;

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
        .map_err(AppError::from)
    }
}

/// A leg in responses.
#[derive(Debug, Serialize)]
pub struct LegResult {
    pub category: String,
    pub id: String,
    pub start: String,
    pub end: String,
    pub origin: String,
    pub destination: String,
    pub cost: f64,
    pub capacity: u32,
    pub available: u32,
    pub provider: String,
    /// Single-line rendering: `id,start,end,provider,origin,destination,cost`
    pub line: String,
}

impl LegResult {
    pub fn from_leg(leg: &TravelLeg) -> Self {
        LegResult {
            category: leg.category().to_string(),
            id: leg.id().to_string(),
            start: time::format_date_time(leg.start()),
            end: time::format_date_time(leg.end()),
            origin: leg.origin().to_string(),
            destination: leg.destination().to_string(),
            cost: leg.cost(),
            capacity: leg.capacity(),
            available: leg.available_capacity(),
            provider: leg.provider().to_string(),
            line: leg.format_line(true),
        }
    }
}

/// Query parameters for flat leg search.
#[derive(Debug, Deserialize)]
pub struct SearchLegsQuery {
    /// Departure date, `YYYY-MM-DD`
    pub date: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub category: Option<String>,
    /// Sort key: `cost`, `duration`, `start`, or `end`
    pub sort: Option<String>,
    pub descending: Option<bool>,
}

/// Query parameters for itinerary search.
#[derive(Debug, Deserialize)]
pub struct SearchItinerariesQuery {
    /// Departure date, `YYYY-MM-DD`
    pub date: String,
    pub origin: String,
    pub destination: String,
    /// Sort key: `cost`, `duration`, `start`, or `end`
    pub sort: Option<String>,
    pub descending: Option<bool>,
}

/// An itinerary in responses.
#[derive(Debug, Serialize)]
pub struct ItineraryResult {
    pub legs: Vec<LegResult>,
    pub total_cost: f64,
    /// Total duration as `HH:MM`
    pub duration: String,
    /// Multi-line rendering: leg lines, then cost, then duration
    pub rendered: String,
}

impl ItineraryResult {
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        ItineraryResult {
            legs: itinerary.legs().iter().map(LegResult::from_leg).collect(),
            total_cost: itinerary.cost(),
            duration: time::format_hhmm(itinerary.duration()),
            rendered: itinerary.to_string(),
        }
    }
}

/// Request to register or update a user.
#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub email: String,
    pub first_names: String,
    pub last_name: String,
    pub address: String,
    pub credit_card: String,
    /// Card expiry date, `YYYY-MM-DD`
    pub card_expiry: String,
}

impl UserRequest {
    /// Build the validated domain user.
    pub fn to_user(&self) -> Result<User, AppError> {
        let card_expiry = parse_date(&self.card_expiry)?;
        User::new(
            self.email.clone(),
            self.first_names.clone(),
            self.last_name.clone(),
            self.address.clone(),
            self.credit_card.clone(),
            card_expiry,
        )
        .map_err(AppError::from)
    }
}

/// A user in responses. Bookings are included as itineraries.
#[derive(Debug, Serialize)]
pub struct UserResult {
    pub email: String,
    pub name: String,
    pub address: String,
    /// Single-line rendering: `last,first,email,address,card,expiry`
    pub line: String,
    pub booked: Vec<ItineraryResult>,
}

impl UserResult {
    pub fn from_user(user: &User) -> Self {
        UserResult {
            email: user.email().to_string(),
            name: user.name(),
            address: user.address().to_string(),
            line: user.format_line(),
            booked: user
                .booked()
                .iter()
                .map(ItineraryResult::from_itinerary)
                .collect(),
        }
    }
}

/// Query parameters for user search.
#[derive(Debug, Deserialize)]
pub struct SearchUsersQuery {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Request to rename a leg or user identity.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub new_id: String,
}

/// An itinerary given by leg references, for booking requests.
#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub legs: Vec<LegRefRequest>,
}

/// One leg reference in a booking request.
#[derive(Debug, Deserialize)]
pub struct LegRefRequest {
    pub category: String,
    pub id: String,
}

impl LegRefRequest {
    pub fn to_ref(&self) -> Result<LegRef, AppError> {
        Ok(LegRef::new(parse_category(&self.category)?, self.id.clone()))
    }
}

// ----- parse helpers shared by the handlers -----

pub(super) fn parse_category(s: &str) -> Result<Category, AppError> {
    s.parse()
        .map_err(|_| AppError::bad_request(format!("unknown category: {s}")))
}

pub(super) fn parse_location(s: &str) -> Result<Location, AppError> {
    Location::parse(s).map_err(|_| AppError::bad_request(format!("invalid location: {s:?}")))
}

pub(super) fn parse_date(s: &str) -> Result<chrono::NaiveDate, AppError> {
    chrono::NaiveDate::parse_from_str(s, time::DATE_FORMAT)
        .map_err(|_| AppError::bad_request(format!("invalid date: {s}")))
}

pub(super) fn parse_order(
    sort: Option<&str>,
    descending: Option<bool>,
) -> Result<Option<TravelOrder>, AppError> {
    let Some(sort) = sort else {
        return Ok(None);
    };
    let key: SortKey = sort
        .parse()
        .map_err(|_| AppError::bad_request(format!("unknown sort key: {sort}")))?;
    Ok(Some(if descending.unwrap_or(false) {
        TravelOrder::descending(key)
    } else {
        TravelOrder::ascending(key)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg_request() -> LegRequest {
        LegRequest {
            category: "flight".into(),
            id: "AC100".into(),
            start: "2016-03-14 16:37".into(),
            end: "2016-03-14 17:22".into(),
            origin: "London".into(),
            destination: "Paris".into(),
            cost: 212.50,
            capacity: 120,
            provider: "Air Canada".into(),
        }
    }

    #[test]
    fn leg_request_converts() {
        let leg = leg_request().to_leg().unwrap();
        assert_eq!(leg.id(), "AC100");
        assert_eq!(leg.category(), Category::Flight);
    }

    #[test]
    fn leg_request_rejects_bad_fields() {
        let mut bad_category = leg_request();
        bad_category.category = "zeppelin".into();
        assert!(bad_category.to_leg().is_err());

        let mut bad_time = leg_request();
        bad_time.start = "soonish".into();
        assert!(bad_time.to_leg().is_err());

        let mut cyclic = leg_request();
        cyclic.destination = "LONDON".into();
        assert!(cyclic.to_leg().is_err());
    }

    #[test]
    fn leg_result_carries_rendering() {
        let leg = leg_request().to_leg().unwrap();
        let result = LegResult::from_leg(&leg);
        assert_eq!(
            result.line,
            "AC100,2016-03-14 16:37,2016-03-14 17:22,Air Canada,London,Paris,212.50"
        );
        assert_eq!(result.available, 120);
    }

    #[test]
    fn order_parsing() {
        assert!(parse_order(None, None).unwrap().is_none());
        assert!(parse_order(Some("cost"), None).unwrap().is_some());
        assert!(parse_order(Some("cost"), Some(true)).unwrap().is_some());
        assert!(parse_order(Some("sideways"), None).is_err());
    }
}
