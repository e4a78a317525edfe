//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::domain::Itinerary;
use crate::persist::Snapshot;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/legs", post(add_leg))
        .route("/legs/search", get(search_legs))
        .route("/legs/:category", get(list_legs))
        .route("/legs/:category/:id", get(get_leg).delete(remove_leg))
        .route("/legs/:category/:id/rename", post(rename_leg))
        .route("/users", get(list_users).post(add_user))
        .route("/users/search", get(search_users))
        .route("/users/:email", get(get_user))
        .route("/users/:email/rename", post(rename_user))
        .route(
            "/users/:email/bookings",
            post(book_itinerary).delete(unbook_itinerary),
        )
        .route("/itineraries/search", get(search_itineraries))
        .route("/snapshot", get(snapshot))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Add or redefine a leg.
async fn add_leg(
    State(state): State<AppState>,
    Json(request): Json<LegRequest>,
) -> Result<StatusCode, AppError> {
    let leg = request.to_leg()?;
    state.registry.write().await.add_leg(leg);
    Ok(StatusCode::NO_CONTENT)
}

/// List all legs of a category.
async fn list_legs(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<LegResult>>, AppError> {
    let category = parse_category(&category)?;
    let registry = state.registry.read().await;
    Ok(Json(
        registry.all_legs(category).map(LegResult::from_leg).collect(),
    ))
}

/// Look up one leg by identity.
async fn get_leg(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, String)>,
) -> Result<Json<LegResult>, AppError> {
    let category = parse_category(&category)?;
    let registry = state.registry.read().await;
    registry
        .get_leg(category, &id)
        .map(LegResult::from_leg)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no such leg: {category} {id}")))
}

/// Remove a leg, cancelling bookings that reference it.
async fn remove_leg(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let category = parse_category(&category)?;
    state.registry.write().await.remove_leg(category, &id);
    Ok(StatusCode::NO_CONTENT)
}

/// Change a leg's id. A taken id leaves everything unchanged.
async fn rename_leg(
    State(state): State<AppState>,
    Path((category, id)): Path<(String, String)>,
    Json(request): Json<RenameRequest>,
) -> Result<StatusCode, AppError> {
    let category = parse_category(&category)?;
    state
        .registry
        .write()
        .await
        .change_leg_id(category, &id, &request.new_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Flat leg search with optional filters and ordering.
async fn search_legs(
    State(state): State<AppState>,
    Query(query): Query<SearchLegsQuery>,
) -> Result<Json<Vec<LegResult>>, AppError> {
    let date = query.date.as_deref().map(parse_date).transpose()?;
    let origin = query.origin.as_deref().map(parse_location).transpose()?;
    let destination = query
        .destination
        .as_deref()
        .map(parse_location)
        .transpose()?;
    let category = query.category.as_deref().map(parse_category).transpose()?;
    let order = parse_order(query.sort.as_deref(), query.descending)?;

    let registry = state.registry.read().await;
    let results = registry.search_legs(date, origin.as_ref(), destination.as_ref(), category, order);
    Ok(Json(results.iter().map(LegResult::from_leg).collect()))
}

/// Enumerate itineraries between two locations on a date.
async fn search_itineraries(
    State(state): State<AppState>,
    Query(query): Query<SearchItinerariesQuery>,
) -> Result<Json<Vec<ItineraryResult>>, AppError> {
    let date = parse_date(&query.date)?;
    let origin = parse_location(&query.origin)?;
    let destination = parse_location(&query.destination)?;
    let order = parse_order(query.sort.as_deref(), query.descending)?;

    let registry = state.registry.read().await;
    let results = registry.search_itineraries(date, &origin, &destination, order);
    Ok(Json(
        results.iter().map(ItineraryResult::from_itinerary).collect(),
    ))
}

/// Register or update a user.
async fn add_user(
    State(state): State<AppState>,
    Json(request): Json<UserRequest>,
) -> Result<StatusCode, AppError> {
    let user = request.to_user()?;
    state.registry.write().await.add_user(user);
    Ok(StatusCode::NO_CONTENT)
}

/// List all registered users.
async fn list_users(State(state): State<AppState>) -> Json<Vec<UserResult>> {
    let registry = state.registry.read().await;
    Json(registry.all_users().map(UserResult::from_user).collect())
}

/// Look up one user by email.
async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserResult>, AppError> {
    let registry = state.registry.read().await;
    registry
        .get_user(&email)
        .map(UserResult::from_user)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("no such user: {email}")))
}

/// Search users by name and email substrings.
async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchUsersQuery>,
) -> Json<Vec<UserResult>> {
    let registry = state.registry.read().await;
    let results = registry.search_users(
        query.name.as_deref().unwrap_or(""),
        query.email.as_deref().unwrap_or(""),
    );
    Json(results.into_iter().map(UserResult::from_user).collect())
}

/// Change a user's email. A taken email leaves everything unchanged.
async fn rename_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(request): Json<RenameRequest>,
) -> Result<StatusCode, AppError> {
    state
        .registry
        .write()
        .await
        .change_user_email(&email, &request.new_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Book an itinerary, given as ordered leg references.
async fn book_itinerary(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(request): Json<BookingRequest>,
) -> Result<StatusCode, AppError> {
    let mut registry = state.registry.write().await;
    let itinerary = resolve_booking(&registry, &request)?;
    registry.book(&email, itinerary)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Cancel a booked itinerary, given as ordered leg references.
async fn unbook_itinerary(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(request): Json<BookingRequest>,
) -> Result<StatusCode, AppError> {
    let mut registry = state.registry.write().await;
    let itinerary = resolve_booking(&registry, &request)?;
    registry.unbook(&email, &itinerary)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Dump the whole registry as a snapshot document.
async fn snapshot(State(state): State<AppState>) -> Json<Snapshot> {
    let registry = state.registry.read().await;
    Json(Snapshot::capture(&registry))
}

// Rebuild a caller-supplied chain of leg references into a validated
// itinerary against the current catalog.
fn resolve_booking(
    registry: &crate::registry::Registry,
    request: &BookingRequest,
) -> Result<Itinerary, AppError> {
    if request.legs.is_empty() {
        return Err(AppError::bad_request("an itinerary needs at least one leg"));
    }

    let mut itinerary = Itinerary::new();
    for leg_ref in &request.legs {
        let leg_ref = leg_ref.to_ref()?;
        let leg = registry
            .get_leg(leg_ref.category(), leg_ref.id())
            .ok_or_else(|| AppError::not_found(format!("no such leg: {leg_ref}")))?;
        itinerary.add(leg.clone())?;
    }
    Ok(itinerary)
}
