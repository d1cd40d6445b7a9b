//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose trip, place, route and recommendation use-cases to Dart via FRB.
//! - Flatten core errors into envelopes the forms can render directly.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Storage failures come back as `ok=false` envelopes, never as aborts.
//! - Timestamps cross the boundary as epoch milliseconds.

use log::error;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;
use tripjournal_core::db::open_db;
use tripjournal_core::{
    core_version as core_version_inner, find_recommendation, init_logging as init_logging_inner,
    ping as ping_inner, recommendations, PlaceService, PlaceServiceError, PlaceWithRoute,
    Recommendation, SqlitePlaceRepository, SqliteTripRepository, TransportType, Trip, TripDraft,
    TripFieldErrors, TripListQuery, TripOrder, TripService, TripServiceError,
};
use uuid::Uuid;

const JOURNAL_DB_FILE_NAME: &str = "tripjournal.sqlite3";
static JOURNAL_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Per-field messages for the trip form. Empty string means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripFormErrors {
    pub country: String,
    pub city: String,
    pub notes: String,
    pub dates: String,
    /// Whether the save/confirm button should be enabled.
    pub can_save: bool,
}

impl From<&TripFieldErrors> for TripFormErrors {
    fn from(errors: &TripFieldErrors) -> Self {
        let message = |slot: &Option<tripjournal_core::FieldError>| {
            slot.as_ref().map(ToString::to_string).unwrap_or_default()
        };
        Self {
            country: message(&errors.country),
            city: message(&errors.city),
            notes: message(&errors.notes),
            dates: message(&errors.dates),
            can_save: errors.is_empty(),
        }
    }
}

/// Trip row for list, calendar and detail screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripItem {
    pub trip_id: String,
    pub country: String,
    pub city: String,
    pub notes: String,
    pub date_from_ms: i64,
    pub date_to_ms: i64,
    /// `"City, Country"`; also the map lookup query.
    pub title: String,
}

/// Place row with its route's transport choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceItem {
    pub place_id: String,
    pub trip_id: String,
    pub route_id: String,
    pub name: String,
    pub date_ms: i64,
    /// `none|bike|car|train|bus`, or empty when unset.
    pub transport: String,
}

/// Editable trip fields pre-filled from a recommendation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripDraftItem {
    pub country: String,
    pub city: String,
    pub notes: String,
    pub date_from_ms: i64,
    pub date_to_ms: i64,
}

/// Recommendation card content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationItem {
    pub slug: String,
    pub title: String,
    pub city: String,
    pub country: String,
    pub description: String,
    pub image_name: String,
}

/// Response envelope for trip create/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripActionResponse {
    pub ok: bool,
    pub trip: Option<TripItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Per-field messages; all empty unless validation failed.
    pub field_errors: TripFormErrors,
}

impl TripActionResponse {
    fn success(message: impl Into<String>, trip: &Trip) -> Self {
        Self {
            ok: true,
            trip: Some(to_trip_item(trip)),
            message: message.into(),
            field_errors: TripFormErrors {
                can_save: true,
                ..TripFormErrors::default()
            },
        }
    }

    fn failure(operation: &str, err: &TripServiceError) -> Self {
        let field_errors = match err {
            TripServiceError::Validation(errors) => TripFormErrors::from(errors),
            TripServiceError::PlacesOutsideDates { .. } => TripFormErrors {
                dates: err.to_string(),
                ..TripFormErrors::default()
            },
            _ => TripFormErrors::default(),
        };
        Self {
            ok: false,
            trip: None,
            message: format!("{operation} failed: {err}"),
            field_errors,
        }
    }

    fn invalid_input(message: String) -> Self {
        Self {
            ok: false,
            trip: None,
            message,
            field_errors: TripFormErrors::default(),
        }
    }
}

/// Response envelope for place create/update and transport changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceActionResponse {
    pub ok: bool,
    pub place: Option<PlaceItem>,
    pub message: String,
}

impl PlaceActionResponse {
    fn success(message: impl Into<String>, entry: &PlaceWithRoute) -> Self {
        Self {
            ok: true,
            place: Some(to_place_item(entry)),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            place: None,
            message: message.into(),
        }
    }
}

/// Response envelope for deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub message: String,
}

/// Response envelope for trip lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripListResponse {
    pub items: Vec<TripItem>,
    pub message: String,
}

/// Response envelope for place lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceListResponse {
    pub items: Vec<PlaceItem>,
    pub message: String,
}

/// Validates trip form fields for live feedback.
///
/// # FFI contract
/// - Pure; no storage access.
/// - Called on every field change and once more before save.
#[flutter_rust_bridge::frb(sync)]
pub fn validate_trip_fields(
    country: String,
    city: String,
    notes: String,
    date_from_ms: i64,
    date_to_ms: i64,
) -> TripFormErrors {
    let draft = TripDraft::new(country, city, notes, date_from_ms, date_to_ms);
    TripFormErrors::from(&draft.field_errors())
}

/// Creates a trip from the add-trip form.
#[flutter_rust_bridge::frb(sync)]
pub fn trip_create(
    country: String,
    city: String,
    notes: String,
    date_from_ms: i64,
    date_to_ms: i64,
) -> TripActionResponse {
    let draft = TripDraft::new(country, city, notes, date_from_ms, date_to_ms);
    match with_trip_service(|service| service.create_trip(&draft)) {
        Ok(Ok(trip)) => TripActionResponse::success("Trip created.", &trip),
        Ok(Err(err)) => TripActionResponse::failure("trip_create", &err),
        Err(message) => TripActionResponse::invalid_input(message),
    }
}

/// Creates a trip from an edited recommendation draft.
#[flutter_rust_bridge::frb(sync)]
pub fn trip_create_from_recommendation(
    slug: String,
    country: String,
    city: String,
    notes: String,
    date_from_ms: i64,
    date_to_ms: i64,
) -> TripActionResponse {
    let Some(recommendation) = find_recommendation(slug.trim()) else {
        return TripActionResponse::invalid_input(format!("unknown recommendation `{slug}`"));
    };
    let draft = TripDraft::new(country, city, notes, date_from_ms, date_to_ms);
    match with_trip_service(|service| service.create_from_recommendation(recommendation, &draft)) {
        Ok(Ok(trip)) => TripActionResponse::success("Trip created.", &trip),
        Ok(Err(err)) => TripActionResponse::failure("trip_create_from_recommendation", &err),
        Err(message) => TripActionResponse::invalid_input(message),
    }
}

/// Saves the edit-trip form over an existing trip.
#[flutter_rust_bridge::frb(sync)]
pub fn trip_update(
    trip_id: String,
    country: String,
    city: String,
    notes: String,
    date_from_ms: i64,
    date_to_ms: i64,
) -> TripActionResponse {
    let id = match parse_id(&trip_id, "trip_id") {
        Ok(id) => id,
        Err(message) => return TripActionResponse::invalid_input(message),
    };
    let draft = TripDraft::new(country, city, notes, date_from_ms, date_to_ms);
    match with_trip_service(|service| service.update_trip(id, &draft)) {
        Ok(Ok(trip)) => TripActionResponse::success("Trip updated.", &trip),
        Ok(Err(err)) => TripActionResponse::failure("trip_update", &err),
        Err(message) => TripActionResponse::invalid_input(message),
    }
}

/// Deletes a trip with its places and routes.
#[flutter_rust_bridge::frb(sync)]
pub fn trip_delete(trip_id: String) -> ActionResponse {
    let result = parse_id(&trip_id, "trip_id").and_then(|id| {
        with_trip_service(|service| service.delete_trip(id))?.map_err(|err| err.to_string())
    });
    action_response("trip_delete", "Trip deleted.", result)
}

/// Lists all trips ordered by start date.
#[flutter_rust_bridge::frb(sync)]
pub fn trips_list(newest_first: bool) -> TripListResponse {
    let query = TripListQuery {
        order: if newest_first {
            TripOrder::NewestFirst
        } else {
            TripOrder::OldestFirst
        },
        ..TripListQuery::default()
    };
    trip_list_response(
        "trips_list",
        with_trip_service(|service| service.list_trips(&query)),
    )
}

/// Lists trips shown on the calendar day containing `day_ms`.
#[flutter_rust_bridge::frb(sync)]
pub fn trips_on_date(day_ms: i64) -> TripListResponse {
    trip_list_response(
        "trips_on_date",
        with_trip_service(|service| service.trips_on_date(day_ms)),
    )
}

/// Adds a place (and its route) to a trip.
#[flutter_rust_bridge::frb(sync)]
pub fn place_create(trip_id: String, name: String, date_ms: i64) -> PlaceActionResponse {
    let result = parse_id(&trip_id, "trip_id").and_then(|id| {
        with_place_service(|service| service.create_place(id, name.as_str(), date_ms))
    });
    place_action_response("place_create", "Place added.", result)
}

/// Renames/re-dates a place.
#[flutter_rust_bridge::frb(sync)]
pub fn place_update(place_id: String, name: String, date_ms: i64) -> PlaceActionResponse {
    let result = parse_id(&place_id, "place_id").and_then(|id| {
        with_place_service(|service| service.update_place(id, name.as_str(), date_ms))
    });
    place_action_response("place_update", "Place updated.", result)
}

/// Deletes a place and its route.
#[flutter_rust_bridge::frb(sync)]
pub fn place_delete(place_id: String) -> ActionResponse {
    let result = parse_id(&place_id, "place_id").and_then(|id| {
        with_place_service(|service| service.delete_place(id))?.map_err(|err| err.to_string())
    });
    action_response("place_delete", "Place deleted.", result)
}

/// Sets a route's transport type. `None` or an empty string clears it.
#[flutter_rust_bridge::frb(sync)]
pub fn place_set_transport(route_id: String, transport: Option<String>) -> PlaceActionResponse {
    let transport_type = match parse_transport(transport.as_deref()) {
        Ok(value) => value,
        Err(message) => return PlaceActionResponse::failure(message),
    };
    let route_id = match parse_id(&route_id, "route_id") {
        Ok(id) => id,
        Err(message) => return PlaceActionResponse::failure(message),
    };

    let result = with_place_service(|service| {
        let route = service.set_transport_type(route_id, transport_type)?;
        service
            .get_place(route.place_uuid)?
            .ok_or(PlaceServiceError::PlaceNotFound(route.place_uuid))
    });
    place_action_response("place_set_transport", "Transport updated.", result)
}

/// Lists a trip's places, earliest first.
#[flutter_rust_bridge::frb(sync)]
pub fn places_list(trip_id: String) -> PlaceListResponse {
    let result = parse_id(&trip_id, "trip_id")
        .and_then(|id| with_place_service(|service| service.list_places(id)));
    match result {
        Ok(Ok(entries)) => PlaceListResponse {
            message: format!("Found {} place(s).", entries.len()),
            items: entries.iter().map(to_place_item).collect(),
        },
        Ok(Err(err)) => PlaceListResponse {
            items: Vec::new(),
            message: format!("places_list failed: {err}"),
        },
        Err(message) => PlaceListResponse {
            items: Vec::new(),
            message,
        },
    }
}

/// Transport choices in picker order.
#[flutter_rust_bridge::frb(sync)]
pub fn transport_types() -> Vec<String> {
    TransportType::ALL
        .iter()
        .map(|kind| kind.as_str().to_string())
        .collect()
}

/// Curated recommendation cards.
#[flutter_rust_bridge::frb(sync)]
pub fn recommendations_list() -> Vec<RecommendationItem> {
    recommendations().iter().map(to_recommendation_item).collect()
}

/// Builds the pre-filled draft shown when a recommendation is tapped.
///
/// Returns `None` for an unknown slug. Nothing is persisted.
#[flutter_rust_bridge::frb(sync)]
pub fn recommendation_draft(slug: String, now_ms: i64) -> Option<TripDraftItem> {
    find_recommendation(slug.trim()).map(|item| {
        let draft = item.to_draft(now_ms);
        TripDraftItem {
            country: draft.country,
            city: draft.city,
            notes: draft.notes,
            date_from_ms: draft.date_from,
            date_to_ms: draft.date_to,
        }
    })
}

fn resolve_journal_db_path() -> PathBuf {
    JOURNAL_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("TRIPJOURNAL_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(JOURNAL_DB_FILE_NAME)
        })
        .clone()
}

fn open_journal() -> Result<Connection, String> {
    open_db(resolve_journal_db_path()).map_err(|err| {
        error!("event=db_open module=ffi status=error error={err}");
        format!("journal DB open failed: {err}")
    })
}

fn with_trip_service<T>(
    f: impl FnOnce(&TripService<SqliteTripRepository<'_>>) -> Result<T, TripServiceError>,
) -> Result<Result<T, TripServiceError>, String> {
    let conn = open_journal()?;
    let repo = SqliteTripRepository::try_new(&conn)
        .map_err(|err| format!("trip repo init failed: {err}"))?;
    Ok(f(&TripService::new(repo)))
}

fn with_place_service<T>(
    f: impl FnOnce(&PlaceService<SqlitePlaceRepository<'_>>) -> Result<T, PlaceServiceError>,
) -> Result<Result<T, PlaceServiceError>, String> {
    let conn = open_journal()?;
    let repo = SqlitePlaceRepository::try_new(&conn)
        .map_err(|err| format!("place repo init failed: {err}"))?;
    Ok(f(&PlaceService::new(repo)))
}

fn parse_id(value: &str, name: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("invalid {name}: `{value}`"))
}

fn parse_transport(value: Option<&str>) -> Result<Option<TransportType>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => TransportType::parse(text)
            .map(Some)
            .ok_or_else(|| format!("unknown transport type `{text}`")),
    }
}

fn action_response(operation: &str, success: &str, result: Result<(), String>) -> ActionResponse {
    match result {
        Ok(()) => ActionResponse {
            ok: true,
            message: success.to_string(),
        },
        Err(err) => ActionResponse {
            ok: false,
            message: format!("{operation} failed: {err}"),
        },
    }
}

fn place_action_response(
    operation: &str,
    success: &str,
    result: Result<Result<PlaceWithRoute, PlaceServiceError>, String>,
) -> PlaceActionResponse {
    match result {
        Ok(Ok(entry)) => PlaceActionResponse::success(success, &entry),
        Ok(Err(err)) => PlaceActionResponse::failure(format!("{operation} failed: {err}")),
        Err(message) => PlaceActionResponse::failure(message),
    }
}

fn trip_list_response(
    operation: &str,
    result: Result<Result<Vec<Trip>, TripServiceError>, String>,
) -> TripListResponse {
    match result {
        Ok(Ok(trips)) => TripListResponse {
            message: format!("Found {} trip(s).", trips.len()),
            items: trips.iter().map(to_trip_item).collect(),
        },
        Ok(Err(err)) => TripListResponse {
            items: Vec::new(),
            message: format!("{operation} failed: {err}"),
        },
        Err(message) => TripListResponse {
            items: Vec::new(),
            message,
        },
    }
}

fn to_trip_item(trip: &Trip) -> TripItem {
    TripItem {
        trip_id: trip.uuid.to_string(),
        country: trip.country.clone(),
        city: trip.city.clone(),
        notes: trip.notes.clone(),
        date_from_ms: trip.date_from,
        date_to_ms: trip.date_to,
        title: trip.location_label(),
    }
}

fn to_place_item(entry: &PlaceWithRoute) -> PlaceItem {
    PlaceItem {
        place_id: entry.place.uuid.to_string(),
        trip_id: entry.place.trip_uuid.to_string(),
        route_id: entry.route.uuid.to_string(),
        name: entry.place.name.clone(),
        date_ms: entry.place.date,
        transport: entry
            .route
            .transport_type
            .map(|kind| kind.as_str().to_string())
            .unwrap_or_default(),
    }
}

fn to_recommendation_item(item: &Recommendation) -> RecommendationItem {
    RecommendationItem {
        slug: item.slug.to_string(),
        title: item.title(),
        city: item.city.to_string(),
        country: item.country.to_string(),
        description: item.description.to_string(),
        image_name: item.image_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, place_create, place_delete, place_set_transport,
        places_list, recommendation_draft, recommendations_list, transport_types,
        trip_create, trip_delete, trip_update, trips_on_date, validate_trip_fields,
    };

    const DAY: i64 = 86_400_000;
    const JUNE_1_2024: i64 = 1_717_200_000_000;

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn validate_trip_fields_reports_messages_per_field() {
        let errors = validate_trip_fields(
            " ".to_string(),
            "Lublin".to_string(),
            "x".repeat(501),
            JUNE_1_2024,
            JUNE_1_2024 - DAY,
        );
        assert_eq!(errors.country, "Country cannot be empty");
        assert_eq!(errors.city, "");
        assert_eq!(errors.notes, "Notes cannot exceed 500 characters");
        assert_eq!(errors.dates, "End date must be after start date");
        assert!(!errors.can_save);

        let valid = validate_trip_fields(
            "Poland".to_string(),
            "Lublin".to_string(),
            String::new(),
            JUNE_1_2024,
            JUNE_1_2024,
        );
        assert!(valid.can_save);
    }

    #[test]
    fn trip_create_rejects_invalid_input_with_field_errors() {
        let response = trip_create(
            "Poland".to_string(),
            "Lublin 2".to_string(),
            String::new(),
            JUNE_1_2024,
            JUNE_1_2024,
        );
        assert!(!response.ok);
        assert!(response.trip.is_none());
        assert_eq!(response.field_errors.city, "City can only contain letters");
    }

    #[test]
    fn trip_and_place_flow_over_ffi() {
        let created = trip_create(
            "Poland".to_string(),
            "Lublin".to_string(),
            String::new(),
            JUNE_1_2024,
            JUNE_1_2024 + 4 * DAY,
        );
        assert!(created.ok, "{}", created.message);
        let trip = created.trip.expect("created trip");
        assert_eq!(trip.title, "Lublin, Poland");

        let rejected = trip_update(
            trip.trip_id.clone(),
            trip.country.clone(),
            trip.city.clone(),
            trip.notes.clone(),
            trip.date_from_ms,
            trip.date_from_ms - 2 * DAY,
        );
        assert!(!rejected.ok);
        assert!(!rejected.field_errors.dates.is_empty());

        let on_day = trips_on_date(JUNE_1_2024 + DAY);
        assert!(on_day.items.iter().any(|item| item.trip_id == trip.trip_id));

        let place = place_create(trip.trip_id.clone(), "Castle".to_string(), JUNE_1_2024 + DAY);
        assert!(place.ok, "{}", place.message);
        let place = place.place.expect("created place");
        assert_eq!(place.transport, "none");

        let shrunk = trip_update(
            trip.trip_id.clone(),
            trip.country.clone(),
            trip.city.clone(),
            trip.notes.clone(),
            trip.date_from_ms,
            trip.date_from_ms,
        );
        assert!(!shrunk.ok);
        assert_eq!(
            shrunk.field_errors.dates,
            "Trip dates must include all of its places"
        );

        let bike = place_set_transport(place.route_id.clone(), Some("Bike".to_string()));
        assert!(bike.ok, "{}", bike.message);
        let bike = bike.place.expect("place after transport change");
        assert_eq!(bike.transport, "bike");
        assert_eq!(bike.name, "Castle");
        assert_eq!(bike.date_ms, place.date_ms);

        let cleared = place_set_transport(place.route_id.clone(), None);
        assert_eq!(cleared.place.expect("place").transport, "");

        let deleted = trip_delete(trip.trip_id.clone());
        assert!(deleted.ok, "{}", deleted.message);
        let orphaned = places_list(trip.trip_id.clone());
        assert!(orphaned.items.is_empty());
        assert!(orphaned.message.contains("trip not found"));
        assert!(!place_delete(place.place_id).ok);
    }

    #[test]
    fn place_set_transport_rejects_unknown_type() {
        let response = place_set_transport(
            "11111111-2222-4333-8444-555555555555".to_string(),
            Some("plane".to_string()),
        );
        assert!(!response.ok);
        assert!(response.message.contains("plane"));
    }

    #[test]
    fn malformed_ids_are_reported() {
        let response = trip_delete("not-a-uuid".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("trip_id"));
    }

    #[test]
    fn recommendations_are_exposed_with_drafts() {
        let items = recommendations_list();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Shanghai, China");

        let draft = recommendation_draft("toronto".to_string(), JUNE_1_2024).expect("draft");
        assert_eq!(draft.city, "Toronto");
        assert_eq!(draft.country, "Canada");
        assert_eq!(draft.date_to_ms, JUNE_1_2024 + 3 * DAY);
        assert!(recommendation_draft("atlantis".to_string(), 0).is_none());
    }

    #[test]
    fn extreme_timestamps_do_not_abort() {
        let response = trips_on_date(i64::MAX);
        assert!(response.message.starts_with("Found"), "{}", response.message);
        let response = trips_on_date(i64::MIN);
        assert!(response.message.starts_with("Found"), "{}", response.message);

        let draft = recommendation_draft("stockholm".to_string(), i64::MAX).expect("draft");
        assert_eq!(draft.date_from_ms, i64::MAX);
        assert_eq!(draft.date_to_ms, i64::MAX);
    }

    #[test]
    fn transport_types_follow_picker_order() {
        assert_eq!(transport_types(), vec!["none", "bike", "car", "train", "bus"]);
    }
}
