//! Core domain logic for the trip journal.
//! This crate is the single source of truth for trip/place/route invariants.

pub mod db;
pub mod geo;
pub mod logging;
pub mod model;
pub mod recommendation;
pub mod repo;
pub mod service;
pub mod validation;

pub use geo::{map_query, preview_center, Coordinate, GeocodeError, Geocoder, DEFAULT_CENTER};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::place::{Place, PlaceId};
pub use model::route::{Route, RouteId, TransportType};
pub use model::trip::{Trip, TripDraft, TripId, TripValidationError};
pub use recommendation::{find_recommendation, recommendations, Recommendation};
pub use repo::place_repo::{PlaceRepository, PlaceWithRoute, SqlitePlaceRepository};
pub use repo::trip_repo::{
    RepoError, RepoResult, SqliteTripRepository, TripListQuery, TripOrder, TripRepository,
};
pub use service::place_service::{PlaceService, PlaceServiceError};
pub use service::trip_service::{TripService, TripServiceError};
pub use validation::{
    validate_city, validate_country, validate_date_range, validate_notes, validate_place_name,
    Field, FieldError, TripFieldErrors,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
