//! Map preview geocoding contract.
//!
//! # Responsibility
//! - Define the seam to an external geocoding service.
//! - Resolve a trip's map center on a best-effort basis.
//!
//! # Invariants
//! - Geocoding never reads or writes trip, place or route storage.
//! - Failures are logged and replaced by the default center, never
//!   propagated.

use crate::model::trip::Trip;
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Map center used before (or instead of) a successful lookup: Lublin, Poland.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    latitude: 51.2465,
    longitude: 22.5684,
};

/// WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Geocoding failure reported by a `Geocoder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// The service answered but found nothing for the query.
    NoMatch,
    /// The service could not be reached or returned an error.
    Unavailable(String),
}

impl Display for GeocodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMatch => write!(f, "no location matched the query"),
            Self::Unavailable(reason) => write!(f, "geocoding unavailable: {reason}"),
        }
    }
}

impl Error for GeocodeError {}

/// Resolves free-text `"City, Country"` queries to coordinates.
pub trait Geocoder {
    fn geocode(&self, query: &str) -> Result<Coordinate, GeocodeError>;
}

/// Builds the map lookup query, or `None` when city or country is blank.
pub fn map_query(trip: &Trip) -> Option<String> {
    if trip.city.trim().is_empty() || trip.country.trim().is_empty() {
        return None;
    }
    Some(trip.location_label())
}

/// Resolves the map preview center for a trip.
///
/// Falls back to `DEFAULT_CENTER` when there is nothing to look up or the
/// lookup fails.
pub fn preview_center(geocoder: &dyn Geocoder, trip: &Trip) -> Coordinate {
    let Some(query) = map_query(trip) else {
        return DEFAULT_CENTER;
    };

    match geocoder.geocode(&query) {
        Ok(center) => {
            debug!("event=geocode module=geo status=ok trip_id={}", trip.uuid);
            center
        }
        Err(err) => {
            warn!(
                "event=geocode module=geo status=error error_code=geocode_failed trip_id={} error={}",
                trip.uuid, err
            );
            DEFAULT_CENTER
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{map_query, preview_center, Coordinate, GeocodeError, Geocoder, DEFAULT_CENTER};
    use crate::model::trip::{Trip, TripDraft};
    use std::cell::RefCell;

    struct ScriptedGeocoder {
        answer: Result<Coordinate, GeocodeError>,
        queries: RefCell<Vec<String>>,
    }

    impl Geocoder for ScriptedGeocoder {
        fn geocode(&self, query: &str) -> Result<Coordinate, GeocodeError> {
            self.queries.borrow_mut().push(query.to_string());
            self.answer.clone()
        }
    }

    fn trip() -> Trip {
        Trip::new(&TripDraft::new("Sweden", "Stockholm", "", 0, 0)).unwrap()
    }

    #[test]
    fn successful_lookup_uses_city_country_query() {
        let stockholm = Coordinate {
            latitude: 59.3293,
            longitude: 18.0686,
        };
        let geocoder = ScriptedGeocoder {
            answer: Ok(stockholm),
            queries: RefCell::new(Vec::new()),
        };

        assert_eq!(preview_center(&geocoder, &trip()), stockholm);
        assert_eq!(geocoder.queries.borrow().as_slice(), ["Stockholm, Sweden"]);
    }

    #[test]
    fn failed_lookup_falls_back_to_default_center() {
        let geocoder = ScriptedGeocoder {
            answer: Err(GeocodeError::Unavailable("offline".to_string())),
            queries: RefCell::new(Vec::new()),
        };

        assert_eq!(preview_center(&geocoder, &trip()), DEFAULT_CENTER);
    }

    #[test]
    fn blank_location_skips_lookup() {
        let mut blank = trip();
        blank.city = String::new();
        let geocoder = ScriptedGeocoder {
            answer: Err(GeocodeError::NoMatch),
            queries: RefCell::new(Vec::new()),
        };

        assert_eq!(map_query(&blank), None);
        assert_eq!(preview_center(&geocoder, &blank), DEFAULT_CENTER);
        assert!(geocoder.queries.borrow().is_empty());
    }
}
