//! Route domain model: the transport annotation for reaching a place.
//!
//! # Invariants
//! - A route is created together with its place and never re-pointed.
//! - `transport_type` is the only field mutated after creation.

use crate::model::place::{Place, PlaceId};
use crate::model::trip::TripId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a Route.
pub type RouteId = Uuid;

/// How the traveller got to a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    /// Explicit "no transport" choice; the value new routes start with.
    None,
    Bike,
    Car,
    Train,
    Bus,
}

impl TransportType {
    /// All choices in picker order.
    pub const ALL: [TransportType; 5] = [
        TransportType::None,
        TransportType::Bike,
        TransportType::Car,
        TransportType::Train,
        TransportType::Bus,
    ];

    /// Stable lowercase storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bike => "bike",
            Self::Car => "car",
            Self::Train => "train",
            Self::Bus => "bus",
        }
    }

    /// Parses a storage/wire name, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "bike" => Some(Self::Bike),
            "car" => Some(Self::Car),
            "train" => Some(Self::Train),
            "bus" => Some(Self::Bus),
            _ => None,
        }
    }
}

/// Transport annotation attached to exactly one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub uuid: RouteId,
    /// Trip that owns the route's place.
    pub trip_uuid: TripId,
    pub place_uuid: PlaceId,
    /// `None` means unset; `Some(TransportType::None)` is an explicit choice.
    pub transport_type: Option<TransportType>,
    /// Reserved ranking, persisted but not interpreted.
    pub priority: i16,
}

impl Route {
    /// Creates the companion route for a freshly created place.
    pub fn for_place(place: &Place) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            trip_uuid: place.trip_uuid,
            place_uuid: place.uuid,
            transport_type: Some(TransportType::None),
            priority: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Route, TransportType};
    use crate::model::place::Place;
    use uuid::Uuid;

    #[test]
    fn storage_names_parse_back() {
        for kind in TransportType::ALL {
            assert_eq!(TransportType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(TransportType::parse("Bike"), Some(TransportType::Bike));
        assert_eq!(TransportType::parse("plane"), None);
    }

    #[test]
    fn for_place_starts_with_explicit_none() {
        let place = Place::new(Uuid::new_v4(), "Castle", 1).unwrap();
        let route = Route::for_place(&place);

        assert_eq!(route.place_uuid, place.uuid);
        assert_eq!(route.trip_uuid, place.trip_uuid);
        assert_eq!(route.transport_type, Some(TransportType::None));
        assert_eq!(route.priority, 0);
    }
}
