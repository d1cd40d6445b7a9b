//! Place domain model.
//!
//! # Invariants
//! - `trip_uuid` is set at creation and never re-pointed.
//! - `name` is stored trimmed and is never blank.

use crate::model::trip::TripId;
use crate::validation::{validate_place_name, FieldError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a Place.
pub type PlaceId = Uuid;

/// A point of interest visited during a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub uuid: PlaceId,
    /// Owning trip (back-reference).
    pub trip_uuid: TripId,
    pub name: String,
    /// Unix epoch milliseconds.
    pub date: i64,
}

impl Place {
    /// Creates a place bound to `trip_uuid` with a generated identifier.
    pub fn new(trip_uuid: TripId, name: &str, date: i64) -> Result<Self, FieldError> {
        validate_place_name(name)?;
        Ok(Self {
            uuid: Uuid::new_v4(),
            trip_uuid,
            name: name.trim().to_string(),
            date,
        })
    }

    /// Overwrites name and date. The owning trip is unchanged.
    pub fn rename(&mut self, name: &str, date: i64) -> Result<(), FieldError> {
        validate_place_name(name)?;
        self.name = name.trim().to_string();
        self.date = date;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Place;
    use crate::validation::{Field, FieldError};
    use uuid::Uuid;

    #[test]
    fn new_trims_name_and_rejects_blank() {
        let trip_uuid = Uuid::new_v4();
        let place = Place::new(trip_uuid, "  Castle ", 7).unwrap();
        assert_eq!(place.name, "Castle");
        assert_eq!(place.trip_uuid, trip_uuid);

        let err = Place::new(trip_uuid, "", 7).unwrap_err();
        assert_eq!(err, FieldError::EmptyField(Field::PlaceName));
    }

    #[test]
    fn failed_rename_keeps_previous_values() {
        let mut place = Place::new(Uuid::new_v4(), "Castle", 7).unwrap();
        assert!(place.rename(" ", 9).is_err());
        assert_eq!(place.name, "Castle");
        assert_eq!(place.date, 7);
    }
}
