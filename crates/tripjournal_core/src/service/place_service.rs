//! Place/route use-case service.
//!
//! # Responsibility
//! - Create places paired 1:1 with a fresh route.
//! - Edit and delete places, and change a route's transport type.
//!
//! # Invariants
//! - A place date must fall inside its trip's `[date_from, date_to]`.
//! - `set_transport_type` never changes the place's name or date.
//! - Deleting a place deletes its route.

use crate::model::place::{Place, PlaceId};
use crate::model::route::{Route, RouteId, TransportType};
use crate::model::trip::TripId;
use crate::repo::place_repo::{PlaceRepository, PlaceWithRoute};
use crate::repo::trip_repo::RepoError;
use crate::validation::FieldError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for place and route use-cases.
#[derive(Debug)]
pub enum PlaceServiceError {
    Validation(FieldError),
    TripNotFound(TripId),
    PlaceNotFound(PlaceId),
    RouteNotFound(RouteId),
    /// Place date lies outside the owning trip's date range.
    PlaceDateOutsideTrip {
        date: i64,
        date_from: i64,
        date_to: i64,
    },
    Persistence(RepoError),
    InconsistentState(&'static str),
}

impl Display for PlaceServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TripNotFound(id) => write!(f, "trip not found: {id}"),
            Self::PlaceNotFound(id) => write!(f, "place not found: {id}"),
            Self::RouteNotFound(id) => write!(f, "route not found: {id}"),
            Self::PlaceDateOutsideTrip { .. } => {
                write!(f, "Place date must be within the trip dates")
            }
            Self::Persistence(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent place state: {details}"),
        }
    }
}

impl Error for PlaceServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PlaceServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::TripNotFound(id) => Self::TripNotFound(id),
            RepoError::PlaceNotFound(id) => Self::PlaceNotFound(id),
            RepoError::RouteNotFound(id) => Self::RouteNotFound(id),
            RepoError::InvalidPlace(err) => Self::Validation(err),
            other => Self::Persistence(other),
        }
    }
}

impl From<FieldError> for PlaceServiceError {
    fn from(value: FieldError) -> Self {
        Self::Validation(value)
    }
}

/// Place service facade over repository implementations.
pub struct PlaceService<R: PlaceRepository> {
    repo: R,
}

impl<R: PlaceRepository> PlaceService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a place to a trip together with a route set to
    /// `TransportType::None`.
    pub fn create_place(
        &self,
        trip_uuid: TripId,
        name: &str,
        date: i64,
    ) -> Result<PlaceWithRoute, PlaceServiceError> {
        let place = Place::new(trip_uuid, name, date)?;
        self.ensure_date_within_trip(trip_uuid, date)?;
        let route = Route::for_place(&place);

        self.repo
            .create_place(&place, &route)
            .inspect_err(|err| log_failed("place_create", err))?;
        let stored = self
            .repo
            .get_place(place.uuid)?
            .ok_or(PlaceServiceError::InconsistentState(
                "created place not found in read-back",
            ))?;

        info!(
            "event=place_create module=service status=ok trip_id={} place_id={} route_id={}",
            trip_uuid, stored.place.uuid, stored.route.uuid
        );
        Ok(stored)
    }

    /// Overwrites a place's name and date. Its route is unchanged.
    pub fn update_place(
        &self,
        id: PlaceId,
        name: &str,
        date: i64,
    ) -> Result<PlaceWithRoute, PlaceServiceError> {
        let PlaceWithRoute { mut place, .. } = self
            .repo
            .get_place(id)?
            .ok_or(PlaceServiceError::PlaceNotFound(id))?;
        place.rename(name, date)?;
        self.ensure_date_within_trip(place.trip_uuid, date)?;

        self.repo
            .update_place(&place)
            .inspect_err(|err| log_failed("place_update", err))?;
        let stored = self
            .repo
            .get_place(id)?
            .ok_or(PlaceServiceError::InconsistentState(
                "updated place not found in read-back",
            ))?;

        info!("event=place_update module=service status=ok place_id={id}");
        Ok(stored)
    }

    /// Deletes a place and its route.
    pub fn delete_place(&self, id: PlaceId) -> Result<(), PlaceServiceError> {
        self.repo
            .delete_place(id)
            .inspect_err(|err| log_failed("place_delete", err))?;
        info!("event=place_delete module=service status=ok place_id={id}");
        Ok(())
    }

    /// Sets or clears the transport type of a route and returns it.
    pub fn set_transport_type(
        &self,
        id: RouteId,
        transport_type: Option<TransportType>,
    ) -> Result<Route, PlaceServiceError> {
        self.repo
            .set_transport_type(id, transport_type)
            .inspect_err(|err| log_failed("route_set_transport", err))?;
        let stored = self
            .repo
            .get_route(id)?
            .ok_or(PlaceServiceError::InconsistentState(
                "updated route not found in read-back",
            ))?;

        info!(
            "event=route_set_transport module=service status=ok route_id={} transport={}",
            id,
            transport_type.map_or("unset", TransportType::as_str)
        );
        Ok(stored)
    }

    /// Gets one place with its route.
    pub fn get_place(&self, id: PlaceId) -> Result<Option<PlaceWithRoute>, PlaceServiceError> {
        Ok(self.repo.get_place(id)?)
    }

    /// Lists a trip's places with routes, earliest first.
    pub fn list_places(&self, trip_uuid: TripId) -> Result<Vec<PlaceWithRoute>, PlaceServiceError> {
        if self.repo.trip_date_range(trip_uuid)?.is_none() {
            return Err(PlaceServiceError::TripNotFound(trip_uuid));
        }
        Ok(self.repo.list_places(trip_uuid)?)
    }

    /// Returns the route attached to a place.
    pub fn route_for_place(&self, id: PlaceId) -> Result<Route, PlaceServiceError> {
        self.repo
            .get_place(id)?
            .map(|entry| entry.route)
            .ok_or(PlaceServiceError::PlaceNotFound(id))
    }

    fn ensure_date_within_trip(
        &self,
        trip_uuid: TripId,
        date: i64,
    ) -> Result<(), PlaceServiceError> {
        let (date_from, date_to) = self
            .repo
            .trip_date_range(trip_uuid)?
            .ok_or(PlaceServiceError::TripNotFound(trip_uuid))?;
        if date < date_from || date > date_to {
            warn!(
                "event=place_date_check module=service status=rejected error_code=date_outside_trip trip_id={trip_uuid}"
            );
            return Err(PlaceServiceError::PlaceDateOutsideTrip {
                date,
                date_from,
                date_to,
            });
        }
        Ok(())
    }
}

fn log_failed(event: &str, err: &RepoError) {
    match err {
        RepoError::TripNotFound(_) | RepoError::PlaceNotFound(_) | RepoError::RouteNotFound(_) => {
            warn!("event={event} module=service status=error error_code=not_found error={err}")
        }
        other => error!(
            "event={event} module=service status=error error_code=persistence_failed error={other}"
        ),
    }
}
