//! Trip use-case service.
//!
//! # Responsibility
//! - Gate every trip write behind the composite field validation.
//! - Provide list and calendar reads for the trips and calendar screens.
//!
//! # Invariants
//! - A rejected draft never reaches the repository, so the stored trip is
//!   unchanged after any validation failure.
//! - Persistence failures are returned as `TripServiceError::Persistence`,
//!   never turned into a panic.
//! - An update never moves the date range off an existing place.

use crate::model::trip::{Trip, TripDraft, TripId};
use crate::recommendation::Recommendation;
use crate::repo::trip_repo::{RepoError, TripListQuery, TripRepository};
use crate::validation::TripFieldErrors;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for trip use-cases.
#[derive(Debug)]
pub enum TripServiceError {
    /// One or more fields failed validation; nothing was written.
    Validation(TripFieldErrors),
    TripNotFound(TripId),
    /// New date range leaves out places already on the trip.
    PlacesOutsideDates {
        earliest_place: i64,
        latest_place: i64,
    },
    /// Storage could not complete the write or read.
    Persistence(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for TripServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "{errors}"),
            Self::TripNotFound(id) => write!(f, "trip not found: {id}"),
            Self::PlacesOutsideDates { .. } => {
                write!(f, "Trip dates must include all of its places")
            }
            Self::Persistence(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent trip state: {details}"),
        }
    }
}

impl Error for TripServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TripServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::TripNotFound(id) => Self::TripNotFound(id),
            other => Self::Persistence(other),
        }
    }
}

impl From<TripFieldErrors> for TripServiceError {
    fn from(value: TripFieldErrors) -> Self {
        Self::Validation(value)
    }
}

/// Trip service facade over repository implementations.
pub struct TripService<R: TripRepository> {
    repo: R,
}

impl<R: TripRepository> TripService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a trip from a draft and returns the stored record.
    ///
    /// The new trip has a fresh identifier and no places.
    pub fn create_trip(&self, draft: &TripDraft) -> Result<Trip, TripServiceError> {
        let trip = Trip::new(draft).inspect_err(|errors| log_rejected("trip_create", errors))?;

        self.repo
            .create_trip(&trip)
            .inspect_err(|err| log_failed("trip_create", err))?;
        let stored = self
            .repo
            .get_trip(trip.uuid)?
            .ok_or(TripServiceError::InconsistentState(
                "created trip not found in read-back",
            ))?;

        info!("event=trip_create module=service status=ok trip_id={}", stored.uuid);
        Ok(stored)
    }

    /// Creates a trip from a draft that started as a recommendation.
    pub fn create_from_recommendation(
        &self,
        recommendation: &Recommendation,
        draft: &TripDraft,
    ) -> Result<Trip, TripServiceError> {
        let trip = self.create_trip(draft)?;
        info!(
            "event=trip_from_recommendation module=service status=ok trip_id={} source={}",
            trip.uuid, recommendation.slug
        );
        Ok(trip)
    }

    /// Replaces all editable fields of a trip, or none of them.
    ///
    /// The new range must still cover every place of the trip.
    pub fn update_trip(&self, id: TripId, draft: &TripDraft) -> Result<Trip, TripServiceError> {
        draft
            .validate()
            .inspect_err(|errors| log_rejected("trip_update", errors))?;

        let mut trip = self
            .repo
            .get_trip(id)?
            .ok_or(TripServiceError::TripNotFound(id))?;
        if let Some((earliest_place, latest_place)) = self.repo.place_date_bounds(id)? {
            if earliest_place < draft.date_from || latest_place > draft.date_to {
                warn!(
                    "event=trip_update module=service status=rejected error_code=places_outside_dates trip_id={id}"
                );
                return Err(TripServiceError::PlacesOutsideDates {
                    earliest_place,
                    latest_place,
                });
            }
        }
        trip.apply(draft)?;

        self.repo
            .update_trip(&trip)
            .inspect_err(|err| log_failed("trip_update", err))?;
        let stored = self
            .repo
            .get_trip(id)?
            .ok_or(TripServiceError::InconsistentState(
                "updated trip not found in read-back",
            ))?;

        info!("event=trip_update module=service status=ok trip_id={id}");
        Ok(stored)
    }

    /// Deletes a trip with all of its places and routes.
    pub fn delete_trip(&self, id: TripId) -> Result<(), TripServiceError> {
        self.repo
            .delete_trip(id)
            .inspect_err(|err| log_failed("trip_delete", err))?;
        info!("event=trip_delete module=service status=ok trip_id={id}");
        Ok(())
    }

    /// Gets one trip by stable ID.
    pub fn get_trip(&self, id: TripId) -> Result<Option<Trip>, TripServiceError> {
        Ok(self.repo.get_trip(id)?)
    }

    /// Lists trips ordered by start date.
    pub fn list_trips(&self, query: &TripListQuery) -> Result<Vec<Trip>, TripServiceError> {
        Ok(self.repo.list_trips(query)?)
    }

    /// Trips shown on the calendar day containing `day` (epoch ms).
    pub fn trips_on_date(&self, day: i64) -> Result<Vec<Trip>, TripServiceError> {
        Ok(self.repo.trips_on_day(day)?)
    }

    /// Returns whether the calendar should mark the day containing `day`.
    pub fn has_trips_on_date(&self, day: i64) -> Result<bool, TripServiceError> {
        Ok(!self.repo.trips_on_day(day)?.is_empty())
    }
}

fn log_rejected(event: &str, errors: &TripFieldErrors) {
    warn!(
        "event={event} module=service status=rejected error_code=validation_failed field_count={}",
        errors.iter().count()
    );
}

fn log_failed(event: &str, err: &RepoError) {
    match err {
        RepoError::TripNotFound(id) => {
            warn!("event={event} module=service status=error error_code=trip_not_found trip_id={id}")
        }
        other => error!(
            "event={event} module=service status=error error_code=persistence_failed error={other}"
        ),
    }
}
