//! Trip domain model and editable draft.
//!
//! # Responsibility
//! - Define the persisted Trip record and the `TripDraft` edited by forms.
//! - Apply trip edits all-or-nothing after the validation gate passes.
//!
//! # Invariants
//! - `uuid` is generated once and never changes.
//! - `date_to >= date_from`.
//! - `country`/`city` are non-blank letters/whitespace; `notes` is at most
//!   500 chars.

use crate::model::MS_PER_DAY;
use crate::validation::{
    validate_city, validate_country, validate_date_range, validate_notes, TripFieldErrors,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a Trip.
pub type TripId = Uuid;

/// Editable trip fields as entered in the add/edit forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDraft {
    pub country: String,
    pub city: String,
    pub notes: String,
    /// Unix epoch milliseconds.
    pub date_from: i64,
    /// Unix epoch milliseconds. Must be >= `date_from`.
    pub date_to: i64,
}

impl TripDraft {
    pub fn new(
        country: impl Into<String>,
        city: impl Into<String>,
        notes: impl Into<String>,
        date_from: i64,
        date_to: i64,
    ) -> Self {
        Self {
            country: country.into(),
            city: city.into(),
            notes: notes.into(),
            date_from,
            date_to,
        }
    }

    /// Runs every field rule and reports each failing field.
    pub fn field_errors(&self) -> TripFieldErrors {
        TripFieldErrors {
            country: validate_country(&self.country).err(),
            city: validate_city(&self.city).err(),
            notes: validate_notes(&self.notes).err(),
            dates: validate_date_range(self.date_from, self.date_to).err(),
        }
    }

    /// Composite gate: `Ok` only when all four field rules pass.
    pub fn validate(&self) -> Result<(), TripFieldErrors> {
        let errors = self.field_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Returns whether the save action should be enabled.
    pub fn fields_are_valid(&self) -> bool {
        self.field_errors().is_empty()
    }
}

/// Record-level invariant violations for `Trip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripValidationError {
    NilUuid,
    Fields(TripFieldErrors),
}

impl Display for TripValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "trip uuid must not be nil"),
            Self::Fields(errors) => write!(f, "{errors}"),
        }
    }
}

impl Error for TripValidationError {}

impl From<TripFieldErrors> for TripValidationError {
    fn from(value: TripFieldErrors) -> Self {
        Self::Fields(value)
    }
}

/// A journey record with location, date range and notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TripWire")]
pub struct Trip {
    pub uuid: TripId,
    pub country: String,
    pub city: String,
    /// Unix epoch milliseconds.
    pub date_from: i64,
    /// Unix epoch milliseconds. Always >= `date_from`.
    pub date_to: i64,
    pub notes: String,
}

#[derive(Deserialize)]
struct TripWire {
    uuid: TripId,
    country: String,
    city: String,
    date_from: i64,
    date_to: i64,
    notes: String,
}

impl TryFrom<TripWire> for Trip {
    type Error = TripValidationError;

    fn try_from(value: TripWire) -> Result<Self, Self::Error> {
        let trip = Self {
            uuid: value.uuid,
            country: value.country,
            city: value.city,
            date_from: value.date_from,
            date_to: value.date_to,
            notes: value.notes,
        };
        trip.validate()?;
        Ok(trip)
    }
}

impl Trip {
    /// Creates a trip with a fresh identifier from a validated draft.
    pub fn new(draft: &TripDraft) -> Result<Self, TripFieldErrors> {
        draft.validate()?;
        Ok(Self::from_draft_unchecked(Uuid::new_v4(), draft))
    }

    /// Creates a trip with a caller-provided identifier.
    ///
    /// Unlike `new`, the identifier is kept as given; a nil uuid is rejected.
    pub fn with_id(uuid: TripId, draft: &TripDraft) -> Result<Self, TripValidationError> {
        let trip = Self::from_draft_unchecked(uuid, draft);
        trip.validate()?;
        Ok(trip)
    }

    fn from_draft_unchecked(uuid: TripId, draft: &TripDraft) -> Self {
        Self {
            uuid,
            country: draft.country.clone(),
            city: draft.city.clone(),
            date_from: draft.date_from,
            date_to: draft.date_to,
            notes: draft.notes.clone(),
        }
    }

    /// Checks all record invariants.
    pub fn validate(&self) -> Result<(), TripValidationError> {
        if self.uuid.is_nil() {
            return Err(TripValidationError::NilUuid);
        }
        self.to_draft().validate()?;
        Ok(())
    }

    /// Copies the editable fields into a draft for an edit form.
    pub fn to_draft(&self) -> TripDraft {
        TripDraft::new(
            self.country.clone(),
            self.city.clone(),
            self.notes.clone(),
            self.date_from,
            self.date_to,
        )
    }

    /// Overwrites all editable fields, or none when the draft is invalid.
    pub fn apply(&mut self, draft: &TripDraft) -> Result<(), TripFieldErrors> {
        draft.validate()?;
        self.country = draft.country.clone();
        self.city = draft.city.clone();
        self.notes = draft.notes.clone();
        self.date_from = draft.date_from;
        self.date_to = draft.date_to;
        Ok(())
    }

    /// Returns whether `at` lies inside `[date_from, date_to]`.
    pub fn contains(&self, at: i64) -> bool {
        self.date_from <= at && at <= self.date_to
    }

    /// Calendar rule: the trip is shown on the day containing `day`.
    ///
    /// A trip is on a day when that instant lies inside the trip interval,
    /// or when it falls on the same UTC day as `date_from`.
    pub fn is_on_day(&self, day: i64) -> bool {
        self.contains(day) || day.div_euclid(MS_PER_DAY) == self.date_from.div_euclid(MS_PER_DAY)
    }

    /// `"City, Country"` label used for titles and map lookups.
    pub fn location_label(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}
