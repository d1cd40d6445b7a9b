//! Field validation rules for trip and place input.
//!
//! # Responsibility
//! - Check single candidate field values and return display-ready errors.
//! - Collect per-field failures so a form can show every message at once.
//!
//! # Invariants
//! - Every rule is pure: no storage access, no logging.
//! - Country/city must be non-blank and contain only letters or whitespace.
//! - Notes are limited to `NOTES_MAX_CHARS` Unicode scalar values.
//! - A date range is valid when `to >= from`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum notes length, counted in `char`s.
pub const NOTES_MAX_CHARS: usize = 500;

// Letters include combining marks so decomposed input like "Zu\u{308}rich" passes.
static LETTERS_AND_WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{M}\s]*$").expect("valid letters regex"));

/// Form field a validation error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Country,
    City,
    Notes,
    /// The `date_from`/`date_to` pair.
    Dates,
    PlaceName,
}

impl Field {
    /// User-facing label used as the message prefix.
    pub fn label(self) -> &'static str {
        match self {
            Self::Country => "Country",
            Self::City => "City",
            Self::Notes => "Notes",
            Self::Dates => "Dates",
            Self::PlaceName => "Place name",
        }
    }
}

/// Field-level validation failure.
///
/// `Display` yields the message the presentation layer shows next to the
/// offending field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Value is empty after trimming whitespace.
    EmptyField(Field),
    /// Value contains something other than letters or whitespace.
    InvalidCharacters(Field),
    /// Value is longer than the field allows.
    TooLong {
        field: Field,
        max: usize,
        actual: usize,
    },
    /// End of the range lies before its start.
    InvalidRange { from: i64, to: i64 },
}

impl FieldError {
    /// Returns the form field this error should be rendered next to.
    pub fn field(&self) -> Field {
        match self {
            Self::EmptyField(field) | Self::InvalidCharacters(field) => *field,
            Self::TooLong { field, .. } => *field,
            Self::InvalidRange { .. } => Field::Dates,
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{} cannot be empty", field.label()),
            Self::InvalidCharacters(field) => {
                write!(f, "{} can only contain letters", field.label())
            }
            Self::TooLong { field, max, .. } => {
                write!(f, "{} cannot exceed {max} characters", field.label())
            }
            Self::InvalidRange { .. } => write!(f, "End date must be after start date"),
        }
    }
}

impl Error for FieldError {}

/// Validates the trip country field.
pub fn validate_country(value: &str) -> Result<(), FieldError> {
    validate_location_part(Field::Country, value)
}

/// Validates the trip city field.
pub fn validate_city(value: &str) -> Result<(), FieldError> {
    validate_location_part(Field::City, value)
}

/// Validates free-text trip notes.
pub fn validate_notes(value: &str) -> Result<(), FieldError> {
    let actual = value.chars().count();
    if actual > NOTES_MAX_CHARS {
        return Err(FieldError::TooLong {
            field: Field::Notes,
            max: NOTES_MAX_CHARS,
            actual,
        });
    }
    Ok(())
}

/// Validates a trip date range given as epoch milliseconds.
pub fn validate_date_range(from: i64, to: i64) -> Result<(), FieldError> {
    if to < from {
        return Err(FieldError::InvalidRange { from, to });
    }
    Ok(())
}

/// Validates a place name. Only blankness is checked.
pub fn validate_place_name(value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::EmptyField(Field::PlaceName));
    }
    Ok(())
}

fn validate_location_part(field: Field, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::EmptyField(field));
    }
    if !LETTERS_AND_WHITESPACE_RE.is_match(value) {
        return Err(FieldError::InvalidCharacters(field));
    }
    Ok(())
}

/// Per-field outcome of validating a whole trip form.
///
/// A `None` slot means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripFieldErrors {
    pub country: Option<FieldError>,
    pub city: Option<FieldError>,
    pub notes: Option<FieldError>,
    pub dates: Option<FieldError>,
}

impl TripFieldErrors {
    /// Returns `true` when no field failed.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Iterates failures in form order: country, city, notes, dates.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        [&self.country, &self.city, &self.notes, &self.dates]
            .into_iter()
            .flatten()
    }

    /// Returns the failure for one field, if any.
    pub fn get(&self, field: Field) -> Option<&FieldError> {
        match field {
            Field::Country => self.country.as_ref(),
            Field::City => self.city.as_ref(),
            Field::Notes => self.notes.as_ref(),
            Field::Dates => self.dates.as_ref(),
            Field::PlaceName => None,
        }
    }
}

impl Display for TripFieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for err in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
            first = false;
        }
        Ok(())
    }
}

impl Error for TripFieldErrors {}

#[cfg(test)]
mod tests {
    use super::{
        validate_city, validate_country, validate_date_range, validate_notes,
        validate_place_name, Field, FieldError, TripFieldErrors, NOTES_MAX_CHARS,
    };

    #[test]
    fn location_parts_accept_unicode_letters_and_inner_spaces() {
        for value in ["Poland", "São Paulo", "Łódź", "New York", " Zu\u{308}rich "] {
            assert_eq!(validate_city(value), Ok(()), "{value:?} should be valid");
        }
    }

    #[test]
    fn location_parts_reject_blank_before_checking_characters() {
        assert_eq!(
            validate_country("   \t"),
            Err(FieldError::EmptyField(Field::Country))
        );
        assert_eq!(validate_city(""), Err(FieldError::EmptyField(Field::City)));
    }

    #[test]
    fn location_parts_reject_digits_and_punctuation() {
        for value in ["Route 66", "Saint-Denis", "Rome!", "O'Hare"] {
            assert_eq!(
                validate_country(value),
                Err(FieldError::InvalidCharacters(Field::Country)),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn notes_limit_is_inclusive_and_counts_chars() {
        let at_limit = "ż".repeat(NOTES_MAX_CHARS);
        assert_eq!(validate_notes(&at_limit), Ok(()));
        assert_eq!(validate_notes(""), Ok(()));

        let over = "a".repeat(NOTES_MAX_CHARS + 1);
        assert_eq!(
            validate_notes(&over),
            Err(FieldError::TooLong {
                field: Field::Notes,
                max: NOTES_MAX_CHARS,
                actual: NOTES_MAX_CHARS + 1,
            })
        );
    }

    #[test]
    fn date_range_allows_equal_bounds() {
        assert_eq!(validate_date_range(1_000, 1_000), Ok(()));
        assert_eq!(validate_date_range(1_000, 2_000), Ok(()));
        assert_eq!(
            validate_date_range(2_000, 1_000),
            Err(FieldError::InvalidRange {
                from: 2_000,
                to: 1_000
            })
        );
    }

    #[test]
    fn place_name_rejects_blank_only() {
        assert_eq!(validate_place_name("Castle #2"), Ok(()));
        assert_eq!(
            validate_place_name("  "),
            Err(FieldError::EmptyField(Field::PlaceName))
        );
    }

    #[test]
    fn messages_match_form_copy() {
        assert_eq!(
            FieldError::EmptyField(Field::Country).to_string(),
            "Country cannot be empty"
        );
        assert_eq!(
            FieldError::InvalidCharacters(Field::City).to_string(),
            "City can only contain letters"
        );
        assert_eq!(
            validate_notes(&"x".repeat(501)).unwrap_err().to_string(),
            "Notes cannot exceed 500 characters"
        );
        assert_eq!(
            validate_date_range(5, 4).unwrap_err().to_string(),
            "End date must be after start date"
        );
    }

    #[test]
    fn field_errors_iterate_in_form_order() {
        let errors = TripFieldErrors {
            country: None,
            city: Some(FieldError::EmptyField(Field::City)),
            notes: None,
            dates: Some(FieldError::InvalidRange { from: 2, to: 1 }),
        };

        assert!(!errors.is_empty());
        let fields: Vec<Field> = errors.iter().map(FieldError::field).collect();
        assert_eq!(fields, vec![Field::City, Field::Dates]);
        assert_eq!(
            errors.to_string(),
            "City cannot be empty; End date must be after start date"
        );
        assert!(TripFieldErrors::default().is_empty());
    }
}
