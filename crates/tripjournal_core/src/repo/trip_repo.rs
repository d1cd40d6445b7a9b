//! Trip repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and calendar queries over the `trips` table.
//! - Own the trip delete cascade over `places` and `routes`.
//!
//! # Invariants
//! - Write paths call `Trip::validate()` before SQL mutations.
//! - `delete_trip` removes the trip, its places and their routes in one
//!   transaction, so no place outlives its trip.
//! - Trip lists are ordered by `date_from`, then `uuid`.
//! - `place_date_bounds` reads `places` only; it never writes.

use crate::db::DbError;
use crate::model::place::PlaceId;
use crate::model::route::RouteId;
use crate::model::trip::{Trip, TripId, TripValidationError};
use crate::model::MS_PER_DAY;
use crate::repo::schema_guard::{
    ensure_connection_ready, parse_uuid, PLACES_TABLE, ROUTES_TABLE, TRIPS_TABLE,
};
use crate::validation::FieldError;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TRIP_SELECT_SQL: &str = "SELECT
    uuid,
    country,
    city,
    date_from,
    date_to,
    notes
FROM trips";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for trip/place/route persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    /// Trip record failed its invariants.
    InvalidTrip(TripValidationError),
    /// Place record failed its invariants.
    InvalidPlace(FieldError),
    Db(DbError),
    TripNotFound(TripId),
    PlaceNotFound(PlaceId),
    RouteNotFound(RouteId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted row cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTrip(err) => write!(f, "{err}"),
            Self::InvalidPlace(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::TripNotFound(id) => write!(f, "trip not found: {id}"),
            Self::PlaceNotFound(id) => write!(f, "place not found: {id}"),
            Self::RouteNotFound(id) => write!(f, "route not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "journal repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "journal repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "journal repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted journal data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTrip(err) => Some(err),
            Self::InvalidPlace(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TripValidationError> for RepoError {
    fn from(value: TripValidationError) -> Self {
        Self::InvalidTrip(value)
    }
}

impl From<FieldError> for RepoError {
    fn from(value: FieldError) -> Self {
        Self::InvalidPlace(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Sort direction for trip lists, keyed on `date_from`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TripOrder {
    #[default]
    OldestFirst,
    NewestFirst,
}

/// Query options for listing trips.
#[derive(Debug, Clone, Default)]
pub struct TripListQuery {
    pub order: TripOrder,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for trip persistence.
pub trait TripRepository {
    fn create_trip(&self, trip: &Trip) -> RepoResult<TripId>;
    /// Overwrites every editable column of an existing trip.
    fn update_trip(&self, trip: &Trip) -> RepoResult<()>;
    fn get_trip(&self, id: TripId) -> RepoResult<Option<Trip>>;
    fn list_trips(&self, query: &TripListQuery) -> RepoResult<Vec<Trip>>;
    /// Trips shown on the calendar day containing `day` (epoch ms).
    fn trips_on_day(&self, day: i64) -> RepoResult<Vec<Trip>>;
    /// Deletes a trip together with its places and routes.
    fn delete_trip(&self, id: TripId) -> RepoResult<()>;
    /// Earliest and latest place date of a trip, or `None` without places.
    fn place_date_bounds(&self, id: TripId) -> RepoResult<Option<(i64, i64)>>;
}

/// SQLite-backed trip repository.
pub struct SqliteTripRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTripRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[TRIPS_TABLE, PLACES_TABLE, ROUTES_TABLE])?;
        Ok(Self { conn })
    }
}

impl TripRepository for SqliteTripRepository<'_> {
    fn create_trip(&self, trip: &Trip) -> RepoResult<TripId> {
        trip.validate()?;

        self.conn.execute(
            "INSERT INTO trips (
                uuid,
                country,
                city,
                date_from,
                date_to,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                trip.uuid.to_string(),
                trip.country.as_str(),
                trip.city.as_str(),
                trip.date_from,
                trip.date_to,
                trip.notes.as_str(),
            ],
        )?;

        Ok(trip.uuid)
    }

    fn update_trip(&self, trip: &Trip) -> RepoResult<()> {
        trip.validate()?;

        let changed = self.conn.execute(
            "UPDATE trips
             SET
                country = ?1,
                city = ?2,
                date_from = ?3,
                date_to = ?4,
                notes = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?6;",
            params![
                trip.country.as_str(),
                trip.city.as_str(),
                trip.date_from,
                trip.date_to,
                trip.notes.as_str(),
                trip.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::TripNotFound(trip.uuid));
        }

        Ok(())
    }

    fn get_trip(&self, id: TripId) -> RepoResult<Option<Trip>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TRIP_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_trip_row(row)?));
        }

        Ok(None)
    }

    fn list_trips(&self, query: &TripListQuery) -> RepoResult<Vec<Trip>> {
        let mut sql = String::from(TRIP_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();

        match query.order {
            TripOrder::OldestFirst => sql.push_str(" ORDER BY date_from ASC, uuid ASC"),
            TripOrder::NewestFirst => sql.push_str(" ORDER BY date_from DESC, uuid ASC"),
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut trips = Vec::new();
        while let Some(row) = rows.next()? {
            trips.push(parse_trip_row(row)?);
        }

        Ok(trips)
    }

    fn trips_on_day(&self, day: i64) -> RepoResult<Vec<Trip>> {
        // Saturate so the first and last representable days stay queryable.
        let day_start = day.div_euclid(MS_PER_DAY).saturating_mul(MS_PER_DAY);
        let day_end = day_start.saturating_add(MS_PER_DAY);

        let mut stmt = self.conn.prepare(&format!(
            "{TRIP_SELECT_SQL}
             WHERE (date_from <= ?1 AND ?1 <= date_to)
                OR (date_from >= ?2 AND date_from < ?3)
             ORDER BY date_from ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query(params![day, day_start, day_end])?;
        let mut trips = Vec::new();
        while let Some(row) = rows.next()? {
            trips.push(parse_trip_row(row)?);
        }

        Ok(trips)
    }

    fn delete_trip(&self, id: TripId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM routes
             WHERE trip_uuid = ?1
                OR place_uuid IN (SELECT uuid FROM places WHERE trip_uuid = ?1);",
            [id_text.as_str()],
        )?;
        tx.execute("DELETE FROM places WHERE trip_uuid = ?1;", [id_text.as_str()])?;
        let changed = tx.execute("DELETE FROM trips WHERE uuid = ?1;", [id_text.as_str()])?;
        if changed == 0 {
            // Dropping `tx` rolls back the (empty) cascade.
            return Err(RepoError::TripNotFound(id));
        }

        tx.commit()?;
        Ok(())
    }

    fn place_date_bounds(&self, id: TripId) -> RepoResult<Option<(i64, i64)>> {
        let (earliest, latest): (Option<i64>, Option<i64>) = self.conn.query_row(
            "SELECT MIN(date), MAX(date) FROM places WHERE trip_uuid = ?1;",
            [id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(earliest.zip(latest))
    }
}

fn parse_trip_row(row: &Row<'_>) -> RepoResult<Trip> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = parse_uuid(&uuid_text, "trips.uuid")?;

    let trip = Trip {
        uuid,
        country: row.get("country")?,
        city: row.get("city")?,
        date_from: row.get("date_from")?,
        date_to: row.get("date_to")?,
        notes: row.get("notes")?,
    };
    trip.validate()
        .map_err(|err| RepoError::InvalidData(format!("trip {uuid}: {err}")))?;
    Ok(trip)
}
