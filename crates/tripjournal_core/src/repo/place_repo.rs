//! Place/route repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist places together with their companion routes.
//! - Own the place delete cascade over `routes`.
//!
//! # Invariants
//! - `create_place` inserts the place and its route in one transaction.
//! - `delete_place` removes the place and its route in one transaction.
//! - `set_transport_type` touches only `routes.transport_type`.
//! - Place lists are ordered by `date ASC, uuid ASC`.

use crate::model::place::{Place, PlaceId};
use crate::model::route::{Route, RouteId, TransportType};
use crate::model::trip::TripId;
use crate::repo::schema_guard::{
    ensure_connection_ready, parse_uuid, PLACES_TABLE, ROUTES_TABLE, TRIPS_TABLE,
};
use crate::repo::trip_repo::{RepoError, RepoResult};
use crate::validation::validate_place_name;
use rusqlite::{params, Connection, OptionalExtension, Row};

const PLACE_WITH_ROUTE_SELECT_SQL: &str = "SELECT
    p.uuid AS place_uuid,
    p.trip_uuid AS place_trip_uuid,
    p.name AS name,
    p.date AS date,
    r.uuid AS route_uuid,
    r.trip_uuid AS route_trip_uuid,
    r.transport_type AS transport_type,
    r.priority AS priority
FROM places p
LEFT JOIN routes r ON r.place_uuid = p.uuid";

const ROUTE_SELECT_SQL: &str = "SELECT
    uuid,
    trip_uuid,
    place_uuid,
    transport_type,
    priority
FROM routes";

/// Read model pairing a place with its route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceWithRoute {
    pub place: Place,
    pub route: Route,
}

/// Repository interface for place and route persistence.
pub trait PlaceRepository {
    /// Inserts a place and its route as one unit.
    fn create_place(&self, place: &Place, route: &Route) -> RepoResult<()>;
    /// Overwrites place name and date. The route is left untouched.
    fn update_place(&self, place: &Place) -> RepoResult<()>;
    fn get_place(&self, id: PlaceId) -> RepoResult<Option<PlaceWithRoute>>;
    fn list_places(&self, trip_uuid: TripId) -> RepoResult<Vec<PlaceWithRoute>>;
    /// Deletes a place together with its route.
    fn delete_place(&self, id: PlaceId) -> RepoResult<()>;
    fn get_route(&self, id: RouteId) -> RepoResult<Option<Route>>;
    fn set_transport_type(
        &self,
        id: RouteId,
        transport_type: Option<TransportType>,
    ) -> RepoResult<()>;
    /// Loads `(date_from, date_to)` of a trip, if it exists.
    fn trip_date_range(&self, trip_uuid: TripId) -> RepoResult<Option<(i64, i64)>>;
}

/// SQLite-backed place/route repository.
pub struct SqlitePlaceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePlaceRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[TRIPS_TABLE, PLACES_TABLE, ROUTES_TABLE])?;
        Ok(Self { conn })
    }
}

impl PlaceRepository for SqlitePlaceRepository<'_> {
    fn create_place(&self, place: &Place, route: &Route) -> RepoResult<()> {
        validate_place_name(&place.name)?;
        if route.place_uuid != place.uuid || route.trip_uuid != place.trip_uuid {
            return Err(RepoError::InvalidData(format!(
                "route {} does not belong to place {}",
                route.uuid, place.uuid
            )));
        }

        let trip_text = place.trip_uuid.to_string();
        let tx = self.conn.unchecked_transaction()?;
        let trip_exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM trips WHERE uuid = ?1);",
            [trip_text.as_str()],
            |row| row.get(0),
        )?;
        if trip_exists != 1 {
            return Err(RepoError::TripNotFound(place.trip_uuid));
        }

        tx.execute(
            "INSERT INTO places (uuid, trip_uuid, name, date) VALUES (?1, ?2, ?3, ?4);",
            params![
                place.uuid.to_string(),
                trip_text.as_str(),
                place.name.as_str(),
                place.date,
            ],
        )?;
        tx.execute(
            "INSERT INTO routes (uuid, trip_uuid, place_uuid, transport_type, priority)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                route.uuid.to_string(),
                trip_text.as_str(),
                place.uuid.to_string(),
                route.transport_type.map(TransportType::as_str),
                route.priority,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn update_place(&self, place: &Place) -> RepoResult<()> {
        validate_place_name(&place.name)?;

        let changed = self.conn.execute(
            "UPDATE places
             SET
                name = ?1,
                date = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?3;",
            params![place.name.as_str(), place.date, place.uuid.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::PlaceNotFound(place.uuid));
        }

        Ok(())
    }

    fn get_place(&self, id: PlaceId) -> RepoResult<Option<PlaceWithRoute>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PLACE_WITH_ROUTE_SELECT_SQL} WHERE p.uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_place_with_route_row(row)?));
        }

        Ok(None)
    }

    fn list_places(&self, trip_uuid: TripId) -> RepoResult<Vec<PlaceWithRoute>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PLACE_WITH_ROUTE_SELECT_SQL}
             WHERE p.trip_uuid = ?1
             ORDER BY p.date ASC, p.uuid ASC;"
        ))?;

        let mut rows = stmt.query([trip_uuid.to_string()])?;
        let mut places = Vec::new();
        while let Some(row) = rows.next()? {
            places.push(parse_place_with_route_row(row)?);
        }

        Ok(places)
    }

    fn delete_place(&self, id: PlaceId) -> RepoResult<()> {
        let id_text = id.to_string();
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM routes WHERE place_uuid = ?1;", [id_text.as_str()])?;
        let changed = tx.execute("DELETE FROM places WHERE uuid = ?1;", [id_text.as_str()])?;
        if changed == 0 {
            return Err(RepoError::PlaceNotFound(id));
        }

        tx.commit()?;
        Ok(())
    }

    fn get_route(&self, id: RouteId) -> RepoResult<Option<Route>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ROUTE_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_route_row(row)?));
        }

        Ok(None)
    }

    fn set_transport_type(
        &self,
        id: RouteId,
        transport_type: Option<TransportType>,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE routes
             SET
                transport_type = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![transport_type.map(TransportType::as_str), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::RouteNotFound(id));
        }

        Ok(())
    }

    fn trip_date_range(&self, trip_uuid: TripId) -> RepoResult<Option<(i64, i64)>> {
        let range = self
            .conn
            .query_row(
                "SELECT date_from, date_to FROM trips WHERE uuid = ?1;",
                [trip_uuid.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(range)
    }
}

fn parse_place_with_route_row(row: &Row<'_>) -> RepoResult<PlaceWithRoute> {
    let place_text: String = row.get("place_uuid")?;
    let place_uuid = parse_uuid(&place_text, "places.uuid")?;
    let trip_text: String = row.get("place_trip_uuid")?;
    let trip_uuid = parse_uuid(&trip_text, "places.trip_uuid")?;

    let place = Place {
        uuid: place_uuid,
        trip_uuid,
        name: row.get("name")?,
        date: row.get("date")?,
    };
    validate_place_name(&place.name)
        .map_err(|err| RepoError::InvalidData(format!("place {place_uuid}: {err}")))?;

    let route_text: Option<String> = row.get("route_uuid")?;
    let Some(route_text) = route_text else {
        return Err(RepoError::InvalidData(format!("place {place_uuid} has no route")));
    };
    let route_trip_text: String = row.get("route_trip_uuid")?;
    let route = Route {
        uuid: parse_uuid(&route_text, "routes.uuid")?,
        trip_uuid: parse_uuid(&route_trip_text, "routes.trip_uuid")?,
        place_uuid,
        transport_type: parse_transport_column(row.get("transport_type")?)?,
        priority: row.get("priority")?,
    };

    Ok(PlaceWithRoute { place, route })
}

fn parse_route_row(row: &Row<'_>) -> RepoResult<Route> {
    let uuid_text: String = row.get("uuid")?;
    let trip_text: String = row.get("trip_uuid")?;
    let place_text: String = row.get("place_uuid")?;

    Ok(Route {
        uuid: parse_uuid(&uuid_text, "routes.uuid")?,
        trip_uuid: parse_uuid(&trip_text, "routes.trip_uuid")?,
        place_uuid: parse_uuid(&place_text, "routes.place_uuid")?,
        transport_type: parse_transport_column(row.get("transport_type")?)?,
        priority: row.get("priority")?,
    })
}

fn parse_transport_column(value: Option<String>) -> RepoResult<Option<TransportType>> {
    match value {
        Some(text) => TransportType::parse(&text).map(Some).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid transport type `{text}` in routes.transport_type"
            ))
        }),
        None => Ok(None),
    }
}
