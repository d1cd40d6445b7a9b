//! Connection readiness checks shared by repository constructors.

use crate::db::migrations::latest_version;
use crate::repo::trip_repo::{RepoError, RepoResult};
use rusqlite::Connection;
use uuid::Uuid;

/// Required table/column layout checked before a repository is handed out.
pub(crate) type TableSpec = (&'static str, &'static [&'static str]);

pub(crate) const TRIPS_TABLE: TableSpec = (
    "trips",
    &[
        "uuid",
        "country",
        "city",
        "date_from",
        "date_to",
        "notes",
        "created_at",
        "updated_at",
    ],
);

pub(crate) const PLACES_TABLE: TableSpec =
    ("places", &["uuid", "trip_uuid", "name", "date", "updated_at"]);

pub(crate) const ROUTES_TABLE: TableSpec = (
    "routes",
    &[
        "uuid",
        "trip_uuid",
        "place_uuid",
        "transport_type",
        "priority",
        "updated_at",
    ],
);

pub(crate) fn ensure_connection_ready(conn: &Connection, tables: &[TableSpec]) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
