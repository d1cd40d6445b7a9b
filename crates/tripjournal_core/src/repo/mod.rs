//! Persistence gateway: repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for trips, places and
//!   routes.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every mutating call is one transaction; callers never observe a
//!   half-applied write.
//! - Cascades (trip -> places -> routes, place -> route) are explicit SQL
//!   here, never left to storage rules.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod place_repo;
mod schema_guard;
pub mod trip_repo;
