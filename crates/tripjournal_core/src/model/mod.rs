//! Trip journal domain model.
//!
//! # Responsibility
//! - Define the Trip / Place / Route records shared by services, storage and
//!   the FFI boundary.
//!
//! # Invariants
//! - Every record is identified by a stable, non-nil UUID.
//! - A Place always belongs to exactly one Trip.
//! - A Route always belongs to exactly one Place and that Place's Trip.

pub mod place;
pub mod route;
pub mod trip;

/// Milliseconds in one UTC calendar day.
pub const MS_PER_DAY: i64 = 86_400_000;
