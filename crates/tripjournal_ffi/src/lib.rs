//! Flutter bridge surface for the trip journal core.

pub mod api;
