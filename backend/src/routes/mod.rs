//! Router Module Index
//!
//! Splits the routes by access level. The split is what makes the guard
//! unskippable: everything in `dashboard` is wrapped by the route guard as a
//! whole, so a page cannot opt out of it.

/// Routes open to anyone: login, logout and session introspection.
pub mod public;

/// Routes under `/dashboard`, all behind the route guard.
pub mod dashboard;
