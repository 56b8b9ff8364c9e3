//! Integration test suite for elements-core.
//!
//! End-to-end scenarios across module boundaries:
//! - **editing_session**: resolver + composition over a shared catalog,
//!   including preference payload round trips
//! - **exchange_round_trip**: XML and ZIP bundle export/import against
//!   fresh and populated catalogs

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod editing_session;
mod exchange_round_trip;
