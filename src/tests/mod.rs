//! Crate-internal test suites.
//!
//! Property tests live under `property`, provider tests that need an HTTP
//! mock server live under `unit`.

mod property;
mod unit;
