//! Invoicer - invoice builder with a searchable catalog item picker.
//!
//! Core library providing the catalog model, filter engine, catalog cache,
//! backend providers and the terminal UI that hosts the item picker.

pub mod config;
pub mod core;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
