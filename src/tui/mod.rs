//! Terminal UI: Elm-style app loop, invoice view and the catalog item picker.

pub mod app;
pub mod events;
pub mod layout;
pub mod services;
pub mod theme;
pub mod views;
pub mod widgets;
