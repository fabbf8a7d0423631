//! Data-driven loading for the brewing engine.
//!
//! A data directory holds a required `catalog` file, an optional `settings`
//! file and any number of recipe documents under `recipes/`. Each may be
//! RON, TOML or JSON; the format is picked from the extension.

pub mod loader;
pub mod schema;

pub use loader::{BrewData, DataLoadError, LoadReport, load_brew_data};
