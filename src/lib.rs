pub mod api;
pub mod config;
pub mod mcp;

pub use routedeck_core::{db, models, reconcile, tree, CardService, Database, Error, Result};
