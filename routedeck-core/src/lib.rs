//! Core library for RouteDeck.
//!
//! This crate provides the domain models, the SQLite store and the card route
//! reconciliation engine, independent of any transport layer (HTTP, MCP, etc.).
//!
//! # Usage
//!
//! ```no_run
//! use routedeck_core::db::Database;
//! use routedeck_core::models::*;
//! use routedeck_core::CardService;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let cards = CardService::new(db.clone());
//! let card = cards.create(CreateCardInput {
//!     title: "Blog".into(),
//!     route_path: Some("/blog".into()),
//!     ..Default::default()
//! })?;
//!
//! let tree = db.get_routes_nested()?;
//! # Ok::<(), routedeck_core::Error>(())
//! ```

pub mod cards;
pub mod db;
pub mod error;
pub mod models;
pub mod reconcile;
pub mod tree;

// Re-export commonly used types at crate root
pub use cards::CardService;
pub use db::Database;
pub use error::{Error, Result};
