use std::path::PathBuf;

use anyhow::Context;

use crate::db::Database;

pub const DEFAULT_PORT: u16 = 3000;

/// Runtime settings, resolved from CLI flags, then `ROUTEDECK_*` env vars, then defaults.
///
/// | Flag     | Env var           | Default                               |
/// |----------|-------------------|---------------------------------------|
/// | `--db`   | `ROUTEDECK_DB`    | `<platform data dir>/routedeck.db`    |
/// | `--port` | `ROUTEDECK_PORT`  | `3000`                                |
/// | `--seed` | `ROUTEDECK_SEED`  | `true`                                |
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub port: u16,
    /// Insert the base routes on startup when the routes table is empty.
    pub seed: bool,
}

impl Config {
    pub fn resolve(db_path: Option<PathBuf>, port: u16, seed: bool) -> anyhow::Result<Self> {
        let db_path = match db_path {
            Some(path) => path,
            None => Database::default_path()
                .context("could not resolve a data directory; pass --db or set ROUTEDECK_DB")?,
        };
        Ok(Self {
            db_path,
            port,
            seed,
        })
    }

    /// Open and migrate the database, seeding base routes if enabled.
    ///
    /// A failed seed is logged and does not stop startup.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db = Database::open(&self.db_path)
            .with_context(|| format!("failed to open database at {}", self.db_path.display()))?;
        db.migrate()?;

        if self.seed {
            if let Err(e) = db.seed_base_routes() {
                tracing::warn!(error = %e, "Failed to seed base routes");
            }
        }

        Ok(db)
    }
}
