use super::Database;
use crate::error::Result;
use crate::models::{CreateRouteInput, Route};

/// Routes every install starts with. Project routes are added as cards are created.
pub const BASE_ROUTES: &[BaseRoute] = &[
    BaseRoute {
        path: "/",
        name: "main",
        title: "Main",
        icon: "i-carbon-home",
        requires_auth: false,
        show_in_tabs: true,
        order: 999,
        redirect: Some("/main/project-management"),
        parent: None,
    },
    BaseRoute {
        path: "/main/project-management",
        name: "project-management",
        title: "Projects",
        icon: "i-carbon-grid",
        requires_auth: true,
        show_in_tabs: false,
        order: 1,
        redirect: None,
        parent: Some("/"),
    },
];

#[derive(Debug, Clone, Copy)]
pub struct BaseRoute {
    pub path: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    pub requires_auth: bool,
    pub show_in_tabs: bool,
    pub order: i64,
    pub redirect: Option<&'static str>,
    /// Path of the parent, which must appear earlier in [`BASE_ROUTES`].
    pub parent: Option<&'static str>,
}

impl Database {
    /// Insert [`BASE_ROUTES`] if the routes table is empty. Returns how many were created.
    pub fn seed_base_routes(&self) -> Result<usize> {
        self.transaction(|conn| {
            let existing: i64 =
                conn.query_row("SELECT COUNT(*) FROM routes", [], |row| row.get(0))?;
            if existing > 0 {
                return Ok(0);
            }

            for base in BASE_ROUTES {
                let parent_id = match base.parent {
                    Some(parent_path) => Route::find_by_path(conn, parent_path)?.map(|r| r.id),
                    None => None,
                };
                Route::create(
                    conn,
                    &CreateRouteInput {
                        path: base.path.to_string(),
                        name: Some(base.name.to_string()),
                        title: Some(base.title.to_string()),
                        icon: Some(base.icon.to_string()),
                        redirect: base.redirect.map(str::to_string),
                        parent_id,
                        requires_auth: Some(base.requires_auth),
                        show_in_menu: Some(true),
                        show_in_tabs: Some(base.show_in_tabs),
                        order: Some(base.order),
                        ..Default::default()
                    },
                )?;
            }

            tracing::info!(count = BASE_ROUTES.len(), "Seeded base routes");
            Ok(BASE_ROUTES.len())
        })
    }
}
