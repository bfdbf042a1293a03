use std::collections::HashSet;

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{now_timestamp, parse_timestamp, Database};
use crate::error::{Error, Result};
use crate::models::{CreateRouteInput, Route, RouteNode, UpdateRouteInput};
use crate::reconcile::{self, ProvisionedProject};
use crate::tree::build_nested;

const ROUTE_COLUMNS: &str = r#"id, path, name, component, redirect, parent_id, project_id,
    title, icon, requires_auth, permission, keep_alive, show_in_menu, show_in_tabs, "order",
    created_at, updated_at"#;

/// Reject paths that do not start with `/` or that contain `//`.
pub fn validate_route_path(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(Error::validation(format!(
            "Route path \"{path}\" must start with a slash"
        )));
    }
    if path.contains("//") {
        return Err(Error::validation(format!(
            "Route path \"{path}\" contains duplicate slashes"
        )));
    }
    Ok(())
}

fn path_taken(path: &str) -> Error {
    Error::conflict(format!("Route with path \"{path}\" already exists"))
}

fn map_unique_violation(err: rusqlite::Error, path: &str) -> Error {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = err {
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
            return path_taken(path);
        }
    }
    err.into()
}

impl Route {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let created_at: String = row.get(15)?;
        let updated_at: String = row.get(16)?;
        Ok(Self {
            id: row.get(0)?,
            path: row.get(1)?,
            name: row.get(2)?,
            component: row.get(3)?,
            redirect: row.get(4)?,
            parent_id: row.get(5)?,
            project_id: row.get(6)?,
            title: row.get(7)?,
            icon: row.get(8)?,
            requires_auth: row.get(9)?,
            permission: row.get(10)?,
            keep_alive: row.get(11)?,
            show_in_menu: row.get(12)?,
            show_in_tabs: row.get(13)?,
            order: row.get(14)?,
            created_at: parse_timestamp(15, &created_at)?,
            updated_at: parse_timestamp(16, &updated_at)?,
        })
    }

    fn query(conn: &Connection, filter: &str, args: impl rusqlite::Params) -> Result<Vec<Self>> {
        let sql = format!("SELECT {ROUTE_COLUMNS} FROM routes {filter}");
        let mut stmt = conn.prepare(&sql)?;
        let routes = stmt
            .query_map(args, Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(routes)
    }

    pub fn list_all(conn: &Connection) -> Result<Vec<Self>> {
        Self::query(conn, "ORDER BY id", [])
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let sql = format!("SELECT {ROUTE_COLUMNS} FROM routes WHERE id = ?1");
        Ok(conn
            .query_row(&sql, params![id], Self::from_row)
            .optional()?)
    }

    pub fn find_by_path(conn: &Connection, path: &str) -> Result<Option<Self>> {
        let sql = format!("SELECT {ROUTE_COLUMNS} FROM routes WHERE path = ?1");
        Ok(conn
            .query_row(&sql, params![path], Self::from_row)
            .optional()?)
    }

    /// Direct children, in menu order.
    pub fn list_children(conn: &Connection, parent_id: i64) -> Result<Vec<Self>> {
        Self::query(
            conn,
            r#"WHERE parent_id = ?1 ORDER BY "order", created_at, id"#,
            params![parent_id],
        )
    }

    pub fn list_by_project(conn: &Connection, project_id: &str) -> Result<Vec<Self>> {
        Self::query(conn, "WHERE project_id = ?1 ORDER BY id", params![project_id])
    }

    pub fn create(conn: &Connection, input: &CreateRouteInput) -> Result<Self> {
        if input.path.is_empty() {
            return Err(Error::validation("Path is required"));
        }
        validate_route_path(&input.path)?;
        if Self::find_by_path(conn, &input.path)?.is_some() {
            return Err(path_taken(&input.path));
        }
        if let Some(parent_id) = input.parent_id {
            if Self::find_by_id(conn, parent_id)?.is_none() {
                return Err(Error::validation(format!(
                    "Parent route with id {parent_id} does not exist"
                )));
            }
        }

        let now = now_timestamp();
        conn.execute(
            r#"INSERT INTO routes (
                path, name, component, redirect, parent_id, project_id, title, icon,
                requires_auth, permission, keep_alive, show_in_menu, show_in_tabs, "order",
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)"#,
            params![
                input.path,
                input.name,
                input.component,
                input.redirect,
                input.parent_id,
                input.project_id,
                input.title,
                input.icon,
                input.requires_auth.unwrap_or(false),
                input.permission,
                input.keep_alive.unwrap_or(false),
                input.show_in_menu.unwrap_or(true),
                input.show_in_tabs.unwrap_or(true),
                input.order.unwrap_or(0),
                now,
            ],
        )
        .map_err(|e| map_unique_violation(e, &input.path))?;

        let id = conn.last_insert_rowid();
        Self::find_by_id(conn, id)?.ok_or(Error::NotFound {
            entity: "Route",
            id,
        })
    }

    /// Overwrite the fields present in `input`. Returns `None` if the route does not exist.
    pub fn update(conn: &Connection, id: i64, input: &UpdateRouteInput) -> Result<Option<Self>> {
        if let Some(path) = &input.path {
            validate_route_path(path)?;
            if let Some(existing) = Self::find_by_path(conn, path)? {
                if existing.id != id {
                    return Err(path_taken(path));
                }
            }
        }
        if let Some(parent_id) = input.parent_id {
            if parent_id == id {
                return Err(Error::validation(format!(
                    "Route {id} cannot be its own parent"
                )));
            }
            if Self::find_by_id(conn, parent_id)?.is_none() {
                return Err(Error::validation(format!(
                    "Parent route with id {parent_id} does not exist"
                )));
            }
        }

        let changed = conn
            .execute(
                r#"UPDATE routes SET
                    path = COALESCE(?1, path),
                    name = COALESCE(?2, name),
                    component = COALESCE(?3, component),
                    redirect = COALESCE(?4, redirect),
                    parent_id = COALESCE(?5, parent_id),
                    project_id = COALESCE(?6, project_id),
                    title = COALESCE(?7, title),
                    icon = COALESCE(?8, icon),
                    requires_auth = COALESCE(?9, requires_auth),
                    permission = COALESCE(?10, permission),
                    keep_alive = COALESCE(?11, keep_alive),
                    show_in_menu = COALESCE(?12, show_in_menu),
                    show_in_tabs = COALESCE(?13, show_in_tabs),
                    "order" = COALESCE(?14, "order"),
                    updated_at = ?15
                WHERE id = ?16"#,
                params![
                    input.path,
                    input.name,
                    input.component,
                    input.redirect,
                    input.parent_id,
                    input.project_id,
                    input.title,
                    input.icon,
                    input.requires_auth,
                    input.permission,
                    input.keep_alive,
                    input.show_in_menu,
                    input.show_in_tabs,
                    input.order,
                    now_timestamp(),
                    id,
                ],
            )
            .map_err(|e| map_unique_violation(e, input.path.as_deref().unwrap_or_default()))?;

        if changed == 0 {
            return Ok(None);
        }
        Self::find_by_id(conn, id)
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute("DELETE FROM routes WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Delete a route and all of its descendants, deepest first.
    ///
    /// Returns the number of routes removed (0 if `id` does not exist).
    pub fn delete_subtree(conn: &Connection, id: i64) -> Result<usize> {
        let mut visit_order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            visit_order.push(current);
            let mut stmt = conn.prepare_cached("SELECT id FROM routes WHERE parent_id = ?1")?;
            let children = stmt
                .query_map(params![current], |row| row.get::<_, i64>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            stack.extend(children);
        }

        // Every descendant appears after its parent in pre-order, so reversing
        // deletes children first.
        let mut removed = 0;
        for route_id in visit_order.into_iter().rev() {
            if Self::delete(conn, route_id)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl Database {
    pub fn get_all_routes(&self) -> Result<Vec<Route>> {
        self.with_connection(Route::list_all)
    }

    pub fn get_route(&self, id: i64) -> Result<Option<Route>> {
        self.with_connection(|conn| Route::find_by_id(conn, id))
    }

    pub fn get_route_by_path(&self, path: &str) -> Result<Option<Route>> {
        self.with_connection(|conn| Route::find_by_path(conn, path))
    }

    pub fn get_child_routes(&self, parent_id: i64) -> Result<Vec<Route>> {
        self.with_connection(|conn| Route::list_children(conn, parent_id))
    }

    pub fn get_routes_by_project(&self, project_id: &str) -> Result<Vec<Route>> {
        self.with_connection(|conn| Route::list_by_project(conn, project_id))
    }

    /// All routes as a tree of roots, siblings ordered by `(order, created_at)`.
    pub fn get_routes_nested(&self) -> Result<Vec<RouteNode>> {
        Ok(build_nested(&self.get_all_routes()?))
    }

    pub fn create_route(&self, input: &CreateRouteInput) -> Result<Route> {
        self.with_connection(|conn| Route::create(conn, input))
    }

    pub fn update_route(&self, id: i64, input: &UpdateRouteInput) -> Result<Option<Route>> {
        self.with_connection(|conn| Route::update(conn, id, input))
    }

    /// Delete a single route. Fails with a store error while it still has children.
    pub fn delete_route(&self, id: i64) -> Result<bool> {
        self.with_connection(|conn| Route::delete(conn, id))
    }

    pub fn delete_route_tree(&self, id: i64) -> Result<usize> {
        self.transaction(|conn| {
            let removed = Route::delete_subtree(conn, id)?;
            if removed > 0 {
                tracing::info!(route_id = id, removed, "Deleted route subtree");
            }
            Ok(removed)
        })
    }

    /// Ensure `/{project_name}` and its default children exist, owned by `card_id`.
    pub fn provision_project(
        &self,
        project_name: &str,
        card_id: i64,
    ) -> Result<ProvisionedProject> {
        self.transaction(|conn| {
            reconcile::provision_project(conn, project_name, &card_id.to_string())
        })
    }
}
