use std::collections::{BTreeMap, HashSet};

use rusqlite::Connection;

use super::{retain_changes, SyncReport};
use crate::db::validate_route_path;
use crate::error::{Error, Result};
use crate::models::{CreateRouteInput, MenuItem, Route, UpdateRouteInput};

/// Route name for a menu item: `{project}-{leaf}`, where the leaf is the last
/// segment after the project prefix, or `home` when there is none.
pub fn menu_route_name(project: &str, route_path: &str) -> String {
    let prefix = format!("/{project}");
    let rest = route_path
        .strip_prefix(prefix.as_str())
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .unwrap_or(route_path);
    let leaf = rest.split('/').filter(|s| !s.is_empty()).last().unwrap_or("home");
    format!("{project}-{leaf}")
}

/// Check every item before any child is written. Each path must be exactly one
/// segment below the project root.
fn validate_menu_items(project: &str, items: &[MenuItem]) -> Result<()> {
    let prefix = format!("/{project}/");
    let mut seen = HashSet::new();
    for item in items {
        if item.route_path.trim().is_empty() {
            return Err(Error::validation(format!(
                "Menu item \"{}\" is missing a route path",
                item.title
            )));
        }
        if !item.route_path.starts_with('/') {
            return Err(Error::validation(format!(
                "Menu item route path must start with /: {}",
                item.route_path
            )));
        }
        validate_route_path(&item.route_path)?;
        let leaf = item.route_path.strip_prefix(prefix.as_str()).unwrap_or_default();
        if leaf.is_empty() || leaf.contains('/') {
            return Err(Error::validation(format!(
                "Menu item route path must be a direct child of /{project}: {}",
                item.route_path
            )));
        }
        if !seen.insert(item.route_path.as_str()) {
            return Err(Error::validation(format!(
                "Duplicate menu item route path: {}",
                item.route_path
            )));
        }
    }
    Ok(())
}

/// Pick the current child an item refers to: by id while that id is still a
/// child of the root, otherwise by path.
fn take_match(remaining: &mut BTreeMap<i64, Route>, item: &MenuItem) -> Option<Route> {
    if let Some(id) = item.id {
        if let Some(route) = remaining.remove(&id) {
            return Some(route);
        }
        tracing::debug!(
            menu_item_id = id,
            path = %item.route_path,
            "Menu item id is not a current child, matching by path"
        );
    }
    let id = remaining
        .values()
        .find(|route| route.path == item.route_path)
        .map(|route| route.id)?;
    remaining.remove(&id)
}

fn item_patch(item: &MenuItem) -> UpdateRouteInput {
    UpdateRouteInput {
        title: Some(item.title.clone()),
        icon: item.icon.clone(),
        component: item.component.clone(),
        requires_auth: Some(item.requires_auth.unwrap_or(false)),
        show_in_menu: Some(item.show_in_menu.unwrap_or(true)),
        show_in_tabs: Some(item.show_in_tabs.unwrap_or(true)),
        order: item.order,
        ..Default::default()
    }
}

fn new_child(root: &Route, project: &str, owner_tag: &str, item: &MenuItem) -> CreateRouteInput {
    CreateRouteInput {
        path: item.route_path.clone(),
        name: Some(menu_route_name(project, &item.route_path)),
        project_id: Some(owner_tag.to_string()),
        parent_id: Some(root.id),
        title: Some(item.title.clone()),
        icon: item.icon.clone(),
        component: item.component.clone(),
        requires_auth: Some(item.requires_auth.unwrap_or(false)),
        show_in_menu: Some(item.show_in_menu.unwrap_or(true)),
        show_in_tabs: Some(item.show_in_tabs.unwrap_or(true)),
        order: item.order,
        ..Default::default()
    }
}

/// Converge the children of `root` to exactly `items`.
///
/// Matching children are updated in place (only when a field differs), unmatched
/// items become new children, and children no item claimed are deleted once every
/// item has been handled. Running it twice with the same input changes nothing
/// the second time.
pub fn sync_menu_items(
    conn: &Connection,
    root: &Route,
    project: &str,
    owner_tag: &str,
    items: &[MenuItem],
) -> Result<SyncReport> {
    validate_menu_items(project, items)?;

    let mut remaining: BTreeMap<i64, Route> = Route::list_children(conn, root.id)?
        .into_iter()
        .map(|route| (route.id, route))
        .collect();
    let mut report = SyncReport::default();

    for item in items {
        match take_match(&mut remaining, item) {
            Some(existing) => {
                let patch = retain_changes(&existing, item_patch(item));
                if patch.is_empty() {
                    continue;
                }
                Route::update(conn, existing.id, &patch)?;
                report.updated += 1;
                tracing::debug!(
                    route_id = existing.id,
                    path = %existing.path,
                    "Updated menu route"
                );
            }
            None => {
                let created = Route::create(conn, &new_child(root, project, owner_tag, item))?;
                report.created += 1;
                tracing::debug!(route_id = created.id, path = %created.path, "Created menu route");
            }
        }
    }

    for (id, stale) in remaining {
        report.deleted += Route::delete_subtree(conn, id)?;
        tracing::debug!(route_id = id, path = %stale.path, "Deleted menu route");
    }

    Ok(report)
}
