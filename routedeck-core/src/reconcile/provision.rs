use rusqlite::Connection;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::{CreateRouteInput, Route, UpdateRouteInput};

pub const DEFAULT_PROJECT_ICON: &str = "i-carbon-folder";

/// Order given to freshly provisioned project roots so they sort after the built-in menus.
pub const PROJECT_ROOT_ORDER: i64 = 999;

struct DefaultChild {
    leaf: &'static str,
    title: &'static str,
    icon: &'static str,
    order: i64,
}

const DEFAULT_CHILDREN: &[DefaultChild] = &[
    DefaultChild {
        leaf: "home",
        title: "Home",
        icon: "i-carbon-home",
        order: 1,
    },
    DefaultChild {
        leaf: "settings",
        title: "Settings",
        icon: "i-carbon-settings",
        order: 99,
    },
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionedProject {
    pub root: Route,
    /// False when the root already existed.
    pub root_created: bool,
    /// Every route created by this call, root first.
    pub created: Vec<Route>,
}

fn validate_project_name(project: &str) -> Result<()> {
    if project.is_empty() || project.contains('/') {
        return Err(Error::validation(format!(
            "Project name \"{project}\" must be a single path segment"
        )));
    }
    Ok(())
}

/// Untagged routes may be adopted; tagged ones only by their owner.
pub(crate) fn owned_by(route: &Route, owner_tag: &str) -> bool {
    route.project_id.as_deref().map_or(true, |owner| owner == owner_tag)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn ensure_root(conn: &Connection, project: &str, owner_tag: &str) -> Result<(Route, bool)> {
    validate_project_name(project)?;
    let path = format!("/{project}");
    if let Some(existing) = Route::find_by_path(conn, &path)? {
        if !existing.is_root() {
            return Err(Error::conflict(format!(
                "Route {path} is a child route and cannot be a project root"
            )));
        }
        if !owned_by(&existing, owner_tag) {
            return Err(Error::conflict(format!(
                "Project root {path} belongs to another card"
            )));
        }
        if existing.project_id.is_none() {
            let id = existing.id;
            let claim = UpdateRouteInput {
                project_id: Some(owner_tag.to_string()),
                ..Default::default()
            };
            let claimed =
                Route::update(conn, id, &claim)?.ok_or(Error::NotFound { entity: "Route", id })?;
            tracing::info!(
                project,
                route_id = id,
                owner = owner_tag,
                "Adopted untagged project root"
            );
            return Ok((claimed, false));
        }
        return Ok((existing, false));
    }

    let root = Route::create(
        conn,
        &CreateRouteInput {
            path,
            name: Some(project.to_string()),
            project_id: Some(owner_tag.to_string()),
            title: Some(capitalize(project)),
            icon: Some(DEFAULT_PROJECT_ICON.to_string()),
            requires_auth: Some(true),
            show_in_menu: Some(true),
            show_in_tabs: Some(true),
            order: Some(PROJECT_ROOT_ORDER),
            redirect: Some(format!("/{project}/home")),
            ..Default::default()
        },
    )?;
    tracing::info!(project, route_id = root.id, owner = owner_tag, "Created project root route");
    Ok((root, true))
}

/// Return the root route `/{project}`, creating it if it does not exist yet.
///
/// Fails with `Conflict` when `/{project}` is a child route or is tagged with a
/// different owner. An untagged root is claimed for `owner_tag`.
pub fn ensure_project_root(conn: &Connection, project: &str, owner_tag: &str) -> Result<Route> {
    ensure_root(conn, project, owner_tag).map(|(root, _)| root)
}

/// Ensure the project root exists. When this call creates it, also create the
/// default `home` and `settings` children unless those paths are already taken.
pub fn provision_project(
    conn: &Connection,
    project: &str,
    owner_tag: &str,
) -> Result<ProvisionedProject> {
    let (root, root_created) = ensure_root(conn, project, owner_tag)?;
    let mut created = Vec::new();

    if root_created {
        created.push(root.clone());
        for child in DEFAULT_CHILDREN {
            let path = format!("/{project}/{}", child.leaf);
            if Route::find_by_path(conn, &path)?.is_some() {
                continue;
            }
            created.push(Route::create(
                conn,
                &CreateRouteInput {
                    path,
                    name: Some(format!("{project}-{}", child.leaf)),
                    project_id: Some(owner_tag.to_string()),
                    title: Some(child.title.to_string()),
                    icon: Some(child.icon.to_string()),
                    parent_id: Some(root.id),
                    requires_auth: Some(true),
                    show_in_menu: Some(true),
                    show_in_tabs: Some(true),
                    order: Some(child.order),
                    ..Default::default()
                },
            )?);
        }
    }

    Ok(ProvisionedProject {
        root,
        root_created,
        created,
    })
}
