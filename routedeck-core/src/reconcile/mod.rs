//! Keeps the routes table in step with card edits.
//!
//! Every card owns at most one project root (`/{project}`) whose children mirror
//! the card's menu items. Routes carry no foreign key to cards: ownership is the
//! card's `route_id`/`route_path` pointer plus the `project_id` owner tag, and
//! this module is the only writer of routes reached through that pointer.

mod menu;
mod provision;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::validate_route_path;
use crate::error::{Error, Result};
use crate::models::{Card, CreateCardInput, MenuItem, Route, UpdateRouteInput};

pub use menu::{menu_route_name, sync_menu_items};
use provision::owned_by;
pub use provision::{
    ensure_project_root, provision_project, ProvisionedProject, DEFAULT_PROJECT_ICON,
    PROJECT_ROOT_ORDER,
};

/// The project a card path belongs to: `/blog` and `/blog/home` are both `blog`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPath {
    name: String,
}

impl ProjectPath {
    pub fn parse(path: &str) -> Result<Self> {
        validate_route_path(path)?;
        let name = path
            .split('/')
            .find(|segment| !segment.is_empty())
            .ok_or_else(|| Error::validation(format!("Route path \"{path}\" names no project")))?;
        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_path(&self) -> String {
        format!("/{}", self.name)
    }
}

/// What a card edit means for its routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTransition {
    /// No route before or after.
    Unrouted,
    /// First route for the card: provision the project and sync its menu.
    Attach(ProjectPath),
    /// Route removed: delete the old subtree and clear the card's pointer.
    Detach,
    /// Moved to another project: delete the old subtree, then attach.
    Cutover(ProjectPath),
    /// Same project, no menu supplied: only root metadata may change.
    Refresh(ProjectPath),
    /// Same project with a menu: sync root metadata and children.
    Resync(ProjectPath),
}

impl RouteTransition {
    /// Decide the transition from the card's stored root path and the requested path.
    pub fn plan(
        old_path: Option<&str>,
        new_path: Option<&str>,
        menu_specified: bool,
    ) -> Result<Self> {
        let new = new_path.map(ProjectPath::parse).transpose()?;
        let old = old_path.map(|path| ProjectPath::parse(path).ok());

        Ok(match (old, new) {
            (None, None) => Self::Unrouted,
            (None, Some(new)) => Self::Attach(new),
            (Some(_), None) => Self::Detach,
            (Some(Some(old)), Some(new)) if old == new => {
                if menu_specified {
                    Self::Resync(new)
                } else {
                    Self::Refresh(new)
                }
            }
            (Some(_), Some(new)) => Self::Cutover(new),
        })
    }
}

/// Route-relevant part of a card request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteRequest<'a> {
    pub title: Option<&'a str>,
    pub icon: Option<&'a str>,
    pub redirect: Option<&'a str>,
    pub requires_auth: Option<bool>,
    pub show_in_menu: Option<bool>,
    pub show_in_tabs: Option<bool>,
    pub order: Option<i64>,
    /// `None` leaves children alone; `Some(&[])` removes them all.
    pub menu_items: Option<&'a [MenuItem]>,
}

impl<'a> From<&'a CreateCardInput> for RouteRequest<'a> {
    fn from(input: &'a CreateCardInput) -> Self {
        Self {
            title: Some(input.title.as_str()),
            icon: input.icon.as_deref(),
            redirect: input.redirect.as_deref(),
            requires_auth: input.requires_auth,
            show_in_menu: input.show_in_menu,
            show_in_tabs: input.show_in_tabs,
            order: input.order,
            menu_items: input.menu_items.as_deref(),
        }
    }
}

impl RouteRequest<'_> {
    /// Root fields for a structural pass: absent flags fall back to their defaults.
    fn root_patch(&self) -> UpdateRouteInput {
        UpdateRouteInput {
            title: self.title.map(str::to_string),
            icon: Some(self.icon.unwrap_or(DEFAULT_PROJECT_ICON).to_string()),
            redirect: self.redirect.map(str::to_string),
            requires_auth: Some(self.requires_auth.unwrap_or(false)),
            show_in_menu: Some(self.show_in_menu.unwrap_or(true)),
            show_in_tabs: Some(self.show_in_tabs.unwrap_or(true)),
            order: self.order,
            ..Default::default()
        }
    }

    /// Root fields for a metadata-only pass: only what was supplied.
    fn provided_root_patch(&self) -> UpdateRouteInput {
        UpdateRouteInput {
            title: self.title.map(str::to_string),
            icon: self.icon.map(str::to_string),
            redirect: self.redirect.map(str::to_string),
            requires_auth: self.requires_auth,
            show_in_menu: self.show_in_menu,
            show_in_tabs: self.show_in_tabs,
            order: self.order,
            ..Default::default()
        }
    }
}

/// Route writes performed by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl SyncReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }

    fn absorb(&mut self, other: SyncReport) {
        self.created += other.created;
        self.updated += other.updated;
        self.deleted += other.deleted;
    }
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub transition: RouteTransition,
    /// The card's root after the pass, if it has one.
    pub root: Option<Route>,
    pub report: SyncReport,
}

/// Drop the fields of `patch` that already match `route`.
pub(crate) fn retain_changes(route: &Route, mut patch: UpdateRouteInput) -> UpdateRouteInput {
    fn drop_same_str(field: &mut Option<String>, current: Option<&str>) {
        if field.is_some() && field.as_deref() == current {
            *field = None;
        }
    }
    fn drop_same<T: PartialEq>(field: &mut Option<T>, current: T) {
        if field.as_ref() == Some(&current) {
            *field = None;
        }
    }

    drop_same_str(&mut patch.path, Some(route.path.as_str()));
    drop_same_str(&mut patch.name, route.name.as_deref());
    drop_same_str(&mut patch.component, route.component.as_deref());
    drop_same_str(&mut patch.redirect, route.redirect.as_deref());
    drop_same_str(&mut patch.project_id, route.project_id.as_deref());
    drop_same_str(&mut patch.title, route.title.as_deref());
    drop_same_str(&mut patch.icon, route.icon.as_deref());
    drop_same_str(&mut patch.permission, route.permission.as_deref());
    if patch.parent_id.is_some() && patch.parent_id == route.parent_id {
        patch.parent_id = None;
    }
    drop_same(&mut patch.requires_auth, route.requires_auth);
    drop_same(&mut patch.keep_alive, route.keep_alive);
    drop_same(&mut patch.show_in_menu, route.show_in_menu);
    drop_same(&mut patch.show_in_tabs, route.show_in_tabs);
    drop_same(&mut patch.order, route.order);
    patch
}

fn apply_root_patch(
    conn: &Connection,
    root: Route,
    patch: UpdateRouteInput,
) -> Result<(Route, bool)> {
    let patch = retain_changes(&root, patch);
    if patch.is_empty() {
        return Ok((root, false));
    }
    let id = root.id;
    let updated = Route::update(conn, id, &patch)?.ok_or(Error::NotFound { entity: "Route", id })?;
    Ok((updated, true))
}

/// The card's current root: by `route_id`, falling back to the stored path.
/// Roots tagged with another card's owner tag are never returned.
fn current_root(conn: &Connection, card: &Card) -> Result<Option<Route>> {
    let by_id = match card.route_id {
        Some(route_id) => Route::find_by_id(conn, route_id)?,
        None => None,
    };
    let root = match (by_id, card.route_path.as_deref()) {
        (Some(root), _) => Some(root),
        (None, Some(path)) => Route::find_by_path(conn, path)?,
        (None, None) => None,
    };
    Ok(root.filter(|root| root.is_root() && owned_by(root, &card.owner_tag())))
}

/// Delete the card's whole route subtree. Returns the number of routes removed.
pub fn remove_card_routes(conn: &Connection, card: &Card) -> Result<usize> {
    let Some(root) = current_root(conn, card)? else {
        return Ok(0);
    };
    let removed = Route::delete_subtree(conn, root.id)?;
    tracing::info!(card_id = card.id, root = %root.path, removed, "Removed card routes");
    Ok(removed)
}

fn attach(
    conn: &Connection,
    card: &Card,
    project: &ProjectPath,
    request: &RouteRequest<'_>,
    report: &mut SyncReport,
) -> Result<Route> {
    let owner = card.owner_tag();
    let provisioned = provision_project(conn, project.name(), &owner)?;
    report.created += provisioned.created.len();

    let root = provisioned.root;
    Card::set_route(conn, card.id, Some((root.id, root.path.as_str())))?;
    sync_structure(conn, root, project, &owner, request, report)
}

fn sync_structure(
    conn: &Connection,
    root: Route,
    project: &ProjectPath,
    owner: &str,
    request: &RouteRequest<'_>,
    report: &mut SyncReport,
) -> Result<Route> {
    let (root, changed) = apply_root_patch(conn, root, request.root_patch())?;
    if changed {
        report.updated += 1;
    }
    if let Some(items) = request.menu_items {
        report.absorb(sync_menu_items(conn, &root, project.name(), owner, items)?);
    }
    Ok(root)
}

/// The card's root for a same-project pass, repairing the card's pointer if it drifted.
fn existing_root(conn: &Connection, card: &Card) -> Result<Option<Route>> {
    let Some(root) = current_root(conn, card)? else {
        return Ok(None);
    };
    if card.route_id != Some(root.id) || card.route_path.as_deref() != Some(root.path.as_str()) {
        Card::set_route(conn, card.id, Some((root.id, root.path.as_str())))?;
    }
    Ok(Some(root))
}

fn reattach(
    conn: &Connection,
    card: &Card,
    project: &ProjectPath,
    request: &RouteRequest<'_>,
    report: &mut SyncReport,
) -> Result<Route> {
    tracing::warn!(
        card_id = card.id,
        project = project.name(),
        "Card root route is missing, provisioning it again"
    );
    attach(conn, card, project, request, report)
}

/// Converge the routes of `card` (as currently stored) to `new_path` and `request`.
///
/// Writes go through `conn` one statement at a time; callers that need the pass
/// to be atomic run it inside a transaction.
pub fn reconcile_card(
    conn: &Connection,
    card: &Card,
    new_path: Option<&str>,
    request: &RouteRequest<'_>,
) -> Result<Reconciliation> {
    let transition = RouteTransition::plan(
        card.route_path.as_deref(),
        new_path,
        request.menu_items.is_some(),
    )?;
    let mut report = SyncReport::default();

    let root = match &transition {
        RouteTransition::Unrouted => None,
        RouteTransition::Attach(project) => {
            Some(attach(conn, card, project, request, &mut report)?)
        }
        RouteTransition::Detach => {
            report.deleted += remove_card_routes(conn, card)?;
            Card::set_route(conn, card.id, None)?;
            None
        }
        RouteTransition::Cutover(project) => {
            report.deleted += remove_card_routes(conn, card)?;
            Some(attach(conn, card, project, request, &mut report)?)
        }
        RouteTransition::Refresh(project) => match existing_root(conn, card)? {
            Some(root) => {
                let (root, changed) = apply_root_patch(conn, root, request.provided_root_patch())?;
                if changed {
                    report.updated += 1;
                }
                Some(root)
            }
            None => Some(reattach(conn, card, project, request, &mut report)?),
        },
        RouteTransition::Resync(project) => match existing_root(conn, card)? {
            Some(root) => {
                let owner = card.owner_tag();
                Some(sync_structure(conn, root, project, &owner, request, &mut report)?)
            }
            None => Some(reattach(conn, card, project, request, &mut report)?),
        },
    };

    tracing::info!(
        card_id = card.id,
        transition = ?transition,
        created = report.created,
        updated = report.updated,
        deleted = report.deleted,
        "Reconciled card routes"
    );

    Ok(Reconciliation {
        transition,
        root,
        report,
    })
}
