//! Flat route table to nested tree.

use std::collections::HashMap;

use crate::models::{Route, RouteNode};

/// Sibling order used everywhere menus are rendered: explicit `order`, then
/// creation time, then id so equal timestamps still sort deterministically.
pub fn menu_order(a: &Route, b: &Route) -> std::cmp::Ordering {
    a.order
        .cmp(&b.order)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Build the route forest from a flat list without mutating it.
///
/// Routes whose parent is absent from `routes` are unreachable from any root
/// and are left out.
pub fn build_nested(routes: &[Route]) -> Vec<RouteNode> {
    let mut by_parent: HashMap<Option<i64>, Vec<&Route>> = HashMap::new();
    for route in routes {
        by_parent.entry(route.parent_id).or_default().push(route);
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by(|a, b| menu_order(a, b));
    }

    attach_children(&by_parent, None)
}

fn attach_children(
    by_parent: &HashMap<Option<i64>, Vec<&Route>>,
    parent_id: Option<i64>,
) -> Vec<RouteNode> {
    by_parent
        .get(&parent_id)
        .map(|siblings| {
            siblings
                .iter()
                .map(|route| RouteNode {
                    route: (*route).clone(),
                    children: attach_children(by_parent, Some(route.id)),
                })
                .collect()
        })
        .unwrap_or_default()
}
