use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A navigation node, stored flat with a pointer to its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: i64,
    pub path: String,
    pub name: Option<String>,
    pub component: Option<String>,
    pub redirect: Option<String>,
    pub parent_id: Option<i64>,
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub requires_auth: bool,
    pub permission: Option<String>,
    pub keep_alive: bool,
    pub show_in_menu: bool,
    pub show_in_tabs: bool,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Route {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteInput {
    pub path: String,
    pub name: Option<String>,
    pub component: Option<String>,
    pub redirect: Option<String>,
    pub parent_id: Option<i64>,
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub requires_auth: Option<bool>,
    pub permission: Option<String>,
    pub keep_alive: Option<bool>,
    pub show_in_menu: Option<bool>,
    pub show_in_tabs: Option<bool>,
    pub order: Option<i64>,
}

/// Partial update: `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRouteInput {
    pub path: Option<String>,
    pub name: Option<String>,
    pub component: Option<String>,
    pub redirect: Option<String>,
    pub parent_id: Option<i64>,
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub requires_auth: Option<bool>,
    pub permission: Option<String>,
    pub keep_alive: Option<bool>,
    pub show_in_menu: Option<bool>,
    pub show_in_tabs: Option<bool>,
    pub order: Option<i64>,
}

impl UpdateRouteInput {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A route together with its ordered children, as consumed by menu rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNode {
    #[serde(flatten)]
    pub route: Route,
    pub children: Vec<RouteNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionProjectInput {
    pub project_name: String,
    pub card_id: i64,
}
