use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::Route;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub route_id: Option<i64>,
    pub route_path: Option<String>,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Owner tag written to `project_id` on every route this card owns.
    pub fn owner_tag(&self) -> String {
        self.id.to_string()
    }
}

/// A desired child route, supplied on card create/update requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Server-assigned route id, present when the client echoes back a menu it read.
    pub id: Option<i64>,
    pub title: String,
    pub icon: Option<String>,
    pub route_path: String,
    pub component: Option<String>,
    pub requires_auth: Option<bool>,
    pub show_in_menu: Option<bool>,
    pub show_in_tabs: Option<bool>,
    pub order: Option<i64>,
}

/// A card's current menu item, read back from the child routes of its root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuEntry {
    pub id: i64,
    pub title: String,
    pub icon: Option<String>,
    pub route_path: String,
    pub component: Option<String>,
    pub requires_auth: bool,
    pub show_in_menu: bool,
    pub show_in_tabs: bool,
    pub order: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Route> for MenuEntry {
    fn from(route: &Route) -> Self {
        Self {
            id: route.id,
            title: route.title.clone().unwrap_or_default(),
            icon: route.icon.clone(),
            route_path: route.path.clone(),
            component: route.component.clone(),
            requires_auth: route.requires_auth,
            show_in_menu: route.show_in_menu,
            show_in_tabs: route.show_in_tabs,
            order: route.order,
            created_at: route.created_at,
        }
    }
}

impl From<&MenuEntry> for MenuItem {
    fn from(entry: &MenuEntry) -> Self {
        Self {
            id: Some(entry.id),
            title: entry.title.clone(),
            icon: entry.icon.clone(),
            route_path: entry.route_path.clone(),
            component: entry.component.clone(),
            requires_auth: Some(entry.requires_auth),
            show_in_menu: Some(entry.show_in_menu),
            show_in_tabs: Some(entry.show_in_tabs),
            order: Some(entry.order),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardInput {
    pub title: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub route_path: Option<String>,
    pub redirect: Option<String>,
    pub requires_auth: Option<bool>,
    pub show_in_menu: Option<bool>,
    pub show_in_tabs: Option<bool>,
    pub order: Option<i64>,
    pub menu_items: Option<Vec<MenuItem>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    /// Absent keeps the current route, `null` detaches it, a path attaches or moves it.
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub route_path: Option<Option<String>>,
    pub redirect: Option<String>,
    pub requires_auth: Option<bool>,
    pub show_in_menu: Option<bool>,
    pub show_in_tabs: Option<bool>,
    pub order: Option<i64>,
    pub menu_items: Option<Vec<MenuItem>>,
}

fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A card enriched with its root route settings and current menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardWithMenu {
    #[serde(flatten)]
    pub card: Card,
    pub redirect: Option<String>,
    pub requires_auth: Option<bool>,
    pub show_in_menu: Option<bool>,
    pub show_in_tabs: Option<bool>,
    pub order: Option<i64>,
    pub menu_items: Vec<MenuEntry>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CardListParams {
    #[serde(default = "CardListParams::default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl CardListParams {
    fn default_limit() -> i64 {
        100
    }
}

impl Default for CardListParams {
    fn default() -> Self {
        Self {
            limit: Self::default_limit(),
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_route_path_distinguishes_absent_null_and_value() {
        let absent: UpdateCardInput = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(absent.route_path, None);

        let cleared: UpdateCardInput = serde_json::from_str(r#"{"routePath":null}"#).unwrap();
        assert_eq!(cleared.route_path, Some(None));

        let moved: UpdateCardInput = serde_json::from_str(r#"{"routePath":"/diary"}"#).unwrap();
        assert_eq!(moved.route_path, Some(Some("/diary".to_string())));
    }

    #[test]
    fn menu_items_accept_camel_case_payloads() {
        let input: CreateCardInput = serde_json::from_str(
            r#"{
                "title": "Blog",
                "routePath": "/blog",
                "menuItems": [{"title": "Home", "routePath": "/blog/home", "showInTabs": false}]
            }"#,
        )
        .unwrap();

        let items = input.menu_items.unwrap();
        assert_eq!(items[0].route_path, "/blog/home");
        assert_eq!(items[0].show_in_tabs, Some(false));
        assert_eq!(items[0].id, None);
    }
}
