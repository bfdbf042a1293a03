//! Card CRUD with route reconciliation.
//!
//! Each write runs in a single transaction covering the card row and the whole
//! reconciliation pass, so a rejected request leaves cards and routes untouched.

use rusqlite::Connection;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{
    Card, CardListParams, CardWithMenu, CreateCardInput, MenuEntry, Route, UpdateCardInput,
};
use crate::reconcile::{self, RouteRequest};

#[derive(Clone)]
pub struct CardService {
    db: Database,
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation("Title is required"));
    }
    Ok(())
}

/// Attach root route settings and the current menu to a card.
fn with_menu(conn: &Connection, card: Card) -> Result<CardWithMenu> {
    let root = match card.route_id {
        Some(route_id) => Route::find_by_id(conn, route_id)?,
        None => None,
    };
    let Some(root) = root else {
        return Ok(CardWithMenu {
            card,
            redirect: None,
            requires_auth: None,
            show_in_menu: None,
            show_in_tabs: None,
            order: None,
            menu_items: Vec::new(),
        });
    };

    let menu_items = Route::list_children(conn, root.id)?
        .iter()
        .map(MenuEntry::from)
        .collect();

    Ok(CardWithMenu {
        card,
        redirect: root.redirect,
        requires_auth: Some(root.requires_auth),
        show_in_menu: Some(root.show_in_menu),
        show_in_tabs: Some(root.show_in_tabs),
        order: Some(root.order),
        menu_items,
    })
}

fn reload(conn: &Connection, id: i64) -> Result<CardWithMenu> {
    let card = Card::find_by_id(conn, id)?.ok_or(Error::NotFound { entity: "Card", id })?;
    with_menu(conn, card)
}

impl CardService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn get_all(&self, params: CardListParams) -> Result<Vec<CardWithMenu>> {
        self.db.with_connection(|conn| {
            Card::list(conn, params.limit, params.offset)?
                .into_iter()
                .map(|card| with_menu(conn, card))
                .collect()
        })
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<CardWithMenu>> {
        self.db.with_connection(|conn| {
            Card::find_by_id(conn, id)?
                .map(|card| with_menu(conn, card))
                .transpose()
        })
    }

    pub fn create(&self, input: CreateCardInput) -> Result<CardWithMenu> {
        validate_title(&input.title)?;

        self.db.transaction(|conn| {
            let card = Card::insert(
                conn,
                input.title.trim(),
                input.description.as_deref(),
                input.icon.as_deref(),
            )?;
            tracing::info!(card_id = card.id, title = %card.title, "Created card");

            let request = RouteRequest {
                title: Some(card.title.as_str()),
                ..RouteRequest::from(&input)
            };
            reconcile::reconcile_card(conn, &card, input.route_path.as_deref(), &request)?;
            reload(conn, card.id)
        })
    }

    /// Returns `None` if the card does not exist.
    pub fn update(&self, id: i64, input: UpdateCardInput) -> Result<Option<CardWithMenu>> {
        if let Some(title) = &input.title {
            validate_title(title)?;
        }

        self.db.transaction(|conn| {
            if !Card::update_display(
                conn,
                id,
                input.title.as_deref().map(str::trim),
                input.description.as_deref(),
                input.icon.as_deref(),
            )? {
                return Ok(None);
            }
            let card = Card::find_by_id(conn, id)?.ok_or(Error::NotFound { entity: "Card", id })?;

            let new_path = match &input.route_path {
                None => card.route_path.clone(),
                Some(path) => path.clone(),
            };
            // The root mirrors the card, so its title and icon follow the stored card.
            let request = RouteRequest {
                title: Some(card.title.as_str()),
                icon: card.icon.as_deref(),
                redirect: input.redirect.as_deref(),
                requires_auth: input.requires_auth,
                show_in_menu: input.show_in_menu,
                show_in_tabs: input.show_in_tabs,
                order: input.order,
                menu_items: input.menu_items.as_deref(),
            };
            reconcile::reconcile_card(conn, &card, new_path.as_deref(), &request)?;

            reload(conn, id).map(Some)
        })
    }

    /// Delete the card and its route subtree. Returns false if the card does not exist.
    pub fn delete(&self, id: i64) -> Result<bool> {
        self.db.transaction(|conn| {
            let Some(card) = Card::find_by_id(conn, id)? else {
                return Ok(false);
            };
            Card::delete(conn, id)?;
            reconcile::remove_card_routes(conn, &card)?;
            tracing::info!(card_id = id, "Deleted card");
            Ok(true)
        })
    }

    /// Stamp `last_clicked_at` with the current time.
    pub fn record_click(&self, id: i64) -> Result<Option<CardWithMenu>> {
        self.db.with_connection(|conn| {
            if !Card::mark_clicked(conn, id)? {
                return Ok(None);
            }
            reload(conn, id).map(Some)
        })
    }
}
