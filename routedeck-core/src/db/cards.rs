use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{now_timestamp, parse_timestamp};
use crate::error::{Error, Result};
use crate::models::Card;

const CARD_COLUMNS: &str =
    "id, title, description, icon, route_id, route_path, last_clicked_at, created_at, updated_at";

impl Card {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let last_clicked_at: Option<String> = row.get(6)?;
        let created_at: String = row.get(7)?;
        let updated_at: String = row.get(8)?;
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            icon: row.get(3)?,
            route_id: row.get(4)?,
            route_path: row.get(5)?,
            last_clicked_at: last_clicked_at
                .as_deref()
                .map(|value| parse_timestamp(6, value))
                .transpose()?,
            created_at: parse_timestamp(7, &created_at)?,
            updated_at: parse_timestamp(8, &updated_at)?,
        })
    }

    pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Self>> {
        let sql = format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1");
        Ok(conn
            .query_row(&sql, params![id], Self::from_row)
            .optional()?)
    }

    /// Newest first.
    pub fn list(conn: &Connection, limit: i64, offset: i64) -> Result<Vec<Self>> {
        let sql = format!(
            "SELECT {CARD_COLUMNS} FROM cards ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let cards = stmt
            .query_map(params![limit, offset], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    pub fn insert(
        conn: &Connection,
        title: &str,
        description: Option<&str>,
        icon: Option<&str>,
    ) -> Result<Self> {
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO cards (title, description, icon, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![title, description, icon, now],
        )?;

        let id = conn.last_insert_rowid();
        Self::find_by_id(conn, id)?.ok_or(Error::NotFound { entity: "Card", id })
    }

    /// Overwrite the display fields that are present. Returns false if the card is missing.
    pub fn update_display(
        conn: &Connection,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
        icon: Option<&str>,
    ) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE cards SET
                title = COALESCE(?1, title),
                description = COALESCE(?2, description),
                icon = COALESCE(?3, icon),
                updated_at = ?4
             WHERE id = ?5",
            params![title, description, icon, now_timestamp(), id],
        )?;
        Ok(changed > 0)
    }

    /// Point the card at its root route, or clear the pointer with `None`.
    pub fn set_route(conn: &Connection, id: i64, route: Option<(i64, &str)>) -> Result<bool> {
        let (route_id, route_path) = match route {
            Some((route_id, route_path)) => (Some(route_id), Some(route_path)),
            None => (None, None),
        };
        let changed = conn.execute(
            "UPDATE cards SET route_id = ?1, route_path = ?2, updated_at = ?3 WHERE id = ?4",
            params![route_id, route_path, now_timestamp(), id],
        )?;
        Ok(changed > 0)
    }

    pub fn mark_clicked(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE cards SET last_clicked_at = ?1 WHERE id = ?2",
            params![now_timestamp(), id],
        )?;
        Ok(changed > 0)
    }

    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute("DELETE FROM cards WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}
