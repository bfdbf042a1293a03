//! HTTP JSON API over the card service and route store.

mod cards;
mod error;
mod routes;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::db::Database;
use crate::CardService;

pub use error::{ApiError, ApiResult, ValidJson};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub cards: CardService,
}

pub fn create_router(db: Database) -> Router {
    let state = AppState {
        cards: CardService::new(db.clone()),
        db,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/cards", get(cards::list_cards).post(cards::create_card))
        .route(
            "/api/cards/{id}",
            get(cards::get_card)
                .put(cards::update_card)
                .delete(cards::delete_card),
        )
        .route("/api/cards/{id}/click", post(cards::record_click))
        .route("/api/routes", get(routes::list_routes).post(routes::create_route))
        .route("/api/routes/nested", get(routes::nested_routes))
        .route("/api/routes/projects", post(routes::provision_project))
        .route(
            "/api/routes/{id}",
            get(routes::get_route)
                .put(routes::update_route)
                .delete(routes::delete_route),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
