use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::{ApiError, ApiResult, AppState, ValidJson};
use crate::models::{CardListParams, CardWithMenu, CreateCardInput, UpdateCardInput};

pub async fn list_cards(
    State(state): State<AppState>,
    Query(params): Query<CardListParams>,
) -> ApiResult<Json<Vec<CardWithMenu>>> {
    Ok(Json(state.cards.get_all(params)?))
}

pub async fn create_card(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateCardInput>,
) -> ApiResult<(StatusCode, Json<CardWithMenu>)> {
    let card = state.cards.create(input)?;
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CardWithMenu>> {
    state
        .cards
        .get_by_id(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Card", id))
}

pub async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidJson(input): ValidJson<UpdateCardInput>,
) -> ApiResult<Json<CardWithMenu>> {
    state
        .cards
        .update(id, input)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Card", id))
}

pub async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if state.cards.delete(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Card", id))
    }
}

pub async fn record_click(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CardWithMenu>> {
    state
        .cards
        .record_click(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Card", id))
}
