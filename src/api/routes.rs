use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::{ApiError, ApiResult, AppState, ValidJson};
use crate::models::{CreateRouteInput, ProvisionProjectInput, Route, RouteNode, UpdateRouteInput};
use crate::reconcile::ProvisionedProject;

pub async fn list_routes(State(state): State<AppState>) -> ApiResult<Json<Vec<Route>>> {
    Ok(Json(state.db.get_all_routes()?))
}

pub async fn nested_routes(State(state): State<AppState>) -> ApiResult<Json<Vec<RouteNode>>> {
    Ok(Json(state.db.get_routes_nested()?))
}

pub async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Route>> {
    state
        .db
        .get_route(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Route", id))
}

pub async fn create_route(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateRouteInput>,
) -> ApiResult<(StatusCode, Json<Route>)> {
    let route = state.db.create_route(&input)?;
    Ok((StatusCode::CREATED, Json(route)))
}

pub async fn update_route(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidJson(input): ValidJson<UpdateRouteInput>,
) -> ApiResult<Json<Route>> {
    state
        .db
        .update_route(id, &input)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Route", id))
}

/// Deletes the route together with its descendants.
pub async fn delete_route(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    match state.db.delete_route_tree(id)? {
        0 => Err(ApiError::not_found("Route", id)),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

pub async fn provision_project(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<ProvisionProjectInput>,
) -> ApiResult<(StatusCode, Json<ProvisionedProject>)> {
    let provisioned = state
        .db
        .provision_project(&input.project_name, input.card_id)?;
    let status = if provisioned.root_created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(provisioned)))
}
