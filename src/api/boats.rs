//! Boat API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult},
    models::boat::{Boat, BoatBudget, CreateBoat, UpdateBoat},
    AppState,
};

use super::{AuthenticatedCaller, OptionalCaller};

/// List the boats visible to the caller
#[utoipa::path(
    get,
    path = "/boats",
    tag = "boats",
    security((), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "Boat list", body = Vec<Boat>)
    )
)]
pub async fn list_boats(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
) -> AppResult<Json<Vec<Boat>>> {
    let boats = state.services.boats.list(caller.as_ref()).await?;
    Ok(Json(boats))
}

/// Get boat by ID
#[utoipa::path(
    get,
    path = "/boats/{id}",
    tag = "boats",
    security((), ("bearer_auth" = [])),
    params(("id" = String, Path, description = "Boat ID")),
    responses(
        (status = 200, description = "Boat details", body = Boat),
        (status = 403, description = "Not readable by the caller", body = crate::error::ErrorResponse),
        (status = 404, description = "Boat not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_boat(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
    Path(id): Path<String>,
) -> AppResult<Json<Boat>> {
    let boat = state.services.boats.get(caller.as_ref(), &id).await?;
    Ok(Json(boat))
}

/// Budget breakdown of a boat
#[utoipa::path(
    get,
    path = "/boats/{id}/budget",
    tag = "boats",
    security((), ("bearer_auth" = [])),
    params(("id" = String, Path, description = "Boat ID")),
    responses(
        (status = 200, description = "Budget breakdown", body = BoatBudget),
        (status = 404, description = "Boat not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_budget(
    State(state): State<AppState>,
    OptionalCaller(caller): OptionalCaller,
    Path(id): Path<String>,
) -> AppResult<Json<BoatBudget>> {
    let budget = state.services.boats.budget(caller.as_ref(), &id).await?;
    Ok(Json(budget))
}

/// Create boat
#[utoipa::path(
    post,
    path = "/boats",
    tag = "boats",
    security(("bearer_auth" = [])),
    request_body = CreateBoat,
    responses(
        (status = 201, description = "Boat created", body = Boat),
        (status = 400, description = "Invalid boat", body = crate::error::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_boat(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    WithRejection(Json(data), _): WithRejection<Json<CreateBoat>, AppError>,
) -> AppResult<(StatusCode, Json<Boat>)> {
    let boat = state.services.boats.create(&caller, data).await?;
    Ok((StatusCode::CREATED, Json(boat)))
}

/// Update boat
#[utoipa::path(
    put,
    path = "/boats/{id}",
    tag = "boats",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Boat ID")),
    request_body = UpdateBoat,
    responses(
        (status = 200, description = "Boat updated", body = Boat),
        (status = 403, description = "Not writable by the caller", body = crate::error::ErrorResponse),
        (status = 404, description = "Boat not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_boat(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
    WithRejection(Json(data), _): WithRejection<Json<UpdateBoat>, AppError>,
) -> AppResult<Json<Boat>> {
    let boat = state.services.boats.update(&caller, &id, data).await?;
    Ok(Json(boat))
}

/// Delete boat
#[utoipa::path(
    delete,
    path = "/boats/{id}",
    tag = "boats",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Boat ID")),
    responses(
        (status = 204, description = "Boat deleted"),
        (status = 403, description = "Not deletable by the caller", body = crate::error::ErrorResponse),
        (status = 404, description = "Boat not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_boat(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.boats.delete(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Copy a readable boat into a new boat owned by the caller
#[utoipa::path(
    post,
    path = "/boats/{id}/duplicate",
    tag = "boats",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Boat ID")),
    responses(
        (status = 201, description = "Copy created", body = Boat),
        (status = 404, description = "Boat not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn duplicate_boat(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<Boat>)> {
    let boat = state.services.boats.duplicate(&caller, &id).await?;
    Ok((StatusCode::CREATED, Json(boat)))
}
