use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::entities::{bin, floor, rack, warehouse};
use crate::services::warehouses::{
    CreateBinRequest, CreateFloorRequest, CreateRackRequest, CreateWarehouseRequest,
    UpdateWarehouseRequest, WarehouseTree,
};
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[utoipa::path(
    post,
    path = "/api/v1/warehouses",
    summary = "Create warehouse",
    request_body = CreateWarehouseRequest,
    responses(
        (status = 201, description = "Warehouse created", body = ApiResponse<warehouse::Model>),
        (status = 409, description = "Warehouse code already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(request): Json<CreateWarehouseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<warehouse::Model>>), crate::errors::ServiceError> {
    let created = state.warehouses.create_warehouse(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouses",
    summary = "List warehouses",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated warehouses", body = ApiResponse<PaginatedResponse<warehouse::Model>>)
    ),
    tag = "warehouses"
)]
pub async fn list_warehouses(
    State(state): State<AppState>,
    Query(list): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<warehouse::Model>> {
    let limit = state.config.clamp_page_size(list.limit);
    let (rows, total) = state.warehouses.list_warehouses(list.page, limit).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        rows, total, list.page, limit,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouses/{id}",
    summary = "Get warehouse",
    params(("id" = Uuid, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Warehouse", body = ApiResponse<warehouse::Model>),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<warehouse::Model> {
    let row = state.warehouses.get_warehouse(id).await?;
    Ok(Json(ApiResponse::success(row)))
}

#[utoipa::path(
    put,
    path = "/api/v1/warehouses/{id}",
    summary = "Update warehouse",
    params(("id" = Uuid, Path, description = "Warehouse id")),
    request_body = UpdateWarehouseRequest,
    responses(
        (status = 200, description = "Warehouse updated", body = ApiResponse<warehouse::Model>),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn update_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateWarehouseRequest>,
) -> ApiResult<warehouse::Model> {
    let updated = state.warehouses.update_warehouse(id, request).await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// Deleting is refused while floors still exist under the warehouse.
#[utoipa::path(
    delete,
    path = "/api/v1/warehouses/{id}",
    summary = "Delete warehouse",
    params(("id" = Uuid, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Warehouse deleted", body = ApiResponse<String>),
        (status = 409, description = "Warehouse still has floors", body = crate::errors::ErrorResponse),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn delete_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<String> {
    state.warehouses.delete_warehouse(id).await?;
    Ok(Json(ApiResponse::message("warehouse deleted")))
}

#[utoipa::path(
    get,
    path = "/api/v1/warehouses/{id}/hierarchy",
    summary = "Get warehouse hierarchy",
    params(("id" = Uuid, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Nested floor/rack/bin tree", body = ApiResponse<WarehouseTree>),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn get_hierarchy(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<WarehouseTree> {
    let tree = state.warehouses.get_hierarchy(id).await?;
    Ok(Json(ApiResponse::success(tree)))
}

#[utoipa::path(
    post,
    path = "/api/v1/floors",
    summary = "Create floor",
    request_body = CreateFloorRequest,
    responses(
        (status = 201, description = "Floor created", body = ApiResponse<floor::Model>),
        (status = 404, description = "Warehouse not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn create_floor(
    State(state): State<AppState>,
    Json(request): Json<CreateFloorRequest>,
) -> Result<(StatusCode, Json<ApiResponse<floor::Model>>), crate::errors::ServiceError> {
    let created = state.warehouses.create_floor(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/floors/{id}",
    summary = "Delete floor",
    params(("id" = Uuid, Path, description = "Floor id")),
    responses(
        (status = 200, description = "Floor deleted", body = ApiResponse<String>),
        (status = 409, description = "Floor still has racks", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn delete_floor(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<String> {
    state.warehouses.delete_floor(id).await?;
    Ok(Json(ApiResponse::message("floor deleted")))
}

#[utoipa::path(
    post,
    path = "/api/v1/racks",
    summary = "Create rack",
    request_body = CreateRackRequest,
    responses(
        (status = 201, description = "Rack created", body = ApiResponse<rack::Model>),
        (status = 404, description = "Floor not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn create_rack(
    State(state): State<AppState>,
    Json(request): Json<CreateRackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<rack::Model>>), crate::errors::ServiceError> {
    let created = state.warehouses.create_rack(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/racks/{id}",
    summary = "Delete rack",
    params(("id" = Uuid, Path, description = "Rack id")),
    responses(
        (status = 200, description = "Rack deleted", body = ApiResponse<String>),
        (status = 409, description = "Rack still has bins", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn delete_rack(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<String> {
    state.warehouses.delete_rack(id).await?;
    Ok(Json(ApiResponse::message("rack deleted")))
}

#[utoipa::path(
    post,
    path = "/api/v1/bins",
    summary = "Create bin",
    request_body = CreateBinRequest,
    responses(
        (status = 201, description = "Bin created", body = ApiResponse<bin::Model>),
        (status = 404, description = "Rack not found", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn create_bin(
    State(state): State<AppState>,
    Json(request): Json<CreateBinRequest>,
) -> Result<(StatusCode, Json<ApiResponse<bin::Model>>), crate::errors::ServiceError> {
    let created = state.warehouses.create_bin(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

/// Deleting is refused while inventory is still booked on the bin.
#[utoipa::path(
    delete,
    path = "/api/v1/bins/{id}",
    summary = "Delete bin",
    params(("id" = Uuid, Path, description = "Bin id")),
    responses(
        (status = 200, description = "Bin deleted", body = ApiResponse<String>),
        (status = 409, description = "Bin still holds stock", body = crate::errors::ErrorResponse)
    ),
    tag = "warehouses"
)]
pub async fn delete_bin(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<String> {
    state.warehouses.delete_bin(id).await?;
    Ok(Json(ApiResponse::message("bin deleted")))
}
