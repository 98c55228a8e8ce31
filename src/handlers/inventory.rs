use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{inventory_adjustment, inventory_record, product};
use crate::services::adjustments::{AdjustStockRequest, AdjustStockResult};
use crate::services::inventory::{CreateProductRequest, ReceiveStockRequest, StockFilter};
use crate::stock::consolidation::ConsolidatedStock;
use crate::{ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PutAwayRequest {
    pub bin_id: Uuid,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct AdjustmentHistoryQuery {
    pub bin_id: Option<Uuid>,
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    summary = "Create product",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<product::Model>),
        (status = 409, description = "Product code already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<product::Model>>), crate::errors::ServiceError> {
    let created = state.inventory.create_product(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    summary = "List products",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated products", body = ApiResponse<PaginatedResponse<product::Model>>)
    ),
    tag = "inventory"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(list): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<product::Model>> {
    let limit = state.config.clamp_page_size(list.limit);
    let (rows, total) = state.inventory.list_products(list.page, limit).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        rows, total, list.page, limit,
    ))))
}

/// Book incoming stock into a receiving bin.
#[utoipa::path(
    post,
    path = "/api/v1/inventory/receive",
    summary = "Receive stock",
    request_body = ReceiveStockRequest,
    responses(
        (status = 201, description = "Stock received", body = ApiResponse<inventory_record::Model>),
        (status = 404, description = "Product or bin not found", body = crate::errors::ErrorResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn receive_stock(
    State(state): State<AppState>,
    Json(request): Json<ReceiveStockRequest>,
) -> Result<(StatusCode, Json<ApiResponse<inventory_record::Model>>), crate::errors::ServiceError>
{
    let record = state.inventory.receive_stock(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

/// Move a received record into a storage bin.
#[utoipa::path(
    post,
    path = "/api/v1/inventory/records/{id}/put-away",
    summary = "Put stock away",
    params(("id" = Uuid, Path, description = "Inventory record id")),
    request_body = PutAwayRequest,
    responses(
        (status = 200, description = "Record moved to storage", body = ApiResponse<inventory_record::Model>),
        (status = 404, description = "Record or bin not found", body = crate::errors::ErrorResponse),
        (status = 400, description = "Record is not in RECEIVED state", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn put_away(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    Json(request): Json<PutAwayRequest>,
) -> ApiResult<inventory_record::Model> {
    let record = state.inventory.put_away(record_id, request.bin_id).await?;
    Ok(Json(ApiResponse::success(record)))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/records",
    summary = "List inventory records",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page"),
        ("product_id" = Option<Uuid>, Query, description = "Filter by product"),
        ("bin_id" = Option<Uuid>, Query, description = "Filter by bin"),
        ("status" = Option<String>, Query, description = "Filter by stock status")
    ),
    responses(
        (status = 200, description = "Paginated inventory rows", body = ApiResponse<PaginatedResponse<inventory_record::Model>>)
    ),
    tag = "inventory"
)]
pub async fn list_records(
    State(state): State<AppState>,
    Query(list): Query<ListQuery>,
    Query(filter): Query<StockFilter>,
) -> ApiResult<PaginatedResponse<inventory_record::Model>> {
    let limit = state.config.clamp_page_size(list.limit);
    let (rows, total) = state
        .inventory
        .list_records(filter, list.page, limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        rows, total, list.page, limit,
    ))))
}

/// Consolidated stock view: rows sharing product, bin, status, unit, and
/// color are merged into one position.
#[utoipa::path(
    get,
    path = "/api/v1/inventory/consolidated",
    summary = "List consolidated stock",
    params(
        ("product_id" = Option<Uuid>, Query, description = "Filter by product"),
        ("bin_id" = Option<Uuid>, Query, description = "Filter by bin"),
        ("status" = Option<String>, Query, description = "Filter by stock status")
    ),
    responses(
        (status = 200, description = "Consolidated stock positions", body = ApiResponse<Vec<ConsolidatedStock>>)
    ),
    tag = "inventory"
)]
pub async fn list_consolidated(
    State(state): State<AppState>,
    Query(filter): Query<StockFilter>,
) -> ApiResult<Vec<ConsolidatedStock>> {
    let positions = state.inventory.list_consolidated(filter).await?;
    Ok(Json(ApiResponse::success(positions)))
}

/// Apply an ADD, REMOVE, or REPLACE adjustment distributed over the
/// selected bins. The plan and the audit rows commit atomically.
#[utoipa::path(
    post,
    path = "/api/v1/inventory/adjustments",
    summary = "Adjust stock",
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Adjustment applied", body = ApiResponse<AdjustStockResult>),
        (status = 422, description = "Insufficient stock for removal", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product or bin not found", body = crate::errors::ErrorResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    Json(request): Json<AdjustStockRequest>,
) -> ApiResult<AdjustStockResult> {
    let result = state.adjustments.adjust(request).await?;
    Ok(Json(ApiResponse::success(result)))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/adjustments/{product_id}",
    summary = "List adjustments for a product",
    params(
        ("product_id" = Uuid, Path, description = "Product id"),
        ("bin_id" = Option<Uuid>, Query, description = "Narrow the trail to one bin"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Audit trail, newest first", body = ApiResponse<PaginatedResponse<inventory_adjustment::Model>>)
    ),
    tag = "inventory"
)]
pub async fn list_adjustments(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(filter): Query<AdjustmentHistoryQuery>,
    Query(list): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<inventory_adjustment::Model>> {
    let limit = state.config.clamp_page_size(list.limit);
    let (rows, total) = state
        .adjustments
        .list_adjustments(product_id, filter.bin_id, list.page, limit)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        rows, total, list.page, limit,
    ))))
}
