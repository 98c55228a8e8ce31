pub mod chat;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod openapi;
pub mod services;
pub mod stock;

use axum::extract::State;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::feed::ChangeFeed;
use crate::events::EventSender;
use crate::services::{AdjustmentService, ChatService, InventoryService, WarehouseService};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub event_sender: EventSender,
    pub feed: Arc<ChangeFeed>,
    pub adjustments: AdjustmentService,
    pub inventory: InventoryService,
    pub warehouses: WarehouseService,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(
        db: Arc<DbPool>,
        config: AppConfig,
        event_sender: EventSender,
        feed: Arc<ChangeFeed>,
    ) -> Self {
        let sender = Arc::new(event_sender.clone());
        Self {
            adjustments: AdjustmentService::new(db.clone(), sender.clone(), feed.clone()),
            inventory: InventoryService::new(db.clone(), sender.clone(), feed.clone()),
            warehouses: WarehouseService::new(db.clone(), sender.clone(), feed.clone()),
            chat: ChatService::new(db.clone(), sender, feed.clone()),
            db,
            config,
            event_sender,
            feed,
        }
    }
}

/// Common query parameters for list endpoints.
#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    pub limit: Option<u64>,
}

fn default_page() -> u64 {
    1
}

#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        Self {
            items,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit.max(1)),
        }
    }
}

/// Standard API result type for JSON responses.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Warehouse topology
        .route("/warehouses", post(handlers::warehouses::create_warehouse))
        .route("/warehouses", get(handlers::warehouses::list_warehouses))
        .route("/warehouses/:id", get(handlers::warehouses::get_warehouse))
        .route("/warehouses/:id", put(handlers::warehouses::update_warehouse))
        .route(
            "/warehouses/:id",
            delete(handlers::warehouses::delete_warehouse),
        )
        .route(
            "/warehouses/:id/hierarchy",
            get(handlers::warehouses::get_hierarchy),
        )
        .route("/floors", post(handlers::warehouses::create_floor))
        .route("/floors/:id", delete(handlers::warehouses::delete_floor))
        .route("/racks", post(handlers::warehouses::create_rack))
        .route("/racks/:id", delete(handlers::warehouses::delete_rack))
        .route("/bins", post(handlers::warehouses::create_bin))
        .route("/bins/:id", delete(handlers::warehouses::delete_bin))
        // Inventory
        .route("/products", post(handlers::inventory::create_product))
        .route("/products", get(handlers::inventory::list_products))
        .route("/inventory/receive", post(handlers::inventory::receive_stock))
        .route(
            "/inventory/records/:id/put-away",
            post(handlers::inventory::put_away),
        )
        .route("/inventory/records", get(handlers::inventory::list_records))
        .route(
            "/inventory/consolidated",
            get(handlers::inventory::list_consolidated),
        )
        .route(
            "/inventory/adjustments",
            post(handlers::inventory::adjust_stock),
        )
        .route(
            "/inventory/adjustments/:product_id",
            get(handlers::inventory::list_adjustments),
        )
        // Chat
        .route("/chat/users", post(handlers::chat::create_profile))
        .route("/chat/users", get(handlers::chat::list_profiles))
        .route("/chat/orders", post(handlers::chat::create_order_ref))
        .route("/chat/messages", post(handlers::chat::send_message))
        .route("/chat/messages", get(handlers::chat::list_messages))
        .route(
            "/chat/messages/:id/reactions",
            post(handlers::chat::toggle_reaction),
        )
        .route("/chat/read-state", put(handlers::chat::mark_read))
        .route("/chat/unread-count", get(handlers::chat::unread_count))
        // Change feed
        .route("/feed", get(handlers::feed::stream))
}

pub async fn api_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = match db::check_connection(&state.db).await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    Json(json!({
        "status": if database == "up" { "healthy" } else { "degraded" },
        "database": database,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod response_tests {
    use super::*;

    #[test]
    fn success_wraps_payload() {
        let response = ApiResponse::success(42);
        assert!(response.success);
        assert_eq!(response.data, Some(42));
        assert!(response.message.is_none());
    }

    #[test]
    fn pagination_rounds_total_pages_up() {
        let page: PaginatedResponse<u8> = PaginatedResponse::new(vec![], 21, 1, 10);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn pagination_tolerates_zero_limit() {
        let page: PaginatedResponse<u8> = PaginatedResponse::new(vec![], 5, 1, 0);
        assert_eq!(page.total_pages, 5);
    }
}
