use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Warehouse API",
        version = "0.1.0",
        description = r#"
Warehouse backend covering storage topology, inventory receiving and
adjustments, team chat with mentions, and a deduplicated change feed.

Stock adjustments distribute an item-level quantity over the selected
bins: ADD splits evenly with the remainder on the leading bins, REMOVE
drains bins in selection order and fails on a shortfall, REPLACE sets a
new item-level total. Every adjustment commits atomically with its audit
rows.
"#
    ),
    tags(
        (name = "warehouses", description = "Warehouse, floor, rack, and bin management"),
        (name = "inventory", description = "Receiving, put-away, stock views, and adjustments"),
        (name = "chat", description = "Team chat with mentions, reactions, and read state"),
        (name = "feed", description = "Change feed subscription")
    ),
    paths(
        // Warehouses
        crate::handlers::warehouses::create_warehouse,
        crate::handlers::warehouses::list_warehouses,
        crate::handlers::warehouses::get_warehouse,
        crate::handlers::warehouses::update_warehouse,
        crate::handlers::warehouses::delete_warehouse,
        crate::handlers::warehouses::get_hierarchy,
        crate::handlers::warehouses::create_floor,
        crate::handlers::warehouses::delete_floor,
        crate::handlers::warehouses::create_rack,
        crate::handlers::warehouses::delete_rack,
        crate::handlers::warehouses::create_bin,
        crate::handlers::warehouses::delete_bin,

        // Inventory
        crate::handlers::inventory::create_product,
        crate::handlers::inventory::list_products,
        crate::handlers::inventory::receive_stock,
        crate::handlers::inventory::put_away,
        crate::handlers::inventory::list_records,
        crate::handlers::inventory::list_consolidated,
        crate::handlers::inventory::adjust_stock,
        crate::handlers::inventory::list_adjustments,

        // Chat
        crate::handlers::chat::create_profile,
        crate::handlers::chat::list_profiles,
        crate::handlers::chat::create_order_ref,
        crate::handlers::chat::send_message,
        crate::handlers::chat::list_messages,
        crate::handlers::chat::toggle_reaction,
        crate::handlers::chat::mark_read,
        crate::handlers::chat::unread_count,

        // Feed
        crate::handlers::feed::stream,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,

            crate::services::warehouses::CreateWarehouseRequest,
            crate::services::warehouses::UpdateWarehouseRequest,
            crate::services::warehouses::CreateFloorRequest,
            crate::services::warehouses::CreateRackRequest,
            crate::services::warehouses::CreateBinRequest,
            crate::services::warehouses::WarehouseTree,
            crate::services::warehouses::FloorTree,
            crate::services::warehouses::RackTree,

            crate::services::inventory::CreateProductRequest,
            crate::services::inventory::ReceiveStockRequest,
            crate::services::inventory::StockFilter,
            crate::services::adjustments::AdjustStockRequest,
            crate::services::adjustments::AdjustStockResult,
            crate::handlers::inventory::PutAwayRequest,
            crate::stock::AdjustmentMode,
            crate::stock::StockStatus,
            crate::stock::LocationType,
            crate::stock::distribution::BinAdjustment,
            crate::stock::consolidation::ConsolidatedStock,

            crate::services::chat::CreateProfileRequest,
            crate::services::chat::CreateOrderRefRequest,
            crate::services::chat::SendMessageRequest,
            crate::services::chat::ToggleReactionRequest,
            crate::services::chat::ToggleReactionResult,
            crate::services::chat::MessageView,
            crate::services::chat::ReactionCount,
            crate::handlers::chat::MarkReadRequest,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
