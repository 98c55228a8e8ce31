pub mod adjustments;
pub mod chat;
pub mod inventory;
pub mod warehouses;

pub use adjustments::AdjustmentService;
pub use chat::ChatService;
pub use inventory::InventoryService;
pub use warehouses::WarehouseService;
