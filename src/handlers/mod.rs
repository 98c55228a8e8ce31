pub mod chat;
pub mod feed;
pub mod inventory;
pub mod warehouses;
