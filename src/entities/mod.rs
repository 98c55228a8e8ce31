pub mod bin;
pub mod chat_message;
pub mod chat_read_state;
pub mod customer_order;
pub mod floor;
pub mod inventory_adjustment;
pub mod inventory_record;
pub mod message_reaction;
pub mod product;
pub mod rack;
pub mod user_profile;
pub mod warehouse;
