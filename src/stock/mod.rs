pub mod consolidation;
pub mod distribution;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// How an adjustment changes the item-level quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentMode {
    Add,
    Remove,
    Replace,
}

/// Lifecycle status of an inventory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Received,
    InStorage,
    Dispatched,
}

/// Role of a bin within the warehouse flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LocationType {
    Receiving,
    Storage,
    Dispatch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn enum_string_round_trip() {
        assert_eq!(AdjustmentMode::Add.to_string(), "ADD");
        assert_eq!(StockStatus::InStorage.to_string(), "IN_STORAGE");
        assert_eq!(LocationType::Receiving.to_string(), "RECEIVING");
        assert_eq!(
            StockStatus::from_str("IN_STORAGE").unwrap(),
            StockStatus::InStorage
        );
        assert_eq!(
            AdjustmentMode::from_str("REPLACE").unwrap(),
            AdjustmentMode::Replace
        );
    }
}
