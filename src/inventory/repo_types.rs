use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Largest quantity one item may hold. Packing lists expand items unit by unit.
pub const MAX_QUANTITY: i32 = 10_000;

/// Range check applied to every quantity written by a client.
pub fn check_quantity(quantity: i32) -> Result<(), String> {
    if quantity < 0 {
        Err("Quantity must not be negative".into())
    } else if quantity > MAX_QUANTITY {
        Err(format!("Quantity must not exceed {MAX_QUANTITY}"))
    } else {
        Ok(())
    }
}

/// One inventory line item ("sequence").
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub part_number: Option<String>,
    pub build_sequence: Option<i64>,
    pub balloon_number: Option<String>,
    pub vendor_no: Option<i64>,
    pub packing_disk_no: Option<i64>,
    pub line: Option<String>,
    pub po_no: Option<String>,
    pub quantity: i32,
    pub scanned_by: Option<String>,
    pub week: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Insert payload for scans and imports.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    pub part_number: Option<String>,
    pub build_sequence: Option<i64>,
    pub balloon_number: Option<String>,
    pub vendor_no: Option<i64>,
    pub packing_disk_no: Option<i64>,
    pub line: Option<String>,
    pub po_no: Option<String>,
    pub quantity: i32,
    pub scanned_by: Option<String>,
    pub week: String,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryPatch {
    pub part_number: Option<String>,
    pub build_sequence: Option<i64>,
    pub quantity: Option<i32>,
    pub packing_disk_no: Option<i64>,
    pub scanned_by: Option<String>,
}

/// Outcome of a week truncation.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TruncateOutcome {
    pub archived: u64,
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_bounds() {
        assert!(check_quantity(0).is_ok());
        assert!(check_quantity(MAX_QUANTITY).is_ok());
        assert_eq!(check_quantity(-1).unwrap_err(), "Quantity must not be negative");
        assert_eq!(
            check_quantity(MAX_QUANTITY + 1).unwrap_err(),
            "Quantity must not exceed 10000"
        );
        assert!(check_quantity(i32::MAX).is_err());
    }
}
