use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{check_quantity, InventoryPatch, NewInventoryItem};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub week: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub week: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TruncateQuery {
    pub week: String,
    #[serde(default)]
    pub save_backup: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveQuery {
    pub packing_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct PackingQuery {
    pub packing: Option<i64>,
}

/// A single scan from the line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSequenceRequest {
    pub week: String,
    pub part_number: String,
    pub build_sequence: Option<i64>,
    #[serde(default)]
    pub balloon_number: Option<String>,
    pub vendor_no: Option<i64>,
    pub packing_disk_no: Option<i64>,
    pub line: Option<String>,
    pub po_no: Option<String>,
    pub quantity: i32,
    pub scanned_by: Option<String>,
}

impl AddSequenceRequest {
    pub fn into_new_item(self) -> ApiResult<NewInventoryItem> {
        let week = self.week.trim().to_string();
        let part_number = self.part_number.trim().to_string();
        if week.is_empty() {
            return Err(ApiError::bad_request("Week is required"));
        }
        if part_number.is_empty() {
            return Err(ApiError::bad_request("Part number is required"));
        }
        check_quantity(self.quantity).map_err(ApiError::bad_request)?;
        Ok(NewInventoryItem {
            part_number: Some(part_number),
            build_sequence: self.build_sequence,
            balloon_number: self.balloon_number,
            vendor_no: self.vendor_no,
            packing_disk_no: self.packing_disk_no,
            line: self.line,
            po_no: self.po_no,
            quantity: self.quantity,
            scanned_by: self.scanned_by,
            week,
        })
    }
}

impl InventoryPatch {
    pub fn validate(&self) -> ApiResult<()> {
        if let Some(quantity) = self.quantity {
            check_quantity(quantity).map_err(ApiError::bad_request)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSequenceRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub patch: InventoryPatch,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileRemoveRequest {
    pub packing_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub packing_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ImportSummary<T: Serialize> {
    pub week: String,
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_req(week: &str, part: &str, quantity: i32) -> AddSequenceRequest {
        serde_json::from_value(serde_json::json!({
            "week": week,
            "partNumber": part,
            "buildSequence": 12,
            "vendorNo": 4410,
            "packingDiskNo": 7001,
            "line": "L1",
            "poNo": "PO-1",
            "quantity": quantity,
            "scannedBy": "00XX00"
        }))
        .unwrap()
    }

    #[test]
    fn add_request_trims_and_maps() {
        let item = add_req(" Boa 3 ", " P-1 ", 2).into_new_item().unwrap();
        assert_eq!(item.week, "Boa 3");
        assert_eq!(item.part_number.as_deref(), Some("P-1"));
        assert_eq!(item.packing_disk_no, Some(7001));
        assert!(item.balloon_number.is_none());
    }

    #[test]
    fn add_request_validation() {
        assert!(matches!(add_req("", "P-1", 1).into_new_item(), Err(ApiError::BadRequest(_))));
        assert!(matches!(add_req("W", " ", 1).into_new_item(), Err(ApiError::BadRequest(_))));
        assert!(matches!(add_req("W", "P-1", -1).into_new_item(), Err(ApiError::BadRequest(_))));
        assert!(matches!(
            add_req("W", "P-1", 2_000_000_000).into_new_item(),
            Err(ApiError::BadRequest(m)) if m == "Quantity must not exceed 10000"
        ));
    }

    #[test]
    fn update_request_flattens_patch() {
        let id = Uuid::new_v4();
        let req: UpdateSequenceRequest = serde_json::from_value(serde_json::json!({
            "id": id,
            "quantity": 5,
            "scannedBy": "12AB34"
        }))
        .unwrap();
        assert_eq!(req.id, id);
        assert_eq!(req.patch.quantity, Some(5));
        assert_eq!(req.patch.scanned_by.as_deref(), Some("12AB34"));
        assert!(req.patch.part_number.is_none());
    }

    #[test]
    fn patch_validation_checks_quantity_only_when_present() {
        assert!(InventoryPatch::default().validate().is_ok());

        let patch = InventoryPatch { quantity: Some(0), ..Default::default() };
        assert!(patch.validate().is_ok());

        let patch = InventoryPatch { quantity: Some(-3), ..Default::default() };
        assert!(matches!(
            patch.validate(),
            Err(ApiError::BadRequest(m)) if m == "Quantity must not be negative"
        ));

        let patch = InventoryPatch { quantity: Some(i32::MAX), ..Default::default() };
        assert!(matches!(patch.validate(), Err(ApiError::BadRequest(_))));
    }
}
