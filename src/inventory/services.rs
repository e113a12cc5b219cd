use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::warn;

use super::repo_types::{InventoryItem, MAX_QUANTITY};

/// Items of one week as shown in a week tab.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekGroup {
    pub week: String,
    pub count: usize,
    pub total_quantity: i64,
    pub items: Vec<InventoryItem>,
}

/// One part of a packing list: the first matching item plus its unit rows.
#[derive(Debug, Serialize)]
pub struct PackingEntry {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub parts: Vec<InventoryItem>,
}

/// Split an item into one row per unit. Quantities of 0 or 1 stay a single row.
/// At most `MAX_QUANTITY` rows are produced per item.
pub fn expand_units(item: &InventoryItem) -> Vec<InventoryItem> {
    if item.quantity > 1 {
        if item.quantity > MAX_QUANTITY {
            warn!(
                item_id = %item.id,
                quantity = item.quantity,
                "quantity over limit; expansion capped"
            );
        }
        (0..item.quantity.min(MAX_QUANTITY))
            .map(|_| InventoryItem {
                quantity: 1,
                ..item.clone()
            })
            .collect()
    } else {
        vec![item.clone()]
    }
}

/// Group items by week label, weeks in ascending order, item order preserved.
pub fn group_by_week(items: Vec<InventoryItem>) -> Vec<WeekGroup> {
    let mut weeks: BTreeMap<String, Vec<InventoryItem>> = BTreeMap::new();
    for item in items {
        weeks.entry(item.week.clone()).or_default().push(item);
    }
    weeks
        .into_iter()
        .map(|(week, items)| WeekGroup {
            count: items.len(),
            total_quantity: items.iter().map(|i| i64::from(i.quantity)).sum(),
            week,
            items,
        })
        .collect()
}

/// Build the mobile packing list: one entry per part number in first-seen order,
/// skipping parts whose first item has nothing left to scan.
pub fn build_packing_list(items: Vec<InventoryItem>) -> Vec<PackingEntry> {
    let mut order: Vec<Vec<InventoryItem>> = Vec::new();
    let mut index: HashMap<Option<String>, usize> = HashMap::new();

    for item in items {
        match index.get(&item.part_number) {
            Some(&i) => order[i].push(item),
            None => {
                index.insert(item.part_number.clone(), order.len());
                order.push(vec![item]);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|group| {
            let first = group.first()?.clone();
            if first.quantity <= 0 {
                return None;
            }
            let parts = group.iter().flat_map(expand_units).collect();
            Some(PackingEntry { item: first, parts })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    pub(crate) fn item(part: &str, quantity: i32, week: &str) -> InventoryItem {
        let now = OffsetDateTime::now_utc();
        InventoryItem {
            id: Uuid::new_v4(),
            part_number: Some(part.to_string()),
            build_sequence: Some(101),
            balloon_number: Some("B7".into()),
            vendor_no: Some(4410),
            packing_disk_no: Some(7001),
            line: Some("L2".into()),
            po_no: Some("PO-88".into()),
            quantity,
            scanned_by: None,
            week: week.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn expand_units_splits_quantity() {
        let rows = expand_units(&item("P-1", 3, "W1"));
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.quantity == 1 && r.part_number.as_deref() == Some("P-1")));
    }

    #[test]
    fn expand_units_keeps_small_quantities_as_is() {
        assert_eq!(expand_units(&item("P-1", 1, "W1"))[0].quantity, 1);
        let zero = expand_units(&item("P-1", 0, "W1"));
        assert_eq!(zero.len(), 1);
        assert_eq!(zero[0].quantity, 0);
    }

    #[test]
    fn expand_units_is_capped() {
        let rows = expand_units(&item("P-1", i32::MAX, "W1"));
        assert_eq!(rows.len(), MAX_QUANTITY as usize);
        assert!(rows.iter().all(|r| r.quantity == 1));
    }

    #[test]
    fn group_by_week_sorts_weeks_and_sums() {
        let groups = group_by_week(vec![
            item("A", 2, "Week 9"),
            item("B", 1, "Boa 3"),
            item("C", 4, "Week 9"),
        ]);
        let weeks: Vec<_> = groups.iter().map(|g| g.week.as_str()).collect();
        assert_eq!(weeks, ["Boa 3", "Week 9"]);
        assert_eq!(groups[1].count, 2);
        assert_eq!(groups[1].total_quantity, 6);
        assert_eq!(groups[1].items[0].part_number.as_deref(), Some("A"));
    }

    #[test]
    fn packing_list_groups_by_part_in_first_seen_order() {
        let list = build_packing_list(vec![
            item("B", 2, "W"),
            item("A", 1, "W"),
            item("B", 1, "W"),
        ]);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].item.part_number.as_deref(), Some("B"));
        assert_eq!(list[0].parts.len(), 3);
        assert_eq!(list[1].item.part_number.as_deref(), Some("A"));
        assert_eq!(list[1].parts.len(), 1);
    }

    #[test]
    fn packing_list_drops_exhausted_parts() {
        let list = build_packing_list(vec![item("A", 0, "W"), item("B", 2, "W")]);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].item.part_number.as_deref(), Some("B"));
    }

    #[test]
    fn packing_entry_flattens_item_fields() {
        let list = build_packing_list(vec![item("A", 2, "W")]);
        let v = serde_json::to_value(&list[0]).unwrap();
        assert_eq!(v["partNumber"], "A");
        assert_eq!(v["quantity"], 2);
        assert_eq!(v["parts"].as_array().unwrap().len(), 2);
    }
}
