//! XLSX exports of inventory items.

use rust_xlsxwriter::{Format, Workbook};
use time::{macros::format_description, OffsetDateTime, UtcOffset};

use super::repo_types::InventoryItem;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const MAX_SHEET_NAME: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    PartNumber,
    BuildSequence,
    BalloonNumber,
    Quantity,
    PoNo,
    VendorNo,
    PackingDiskNo,
    Line,
    ScannedBy,
    UpdatedAt,
}

/// Full dump layout, keyed by id.
pub const ALL_COLUMNS: &[Column] = &[
    Column::Id,
    Column::PartNumber,
    Column::BuildSequence,
    Column::BalloonNumber,
    Column::Quantity,
    Column::PoNo,
    Column::VendorNo,
    Column::PackingDiskNo,
    Column::Line,
    Column::ScannedBy,
];

/// Per-week layout, with the last scan time.
pub const WEEK_COLUMNS: &[Column] = &[
    Column::PartNumber,
    Column::BuildSequence,
    Column::BalloonNumber,
    Column::Quantity,
    Column::PoNo,
    Column::VendorNo,
    Column::PackingDiskNo,
    Column::Line,
    Column::ScannedBy,
    Column::UpdatedAt,
];

enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::PartNumber => "Part Number",
            Column::BuildSequence => "Build Sequence",
            Column::BalloonNumber => "Balloon Number",
            Column::Quantity => "Quantity",
            Column::PoNo => "Po. No.",
            Column::VendorNo => "Vendor No.",
            Column::PackingDiskNo => "Packing Disk No.",
            Column::Line => "Line",
            Column::ScannedBy => "Scanned By",
            Column::UpdatedAt => "Updated At",
        }
    }

    fn width(&self) -> f64 {
        match self {
            Column::Id => 38.0,
            Column::Quantity | Column::Line => 10.0,
            Column::ScannedBy => 12.0,
            Column::UpdatedAt => 20.0,
            _ => 15.0,
        }
    }

    fn cell(&self, item: &InventoryItem) -> Cell {
        let text = |v: &Option<String>| v.clone().map(Cell::Text).unwrap_or(Cell::Empty);
        let num = |v: Option<i64>| v.map(|n| Cell::Number(n as f64)).unwrap_or(Cell::Empty);
        match self {
            Column::Id => Cell::Text(item.id.to_string()),
            Column::PartNumber => text(&item.part_number),
            Column::BuildSequence => num(item.build_sequence),
            Column::BalloonNumber => text(&item.balloon_number),
            Column::Quantity => Cell::Number(f64::from(item.quantity)),
            Column::PoNo => text(&item.po_no),
            Column::VendorNo => num(item.vendor_no),
            Column::PackingDiskNo => num(item.packing_disk_no),
            Column::Line => text(&item.line),
            Column::ScannedBy => text(&item.scanned_by),
            Column::UpdatedAt => format_timestamp(item.updated_at)
                .map(Cell::Text)
                .unwrap_or(Cell::Empty),
        }
    }
}

/// `dd/mm/yyyy hh:mm UTC`, whatever offset `ts` carries.
pub(crate) fn format_timestamp(ts: OffsetDateTime) -> Option<String> {
    ts.to_offset(UtcOffset::UTC)
        .format(format_description!("[day]/[month]/[year] [hour]:[minute] UTC"))
        .ok()
}

/// Render `items` into a single-sheet workbook.
pub fn build_workbook(
    sheet: &str,
    columns: &[Column],
    items: &[InventoryItem],
) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(sheet))?;

    for (c, column) in columns.iter().enumerate() {
        let c = c as u16;
        worksheet.set_column_width(c, column.width())?;
        worksheet.write_string_with_format(0, c, column.header(), &header)?;
    }

    for (r, item) in items.iter().enumerate() {
        let row = (r + 1) as u32;
        for (c, column) in columns.iter().enumerate() {
            let c = c as u16;
            match column.cell(item) {
                Cell::Text(s) => {
                    worksheet.write_string(row, c, s)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row, c, n)?;
                }
                Cell::Empty => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Excel sheet names: at most 31 chars, none of `[]:*?/\`, no edge apostrophes.
pub fn sheet_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'').trim().to_string();

    if cleaned.is_empty() {
        "Sheet1".into()
    } else if cleaned.eq_ignore_ascii_case("history") {
        format!("{cleaned} ")
    } else {
        cleaned
    }
}

/// `Content-Disposition` value for a download named `<stem>.xlsx`.
pub fn attachment_disposition(stem: &str) -> String {
    let safe: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() || c == ' ' {
                if c == '"' || c == '\\' {
                    '_'
                } else {
                    c
                }
            } else {
                '_'
            }
        })
        .collect();
    let safe = if safe.trim().is_empty() { "export".to_string() } else { safe };
    format!("attachment; filename=\"{safe}.xlsx\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::services::tests::item;

    #[test]
    fn workbook_is_a_zip_container() {
        let items = vec![item("P-1", 3, "Week 1"), item("P-2", 0, "Week 1")];
        let bytes = build_workbook("Week 1", WEEK_COLUMNS, &items).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let empty = build_workbook("TMP-Inventory", ALL_COLUMNS, &[]).unwrap();
        assert!(empty.starts_with(b"PK"));
    }

    #[test]
    fn workbook_accepts_unsafe_week_labels() {
        let bytes = build_workbook("Week 3/4: [Boa]?", WEEK_COLUMNS, &[]).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn sheet_name_sanitizes() {
        assert_eq!(sheet_name("Viper & Boa"), "Viper & Boa");
        assert_eq!(sheet_name("Week 3/4: [Boa]?"), "Week 34 Boa");
        assert_eq!(sheet_name("'quoted'"), "quoted");
        assert_eq!(sheet_name("   "), "Sheet1");
        assert_eq!(sheet_name(&"x".repeat(40)).chars().count(), 31);
    }

    #[test]
    fn disposition_quotes_and_strips() {
        assert_eq!(
            attachment_disposition("Viper & Boa"),
            "attachment; filename=\"Viper & Boa.xlsx\""
        );
        assert_eq!(
            attachment_disposition("semana \"9\"ñ"),
            "attachment; filename=\"semana _9__.xlsx\""
        );
        assert_eq!(attachment_disposition(""), "attachment; filename=\"export.xlsx\"");
    }

    #[test]
    fn timestamps_are_rendered_in_utc() {
        let ts = time::macros::datetime!(2024-03-07 08:05 UTC);
        assert_eq!(format_timestamp(ts).as_deref(), Some("07/03/2024 08:05 UTC"));

        let local = time::macros::datetime!(2024-03-07 01:05 -07:00);
        assert_eq!(format_timestamp(local).as_deref(), Some("07/03/2024 08:05 UTC"));
    }

    #[test]
    fn columns_layouts() {
        assert_eq!(ALL_COLUMNS[0].header(), "ID");
        assert!(!ALL_COLUMNS.contains(&Column::UpdatedAt));
        assert_eq!(WEEK_COLUMNS.last().unwrap().header(), "Updated At");
        assert!(!WEEK_COLUMNS.contains(&Column::Id));
    }
}
