//! Parsing of uploaded XLSX scan sheets.
//!
//! The first worksheet is read; its first row is a header and every following
//! row is `part number, build sequence, balloon number, quantity, po no,
//! vendor no, packing disk no, line`. Blank, zero and empty-string cells are
//! treated as missing. A quantity outside `0..=MAX_QUANTITY` rejects the
//! whole sheet.

use std::io::Cursor;

use anyhow::Context;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use super::repo_types::{check_quantity, NewInventoryItem};

/// Week label for an uploaded file: its name up to the first dot.
pub fn week_from_filename(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    base.split('.').next().unwrap_or(base).trim().to_string()
}

/// Parse a workbook into insert payloads for `week`. Rows with no cells at all are skipped.
/// Errors name the offending 1-based sheet row.
pub fn parse_workbook(bytes: &[u8], week: &str) -> anyhow::Result<Vec<NewInventoryItem>> {
    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(Cursor::new(bytes)).context("open xlsx workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no sheets")?
        .context("read first sheet")?;

    range
        .rows()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| row.iter().any(|c| cell_text(c).is_some()))
        .map(|(i, row)| -> anyhow::Result<NewInventoryItem> {
            let item = parse_row(row, week);
            check_quantity(item.quantity)
                .map_err(|e| anyhow::anyhow!("row {}: {e}", i + 1))?;
            Ok(item)
        })
        .collect()
}

fn parse_row(row: &[Data], week: &str) -> NewInventoryItem {
    let at = |i: usize| row.get(i).unwrap_or(&Data::Empty);
    NewInventoryItem {
        part_number: cell_text(at(0)),
        build_sequence: cell_int(at(1)),
        balloon_number: cell_text(at(2)),
        quantity: cell_int(at(3))
            .map(|q| q.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
            .unwrap_or(0),
        po_no: cell_text(at(4)),
        vendor_no: cell_int(at(5)),
        packing_disk_no: cell_int(at(6)),
        line: cell_text(at(7)),
        scanned_by: None,
        week: week.to_string(),
    }
}

/// Text content of a cell; integral floats lose their `.0`.
fn cell_text(cell: &Data) -> Option<String> {
    let s = match cell {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(0) => return None,
        Data::Int(n) => n.to_string(),
        Data::Float(f) if *f == 0.0 => return None,
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(true) => "true".into(),
        Data::DateTime(d) => d.as_f64().to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

fn cell_int(cell: &Data) -> Option<i64> {
    let n = match cell {
        Data::Int(n) => *n,
        Data::Float(f) if f.is_finite() => f.trunc() as i64,
        Data::String(s) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(n) => n,
                Err(_) => s.parse::<f64>().ok().filter(|f| f.is_finite())?.trunc() as i64,
            }
        }
        _ => return None,
    };
    (n != 0).then_some(n)
}
