//! PDF completion reports for a packing disk.

use std::path::{Path, PathBuf};

use anyhow::Context;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use time::OffsetDateTime;

use super::{export::format_timestamp, repo_types::InventoryItem};

// US Letter, in points.
const PAGE_W_PT: f32 = 612.0;
const PAGE_H_PT: f32 = 792.0;
const MARGIN_BOTTOM_PT: f32 = 60.0;

const PART_X: f32 = 50.0;
const QTY_X: f32 = 300.0;
const TABLE_TOP: f32 = 155.0;
const ROW_H: f32 = 23.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Complete,
    Incomplete,
}

impl ReportKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Complete => "Complete",
            ReportKind::Incomplete => "Incomplete",
        }
    }

    fn dir(&self) -> &'static str {
        match self {
            ReportKind::Complete => "complete",
            ReportKind::Incomplete => "incomplete",
        }
    }
}

#[derive(Debug)]
pub struct PackingReport {
    pub kind: ReportKind,
    pub pdf: Vec<u8>,
}

fn mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

/// Writes text using top-left origin coordinates in points.
struct Page<'a> {
    layer: PdfLayerReference,
    font: &'a IndirectFontRef,
}

impl Page<'_> {
    fn text(&self, s: &str, size: f32, x: f32, y_top: f32) {
        let baseline = PAGE_H_PT - y_top - size;
        self.layer.use_text(s, size, mm(x), mm(baseline), self.font);
    }
}

/// Build the report for `packing`. Items still holding quantity make it incomplete.
pub fn build_report(
    packing: i64,
    items: &[InventoryItem],
    now: OffsetDateTime,
) -> anyhow::Result<PackingReport> {
    let pending: Vec<&InventoryItem> = items.iter().filter(|i| i.quantity > 0).collect();
    let kind = if pending.is_empty() {
        ReportKind::Complete
    } else {
        ReportKind::Incomplete
    };

    let title = format!("Kit {packing} {}", kind.label());
    let (doc, page1, layer1) =
        PdfDocument::new(title.as_str(), mm(PAGE_W_PT), mm(PAGE_H_PT), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .context("load builtin font")?;
    let date = format_timestamp(now).unwrap_or_default();

    let mut page = Page {
        layer: doc.get_page(page1).get_layer(layer1),
        font: &font,
    };

    match kind {
        ReportKind::Complete => {
            page.text(&title, 27.0, 50.0, 70.0);
            page.text(&format!("Date: {date}"), 15.0, 100.0, 100.0);
        }
        ReportKind::Incomplete => {
            page.text(&title, 25.0, 50.0, 70.0);
            page.text("Pending parts to scan:", 25.0, 50.0, 100.0);
            page.text(&format!("Date: {date}"), 17.0, 50.0, 132.0);
            page.text("Part Number:", 15.0, PART_X, TABLE_TOP);
            page.text("Quantity:", 15.0, QTY_X, TABLE_TOP);

            let mut y = TABLE_TOP + ROW_H;
            for item in pending {
                if y + ROW_H > PAGE_H_PT - MARGIN_BOTTOM_PT {
                    let (p, l) = doc.add_page(mm(PAGE_W_PT), mm(PAGE_H_PT), "Layer 1");
                    page = Page {
                        layer: doc.get_page(p).get_layer(l),
                        font: &font,
                    };
                    y = 50.0;
                }
                page.text(item.part_number.as_deref().unwrap_or("-"), 11.0, PART_X, y);
                page.text(&item.quantity.to_string(), 11.0, QTY_X + 20.0, y);
                y += ROW_H;
            }
        }
    }

    let pdf = doc.save_to_bytes().context("render pdf")?;
    Ok(PackingReport { kind, pdf })
}

/// `<dir>/<complete|incomplete>/report-<packing> <Kind>.pdf`
pub fn archive_path(dir: &Path, packing: i64, kind: ReportKind) -> PathBuf {
    dir.join(kind.dir())
        .join(format!("report-{packing} {}.pdf", kind.label()))
}

pub async fn archive(dir: &Path, packing: i64, report: &PackingReport) -> anyhow::Result<PathBuf> {
    let path = archive_path(dir, packing, report.kind);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create {}", parent.display()))?;
    }
    tokio::fs::write(&path, &report.pdf)
        .await
        .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::services::tests::item;

    #[test]
    fn complete_when_nothing_pending() {
        let items = vec![item("P-1", 0, "W"), item("P-2", 0, "W")];
        let report = build_report(7001, &items, OffsetDateTime::now_utc()).unwrap();
        assert_eq!(report.kind, ReportKind::Complete);
        assert!(report.pdf.starts_with(b"%PDF"));

        let none = build_report(7001, &[], OffsetDateTime::now_utc()).unwrap();
        assert_eq!(none.kind, ReportKind::Complete);
    }

    #[test]
    fn incomplete_spans_pages_for_long_lists() {
        let items: Vec<_> = (0..80).map(|i| item(&format!("P-{i}"), 2, "W")).collect();
        let report = build_report(7001, &items, OffsetDateTime::now_utc()).unwrap();
        assert_eq!(report.kind, ReportKind::Incomplete);
        assert!(report.pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn archive_path_layout() {
        let p = archive_path(Path::new("/srv/reports"), 12, ReportKind::Incomplete);
        assert_eq!(p, Path::new("/srv/reports/incomplete/report-12 Incomplete.pdf"));
        let p = archive_path(Path::new("/srv/reports"), 12, ReportKind::Complete);
        assert_eq!(p, Path::new("/srv/reports/complete/report-12 Complete.pdf"));
    }

    #[tokio::test]
    async fn archive_writes_file() {
        let dir = std::env::temp_dir().join(format!("inventory-admin-{}", uuid::Uuid::new_v4()));
        let report = build_report(5, &[], OffsetDateTime::now_utc()).unwrap();
        let path = archive(&dir, 5, &report).await.unwrap();
        let written = tokio::fs::read(&path).await.unwrap();
        assert_eq!(written, report.pdf);
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
