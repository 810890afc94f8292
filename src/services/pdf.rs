//! PDF rendering.
//!
//! Landscape A4, builtin Helvetica, one text run per cell. The PDF is a
//! preview document: it renders at most [`MAX_PDF_ROWS`] data rows and, when
//! the report holds more, appends a footnote naming the shown and total
//! counts. The spreadsheet export is the uncapped format.
//!
//! The renderer consumes the report's column schema as-is; it never derives
//! its own header set.

use chrono::Utc;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::models::time;
use crate::services::report::{Column, Report};
use crate::services::RenderError;

/// Data-row cap for the PDF preview.
pub const MAX_PDF_ROWS: usize = 1000;

const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 15.0;
const TITLE_SIZE: f32 = 16.0;
const HEADER_SIZE: f32 = 9.0;
const BODY_SIZE: f32 = 8.0;
const ROW_STEP: f32 = 5.0;
const PT_TO_MM: f32 = 0.352_778;

/// Footnote lines shown when the report was truncated, `None` otherwise.
fn footnote_lines(shown: usize, total: usize) -> Option<[String; 2]> {
    if total > shown {
        Some([
            format!("Note: Showing first {shown} records only. Total records available: {total}."),
            "Please filter your data or export in smaller chunks for complete results.".to_string(),
        ])
    } else {
        None
    }
}

/// Left edge of each column, distributing the usable width by schema widths.
fn column_positions(columns: &[Column]) -> Vec<f32> {
    let usable = PAGE_WIDTH - 2.0 * MARGIN;
    let total: f64 = columns.iter().map(|c| c.width).sum();
    let mut x = MARGIN;
    columns
        .iter()
        .map(|column| {
            let left = x;
            x += usable * (column.width / total) as f32;
            left
        })
        .collect()
}

fn draw_header(
    layer: &PdfLayerReference,
    columns: &[Column],
    positions: &[f32],
    y: f32,
    font: &IndirectFontRef,
) {
    for (column, x) in columns.iter().zip(positions) {
        layer.use_text(column.header, HEADER_SIZE, Mm(*x), Mm(y), font);
    }
}

/// Render the report to PDF bytes, capped at [`MAX_PDF_ROWS`] rows.
pub fn render_pdf(report: &Report) -> Result<Vec<u8>, RenderError> {
    let total = report.rows.len();
    let shown = total.min(MAX_PDF_ROWS);

    let (doc, page, layer_index) = PdfDocument::new(
        &report.title,
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "report",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    let oblique = doc
        .add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;

    let positions = column_positions(&report.columns);
    let mut layer = doc.get_page(page).get_layer(layer_index);
    let mut y = PAGE_HEIGHT - MARGIN;

    // Rough centering from the average Helvetica glyph width; builtin fonts
    // carry no metrics we can measure against.
    let title_width = report.title.len() as f32 * TITLE_SIZE * 0.5 * PT_TO_MM;
    let title_x = ((PAGE_WIDTH - title_width) / 2.0).max(MARGIN);
    layer.use_text(report.title.clone(), TITLE_SIZE, Mm(title_x), Mm(y), &bold);
    y -= 8.0;

    let generated = format!("Report generated on: {}", time::format_report(Utc::now()));
    layer.use_text(generated, HEADER_SIZE, Mm(MARGIN), Mm(y), &regular);
    y -= 10.0;

    draw_header(&layer, &report.columns, &positions, y, &bold);
    y -= ROW_STEP;

    for row in &report.rows[..shown] {
        if y < MARGIN + ROW_STEP {
            let (next_page, next_layer) =
                doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "report");
            layer = doc.get_page(next_page).get_layer(next_layer);
            y = PAGE_HEIGHT - MARGIN;
            draw_header(&layer, &report.columns, &positions, y, &bold);
            y -= ROW_STEP;
        }
        for (column, x) in report.columns.iter().zip(&positions) {
            if let Some(text) = Report::cell_text(row, column.key) {
                layer.use_text(text, BODY_SIZE, Mm(*x), Mm(y), &regular);
            }
        }
        y -= ROW_STEP;
    }

    if let Some(lines) = footnote_lines(shown, total) {
        if y < MARGIN + 2.0 * ROW_STEP {
            let (next_page, next_layer) =
                doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "report");
            layer = doc.get_page(next_page).get_layer(next_layer);
            y = PAGE_HEIGHT - MARGIN;
        }
        y -= 2.0;
        for line in lines {
            layer.use_text(line, BODY_SIZE, Mm(MARGIN), Mm(y), &oblique);
            y -= 4.0;
        }
    }

    doc.save_to_bytes()
        .map_err(|e| RenderError::Pdf(e.to_string()))
}
