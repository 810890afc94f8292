//! Spreadsheet rendering.
//!
//! Layout (spreadsheet rows, zero-based):
//!   0    merged title cell spanning every column
//!   1    merged "Report generated on: ..." cell
//!   2-3  spacer
//!   4    header row from the column schema
//!   5..  one row per report row, every cell bordered
//!
//! Unlike the PDF renderer there is no row cap; the workbook carries the
//! whole report.

use chrono::Utc;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

use crate::models::time;
use crate::services::report::Report;
use crate::services::RenderError;

const HEADER_ROW: u32 = 4;
const HEADER_FILL: Color = Color::RGB(0xD3D3D3);

/// Render the report to `.xlsx` bytes.
///
/// The workbook is written through a scoped temp file; the file is removed
/// when the guard drops, success or not.
pub fn render_excel(report: &Report) -> Result<Vec<u8>, RenderError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    let title_format = Format::new()
        .set_bold()
        .set_font_size(16)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let generated_format = Format::new().set_italic();
    let header_format = Format::new()
        .set_bold()
        .set_background_color(HEADER_FILL)
        .set_border(FormatBorder::Thin);
    let cell_format = Format::new().set_border(FormatBorder::Thin);

    // Every report type has at least three columns, so the merges are valid.
    let last_col = (report.columns.len() - 1) as u16;
    sheet.merge_range(0, 0, 0, last_col, &report.title, &title_format)?;
    let generated = format!("Report generated on: {}", time::format_report(Utc::now()));
    sheet.merge_range(1, 0, 1, last_col, &generated, &generated_format)?;

    for (index, column) in report.columns.iter().enumerate() {
        let col = index as u16;
        sheet.write_string_with_format(HEADER_ROW, col, column.header, &header_format)?;
        sheet.set_column_width(col, column.width)?;
    }

    for (index, row) in report.rows.iter().enumerate() {
        let sheet_row = HEADER_ROW + 1 + index as u32;
        for (col_index, column) in report.columns.iter().enumerate() {
            let col = col_index as u16;
            if column.key == "id" {
                sheet.write_number_with_format(sheet_row, col, row.id as f64, &cell_format)?;
            } else {
                let text = Report::cell_text(row, column.key).unwrap_or_default();
                sheet.write_string_with_format(sheet_row, col, &text, &cell_format)?;
            }
        }
    }

    let file = tempfile::NamedTempFile::new()?;
    workbook.save(file.path())?;
    Ok(std::fs::read(file.path())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::parse_bound;
    use crate::services::report::ReportType;
    use crate::services::series::{MetricValues, ReportRow};

    fn sample_report(rows: usize) -> Report {
        let report_type = ReportType::All;
        Report {
            report_type,
            title: report_type.title().to_string(),
            columns: report_type.columns(),
            rows: (0..rows)
                .map(|i| ReportRow {
                    id: i as i64 + 1,
                    created_at: parse_bound("2024-06-10 12:00:00").unwrap(),
                    values: MetricValues {
                        laeq: Some("52.00".to_string()),
                        ..MetricValues::default()
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn renders_a_nonempty_xlsx_package() {
        let bytes = render_excel(&sample_report(3)).unwrap();
        // An xlsx file is a zip archive; check the magic bytes.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn renders_even_an_empty_report() {
        let bytes = render_excel(&sample_report(0)).unwrap();
        assert!(!bytes.is_empty());
    }
}
