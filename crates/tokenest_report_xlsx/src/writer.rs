//! Sheet/document seams, the table renderer, and the XLSX-backed writer.

use std::path::PathBuf;

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde_json::Value;
use tracing::{debug, info};

use crate::chart::derive_rust_xlsx_chart;
use crate::spec::{
    EnumCellStyle, EnumCellValue, ReportError, SpecCellFormat, SpecChart, SpecReportFormats,
    SpecTableRegion,
};
use crate::util::{
    cast_col_num, cast_row_num, classify_numeric, classify_percentage, derive_opaque_text,
};

////////////////////////////////////////////////////////////////////////////////
// #region Sinks

/// Write target for one sheet.
pub trait SheetSink {
    /// Final name of this sheet.
    fn name(&self) -> &str;
    /// Write a text cell.
    fn write_string(
        &mut self,
        row: u32,
        col: u16,
        text: &str,
        style: EnumCellStyle,
    ) -> Result<(), ReportError>;
    /// Write a numeric cell.
    fn write_number(
        &mut self,
        row: u32,
        col: u16,
        value: f64,
        style: EnumCellStyle,
    ) -> Result<(), ReportError>;
    /// Write a boolean cell.
    fn write_boolean(
        &mut self,
        row: u32,
        col: u16,
        value: bool,
        style: EnumCellStyle,
    ) -> Result<(), ReportError>;
    /// Write a formatted blank cell.
    fn write_blank(&mut self, row: u32, col: u16, style: EnumCellStyle)
    -> Result<(), ReportError>;
    /// Set one column width in character units.
    fn set_column_width(&mut self, col: u16, width: f64) -> Result<(), ReportError>;
    /// Freeze rows above `row` and columns left of `col`.
    fn set_freeze_panes(&mut self, row: u32, col: u16) -> Result<(), ReportError>;
    /// Place a chart on this sheet.
    fn insert_chart(&mut self, chart: &SpecChart) -> Result<(), ReportError>;
}

/// Ordered collection of sheets under construction.
pub trait DocumentSink {
    /// Sheet type produced by this document.
    type Sheet: SheetSink;

    /// Create a detached sheet; `name` must already be sanitized and unique.
    fn create_sheet(&mut self, name: &str) -> Result<Self::Sheet, ReportError>;
    /// Append a populated sheet to the document.
    fn push_sheet(&mut self, sheet: Self::Sheet) -> Result<(), ReportError>;
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TableRenderer

/// Write `header` plus `rows` with the header at `(row_start, col_start)`.
///
/// Exactly `header.len()` columns are written per row: missing cells become
/// blanks, surplus cells are ignored. Columns in `cols_idx_percent` are read
/// as percentages. Values that do not classify as numbers are written as
/// they appear in the payload.
pub fn write_table<S: SheetSink>(
    sheet: &mut S,
    row_start: u32,
    col_start: u16,
    header: &[String],
    rows: &[Vec<Value>],
    cols_idx_percent: &[usize],
) -> Result<SpecTableRegion, ReportError> {
    let n_cols = cast_col_num(header.len())?;
    let n_rows_data = cast_row_num(rows.len())?;
    row_start
        .checked_add(n_rows_data)
        .ok_or_else(|| ReportError::GridOverflow(format!("table rows {row_start}+{n_rows_data}")))?;
    col_start
        .checked_add(n_cols)
        .ok_or_else(|| ReportError::GridOverflow(format!("table columns {col_start}+{n_cols}")))?;

    for (n_idx_col, label) in header.iter().enumerate() {
        let col = col_start + cast_col_num(n_idx_col)?;
        sheet.write_string(row_start, col, label, EnumCellStyle::Header)?;
    }

    let value_missing = Value::Null;
    for (n_idx_row, row_values) in rows.iter().enumerate() {
        let row = row_start + 1 + cast_row_num(n_idx_row)?;
        for n_idx_col in 0..header.len() {
            let col = col_start + cast_col_num(n_idx_col)?;
            let value_raw = row_values.get(n_idx_col).unwrap_or(&value_missing);
            write_table_cell(
                sheet,
                row,
                col,
                value_raw,
                cols_idx_percent.contains(&n_idx_col),
            )?;
        }
    }

    debug!(
        sheet = sheet.name(),
        row_start,
        n_rows = rows.len(),
        n_cols = header.len(),
        "table written"
    );

    Ok(SpecTableRegion {
        row_header: row_start,
        col_start,
        n_rows_data,
        n_cols,
    })
}

fn write_table_cell<S: SheetSink>(
    sheet: &mut S,
    row: u32,
    col: u16,
    value_raw: &Value,
    if_is_percent_col: bool,
) -> Result<(), ReportError> {
    let value = if if_is_percent_col {
        classify_percentage(value_raw)
    } else {
        classify_numeric(value_raw)
    };

    match value {
        EnumCellValue::Fraction(n_val) => {
            sheet.write_number(row, col, n_val, EnumCellStyle::Percent)
        }
        EnumCellValue::Integer(n_val) => {
            sheet.write_number(row, col, n_val as f64, EnumCellStyle::Default)
        }
        EnumCellValue::Float(n_val) => sheet.write_number(row, col, n_val, EnumCellStyle::Default),
        EnumCellValue::Opaque(value) => write_opaque_cell(sheet, row, col, &value),
    }
}

/// Write a raw payload value without interpreting it.
pub fn write_opaque_cell<S: SheetSink>(
    sheet: &mut S,
    row: u32,
    col: u16,
    value: &Value,
) -> Result<(), ReportError> {
    match value {
        Value::Bool(val) => sheet.write_boolean(row, col, *val, EnumCellStyle::Default),
        Value::Number(num) => match num.as_f64() {
            Some(n_val) if n_val.is_finite() => {
                sheet.write_number(row, col, n_val, EnumCellStyle::Default)
            }
            _ => sheet.write_string(row, col, &num.to_string(), EnumCellStyle::Default),
        },
        _ => match derive_opaque_text(value) {
            Some(text) => sheet.write_string(row, col, &text, EnumCellStyle::Default),
            None => sheet.write_blank(row, col, EnumCellStyle::Default),
        },
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region XlsxWriter

/// Formats resolved once per writer.
#[derive(Debug, Clone)]
struct SpecXlsxFormats {
    fmt_title: Format,
    fmt_header: Format,
    fmt_default: Format,
    fmt_percent: Format,
}

impl SpecXlsxFormats {
    fn new(formats: &SpecReportFormats) -> Self {
        Self {
            fmt_title: derive_rust_xlsx_format(&formats.title),
            fmt_header: derive_rust_xlsx_format(&formats.header),
            fmt_default: derive_rust_xlsx_format(&formats.default),
            fmt_percent: derive_rust_xlsx_format(&formats.percent),
        }
    }

    fn get(&self, style: EnumCellStyle) -> &Format {
        match style {
            EnumCellStyle::Title => &self.fmt_title,
            EnumCellStyle::Header => &self.fmt_header,
            EnumCellStyle::Default => &self.fmt_default,
            EnumCellStyle::Percent => &self.fmt_percent,
        }
    }
}

/// One `rust_xlsxwriter` worksheet plus the writer's formats.
pub struct XlsxSheet {
    name: String,
    worksheet: Worksheet,
    formats: SpecXlsxFormats,
}

impl SheetSink for XlsxSheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_string(
        &mut self,
        row: u32,
        col: u16,
        text: &str,
        style: EnumCellStyle,
    ) -> Result<(), ReportError> {
        self.worksheet
            .write_string_with_format(row, col, text, self.formats.get(style))?;
        Ok(())
    }

    fn write_number(
        &mut self,
        row: u32,
        col: u16,
        value: f64,
        style: EnumCellStyle,
    ) -> Result<(), ReportError> {
        self.worksheet
            .write_number_with_format(row, col, value, self.formats.get(style))?;
        Ok(())
    }

    fn write_boolean(
        &mut self,
        row: u32,
        col: u16,
        value: bool,
        style: EnumCellStyle,
    ) -> Result<(), ReportError> {
        self.worksheet
            .write_boolean_with_format(row, col, value, self.formats.get(style))?;
        Ok(())
    }

    fn write_blank(
        &mut self,
        row: u32,
        col: u16,
        style: EnumCellStyle,
    ) -> Result<(), ReportError> {
        self.worksheet.write_blank(row, col, self.formats.get(style))?;
        Ok(())
    }

    fn set_column_width(&mut self, col: u16, width: f64) -> Result<(), ReportError> {
        self.worksheet.set_column_width(col, width)?;
        Ok(())
    }

    fn set_freeze_panes(&mut self, row: u32, col: u16) -> Result<(), ReportError> {
        self.worksheet.set_freeze_panes(row, col)?;
        Ok(())
    }

    fn insert_chart(&mut self, chart: &SpecChart) -> Result<(), ReportError> {
        let chart_xlsx = derive_rust_xlsx_chart(chart);
        self.worksheet
            .insert_chart(chart.row_anchor, chart.col_anchor, &chart_xlsx)?;
        Ok(())
    }
}

/// Stateful workbook writer.
///
/// The workbook is buffered in memory; nothing touches the filesystem until
/// [`Self::close`] is called.
pub struct XlsxReportWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    formats: SpecXlsxFormats,
    cnt_sheets: usize,
    if_closed: bool,
}

impl XlsxReportWriter {
    /// Create writer bound to output path and format presets.
    pub fn new(path_file_out: PathBuf, formats: &SpecReportFormats) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            formats: SpecXlsxFormats::new(formats),
            cnt_sheets: 0,
            if_closed: false,
        }
    }

    /// Number of sheets pushed so far.
    pub fn sheet_count(&self) -> usize {
        self.cnt_sheets
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), ReportError> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook.save(&self.path_file_out)?;
        self.if_closed = true;
        info!(
            path = %self.path_file_out.display(),
            sheets = self.cnt_sheets,
            "workbook saved"
        );
        Ok(())
    }

    /// Serialize the workbook without touching the filesystem.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, ReportError> {
        Ok(self.workbook.save_to_buffer()?)
    }

    fn ensure_open(&self) -> Result<(), ReportError> {
        if self.if_closed {
            return Err(ReportError::WriterClosed);
        }
        Ok(())
    }
}

impl DocumentSink for XlsxReportWriter {
    type Sheet = XlsxSheet;

    fn create_sheet(&mut self, name: &str) -> Result<XlsxSheet, ReportError> {
        self.ensure_open()?;
        let mut worksheet = Worksheet::new();
        worksheet.set_name(name)?;
        Ok(XlsxSheet {
            name: name.to_string(),
            worksheet,
            formats: self.formats.clone(),
        })
    }

    fn push_sheet(&mut self, sheet: XlsxSheet) -> Result<(), ReportError> {
        self.ensure_open()?;
        self.workbook.push_worksheet(sheet.worksheet);
        self.cnt_sheets += 1;
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatConversion

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }

    format
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::memory::{EnumMemoryCell, MemoryDocument};
    use crate::spec::SpecReportOptions;

    fn derive_header(labels: &[&str]) -> Vec<String> {
        labels.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_write_table_touches_exact_rectangle() {
        let mut document = MemoryDocument::new();
        let mut sheet = document.create_sheet("T").unwrap();
        let header = derive_header(&["A", "B", "C"]);
        let rows = vec![
            vec![json!("x"), json!("1"), json!("2%")],
            vec![json!("y")],
            vec![json!("z"), json!("3"), json!("4%"), json!("surplus")],
        ];

        let region = write_table(&mut sheet, 2, 1, &header, &rows, &[2]).unwrap();

        assert_eq!(region.row_header, 2);
        assert_eq!(region.n_rows_data, 3);
        assert_eq!(region.n_cols, 3);
        assert_eq!(sheet.cells.len(), 4 * 3);
        for (row, col) in sheet.cells.keys() {
            assert!((2..=5).contains(row));
            assert!((1..=3).contains(col));
        }
        assert_eq!(
            sheet.cells.get(&(4, 1)),
            Some(&EnumMemoryCell::Text {
                text: "y".to_string(),
                style: EnumCellStyle::Default
            })
        );
        assert_eq!(
            sheet.cells.get(&(4, 3)),
            Some(&EnumMemoryCell::Blank {
                style: EnumCellStyle::Default
            })
        );
    }

    #[test]
    fn test_write_table_header_row_is_styled() {
        let mut document = MemoryDocument::new();
        let mut sheet = document.create_sheet("T").unwrap();
        let header = derive_header(&["Metric", "Value"]);
        write_table(&mut sheet, 0, 0, &header, &[], &[]).unwrap();

        assert_eq!(
            sheet.cells.get(&(0, 1)),
            Some(&EnumMemoryCell::Text {
                text: "Value".to_string(),
                style: EnumCellStyle::Header
            })
        );
        assert_eq!(sheet.cells.len(), 2);
    }

    #[test]
    fn test_write_table_classifies_by_column_role() {
        let mut document = MemoryDocument::new();
        let mut sheet = document.create_sheet("T").unwrap();
        let header = derive_header(&["Metric", "Value", "Dev%"]);
        let rows = vec![
            vec![json!("a"), json!("10"), json!("5%")],
            vec![json!("b"), json!("n/a"), json!("-")],
        ];

        write_table(&mut sheet, 0, 0, &header, &rows, &[2]).unwrap();

        assert_eq!(
            sheet.cells.get(&(1, 0)),
            Some(&EnumMemoryCell::Text {
                text: "a".to_string(),
                style: EnumCellStyle::Default
            })
        );
        assert_eq!(
            sheet.cells.get(&(1, 1)),
            Some(&EnumMemoryCell::Number {
                value: 10.0,
                style: EnumCellStyle::Default
            })
        );
        let Some(EnumMemoryCell::Number {
            value: n_dev,
            style: EnumCellStyle::Percent,
        }) = sheet.cells.get(&(1, 2))
        else {
            panic!("expected percent number");
        };
        assert!((n_dev - 0.05).abs() < 1e-12);

        assert_eq!(
            sheet.cells.get(&(2, 1)),
            Some(&EnumMemoryCell::Text {
                text: "n/a".to_string(),
                style: EnumCellStyle::Default
            })
        );
        assert_eq!(
            sheet.cells.get(&(2, 2)),
            Some(&EnumMemoryCell::Text {
                text: "-".to_string(),
                style: EnumCellStyle::Default
            })
        );
    }

    #[test]
    fn test_write_opaque_cell_variants() {
        let mut document = MemoryDocument::new();
        let mut sheet = document.create_sheet("T").unwrap();

        write_opaque_cell(&mut sheet, 0, 0, &json!(true)).unwrap();
        write_opaque_cell(&mut sheet, 0, 1, &json!(null)).unwrap();
        write_opaque_cell(&mut sheet, 0, 2, &json!({"k": 1})).unwrap();
        write_opaque_cell(&mut sheet, 0, 3, &json!(2.5)).unwrap();

        assert_eq!(
            sheet.cells.get(&(0, 0)),
            Some(&EnumMemoryCell::Boolean {
                value: true,
                style: EnumCellStyle::Default
            })
        );
        assert_eq!(
            sheet.cells.get(&(0, 1)),
            Some(&EnumMemoryCell::Blank {
                style: EnumCellStyle::Default
            })
        );
        assert_eq!(
            sheet.cells.get(&(0, 2)),
            Some(&EnumMemoryCell::Text {
                text: r#"{"k":1}"#.to_string(),
                style: EnumCellStyle::Default
            })
        );
        assert_eq!(
            sheet.cells.get(&(0, 3)),
            Some(&EnumMemoryCell::Number {
                value: 2.5,
                style: EnumCellStyle::Default
            })
        );
    }

    #[test]
    fn test_xlsx_writer_close_is_idempotent_and_blocks_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path_file_out = dir.path().join("out.xlsx");
        let mut writer =
            XlsxReportWriter::new(path_file_out.clone(), &SpecReportFormats::default());

        let mut sheet = writer.create_sheet("Data").unwrap();
        sheet.write_string(0, 0, "hello", EnumCellStyle::Title).unwrap();
        writer.push_sheet(sheet).unwrap();
        assert_eq!(writer.sheet_count(), 1);
        assert!(!path_file_out.exists());

        writer.close().unwrap();
        assert!(path_file_out.exists());
        writer.close().unwrap();

        assert!(matches!(
            writer.create_sheet("More"),
            Err(ReportError::WriterClosed)
        ));
    }

    #[test]
    fn test_xlsx_writer_save_to_buffer_produces_zip() {
        let mut writer =
            XlsxReportWriter::new(PathBuf::from("unused.xlsx"), &SpecReportFormats::default());
        let mut sheet = writer.create_sheet("Data").unwrap();
        let header = derive_header(&["A"]);
        write_table(&mut sheet, 0, 0, &header, &[vec![json!("1")]], &[]).unwrap();
        writer.push_sheet(sheet).unwrap();

        let buf = writer.save_to_buffer().unwrap();
        assert!(buf.starts_with(b"PK"));
        assert!(!PathBuf::from("unused.xlsx").exists());
    }

    #[test]
    fn test_xlsx_writer_rejects_invalid_sheet_name() {
        let mut writer =
            XlsxReportWriter::new(PathBuf::from("unused.xlsx"), &SpecReportFormats::default());
        assert!(matches!(
            writer.create_sheet("bad[name]"),
            Err(ReportError::Xlsx(_))
        ));
    }

    #[test]
    fn test_default_presets_convert_to_rust_xlsx_formats() {
        let formats = SpecXlsxFormats::new(&SpecReportFormats::default());

        assert_eq!(
            formats.get(EnumCellStyle::Title),
            &Format::new().set_font_size(14.0).set_bold()
        );
        assert_eq!(
            formats.get(EnumCellStyle::Header),
            &Format::new().set_bold().set_background_color("#E6EEF7")
        );
        assert_eq!(
            formats.get(EnumCellStyle::Percent),
            &Format::new().set_num_format("0.00%")
        );
        assert_eq!(formats.get(EnumCellStyle::Default), &Format::new());
    }

    #[test]
    fn test_custom_presets_flow_through_report_options() {
        let mut options = SpecReportOptions::default();
        options.formats.percent = options.formats.percent.with_(SpecCellFormat {
            num_format: Some("0.0%".to_string()),
            bold: Some(true),
            ..Default::default()
        });
        options.formats.title = SpecCellFormat {
            font_size: Some(18),
            ..Default::default()
        };

        let formats = SpecXlsxFormats::new(&options.formats);

        assert_eq!(
            formats.get(EnumCellStyle::Percent),
            &Format::new().set_bold().set_num_format("0.0%")
        );
        assert_eq!(
            formats.get(EnumCellStyle::Title),
            &Format::new().set_font_size(18.0)
        );
    }
}
