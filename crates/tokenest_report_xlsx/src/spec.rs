//! Shared report specification models and the top-level error type.

use std::fmt;
use std::path::PathBuf;

use rust_xlsxwriter::XlsxError;
use serde_json::Value;
use thiserror::Error;

use crate::conf::{derive_default_chart_geometry, derive_default_report_formats};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification, converted to `rust_xlsxwriter::Format` at write time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
        }
    }
}

/// Role of a written cell; each style maps to one preset in [`SpecReportFormats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumCellStyle {
    /// Sheet title.
    Title,
    /// Table header and section header cells.
    Header,
    /// Plain body cell.
    Default,
    /// Body cell holding a fraction shown as percentage.
    Percent,
}

/// Cell format presets by style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReportFormats {
    /// Sheet title format.
    pub title: SpecCellFormat,
    /// Header format.
    pub header: SpecCellFormat,
    /// Percentage format.
    pub percent: SpecCellFormat,
    /// Body format.
    pub default: SpecCellFormat,
}

impl Default for SpecReportFormats {
    fn default() -> Self {
        derive_default_report_formats()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// Typed representation of one raw payload cell.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Whole number.
    Integer(i64),
    /// Decimal number.
    Float(f64),
    /// Percentage stored as a fraction (`0.12` for `12%`).
    Fraction(f64),
    /// Anything else, kept exactly as it appeared in the payload.
    Opaque(Value),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Chart size and placement policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecChartGeometry {
    /// Chart width in pixels.
    pub width_px: u32,
    /// Chart height in pixels.
    pub height_px: u32,
    /// Column offset between charts of one gallery row.
    pub grid_col_step: u16,
    /// Row offset between gallery rows.
    pub grid_row_step: u32,
    /// Charts per gallery row.
    pub grid_per_row: usize,
    /// Anchor row of inline charts.
    pub inline_row: u32,
    /// Blank columns between a table and its inline chart.
    pub inline_col_margin: u16,
    /// Y-axis number format.
    pub y_axis_num_format: String,
}

impl Default for SpecChartGeometry {
    fn default() -> Self {
        derive_default_chart_geometry()
    }
}

/// Render-wide options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecReportOptions {
    /// Cell formats by style.
    pub formats: SpecReportFormats,
    /// Chart geometry.
    pub chart_geometry: SpecChartGeometry,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ChartSpecification

/// Rectangular cell range on a named sheet (inclusive bounds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecChartRange {
    /// Sheet holding the data.
    pub sheet_name: String,
    /// First row.
    pub row_first: u32,
    /// First column.
    pub col_first: u16,
    /// Last row.
    pub row_last: u32,
    /// Last column.
    pub col_last: u16,
}

/// One single-series column chart and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecChart {
    /// Category axis range.
    pub categories: SpecChartRange,
    /// Value axis range.
    pub values: SpecChartRange,
    /// Series display name.
    pub series_name: String,
    /// Chart title.
    pub title: String,
    /// Anchor row on the host sheet.
    pub row_anchor: u32,
    /// Anchor column on the host sheet.
    pub col_anchor: u16,
    /// Chart width in pixels.
    pub width_px: u32,
    /// Chart height in pixels.
    pub height_px: u32,
    /// Y-axis number format.
    pub y_axis_num_format: String,
    /// Hide the legend.
    pub if_legend_hidden: bool,
}

/// On-sheet coordinates of one rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecTableRegion {
    /// Header row.
    pub row_header: u32,
    /// First column.
    pub col_start: u16,
    /// Number of data rows below the header.
    pub n_rows_data: u32,
    /// Number of columns (header width).
    pub n_cols: u16,
}

impl SpecTableRegion {
    /// First data row.
    pub fn row_data_first(&self) -> u32 {
        self.row_header + 1
    }

    /// Last data row, `None` for a header-only table.
    pub fn row_data_last(&self) -> Option<u32> {
        if self.n_rows_data == 0 {
            None
        } else {
            Some(self.row_header + self.n_rows_data)
        }
    }

    /// Absolute sheet column of a table-relative column index.
    pub fn col_abs(&self, col_idx: usize) -> Option<u16> {
        if col_idx >= usize::from(self.n_cols) {
            return None;
        }
        u16::try_from(col_idx)
            .ok()
            .and_then(|val| self.col_start.checked_add(val))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Report shape selected by the payload's `report_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumReportKind {
    /// Single table plus deviation chart gallery.
    Accuracy,
    /// Summary sheet plus one sheet per sub-table.
    Adversary,
}

impl EnumReportKind {
    /// Wire name used in `report_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Adversary => "adversary",
        }
    }
}

impl fmt::Display for EnumReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one sheet ended up holding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetReport {
    /// Final sheet name.
    pub sheet_name: String,
    /// Rendered table, when the sheet has one.
    pub table: Option<SpecTableRegion>,
    /// Charts inserted on this sheet.
    pub cnt_charts: usize,
}

/// Per-render report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRenderReport {
    /// Rendered report kind.
    pub kind: EnumReportKind,
    /// Sheets in workbook order.
    pub sheets: Vec<SpecSheetReport>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecRenderReport {
    /// Empty report for `kind`.
    pub fn new(kind: EnumReportKind) -> Self {
        Self {
            kind,
            sheets: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }

    /// Total charts across all sheets.
    pub fn chart_count(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.cnt_charts).sum()
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        let c_sheets = self
            .sheets
            .iter()
            .map(|sheet| sheet.sheet_name.as_str())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{prefix} kind={} sheets={} charts={} warnings={} names=[{c_sheets}]",
            self.kind,
            self.sheets.len(),
            self.chart_count(),
            self.warnings.len(),
        )
    }
}

impl fmt::Display for SpecRenderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[REPORT]"))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures that abort a render.
///
/// Data-quality problems inside the payload never surface here; they degrade
/// locally and end up in [`SpecRenderReport::warnings`].
#[derive(Debug, Error)]
pub enum ReportError {
    /// Payload file could not be read.
    #[error("Failed to read payload {}: {source}", path.display())]
    PayloadRead {
        /// Payload path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Payload is not valid JSON or has the wrong top-level shape.
    #[error("Failed to parse payload: {0}")]
    PayloadParse(#[from] serde_json::Error),
    /// `report_type` missing or not one of the known kinds.
    #[error("Unknown report_type: {}", .0.as_deref().unwrap_or("<missing>"))]
    UnknownReportType(Option<String>),
    /// Coordinates do not fit the worksheet grid.
    #[error("Grid index overflow: {0}")]
    GridOverflow(String),
    /// Workbook construction or save failed.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
    /// Writer used after `close()`.
    #[error("Cannot write after close().")]
    WriterClosed,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_region_rows_and_columns() {
        let region = SpecTableRegion {
            row_header: 4,
            col_start: 0,
            n_rows_data: 3,
            n_cols: 2,
        };
        assert_eq!(region.row_data_first(), 5);
        assert_eq!(region.row_data_last(), Some(7));
        assert_eq!(region.col_abs(1), Some(1));
        assert_eq!(region.col_abs(2), None);

        let region_empty = SpecTableRegion {
            n_rows_data: 0,
            ..region
        };
        assert_eq!(region_empty.row_data_last(), None);
    }

    #[test]
    fn test_format_merge_keeps_left_when_right_is_none() {
        let fmt_base = SpecCellFormat {
            bold: Some(true),
            num_format: Some("0".to_string()),
            ..Default::default()
        };
        let fmt_merged = fmt_base.with_(SpecCellFormat {
            num_format: Some("0.00%".to_string()),
            ..Default::default()
        });
        assert_eq!(fmt_merged.bold, Some(true));
        assert_eq!(fmt_merged.num_format.as_deref(), Some("0.00%"));
    }

    #[test]
    fn test_unknown_report_type_message() {
        assert_eq!(
            ReportError::UnknownReportType(None).to_string(),
            "Unknown report_type: <missing>"
        );
        assert_eq!(
            ReportError::UnknownReportType(Some("weird".to_string())).to_string(),
            "Unknown report_type: weird"
        );
    }
}
