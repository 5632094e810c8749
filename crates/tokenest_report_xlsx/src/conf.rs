//! Report layout constants and default preset factories.

use crate::spec::{SpecCellFormat, SpecChartGeometry, SpecReportFormats, SpecReportOptions};

/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Fallback sheet name when sanitizing leaves nothing.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet";

/// Accuracy data sheet name.
pub const C_SHEET_NAME_ACCURACY: &str = "Accuracy";
/// Accuracy chart gallery sheet name.
pub const C_SHEET_NAME_CHARTS: &str = "Charts";
/// Adversary summary sheet name.
pub const C_SHEET_NAME_SUMMARY: &str = "Summary";

/// Default title of accuracy reports.
pub const C_TITLE_ACCURACY_DEFAULT: &str = "accuracy report";
/// Default title of adversary reports.
pub const C_TITLE_ADVERSARY_DEFAULT: &str = "adversary report";
/// Default title of adversary sub-tables.
pub const C_TITLE_TABLE_DEFAULT: &str = "Report";
/// Label written before the generation timestamp.
pub const C_LABEL_GENERATED_AT: &str = "Generated at:";
/// Section header of the adversary parameter block.
pub const C_LABEL_PARAMETERS: &str = "Parameters";
/// Section header of the adversary summary block.
pub const C_LABEL_SUMMARY: &str = "Summary";

/// Header row of the accuracy table.
pub const N_ROW_TABLE_START_ACCURACY: u32 = 4;
/// Header row of adversary detail tables.
pub const N_ROW_TABLE_START_ADVERSARY: u32 = 3;
/// First row of the adversary parameter block.
pub const N_ROW_SUMMARY_BLOCK_START: u32 = 3;
/// Name column used as chart categories when the payload omits it.
pub const N_COL_NAME_DEFAULT: usize = 1;

/// Percentage number format used by cells and chart axes.
pub const C_NUM_FORMAT_PERCENT: &str = "0.00%";

/// Column widths of the accuracy sheet.
pub const N_WIDTH_ACCURACY_FIRST: f64 = 42.0;
pub const N_WIDTH_ACCURACY_OTHER: f64 = 18.0;
/// Column widths of the adversary summary sheet.
pub const N_WIDTH_SUMMARY_LABEL: f64 = 36.0;
pub const N_WIDTH_SUMMARY_VALUE: f64 = 24.0;
/// Column widths of adversary detail sheets.
pub const N_WIDTH_DETAIL_RANK: f64 = 8.0;
pub const N_WIDTH_DETAIL_NAME: f64 = 28.0;
pub const N_WIDTH_DETAIL_OTHER: f64 = 16.0;
pub const N_WIDTH_DETAIL_LAST: f64 = 50.0;

/// Default xlsxwriter chart size in pixels, before scaling.
pub const N_CHART_WIDTH_BASE: f64 = 480.0;
pub const N_CHART_HEIGHT_BASE: f64 = 288.0;
/// Scale applied to every chart.
pub const N_CHART_SCALE: f64 = 1.2;
/// Columns between the two charts of one gallery row.
pub const N_CHART_GRID_COL_STEP: u16 = 9;
/// Rows between gallery rows.
pub const N_CHART_GRID_ROW_STEP: u32 = 18;
/// Charts per gallery row.
pub const N_CHART_GRID_PER_ROW: usize = 2;
/// Anchor row of inline adversary charts.
pub const N_ROW_INLINE_CHART: u32 = 2;
/// Columns left blank between a table and its inline chart.
pub const N_COL_INLINE_CHART_MARGIN: u16 = 2;

/// Build default cell formats per style.
pub fn derive_default_report_formats() -> SpecReportFormats {
    let cfg_base_fmt_spec = SpecCellFormat::default();

    SpecReportFormats {
        title: cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            font_size: Some(14),
            ..Default::default()
        }),
        header: cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            bg_color: Some("#E6EEF7".to_string()),
            ..Default::default()
        }),
        percent: cfg_base_fmt_spec.with_(SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_PERCENT.to_string()),
            ..Default::default()
        }),
        default: cfg_base_fmt_spec,
    }
}

/// Build default chart geometry.
pub fn derive_default_chart_geometry() -> SpecChartGeometry {
    SpecChartGeometry {
        width_px: (N_CHART_WIDTH_BASE * N_CHART_SCALE).round() as u32,
        height_px: (N_CHART_HEIGHT_BASE * N_CHART_SCALE).round() as u32,
        grid_col_step: N_CHART_GRID_COL_STEP,
        grid_row_step: N_CHART_GRID_ROW_STEP,
        grid_per_row: N_CHART_GRID_PER_ROW,
        inline_row: N_ROW_INLINE_CHART,
        inline_col_margin: N_COL_INLINE_CHART_MARGIN,
        y_axis_num_format: C_NUM_FORMAT_PERCENT.to_string(),
    }
}

/// Build default render options.
pub fn derive_default_report_options() -> SpecReportOptions {
    SpecReportOptions::default()
}
