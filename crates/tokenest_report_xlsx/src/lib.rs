//! `tokenest_report_xlsx` v1:
//! XLSX rendering of token-estimation reports.
//!
//! Module layout:
//! - `conf`    : constants and default presets
//! - `spec`    : specs/models/options and the error type
//! - `payload` : lenient JSON payload decoding
//! - `util`    : pure helper functions (value classification, sheet names)
//! - `writer`  : sheet/document sinks and the `rust_xlsxwriter` backend
//! - `memory`  : in-memory sinks for layout inspection
//! - `sheet`   : per-sheet layout builders
//! - `chart`   : chart derivation from table geometry
//! - `report`  : report assembly and the file-level entry points
pub mod chart;
pub mod conf;
pub mod memory;
pub mod payload;
pub mod report;
pub mod sheet;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_SHEET_NAME_ACCURACY, C_SHEET_NAME_CHARTS, C_SHEET_NAME_SUMMARY, N_LEN_EXCEL_SHEET_NAME_MAX,
    TUP_EXCEL_ILLEGAL, derive_default_report_options,
};
pub use memory::{EnumMemoryCell, MemoryDocument, MemorySheet};
pub use payload::{
    EnumReportPayload, SpecAccuracyPayload, SpecAdversaryParam, SpecAdversaryPayload,
    SpecAdversarySummary, SpecAdversaryTable, SpecDeviationColumn, load_payload, parse_payload,
};
pub use report::{render_report, render_report_from_path, write_report};
pub use spec::{
    EnumCellStyle, EnumCellValue, EnumReportKind, ReportError, SpecCellFormat, SpecChart,
    SpecChartGeometry, SpecChartRange, SpecRenderReport, SpecReportFormats, SpecReportOptions,
    SpecSheetReport, SpecTableRegion,
};
pub use util::{
    classify_numeric, classify_percentage, derive_unique_sheet_name, sanitize_sheet_name,
};
pub use writer::{DocumentSink, SheetSink, XlsxReportWriter, XlsxSheet};
