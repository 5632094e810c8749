//! Report assembly: dispatch on payload kind, build every sheet, finalize once.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::chart::{SpecChartColumn, derive_accuracy_charts, derive_adversary_ratio_chart};
use crate::conf::{
    C_SHEET_NAME_ACCURACY, C_SHEET_NAME_CHARTS, C_SHEET_NAME_SUMMARY, C_TITLE_TABLE_DEFAULT,
};
use crate::payload::{
    EnumReportPayload, SpecAccuracyPayload, SpecAdversaryPayload, SpecAdversaryTable, load_payload,
};
use crate::sheet::{
    derive_title, write_accuracy_sheet, write_adversary_detail_sheet,
    write_adversary_summary_sheet,
};
use crate::spec::{ReportError, SpecRenderReport, SpecReportOptions, SpecSheetReport};
use crate::util::{derive_unique_sheet_name, sanitize_sheet_name, select_valid_column_indices};
use crate::writer::{DocumentSink, SheetSink, XlsxReportWriter};

/// Render every sheet of `payload` into `document`.
///
/// Does not finalize the document; see [`write_report`] for the file path.
pub fn render_report<D: DocumentSink>(
    payload: &EnumReportPayload,
    document: &mut D,
    options: &SpecReportOptions,
) -> Result<SpecRenderReport, ReportError> {
    let mut report = SpecRenderReport::new(payload.kind());
    let mut set_sheet_names = BTreeSet::new();

    match payload {
        EnumReportPayload::Accuracy(accuracy) => render_accuracy(
            accuracy,
            document,
            options,
            &mut set_sheet_names,
            &mut report,
        )?,
        EnumReportPayload::Adversary(adversary) => render_adversary(
            adversary,
            document,
            options,
            &mut set_sheet_names,
            &mut report,
        )?,
    }

    Ok(report)
}

/// Render `payload` into an XLSX workbook at `path_file_out`.
///
/// The workbook is saved once, after every sheet is populated; a failure
/// before that point leaves no file behind.
pub fn write_report(
    payload: &EnumReportPayload,
    path_file_out: &Path,
    options: &SpecReportOptions,
) -> Result<SpecRenderReport, ReportError> {
    let mut writer = XlsxReportWriter::new(PathBuf::from(path_file_out), &options.formats);
    let report = render_report(payload, &mut writer, options)?;
    writer.close()?;
    Ok(report)
}

/// Load the payload at `path_file_in` and write its workbook to `path_file_out`.
pub fn render_report_from_path(
    path_file_in: &Path,
    path_file_out: &Path,
    options: &SpecReportOptions,
) -> Result<SpecRenderReport, ReportError> {
    let payload = load_payload(path_file_in)?;
    write_report(&payload, path_file_out, options)
}

fn warn_report(report: &mut SpecRenderReport, msg: String) {
    warn!("{msg}");
    report.warn(msg);
}

////////////////////////////////////////////////////////////////////////////////
// #region Accuracy

fn render_accuracy<D: DocumentSink>(
    payload: &SpecAccuracyPayload,
    document: &mut D,
    options: &SpecReportOptions,
    set_sheet_names: &mut BTreeSet<String>,
    report: &mut SpecRenderReport,
) -> Result<(), ReportError> {
    let n_width = payload.header.len();

    let mut l_columns = Vec::new();
    for column in &payload.deviation_columns {
        match column.index.filter(|n_idx| *n_idx < n_width) {
            Some(n_idx) => l_columns.push(SpecChartColumn {
                index: n_idx,
                title: if column.title.is_empty() {
                    payload.header[n_idx].clone()
                } else {
                    column.title.clone()
                },
            }),
            None => warn_report(
                report,
                format!(
                    "Deviation column {:?} ({:?}) outside header width {n_width}; skipped.",
                    column.index, column.title
                ),
            ),
        }
    }
    let l_cols_idx_percent: Vec<usize> = l_columns.iter().map(|column| column.index).collect();

    let sheet_name_data = derive_unique_sheet_name(set_sheet_names, C_SHEET_NAME_ACCURACY);
    let mut sheet_data = document.create_sheet(&sheet_name_data)?;
    let region = write_accuracy_sheet(&mut sheet_data, payload, &l_cols_idx_percent)?;
    document.push_sheet(sheet_data)?;
    report.sheets.push(SpecSheetReport {
        sheet_name: sheet_name_data.clone(),
        table: Some(region),
        cnt_charts: 0,
    });

    let l_charts = derive_accuracy_charts(
        &sheet_name_data,
        &region,
        &l_columns,
        &options.chart_geometry,
    );
    if l_charts.is_empty() && !l_columns.is_empty() {
        warn_report(
            report,
            "Accuracy table has no data rows; deviation charts skipped.".to_string(),
        );
    }

    let sheet_name_charts = derive_unique_sheet_name(set_sheet_names, C_SHEET_NAME_CHARTS);
    let mut sheet_charts = document.create_sheet(&sheet_name_charts)?;
    for chart in &l_charts {
        debug!(sheet = sheet_charts.name(), title = %chart.title, "insert chart");
        sheet_charts.insert_chart(chart)?;
    }
    document.push_sheet(sheet_charts)?;
    report.sheets.push(SpecSheetReport {
        sheet_name: sheet_name_charts,
        table: None,
        cnt_charts: l_charts.len(),
    });

    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Adversary

fn render_adversary<D: DocumentSink>(
    payload: &SpecAdversaryPayload,
    document: &mut D,
    options: &SpecReportOptions,
    set_sheet_names: &mut BTreeSet<String>,
    report: &mut SpecRenderReport,
) -> Result<(), ReportError> {
    let sheet_name_summary = derive_unique_sheet_name(set_sheet_names, C_SHEET_NAME_SUMMARY);
    let mut sheet_summary = document.create_sheet(&sheet_name_summary)?;
    write_adversary_summary_sheet(&mut sheet_summary, payload)?;
    document.push_sheet(sheet_summary)?;
    report.sheets.push(SpecSheetReport {
        sheet_name: sheet_name_summary,
        table: None,
        cnt_charts: 0,
    });

    for table in &payload.tables {
        render_adversary_table(
            table,
            &payload.generated_at,
            document,
            options,
            set_sheet_names,
            report,
        )?;
    }

    Ok(())
}

fn render_adversary_table<D: DocumentSink>(
    table: &SpecAdversaryTable,
    generated_at: &str,
    document: &mut D,
    options: &SpecReportOptions,
    set_sheet_names: &mut BTreeSet<String>,
    report: &mut SpecRenderReport,
) -> Result<(), ReportError> {
    let title = derive_title(&table.title, C_TITLE_TABLE_DEFAULT);
    let n_width = table.header.len();

    let (l_cols_idx_percent, l_cols_idx_dropped) =
        select_valid_column_indices(table.ratio_column, n_width);
    if !l_cols_idx_dropped.is_empty() {
        warn_report(
            report,
            format!(
                "Table {title:?}: ratio column {l_cols_idx_dropped:?} outside header width \
                 {n_width}; ignored."
            ),
        );
    }
    let col_idx_ratio = l_cols_idx_percent.first().copied();

    let sheet_name = derive_unique_sheet_name(set_sheet_names, &sanitize_sheet_name(title, "_"));
    let mut sheet = document.create_sheet(&sheet_name)?;
    let region = write_adversary_detail_sheet(
        &mut sheet,
        title,
        generated_at,
        &table.header,
        &table.rows,
        &l_cols_idx_percent,
    )?;

    let chart = derive_adversary_ratio_chart(
        &sheet_name,
        title,
        &region,
        col_idx_ratio,
        table.name_column,
        &options.chart_geometry,
    );
    if chart.is_none() && col_idx_ratio.is_some() {
        warn_report(
            report,
            format!(
                "Table {title:?}: ratio chart skipped (rows={}, name column {:?}).",
                table.rows.len(),
                table.name_column
            ),
        );
    }
    if let Some(chart) = &chart {
        debug!(sheet = sheet.name(), title = %chart.title, "insert chart");
        sheet.insert_chart(chart)?;
    }
    document.push_sheet(sheet)?;

    report.sheets.push(SpecSheetReport {
        sheet_name,
        table: Some(region),
        cnt_charts: usize::from(chart.is_some()),
    });
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
