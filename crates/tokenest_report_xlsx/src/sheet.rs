//! Sheet builders: titles, metadata rows, parameter/summary blocks and tables.

use serde_json::Value;

use crate::conf::{
    C_LABEL_GENERATED_AT, C_LABEL_PARAMETERS, C_LABEL_SUMMARY, C_TITLE_ACCURACY_DEFAULT,
    C_TITLE_ADVERSARY_DEFAULT, N_ROW_SUMMARY_BLOCK_START, N_ROW_TABLE_START_ACCURACY,
    N_ROW_TABLE_START_ADVERSARY, N_WIDTH_ACCURACY_FIRST, N_WIDTH_ACCURACY_OTHER,
    N_WIDTH_DETAIL_LAST, N_WIDTH_DETAIL_NAME, N_WIDTH_DETAIL_OTHER, N_WIDTH_DETAIL_RANK,
    N_WIDTH_SUMMARY_LABEL, N_WIDTH_SUMMARY_VALUE,
};
use crate::payload::{SpecAccuracyPayload, SpecAdversaryPayload};
use crate::spec::{EnumCellStyle, EnumCellValue, ReportError, SpecTableRegion};
use crate::util::{cast_col_num, classify_percentage};
use crate::writer::{SheetSink, write_opaque_cell, write_table};

/// Pick `title`, or `default` when it is blank.
pub fn derive_title<'a>(title: &'a str, default: &'a str) -> &'a str {
    if title.trim().is_empty() { default } else { title }
}

/// Title at row 0 and the generation timestamp at row 1.
fn write_title_block<S: SheetSink>(
    sheet: &mut S,
    title: &str,
    generated_at: &str,
) -> Result<(), ReportError> {
    sheet.write_string(0, 0, title, EnumCellStyle::Title)?;
    sheet.write_string(1, 0, C_LABEL_GENERATED_AT, EnumCellStyle::Default)?;
    if !generated_at.is_empty() {
        sheet.write_string(1, 1, generated_at, EnumCellStyle::Default)?;
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// #region Accuracy

/// Populate the accuracy data sheet.
///
/// Layout: title, timestamp, optional note, then the table at row 4 with the
/// header row and first column frozen.
pub fn write_accuracy_sheet<S: SheetSink>(
    sheet: &mut S,
    payload: &SpecAccuracyPayload,
    cols_idx_percent: &[usize],
) -> Result<SpecTableRegion, ReportError> {
    write_title_block(
        sheet,
        derive_title(&payload.title, C_TITLE_ACCURACY_DEFAULT),
        &payload.generated_at,
    )?;
    if !payload.note.is_empty() {
        sheet.write_string(2, 0, &payload.note, EnumCellStyle::Default)?;
    }

    let region = write_table(
        sheet,
        N_ROW_TABLE_START_ACCURACY,
        0,
        &payload.header,
        &payload.rows,
        cols_idx_percent,
    )?;

    let n_cols = cast_col_num(payload.header.len())?;
    if n_cols > 0 {
        sheet.set_column_width(0, N_WIDTH_ACCURACY_FIRST)?;
        for col in 1..n_cols {
            sheet.set_column_width(col, N_WIDTH_ACCURACY_OTHER)?;
        }
    }
    sheet.set_freeze_panes(region.row_data_first(), 1)?;

    Ok(region)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Adversary

/// Populate the adversary summary sheet.
///
/// Blocks are stacked with a running row cursor: `Parameters` header, one row
/// per parameter, a blank row, `Summary` header, one row per summary item.
/// Summary values that read as percentages are written as such.
pub fn write_adversary_summary_sheet<S: SheetSink>(
    sheet: &mut S,
    payload: &SpecAdversaryPayload,
) -> Result<(), ReportError> {
    write_title_block(
        sheet,
        derive_title(&payload.title, C_TITLE_ADVERSARY_DEFAULT),
        &payload.generated_at,
    )?;

    let mut n_row = N_ROW_SUMMARY_BLOCK_START;
    sheet.write_string(n_row, 0, C_LABEL_PARAMETERS, EnumCellStyle::Header)?;
    n_row += 1;
    for param in &payload.params {
        sheet.write_string(n_row, 0, &param.name, EnumCellStyle::Default)?;
        write_opaque_cell(sheet, n_row, 1, &param.value)?;
        n_row += 1;
    }

    n_row += 1;
    sheet.write_string(n_row, 0, C_LABEL_SUMMARY, EnumCellStyle::Header)?;
    n_row += 1;
    for item in &payload.summary {
        sheet.write_string(n_row, 0, &item.label, EnumCellStyle::Default)?;
        write_summary_value(sheet, n_row, &item.value)?;
        n_row += 1;
    }

    sheet.set_column_width(0, N_WIDTH_SUMMARY_LABEL)?;
    sheet.set_column_width(1, N_WIDTH_SUMMARY_VALUE)?;
    Ok(())
}

fn write_summary_value<S: SheetSink>(
    sheet: &mut S,
    row: u32,
    value: &Value,
) -> Result<(), ReportError> {
    match classify_percentage(value) {
        EnumCellValue::Fraction(n_val) => sheet.write_number(row, 1, n_val, EnumCellStyle::Percent),
        _ => write_opaque_cell(sheet, row, 1, value),
    }
}

/// Populate one adversary detail sheet.
///
/// `title` is the already-defaulted table title; the table starts at row 3.
pub fn write_adversary_detail_sheet<S: SheetSink>(
    sheet: &mut S,
    title: &str,
    generated_at: &str,
    header: &[String],
    rows: &[Vec<Value>],
    cols_idx_percent: &[usize],
) -> Result<SpecTableRegion, ReportError> {
    write_title_block(sheet, title, generated_at)?;

    let region = write_table(
        sheet,
        N_ROW_TABLE_START_ADVERSARY,
        0,
        header,
        rows,
        cols_idx_percent,
    )?;
    sheet.set_freeze_panes(region.row_data_first(), 1)?;
    write_detail_column_widths(sheet, region.n_cols)?;

    Ok(region)
}

/// Narrow rank column, wide name column, roomy last column for samples.
fn write_detail_column_widths<S: SheetSink>(sheet: &mut S, n_cols: u16) -> Result<(), ReportError> {
    if n_cols == 0 {
        return Ok(());
    }
    sheet.set_column_width(0, N_WIDTH_DETAIL_RANK)?;
    if n_cols > 1 {
        sheet.set_column_width(1, N_WIDTH_DETAIL_NAME)?;
    }
    for col in 2..n_cols.saturating_sub(1) {
        sheet.set_column_width(col, N_WIDTH_DETAIL_OTHER)?;
    }
    sheet.set_column_width(n_cols - 1, N_WIDTH_DETAIL_LAST)?;
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
