//! Stateless helper utilities used by the report pipeline.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::conf::{C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::{EnumCellValue, ReportError};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueClassification

/// Classify a raw cell for a plain (numeric-or-text) column.
///
/// Digit-only text (one optional leading `-`) becomes an integer, other
/// numeric text a float; everything else stays opaque.
pub fn classify_numeric(value: &Value) -> EnumCellValue {
    match value {
        Value::Number(num) => derive_number_value(num),
        Value::String(text) => {
            let c_text = text.trim();
            if c_text.is_empty() {
                return EnumCellValue::Opaque(value.clone());
            }
            if is_integer_text(c_text)
                && let Ok(n_val) = c_text.parse::<i64>()
            {
                return EnumCellValue::Integer(n_val);
            }
            match parse_finite_f64(c_text) {
                Some(n_val) => EnumCellValue::Float(n_val),
                None => EnumCellValue::Opaque(value.clone()),
            }
        }
        _ => EnumCellValue::Opaque(value.clone()),
    }
}

/// Classify a raw cell for a percentage column.
///
/// `"12%"` and `"12"` both become the fraction `0.12`; numbers are taken as
/// fractions already and only coerced to float.
pub fn classify_percentage(value: &Value) -> EnumCellValue {
    match value {
        Value::Number(num) => match num.as_f64() {
            Some(n_val) if n_val.is_finite() => EnumCellValue::Fraction(n_val),
            _ => EnumCellValue::Opaque(value.clone()),
        },
        Value::String(text) => {
            let c_text = text.trim();
            let c_text = c_text.strip_suffix('%').unwrap_or(c_text).trim();
            if c_text.is_empty() {
                return EnumCellValue::Opaque(value.clone());
            }
            match parse_finite_f64(c_text) {
                Some(n_val) => EnumCellValue::Fraction(n_val / 100.0),
                None => EnumCellValue::Opaque(value.clone()),
            }
        }
        _ => EnumCellValue::Opaque(value.clone()),
    }
}

fn derive_number_value(num: &serde_json::Number) -> EnumCellValue {
    if let Some(n_val) = num.as_i64() {
        return EnumCellValue::Integer(n_val);
    }
    match num.as_f64() {
        Some(n_val) => EnumCellValue::Float(n_val),
        None => EnumCellValue::Opaque(Value::Number(num.clone())),
    }
}

fn is_integer_text(text: &str) -> bool {
    let c_digits = text.strip_prefix('-').unwrap_or(text);
    !c_digits.is_empty() && c_digits.chars().all(|chr| chr.is_ascii_digit())
}

// NaN/Inf cannot be stored as xlsx numbers.
fn parse_finite_f64(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|val| val.is_finite())
}

/// Text shown for an opaque value; `None` means the cell stays blank.
pub fn derive_opaque_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(val) => Some(val.to_string()),
        Value::Number(num) => Some(num.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    // Truncate before trimming: the cut may expose a trailing apostrophe,
    // which Excel rejects at either end of a sheet name.
    let c_name_cut: String = c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect();
    let c_name_trimmed = c_name_cut.trim().trim_matches('\'').trim();
    if c_name_trimmed.is_empty() {
        return C_SHEET_NAME_DEFAULT.to_string();
    }
    c_name_trimmed.to_string()
}

/// Reserve a workbook-unique sheet name, suffixing `__2`, `__3`, ... on clash.
///
/// Excel compares sheet names case-insensitively, so `set_names_existing`
/// holds lowercase keys.
pub fn derive_unique_sheet_name(set_names_existing: &mut BTreeSet<String>, name: &str) -> String {
    if set_names_existing.insert(name.to_lowercase()) {
        return name.to_string();
    }

    let base_name: String = name
        .chars()
        .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 3))
        .collect();

    let mut n_idx = 2usize;
    loop {
        let c_suffix = format!("__{n_idx}");
        let n_len_base = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_suffix.len());
        let candidate: String = base_name
            .chars()
            .take(usize::max(1, n_len_base))
            .chain(c_suffix.chars())
            .collect();
        if set_names_existing.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n_idx += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GridIndexUtils

/// Cast a zero-based row index to the worksheet row type.
pub fn cast_row_num(value: usize) -> Result<u32, ReportError> {
    u32::try_from(value).map_err(|_| ReportError::GridOverflow(format!("row index {value}")))
}

/// Cast a zero-based column index to the worksheet column type.
pub fn cast_col_num(value: usize) -> Result<u16, ReportError> {
    u16::try_from(value).map_err(|_| ReportError::GridOverflow(format!("column index {value}")))
}

/// Keep only indices that address a column of a `width`-wide table.
///
/// Returns `(kept, dropped)`, both sorted and deduplicated.
pub fn select_valid_column_indices(
    indices: impl IntoIterator<Item = usize>,
    width: usize,
) -> (Vec<usize>, Vec<usize>) {
    let set_idx: BTreeSet<usize> = indices.into_iter().collect();
    set_idx.into_iter().partition(|n_idx| *n_idx < width)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
