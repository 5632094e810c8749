//! Chart derivation from table geometry, and conversion to `rust_xlsxwriter` charts.

use rust_xlsxwriter::{Chart, ChartType};

use crate::spec::{SpecChart, SpecChartGeometry, SpecChartRange, SpecTableRegion};

/// Deviation column resolved against the table header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecChartColumn {
    /// Table-relative column index (already bounds-checked).
    pub index: usize,
    /// Series and chart title.
    pub title: String,
}

fn derive_column_range(
    sheet_name: &str,
    region: &SpecTableRegion,
    col_idx: usize,
) -> Option<SpecChartRange> {
    let col = region.col_abs(col_idx)?;
    let row_last = region.row_data_last()?;
    Some(SpecChartRange {
        sheet_name: sheet_name.to_string(),
        row_first: region.row_data_first(),
        col_first: col,
        row_last,
        col_last: col,
    })
}

/// Anchor of the `n_idx_chart`-th chart in a gallery laid out `grid_per_row` wide.
pub fn derive_chart_grid_anchor(n_idx_chart: usize, geometry: &SpecChartGeometry) -> (u32, u16) {
    let n_per_row = usize::max(1, geometry.grid_per_row);
    let n_grid_row = u32::try_from(n_idx_chart / n_per_row).unwrap_or(u32::MAX);
    let n_grid_col = u16::try_from(n_idx_chart % n_per_row).unwrap_or(u16::MAX);
    (
        n_grid_row.saturating_mul(geometry.grid_row_step),
        n_grid_col.saturating_mul(geometry.grid_col_step),
    )
}

/// One gallery chart per deviation column of the accuracy table.
///
/// Categories come from the table's first column. Returns no charts when the
/// table has no data rows.
pub fn derive_accuracy_charts(
    sheet_name_data: &str,
    region: &SpecTableRegion,
    columns: &[SpecChartColumn],
    geometry: &SpecChartGeometry,
) -> Vec<SpecChart> {
    let Some(categories) = derive_column_range(sheet_name_data, region, 0) else {
        return Vec::new();
    };

    columns
        .iter()
        .filter_map(|column| {
            derive_column_range(sheet_name_data, region, column.index)
                .map(|values| (column, values))
        })
        .enumerate()
        .map(|(n_idx_chart, (column, values))| {
            let (row_anchor, col_anchor) = derive_chart_grid_anchor(n_idx_chart, geometry);
            SpecChart {
                categories: categories.clone(),
                values,
                series_name: column.title.clone(),
                title: column.title.clone(),
                row_anchor,
                col_anchor,
                width_px: geometry.width_px,
                height_px: geometry.height_px,
                y_axis_num_format: geometry.y_axis_num_format.clone(),
                if_legend_hidden: true,
            }
        })
        .collect()
}

/// Inline ratio chart for one adversary sub-table, right of the table.
///
/// `None` when the ratio or name column does not address a table column, or
/// when the table has no rows.
pub fn derive_adversary_ratio_chart(
    sheet_name: &str,
    table_title: &str,
    region: &SpecTableRegion,
    col_idx_ratio: Option<usize>,
    col_idx_name: Option<usize>,
    geometry: &SpecChartGeometry,
) -> Option<SpecChart> {
    let values = derive_column_range(sheet_name, region, col_idx_ratio?)?;
    let categories = derive_column_range(sheet_name, region, col_idx_name?)?;
    let col_anchor = region
        .col_start
        .checked_add(region.n_cols)?
        .checked_add(geometry.inline_col_margin)?;

    Some(SpecChart {
        categories,
        values,
        series_name: table_title.to_string(),
        title: format!("{table_title} Ratio"),
        row_anchor: geometry.inline_row,
        col_anchor,
        width_px: geometry.width_px,
        height_px: geometry.height_px,
        y_axis_num_format: geometry.y_axis_num_format.clone(),
        if_legend_hidden: true,
    })
}

/// Build a single-series column chart from a spec.
pub fn derive_rust_xlsx_chart(spec: &SpecChart) -> Chart {
    let mut chart = Chart::new(ChartType::Column);

    chart
        .add_series()
        .set_name(spec.series_name.as_str())
        .set_categories((
            spec.categories.sheet_name.as_str(),
            spec.categories.row_first,
            spec.categories.col_first,
            spec.categories.row_last,
            spec.categories.col_last,
        ))
        .set_values((
            spec.values.sheet_name.as_str(),
            spec.values.row_first,
            spec.values.col_first,
            spec.values.row_last,
            spec.values.col_last,
        ));

    chart.title().set_name(spec.title.as_str());
    chart.y_axis().set_num_format(spec.y_axis_num_format.as_str());
    if spec.if_legend_hidden {
        chart.legend().set_hidden();
    }
    chart.set_width(spec.width_px).set_height(spec.height_px);

    chart
}
