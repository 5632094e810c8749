//! In-memory document used for layout inspection.

use std::collections::BTreeMap;

use crate::spec::{EnumCellStyle, ReportError, SpecChart};
use crate::writer::{DocumentSink, SheetSink};

/// One recorded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumMemoryCell {
    /// Text cell.
    Text {
        /// Cell text.
        text: String,
        /// Cell style.
        style: EnumCellStyle,
    },
    /// Numeric cell.
    Number {
        /// Cell value.
        value: f64,
        /// Cell style.
        style: EnumCellStyle,
    },
    /// Boolean cell.
    Boolean {
        /// Cell value.
        value: bool,
        /// Cell style.
        style: EnumCellStyle,
    },
    /// Formatted blank cell.
    Blank {
        /// Cell style.
        style: EnumCellStyle,
    },
}

/// Sheet that records everything written to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySheet {
    /// Sheet name.
    pub name: String,
    /// Cells keyed by `(row, col)`.
    pub cells: BTreeMap<(u32, u16), EnumMemoryCell>,
    /// Column widths keyed by column.
    pub column_widths: BTreeMap<u16, f64>,
    /// Frozen `(row, col)` split.
    pub freeze_panes: Option<(u32, u16)>,
    /// Charts in insertion order.
    pub charts: Vec<SpecChart>,
}

impl MemorySheet {
    /// Cell at `(row, col)`.
    pub fn cell(&self, row: u32, col: u16) -> Option<&EnumMemoryCell> {
        self.cells.get(&(row, col))
    }

    /// Text of the cell at `(row, col)` when it is a text cell.
    pub fn text(&self, row: u32, col: u16) -> Option<&str> {
        match self.cells.get(&(row, col)) {
            Some(EnumMemoryCell::Text { text, .. }) => Some(text),
            _ => None,
        }
    }

    /// Value of the cell at `(row, col)` when it is a numeric cell.
    pub fn number(&self, row: u32, col: u16) -> Option<f64> {
        match self.cells.get(&(row, col)) {
            Some(EnumMemoryCell::Number { value, .. }) => Some(*value),
            _ => None,
        }
    }

    /// Style of the cell at `(row, col)`.
    pub fn style(&self, row: u32, col: u16) -> Option<EnumCellStyle> {
        self.cells.get(&(row, col)).map(|cell| match cell {
            EnumMemoryCell::Text { style, .. }
            | EnumMemoryCell::Number { style, .. }
            | EnumMemoryCell::Boolean { style, .. }
            | EnumMemoryCell::Blank { style } => *style,
        })
    }

    fn put(&mut self, row: u32, col: u16, cell: EnumMemoryCell) {
        self.cells.insert((row, col), cell);
    }
}

impl SheetSink for MemorySheet {
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
        self.put(
            row,
            col,
            EnumMemoryCell::Text {
                text: text.to_string(),
                style,
            },
        );
        Ok(())
    }

    fn write_number(
        &mut self,
        row: u32,
        col: u16,
        value: f64,
        style: EnumCellStyle,
    ) -> Result<(), ReportError> {
        self.put(row, col, EnumMemoryCell::Number { value, style });
        Ok(())
    }

    fn write_boolean(
        &mut self,
        row: u32,
        col: u16,
        value: bool,
        style: EnumCellStyle,
    ) -> Result<(), ReportError> {
        self.put(row, col, EnumMemoryCell::Boolean { value, style });
        Ok(())
    }

    fn write_blank(
        &mut self,
        row: u32,
        col: u16,
        style: EnumCellStyle,
    ) -> Result<(), ReportError> {
        self.put(row, col, EnumMemoryCell::Blank { style });
        Ok(())
    }

    fn set_column_width(&mut self, col: u16, width: f64) -> Result<(), ReportError> {
        self.column_widths.insert(col, width);
        Ok(())
    }

    fn set_freeze_panes(&mut self, row: u32, col: u16) -> Result<(), ReportError> {
        self.freeze_panes = Some((row, col));
        Ok(())
    }

    fn insert_chart(&mut self, chart: &SpecChart) -> Result<(), ReportError> {
        self.charts.push(chart.clone());
        Ok(())
    }
}

/// Document that keeps its sheets in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryDocument {
    /// Pushed sheets in workbook order.
    pub sheets: Vec<MemorySheet>,
}

impl MemoryDocument {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&MemorySheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }
}

impl DocumentSink for MemoryDocument {
    type Sheet = MemorySheet;

    fn create_sheet(&mut self, name: &str) -> Result<MemorySheet, ReportError> {
        Ok(MemorySheet {
            name: name.to_string(),
            ..Default::default()
        })
    }

    fn push_sheet(&mut self, sheet: MemorySheet) -> Result<(), ReportError> {
        self.sheets.push(sheet);
        Ok(())
    }
}
