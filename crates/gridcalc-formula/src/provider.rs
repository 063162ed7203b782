//! Data access abstraction
//!
//! The formula engine never owns cell data. Everything it reads comes
//! through [`DataProvider`], so the engine works the same against an
//! in-memory grid, a workbook file or a calculation overlay.

use ahash::AHashMap;
use gridcalc_core::{CellRange, CellValue};

/// A single cell captured inside a [`RangeInfo`]
#[derive(Debug, Clone, PartialEq)]
pub struct CellInfo {
    pub row: u32,
    pub col: u16,
    pub value: CellValue,
}

/// A materialized view of a range: its coordinates plus the values of the
/// cells it covers, in row-major order. Empty cells are included so that
/// positional functions see the full rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeInfo {
    pub sheet_id: u16,
    pub range: CellRange,
    pub cells: Vec<CellInfo>,
}

impl RangeInfo {
    /// The value of the top-left cell, or `Empty` for a degenerate range.
    pub fn first_value(&self) -> CellValue {
        self.cells
            .first()
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }
}

/// A resolved defined name
#[derive(Debug, Clone, PartialEq)]
pub enum NameInfo {
    Value(CellValue),
    Range(RangeInfo),
}

/// Read access to worksheet data and defined names.
///
/// `worksheet` is `None` for the formula's own sheet.
pub trait DataProvider {
    fn get_cell_value(&self, worksheet: Option<&str>, row: u32, col: u16) -> CellValue;

    fn get_range(&self, worksheet: Option<&str>, range: &CellRange) -> RangeInfo;

    fn get_name(&self, name: &str) -> Option<NameInfo>;

    /// Resolve a worksheet name to its id; `None` for an unknown sheet.
    /// Passing `worksheet: None` resolves the default sheet.
    fn sheet_id(&self, worksheet: Option<&str>) -> Option<u16>;
}

/// Simple in-memory [`DataProvider`] backed by a hash map.
///
/// Sheet 0 exists from the start and is the default sheet.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    cells: AHashMap<(u16, u32, u16), CellValue>,
    sheets: Vec<String>,
    names: AHashMap<String, NameInfo>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self {
            cells: AHashMap::new(),
            sheets: vec!["Sheet1".to_string()],
            names: AHashMap::new(),
        }
    }

    /// Register a worksheet and return its id.
    pub fn add_sheet(&mut self, name: impl Into<String>) -> u16 {
        self.sheets.push(name.into());
        (self.sheets.len() - 1) as u16
    }

    pub fn set_cell_value(&mut self, sheet: u16, row: u32, col: u16, value: impl Into<CellValue>) {
        self.cells.insert((sheet, row, col), value.into());
    }

    /// Define a workbook-scoped name. Names are matched case-insensitively.
    pub fn define_name(&mut self, name: impl Into<String>, info: NameInfo) {
        self.names.insert(name.into().to_uppercase(), info);
    }
}

impl DataProvider for InMemoryProvider {
    fn get_cell_value(&self, worksheet: Option<&str>, row: u32, col: u16) -> CellValue {
        let Some(sheet) = self.sheet_id(worksheet) else {
            return CellValue::Error(gridcalc_core::ExcelError::Ref);
        };
        self.cells
            .get(&(sheet, row, col))
            .cloned()
            .unwrap_or(CellValue::Empty)
    }

    fn get_range(&self, worksheet: Option<&str>, range: &CellRange) -> RangeInfo {
        let sheet_id = self.sheet_id(worksheet).unwrap_or(0);
        let mut cells = Vec::with_capacity(range.cell_count() as usize);
        for row in range.start.row..=range.end.row {
            for col in range.start.col..=range.end.col {
                let value = self
                    .cells
                    .get(&(sheet_id, row, col))
                    .cloned()
                    .unwrap_or(CellValue::Empty);
                cells.push(CellInfo { row, col, value });
            }
        }
        RangeInfo {
            sheet_id,
            range: *range,
            cells,
        }
    }

    fn get_name(&self, name: &str) -> Option<NameInfo> {
        self.names.get(&name.to_uppercase()).cloned()
    }

    fn sheet_id(&self, worksheet: Option<&str>) -> Option<u16> {
        match worksheet {
            None => Some(0),
            Some(name) => self
                .sheets
                .iter()
                .position(|s| s.eq_ignore_ascii_case(name))
                .map(|i| i as u16),
        }
    }
}
