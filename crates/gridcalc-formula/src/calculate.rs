//! Workbook calculation
//!
//! Drives the dependency chain: formulas evaluate in topological order,
//! each seeing the freshly computed values of its precedents through an
//! overlay over the caller's provider. Cells in a circular reference are
//! assigned `#REF!` and skipped.

use crate::dependency::{CellKey, DependencyChain};
use crate::error::FormulaResult;
use crate::functions::FunctionRepository;
use crate::parser::FormulaParser;
use crate::provider::{DataProvider, NameInfo, RangeInfo};
use ahash::AHashMap;
use gridcalc_core::{CellRange, CellValue, ExcelError};

use crate::context::ParsingContext;

/// A provider view where computed formula results shadow the base data
pub struct OverlayProvider<'a> {
    base: &'a dyn DataProvider,
    overlay: AHashMap<u64, CellValue>,
}

impl<'a> OverlayProvider<'a> {
    pub fn new(base: &'a dyn DataProvider) -> Self {
        Self {
            base,
            overlay: AHashMap::new(),
        }
    }

    pub fn set(&mut self, key: CellKey, value: CellValue) {
        self.overlay.insert(key.packed(), value);
    }
}

impl DataProvider for OverlayProvider<'_> {
    fn get_cell_value(&self, worksheet: Option<&str>, row: u32, col: u16) -> CellValue {
        if let Some(sheet) = self.base.sheet_id(worksheet) {
            if let Some(value) = self.overlay.get(&CellKey::new(sheet, row, col).packed()) {
                return value.clone();
            }
        }
        self.base.get_cell_value(worksheet, row, col)
    }

    fn get_range(&self, worksheet: Option<&str>, range: &CellRange) -> RangeInfo {
        let mut info = self.base.get_range(worksheet, range);
        if let Some(sheet) = self.base.sheet_id(worksheet) {
            for cell in &mut info.cells {
                let key = CellKey::new(sheet, cell.row, cell.col);
                if let Some(value) = self.overlay.get(&key.packed()) {
                    cell.value = value.clone();
                }
            }
        }
        info
    }

    fn get_name(&self, name: &str) -> Option<NameInfo> {
        self.base.get_name(name)
    }

    fn sheet_id(&self, worksheet: Option<&str>) -> Option<u16> {
        self.base.sheet_id(worksheet)
    }
}

/// Evaluates a set of formula cells against a data provider.
///
/// Results are retained between runs, so a
/// [`recalculate`](Calculator::recalculate) after a data change only
/// re-evaluates the dirty subset.
pub struct Calculator<'a> {
    provider: &'a dyn DataProvider,
    repository: &'a FunctionRepository,
    chain: DependencyChain,
    computed: AHashMap<u64, CellValue>,
}

impl<'a> Calculator<'a> {
    pub fn new(provider: &'a dyn DataProvider, repository: &'a FunctionRepository) -> Self {
        Self {
            provider,
            repository,
            chain: DependencyChain::new(),
            computed: AHashMap::new(),
        }
    }

    /// Register a formula cell. Each cell may hold one formula.
    pub fn add_formula(&mut self, key: CellKey, formula: impl Into<String>) -> FormulaResult<()> {
        self.chain.add(key, formula)
    }

    pub fn chain(&self) -> &DependencyChain {
        &self.chain
    }

    /// Full calculation: analyze dependencies and evaluate every formula.
    pub fn calculate(&mut self) -> FormulaResult<Vec<(CellKey, CellValue)>> {
        self.chain.analyze(self.provider, self.repository)?;
        let order = self.chain.calc_order().to_vec();
        Ok(self.run(&order))
    }

    /// Re-evaluate only the formulas affected by the changed cells (plus
    /// volatile formulas). Requires a prior [`calculate`](Self::calculate).
    pub fn recalculate(&mut self, changed: &[CellKey]) -> FormulaResult<Vec<(CellKey, CellValue)>> {
        self.chain.analyze(self.provider, self.repository)?;
        let dirty = self.chain.dirty_from(changed);
        Ok(self.run(&dirty))
    }

    /// The last computed value for a formula cell
    pub fn value_of(&self, key: &CellKey) -> Option<&CellValue> {
        self.computed.get(&key.packed())
    }

    fn run(&mut self, order: &[usize]) -> Vec<(CellKey, CellValue)> {
        let mut overlay = OverlayProvider::new(self.provider);
        for (&packed, value) in &self.computed {
            overlay.overlay.insert(packed, value.clone());
        }

        let mut results = Vec::with_capacity(order.len() + self.chain.cycles().len());
        for &i in self.chain.cycles() {
            let key = self.chain.cells()[i].key;
            let value = CellValue::Error(ExcelError::Ref);
            overlay.set(key, value.clone());
            results.push((key, value));
        }
        for &i in order {
            let (key, formula) = {
                let cell = &self.chain.cells()[i];
                (cell.key, cell.formula.clone())
            };
            let value = {
                let mut ctx = ParsingContext::new(&overlay, self.repository);
                FormulaParser::parse_at(&mut ctx, key, &formula)
            };
            overlay.set(key, value.clone());
            results.push((key, value));
        }
        for (key, value) in &results {
            self.computed.insert(key.packed(), value.clone());
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryProvider;
    use pretty_assertions::assert_eq;

    fn key(row: u32, col: u16) -> CellKey {
        CellKey::new(0, row, col)
    }

    #[test]
    fn chained_formulas_see_fresh_precedents() {
        let mut provider = InMemoryProvider::new();
        provider.set_cell_value(0, 0, 2, 5.0); // C1 = 5
        let repository = FunctionRepository::with_builtins();
        let mut calc = Calculator::new(&provider, &repository);
        calc.add_formula(key(0, 0), "=B1+1").unwrap(); // A1
        calc.add_formula(key(0, 1), "=C1*2").unwrap(); // B1
        let results = calc.calculate().unwrap();

        let by_key: AHashMap<u64, CellValue> = results
            .into_iter()
            .map(|(k, v)| (k.packed(), v))
            .collect();
        assert_eq!(by_key[&key(0, 1).packed()], CellValue::Number(10.0));
        assert_eq!(by_key[&key(0, 0).packed()], CellValue::Number(11.0));
    }

    #[test]
    fn cycles_get_ref_errors_and_calculation_finishes() {
        let provider = InMemoryProvider::new();
        let repository = FunctionRepository::with_builtins();
        let mut calc = Calculator::new(&provider, &repository);
        calc.add_formula(key(0, 0), "=B1").unwrap();
        calc.add_formula(key(0, 1), "=A1").unwrap();
        calc.add_formula(key(0, 2), "=2+2").unwrap();
        let results = calc.calculate().unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(
            calc.value_of(&key(0, 0)),
            Some(&CellValue::Error(ExcelError::Ref))
        );
        assert_eq!(
            calc.value_of(&key(0, 1)),
            Some(&CellValue::Error(ExcelError::Ref))
        );
        assert_eq!(calc.value_of(&key(0, 2)), Some(&CellValue::Number(4.0)));
    }

    #[test]
    fn range_formulas_read_overlay_values() {
        let mut provider = InMemoryProvider::new();
        provider.set_cell_value(0, 1, 0, 2.0); // A2
        let repository = FunctionRepository::with_builtins();
        let mut calc = Calculator::new(&provider, &repository);
        calc.add_formula(key(0, 0), "=10*2").unwrap(); // A1, computed
        calc.add_formula(key(2, 0), "=SUM(A1:A2)").unwrap(); // A3
        calc.calculate().unwrap();
        assert_eq!(calc.value_of(&key(2, 0)), Some(&CellValue::Number(22.0)));
    }

    #[test]
    fn recalculate_touches_only_dirty_cells() {
        let mut provider = InMemoryProvider::new();
        provider.set_cell_value(0, 0, 2, 1.0); // C1
        let repository = FunctionRepository::with_builtins();
        let mut calc = Calculator::new(&provider, &repository);
        calc.add_formula(key(0, 0), "=C1+1").unwrap(); // depends on C1
        calc.add_formula(key(0, 1), "=100").unwrap(); // independent
        calc.calculate().unwrap();

        let results = calc.recalculate(&[key(0, 2)]).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, key(0, 0));
    }

    #[test]
    fn error_values_propagate_into_dependents() {
        let provider = InMemoryProvider::new();
        let repository = FunctionRepository::with_builtins();
        let mut calc = Calculator::new(&provider, &repository);
        calc.add_formula(key(0, 0), "=1/0").unwrap(); // A1
        calc.add_formula(key(0, 1), "=A1+1").unwrap(); // B1
        calc.calculate().unwrap();
        assert_eq!(
            calc.value_of(&key(0, 1)),
            Some(&CellValue::Error(ExcelError::Div0))
        );
    }
}
