//! Dependency analysis
//!
//! Tracks which formula cells read which others, orders calculation so
//! precedents run first, and isolates circular references instead of
//! looping on them. Keys pack sheet, row and column into a single u64 for
//! cheap map lookups.

use crate::compiler::split_worksheet;
use crate::error::{FormulaError, FormulaResult};
use crate::functions::FunctionRepository;
use crate::lexer::{TokenType, Tokenizer};
use crate::provider::DataProvider;
use ahash::AHashMap;
use gridcalc_core::{CellAddress, CellRange};
use std::collections::VecDeque;

/// Identifies one cell across the workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub sheet: u16,
    pub row: u32,
    pub col: u16,
}

impl CellKey {
    pub fn new(sheet: u16, row: u32, col: u16) -> Self {
        Self { sheet, row, col }
    }

    /// Pack into a single integer: sheet in the top 16 bits, then row,
    /// then column.
    pub fn packed(&self) -> u64 {
        ((self.sheet as u64) << 48) | ((self.row as u64) << 16) | self.col as u64
    }
}

/// One formula cell registered in the chain
#[derive(Debug, Clone)]
pub struct FormulaCell {
    pub key: CellKey,
    pub formula: String,
    /// Ranges this formula reads, resolved to sheet ids
    refs: Vec<(u16, CellRange)>,
    volatile: bool,
}

impl FormulaCell {
    fn new(key: CellKey, formula: String) -> Self {
        Self {
            key,
            formula,
            refs: Vec::new(),
            volatile: false,
        }
    }

    fn reads(&self, key: &CellKey) -> bool {
        let addr = CellAddress::new(key.row, key.col);
        self.refs
            .iter()
            .any(|(sheet, range)| *sheet == key.sheet && range.contains(&addr))
    }
}

/// The workbook's formula cells plus the order they must calculate in.
///
/// After [`analyze`](DependencyChain::analyze), `calc_order` holds indices
/// into the cell list with every precedent before its dependents, and
/// `cycles` holds the cells excluded for participating in a circular
/// reference.
#[derive(Debug, Default)]
pub struct DependencyChain {
    list: Vec<FormulaCell>,
    index: AHashMap<u64, usize>,
    dependents: Vec<Vec<usize>>,
    calc_order: Vec<usize>,
    cycles: Vec<usize>,
}

impl DependencyChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a formula cell. Each cell may appear once.
    pub fn add(&mut self, key: CellKey, formula: impl Into<String>) -> FormulaResult<()> {
        let packed = key.packed();
        if self.index.contains_key(&packed) {
            return Err(FormulaError::Argument(format!(
                "cell already in chain: sheet {} row {} col {}",
                key.sheet, key.row, key.col
            )));
        }
        self.index.insert(packed, self.list.len());
        self.list.push(FormulaCell::new(key, formula.into()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn cells(&self) -> &[FormulaCell] {
        &self.list
    }

    pub fn get(&self, key: &CellKey) -> Option<usize> {
        self.index.get(&key.packed()).copied()
    }

    pub fn calc_order(&self) -> &[usize] {
        &self.calc_order
    }

    /// Indices of cells participating in a circular reference
    pub fn cycles(&self) -> &[usize] {
        &self.cycles
    }

    /// Extract references from every formula, build the dependency edges
    /// and topologically sort. Cells left unordered by the sort are in a
    /// cycle; they land in `cycles` and never calculate.
    pub fn analyze(
        &mut self,
        provider: &dyn DataProvider,
        repository: &FunctionRepository,
    ) -> FormulaResult<()> {
        for cell in &mut self.list {
            cell.refs.clear();
            cell.volatile = false;
            for token in Tokenizer::tokenize(&cell.formula) {
                match token.token_type() {
                    TokenType::ExcelAddress => {
                        let (worksheet, range_text) = split_worksheet(token.value());
                        let sheet = match worksheet {
                            None => cell.key.sheet,
                            Some(name) => match provider.sheet_id(Some(name)) {
                                Some(id) => id,
                                // unknown sheet compiles to #REF!, no edge
                                None => continue,
                            },
                        };
                        if let Ok(range) = CellRange::parse(range_text) {
                            cell.refs.push((sheet, range));
                        }
                    }
                    TokenType::Function => {
                        if repository.is_volatile(token.value()) {
                            cell.volatile = true;
                        }
                    }
                    _ => {}
                }
            }
        }

        // precedent -> dependent edges between formula cells
        self.dependents = vec![Vec::new(); self.list.len()];
        let mut in_degree = vec![0usize; self.list.len()];
        for (dependent, cell) in self.list.iter().enumerate() {
            for (precedent, other) in self.list.iter().enumerate() {
                if !cell.reads(&other.key) {
                    continue;
                }
                // a self-reference is an edge that can never resolve: it
                // raises the degree so the cell is classified as cyclic
                in_degree[dependent] += 1;
                if precedent != dependent {
                    self.dependents[precedent].push(dependent);
                }
            }
        }

        // Kahn's algorithm; whatever never reaches degree zero is cyclic
        self.calc_order.clear();
        let mut queue: VecDeque<usize> = (0..self.list.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        while let Some(i) = queue.pop_front() {
            self.calc_order.push(i);
            for &dependent in &self.dependents[i] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    queue.push_back(dependent);
                }
            }
        }
        let ordered: Vec<bool> = {
            let mut ordered = vec![false; self.list.len()];
            for &i in &self.calc_order {
                ordered[i] = true;
            }
            ordered
        };
        self.cycles = (0..self.list.len()).filter(|&i| !ordered[i]).collect();
        Ok(())
    }

    /// Cells that must recalculate after the given cells changed: direct
    /// and transitive dependents plus every volatile cell, in calculation
    /// order. Call after [`analyze`](DependencyChain::analyze).
    pub fn dirty_from(&self, changed: &[CellKey]) -> Vec<usize> {
        let mut dirty = vec![false; self.list.len()];
        let mut queue: VecDeque<usize> = VecDeque::new();
        for (i, cell) in self.list.iter().enumerate() {
            let touched = changed.iter().any(|key| cell.reads(key))
                || changed.contains(&cell.key)
                || cell.volatile;
            if touched && !dirty[i] {
                dirty[i] = true;
                queue.push_back(i);
            }
        }
        while let Some(i) = queue.pop_front() {
            for &dependent in &self.dependents[i] {
                if !dirty[dependent] {
                    dirty[dependent] = true;
                    queue.push_back(dependent);
                }
            }
        }
        self.calc_order
            .iter()
            .copied()
            .filter(|&i| dirty[i])
            .collect()
    }
}
