//! Parsing context
//!
//! Bundles everything a compilation needs to reach beyond the formula text:
//! the data provider, the function repository, the scope stack of cells
//! being calculated and the reference id counter. All state is explicit;
//! the engine keeps no globals.

use crate::dependency::CellKey;
use crate::functions::FunctionRepository;
use crate::provider::DataProvider;

/// Hands out unique ids for address references within one compilation
#[derive(Debug, Default)]
pub struct IntegerIdProvider {
    next: u32,
}

impl IntegerIdProvider {
    pub fn new_id(&mut self) -> u32 {
        self.next += 1;
        self.next
    }
}

/// Per-compilation state threaded through the compiler and the functions
pub struct ParsingContext<'a> {
    pub provider: &'a dyn DataProvider,
    pub repository: &'a FunctionRepository,
    scopes: Vec<CellKey>,
    ids: IntegerIdProvider,
}

impl<'a> ParsingContext<'a> {
    pub fn new(provider: &'a dyn DataProvider, repository: &'a FunctionRepository) -> Self {
        Self {
            provider,
            repository,
            scopes: Vec::new(),
            ids: IntegerIdProvider::default(),
        }
    }

    /// The cell currently being calculated, if any. Positional functions
    /// like ROW() read this.
    pub fn scope(&self) -> Option<CellKey> {
        self.scopes.last().copied()
    }

    pub fn push_scope(&mut self, key: CellKey) {
        self.scopes.push(key);
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn next_address_ref_id(&mut self) -> u32 {
        self.ids.new_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryProvider;

    #[test]
    fn scope_stack_nests() {
        let provider = InMemoryProvider::new();
        let repository = FunctionRepository::with_builtins();
        let mut ctx = ParsingContext::new(&provider, &repository);
        assert_eq!(ctx.scope(), None);

        let outer = CellKey::new(0, 0, 0);
        let inner = CellKey::new(0, 1, 0);
        ctx.push_scope(outer);
        ctx.push_scope(inner);
        assert_eq!(ctx.scope(), Some(inner));
        ctx.pop_scope();
        assert_eq!(ctx.scope(), Some(outer));
    }

    #[test]
    fn address_ref_ids_are_unique_and_nonzero() {
        let provider = InMemoryProvider::new();
        let repository = FunctionRepository::with_builtins();
        let mut ctx = ParsingContext::new(&provider, &repository);
        let a = ctx.next_address_ref_id();
        let b = ctx.next_address_ref_id();
        assert_ne!(a, 0);
        assert_ne!(a, b);
    }
}
