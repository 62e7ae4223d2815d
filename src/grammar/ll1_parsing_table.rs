use std::collections::HashMap;

use crate::Grammar;

use super::{first_follow::SymbolSets, grammar::Alternative, symbol::Symbol};

/// An alternative registered in a cell, with its position inside the
/// production it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub index: usize,
    pub alternative: Alternative,
}

/// Content of one (non-terminal, terminal) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    Empty,
    Unique(&'a TableEntry),
    /// Two or more alternatives compete: the grammar is not LL(1) here.
    Conflict(&'a [TableEntry]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConflict {
    pub non_terminal: Symbol,
    pub terminal: Symbol,
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LL1ParsingTable {
    terminals: Vec<Symbol>,
    non_terminals: Vec<Symbol>,
    cells: HashMap<(Symbol, Symbol), Vec<TableEntry>>,
}

impl LL1ParsingTable {
    /// Column order: grammar terminals, then `$`.
    pub fn terminals(&self) -> &[Symbol] {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &[Symbol] {
        &self.non_terminals
    }

    pub fn cell(&self, non_terminal: Symbol, terminal: Symbol) -> Cell<'_> {
        match self.cells.get(&(non_terminal, terminal)).map(|v| v.as_slice()) {
            None | Some([]) => Cell::Empty,
            Some([entry]) => Cell::Unique(entry),
            Some(entries) => Cell::Conflict(entries),
        }
    }

    /// Every conflicted cell, row by row in column order.
    pub fn conflicts(&self) -> Vec<TableConflict> {
        let mut conflicts = Vec::new();
        for &nt in &self.non_terminals {
            for &t in &self.terminals {
                if let Cell::Conflict(entries) = self.cell(nt, t) {
                    conflicts.push(TableConflict {
                        non_terminal: nt,
                        terminal: t,
                        alternatives: entries.iter().map(|e| e.alternative.clone()).collect(),
                    });
                }
            }
        }
        conflicts
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts().is_empty()
    }

    fn register(&mut self, non_terminal: Symbol, terminal: Symbol, index: usize, alternative: &Alternative) {
        let entries = self.cells.entry((non_terminal, terminal)).or_default();
        if entries.iter().all(|e| e.index != index) {
            entries.push(TableEntry {
                index,
                alternative: alternative.clone(),
            });
        }
    }
}

impl Grammar {
    pub fn generate_ll1_parsing_table(&self, first: &SymbolSets, follow: &SymbolSets) -> LL1ParsingTable {
        let mut table = LL1ParsingTable {
            terminals: self
                .terminal_iter()
                .chain(std::iter::once(Symbol::END_MARK))
                .collect(),
            non_terminals: self.non_terminal_iter().collect(),
            cells: HashMap::new(),
        };

        for production in self.productions() {
            let left = production.left;
            for (index, alternative) in production.alternatives.iter().enumerate() {
                let alternative_first = self.first_of_sequence(first, alternative);
                for &t in alternative_first.iter().filter(|&&t| t != Symbol::EPSILON) {
                    table.register(left, t, index, alternative);
                }
                if alternative_first.contains(&Symbol::EPSILON) {
                    for &t in follow.get(left).into_iter().flatten() {
                        table.register(left, t, index, alternative);
                    }
                }
            }
        }

        let conflicts = table.conflicts().len();
        if conflicts > 0 {
            debug!("LL(1) table has {} conflicting cells", conflicts);
        }
        table
    }
}
