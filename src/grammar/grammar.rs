use std::collections::HashMap;

use crate::GrammarError;

use super::symbol::{Symbol, SymbolKind, SymbolTable};

/// Right-hand side of one production choice. Never empty: the empty string
/// is spelled `[Symbol::EPSILON]`.
pub type Alternative = Vec<Symbol>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub left: Symbol,
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    symbols: SymbolTable,
    productions: Vec<Production>,
    production_index: HashMap<Symbol, usize>,
    start_symbol: Option<Symbol>,
}

impl Grammar {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            productions: Vec::new(),
            production_index: HashMap::new(),
            start_symbol: None,
        }
    }

    /// A grammar with the same symbols and start symbol but no productions.
    /// Stages build their output on top of this, so every symbol of `self`
    /// stays valid in the result.
    pub fn derive_empty(&self) -> Self {
        Self {
            symbols: self.symbols.clone(),
            productions: Vec::new(),
            production_index: HashMap::new(),
            start_symbol: self.start_symbol,
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn start_symbol(&self) -> Option<Symbol> {
        self.start_symbol
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, left: Symbol) -> Option<&Production> {
        self.production_index
            .get(&left)
            .map(|&i| &self.productions[i])
    }

    pub fn terminal_iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols
            .iter()
            .filter(|&s| self.symbols.kind(s) == SymbolKind::Terminal)
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols
            .iter()
            .filter(|&s| self.symbols.kind(s) == SymbolKind::NonTerminal)
    }

    pub fn is_non_terminal(&self, symbol: Symbol) -> bool {
        self.symbols.kind(symbol) == SymbolKind::NonTerminal
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<Symbol> {
        self.symbols.get(name)
    }

    pub fn get_symbol_name(&self, symbol: Symbol) -> &str {
        self.symbols.name(symbol)
    }

    pub fn add_non_terminal(&mut self, name: &str) -> Result<Symbol, GrammarError> {
        self.symbols.intern(name, SymbolKind::NonTerminal)
    }

    pub fn add_terminal(&mut self, name: &str) -> Result<Symbol, GrammarError> {
        self.symbols.intern(name, SymbolKind::Terminal)
    }

    /// Make sure `left` has a (possibly still empty) production. The first
    /// production ever declared designates the start symbol.
    pub fn declare_production(&mut self, left: Symbol) {
        if self.production_index.contains_key(&left) {
            return;
        }
        self.production_index.insert(left, self.productions.len());
        self.productions.push(Production {
            left,
            alternatives: Vec::new(),
        });
        if self.start_symbol.is_none() {
            self.start_symbol = Some(left);
        }
    }

    /// Append an alternative to the production of `left`. Epsilon next to
    /// other symbols is dropped and an empty sequence becomes `[ε]`.
    pub fn add_production(&mut self, left: Symbol, right: Alternative) {
        self.declare_production(left);
        let idx = self.production_index[&left];
        self.productions[idx].alternatives.push(normalize(right));
    }

    /// `base'`, then `base'1`, `base'2`, ... whichever is not yet a name
    /// anywhere in the grammar.
    pub fn fresh_non_terminal(&mut self, base: &str) -> Result<Symbol, GrammarError> {
        let mut name = format!("{}'", base);
        let mut suffix = 1;
        while self.symbols.contains_name(&name) {
            name = format!("{}'{}", base, suffix);
            suffix += 1;
        }
        debug!("New non-terminal {} for {}", name, base);
        self.add_non_terminal(&name)
    }

    /// Check that the grammar has a start symbol and that every non-terminal
    /// used on a right side has a production.
    pub fn validate(&self) -> Result<(), GrammarError> {
        if self.start_symbol.is_none() {
            return Err(GrammarError::EmptyGrammar);
        }
        for production in &self.productions {
            for &s in production.alternatives.iter().flatten() {
                if self.is_non_terminal(s) && self.production(s).is_none() {
                    return Err(GrammarError::UndefinedNonTerminal {
                        name: self.get_symbol_name(s).to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn alternative_to_vec_str(&self, alternative: &[Symbol]) -> Vec<&str> {
        alternative
            .iter()
            .map(|&s| self.get_symbol_name(s))
            .collect()
    }

    pub fn alternative_to_string(&self, alternative: &[Symbol]) -> String {
        self.alternative_to_vec_str(alternative).join(" ")
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(mut right: Alternative) -> Alternative {
    right.retain(|&s| s != Symbol::EPSILON);
    if right.is_empty() {
        right.push(Symbol::EPSILON);
    }
    right
}
