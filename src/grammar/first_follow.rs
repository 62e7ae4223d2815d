use std::collections::{BTreeSet, HashMap};

use crate::{Grammar, GrammarError};

use super::symbol::{Symbol, SymbolKind};

/// A set of terminals (possibly with ε or `$`) per non-terminal. Used for
/// both FIRST and FOLLOW.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolSets {
    sets: HashMap<Symbol, BTreeSet<Symbol>>,
}

impl SymbolSets {
    fn with_keys(keys: impl Iterator<Item = Symbol>) -> Self {
        Self {
            sets: keys.map(|k| (k, BTreeSet::new())).collect(),
        }
    }

    pub fn get(&self, non_terminal: Symbol) -> Option<&BTreeSet<Symbol>> {
        self.sets.get(&non_terminal)
    }

    pub fn contains(&self, non_terminal: Symbol, symbol: Symbol) -> bool {
        self.get(non_terminal)
            .map_or(false, |set| set.contains(&symbol))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Returns whether the set grew.
    fn extend(&mut self, non_terminal: Symbol, symbols: impl IntoIterator<Item = Symbol>) -> bool {
        let set = self.sets.entry(non_terminal).or_default();
        let before = set.len();
        set.extend(symbols);
        set.len() != before
    }
}

impl Grammar {
    /// FIRST(α) for any symbol sequence, given converged or partial FIRST
    /// sets. Contains ε iff every symbol of `sequence` is nullable.
    pub fn first_of_sequence(&self, first: &SymbolSets, sequence: &[Symbol]) -> BTreeSet<Symbol> {
        let mut result = BTreeSet::new();
        for &s in sequence {
            match self.symbols().kind(s) {
                SymbolKind::Epsilon => continue,
                SymbolKind::Terminal | SymbolKind::EndMarker => {
                    result.insert(s);
                    return result;
                }
                SymbolKind::NonTerminal => {
                    let nt_first = first.get(s);
                    result.extend(
                        nt_first
                            .into_iter()
                            .flatten()
                            .filter(|&&t| t != Symbol::EPSILON)
                            .cloned(),
                    );
                    if !first.contains(s, Symbol::EPSILON) {
                        return result;
                    }
                }
            }
        }
        result.insert(Symbol::EPSILON);
        result
    }

    /// One sweep over all productions. Returns whether any set grew.
    pub fn first_pass(&self, first: &mut SymbolSets) -> bool {
        let mut changed = false;
        for production in self.productions() {
            for alternative in &production.alternatives {
                let found = self.first_of_sequence(first, alternative);
                changed |= first.extend(production.left, found);
            }
        }
        changed
    }

    pub fn first_sets(&self) -> Result<SymbolSets, GrammarError> {
        self.validate()?;
        let mut first = SymbolSets::with_keys(self.non_terminal_iter());
        let mut passes = 1;
        while self.first_pass(&mut first) {
            passes += 1;
        }
        debug!("FIRST sets converged after {} passes", passes);
        Ok(first)
    }

    /// One sweep over every non-terminal occurrence. Returns whether any set
    /// grew.
    pub fn follow_pass(&self, first: &SymbolSets, follow: &mut SymbolSets) -> bool {
        let mut changed = false;
        for production in self.productions() {
            for alternative in &production.alternatives {
                for (i, &b) in alternative.iter().enumerate() {
                    if !self.is_non_terminal(b) {
                        continue;
                    }
                    let rest = &alternative[i + 1..];
                    let rest_first = self.first_of_sequence(first, rest);
                    let nullable_rest = rest_first.contains(&Symbol::EPSILON);
                    changed |= follow.extend(
                        b,
                        rest_first.into_iter().filter(|&t| t != Symbol::EPSILON),
                    );
                    if nullable_rest {
                        let left_follow: Vec<Symbol> = follow
                            .get(production.left)
                            .into_iter()
                            .flatten()
                            .cloned()
                            .collect();
                        changed |= follow.extend(b, left_follow);
                    }
                }
            }
        }
        changed
    }

    pub fn follow_sets(&self, first: &SymbolSets) -> Result<SymbolSets, GrammarError> {
        self.validate()?;
        let start = self.start_symbol().ok_or(GrammarError::EmptyGrammar)?;
        let mut follow = SymbolSets::with_keys(self.non_terminal_iter());
        follow.extend(start, Some(Symbol::END_MARK));
        let mut passes = 1;
        while self.follow_pass(first, &mut follow) {
            passes += 1;
        }
        debug!("FOLLOW sets converged after {} passes", passes);
        Ok(follow)
    }

    pub fn is_nullable(&self, first: &SymbolSets, non_terminal: Symbol) -> bool {
        first.contains(non_terminal, Symbol::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::SymbolSets;
    use crate::grammar::{Lexing, Symbol};
    use crate::{Grammar, GrammarError};

    fn names(g: &Grammar, sets: &SymbolSets, nt: &str) -> Vec<String> {
        let mut v: Vec<String> = sets
            .get(g.get_symbol_index(nt).unwrap())
            .unwrap()
            .iter()
            .map(|&s| g.get_symbol_name(s).to_string())
            .collect();
        v.sort();
        v
    }

    fn expression() -> Grammar {
        Grammar::parse_with("E -> T E'\nE' -> + T E' | ε\nT -> id", Lexing::Words).unwrap()
    }

    #[test]
    fn expression_first_sets() {
        let g = expression();
        let first = g.first_sets().unwrap();
        assert_eq!(names(&g, &first, "E"), vec!["id"]);
        assert_eq!(names(&g, &first, "T"), vec!["id"]);
        assert_eq!(names(&g, &first, "E'"), vec!["+", "ε"]);
    }

    #[test]
    fn expression_follow_sets() {
        let g = expression();
        let first = g.first_sets().unwrap();
        let follow = g.follow_sets(&first).unwrap();
        assert_eq!(names(&g, &follow, "E"), vec!["$"]);
        assert_eq!(names(&g, &follow, "E'"), vec!["$"]);
        assert_eq!(names(&g, &follow, "T"), vec!["$", "+"]);
    }

    #[test]
    fn nullable_chain() {
        let g = Grammar::parse("S -> A B c\nA -> a | ε\nB -> b |").unwrap();
        let first = g.first_sets().unwrap();
        let follow = g.follow_sets(&first).unwrap();
        assert_eq!(names(&g, &first, "S"), vec!["a", "b", "c"]);
        assert!(g.is_nullable(&first, g.get_symbol_index("A").unwrap()));
        assert!(!g.is_nullable(&first, g.get_symbol_index("S").unwrap()));
        assert_eq!(names(&g, &follow, "A"), vec!["b", "c"]);
        assert_eq!(names(&g, &follow, "B"), vec!["c"]);
    }

    #[test]
    fn all_nullable_alternative_gives_epsilon() {
        let g = Grammar::parse("S -> A B\nA -> ε\nB -> ε").unwrap();
        let first = g.first_sets().unwrap();
        assert_eq!(names(&g, &first, "S"), vec!["ε"]);
    }

    #[test]
    fn every_occurrence_is_visited() {
        let g = Grammar::parse("S -> A a A b\nA -> c").unwrap();
        let first = g.first_sets().unwrap();
        let follow = g.follow_sets(&first).unwrap();
        assert_eq!(names(&g, &follow, "A"), vec!["a", "b"]);
    }

    #[test]
    fn sets_only_grow_and_reach_a_fixpoint() {
        let g = Grammar::parse("E -> T X\nX -> + T X | ε\nT -> F Y\nY -> * F Y | ε\nF -> ( E ) | i").unwrap();
        let mut first = SymbolSets::with_keys(g.non_terminal_iter());
        loop {
            let before = first.clone();
            let changed = g.first_pass(&mut first);
            for nt in g.non_terminal_iter() {
                assert!(before.get(nt).unwrap().is_subset(first.get(nt).unwrap()));
            }
            if !changed {
                assert_eq!(before, first);
                break;
            }
        }
        assert_eq!(first, g.first_sets().unwrap());

        let mut follow = g.follow_sets(&first).unwrap();
        let converged = follow.clone();
        assert!(!g.follow_pass(&first, &mut follow));
        assert_eq!(follow, converged);
        assert_eq!(names(&g, &follow, "F"), vec!["$", ")", "*", "+"]);
    }

    #[test]
    fn first_of_sequence() {
        let g = expression();
        let first = g.first_sets().unwrap();
        let e1 = g.get_symbol_index("E'").unwrap();
        let t = g.get_symbol_index("T").unwrap();
        let id = g.get_symbol_index("id").unwrap();
        let plus = g.get_symbol_index("+").unwrap();
        assert_eq!(
            g.first_of_sequence(&first, &[e1, t]),
            BTreeSet::from([plus, id])
        );
        assert_eq!(
            g.first_of_sequence(&first, &[]),
            BTreeSet::from([Symbol::EPSILON])
        );
    }

    #[test]
    fn undefined_non_terminal_is_fatal() {
        let g = Grammar::parse("S -> aB").unwrap();
        assert_eq!(
            g.first_sets(),
            Err(GrammarError::UndefinedNonTerminal {
                name: "B".to_string()
            })
        );
    }
}
