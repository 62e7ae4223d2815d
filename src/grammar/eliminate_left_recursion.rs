use std::collections::{HashMap, HashSet};

use crate::{Grammar, GrammarError};

use super::{grammar::Alternative, symbol::Symbol};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Active,
    Done,
}

impl Grammar {
    /// Rewrite every directly left-recursive production `A -> A α | β` into
    /// `A -> β A'` and `A' -> α A' | ε`. Fails if the grammar has left
    /// recursion that is not direct.
    pub fn eliminate_left_recursion(&self) -> Result<Grammar, GrammarError> {
        if let Some(cycle) = self.find_indirect_left_recursion() {
            return Err(GrammarError::UnsupportedIndirectLeftRecursion {
                cycle: cycle
                    .into_iter()
                    .map(|s| self.get_symbol_name(s).to_string())
                    .collect(),
            });
        }

        let mut result = self.derive_empty();
        for nt in self.non_terminal_iter() {
            let production = match self.production(nt) {
                Some(p) => p,
                None => continue,
            };

            let mut recursive: Vec<Alternative> = Vec::new();
            let mut others: Vec<&Alternative> = Vec::new();
            for alternative in &production.alternatives {
                if alternative.first() == Some(&nt) {
                    recursive.push(alternative[1..].to_vec());
                } else {
                    others.push(alternative);
                }
            }

            result.declare_production(nt);
            if recursive.is_empty() {
                for alternative in others {
                    result.add_production(nt, alternative.clone());
                }
                continue;
            }

            let base = self.get_symbol_name(nt).to_string();
            let tail = result.fresh_non_terminal(&base)?;
            debug!(
                "Removing left recursion in {} ({} recursive alternatives)",
                base,
                recursive.len()
            );
            for alternative in others {
                let mut right = alternative.clone();
                right.push(tail);
                result.add_production(nt, right);
            }
            for mut right in recursive {
                right.push(tail);
                result.add_production(tail, right);
            }
            result.add_production(tail, vec![Symbol::EPSILON]);
        }
        Ok(result)
    }

    /// Left recursion through other non-terminals, or through a nullable
    /// prefix. Returns the cycle with its first element repeated at the end.
    pub fn find_indirect_left_recursion(&self) -> Option<Vec<Symbol>> {
        let nullable = self.nullable_non_terminals();

        let mut edges: HashMap<Symbol, Vec<Symbol>> = HashMap::new();
        for production in self.productions() {
            let left = production.left;
            let targets = edges.entry(left).or_default();
            for alternative in &production.alternatives {
                for (i, &s) in alternative.iter().enumerate() {
                    if s == Symbol::EPSILON {
                        continue;
                    }
                    if !self.is_non_terminal(s) {
                        break;
                    }
                    if !(s == left && i == 0) && !targets.contains(&s) {
                        targets.push(s);
                    }
                    if !nullable.contains(&s) {
                        break;
                    }
                }
            }
        }

        fn visit(
            nt: Symbol,
            edges: &HashMap<Symbol, Vec<Symbol>>,
            marks: &mut HashMap<Symbol, Mark>,
            stack: &mut Vec<Symbol>,
        ) -> Option<Vec<Symbol>> {
            marks.insert(nt, Mark::Active);
            stack.push(nt);
            for &next in edges.get(&nt).into_iter().flatten() {
                match marks.get(&next) {
                    Some(Mark::Active) => {
                        let start = stack.iter().position(|&s| s == next).unwrap_or(0);
                        let mut cycle = stack[start..].to_vec();
                        cycle.push(next);
                        return Some(cycle);
                    }
                    Some(Mark::Done) => {}
                    None => {
                        if let Some(cycle) = visit(next, edges, marks, stack) {
                            return Some(cycle);
                        }
                    }
                }
            }
            stack.pop();
            marks.insert(nt, Mark::Done);
            None
        }

        let mut marks = HashMap::new();
        let mut stack = Vec::new();
        for nt in self.non_terminal_iter() {
            if !marks.contains_key(&nt) {
                if let Some(cycle) = visit(nt, &edges, &mut marks, &mut stack) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    pub fn has_direct_left_recursion(&self) -> bool {
        self.productions().iter().any(|p| {
            p.alternatives
                .iter()
                .any(|alternative| alternative.first() == Some(&p.left))
        })
    }

    fn nullable_non_terminals(&self) -> HashSet<Symbol> {
        let mut nullable = HashSet::new();
        let mut changed = true;
        while changed {
            changed = false;
            for production in self.productions() {
                if nullable.contains(&production.left) {
                    continue;
                }
                let derives_empty = production.alternatives.iter().any(|alternative| {
                    alternative
                        .iter()
                        .all(|s| *s == Symbol::EPSILON || nullable.contains(s))
                });
                if derives_empty {
                    nullable.insert(production.left);
                    changed = true;
                }
            }
        }
        nullable
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::Lexing;
    use crate::{Grammar, GrammarError};

    fn rendered(g: &Grammar) -> Vec<String> {
        g.productions()
            .iter()
            .map(|p| {
                format!(
                    "{} -> {}",
                    g.get_symbol_name(p.left),
                    p.alternatives
                        .iter()
                        .map(|a| g.alternative_to_string(a))
                        .collect::<Vec<_>>()
                        .join(" | ")
                )
            })
            .collect()
    }

    #[test]
    fn direct_recursion() {
        let g = Grammar::parse_with("A -> A alpha | beta", Lexing::Words).unwrap();
        let r = g.eliminate_left_recursion().unwrap();
        assert_eq!(
            rendered(&r),
            vec!["A -> beta A'", "A' -> alpha A' | ε"]
        );
        assert!(!r.has_direct_left_recursion());
    }

    #[test]
    fn expression_grammar() {
        let g = Grammar::parse("E -> E+T | T\nT -> T*F | F\nF -> (E) | i").unwrap();
        let r = g.eliminate_left_recursion().unwrap();
        assert_eq!(
            rendered(&r),
            vec![
                "E -> T E'",
                "E' -> + T E' | ε",
                "T -> F T'",
                "T' -> * F T' | ε",
                "F -> ( E ) | i",
            ]
        );
    }

    #[test]
    fn epsilon_base_collapses() {
        let g = Grammar::parse("A -> A a | ε").unwrap();
        let r = g.eliminate_left_recursion().unwrap();
        assert_eq!(rendered(&r), vec!["A -> A'", "A' -> a A' | ε"]);
    }

    #[test]
    fn bare_self_reference() {
        let g = Grammar::parse("A -> A | b").unwrap();
        let r = g.eliminate_left_recursion().unwrap();
        assert_eq!(rendered(&r), vec!["A -> b A'", "A' -> A' | ε"]);
    }

    #[test]
    fn no_recursion_is_unchanged() {
        let g = Grammar::parse("S -> aS | b").unwrap();
        assert_eq!(g.eliminate_left_recursion().unwrap(), g);
    }

    #[test]
    fn indirect_recursion_is_reported() {
        let g = Grammar::parse("S -> A a | b\nA -> S c | d").unwrap();
        assert_eq!(
            g.eliminate_left_recursion(),
            Err(GrammarError::UnsupportedIndirectLeftRecursion {
                cycle: vec!["S".to_string(), "A".to_string(), "S".to_string()],
            })
        );
    }

    #[test]
    fn recursion_through_nullable_prefix_is_reported() {
        let g = Grammar::parse("S -> B S a | b\nB -> ε | c").unwrap();
        assert_eq!(
            g.eliminate_left_recursion(),
            Err(GrammarError::UnsupportedIndirectLeftRecursion {
                cycle: vec!["S".to_string(), "S".to_string()],
            })
        );
    }

    #[test]
    fn fresh_name_skips_taken() {
        let g = Grammar::parse("A -> A b | A'\nA' -> c").unwrap();
        let r = g.eliminate_left_recursion().unwrap();
        assert_eq!(
            rendered(&r),
            vec!["A -> A' A'1", "A'1 -> b A'1 | ε", "A' -> c"]
        );
    }
}
