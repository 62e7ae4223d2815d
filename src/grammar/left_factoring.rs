use crate::{Grammar, GrammarError};

use super::{grammar::Alternative, symbol::Symbol};

impl Grammar {
    /// Factor out the first symbol shared by two or more alternatives of the
    /// same production. One level only: suffix productions are not factored
    /// again.
    pub fn left_factor(&self) -> Result<Grammar, GrammarError> {
        self.left_factor_pass().map(|(g, _)| g)
    }

    /// Repeat [`Grammar::left_factor`] until nothing is factored any more.
    pub fn left_factor_to_fixpoint(&self) -> Result<Grammar, GrammarError> {
        let (mut g, mut factored) = self.left_factor_pass()?;
        let mut passes = 1;
        while factored > 0 {
            let (next, n) = g.left_factor_pass()?;
            g = next;
            factored = n;
            passes += 1;
        }
        debug!("Left factoring reached a fixpoint after {} passes", passes);
        Ok(g)
    }

    fn left_factor_pass(&self) -> Result<(Grammar, usize), GrammarError> {
        let mut result = self.derive_empty();
        let mut factored = 0;

        for production in self.productions() {
            let left = production.left;
            result.declare_production(left);

            // Groups in order of their first member, keyed by leading symbol.
            let mut groups: Vec<(Option<Symbol>, Vec<&Alternative>)> = Vec::new();
            for alternative in &production.alternatives {
                let head = alternative.first().cloned().filter(|&s| s != Symbol::EPSILON);
                match groups
                    .iter_mut()
                    .find(|(key, _)| head.is_some() && *key == head)
                {
                    Some((_, members)) => members.push(alternative),
                    None => groups.push((head, vec![alternative])),
                }
            }

            let mut suffix_productions: Vec<(Symbol, Vec<Alternative>)> = Vec::new();
            for (head, members) in groups {
                match head {
                    Some(prefix) if members.len() > 1 => {
                        let base = self.get_symbol_name(left).to_string();
                        let suffix_left = result.fresh_non_terminal(&base)?;
                        trace!(
                            "Factoring {} alternatives of {} on {}",
                            members.len(),
                            base,
                            self.get_symbol_name(prefix)
                        );
                        result.add_production(left, vec![prefix, suffix_left]);
                        suffix_productions.push((
                            suffix_left,
                            members.iter().map(|m| m[1..].to_vec()).collect(),
                        ));
                        factored += 1;
                    }
                    _ => {
                        for &alternative in &members {
                            result.add_production(left, alternative.clone());
                        }
                    }
                }
            }

            for (suffix_left, suffixes) in suffix_productions {
                for suffix in suffixes {
                    result.add_production(suffix_left, suffix);
                }
            }
        }

        debug!("Left factoring split {} groups", factored);
        Ok((result, factored))
    }
}
