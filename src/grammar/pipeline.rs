use crate::{Config, Grammar, GrammarError};

use super::{first_follow::SymbolSets, ll1_parsing_table::LL1ParsingTable};

/// Every intermediate result of one run, each owned separately.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub original: Grammar,
    pub factored: Grammar,
    pub without_left_recursion: Grammar,
    pub first: SymbolSets,
    pub follow: SymbolSets,
    pub table: LL1ParsingTable,
}

impl Analysis {
    /// raw grammar -> left factoring -> left-recursion removal -> FIRST ->
    /// FOLLOW -> LL(1) table.
    pub fn run(grammar: Grammar, config: &Config) -> Result<Self, GrammarError> {
        grammar.validate()?;

        let mut factored = grammar.clone();
        for pass in 0..config.factor_passes {
            let next = factored.left_factor()?;
            if next == factored {
                debug!("Left factoring stable after {} passes", pass);
                break;
            }
            factored = next;
        }

        let without_left_recursion = if config.eliminate_left_recursion {
            factored.eliminate_left_recursion()?
        } else {
            factored.clone()
        };

        let first = without_left_recursion.first_sets()?;
        let follow = without_left_recursion.follow_sets(&first)?;
        let table = without_left_recursion.generate_ll1_parsing_table(&first, &follow);
        info!(
            "Analyzed grammar: {} productions, {} non-terminals, {} terminals, {} conflicts",
            without_left_recursion.productions().len(),
            table.non_terminals().len(),
            table.terminals().len() - 1,
            table.conflicts().len()
        );

        Ok(Self {
            original: grammar,
            factored,
            without_left_recursion,
            first,
            follow,
            table,
        })
    }

    /// The grammar that FIRST, FOLLOW and the table refer to.
    pub fn grammar(&self) -> &Grammar {
        &self.without_left_recursion
    }
}

#[cfg(test)]
mod tests {
    use super::Analysis;
    use crate::grammar::Lexing;
    use crate::{Config, Grammar, GrammarError};

    #[test]
    fn full_run_on_expression_grammar() {
        let g = Grammar::parse("E -> E+T | T\nT -> T*F | F\nF -> (E) | i").unwrap();
        let a = Analysis::run(g, &Config::default()).unwrap();
        assert_eq!(a.factored, a.original);
        assert_eq!(a.grammar().productions().len(), 5);
        assert!(a.table.is_ll1());
    }

    #[test]
    fn factoring_then_recursion_removal() {
        let g = Grammar::parse("E -> E+T | E-T | T\nT -> i").unwrap();
        let a = Analysis::run(g, &Config::default()).unwrap();
        let names: Vec<&str> = a
            .grammar()
            .productions()
            .iter()
            .map(|p| a.grammar().get_symbol_name(p.left))
            .collect();
        assert_eq!(names, vec!["E", "E'1", "T", "E'"]);
        assert!(a.table.is_ll1());
    }

    #[test]
    fn disabled_stages() {
        let g = Grammar::parse_with("S -> a b | a c", Lexing::Words).unwrap();
        let config = Config {
            factor_passes: 0,
            eliminate_left_recursion: false,
            ..Config::default()
        };
        let a = Analysis::run(g, &config).unwrap();
        assert_eq!(a.grammar(), &a.original);
        assert_eq!(a.table.conflicts().len(), 1);
    }

    #[test]
    fn fatal_errors_abort() {
        let g = Grammar::parse("S -> A\nA -> S b | c").unwrap();
        assert!(matches!(
            Analysis::run(g, &Config::default()),
            Err(GrammarError::UnsupportedIndirectLeftRecursion { .. })
        ));
        let g = Grammar::parse("S -> X").unwrap();
        assert!(matches!(
            Analysis::run(g, &Config::default()),
            Err(GrammarError::UndefinedNonTerminal { .. })
        ));
    }
}
