use std::fmt;

/// Everything that can go wrong while loading or analyzing a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A line without `->` or with an invalid left side. Lines are 1-based.
    MalformedProduction { line: usize, reason: String },
    UndefinedNonTerminal { name: String },
    /// The non-terminals of the cycle in order, first name repeated at the end.
    UnsupportedIndirectLeftRecursion { cycle: Vec<String> },
    ConflictingSymbolKind { name: String },
    /// `ε` or `$` used as an ordinary symbol name.
    ReservedSymbol { name: String },
    EmptyGrammar,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::MalformedProduction { line, reason } => {
                write!(f, "Line {}: {}", line, reason)
            }
            GrammarError::UndefinedNonTerminal { name } => {
                write!(f, "non-terminal {} is used but has no production", name)
            }
            GrammarError::UnsupportedIndirectLeftRecursion { cycle } => write!(
                f,
                "indirect left recursion is not supported: {}",
                cycle.join(" -> ")
            ),
            GrammarError::ConflictingSymbolKind { name } => {
                write!(f, "symbol {} is used both as a terminal and a non-terminal", name)
            }
            GrammarError::ReservedSymbol { name } => {
                write!(f, "symbol {} is reserved and cannot appear in a grammar", name)
            }
            GrammarError::EmptyGrammar => write!(f, "grammar has no productions"),
        }
    }
}

impl std::error::Error for GrammarError {}

#[cfg(test)]
mod tests {
    use super::GrammarError;

    #[test]
    fn display_cycle() {
        let e = GrammarError::UnsupportedIndirectLeftRecursion {
            cycle: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        assert_eq!(
            e.to_string(),
            "indirect left recursion is not supported: A -> B -> A"
        );
    }

    #[test]
    fn display_line() {
        let e = GrammarError::MalformedProduction {
            line: 3,
            reason: "missing \"->\"".to_string(),
        };
        assert_eq!(e.to_string(), "Line 3: missing \"->\"");
    }
}
