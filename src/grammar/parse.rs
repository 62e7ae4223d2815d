use crate::{Grammar, GrammarError};

use super::{
    grammar::Alternative,
    symbol::{is_non_terminal_name, tokenize, Lexing, Symbol, Token},
};

impl Grammar {
    /// Parse `LHS -> alt1 | alt2 | ...` lines with the default lexing,
    /// failing on the first malformed line.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        Self::parse_with(grammar, Lexing::default())
    }

    pub fn parse_with(grammar: &str, lexing: Lexing) -> Result<Self, GrammarError> {
        let (g, mut errors) = Self::parse_lenient(grammar, lexing);
        if errors.is_empty() {
            Ok(g)
        } else {
            Err(errors.swap_remove(0))
        }
    }

    /// Parse every well-formed line and collect one error per malformed
    /// line. A line starting with `|` continues the previous production.
    pub fn parse_lenient(grammar: &str, lexing: Lexing) -> (Self, Vec<GrammarError>) {
        let mut g = Self::new();
        let mut errors = Vec::new();

        let mut raw_productions: Vec<(usize, Symbol, &str)> = Vec::new();

        let mut previous_left: Option<Symbol> = None;
        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            let malformed = |reason: String| GrammarError::MalformedProduction {
                line: i + 1,
                reason,
            };
            let parts: Vec<&str> = line.split("->").collect();
            let parsed = if parts.len() > 2 {
                Err(malformed("too many \"->\"".to_string()))
            } else if parts.len() == 2 {
                let left_str = parts[0].trim();
                if left_str.is_empty() {
                    Err(malformed("empty left side".to_string()))
                } else if !is_non_terminal_name(left_str) {
                    Err(malformed(format!(
                        "left side {} is not a non-terminal",
                        left_str
                    )))
                } else {
                    g.add_non_terminal(left_str)
                        .map(|left| (left, parts[1].trim()))
                        .map_err(|e| malformed(e.to_string()))
                }
            } else {
                let rest = parts[0].trim();
                match (previous_left, rest.strip_prefix('|')) {
                    (Some(left), Some(rights)) => Ok((left, rights.trim())),
                    (None, Some(_)) => Err(malformed("cannot find left side".to_string())),
                    (_, None) => Err(malformed("missing \"->\"".to_string())),
                }
            };

            match parsed {
                Ok((left, rights)) => {
                    g.declare_production(left);
                    previous_left = Some(left);
                    raw_productions.push((i + 1, left, rights));
                }
                Err(e) => {
                    debug!("Skipping malformed line {}: {}", i + 1, line);
                    previous_left = None;
                    errors.push(e);
                }
            }
        }

        for (line, left, rights) in raw_productions {
            for right in rights.split('|') {
                match g.tokenize(right, lexing) {
                    Ok(symbols) => g.add_production(left, symbols),
                    Err(e) => errors.push(GrammarError::MalformedProduction {
                        line,
                        reason: e.to_string(),
                    }),
                }
            }
        }

        trace!(
            "Loaded {} productions, {} errors",
            g.productions().len(),
            errors.len()
        );
        (g, errors)
    }

    /// Turn alternative text into interned symbols.
    pub fn tokenize(&mut self, text: &str, lexing: Lexing) -> Result<Alternative, GrammarError> {
        tokenize(text, lexing)
            .into_iter()
            .map(|token| match token {
                Token::Epsilon => Ok(Symbol::EPSILON),
                Token::Terminal(name) => self.add_terminal(name),
                Token::NonTerminal(name) => self.add_non_terminal(name),
            })
            .collect()
    }
}
