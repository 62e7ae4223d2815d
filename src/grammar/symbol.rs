use std::collections::HashMap;

use serde::Deserialize;

use crate::GrammarError;

use super::{END_MARK, EPSILON};

/// Handle of an interned symbol. Only meaningful together with the
/// [`SymbolTable`] of the grammar that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    pub const EPSILON: Symbol = Symbol(0);
    pub const END_MARK: Symbol = Symbol(1);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
    Epsilon,
    EndMarker,
}

/// How right-hand side text is split into symbols. One mode is used for a
/// whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lexing {
    /// Uppercase-initial identifier runs are non-terminals, every other
    /// character is a one-character terminal.
    #[default]
    Compact,
    /// Whitespace separated words, each classified by [`classify`].
    Words,
}

pub fn classify(token: &str) -> SymbolKind {
    match token.chars().next() {
        Some(c) if c.is_ascii_uppercase() => SymbolKind::NonTerminal,
        _ => SymbolKind::Terminal,
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '\''
}

/// Whether `token` may stand on the left side of a production.
pub fn is_non_terminal_name(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => chars.all(is_name_char),
        _ => false,
    }
}

fn is_epsilon_marker(token: &str, lexing: Lexing) -> bool {
    match token {
        "ε" | "ϵ" => true,
        "epsilon" => lexing == Lexing::Words,
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Epsilon,
    Terminal(&'a str),
    NonTerminal(&'a str),
}

/// Split one alternative into tokens. Empty text yields no tokens; the
/// caller decides what an empty alternative means.
pub fn tokenize(text: &str, lexing: Lexing) -> Vec<Token<'_>> {
    match lexing {
        Lexing::Compact => tokenize_compact(text),
        Lexing::Words => text
            .split_whitespace()
            .map(|word| {
                if is_epsilon_marker(word, lexing) {
                    Token::Epsilon
                } else if classify(word) == SymbolKind::NonTerminal {
                    Token::NonTerminal(word)
                } else {
                    Token::Terminal(word)
                }
            })
            .collect(),
    }
}

fn tokenize_compact(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if c.is_ascii_uppercase() {
            let mut end = start + c.len_utf8();
            while let Some(&(i, n)) = chars.peek() {
                if !is_name_char(n) {
                    break;
                }
                end = i + n.len_utf8();
                chars.next();
            }
            tokens.push(Token::NonTerminal(&text[start..end]));
            continue;
        }
        let s = &text[start..start + c.len_utf8()];
        if is_epsilon_marker(s, Lexing::Compact) {
            tokens.push(Token::Epsilon);
        } else {
            tokens.push(Token::Terminal(s));
        }
    }
    tokens
}

/// Interned names of one grammar. Epsilon and the end-marker occupy the
/// first two slots and are never reachable through a name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolTable {
    names: Vec<String>,
    kinds: Vec<SymbolKind>,
    index: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            names: vec![EPSILON.to_string(), END_MARK.to_string()],
            kinds: vec![SymbolKind::Epsilon, SymbolKind::EndMarker],
            index: HashMap::new(),
        }
    }

    pub fn intern(&mut self, name: &str, kind: SymbolKind) -> Result<Symbol, GrammarError> {
        match kind {
            SymbolKind::Epsilon => return Ok(Symbol::EPSILON),
            SymbolKind::EndMarker => return Ok(Symbol::END_MARK),
            _ => {}
        }
        if name == EPSILON || name == END_MARK {
            return Err(GrammarError::ReservedSymbol {
                name: name.to_string(),
            });
        }
        if let Some(&s) = self.index.get(name) {
            return if self.kind(s) == kind {
                Ok(s)
            } else {
                Err(GrammarError::ConflictingSymbolKind {
                    name: name.to_string(),
                })
            };
        }
        let s = Symbol(self.names.len() as u32);
        self.names.push(name.to_string());
        self.kinds.push(kind);
        self.index.insert(name.to_string(), s);
        Ok(s)
    }

    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.index.get(name).cloned()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn name(&self, symbol: Symbol) -> &str {
        self.names[symbol.index()].as_str()
    }

    pub fn kind(&self, symbol: Symbol) -> SymbolKind {
        self.kinds[symbol.index()]
    }

    /// All symbols in interning order, reserved ones included.
    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..self.names.len() as u32).map(Symbol)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_munches_non_terminals() {
        assert_eq!(
            tokenize("aB'1+C_d", Lexing::Compact),
            vec![
                Token::Terminal("a"),
                Token::NonTerminal("B'1"),
                Token::Terminal("+"),
                Token::NonTerminal("C_d"),
            ]
        );
    }

    #[test]
    fn compact_splits_lowercase_words() {
        assert_eq!(
            tokenize(" id ε", Lexing::Compact),
            vec![Token::Terminal("i"), Token::Terminal("d"), Token::Epsilon]
        );
    }

    #[test]
    fn compact_keeps_multibyte_terminals_whole() {
        assert_eq!(
            tokenize("→ϵ", Lexing::Compact),
            vec![Token::Terminal("→"), Token::Epsilon]
        );
    }

    #[test]
    fn words_mode() {
        assert_eq!(
            tokenize("id + T epsilon", Lexing::Words),
            vec![
                Token::Terminal("id"),
                Token::Terminal("+"),
                Token::NonTerminal("T"),
                Token::Epsilon,
            ]
        );
        assert!(tokenize("   ", Lexing::Words).is_empty());
    }

    #[test]
    fn classify_by_initial() {
        assert_eq!(classify("Expr"), SymbolKind::NonTerminal);
        assert_eq!(classify("id"), SymbolKind::Terminal);
        assert_eq!(classify("+"), SymbolKind::Terminal);
        assert!(is_non_terminal_name("E'"));
        assert!(!is_non_terminal_name("E+"));
        assert!(!is_non_terminal_name("e"));
    }

    #[test]
    fn reserved_symbols_are_not_names() {
        let mut t = SymbolTable::new();
        assert_eq!(
            t.intern("$", SymbolKind::Terminal),
            Err(GrammarError::ReservedSymbol {
                name: "$".to_string()
            })
        );
        assert!(t.intern(EPSILON, SymbolKind::NonTerminal).is_err());
        assert_eq!(t.intern("$", SymbolKind::EndMarker), Ok(Symbol::END_MARK));
        assert_eq!(t.name(Symbol::EPSILON), EPSILON);
        assert_eq!(t.kind(Symbol::END_MARK), SymbolKind::EndMarker);
        assert_eq!(t.get(EPSILON), None);
        assert_eq!(t.get(END_MARK), None);
    }

    #[test]
    fn one_kind_per_name() {
        let mut t = SymbolTable::new();
        let a = t.intern("a", SymbolKind::Terminal).unwrap();
        assert_eq!(t.intern("a", SymbolKind::Terminal).unwrap(), a);
        assert_eq!(
            t.intern("a", SymbolKind::NonTerminal),
            Err(GrammarError::ConflictingSymbolKind {
                name: "a".to_string()
            })
        );
    }
}
