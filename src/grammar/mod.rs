pub mod eliminate_left_recursion;
pub mod first_follow;
pub mod grammar;
pub mod left_factoring;
pub mod ll1_parsing_table;
pub mod parse;
pub mod pipeline;
pub mod pretty_print;
pub mod symbol;

pub use first_follow::SymbolSets;
pub use grammar::{Alternative, Grammar, Production};
pub use ll1_parsing_table::{Cell, LL1ParsingTable, TableConflict, TableEntry};
pub use pipeline::Analysis;
pub use symbol::{classify, tokenize, Lexing, Symbol, SymbolKind, SymbolTable, Token};

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";
