#[macro_use]
extern crate log;
extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod grammar;

pub use config::Config;
pub use error::GrammarError;
pub use grammar::{Analysis, Grammar};

use grammar::Lexing;

fn error_to_json<E: std::fmt::Display>(e: E) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

/// Run the whole pipeline on grammar text and return the report as JSON.
#[wasm_bindgen]
pub fn analyze_to_json(grammar: &str, words: bool) -> String {
    let config = Config {
        lexing: if words {
            Lexing::Words
        } else {
            Lexing::Compact
        },
        ..Config::default()
    };
    let result = Grammar::parse_with(grammar, config.lexing)
        .and_then(|g| Analysis::run(g, &config));
    match result {
        Ok(analysis) => analysis
            .to_output()
            .to_json()
            .unwrap_or_else(error_to_json),
        Err(e) => error_to_json(e),
    }
}

#[wasm_bindgen]
pub fn nullable_first_follow_to_json(grammar: &str) -> String {
    let g = match Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_to_json(e),
    };
    let sets = g
        .first_sets()
        .and_then(|first| g.follow_sets(&first).map(|follow| (first, follow)));
    match sets {
        Ok((first, follow)) => g
            .to_non_terminal_output_vec(&first, &follow)
            .to_json()
            .unwrap_or_else(error_to_json),
        Err(e) => error_to_json(e),
    }
}

#[cfg(test)]
mod json_tests {
    #[test]
    fn error_is_reported_as_json() {
        let out = crate::analyze_to_json("S -> \"A", false);
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            v["error"],
            "non-terminal A is used but has no production"
        );
    }

    #[test]
    fn words_mode_report() {
        let out = crate::analyze_to_json("E -> E + T | T\nT -> id", true);
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["table"]["terminals"], serde_json::json!(["+", "id", "$"]));
        assert_eq!(v["table"]["conflicts"], serde_json::json!([]));
    }

    #[test]
    fn nullable_first_follow() {
        let out = crate::nullable_first_follow_to_json("S -> aS |");
        assert_eq!(
            out,
            r#"{"data":[{"name":"S","nullable":true,"first":["a","ε"],"follow":["$"]}]}"#
        );
    }
}
