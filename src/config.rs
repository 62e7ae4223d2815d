use serde::Deserialize;

use crate::grammar::Lexing;

/// Options for one analysis run. Every field has a default, so `{}` is a
/// valid configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub lexing: Lexing,
    pub factor_passes: usize,
    pub eliminate_left_recursion: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lexing: Lexing::Compact,
            factor_passes: 1,
            eliminate_left_recursion: true,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
