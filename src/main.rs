#[macro_use]
extern crate log;

use std::{fs, io::Read, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ll1_grammar_helper::{grammar::Lexing, Analysis, Config, Grammar};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Plain,
    Latex,
    Json,
}

/// Left-factor a grammar, remove its left recursion and build the LL(1)
/// parsing table.
#[derive(Parser, Debug)]
#[command(name = "ll1-grammar-helper", version, about)]
struct Args {
    /// Grammar file, one `A -> x | y` production per line. Reads stdin if omitted.
    #[arg(value_name = "GRAMMAR")]
    grammar: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "plain")]
    format: OutputFormat,

    /// Also write the report to this file.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Split right sides on whitespace instead of per character.
    #[arg(long)]
    words: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .init();

    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            Config::from_json(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => Config::default(),
    };
    if args.words {
        config.lexing = Lexing::Words;
    }

    let input = match &args.grammar {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read grammar {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read grammar from stdin")?;
            buf
        }
    };

    let (grammar, errors) = Grammar::parse_lenient(&input, config.lexing);
    for e in &errors {
        warn!("{}", e);
    }

    let analysis = Analysis::run(grammar, &config)?;
    for conflict in analysis.table.conflicts() {
        let g = analysis.grammar();
        warn!(
            "{} is not LL(1) on {}: {} alternatives compete",
            g.get_symbol_name(conflict.non_terminal),
            g.get_symbol_name(conflict.terminal),
            conflict.alternatives.len()
        );
    }

    let report = analysis.to_output();
    let text = match args.format {
        OutputFormat::Plain => report.to_plaintext(),
        OutputFormat::Latex => report.to_latex(),
        OutputFormat::Json => report.to_json()?,
    };
    println!("{}", text);

    if let Some(path) = &args.output {
        fs::write(path, format!("{}\n", text))
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}
