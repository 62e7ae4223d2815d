use std::collections::HashSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    first_follow::SymbolSets,
    ll1_parsing_table::{Cell, LL1ParsingTable},
    pipeline::Analysis,
    symbol::Symbol,
    Grammar, EPSILON,
};

fn width_of(s: &str) -> usize {
    s.chars().count()
}

fn align(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let width: Vec<usize> = (0..columns)
        .map(|j| {
            rows.iter()
                .filter_map(|row| row.get(j))
                .map(|s| width_of(s))
                .max()
                .unwrap_or(0)
        })
        .collect();
    rows.iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right.join(" "))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool, terminal_set: &HashSet<&str>) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow & ", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(|&s| {
                        if s == EPSILON {
                            "\\epsilon".to_string()
                        } else if terminal_set.contains(s) {
                            format!("\\text{{{}}}", escape::tex(s))
                        } else {
                            escape::tex(s).to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        left + &right
    }
}

#[derive(Debug, Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
    #[serde(skip)]
    terminals: HashSet<&'a str>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| width_of(p.left))
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, false))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(
                self.productions
                    .iter()
                    .map(|s| s.to_latex(true, &self.terminals)),
            )
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    fn terminal_names(&self) -> HashSet<&str> {
        self.terminal_iter().map(|t| self.get_symbol_name(t)).collect()
    }

    pub fn to_production_output_vec(&self) -> ProductionOutputVec<'_> {
        let productions = self
            .productions()
            .iter()
            .map(|production| ProductionOutput {
                left: self.get_symbol_name(production.left),
                rights: production
                    .alternatives
                    .iter()
                    .map(|alternative| self.alternative_to_vec_str(alternative))
                    .collect(),
            })
            .collect();
        ProductionOutputVec {
            productions,
            terminals: self.terminal_names(),
        }
    }

    /// Names of a FIRST/FOLLOW set, sorted, ε last.
    fn set_to_vec_str(&self, sets: &SymbolSets, non_terminal: Symbol) -> Vec<&str> {
        let mut names: Vec<&str> = sets
            .get(non_terminal)
            .into_iter()
            .flatten()
            .filter(|&&s| s != Symbol::EPSILON)
            .map(|&s| self.get_symbol_name(s))
            .collect();
        names.sort();
        if sets.contains(non_terminal, Symbol::EPSILON) {
            names.push(EPSILON);
        }
        names
    }

    pub fn to_non_terminal_output_vec(&self, first: &SymbolSets, follow: &SymbolSets) -> NonTerminalOutputVec<'_> {
        let data = self
            .productions()
            .iter()
            .map(|p| NonTerminalOutput {
                name: self.get_symbol_name(p.left),
                nullable: self.is_nullable(first, p.left),
                first: self.set_to_vec_str(first, p.left),
                follow: self.set_to_vec_str(follow, p.left),
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

#[derive(Debug, Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_latex(&self) -> String {
        fn f(a: &[&str]) -> String {
            a.iter()
                .map(|&s| {
                    if s == EPSILON {
                        r"$\epsilon$".to_string()
                    } else {
                        escape::tex(s).to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(r"\ ")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Debug, Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut rows = vec![vec![
            "Symbol".to_string(),
            "Nullable".to_string(),
            "First".to_string(),
            "Follow".to_string(),
        ]];
        rows.extend(self.data.iter().map(|s| {
            vec![
                s.name.to_string(),
                s.nullable.to_string(),
                s.first.join(", "),
                s.follow.join(", "),
            ]
        }));
        align(&rows)
    }

    pub fn first_to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| format!("FIRST({}) = {{ {} }}", s.name, s.first.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn follow_to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| format!("FOLLOW({}) = {{ {} }}", s.name, s.follow.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

#[derive(Debug, Serialize)]
pub struct LL1RowOutput<'a> {
    left: &'a str,
    cells: Vec<ProductionOutput<'a>>,
}

#[derive(Debug, Serialize)]
pub struct LL1ConflictOutput<'a> {
    non_terminal: &'a str,
    terminal: &'a str,
    alternatives: Vec<Vec<&'a str>>,
}

#[derive(Debug, Serialize)]
pub struct LL1ParsingTableOutput<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<LL1RowOutput<'a>>,
    conflicts: Vec<LL1ConflictOutput<'a>>,
    #[serde(skip)]
    terminal_set: HashSet<&'a str>,
}

impl LL1ParsingTable {
    pub fn to_output<'a>(&'a self, g: &'a Grammar) -> LL1ParsingTableOutput<'a> {
        let rows = self
            .non_terminals()
            .iter()
            .map(|&nt| {
                let left = g.get_symbol_name(nt);
                let cells = self
                    .terminals()
                    .iter()
                    .map(|&t| ProductionOutput {
                        left,
                        rights: match self.cell(nt, t) {
                            Cell::Empty => Vec::new(),
                            Cell::Unique(entry) => {
                                vec![g.alternative_to_vec_str(&entry.alternative)]
                            }
                            Cell::Conflict(entries) => entries
                                .iter()
                                .map(|e| g.alternative_to_vec_str(&e.alternative))
                                .collect(),
                        },
                    })
                    .collect();
                LL1RowOutput { left, cells }
            })
            .collect();

        let conflicts = self
            .conflicts()
            .into_iter()
            .map(|c| LL1ConflictOutput {
                non_terminal: g.get_symbol_name(c.non_terminal),
                terminal: g.get_symbol_name(c.terminal),
                alternatives: c
                    .alternatives
                    .iter()
                    .map(|a| g.alternative_to_vec_str(a))
                    .collect(),
            })
            .collect();

        LL1ParsingTableOutput {
            terminals: self
                .terminals()
                .iter()
                .map(|&t| g.get_symbol_name(t))
                .collect(),
            rows,
            conflicts,
            terminal_set: g.terminal_names(),
        }
    }
}

impl LL1ParsingTableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for row in &self.rows {
            let mut line: Vec<String> = vec![row.left.to_string()];
            line.extend(
                row.cells
                    .iter()
                    .map(|productions| productions.to_plaintext(width_of(row.left), false)),
            );
            output.push(line);
        }
        align(&output)
    }

    pub fn conflicts_to_plaintext(&self) -> String {
        self.conflicts
            .iter()
            .map(|c| {
                format!(
                    "conflict at [{}, {}]: {}",
                    c.non_terminal,
                    c.terminal,
                    c.alternatives
                        .iter()
                        .map(|a| format!("{} -> {}", c.non_terminal, a.join(" ")))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|&t| format!("\\text{{{}}}", escape::tex(t))),
        );
        let header = header.join(" & ");

        let mut output: Vec<String> = Vec::new();
        for row in &self.rows {
            let mut line: Vec<String> = vec![escape::tex(row.left).to_string()];
            line.extend(row.cells.iter().map(|productions| {
                let cell = productions.to_latex(false, &self.terminal_set);
                if productions.rights.len() > 1 {
                    format!("{{\\color{{red}}{}}}", cell)
                } else {
                    cell
                }
            }));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

/// Every stage of an [`Analysis`], ready to print.
#[derive(Debug, Serialize)]
pub struct AnalysisOutput<'a> {
    original: ProductionOutputVec<'a>,
    factored: ProductionOutputVec<'a>,
    without_left_recursion: ProductionOutputVec<'a>,
    sets: NonTerminalOutputVec<'a>,
    table: LL1ParsingTableOutput<'a>,
}

impl Analysis {
    pub fn to_output(&self) -> AnalysisOutput<'_> {
        let g = self.grammar();
        AnalysisOutput {
            original: self.original.to_production_output_vec(),
            factored: self.factored.to_production_output_vec(),
            without_left_recursion: g.to_production_output_vec(),
            sets: g.to_non_terminal_output_vec(&self.first, &self.follow),
            table: self.table.to_output(g),
        }
    }
}

impl AnalysisOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut sections = vec![
            format!("Original Grammar:\n{}", self.original.to_plaintext()),
            format!("Grammar after Left Factoring:\n{}", self.factored.to_plaintext()),
            format!(
                "Grammar after Left Recursion Removal:\n{}",
                self.without_left_recursion.to_plaintext()
            ),
            format!("FIRST Sets:\n{}", self.sets.first_to_plaintext()),
            format!("FOLLOW Sets:\n{}", self.sets.follow_to_plaintext()),
            format!("LL(1) Parsing Table:\n{}", self.table.to_plaintext()),
        ];
        if !self.table.conflicts.is_empty() {
            sections.push(format!(
                "Conflicts:\n{}",
                self.table.conflicts_to_plaintext()
            ));
        }
        sections.join("\n\n")
    }

    pub fn to_latex(&self) -> String {
        [
            self.original.to_latex(),
            self.factored.to_latex(),
            self.without_left_recursion.to_latex(),
            self.sets.to_latex(),
            self.table.to_latex(),
        ]
        .join("\n\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
