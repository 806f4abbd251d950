//! Typeset report export (`attack-chain.tex`).
//!
//! A standalone `article` with a summary, the enumerated steps and a TikZ
//! diagram that mirrors the Mermaid flowchart: same nodes, same edges.

use std::fmt::Write as _;

use privchain_core::chain::ChainSnapshot;

use crate::error::ExportError;
use crate::escape::escape_latex;
use crate::label::{node_index, short_label, visited_levels};
use crate::{ChainExporter, ExportFormat};

const PREAMBLE: &str = r"\documentclass{article}
\usepackage[T1]{fontenc}
\usepackage{tikz}
\usetikzlibrary{positioning,arrows.meta}
";

const TIKZ_OPTIONS: &str = "level/.style={draw, rounded corners, minimum width=4cm, minimum height=8mm}, node distance=14mm";

/// LaTeX/TikZ report exporter.
pub struct LatexExporter;

impl ChainExporter for LatexExporter {
    fn export(&self, snapshot: &ChainSnapshot) -> Result<String, ExportError> {
        let mut out = String::from(PREAMBLE);
        let _ = writeln!(out, r"\title{{Attack Chain Report}}");
        let _ = writeln!(
            out,
            r"\date{{{}}}",
            snapshot.taken_at.format("%Y-%m-%d %H:%M UTC")
        );
        out.push_str("\\begin{document}\n\\maketitle\n\n");

        write_summary(&mut out, snapshot);
        write_steps(&mut out, snapshot);
        write_diagram(&mut out, snapshot);

        out.push_str("\\end{document}\n");
        Ok(out)
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Latex
    }
}

fn write_summary(out: &mut String, snapshot: &ChainSnapshot) {
    out.push_str("\\section*{Summary}\n\\begin{tabular}{ll}\n");
    let _ = writeln!(
        out,
        r"Source level & {} \\",
        escape_latex(snapshot.source_level())
    );
    let _ = writeln!(
        out,
        r"Target level & {} \\",
        escape_latex(snapshot.target_level())
    );
    let _ = writeln!(out, r"Steps & {} \\", snapshot.len());
    let _ = writeln!(
        out,
        r"Complete & {} \\",
        if snapshot.complete { "yes" } else { "no" }
    );
    out.push_str("\\end{tabular}\n\n");
}

fn write_steps(out: &mut String, snapshot: &ChainSnapshot) {
    out.push_str("\\section*{Steps}\n");
    if snapshot.is_empty() {
        out.push_str("No steps recorded.\n\n");
        return;
    }

    out.push_str("\\begin{enumerate}\n");
    for vector in &snapshot.chain {
        let _ = writeln!(
            out,
            r"  \item \textbf{{{}}} \\",
            escape_latex(short_label(&vector.name))
        );
        let _ = write!(
            out,
            r"    {} $\rightarrow$ {}",
            escape_latex(&vector.source_privilege),
            escape_latex(&vector.target_privilege)
        );
        if !vector.description.is_empty() {
            let _ = write!(out, " \\\\\n    {}", escape_latex(&vector.description));
        }
        if !vector.cves.is_empty() {
            let cves: Vec<String> = vector.cves.iter().map(|c| escape_latex(c)).collect();
            let _ = write!(out, " \\\\\n    CVEs: {}", cves.join(", "));
        }
        out.push('\n');
    }
    out.push_str("\\end{enumerate}\n\n");
}

fn write_diagram(out: &mut String, snapshot: &ChainSnapshot) {
    let levels = visited_levels(&snapshot.chain);
    if levels.is_empty() {
        return;
    }

    out.push_str("\\section*{Diagram}\n\\begin{center}\n");
    let _ = writeln!(out, r"\begin{{tikzpicture}}[{TIKZ_OPTIONS}]");

    for (i, level) in levels.iter().enumerate() {
        if i == 0 {
            let _ = writeln!(out, r"  \node[level] (node0) {{{}}};", escape_latex(level));
        } else {
            let _ = writeln!(
                out,
                r"  \node[level, below=of node{}] (node{i}) {{{}}};",
                i - 1,
                escape_latex(level)
            );
        }
    }

    for vector in &snapshot.chain {
        let (Some(from), Some(to)) = (
            node_index(&levels, &vector.source_privilege),
            node_index(&levels, &vector.target_privilege),
        ) else {
            continue;
        };
        let label = escape_latex(short_label(&vector.name));
        let path = if to == from + 1 {
            format!("-- node[right] {{{label}}}")
        } else if to > from {
            format!("to[bend right=40] node[right] {{{label}}}")
        } else if to < from {
            format!("to[bend left=40] node[left] {{{label}}}")
        } else {
            format!("to[loop right] node[right] {{{label}}}")
        };
        let _ = writeln!(out, r"  \draw[-{{Stealth}}] (node{from}) {path} (node{to});");
    }

    out.push_str("\\end{tikzpicture}\n\\end{center}\n\n");
}
