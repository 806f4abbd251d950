//! Node/edge flowchart export (`attack-chain.mmd`).

use privchain_core::chain::ChainSnapshot;

use crate::error::ExportError;
use crate::escape::mermaid_label;
use crate::label::{node_index, short_label, visited_levels};
use crate::{ChainExporter, ExportFormat};

/// Mermaid flowchart exporter: one node per distinct level, one edge per step.
pub struct MermaidExporter;

impl ChainExporter for MermaidExporter {
    fn export(&self, snapshot: &ChainSnapshot) -> Result<String, ExportError> {
        let levels = visited_levels(&snapshot.chain);

        let mut lines = vec!["graph TD".to_string()];
        for (i, level) in levels.iter().enumerate() {
            lines.push(format!("    node{i}[{}]", mermaid_label(level)));
        }

        for vector in &snapshot.chain {
            let (Some(from), Some(to)) = (
                node_index(&levels, &vector.source_privilege),
                node_index(&levels, &vector.target_privilege),
            ) else {
                continue;
            };
            lines.push(format!(
                "    node{from} -->|{}| node{to}",
                mermaid_label(short_label(&vector.name))
            ));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Mermaid
    }
}
