//! Activity-diagram export (`attack-chain.puml`).
//!
//! Each distinct level becomes an activity; each step that reaches a new
//! level becomes a labelled arrow into it.

use std::fmt::Write as _;

use privchain_core::chain::ChainSnapshot;

use crate::error::ExportError;
use crate::escape::escape_plantuml;
use crate::label::{short_label, visited_levels};
use crate::{ChainExporter, ExportFormat};

/// PlantUML activity diagram exporter.
pub struct PlantUmlExporter;

impl ChainExporter for PlantUmlExporter {
    fn export(&self, snapshot: &ChainSnapshot) -> Result<String, ExportError> {
        let mut out = String::from("@startuml\nstart\n");

        if let Some(first) = visited_levels(&snapshot.chain).first() {
            let _ = writeln!(out, ":{};", escape_plantuml(first));
            let mut seen = vec![*first];

            for vector in &snapshot.chain {
                let target = vector.target_privilege.as_str();
                if seen.contains(&target) {
                    continue;
                }
                seen.push(target);
                let _ = writeln!(out, "-> {};", escape_plantuml(short_label(&vector.name)));
                let _ = writeln!(out, ":{};", escape_plantuml(target));
            }
        }

        out.push_str("stop\n@enduml\n");
        Ok(out)
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::PlantUml
    }
}
