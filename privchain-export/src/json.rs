//! Structured-data export (`attack-chain.json`).

use chrono::{DateTime, Utc};
use privchain_core::chain::ChainSnapshot;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::label::short_label;
use crate::{ChainExporter, ExportFormat};

/// Top-level JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainDocument {
    /// One record per chain step, in order
    pub attack_chain: Vec<StepRecord>,
    /// Export metadata
    pub metadata: ChainMetadata,
}

/// One chain step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-based step index
    pub step: usize,
    /// Full vector display name
    pub name: String,
    /// Level the step starts from
    pub source: String,
    /// Level the step gains
    pub target: String,
    /// Short technique label
    pub technique: String,
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainMetadata {
    /// Number of steps
    pub total_steps: usize,
    /// When the snapshot was taken
    pub export_date: DateTime<Utc>,
}

impl ChainDocument {
    /// Builds the document for `snapshot`.
    #[must_use]
    pub fn from_snapshot(snapshot: &ChainSnapshot) -> Self {
        let attack_chain = snapshot
            .chain
            .iter()
            .enumerate()
            .map(|(i, vector)| StepRecord {
                step: i + 1,
                name: vector.name.clone(),
                source: vector.source_privilege.clone(),
                target: vector.target_privilege.clone(),
                technique: short_label(&vector.name).to_string(),
            })
            .collect();

        Self {
            attack_chain,
            metadata: ChainMetadata {
                total_steps: snapshot.len(),
                export_date: snapshot.taken_at,
            },
        }
    }
}

/// Pretty-printed JSON exporter.
pub struct JsonExporter;

impl ChainExporter for JsonExporter {
    fn export(&self, snapshot: &ChainSnapshot) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(&ChainDocument::from_snapshot(
            snapshot,
        ))?)
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }
}
