#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use privchain_core::catalog::builtin_catalog;
use privchain_core::chain::ChainEngine;
use privchain_export::{ExportFormat, create_exporter};

fuzz_target!(|data: &[u8]| {
    let Ok(result) = builtin_catalog() else {
        return;
    };
    let catalog = result.catalog;
    let mut engine = ChainEngine::new(Arc::clone(&catalog));

    // Each byte picks a move from the current level, 0 resets.
    for &byte in data {
        if byte == 0 {
            engine.reset();
            continue;
        }
        let moves = engine.available_moves();
        if moves.is_empty() {
            continue;
        }
        let component = moves[usize::from(byte) % moves.len()];
        let technique = &component.techniques[usize::from(byte) % component.techniques.len()];
        let (c, t) = (component.id.clone(), technique.id.clone());
        let _ = engine.escalate_by_id(&c, &t);
    }

    let snapshot = engine.snapshot();
    for format in ExportFormat::ALL {
        if let Some(exporter) = create_exporter(format) {
            let _ = exporter.export(&snapshot);
        }
    }
});
