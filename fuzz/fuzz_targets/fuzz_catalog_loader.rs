#![no_main]

use libfuzzer_sys::fuzz_target;
use privchain_core::catalog::CatalogLoader;
use privchain_core::layout::{LayeredLayout, LayoutEngine, LayoutGraph};

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        let loader = CatalogLoader::with_defaults();

        // Anything that loads must also lay out.
        if let Ok(result) = loader.load_from_str(yaml_str) {
            let graph = LayoutGraph::from_catalog(&result.catalog);
            let _ = LayeredLayout::default().layout(&graph);
        }
    }
});
