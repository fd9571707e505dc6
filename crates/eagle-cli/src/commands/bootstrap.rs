use std::collections::BTreeMap;

use eagle_config::EagleConfig;
use eagle_db::store::DocumentStore;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Debug, Serialize)]
struct BootstrapReport {
    entities: usize,
    locations: BTreeMap<String, Vec<String>>,
    text_index: String,
}

/// Registration and the text index rebuild happen when the store is opened;
/// this reports what was set up.
pub fn run(
    store: &DocumentStore,
    config: &EagleConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let registry = store.registry();
    let locations = registry
        .locations()
        .into_iter()
        .map(|location| {
            let names = registry
                .in_location(location)
                .iter()
                .map(|schema| schema.name().to_string())
                .collect();
            (location.to_string(), names)
        })
        .collect();

    output(
        &BootstrapReport {
            entities: registry.len(),
            locations,
            text_index: config.search.location.clone(),
        },
        flags.format,
    )
}
