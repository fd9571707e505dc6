use anyhow::Context;
use eagle_db::store::DocumentStore;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Debug, Serialize)]
struct EntityRow {
    name: String,
    location: String,
    fields: usize,
    post_save: &'static str,
    methods: String,
    virtuals: String,
}

/// Without a name, one row per registered entity. With a name, that entity's
/// body JSON Schema.
pub fn run(name: Option<&str>, store: &DocumentStore, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = store.registry();

    if let Some(name) = name {
        let schema = registry
            .get(name)
            .with_context(|| format!("unknown entity '{name}'"))?;
        return output(schema.json_schema(), flags.format);
    }

    let rows: Vec<EntityRow> = registry
        .list()
        .into_iter()
        .filter_map(|name| registry.get(name))
        .map(|schema| EntityRow {
            name: schema.name().to_string(),
            location: schema.storage_location().to_string(),
            fields: schema.fields().len(),
            post_save: schema.post_save().as_str(),
            methods: schema.method_names().join(","),
            virtuals: schema.virtual_names().join(","),
        })
        .collect();
    output(&rows, flags.format)
}
