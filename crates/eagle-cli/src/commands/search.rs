use anyhow::Context;
use eagle_config::EagleConfig;
use eagle_db::store::DocumentStore;
use serde_json::Value;

use super::effective_limit;
use crate::cli::GlobalFlags;
use crate::output::output;

pub async fn run(
    query: &str,
    store: &DocumentStore,
    config: &EagleConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let location = &config.search.location;
    let limit = effective_limit(None, flags.limit, config.search.default_limit);
    let docs = store
        .search_text(location, query, limit)
        .await
        .with_context(|| format!("search in '{location}' failed; run 'eagle bootstrap' first"))?;

    let registry = store.registry();
    let results: Vec<Value> = docs
        .iter()
        .map(|doc| {
            doc.schema_name()
                .and_then(|name| registry.get(name))
                .map_or_else(|| doc.to_value(), |schema| Value::Object(schema.to_object(doc)))
        })
        .collect();
    output(&results, flags.format)
}
