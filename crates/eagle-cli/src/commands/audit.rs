use eagle_db::audit::AuditFilter;
use eagle_db::store::DocumentStore;

use super::effective_limit;
use crate::cli::GlobalFlags;
use crate::output::output;

pub async fn run(
    object_id: Option<String>,
    schema: Option<String>,
    store: &DocumentStore,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = AuditFilter {
        object_schema_name: schema,
        object_id,
        limit: Some(effective_limit(None, flags.limit, 50)),
    };
    let records = store.query_audit(&filter).await?;
    output(&records, flags.format)
}
