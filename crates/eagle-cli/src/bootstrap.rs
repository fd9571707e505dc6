use anyhow::Context;
use eagle_config::EagleConfig;
use eagle_db::EagleDb;
use eagle_db::store::DocumentStore;

pub fn load_config() -> anyhow::Result<EagleConfig> {
    EagleConfig::load_with_dotenv().context("failed to load eagle configuration")
}

/// Open the configured database, register every built-in entity, and
/// rebuild the text index over the shared location.
///
/// Registration failures abort startup.
pub async fn open_store(config: &EagleConfig) -> anyhow::Result<DocumentStore> {
    let db = if config.database.is_remote() {
        tracing::info!(url = %config.database.url, "opening remote database");
        EagleDb::open_remote(&config.database.url, &config.database.auth_token)
            .await
            .context("failed to open remote database")?
    } else {
        tracing::info!(path = %config.database.path, "opening local database");
        EagleDb::open_local(&config.database.path)
            .await
            .with_context(|| format!("failed to open database at {}", config.database.path))?
    };

    let store = DocumentStore::with_builtins(
        db,
        &config.audit.entity_name,
        &config.audit.location,
        &config.search.location,
    )
    .context("entity registration failed")?;

    store
        .rebuild_text_index(&config.search.location)
        .await
        .with_context(|| format!("failed to build text index for '{}'", config.search.location))?;
    Ok(store)
}
