use eagle_config::EagleConfig;
use eagle_db::store::DocumentStore;

use crate::cli::{Commands, GlobalFlags};

mod audit;
mod bootstrap;
mod entities;
mod search;

pub async fn dispatch(
    command: Commands,
    store: &DocumentStore,
    config: &EagleConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Bootstrap => bootstrap::run(store, config, flags),
        Commands::Entities { name } => entities::run(name.as_deref(), store, flags),
        Commands::Search { query } => search::run(&query, store, config, flags).await,
        Commands::Audit { object_id, schema } => {
            audit::run(object_id, schema, store, flags).await
        }
    }
}

/// Compute effective limit with precedence: local arg -> global flag -> fallback.
#[must_use]
pub fn effective_limit(local: Option<u32>, global: Option<u32>, fallback: u32) -> u32 {
    local.or(global).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::effective_limit;

    #[test]
    fn global_used_when_local_missing() {
        assert_eq!(effective_limit(None, Some(10), 20), 10);
        assert_eq!(effective_limit(Some(5), Some(10), 20), 5);
    }

    #[test]
    fn fallback_used_when_none_set() {
        assert_eq!(effective_limit(None, None, 20), 20);
    }
}
