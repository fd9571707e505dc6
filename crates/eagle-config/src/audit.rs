//! Audit entity configuration.

use serde::{Deserialize, Serialize};

fn default_entity_name() -> String {
    eagle_core::keys::AUDIT_ENTITY.to_string()
}

fn default_location() -> String {
    "audit".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Name of the entity that receives audit records. It never gets actor
    /// fields or an audit hook of its own.
    #[serde(default = "default_entity_name")]
    pub entity_name: String,

    /// Storage location audit records are written into.
    #[serde(default = "default_location")]
    pub location: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            entity_name: default_entity_name(),
            location: default_location(),
        }
    }
}
