//! Full-text search configuration.

use serde::{Deserialize, Serialize};

fn default_location() -> String {
    "epic".to_string()
}

const fn default_limit() -> u32 {
    20
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Shared storage location the text index is built over.
    #[serde(default = "default_location")]
    pub location: String,

    /// Default result limit for search and list commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            default_limit: default_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = SearchConfig::default();
        assert_eq!(config.location, "epic");
        assert_eq!(config.default_limit, 20);
    }
}
