//! libSQL database configuration.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    "eagle.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Local database file, or `:memory:`.
    #[serde(default = "default_path")]
    pub path: String,

    /// Remote database URL (e.g., `libsql://eagle.turso.io`). Takes precedence
    /// over `path` when paired with an auth token.
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub auth_token: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            url: String::new(),
            auth_token: String::new(),
        }
    }
}

impl DatabaseConfig {
    /// Whether a remote database is configured.
    pub fn is_remote(&self) -> bool {
        !self.url.is_empty() && !self.auth_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_local_file() {
        let config = DatabaseConfig::default();
        assert_eq!(config.path, "eagle.db");
        assert!(!config.is_remote());
    }

    #[test]
    fn remote_needs_url_and_token() {
        let mut config = DatabaseConfig {
            url: "libsql://eagle.turso.io".into(),
            ..Default::default()
        };
        assert!(!config.is_remote());
        config.auth_token = "token".into();
        assert!(config.is_remote());
    }
}
