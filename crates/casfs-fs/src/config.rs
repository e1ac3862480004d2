use serde::{Deserialize, Serialize};

/// Limits applied by the filesystem engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Largest single-block file, and the block size for large files.
    pub node_size_limit: usize,
    /// Hard cap on large-file size. `None` means no cap.
    pub max_file_size_override: Option<u64>,
    /// Maximum number of children in one directory.
    pub max_collection_children: usize,
    /// Maximum UTF-8 byte length of a child name.
    pub max_name_bytes: usize,
    /// Maximum `entries + deletes` in one rewrite.
    pub max_rewrite_entries: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            node_size_limit: 1024 * 1024,
            max_file_size_override: None,
            max_collection_children: 10_000,
            max_name_bytes: 255,
            max_rewrite_entries: 1_000,
        }
    }
}

impl FsConfig {
    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("node_size_limit", self.node_size_limit),
            ("max_collection_children", self.max_collection_children),
            ("max_name_bytes", self.max_name_bytes),
            ("max_rewrite_entries", self.max_rewrite_entries),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".into(),
                });
            }
        }
        if self.max_file_size_override == Some(0) {
            return Err(ConfigError::Invalid {
                field: "max_file_size_override",
                reason: "must be greater than zero when set".into(),
            });
        }
        Ok(())
    }
}

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
