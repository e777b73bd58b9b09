use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Where a world keeps its files, relative to the world root.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// The standalone metadata document.
    pub level_file_name: String,
    /// The folder holding the region containers.
    pub region_folder: String,
    /// Extension every file in the region folder must carry.
    pub region_extension: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            level_file_name: "level.dat".to_string(),
            region_folder: "region".to_string(),
            region_extension: "mca".to_string(),
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("world.level_file_name", &self.level_file_name),
            ("world.region_folder", &self.region_folder),
            ("world.region_extension", &self.region_extension),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("{key} must not be empty")));
            }
        }
        if self.region_extension.contains('.') {
            return Err(ConfigError::Invalid(
                "world.region_extension must not contain a dot".to_string(),
            ));
        }
        Ok(())
    }
}
