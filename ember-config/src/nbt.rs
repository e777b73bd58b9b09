use ember_nbt::DecodeOptions;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct NbtConfig {
    /// Maximum nesting of lists and compounds before a document is rejected.
    pub max_depth: usize,
    /// Reject compounds that repeat a child name instead of keeping the last one.
    pub strict_duplicate_names: bool,
    /// Accept Java modified UTF-8 in strings that are not valid UTF-8.
    pub java_strings: bool,
}

impl Default for NbtConfig {
    fn default() -> Self {
        let options = DecodeOptions::default();
        Self {
            max_depth: options.max_depth,
            strict_duplicate_names: options.strict_duplicate_names,
            java_strings: options.java_strings,
        }
    }
}

impl NbtConfig {
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            max_depth: self.max_depth,
            strict_duplicate_names: self.strict_duplicate_names,
            java_strings: self.java_strings,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "nbt.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
