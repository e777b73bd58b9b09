use log::warn;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{fs, io, path::Path, path::PathBuf};
use thiserror::Error;

pub mod nbt;
pub mod world;

pub use nbt::NbtConfig;
pub use world::WorldConfig;

const CONFIG_ROOT_FOLDER: &str = "config/";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Couldn't read configuration file at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Couldn't parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for reading documents and worlds.
/// The defaults accept every well-formed file.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ReaderConfig {
    pub nbt: NbtConfig,
    pub world: WorldConfig,
}

impl ReaderConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

pub trait LoadConfiguration {
    /// Loads `config/<file>` below `exec_dir`, writing the defaults there
    /// when the file does not exist yet.
    fn load(exec_dir: &Path) -> Result<Self, ConfigError>
    where
        Self: Sized + Default + Serialize + DeserializeOwned,
    {
        let config_dir = exec_dir.join(CONFIG_ROOT_FOLDER);
        let path = config_dir.join(Self::get_path());

        let config = if path.exists() {
            let file_content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
            toml::from_str(&file_content)?
        } else {
            let content = Self::default();
            if let Err(err) = write_default(&config_dir, &path, &content) {
                warn!("Couldn't write default config to {:?}. Reason: {}", &path, err);
            }
            content
        };

        config.validate()?;
        Ok(config)
    }

    fn get_path() -> &'static Path;

    fn validate(&self) -> Result<(), ConfigError>;
}

fn write_default<T: Serialize>(config_dir: &Path, path: &Path, content: &T) -> io::Result<()> {
    if !config_dir.exists() {
        log::debug!("creating new config root folder");
        fs::create_dir_all(config_dir)?;
    }
    let serialized = toml::to_string(content)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    fs::write(path, serialized)
}

impl LoadConfiguration for ReaderConfig {
    fn get_path() -> &'static Path {
        Path::new("reader.toml")
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.nbt.validate()?;
        self.world.validate()
    }
}
