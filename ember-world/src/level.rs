use std::{
    fs, io,
    path::{Path, PathBuf},
};

use ember_config::ReaderConfig;
use ember_nbt::{Nbt, decode_document_with, nbt_compress::is_gzip};
use thiserror::Error;

use crate::{
    directory::{DirectoryError, RegionDirectory},
    world_info::LevelInfo,
};

#[derive(Error, Debug)]
pub enum WorldError {
    #[error("Io error on {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Failed to decode the level document: {0}")]
    Level(#[from] ember_nbt::Error),
    #[error("Failed to open the region folder: {0}")]
    Directory(#[from] DirectoryError),
}

#[derive(Debug, Clone)]
pub struct LevelFolder {
    pub root_folder: PathBuf,
    pub region_folder: PathBuf,
}

/// A saved world: the level metadata document plus its region folder.
///
/// Opening a world reads and decodes the metadata eagerly; region files are
/// only listed and are read on demand through [`World::regions`].
#[derive(Debug)]
pub struct World {
    folder: LevelFolder,
    level_path: PathBuf,
    level: Nbt,
    // Whether the level document was stored in a gzip envelope
    level_compressed: bool,
    regions: RegionDirectory,
}

impl World {
    pub fn open(root_folder: impl Into<PathBuf>) -> Result<Self, WorldError> {
        Self::open_with(root_folder, &ReaderConfig::default())
    }

    pub fn open_with(
        root_folder: impl Into<PathBuf>,
        config: &ReaderConfig,
    ) -> Result<Self, WorldError> {
        let root_folder = root_folder.into();
        let folder = LevelFolder {
            region_folder: root_folder.join(&config.world.region_folder),
            root_folder,
        };
        let options = config.nbt.decode_options();

        let level_path = folder.root_folder.join(&config.world.level_file_name);
        let level_bytes = fs::read(&level_path).map_err(|source| WorldError::Io {
            path: level_path.clone(),
            source,
        })?;
        let level_compressed = is_gzip(&level_bytes);
        let level = decode_document_with(&level_bytes, &options)?;
        log::debug!(
            "Read level document {:?} (gzip: {})",
            level_path,
            level_compressed
        );

        let regions = RegionDirectory::open(&folder.region_folder, &config.world, options)?;

        Ok(Self {
            folder,
            level_path,
            level,
            level_compressed,
            regions,
        })
    }

    pub fn folder(&self) -> &LevelFolder {
        &self.folder
    }

    pub fn level(&self) -> &Nbt {
        &self.level
    }

    /// The file the level document was read from.
    pub fn level_path(&self) -> &Path {
        &self.level_path
    }

    pub fn level_compressed(&self) -> bool {
        self.level_compressed
    }

    pub fn level_info(&self) -> LevelInfo {
        LevelInfo::from_root(&self.level)
    }

    pub fn level_name(&self) -> Option<&str> {
        self.level
            .get_compound("Data")
            .and_then(|data| data.get_string("LevelName"))
    }

    pub fn regions(&self) -> &RegionDirectory {
        &self.regions
    }
}
