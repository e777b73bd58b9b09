use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use ember_config::WorldConfig;
use ember_nbt::{DecodeOptions, Nbt};
use thiserror::Error;

use crate::region::{RegionError, RegionFile};

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Unexpected file {name:?} in region folder: {reason}")]
    ContainerFormatError { name: String, reason: String },
    #[error("Io error on {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Failed to read region {path:?}: {source}")]
    Region { path: PathBuf, source: RegionError },
}

/// Region coordinates, which unlike slot coordinates may be negative.
pub type RegionCoords = (i32, i32);

/// Classifies a raw directory listing. Every name must look like
/// `<prefix>.<x>.<z>.<extension>`; anything else fails the whole listing.
pub fn classify_listing<I, S>(
    names: I,
    extension: &str,
) -> Result<BTreeMap<RegionCoords, String>, DirectoryError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut files = BTreeMap::new();
    for name in names {
        let name = name.into();
        let coords = parse_region_name(&name, extension)?;
        if let Some(previous) = files.get(&coords) {
            return Err(DirectoryError::ContainerFormatError {
                reason: format!("region {:?} is already stored in {:?}", coords, previous),
                name,
            });
        }
        log::trace!("Classified {} as region {:?}", name, coords);
        files.insert(coords, name);
    }
    Ok(files)
}

fn parse_region_name(name: &str, extension: &str) -> Result<RegionCoords, DirectoryError> {
    let format_error = |reason: String| DirectoryError::ContainerFormatError {
        name: name.to_string(),
        reason,
    };

    let fields: Vec<&str> = name.split('.').collect();
    let [_, x, z, ext] = fields.as_slice() else {
        return Err(format_error(format!(
            "expected <prefix>.<x>.<z>.{extension}"
        )));
    };
    if *ext != extension {
        return Err(format_error(format!("unexpected file extension {ext:?}")));
    }

    let parse = |field: &str| {
        field
            .parse::<i32>()
            .map_err(|_| format_error(format!("{field:?} is not a region coordinate")))
    };
    Ok((parse(*x)?, parse(*z)?))
}

/// A folder of region containers keyed by region coordinates.
#[derive(Debug, Clone)]
pub struct RegionDirectory {
    folder: PathBuf,
    files: BTreeMap<RegionCoords, PathBuf>,
    options: DecodeOptions,
}

impl RegionDirectory {
    pub fn open(
        folder: impl Into<PathBuf>,
        config: &WorldConfig,
        options: DecodeOptions,
    ) -> Result<Self, DirectoryError> {
        let folder = folder.into();
        let io_error = |source| DirectoryError::Io {
            path: folder.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&folder).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            let name = entry.file_name().into_string().map_err(|raw| {
                DirectoryError::ContainerFormatError {
                    name: raw.to_string_lossy().into_owned(),
                    reason: "file name is not valid UTF-8".to_string(),
                }
            })?;
            names.push(name);
        }

        let files = classify_listing(names, &config.region_extension)?
            .into_iter()
            .map(|(coords, name)| (coords, folder.join(name)))
            .collect::<BTreeMap<_, _>>();
        log::debug!("Found {} region files in {:?}", files.len(), folder);

        Ok(Self {
            folder,
            files,
            options,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn coordinates(&self) -> impl Iterator<Item = RegionCoords> + '_ {
        self.files.keys().copied()
    }

    pub fn path(&self, coords: RegionCoords) -> Option<&Path> {
        self.files.get(&coords).map(PathBuf::as_path)
    }

    /// Reads the region file at `coords` into memory and parses its header.
    pub fn load(&self, coords: RegionCoords) -> Result<Option<RegionFile>, DirectoryError> {
        let Some(path) = self.files.get(&coords) else {
            return Ok(None);
        };
        let bytes = fs::read(path).map_err(|source| DirectoryError::Io {
            path: path.clone(),
            source,
        })?;
        let region =
            RegionFile::with_options(bytes, self.options).map_err(|source| {
                DirectoryError::Region {
                    path: path.clone(),
                    source,
                }
            })?;
        Ok(Some(region))
    }

    pub fn load_all(&self) -> Result<BTreeMap<RegionCoords, RegionFile>, DirectoryError> {
        let mut regions = BTreeMap::new();
        for coords in self.coordinates() {
            if let Some(region) = self.load(coords)? {
                regions.insert(coords, region);
            }
        }
        Ok(regions)
    }

    /// Decodes every chunk of every region.
    pub fn read_all_chunks(
        &self,
    ) -> Result<BTreeMap<RegionCoords, BTreeMap<(u8, u8), Nbt>>, DirectoryError> {
        let mut chunks = BTreeMap::new();
        for (coords, region) in self.load_all()? {
            let region_chunks = region.read_all().map_err(|source| DirectoryError::Region {
                path: self.files[&coords].clone(),
                source,
            })?;
            chunks.insert(coords, region_chunks);
        }
        Ok(chunks)
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use ember_config::WorldConfig;
    use ember_nbt::{DecodeOptions, Nbt, compound::NbtCompound};

    use super::{DirectoryError, RegionDirectory, classify_listing};
    use crate::region::testing::region_with;

    #[test]
    fn test_classify_listing() {
        let files = classify_listing(["r.0.0.mca", "r.-1.3.mca", "region.12.-40.mca"], "mca").unwrap();

        assert_eq!(files.len(), 3);
        assert_eq!(files[&(0, 0)], "r.0.0.mca");
        assert_eq!(files[&(-1, 3)], "r.-1.3.mca");
        assert_eq!(files[&(12, -40)], "region.12.-40.mca");
    }

    #[test]
    fn test_unexpected_extension_is_fatal() {
        for name in ["r.0.0.mcr", "r.0.0.mca.tmp", "session.lock", "r.a.0.mca"] {
            let err = classify_listing(["r.1.1.mca", name], "mca").unwrap_err();
            assert!(
                matches!(&err, DirectoryError::ContainerFormatError { name: bad, .. } if bad == name),
                "{name} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_duplicate_coordinates() {
        assert!(matches!(
            classify_listing(["r.0.0.mca", "region.0.0.mca"], "mca"),
            Err(DirectoryError::ContainerFormatError { .. })
        ));
    }

    #[test]
    fn test_open_and_read_folder() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut compound = NbtCompound::new();
        compound.put_string("Status", "minecraft:full");
        let chunk = Nbt::from(compound);

        fs::write(
            temp_dir.path().join("r.0.0.mca"),
            region_with(&[(1, 2, &chunk)]),
        )
        .unwrap();
        fs::write(temp_dir.path().join("r.-1.0.mca"), region_with(&[])).unwrap();

        let directory =
            RegionDirectory::open(temp_dir.path(), &WorldConfig::default(), DecodeOptions::default())
                .unwrap();
        assert_eq!(directory.coordinates().collect::<Vec<_>>(), [(-1, 0), (0, 0)]);
        assert!(directory.load((5, 5)).unwrap().is_none());

        let chunks = directory.read_all_chunks().unwrap();
        assert!(chunks[&(-1, 0)].is_empty());
        assert_eq!(chunks[&(0, 0)][&(1, 2)], chunk);
    }

    #[test]
    fn test_missing_folder() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            RegionDirectory::open(
                temp_dir.path().join("region"),
                &WorldConfig::default(),
                DecodeOptions::default()
            ),
            Err(DirectoryError::Io { .. })
        ));
    }

    #[test]
    fn test_short_region_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("r.0.0.mca"), [0u8; 100]).unwrap();

        let directory =
            RegionDirectory::open(temp_dir.path(), &WorldConfig::default(), DecodeOptions::default())
                .unwrap();
        assert!(matches!(
            directory.load((0, 0)),
            Err(DirectoryError::Region { .. })
        ));
    }
}
