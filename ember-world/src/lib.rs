pub mod directory;
pub mod level;
pub mod region;
pub mod world_info;

pub use directory::{DirectoryError, RegionCoords, RegionDirectory};
pub use level::{LevelFolder, World, WorldError};
pub use region::{RegionError, RegionFile};
pub use world_info::LevelInfo;
