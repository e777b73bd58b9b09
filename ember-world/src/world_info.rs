use ember_nbt::compound::NbtCompound;

/// The commonly used fields of a level metadata document. Everything is
/// optional because old and modded worlds omit fields freely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelInfo {
    // The name of the level.
    pub level_name: Option<String>,
    // An integer displaying the data version.
    pub data_version: Option<i32>,
    // The X, Y and Z coordinates of the world spawn.
    pub spawn: Option<(i32, i32, i32)>,
    // The Unix time in milliseconds when the level was last loaded.
    pub last_played: Option<i64>,
    // The time of day, counting past 24000.
    pub day_time: Option<i64>,
    // The name of the game version that last saved the level.
    pub version_name: Option<String>,
}

impl LevelInfo {
    /// Reads the fields from the root of a level document, which keeps them
    /// under its `Data` compound.
    pub fn from_root(root: &NbtCompound) -> Self {
        root.get_compound("Data")
            .map(Self::from_data)
            .unwrap_or_default()
    }

    pub fn from_data(data: &NbtCompound) -> Self {
        let spawn = match (
            data.get_int("SpawnX"),
            data.get_int("SpawnY"),
            data.get_int("SpawnZ"),
        ) {
            (Some(x), Some(y), Some(z)) => Some((x, y, z)),
            _ => None,
        };

        Self {
            level_name: data.get_string("LevelName").map(str::to_string),
            data_version: data.get_int("DataVersion"),
            spawn,
            last_played: data.get_long("LastPlayed"),
            day_time: data.get_long("DayTime"),
            version_name: data
                .get_compound("Version")
                .and_then(|version| version.get_string("Name"))
                .map(str::to_string),
        }
    }
}
