use bytes::Buf;

use super::{CHUNK_COUNT, HEADER_BYTES, REGION_SIZE, RegionError, SECTOR_BYTES, check_bounds};

/// One entry of the location table: where a slot's payload starts and how
/// many sectors were allocated for it, both in 4 KiB units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    pub sector_offset: u32,
    pub sector_count: u8,
}

impl Location {
    pub const fn from_u32(raw: u32) -> Self {
        Self {
            sector_offset: raw >> 8,
            sector_count: (raw & 0xFF) as u8,
        }
    }

    /// Offset and count both zero: nothing stored for this slot.
    pub const fn is_empty(&self) -> bool {
        self.sector_offset == 0 && self.sector_count == 0
    }

    /// Absolute position in the file, counted from its first byte.
    pub const fn byte_offset(&self) -> usize {
        self.sector_offset as usize * SECTOR_BYTES
    }

    pub const fn allocated_bytes(&self) -> usize {
        self.sector_count as usize * SECTOR_BYTES
    }
}

/// The two header sectors of a region file.
#[derive(Debug, Clone)]
pub struct RegionHeader {
    locations: Box<[Location; CHUNK_COUNT]>,
    timestamps: Box<[u32; CHUNK_COUNT]>,
}

impl RegionHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, RegionError> {
        if bytes.len() < HEADER_BYTES {
            return Err(RegionError::InvalidHeader(bytes.len()));
        }

        let (mut location_bytes, mut timestamp_bytes) = bytes[..HEADER_BYTES].split_at(SECTOR_BYTES);

        let mut locations = Box::new([Location::default(); CHUNK_COUNT]);
        let mut timestamps = Box::new([0u32; CHUNK_COUNT]);
        for i in 0..CHUNK_COUNT {
            locations[i] = Location::from_u32(location_bytes.get_u32());
            timestamps[i] = timestamp_bytes.get_u32();
        }

        Ok(Self {
            locations,
            timestamps,
        })
    }

    /// Index of slot `(x, z)` in both tables.
    pub const fn slot_index(x: u8, z: u8) -> usize {
        x as usize + z as usize * REGION_SIZE
    }

    /// Inverse of [`Self::slot_index`].
    pub const fn slot_coords(index: usize) -> (u8, u8) {
        ((index % REGION_SIZE) as u8, (index / REGION_SIZE) as u8)
    }

    pub fn location(&self, x: u8, z: u8) -> Result<Location, RegionError> {
        check_bounds(x, z)?;
        Ok(self.locations[Self::slot_index(x, z)])
    }

    /// Last modification time of the slot, in Unix seconds.
    pub fn timestamp(&self, x: u8, z: u8) -> Result<u32, RegionError> {
        check_bounds(x, z)?;
        Ok(self.timestamps[Self::slot_index(x, z)])
    }

    /// Coordinates of every slot with a non-empty location, in slot order.
    pub fn present_slots(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.locations
            .iter()
            .enumerate()
            .filter(|(_, location)| !location.is_empty())
            .map(|(index, _)| Self::slot_coords(index))
    }
}
