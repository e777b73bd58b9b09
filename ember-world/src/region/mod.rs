use std::collections::BTreeMap;

use bytes::{Buf, Bytes};
use ember_nbt::{DecodeOptions, Nbt, document::decode_raw_document_with};
use thiserror::Error;

mod compression;
mod header;

pub use compression::Compression;
pub use header::{Location, RegionHeader};

use compression::scheme_name;

/// The side size of a region in chunks (one region is 32x32 chunks)
pub const REGION_SIZE: usize = 32;

/// The number of chunks in a region
pub const CHUNK_COUNT: usize = REGION_SIZE * REGION_SIZE;

/// The number of bytes in a sector (4 KiB)
pub const SECTOR_BYTES: usize = 4096;

/// Location table plus timestamp table
pub const HEADER_SECTORS: u32 = 2;
pub const HEADER_BYTES: usize = HEADER_SECTORS as usize * SECTOR_BYTES;

/// Payload length (4 bytes) plus compression scheme (1 byte)
const PAYLOAD_HEADER_BYTES: usize = 5;

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("Region header needs {HEADER_BYTES} bytes, file has {0}")]
    InvalidHeader(usize),
    #[error("Slot ({x}, {z}) is outside the 32x32 region")]
    SlotOutOfBounds { x: u8, z: u8 },
    #[error("Invalid location for slot ({x}, {z}): {reason}")]
    InvalidLocation { x: u8, z: u8, reason: String },
    #[error("Unsupported compression scheme {0} ({name})", name = scheme_name(.0))]
    UnsupportedCompression(u8),
    #[error("Region was cut short at byte {offset}: needed {needed} bytes, {available} available")]
    TruncatedStream {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("Error while inflating a chunk: {0}")]
    Decompression(std::io::Error),
    #[error("Failed to decode chunk document: {0}")]
    Nbt(#[from] ember_nbt::Error),
    #[error("Chunk ({x}, {z}): {source}")]
    Slot {
        x: u8,
        z: u8,
        source: Box<RegionError>,
    },
}

/// An in-memory region container. The header is parsed up front; slot
/// payloads are inflated and decoded on request.
///
/// Slots never share bytes, so separate slots can be read from separate
/// threads.
#[derive(Debug, Clone)]
pub struct RegionFile {
    header: RegionHeader,
    bytes: Bytes,
    options: DecodeOptions,
}

impl RegionFile {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Result<Self, RegionError> {
        Self::with_options(bytes, DecodeOptions::default())
    }

    pub fn with_options(
        bytes: impl Into<Bytes>,
        options: DecodeOptions,
    ) -> Result<Self, RegionError> {
        let bytes = bytes.into();
        let header = RegionHeader::parse(&bytes)?;
        log::debug!(
            "Parsed region header: {} bytes, {} chunks present",
            bytes.len(),
            header.present_slots().count()
        );
        Ok(Self {
            header,
            bytes,
            options,
        })
    }

    pub fn header(&self) -> &RegionHeader {
        &self.header
    }

    pub fn location(&self, x: u8, z: u8) -> Result<Location, RegionError> {
        self.header.location(x, z)
    }

    pub fn timestamp(&self, x: u8, z: u8) -> Result<u32, RegionError> {
        self.header.timestamp(x, z)
    }

    pub fn is_present(&self, x: u8, z: u8) -> bool {
        self.header
            .location(x, z)
            .is_ok_and(|location| !location.is_empty())
    }

    pub fn present_slots(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.header.present_slots()
    }

    /// Returns the scheme and the still-compressed bytes stored for a slot,
    /// or `None` when the slot is empty.
    pub fn raw_chunk(&self, x: u8, z: u8) -> Result<Option<(Compression, Bytes)>, RegionError> {
        let location = self.location(x, z)?;
        if location.is_empty() {
            return Ok(None);
        }

        if location.sector_offset < HEADER_SECTORS {
            return Err(RegionError::InvalidLocation {
                x,
                z,
                reason: format!(
                    "sector offset {} points into the header",
                    location.sector_offset
                ),
            });
        }

        let start = location.byte_offset();
        let available = self.bytes.len().saturating_sub(start);
        if available < PAYLOAD_HEADER_BYTES {
            return Err(RegionError::TruncatedStream {
                offset: start,
                needed: PAYLOAD_HEADER_BYTES,
                available,
            });
        }

        let mut payload = self.bytes.slice(start..);
        let length = payload.get_u32() as usize;
        let scheme = payload.get_u8();

        if length == 0 {
            return Err(RegionError::InvalidLocation {
                x,
                z,
                reason: "payload length is zero".to_string(),
            });
        }

        let compression = Compression::from_byte(scheme)
            .filter(Compression::is_supported)
            .ok_or(RegionError::UnsupportedCompression(scheme))?;

        // Minus one for the compression byte
        let data_len = length - 1;
        if data_len > payload.len() {
            return Err(RegionError::TruncatedStream {
                offset: start + PAYLOAD_HEADER_BYTES,
                needed: data_len,
                available: payload.len(),
            });
        }

        if length + 4 > location.allocated_bytes() {
            log::warn!(
                "Chunk ({}, {}) spans {} bytes but only {} sectors are allocated",
                x,
                z,
                length + 4,
                location.sector_count
            );
        }

        log::trace!(
            "Reading chunk ({}, {}) at sector {}: {} bytes, {:?}",
            x,
            z,
            location.sector_offset,
            data_len,
            compression
        );
        Ok(Some((compression, payload.slice(..data_len))))
    }

    /// Inflates and decodes the document stored in slot `(x, z)`.
    pub fn read_chunk(&self, x: u8, z: u8) -> Result<Option<Nbt>, RegionError> {
        let Some((compression, compressed)) = self.raw_chunk(x, z)? else {
            return Ok(None);
        };

        let inflated = compression.decompress_data(&compressed)?;
        let nbt = decode_raw_document_with(&inflated, &self.options)?;
        Ok(Some(nbt))
    }

    /// Decodes every present slot. The first failing slot aborts the whole
    /// read and is reported with its coordinates.
    pub fn read_all(&self) -> Result<BTreeMap<(u8, u8), Nbt>, RegionError> {
        let mut chunks = BTreeMap::new();
        for (x, z) in self.header.present_slots() {
            let chunk = self
                .read_chunk(x, z)
                .map_err(|err| RegionError::Slot {
                    x,
                    z,
                    source: Box::new(err),
                })?;
            if let Some(nbt) = chunk {
                chunks.insert((x, z), nbt);
            }
        }
        Ok(chunks)
    }
}

fn check_bounds(x: u8, z: u8) -> Result<(), RegionError> {
    if x as usize >= REGION_SIZE || z as usize >= REGION_SIZE {
        return Err(RegionError::SlotOutOfBounds { x, z });
    }
    Ok(())
}


#[cfg(test)]
mod test {
    use ember_nbt::{Nbt, compound::NbtCompound};

    use super::testing::{raw_region, region_with, zlib};
    use super::{HEADER_BYTES, RegionError, RegionFile};

    fn chunk(x: i32, z: i32) -> Nbt {
        let mut compound = NbtCompound::new();
        compound.put_int("xPos", x);
        compound.put_int("zPos", z);
        compound.put_string("Status", "minecraft:full");
        Nbt::from(compound)
    }

    #[test]
    fn test_empty_region() {
        let region = RegionFile::from_bytes(vec![0u8; HEADER_BYTES]).unwrap();
        assert_eq!(region.present_slots().count(), 0);
        assert!(region.read_chunk(0, 0).unwrap().is_none());
        assert!(region.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_single_empty_compound_at_sector_two() {
        let mut file = vec![0u8; HEADER_BYTES];
        file[0..4].copy_from_slice(&[0x00, 0x00, 0x02, 0x01]);
        let compressed = zlib(&[0x0A, 0x00, 0x00, 0x00]);
        file.extend_from_slice(&(compressed.len() as u32 + 1).to_be_bytes());
        file.push(0x02);
        file.extend_from_slice(&compressed);

        let region = RegionFile::from_bytes(file).unwrap();
        let chunks = region.read_all().unwrap();

        assert_eq!(chunks.len(), 1);
        let nbt = &chunks[&(0, 0)];
        assert_eq!(nbt.name, "");
        assert!(nbt.root_tag.is_empty());
    }

    #[test]
    fn test_sparse_mapping() {
        let a = chunk(3, 0);
        let b = chunk(31, 31);
        let region = RegionFile::from_bytes(region_with(&[(3, 0, &a), (31, 31, &b)])).unwrap();

        assert!(region.is_present(3, 0));
        assert!(!region.is_present(0, 0));
        assert!(!region.is_present(40, 0));
        assert_eq!(region.timestamp(3, 0).unwrap(), 1_600_000_003);

        let chunks = region.read_all().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[&(3, 0)], a);
        assert_eq!(chunks[&(31, 31)], b);
        assert!(!chunks.contains_key(&(0, 0)));
    }

    #[test]
    fn test_offsets_count_from_file_start() {
        let a = chunk(0, 0);
        let b = chunk(1, 0);
        let file = region_with(&[(0, 0, &a), (1, 0, &b)]);
        let region = RegionFile::from_bytes(file).unwrap();

        assert_eq!(region.location(0, 0).unwrap().sector_offset, 2);
        assert_eq!(region.location(1, 0).unwrap().sector_offset, 3);
        assert_eq!(region.read_chunk(1, 0).unwrap(), Some(b));
    }

    #[test]
    fn test_unsupported_compression() {
        let file = raw_region(&[(0, 0, 1, vec![1, 2, 3]), (1, 0, 9, vec![0])]);
        let region = RegionFile::from_bytes(file).unwrap();

        assert!(matches!(
            region.read_chunk(0, 0),
            Err(RegionError::UnsupportedCompression(1))
        ));
        assert!(matches!(
            region.read_chunk(1, 0),
            Err(RegionError::UnsupportedCompression(9))
        ));
    }

    #[test]
    fn test_failing_slot_is_reported() {
        let good = chunk(0, 0);
        let mut payloads = vec![(0, 0, 2, zlib(&good.write().unwrap()))];
        // Valid zlib, but the document starts with an End tag
        payloads.push((4, 2, 2, zlib(&[0x00])));
        let region = RegionFile::from_bytes(raw_region(&payloads)).unwrap();

        match region.read_all() {
            Err(RegionError::Slot { x: 4, z: 2, source }) => assert!(matches!(
                *source,
                RegionError::Nbt(ember_nbt::Error::EmptyDocument)
            )),
            other => panic!("Expected slot (4, 2) to fail, got {other:?}"),
        }
        assert_eq!(region.read_chunk(0, 0).unwrap(), Some(good));
    }

    #[test]
    fn test_trailing_bytes_in_payload() {
        let mut document = chunk(0, 0).write().unwrap().to_vec();
        document.push(0x00);
        let region = RegionFile::from_bytes(raw_region(&[(0, 0, 2, zlib(&document))])).unwrap();

        assert!(matches!(
            region.read_chunk(0, 0),
            Err(RegionError::Nbt(ember_nbt::Error::TrailingData { remaining: 1, .. }))
        ));
    }

    #[test]
    fn test_payload_with_unknown_root_id() {
        let region =
            RegionFile::from_bytes(raw_region(&[(2, 0, 2, zlib(&[0x0D, 0x00, 0x00, 0x00]))]))
                .unwrap();

        assert!(matches!(
            region.read_chunk(2, 0),
            Err(RegionError::Nbt(ember_nbt::Error::UnexpectedRootType(0x0D)))
        ));
        assert!(!region.is_present(40, 0));
        assert!(matches!(
            region.header().location(2, 32),
            Err(RegionError::SlotOutOfBounds { x: 2, z: 32 })
        ));
    }

    #[test]
    fn test_location_into_header() {
        let mut file = vec![0u8; HEADER_BYTES];
        file[4..8].copy_from_slice(&[0x00, 0x00, 0x01, 0x01]);
        let region = RegionFile::from_bytes(file).unwrap();

        assert!(matches!(
            region.read_chunk(1, 0),
            Err(RegionError::InvalidLocation { x: 1, z: 0, .. })
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let mut file = raw_region(&[(0, 0, 2, zlib(&chunk(0, 0).write().unwrap()))]);
        // Claim more data than the file holds
        file[HEADER_BYTES..HEADER_BYTES + 4].copy_from_slice(&100_000u32.to_be_bytes());
        let region = RegionFile::from_bytes(file).unwrap();

        assert!(matches!(
            region.read_chunk(0, 0),
            Err(RegionError::TruncatedStream {
                offset,
                needed: 99_999,
                ..
            }) if offset == HEADER_BYTES + 5
        ));

        let mut file = vec![0u8; HEADER_BYTES];
        file[0..4].copy_from_slice(&[0x00, 0x00, 0x05, 0x01]);
        let region = RegionFile::from_bytes(file).unwrap();
        assert!(matches!(
            region.read_chunk(0, 0),
            Err(RegionError::TruncatedStream { available: 0, .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_slot() {
        let region = RegionFile::from_bytes(vec![0u8; HEADER_BYTES]).unwrap();
        assert!(matches!(
            region.read_chunk(32, 0),
            Err(RegionError::SlotOutOfBounds { x: 32, z: 0 })
        ));
    }

    #[test]
    fn test_region_is_shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RegionFile>();
    }
}
