use flate2::read::ZlibDecoder;
use std::io::Read;

use super::RegionError;

/// Compression scheme ids that may precede a chunk payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Compression {
    /// GZip Compression
    GZip = Self::GZIP_ID,
    /// ZLib Compression
    ZLib = Self::ZLIB_ID,
    /// Stored without compression
    None = Self::NO_COMPRESSION_ID,
    /// LZ4 Compression (since 24w04a)
    LZ4 = Self::LZ4_ID,
    /// Custom compression algorithm (since 24w05a)
    Custom = Self::CUSTOM_ID,
}

impl Compression {
    const GZIP_ID: u8 = 1;
    const ZLIB_ID: u8 = 2;
    const NO_COMPRESSION_ID: u8 = 3;
    const LZ4_ID: u8 = 4;
    const CUSTOM_ID: u8 = 127;

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            Self::GZIP_ID => Some(Self::GZip),
            Self::ZLIB_ID => Some(Self::ZLib),
            Self::NO_COMPRESSION_ID => Some(Self::None),
            Self::LZ4_ID => Some(Self::LZ4),
            Self::CUSTOM_ID => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Self::ZLib)
    }

    /// Inflates a payload. Only zlib is read; every other scheme is refused.
    pub fn decompress_data(&self, compressed_data: &[u8]) -> Result<Vec<u8>, RegionError> {
        match self {
            Compression::ZLib => {
                let mut decoder = ZlibDecoder::new(compressed_data);
                let mut chunk_data = Vec::new();
                decoder
                    .read_to_end(&mut chunk_data)
                    .map_err(RegionError::Decompression)?;
                Ok(chunk_data)
            }
            other => Err(RegionError::UnsupportedCompression(*other as u8)),
        }
    }
}

/// Human readable name of a scheme id, for error messages.
pub(crate) fn scheme_name(id: &u8) -> &'static str {
    match Compression::from_byte(*id) {
        Some(Compression::GZip) => "gzip",
        Some(Compression::ZLib) => "zlib",
        Some(Compression::None) => "uncompressed",
        Some(Compression::LZ4) => "lz4",
        Some(Compression::Custom) => "custom",
        None => "unknown",
    }
}
