//! Whole-document decoding: one root compound, optionally gzip-wrapped,
//! spanning the entire buffer.

use crate::deserializer::{DecodeOptions, NbtReader};
use crate::nbt_compress::{gunzip, is_gzip};
use crate::{Error, Nbt};

/// Decodes a standalone document such as `level.dat`.
pub fn decode_document(bytes: &[u8]) -> Result<Nbt, Error> {
    decode_document_with(bytes, &DecodeOptions::default())
}

pub fn decode_document_with(bytes: &[u8], options: &DecodeOptions) -> Result<Nbt, Error> {
    if is_gzip(bytes) {
        log::debug!("Inflating gzip document of {} bytes", bytes.len());
        let inflated = gunzip(bytes)?;
        decode_raw_document_with(&inflated, options)
    } else {
        decode_raw_document_with(bytes, options)
    }
}

/// Decodes a document that is known not to carry a gzip envelope.
pub fn decode_raw_document(bytes: &[u8]) -> Result<Nbt, Error> {
    decode_raw_document_with(bytes, &DecodeOptions::default())
}

pub fn decode_raw_document_with(bytes: &[u8], options: &DecodeOptions) -> Result<Nbt, Error> {
    let mut reader = NbtReader::with_options(bytes, *options);
    let nbt = Nbt::read(&mut reader)?;

    let remaining = reader.remaining();
    if remaining > 0 {
        return Err(Error::TrailingData {
            offset: reader.position(),
            remaining,
        });
    }

    Ok(nbt)
}
