use std::{
    io::{self, Write},
    ops::Deref,
};

use bytes::Bytes;
use compound::NbtCompound;
use deserializer::NbtReader;
use serializer::NbtWriter;
use tag::{NbtTag, TagType};
use thiserror::Error;

pub mod compound;
pub mod deserializer;
pub mod document;
pub mod list;
pub mod nbt_compress;
pub mod serializer;
pub mod tag;

pub use deserializer::{DecodeOptions, NamePolicy, NamedTag, decode_tag};
pub use document::{decode_document, decode_document_with, decode_raw_document};
pub use list::NbtList;

pub const END_ID: u8 = 0x00;
pub const BYTE_ID: u8 = 0x01;
pub const SHORT_ID: u8 = 0x02;
pub const INT_ID: u8 = 0x03;
pub const LONG_ID: u8 = 0x04;
pub const FLOAT_ID: u8 = 0x05;
pub const DOUBLE_ID: u8 = 0x06;
pub const BYTE_ARRAY_ID: u8 = 0x07;
pub const STRING_ID: u8 = 0x08;
pub const LIST_ID: u8 = 0x09;
pub const COMPOUND_ID: u8 = 0x0A;
pub const INT_ARRAY_ID: u8 = 0x0B;
pub const LONG_ARRAY_ID: u8 = 0x0C;

/// Why a tag was rejected as malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("unknown tag id {0}")]
    UnknownTagId(u8),
    #[error("negative length {0}")]
    NegativeLength(i32),
    #[error("invalid UTF-8 in bytes {start}..{end}")]
    InvalidUtf8 { start: usize, end: usize },
    #[error("list of End tags declares {0} elements")]
    EndListWithElements(i32),
    #[error("duplicate compound entry {0:?}")]
    DuplicateName(String),
    #[error("nesting deeper than {0} levels")]
    DepthExceeded(usize),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed tag at byte {offset}: {reason}")]
    MalformedTag {
        offset: usize,
        reason: MalformedReason,
    },
    #[error("NBT stream was cut short at byte {offset}: needed {needed} bytes, {available} available")]
    TruncatedStream {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("The document starts with an End tag")]
    EmptyDocument,
    #[error("The root tag of the document is not a compound tag. Received tag id: {0}")]
    UnexpectedRootType(u8),
    #[error("{remaining} unexpected bytes after the document, starting at byte {offset}")]
    TrailingData { offset: usize, remaining: usize },
    #[error("Failed to inflate the document: {0}")]
    Decompression(io::Error),
    #[error("Length too large {0}")]
    LargeLength(usize),
    #[error("List of {expected:?} cannot hold a {found:?}")]
    ListTypeMismatch { expected: TagType, found: TagType },
    #[error("Io error: {0}")]
    Io(#[from] io::Error),
}

/// A decoded document: the root compound together with its name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Nbt {
    pub name: String,
    pub root_tag: NbtCompound,
}

impl Nbt {
    pub fn new(name: String, tag: NbtCompound) -> Self {
        Nbt {
            name,
            root_tag: tag,
        }
    }

    /// Reads the root compound at the reader's position. The root must be a
    /// named compound; bytes after it are left for the caller to judge.
    pub fn read(reader: &mut NbtReader<'_>) -> Result<Nbt, Error> {
        let tag_type_id = reader.get_u8_be()?;

        // Unknown ids are reported like any other non-compound root
        match TagType::try_from(tag_type_id) {
            Ok(TagType::Compound) => {}
            Ok(TagType::End) => return Err(Error::EmptyDocument),
            _ => return Err(Error::UnexpectedRootType(tag_type_id)),
        }

        Ok(Nbt {
            name: reader.read_string()?,
            root_tag: reader.read_compound()?,
        })
    }

    pub fn write(&self) -> Result<Bytes, Error> {
        let mut bytes = Vec::new();
        self.write_to_writer(&mut bytes)?;
        Ok(bytes.into())
    }

    pub fn write_to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut writer = NbtWriter::new(writer);
        writer.write_u8_be(COMPOUND_ID)?;
        writer.write_string(&self.name)?;
        self.root_tag.serialize_content(&mut writer)
    }
}

impl Deref for Nbt {
    type Target = NbtCompound;

    fn deref(&self) -> &Self::Target {
        &self.root_tag
    }
}

impl From<NbtCompound> for Nbt {
    fn from(value: NbtCompound) -> Self {
        Nbt::new(String::new(), value)
    }
}

impl AsRef<NbtCompound> for Nbt {
    fn as_ref(&self) -> &NbtCompound {
        &self.root_tag
    }
}

impl From<Nbt> for NbtTag {
    fn from(value: Nbt) -> Self {
        NbtTag::Compound(value.root_tag)
    }
}
