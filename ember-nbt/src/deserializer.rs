use std::borrow::Cow;

use crate::compound::NbtCompound;
use crate::list::NbtList;
use crate::tag::{NbtTag, TagType};
use crate::{Error, MalformedReason};

pub type Result<T> = std::result::Result<T, Error>;

/// Whether a name field follows the type id of the tag being decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamePolicy {
    Named,
    Unnamed,
}

/// Knobs for the decoder. The defaults accept everything the format allows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting of lists and compounds.
    pub max_depth: usize,
    /// Fail instead of letting the last duplicate compound entry win.
    pub strict_duplicate_names: bool,
    /// Retry strings that are not valid UTF-8 as Java modified UTF-8.
    pub java_strings: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: 512,
            strict_duplicate_names: false,
            java_strings: false,
        }
    }
}

/// A tag together with the name it was stored under, if any.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedTag {
    pub name: Option<String>,
    pub tag: NbtTag,
}

/// Decodes one tag starting at the first byte of `bytes` and reports how
/// many bytes it spanned.
pub fn decode_tag(bytes: &[u8], policy: NamePolicy) -> Result<(NamedTag, usize)> {
    let mut reader = NbtReader::new(bytes);
    let tag = reader.read_tag(policy)?;
    Ok((tag, reader.position()))
}

macro_rules! get_be {
    ($name:ident, $ty:ty, $width:literal) => {
        pub fn $name(&mut self) -> Result<$ty> {
            let buf = self.read_array::<$width>()?;
            Ok(<$ty>::from_be_bytes(buf))
        }
    };
}

/// Cursor over an in-memory NBT buffer.
#[derive(Debug)]
pub struct NbtReader<'a> {
    buf: &'a [u8],
    pos: usize,
    depth: usize,
    options: DecodeOptions,
}

impl<'a> NbtReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_options(buf, DecodeOptions::default())
    }

    pub fn with_options(buf: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            buf,
            pos: 0,
            depth: 0,
            options,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn read_slice(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::TruncatedStream {
                offset: self.pos,
                needed: count,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read_slice(N)?);
        Ok(buf)
    }

    get_be!(get_u8_be, u8, 1);
    get_be!(get_i8_be, i8, 1);
    get_be!(get_u16_be, u16, 2);
    get_be!(get_i16_be, i16, 2);
    get_be!(get_i32_be, i32, 4);
    get_be!(get_i64_be, i64, 8);
    get_be!(get_f32_be, f32, 4);
    get_be!(get_f64_be, f64, 8);

    fn malformed(offset: usize, reason: MalformedReason) -> Error {
        Error::MalformedTag { offset, reason }
    }

    pub fn read_tag_type(&mut self) -> Result<TagType> {
        let offset = self.pos;
        let id = self.get_u8_be()?;
        TagType::try_from(id).map_err(|reason| Self::malformed(offset, reason))
    }

    /// Reads an `i32` element count; negative counts are malformed.
    fn read_length(&mut self) -> Result<usize> {
        let offset = self.pos;
        let len = self.get_i32_be()?;
        if len < 0 {
            return Err(Self::malformed(offset, MalformedReason::NegativeLength(len)));
        }
        Ok(len as usize)
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.get_u16_be()? as usize;
        let start = self.pos;
        let bytes = self.read_slice(len)?;

        match std::str::from_utf8(bytes) {
            Ok(string) => Ok(string.to_owned()),
            Err(_) if self.options.java_strings => cesu8::from_java_cesu8(bytes)
                .map(Cow::into_owned)
                .map_err(|_| {
                    Self::malformed(
                        start,
                        MalformedReason::InvalidUtf8 {
                            start,
                            end: start + len,
                        },
                    )
                }),
            Err(_) => Err(Self::malformed(
                start,
                MalformedReason::InvalidUtf8 {
                    start,
                    end: start + len,
                },
            )),
        }
    }

    /// Reads a type id, then the name when the policy asks for one (End
    /// never carries a name), then the payload.
    pub fn read_tag(&mut self, policy: NamePolicy) -> Result<NamedTag> {
        let tag_type = self.read_tag_type()?;
        let name = match policy {
            NamePolicy::Named if tag_type != TagType::End => Some(self.read_string()?),
            _ => None,
        };
        let tag = self.read_payload(tag_type)?;
        Ok(NamedTag { name, tag })
    }

    /// Reads the payload of a tag whose type is already known, either from a
    /// preceding id byte or imposed by an enclosing list header.
    pub fn read_payload(&mut self, tag_type: TagType) -> Result<NbtTag> {
        Ok(match tag_type {
            TagType::End => NbtTag::End,
            TagType::Byte => NbtTag::Byte(self.get_i8_be()?),
            TagType::Short => NbtTag::Short(self.get_i16_be()?),
            TagType::Int => NbtTag::Int(self.get_i32_be()?),
            TagType::Long => NbtTag::Long(self.get_i64_be()?),
            TagType::Float => NbtTag::Float(self.get_f32_be()?),
            TagType::Double => NbtTag::Double(self.get_f64_be()?),
            TagType::ByteArray => {
                let len = self.read_length()?;
                NbtTag::ByteArray(self.read_slice(len)?.into())
            }
            TagType::String => NbtTag::String(self.read_string()?),
            TagType::List => NbtTag::List(self.read_list()?),
            TagType::Compound => NbtTag::Compound(self.read_compound()?),
            TagType::IntArray => {
                let len = self.read_length()?;
                let bytes = self.read_slice(len.saturating_mul(4))?;
                let ints = bytes
                    .chunks_exact(4)
                    .map(|chunk| i32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                    .collect();
                NbtTag::IntArray(ints)
            }
            TagType::LongArray => {
                let len = self.read_length()?;
                let bytes = self.read_slice(len.saturating_mul(8))?;
                let longs = bytes
                    .chunks_exact(8)
                    .map(|chunk| {
                        let mut buf = [0u8; 8];
                        buf.copy_from_slice(chunk);
                        i64::from_be_bytes(buf)
                    })
                    .collect();
                NbtTag::LongArray(longs)
            }
        })
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(Self::malformed(
                self.pos,
                MalformedReason::DepthExceeded(self.options.max_depth),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// Reads a list body: element type, count, then `count` unnamed payloads
    /// of that type. Element ids are not repeated in the stream.
    pub fn read_list(&mut self) -> Result<NbtList> {
        self.enter()?;
        let element_type = self.read_tag_type()?;
        let count_offset = self.pos;
        let len = self.read_length()?;

        if element_type == TagType::End && len > 0 {
            return Err(Self::malformed(
                count_offset,
                MalformedReason::EndListWithElements(len as i32),
            ));
        }

        // Every non-End element takes at least one byte
        let mut elements = Vec::with_capacity(len.min(self.remaining()));
        for _ in 0..len {
            elements.push(self.read_payload(element_type)?);
        }

        self.depth -= 1;
        Ok(NbtList::from_parts(element_type, elements))
    }

    /// Reads compound entries up to and including the closing End tag.
    pub fn read_compound(&mut self) -> Result<NbtCompound> {
        self.enter()?;
        let mut compound = NbtCompound::new();

        loop {
            let tag_type = self.read_tag_type()?;
            if tag_type == TagType::End {
                break;
            }

            let name_offset = self.pos;
            let name = self.read_string()?;
            let tag = self.read_payload(tag_type)?;

            if self.options.strict_duplicate_names && compound.contains_key(&name) {
                return Err(Self::malformed(
                    name_offset,
                    MalformedReason::DuplicateName(name),
                ));
            }
            compound.put(name, tag);
        }

        self.depth -= 1;
        Ok(compound)
    }
}
