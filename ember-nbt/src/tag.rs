use std::io::Write;

use crate::compound::NbtCompound;
use crate::list::NbtList;
use crate::serializer::NbtWriter;
use crate::*;

/// The thirteen tag ids of the format. Each id fixes the payload layout, so
/// there is no separate width field anywhere in the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagType {
    End = END_ID,
    Byte = BYTE_ID,
    Short = SHORT_ID,
    Int = INT_ID,
    Long = LONG_ID,
    Float = FLOAT_ID,
    Double = DOUBLE_ID,
    ByteArray = BYTE_ARRAY_ID,
    String = STRING_ID,
    List = LIST_ID,
    Compound = COMPOUND_ID,
    IntArray = INT_ARRAY_ID,
    LongArray = LONG_ARRAY_ID,
}

impl TagType {
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Payload width in bytes for the fixed-width scalar tags.
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            TagType::Byte => Some(1),
            TagType::Short => Some(2),
            TagType::Int | TagType::Float => Some(4),
            TagType::Long | TagType::Double => Some(8),
            _ => None,
        }
    }
}

impl TryFrom<u8> for TagType {
    type Error = MalformedReason;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            END_ID => TagType::End,
            BYTE_ID => TagType::Byte,
            SHORT_ID => TagType::Short,
            INT_ID => TagType::Int,
            LONG_ID => TagType::Long,
            FLOAT_ID => TagType::Float,
            DOUBLE_ID => TagType::Double,
            BYTE_ARRAY_ID => TagType::ByteArray,
            STRING_ID => TagType::String,
            LIST_ID => TagType::List,
            COMPOUND_ID => TagType::Compound,
            INT_ARRAY_ID => TagType::IntArray,
            LONG_ARRAY_ID => TagType::LongArray,
            _ => return Err(MalformedReason::UnknownTagId(value)),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NbtTag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Box<[u8]>),
    String(String),
    List(NbtList),
    Compound(NbtCompound),
    IntArray(Box<[i32]>),
    LongArray(Box<[i64]>),
}

impl NbtTag {
    pub const fn get_type(&self) -> TagType {
        match self {
            NbtTag::End => TagType::End,
            NbtTag::Byte(_) => TagType::Byte,
            NbtTag::Short(_) => TagType::Short,
            NbtTag::Int(_) => TagType::Int,
            NbtTag::Long(_) => TagType::Long,
            NbtTag::Float(_) => TagType::Float,
            NbtTag::Double(_) => TagType::Double,
            NbtTag::ByteArray(_) => TagType::ByteArray,
            NbtTag::String(_) => TagType::String,
            NbtTag::List(_) => TagType::List,
            NbtTag::Compound(_) => TagType::Compound,
            NbtTag::IntArray(_) => TagType::IntArray,
            NbtTag::LongArray(_) => TagType::LongArray,
        }
    }

    /// Returns the numeric id associated with the data type.
    pub const fn get_type_id(&self) -> u8 {
        self.get_type().id()
    }

    /// Writes the type id followed by the payload, without a name.
    pub fn serialize<W>(&self, w: &mut NbtWriter<W>) -> Result<(), Error>
    where
        W: Write,
    {
        w.write_u8_be(self.get_type_id())?;
        self.serialize_data(w)
    }

    pub fn serialize_data<W>(&self, w: &mut NbtWriter<W>) -> Result<(), Error>
    where
        W: Write,
    {
        match self {
            NbtTag::End => {}
            NbtTag::Byte(byte) => w.write_i8_be(*byte)?,
            NbtTag::Short(short) => w.write_i16_be(*short)?,
            NbtTag::Int(int) => w.write_i32_be(*int)?,
            NbtTag::Long(long) => w.write_i64_be(*long)?,
            NbtTag::Float(float) => w.write_f32_be(*float)?,
            NbtTag::Double(double) => w.write_f64_be(*double)?,
            NbtTag::ByteArray(byte_array) => {
                w.write_length(byte_array.len())?;
                w.write_slice(byte_array)?;
            }
            NbtTag::String(string) => w.write_string(string)?,
            NbtTag::List(list) => list.serialize_content(w)?,
            NbtTag::Compound(compound) => compound.serialize_content(w)?,
            NbtTag::IntArray(int_array) => {
                w.write_length(int_array.len())?;
                for int in int_array.iter() {
                    w.write_i32_be(*int)?;
                }
            }
            NbtTag::LongArray(long_array) => {
                w.write_length(long_array.len())?;
                for long in long_array.iter() {
                    w.write_i64_be(*long)?;
                }
            }
        };
        Ok(())
    }

    pub fn extract_byte(&self) -> Option<i8> {
        match self {
            NbtTag::Byte(byte) => Some(*byte),
            _ => None,
        }
    }

    pub fn extract_short(&self) -> Option<i16> {
        match self {
            NbtTag::Short(short) => Some(*short),
            _ => None,
        }
    }

    pub fn extract_int(&self) -> Option<i32> {
        match self {
            NbtTag::Int(int) => Some(*int),
            _ => None,
        }
    }

    pub fn extract_long(&self) -> Option<i64> {
        match self {
            NbtTag::Long(long) => Some(*long),
            _ => None,
        }
    }

    pub fn extract_float(&self) -> Option<f32> {
        match self {
            NbtTag::Float(float) => Some(*float),
            _ => None,
        }
    }

    pub fn extract_double(&self) -> Option<f64> {
        match self {
            NbtTag::Double(double) => Some(*double),
            _ => None,
        }
    }

    pub fn extract_bool(&self) -> Option<bool> {
        match self {
            NbtTag::Byte(byte) => Some(*byte != 0),
            _ => None,
        }
    }

    pub fn extract_byte_array(&self) -> Option<&[u8]> {
        match self {
            NbtTag::ByteArray(byte_array) => Some(byte_array),
            _ => None,
        }
    }

    pub fn extract_string(&self) -> Option<&str> {
        match self {
            NbtTag::String(string) => Some(string),
            _ => None,
        }
    }

    pub fn extract_list(&self) -> Option<&NbtList> {
        match self {
            NbtTag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn extract_compound(&self) -> Option<&NbtCompound> {
        match self {
            NbtTag::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    pub fn extract_int_array(&self) -> Option<&[i32]> {
        match self {
            NbtTag::IntArray(int_array) => Some(int_array),
            _ => None,
        }
    }

    pub fn extract_long_array(&self) -> Option<&[i64]> {
        match self {
            NbtTag::LongArray(long_array) => Some(long_array),
            _ => None,
        }
    }
}

impl From<&str> for NbtTag {
    fn from(value: &str) -> Self {
        NbtTag::String(value.to_string())
    }
}

impl From<String> for NbtTag {
    fn from(value: String) -> Self {
        NbtTag::String(value)
    }
}

impl From<&[u8]> for NbtTag {
    fn from(value: &[u8]) -> Self {
        NbtTag::ByteArray(value.into())
    }
}

impl From<i8> for NbtTag {
    fn from(value: i8) -> Self {
        NbtTag::Byte(value)
    }
}

impl From<i16> for NbtTag {
    fn from(value: i16) -> Self {
        NbtTag::Short(value)
    }
}

impl From<i32> for NbtTag {
    fn from(value: i32) -> Self {
        NbtTag::Int(value)
    }
}

impl From<i64> for NbtTag {
    fn from(value: i64) -> Self {
        NbtTag::Long(value)
    }
}

impl From<f32> for NbtTag {
    fn from(value: f32) -> Self {
        NbtTag::Float(value)
    }
}

impl From<f64> for NbtTag {
    fn from(value: f64) -> Self {
        NbtTag::Double(value)
    }
}

impl From<bool> for NbtTag {
    fn from(value: bool) -> Self {
        NbtTag::Byte(value as i8)
    }
}

impl From<NbtList> for NbtTag {
    fn from(value: NbtList) -> Self {
        NbtTag::List(value)
    }
}

impl From<NbtCompound> for NbtTag {
    fn from(value: NbtCompound) -> Self {
        NbtTag::Compound(value)
    }
}

#[cfg(test)]
mod test {
    use crate::{MalformedReason, tag::NbtTag, tag::TagType};

    #[test]
    fn test_every_id_maps_to_a_distinct_type() {
        let types: Vec<TagType> = (0u8..=12)
            .map(|id| TagType::try_from(id).unwrap())
            .collect();
        for (id, tag_type) in types.iter().enumerate() {
            assert_eq!(tag_type.id() as usize, id);
        }
        assert_eq!(TagType::Short.fixed_width(), Some(2));
        assert_eq!(TagType::Int.fixed_width(), Some(4));
    }

    #[test]
    fn test_unknown_id_is_rejected() {
        assert_eq!(
            TagType::try_from(13),
            Err(MalformedReason::UnknownTagId(13))
        );
    }

    #[test]
    fn test_type_id_of_values() {
        assert_eq!(NbtTag::Short(1).get_type_id(), 2);
        assert_eq!(NbtTag::Int(1).get_type_id(), 3);
        assert_eq!(NbtTag::from(true).extract_bool(), Some(true));
        assert_eq!(NbtTag::from("hi").extract_string(), Some("hi"));
    }
}
