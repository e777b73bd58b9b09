use std::io::Write;

use crate::Error;

pub type Result<T> = std::result::Result<T, Error>;

macro_rules! write_be {
    ($name:ident, $ty:ty) => {
        pub fn $name(&mut self, value: $ty) -> Result<()> {
            self.write_slice(&value.to_be_bytes())
        }
    };
}

/// Big-endian writer for building NBT streams.
pub struct NbtWriter<W: Write> {
    writer: W,
}

impl<W: Write> NbtWriter<W> {
    pub fn new(w: W) -> Self {
        Self { writer: w }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn write_slice(&mut self, value: &[u8]) -> Result<()> {
        self.writer.write_all(value)?;
        Ok(())
    }

    write_be!(write_u8_be, u8);
    write_be!(write_i8_be, i8);
    write_be!(write_u16_be, u16);
    write_be!(write_i16_be, i16);
    write_be!(write_i32_be, i32);
    write_be!(write_i64_be, i64);
    write_be!(write_f32_be, f32);
    write_be!(write_f64_be, f64);

    /// Writes an `i32` element count.
    pub fn write_length(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| Error::LargeLength(len))?;
        self.write_i32_be(len)
    }

    /// Writes a `u16` length-prefixed UTF-8 string.
    pub fn write_string(&mut self, string: &str) -> Result<()> {
        let len = u16::try_from(string.len()).map_err(|_| Error::LargeLength(string.len()))?;
        self.write_u16_be(len)?;
        self.write_slice(string.as_bytes())
    }
}
