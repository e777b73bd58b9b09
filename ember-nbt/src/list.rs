use std::io::Write;
use std::slice::Iter;

use crate::Error;
use crate::serializer::NbtWriter;
use crate::tag::{NbtTag, TagType};

/// A homogeneous list tag. The element type is declared once, in the list
/// header, and every element is stored without a name.
#[derive(Clone, Debug, PartialEq)]
pub struct NbtList {
    element_type: TagType,
    elements: Vec<NbtTag>,
}

impl NbtList {
    pub fn new(element_type: TagType) -> Self {
        Self {
            element_type,
            elements: Vec::new(),
        }
    }

    /// The empty list as it appears on disk: element type End, count 0.
    pub fn empty() -> Self {
        Self::new(TagType::End)
    }

    pub(crate) fn from_parts(element_type: TagType, elements: Vec<NbtTag>) -> Self {
        Self {
            element_type,
            elements,
        }
    }

    pub fn element_type(&self) -> TagType {
        self.element_type
    }

    pub fn push(&mut self, tag: NbtTag) -> Result<(), Error> {
        let found = tag.get_type();
        if found != self.element_type {
            return Err(Error::ListTypeMismatch {
                expected: self.element_type,
                found,
            });
        }
        self.elements.push(tag);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NbtTag> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> Iter<'_, NbtTag> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[NbtTag] {
        &self.elements
    }

    pub fn serialize_content<W>(&self, w: &mut NbtWriter<W>) -> Result<(), Error>
    where
        W: Write,
    {
        w.write_u8_be(self.element_type.id())?;
        w.write_length(self.elements.len())?;
        for tag in &self.elements {
            tag.serialize_data(w)?;
        }
        Ok(())
    }
}

impl Default for NbtList {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> IntoIterator for &'a NbtList {
    type Item = &'a NbtTag;
    type IntoIter = Iter<'a, NbtTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl IntoIterator for NbtList {
    type Item = NbtTag;
    type IntoIter = std::vec::IntoIter<NbtTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}
