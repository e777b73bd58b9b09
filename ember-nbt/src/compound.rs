use crate::list::NbtList;
use crate::serializer::NbtWriter;
use crate::tag::NbtTag;
use crate::{END_ID, Error, Nbt};
use indexmap::IndexMap;
use std::io::Write;

/// Named children of a compound tag, kept in stream order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NbtCompound {
    pub child_tags: IndexMap<String, NbtTag>,
}

impl NbtCompound {
    pub fn new() -> NbtCompound {
        NbtCompound {
            child_tags: IndexMap::new(),
        }
    }

    pub fn serialize_content<W>(&self, w: &mut NbtWriter<W>) -> Result<(), Error>
    where
        W: Write,
    {
        for (name, tag) in &self.child_tags {
            w.write_u8_be(tag.get_type_id())?;
            w.write_string(name)?;
            tag.serialize_data(w)?;
        }
        w.write_u8_be(END_ID)?;
        Ok(())
    }

    /// Inserts a child. An existing child of the same name is replaced in
    /// its original position and returned.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<NbtTag>) -> Option<NbtTag> {
        self.child_tags.insert(name.into(), value.into())
    }

    pub fn put_byte(&mut self, name: &str, value: i8) {
        self.put(name, NbtTag::Byte(value));
    }

    pub fn put_bool(&mut self, name: &str, value: bool) {
        self.put(name, NbtTag::Byte(if value { 1 } else { 0 }));
    }

    pub fn put_short(&mut self, name: &str, value: i16) {
        self.put(name, NbtTag::Short(value));
    }

    pub fn put_int(&mut self, name: &str, value: i32) {
        self.put(name, NbtTag::Int(value));
    }

    pub fn put_long(&mut self, name: &str, value: i64) {
        self.put(name, NbtTag::Long(value));
    }

    pub fn put_float(&mut self, name: &str, value: f32) {
        self.put(name, NbtTag::Float(value));
    }

    pub fn put_double(&mut self, name: &str, value: f64) {
        self.put(name, NbtTag::Double(value));
    }

    pub fn put_string(&mut self, name: &str, value: &str) {
        self.put(name, NbtTag::String(value.to_string()));
    }

    pub fn put_list(&mut self, name: &str, value: NbtList) {
        self.put(name, NbtTag::List(value));
    }

    pub fn put_compound(&mut self, name: &str, value: NbtCompound) {
        self.put(name, NbtTag::Compound(value));
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&NbtTag> {
        self.child_tags.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.child_tags.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.child_tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.child_tags.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, NbtTag> {
        self.child_tags.iter()
    }

    pub fn get_byte(&self, name: &str) -> Option<i8> {
        self.get(name).and_then(|tag| tag.extract_byte())
    }

    pub fn get_short(&self, name: &str) -> Option<i16> {
        self.get(name).and_then(|tag| tag.extract_short())
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(|tag| tag.extract_int())
    }

    pub fn get_long(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|tag| tag.extract_long())
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(|tag| tag.extract_float())
    }

    pub fn get_double(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|tag| tag.extract_double())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|tag| tag.extract_bool())
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|tag| tag.extract_string())
    }

    pub fn get_list(&self, name: &str) -> Option<&NbtList> {
        self.get(name).and_then(|tag| tag.extract_list())
    }

    pub fn get_compound(&self, name: &str) -> Option<&NbtCompound> {
        self.get(name).and_then(|tag| tag.extract_compound())
    }

    pub fn get_byte_array(&self, name: &str) -> Option<&[u8]> {
        self.get(name).and_then(|tag| tag.extract_byte_array())
    }

    pub fn get_int_array(&self, name: &str) -> Option<&[i32]> {
        self.get(name).and_then(|tag| tag.extract_int_array())
    }

    pub fn get_long_array(&self, name: &str) -> Option<&[i64]> {
        self.get(name).and_then(|tag| tag.extract_long_array())
    }
}

impl From<Nbt> for NbtCompound {
    fn from(value: Nbt) -> Self {
        value.root_tag
    }
}

impl FromIterator<(String, NbtTag)> for NbtCompound {
    fn from_iter<T: IntoIterator<Item = (String, NbtTag)>>(iter: T) -> Self {
        let mut compound = NbtCompound::new();
        compound.extend(iter);
        compound
    }
}

impl IntoIterator for NbtCompound {
    type Item = (String, NbtTag);
    type IntoIter = indexmap::map::IntoIter<String, NbtTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.child_tags.into_iter()
    }
}

impl<'a> IntoIterator for &'a NbtCompound {
    type Item = (&'a String, &'a NbtTag);
    type IntoIter = indexmap::map::Iter<'a, String, NbtTag>;

    fn into_iter(self) -> Self::IntoIter {
        self.child_tags.iter()
    }
}

impl Extend<(String, NbtTag)> for NbtCompound {
    fn extend<T: IntoIterator<Item = (String, NbtTag)>>(&mut self, iter: T) {
        for (name, tag) in iter {
            self.put(name, tag);
        }
    }
}

// Rust's AsRef is currently not reflexive so we need to implement it manually
impl AsRef<NbtCompound> for NbtCompound {
    fn as_ref(&self) -> &NbtCompound {
        self
    }
}

#[cfg(test)]
mod test {
    use crate::{compound::NbtCompound, tag::NbtTag};

    #[test]
    fn test_put_overwrites_in_place() {
        let mut compound = NbtCompound::new();
        compound.put_int("a", 1);
        compound.put_int("b", 2);
        let previous = compound.put("a", NbtTag::String("again".to_string()));

        assert_eq!(previous, Some(NbtTag::Int(1)));
        assert_eq!(compound.len(), 2);
        assert_eq!(compound.get_string("a"), Some("again"));
        let names: Vec<&str> = compound.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_typed_getters_reject_other_types() {
        let mut compound = NbtCompound::new();
        compound.put_long("time", 24000);

        assert_eq!(compound.get_long("time"), Some(24000));
        assert_eq!(compound.get_int("time"), None);
        assert_eq!(compound.get_long("missing"), None);
    }

    #[test]
    fn test_collect_from_pairs() {
        let compound: NbtCompound = [
            ("x".to_string(), NbtTag::Int(1)),
            ("x".to_string(), NbtTag::Int(5)),
        ]
        .into_iter()
        .collect();

        assert_eq!(compound.len(), 1);
        assert_eq!(compound.get_int("x"), Some(5));
    }
}
