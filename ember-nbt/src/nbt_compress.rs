use crate::{Error, Nbt, document};
use flate2::{Compression, read::MultiGzDecoder, write::GzEncoder};
use std::io::{Read, Write};

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Checks for the gzip magic bytes at the start of `bytes`.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Inflates a complete gzip stream into memory. Consecutive members are
/// concatenated; bytes that do not form a member are an error.
pub fn gunzip(compressed: &[u8]) -> Result<Vec<u8>, Error> {
    let mut decoder = MultiGzDecoder::new(compressed);
    let mut inflated = Vec::new();
    decoder
        .read_to_end(&mut inflated)
        .map_err(Error::Decompression)?;
    Ok(inflated)
}

/// Reads a GZipped document from any reader.
///
/// The whole stream is buffered before decoding starts.
pub fn read_gzip_document(mut input: impl Read) -> Result<Nbt, Error> {
    let mut compressed = Vec::new();
    input.read_to_end(&mut compressed)?;
    let inflated = gunzip(&compressed)?;
    document::decode_raw_document(&inflated)
}

/// Writes a document with GZip compression.
///
/// # Arguments
///
/// * `nbt` - The document to serialize and compress
/// * `output` - Any type implementing the Write trait where the compressed data will be written
pub fn write_gzip_document(nbt: &Nbt, output: impl Write) -> Result<(), Error> {
    let mut encoder = GzEncoder::new(output, Compression::default());
    nbt.write_to_writer(&mut encoder)?;
    encoder.finish()?;
    Ok(())
}

/// Convenience function that returns compressed bytes
pub fn write_gzip_document_to_bytes(nbt: &Nbt) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    write_gzip_document(nbt, &mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use crate::{
        Error, Nbt, NbtList,
        compound::NbtCompound,
        nbt_compress::{
            gunzip, is_gzip, read_gzip_document, write_gzip_document,
            write_gzip_document_to_bytes,
        },
        tag::{NbtTag, TagType},
    };
    use std::fs::File;
    use std::io::Cursor;

    #[test]
    fn test_gzip_read_write_document() {
        let mut compound = NbtCompound::new();
        compound.put_byte("byte_value", 123);
        compound.put_short("short_value", 12345);
        compound.put_int("int_value", 1234567);
        compound.put_long("long_value", 123456789);
        compound.put_float("float_value", 123.456);
        compound.put_double("double_value", 123456.789);
        compound.put_bool("bool_value", true);
        compound.put("string_value", NbtTag::String("test string".to_string()));

        let mut nested = NbtCompound::new();
        nested.put_int("nested_int", 42);
        compound.put_compound("nested_compound", nested);

        let mut buffer = Vec::new();
        write_gzip_document(&Nbt::from(compound), &mut buffer)
            .expect("Failed to compress document");
        assert!(is_gzip(&buffer));

        let read = read_gzip_document(Cursor::new(&buffer)).expect("Failed to read document");

        assert_eq!(read.get_byte("byte_value"), Some(123));
        assert_eq!(read.get_short("short_value"), Some(12345));
        assert_eq!(read.get_int("int_value"), Some(1234567));
        assert_eq!(read.get_long("long_value"), Some(123456789));
        assert_eq!(read.get_float("float_value"), Some(123.456));
        assert_eq!(read.get_double("double_value"), Some(123456.789));
        assert_eq!(read.get_bool("bool_value"), Some(true));
        assert_eq!(read.get_string("string_value"), Some("test string"));

        let nested = read
            .get_compound("nested_compound")
            .expect("Failed to retrieve nested compound");
        assert_eq!(nested.get_int("nested_int"), Some(42));
    }

    #[test]
    fn test_gzip_large_compound() {
        let mut compound = NbtCompound::new();
        for i in 0..1000 {
            compound.put_int(&format!("value_{}", i), i);
        }
        let mut list = NbtList::new(TagType::Long);
        for i in 0..1000 {
            list.push(NbtTag::Long(i * 31)).unwrap();
        }
        compound.put_list("longs", list);

        let buffer = write_gzip_document_to_bytes(&Nbt::from(compound))
            .expect("Failed to compress large document");
        let read = read_gzip_document(Cursor::new(buffer)).expect("Failed to read document");

        assert_eq!(read.len(), 1001);
        assert_eq!(read.get_int("value_0"), Some(0));
        assert_eq!(read.get_int("value_500"), Some(500));
        assert_eq!(read.get_int("value_999"), Some(999));
        assert_eq!(read.get_list("longs").map(|list| list.len()), Some(1000));
    }

    #[test]
    fn test_gzip_invalid_data() {
        let invalid_data = vec![0x1F, 0x8B, 3, 4, 5];
        assert!(matches!(gunzip(&invalid_data), Err(Error::Decompression(_))));
    }

    #[test]
    fn test_direct_file_io() {
        use tempfile::tempdir;

        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let file_path = temp_dir.path().join("level.dat");

        let mut compound = NbtCompound::new();
        compound.put_int("test_value", 42);

        let file = File::create(&file_path).expect("Failed to create temp file");
        write_gzip_document(&Nbt::new("root".to_string(), compound), file)
            .expect("Failed to write document to file");

        let file = File::open(&file_path).expect("Failed to open temp file");
        let read = read_gzip_document(file).expect("Failed to read document from file");

        assert_eq!(read.name, "root");
        assert_eq!(read.get_int("test_value"), Some(42));
    }
}
