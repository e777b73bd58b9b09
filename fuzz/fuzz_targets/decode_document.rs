#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = ember_nbt::decode_document(data);
    let _ = ember_nbt::decode_tag(data, ember_nbt::NamePolicy::Named);
});
