#![no_main]

use ember_world::RegionFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(region) = RegionFile::from_bytes(data.to_vec()) {
        let _ = region.read_all();
    }
});
