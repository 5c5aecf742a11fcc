#![no_main]
use feescope_data::parse_records;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary text must parse or fail cleanly, never panic.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_records(text);
    }
});
