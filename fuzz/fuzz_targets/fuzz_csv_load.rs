#![no_main]

use libfuzzer_sys::fuzz_target;

// The loader must never panic: structural problems surface as errors,
// per-field garbage degrades to substitutions.
fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = sf_io::load_table_str(input);
    }
});
