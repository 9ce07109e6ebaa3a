#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    gombare_fuzz::fuzz_schema(data);
});
