#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // fuzzed code goes here

    use std::io::Cursor;

    let data = Cursor::new(data);

    let mut decoder = psx_tim::TimDecoder::new(data);
    let _ = decoder.decode();
});
