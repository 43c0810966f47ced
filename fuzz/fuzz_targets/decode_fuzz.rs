#![no_main]
use libfuzzer_sys::fuzz_target;
use postpack::{engine, io};

fuzz_target!(|data: &[u8]| {
    // Arbitrary words must only ever produce errors, never panics.
    let usable = data.len() - data.len() % 4;
    let Ok(words) = io::words_from_bytes(&data[..usable]) else {
        return;
    };
    let _ = engine::inspect(&words);
    if let Ok(n) = engine::decoded_len(&words) {
        let mut out = vec![0u32; n];
        let _ = engine::decompress(&words, &mut out);
    }
});
