#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    if let Ok(values) = postpack::io::parse_text(&text) {
        let words = postpack::engine::compress_to_vec(&values).unwrap();
        assert_eq!(postpack::engine::decompress_to_vec(&words).unwrap(), values);
    }
});
