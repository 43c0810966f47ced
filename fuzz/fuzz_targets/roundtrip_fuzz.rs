#![no_main]
use libfuzzer_sys::fuzz_target;
use postpack::engine;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte selects how the words are shaped.
    let flags = data[0];
    let (chunks, _) = data[1..].as_chunks::<4>();
    let mut input: Vec<u32> = chunks.iter().map(|&c| u32::from_le_bytes(c)).collect();
    if flags & 1 != 0 {
        input.sort_unstable();
    }
    if flags & 2 != 0 {
        // Narrow gaps to exercise small widths.
        for v in input.iter_mut() {
            *v &= 0xFF;
        }
        input.sort_unstable();
    }

    let words = engine::compress_to_vec(&input).unwrap();
    assert!(words.len() <= engine::max_compressed_len(input.len()));
    let decoded = engine::decompress_to_vec(&words).unwrap();
    assert_eq!(decoded, input);
});
