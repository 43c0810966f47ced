use postpack::io::{FileOptions, decode_file, encode_file, read_words, write_words};
use std::io::{Read, Seek};
use tempfile::NamedTempFile;

fn postings(len: usize, max_gap: u32, seed: u64) -> Vec<u32> {
    let mut state = seed;
    let mut last = 0u32;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            last = last.wrapping_add((state >> 33) as u32 % max_gap);
            last
        })
        .collect()
}

#[test]
#[ignore = "multi-GB test is opt-in due runtime and disk requirements"]
fn quarter_billion_value_file_roundtrip() {
    let values_file = NamedTempFile::new().unwrap();
    let packed = NamedTempFile::new().unwrap();
    let output = NamedTempFile::new().unwrap();

    let len = 256 * 1024 * 1024 + 77;
    let values = postings(len, 16, 11);
    write_words(values_file.path(), &values).unwrap();

    let enc = encode_file(values_file.path(), packed.path(), FileOptions::default()).unwrap();
    assert_eq!(enc.values, len);
    assert!(enc.output_size < enc.input_size / 4);

    let dec = decode_file(packed.path(), output.path(), FileOptions::default()).unwrap();
    assert_eq!(dec.output_size, 4 * len as u64);

    // Spot-check words near both ends and the block/tail split.
    let mut out_f = std::fs::File::open(output.path()).unwrap();
    for idx in [0usize, 1 << 20, len - 200, len - 1] {
        out_f
            .seek(std::io::SeekFrom::Start(4 * idx as u64))
            .unwrap();
        let mut buf = [0u8; 4];
        out_f.read_exact(&mut buf).unwrap();
        assert_eq!(u32::from_le_bytes(buf), values[idx], "mismatch at index {idx}");
    }
}

#[test]
fn edge_case_matrix() {
    for (len, max_gap) in [
        (0usize, 1u32),
        (1, 1_000_000),
        (127, 3),
        (128, 3),
        (129, u32::MAX),
        (4096, 1),
        (100_003, 200),
    ] {
        let values_file = NamedTempFile::new().unwrap();
        let packed = NamedTempFile::new().unwrap();
        let output = NamedTempFile::new().unwrap();

        let values = postings(len, max_gap, len as u64);
        write_words(values_file.path(), &values).unwrap();

        let enc = encode_file(values_file.path(), packed.path(), FileOptions::default()).unwrap();
        assert_eq!(enc.values, len);
        assert_eq!(enc.blocks, len / 128);

        let dec = decode_file(packed.path(), output.path(), FileOptions::default()).unwrap();
        assert_eq!(dec.values, len);
        assert_eq!(dec.words, enc.words);
        assert_eq!(read_words(output.path()).unwrap(), values, "len={len} gap={max_gap}");
    }
}
