// File-level I/O helpers for postings compression.
//
// Provides `encode_file()` and `decode_file()` convenience functions that wrap
// the in-memory engine with buffered file I/O. Plain value files are either
// raw little-endian u32 words or text with one decimal value per line;
// encoded files are always raw little-endian words. Optionally computes a
// SHA-256 of the plain values (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::num::ParseIntError;
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::codec::{BLOCK_SIZE, CodecError};
use crate::engine;

// ---------------------------------------------------------------------------
// Formats and options
// ---------------------------------------------------------------------------

/// On-disk representation of plain (uncompressed) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    /// Raw little-endian `u32` words.
    #[default]
    Binary,
    /// One decimal value per line. Blank lines and `#` comments are skipped.
    Text,
}

/// Options for [`encode_file`] and [`decode_file`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOptions {
    /// Format of the plain value file.
    pub format: ValueFormat,
    /// Encode blocks on the rayon pool (requires the `parallel` feature).
    pub parallel: bool,
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct EncodeStats {
    /// Number of values read.
    pub values: usize,
    /// Number of full blocks encoded.
    pub blocks: usize,
    /// Number of encoded words written.
    pub words: usize,
    /// Input file size in bytes.
    pub input_size: u64,
    /// Output file size in bytes.
    pub output_size: u64,
    /// SHA-256 of the values as little-endian words (if `file-io` is enabled).
    pub values_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decode_file()`.
#[derive(Debug, Clone)]
pub struct DecodeStats {
    /// Number of encoded words read.
    pub words: usize,
    /// Number of values reconstructed.
    pub values: usize,
    /// Number of full blocks decoded.
    pub blocks: usize,
    /// Input file size in bytes.
    pub input_size: u64,
    /// Output file size in bytes.
    pub output_size: u64,
    /// SHA-256 of the values as little-endian words (if `file-io` is enabled).
    pub values_sha256: Option<[u8; 32]>,
}

impl EncodeStats {
    /// Encoded words per input value.
    pub fn ratio(&self) -> f64 {
        if self.values == 0 {
            return 0.0;
        }
        self.words as f64 / self.values as f64
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Codec error while encoding or decoding.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    /// Binary word file whose length is not a multiple of 4 bytes.
    #[error("file length {len} is not a multiple of 4 bytes")]
    Misaligned { len: u64 },
    /// Text value that is not a decimal `u32`.
    #[error("line {line}: invalid value {value:?}: {source}")]
    Parse {
        line: usize,
        value: String,
        source: ParseIntError,
    },
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Word and text files
// ---------------------------------------------------------------------------

/// Read a file of little-endian `u32` words.
pub fn read_words(path: &Path) -> Result<Vec<u32>, IoError> {
    let bytes = std::fs::read(path)?;
    words_from_bytes(&bytes)
}

/// Decode little-endian `u32` words from a byte buffer.
pub fn words_from_bytes(bytes: &[u8]) -> Result<Vec<u32>, IoError> {
    let (chunks, rest) = bytes.as_chunks::<4>();
    if !rest.is_empty() {
        return Err(IoError::Misaligned {
            len: bytes.len() as u64,
        });
    }
    Ok(chunks.iter().map(|&c| u32::from_le_bytes(c)).collect())
}

/// Write `words` as little-endian `u32` words. Returns bytes written.
pub fn write_words(path: &Path, words: &[u32]) -> Result<u64, IoError> {
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(path)?);
    write_words_to(&mut writer, words)?;
    writer.flush()?;
    Ok(words.len() as u64 * 4)
}

/// Write `words` as little-endian bytes to any sink.
pub fn write_words_to<W: Write>(w: &mut W, words: &[u32]) -> io::Result<()> {
    for word in words {
        w.write_all(&word.to_le_bytes())?;
    }
    Ok(())
}

/// Read a text file with one decimal value per line.
pub fn read_text(path: &Path) -> Result<Vec<u32>, IoError> {
    let text = std::fs::read_to_string(path)?;
    parse_text(&text)
}

/// Parse one decimal value per line, skipping blank lines and `#` comments.
pub fn parse_text(text: &str) -> Result<Vec<u32>, IoError> {
    let mut values = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let value = line.parse::<u32>().map_err(|source| IoError::Parse {
            line: i + 1,
            value: line.to_string(),
            source,
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Write one decimal value per line. Returns bytes written.
pub fn write_text(path: &Path, values: &[u32]) -> Result<u64, IoError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(BUF_SIZE, file);
    for v in values {
        writeln!(writer, "{v}")?;
    }
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(file.metadata()?.len())
}

/// Read plain values in `format`.
pub fn read_values(path: &Path, format: ValueFormat) -> Result<Vec<u32>, IoError> {
    match format {
        ValueFormat::Binary => read_words(path),
        ValueFormat::Text => read_text(path),
    }
}

/// Write plain values in `format`. Returns bytes written.
pub fn write_values(path: &Path, values: &[u32], format: ValueFormat) -> Result<u64, IoError> {
    match format {
        ValueFormat::Binary => write_words(path, values),
        ValueFormat::Text => write_text(path, values),
    }
}

// ---------------------------------------------------------------------------
// encode_file / decode_file
// ---------------------------------------------------------------------------

/// Compress the values in `input_path`, writing encoded words to
/// `output_path`.
///
/// The input is read fully into memory and the output buffer is presized to
/// the worst case.
pub fn encode_file(
    input_path: &Path,
    output_path: &Path,
    opts: FileOptions,
) -> Result<EncodeStats, IoError> {
    let input_size = std::fs::metadata(input_path)?.len();
    let values = read_values(input_path, opts.format)?;

    let mut words = vec![0u32; engine::max_compressed_len(values.len())];
    let n = compress_with(&values, &mut words, opts.parallel)?;
    words.truncate(n);

    let output_size = write_words(output_path, &words)?;
    log::info!(
        "encoded {} values into {} words ({} -> {} bytes)",
        values.len(),
        words.len(),
        input_size,
        output_size
    );

    Ok(EncodeStats {
        values: values.len(),
        blocks: values.len() / BLOCK_SIZE,
        words: words.len(),
        input_size,
        output_size,
        values_sha256: values_sha256(&values),
    })
}

/// Decompress the words in `input_path`, writing values to `output_path` in
/// `opts.format`.
pub fn decode_file(
    input_path: &Path,
    output_path: &Path,
    opts: FileOptions,
) -> Result<DecodeStats, IoError> {
    let input_size = std::fs::metadata(input_path)?.len();
    let words = read_words(input_path)?;
    let values = engine::decompress_to_vec(&words)?;
    let output_size = write_values(output_path, &values, opts.format)?;
    log::info!(
        "decoded {} words into {} values ({} -> {} bytes)",
        words.len(),
        values.len(),
        input_size,
        output_size
    );

    Ok(DecodeStats {
        words: words.len(),
        values: values.len(),
        blocks: values.len() / BLOCK_SIZE,
        input_size,
        output_size,
        values_sha256: values_sha256(&values),
    })
}

#[cfg(feature = "parallel")]
fn compress_with(values: &[u32], out: &mut [u32], parallel: bool) -> Result<usize, CodecError> {
    if parallel {
        engine::compress_parallel(values, out)
    } else {
        engine::compress(values, out)
    }
}

#[cfg(not(feature = "parallel"))]
fn compress_with(values: &[u32], out: &mut [u32], parallel: bool) -> Result<usize, CodecError> {
    if parallel {
        log::warn!("built without the `parallel` feature; encoding sequentially");
    }
    engine::compress(values, out)
}

// ---------------------------------------------------------------------------
// Checksums (used with file-io feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
fn values_sha256(values: &[u32]) -> Option<[u8; 32]> {
    let mut hasher = sha2::Sha256::new();
    for v in values {
        hasher.update(v.to_le_bytes());
    }
    Some(hasher.finalize().into())
}

#[cfg(not(feature = "file-io"))]
fn values_sha256(_values: &[u32]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
