//! Postpack: delta bit-packing compression for sorted `u32` sequences.
//!
//! The crate provides:
//! - The codec stages (`codec`): bit-width selection, 32-value bit packing,
//!   the 128-element block codec and the variable-byte tail codec
//! - High-level compress/decompress APIs (`engine`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use postpack::engine;
//!
//! let doc_ids: Vec<u32> = (0..1000).map(|i| i * 3).collect();
//!
//! let packed = engine::compress_to_vec(&doc_ids).unwrap();
//! assert!(packed.len() < doc_ids.len());
//!
//! let decoded = engine::decompress_to_vec(&packed).unwrap();
//! assert_eq!(decoded, doc_ids);
//! ```
//!
//! Callers that manage their own buffers use [`engine::compress`] and
//! [`engine::decompress`] with slices sized by [`engine::max_compressed_len`]
//! and [`engine::decoded_len`].

pub mod codec;
pub mod engine;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;

pub use codec::CodecError;
pub use engine::{compress, compress_to_vec, decompress, decompress_to_vec};
