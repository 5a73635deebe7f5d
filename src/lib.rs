//! # egz
//!
//! Byte-granular Huffman compression into a self-describing container.
//!
//! The pipeline is: frequency analysis -> canonical prefix-code construction
//! from a weighted binary tree -> bit-packed encoding -> header framing (with
//! an MD5 integrity digest) -> header parsing -> decoding-trie reconstruction
//! -> bit-unpacked decoding.
//!
//! ## File Example
//!
//! ```rs
//! use egz::*;
//! let mut in_file = std::fs::File::open("some_input_path").expect("open failed");
//! let mut out_file = std::fs::File::create("some_output_path").expect("create failed");
//! let (in_size,out_size) = compress(&mut in_file,&mut out_file,&STD_OPTIONS)
//!     .expect("compression failed");
//! eprintln!("compressed {} into {}",in_size,out_size);
//! ```
//!
//! ## Buffer Example
//!
//! ```rs
//! use egz::*;
//! let test_data = "mississippi".as_bytes();
//! let compressed = compress_slice(test_data,&STD_OPTIONS).expect("compression failed");
//! let expanded = expand_slice(&compressed).expect("expansion failed");
//! assert_eq!(expanded,test_data);
//! ```

mod symbols;
mod sort;
mod bitio;
mod tree;
mod container;
mod codec;

pub use symbols::{Symbol, SymbolTable};
pub use tree::CodeEntry;
pub use codec::{compress, expand, compress_slice, expand_slice};

/// Codec errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("allocation failed")]
    Alloc,
    #[error("input is empty")]
    EmptyInput,
    #[error("file format mismatch")]
    FileFormatMismatch,
    #[error("compressed size ({predicted} bytes) would not be smaller than the original ({original} bytes)")]
    NegativeCompression { original: u64, predicted: u64 },
    #[error("user aborted")]
    UserAbort,
    #[error("digest mismatch: header says {expected}, expansion produced {actual}")]
    DigestMismatch { expected: String, actual: String },
}

/// Options controlling compression and expansion
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// skip the negative-compression check (CLI `--force`)
    pub force: bool,
    /// starting position in the input stream
    pub in_offset: u64,
    /// starting position in the output stream
    pub out_offset: u64,
}

pub const STD_OPTIONS: Options = Options {
    force: false,
    in_offset: 0,
    out_offset: 0,
};
