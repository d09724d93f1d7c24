//! Core routines shared by the psx family of decoders
//!
//! This crate provides the plumbing shared by the decoders
//! under the `psx` umbrella.
//!
//! It currently contains
//!
//! - A buffered, seekable bytestream reader with endian aware reads
//! - Colorspace and bit depth information shared by images
//! - Decoder options
//! - Logging shims that forward to the `log` crate when the `log`
//!   feature is enabled and compile to nothing otherwise
//!
#![macro_use]

pub mod bit_depth;
pub mod bytestream;
pub mod colorspace;
pub mod log;
pub mod options;
