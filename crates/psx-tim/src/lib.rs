/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! A PlayStation TIM decoder
//!
//! This crate features a decoder for the TIM raster format used by
//! PlayStation-era games, turning a TIM stream into an RGBA pixel
//! buffer.
//!
//! # Supported formats
//! - 4-bit palette indexed images
//! - 8-bit palette indexed images
//! - 16-bit direct color images
//! - 24-bit direct color images
//!
//! The PSX transparency bit is deliberately ignored; every decoded
//! pixel is fully opaque, matching established tooling behaviour.
//!
//! # Example
//! - Decoding a TIM file
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use psx_tim::TimDecoder;
//!
//! fn main() -> Result<(), psx_tim::TimDecoderErrors> {
//!     let file = File::open("image.tim").expect("file should exist");
//!     let mut decoder = TimDecoder::new(BufReader::new(file));
//!
//!     let pixels = decoder.decode()?;
//!     let (width, height) = decoder.dimensions().unwrap();
//!     println!("{width}x{height}, {} bytes", pixels.len());
//!     Ok(())
//! }
//! ```
//!
//! In-memory buffers work through [`std::io::Cursor`].
pub extern crate psx_core;

pub use crate::common::ImageType;
pub use crate::decoder::{probe_tim, TimDecoder};
pub use crate::errors::TimDecoderErrors;

mod common;
pub mod decoder;
pub mod errors;
mod utils;
