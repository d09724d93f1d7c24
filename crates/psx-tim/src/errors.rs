/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Formatter};

use psx_core::bytestream::ByteIoError;

use crate::common::TIM_MAGIC_LE;

/// Errors that can occur during TIM decoding
#[non_exhaustive]
pub enum TimDecoderErrors {
    /// The file does not start with the TIM identifier
    InvalidSignature(u32),
    /// The palette block's entry count does not match what the image
    /// type requires, (expected, found)
    ClutSizeMismatch(usize, usize),
    /// A palette indexed image type without a palette present
    MissingColorTable,
    /// Image type code outside the four known variants
    UnsupportedImageType(u8),
    /// The output buffer is too small, expected at least
    /// a size but got another size
    TooSmallBuffer(usize, usize),
    /// Too large dimensions for a given width or
    /// height
    TooLargeDimensions(&'static str, usize, usize),
    /// A calculation overflowed
    OverFlowOccurred,
    /// Generic message
    GenericStatic(&'static str),
    /// An I/O error, including running out of bytes mid-field
    IoErrors(ByteIoError)
}

impl Debug for TimDecoderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidSignature(magic) => {
                writeln!(
                    f,
                    "Expected {:?} but found {:?}, not a TIM image",
                    TIM_MAGIC_LE.to_le_bytes(),
                    magic.to_le_bytes()
                )
            }
            Self::ClutSizeMismatch(expected, found) => {
                writeln!(
                    f,
                    "Palette size mismatch, image type requires {expected} entries but the block holds {found}"
                )
            }
            Self::MissingColorTable => {
                writeln!(f, "Indexed image without a color lookup table")
            }
            Self::UnsupportedImageType(code) => {
                writeln!(f, "Unsupported image type code {code}, known codes are 0-3")
            }
            Self::TooSmallBuffer(expected, found) => {
                writeln!(
                    f,
                    "Too small of a buffer, expected {expected} but found {found}"
                )
            }
            Self::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension}, {found} exceeds {expected}"
                )
            }
            Self::OverFlowOccurred => {
                writeln!(f, "Overflow occurred")
            }
            Self::GenericStatic(message) => {
                writeln!(f, "{message}")
            }
            Self::IoErrors(err) => {
                writeln!(f, "{err:?}")
            }
        }
    }
}

impl From<ByteIoError> for TimDecoderErrors {
    fn from(value: ByteIoError) -> Self {
        TimDecoderErrors::IoErrors(value)
    }
}

impl From<&'static str> for TimDecoderErrors {
    fn from(value: &'static str) -> Self {
        TimDecoderErrors::GenericStatic(value)
    }
}
