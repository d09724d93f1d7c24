/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Image bit depth information

/// The image bit depth.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum BitDepth {
    /// Eight bit depth.
    ///
    /// Images with such bit depth use [`u8`] to store
    /// pixels and use the whole range from 0-255.
    ///
    /// Images with bit depths lower than this are scaled up to it
    Eight,
    /// Sixteen bit depth
    ///
    /// Images with such bit depths use [`u16`] to store values and use
    /// the whole range, i.e 0-65535
    Sixteen,
    /// Bit depth information is unknown
    Unknown
}

impl Default for BitDepth {
    fn default() -> Self {
        Self::Unknown
    }
}

impl BitDepth {
    /// Get the max value supported by the bit depth
    ///
    /// During conversion from one bit depth to another,
    /// larger values should be clamped to this
    pub const fn max_value(self) -> u16 {
        match self {
            Self::Eight => (1 << 8) - 1,
            Self::Sixteen => u16::MAX,
            Self::Unknown => 0
        }
    }

    /// Get the number of bytes needed to store a single channel
    /// of this bit depth
    pub const fn size_of(self) -> usize {
        match self {
            Self::Eight => 1,
            Self::Sixteen => 2,
            Self::Unknown => 0
        }
    }
}
