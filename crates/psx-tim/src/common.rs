/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// TIM file identifier, the first little endian u32 of every file.
pub const TIM_MAGIC_LE: u32 = 0x10;

/// Size in bytes of a block header, counted by the block's own
/// `length` field.
pub(crate) const BLOCK_HEADER_SIZE: usize = 12;

/// Pixel layout of a TIM image, bits 0-2 of the file flags word.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ImageType {
    /// 4 bits per pixel, each a palette index. Four pixels per
    /// 16-bit unit
    Indexed4,
    /// 8 bits per pixel, each a palette index. Two pixels per
    /// 16-bit unit
    Indexed8,
    /// One packed 15-bit color per 16-bit unit
    SixteenBit,
    /// 24-bit direct color, two pixels spread over three 16-bit units
    TwentyFourBit
}

impl ImageType {
    /// Map the image type code from the file flags word to a variant,
    /// or `None` for the codes we don't know about.
    pub fn from_flags(code: u8) -> Option<ImageType> {
        match code {
            0 => Some(ImageType::Indexed4),
            1 => Some(ImageType::Indexed8),
            2 => Some(ImageType::SixteenBit),
            3 => Some(ImageType::TwentyFourBit),
            _ => None
        }
    }

    /// Whether pixels of this type are palette indices
    pub const fn is_indexed(self) -> bool {
        matches!(self, ImageType::Indexed4 | ImageType::Indexed8)
    }

    /// Number of palette entries this type requires.
    ///
    /// Only meaningful for the indexed variants, direct color types
    /// never look at a palette
    pub const fn clut_entries(self) -> usize {
        match self {
            ImageType::Indexed4 => 16,
            ImageType::Indexed8 => 256,
            ImageType::SixteenBit | ImageType::TwentyFourBit => 0
        }
    }

    /// Width of the decoded image in pixels.
    ///
    /// Block headers store width in packed 16-bit units, so the pixel
    /// width depends on how many pixels each unit carries.
    pub const fn output_width(self, raw_width: u16) -> usize {
        let w = raw_width as usize;
        match self {
            ImageType::Indexed4 => w * 4,
            ImageType::Indexed8 => w * 2,
            ImageType::SixteenBit => w,
            ImageType::TwentyFourBit => w / 2
        }
    }
}

/// Header shared by the palette and pixel-data blocks.
///
/// `x` and `y` are the block's VRAM origin, metadata only as far as
/// decoding is concerned.
pub(crate) struct BlockHeader {
    pub length: u32,
    pub x:      u16,
    pub y:      u16,
    pub width:  u16,
    pub height: u16
}
