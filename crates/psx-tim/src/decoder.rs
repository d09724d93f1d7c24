/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

// TIM is the native raster format of the original PlayStation, a
// position-dependent sequence of little endian structures:
//
// - A file header: u32 magic (0x10), then a u32 flags word where bit 3
//   says whether a palette block follows and bits 0-2 carry the image
//   type code (0 = 4-bit indexed, 1 = 8-bit indexed, 2 = 16-bit direct,
//   3 = 24-bit direct).
// - An optional palette ("CLUT") block.
// - The pixel data block.
//
// Both blocks share one header layout: u32 length (block size in bytes,
// including the 12 header bytes), u16 x, u16 y (VRAM origin of the
// block), u16 width, u16 height. Width counts packed 16-bit units, not
// pixels, so the pixel width depends on the image type.
//
// Useful references
// - https://wiki.xentax.com/index.php/TIM (layout)
// - https://www.psxdev.net/forum/viewtopic.php?t=109 (palette details)

use std::io::{Read, Seek};

use psx_core::bit_depth::BitDepth;
use psx_core::bytestream::ByteReader;
use psx_core::colorspace::ColorSpace;
use psx_core::log::{trace, warn};
use psx_core::options::DecoderOptions;

use crate::common::{BlockHeader, ImageType, BLOCK_HEADER_SIZE, TIM_MAGIC_LE};
use crate::errors::TimDecoderErrors;
use crate::utils::rgb555_to_rgba;

/// Probe some bytes to see
/// if they consist of a TIM image
pub fn probe_tim(bytes: &[u8]) -> bool {
    if let Some(magic_bytes) = bytes.get(0..4) {
        if magic_bytes == TIM_MAGIC_LE.to_le_bytes() {
            // the flags word of a valid file only uses the low four bits
            if let Some(flag_bytes) = bytes.get(4..8) {
                let flags = u32::from_le_bytes(flag_bytes.try_into().unwrap());

                return flags & !0x0f == 0;
            }
        }
    }
    false
}

/// A TIM decoder.
///
/// # Usage
/// The decoder can be used to read image information and or get the
/// pixels out of a valid TIM image.
///
/// ## Extracting image metadata
/// - use `decode_headers` + utility functions to get information
/// ```no_run
/// use std::io::Cursor;
///
/// use psx_tim::TimDecoder;
///
/// fn main() -> Result<(), psx_tim::TimDecoderErrors> {
///     let source = Cursor::new(std::fs::read("image.tim").unwrap());
///     let mut decoder = TimDecoder::new(source);
///     decoder.decode_headers()?;
///     // after decoding headers, we can safely access the image metadata
///     // unwrap won't panic
///     let (w, h) = decoder.dimensions().unwrap();
///     println!("Image width: {w}\t Image height: {h}");
///     println!("Colorspace: {:?}", decoder.colorspace().unwrap());
///
///     Ok(())
/// }
/// ```
///
/// ## Just getting the pixels
///
/// ```no_run
/// use std::io::Cursor;
///
/// use psx_tim::TimDecoder;
///
/// fn main() -> Result<(), psx_tim::TimDecoderErrors> {
///     let source = Cursor::new(std::fs::read("image.tim").unwrap());
///     let mut decoder = TimDecoder::new(source);
///     let pixels = decoder.decode()?;
///     println!("Pixels length: {}", pixels.len());
///     Ok(())
/// }
/// ```
pub struct TimDecoder<T>
where
    T: Read + Seek
{
    stream:          ByteReader<T>,
    options:         DecoderOptions,
    width:           usize,
    height:          usize,
    /// Pixel block dimensions in packed 16-bit units
    block_width:     usize,
    block_height:    usize,
    /// Raw image type code from the flags word, kept around so the
    /// rejection error can name it
    type_code:       u8,
    image_type:      Option<ImageType>,
    has_clut:        bool,
    palette:         Vec<[u8; 4]>,
    origin:          (u16, u16),
    decoded_headers: bool
}

impl<T> TimDecoder<T>
where
    T: Read + Seek
{
    /// Create a new TIM decoder that reads data from `source`
    ///
    /// # Arguments
    /// - `source`: The seekable byte source we will read from
    ///
    /// # Returns
    /// - A TIM decoder instance
    pub fn new(source: T) -> TimDecoder<T> {
        TimDecoder::new_with_options(source, DecoderOptions::default())
    }

    /// Create a new decoder instance with specified options
    ///
    /// # Arguments
    ///
    /// * `source`: The seekable byte source we will read from
    /// * `options`: Specialized options for this decoder
    ///
    /// returns: A TIM decoder instance
    pub fn new_with_options(source: T, options: DecoderOptions) -> TimDecoder<T> {
        TimDecoder {
            stream: ByteReader::new(source),
            options,
            width: 0,
            height: 0,
            block_width: 0,
            block_height: 0,
            type_code: 0,
            image_type: None,
            has_clut: false,
            palette: vec![],
            origin: (0, 0),
            decoded_headers: false
        }
    }

    /// Decode the file header, the palette block when one is present
    /// and the pixel block header, storing the information in the
    /// decode context
    ///
    /// After calling this, all information fields will be filled
    /// except the actual pixel bytes
    ///
    /// # Returns
    /// - Ok(()) Indicates everything was okay during header parsing
    /// - Err: Error that occurred when decoding headers
    pub fn decode_headers(&mut self) -> Result<(), TimDecoderErrors> {
        if self.decoded_headers {
            return Ok(());
        }
        let magic = self.stream.get_u32_le()?;

        if magic != TIM_MAGIC_LE {
            return Err(TimDecoderErrors::InvalidSignature(magic));
        }
        let flags = self.stream.get_u32_le()?;

        self.has_clut = (flags >> 3) & 1 == 1;
        self.type_code = (flags & 0b111) as u8;
        self.image_type = ImageType::from_flags(self.type_code);

        if self.has_clut {
            match self.image_type {
                Some(image_type) if image_type.is_indexed() => self.decode_clut(image_type)?,
                // direct color files may still carry a palette block,
                // jump over it to land on the pixel block
                _ => self.skip_clut_block()?
            }
        } else if matches!(self.image_type, Some(t) if t.is_indexed()) {
            return Err(TimDecoderErrors::MissingColorTable);
        }

        let image_type = match self.image_type {
            Some(image_type) => image_type,
            None => return Err(TimDecoderErrors::UnsupportedImageType(self.type_code))
        };

        let header = self.read_block_header()?;

        self.origin = (header.x, header.y);
        self.block_width = usize::from(header.width);
        self.block_height = usize::from(header.height);
        self.width = image_type.output_width(header.width);
        self.height = self.block_height;

        if self.width > self.options.max_width() {
            return Err(TimDecoderErrors::TooLargeDimensions(
                "width",
                self.options.max_width(),
                self.width
            ));
        }

        if self.height > self.options.max_height() {
            return Err(TimDecoderErrors::TooLargeDimensions(
                "height",
                self.options.max_height(),
                self.height
            ));
        }

        trace!("Image type: {:?}", image_type);
        trace!("Width: {}", self.width);
        trace!("Height: {}", self.height);
        trace!("Block origin: {:?}", self.origin);

        self.decoded_headers = true;

        Ok(())
    }

    /// Parse the palette block into expanded RGBA entries.
    ///
    /// The block must hold exactly the entry count the image type
    /// requires, 16 for 4-bit and 256 for 8-bit images. Files sometimes
    /// stack several palette frames in one block (height > 1); only the
    /// first is honored, the rest are skipped undecoded.
    fn decode_clut(&mut self, image_type: ImageType) -> Result<(), TimDecoderErrors> {
        let header = self.read_block_header()?;

        let expected = image_type.clut_entries();
        let found = usize::from(header.width);

        if found != expected {
            return Err(TimDecoderErrors::ClutSizeMismatch(expected, found));
        }
        self.palette.clear();
        self.palette.reserve_exact(expected);

        for _ in 0..expected {
            let packed = self.stream.get_u16_le()?;
            self.palette.push(rgb555_to_rgba(packed));
        }

        if header.height > 1 {
            let trailing = found * 2 * usize::from(header.height - 1);

            trace!("Skipping {} bytes of extra palette frames", trailing);
            self.stream.skip(trailing)?;
        }
        Ok(())
    }

    /// Jump over a palette block that no pixel of the image can
    /// reference.
    fn skip_clut_block(&mut self) -> Result<(), TimDecoderErrors> {
        let header = self.read_block_header()?;

        if self.options.strict_mode() {
            return Err(TimDecoderErrors::GenericStatic(
                "Palette block on a non-indexed image"
            ));
        }
        // the length field counts its own 12 header bytes
        let data = (header.length as usize).saturating_sub(BLOCK_HEADER_SIZE);

        warn!("Palette block on a non-indexed image, skipping {} bytes", data);
        self.stream.skip(data)?;

        Ok(())
    }

    /// Read one block header, the layout shared by the palette and
    /// pixel-data blocks. Field order: length, x, y, width, height.
    fn read_block_header(&mut self) -> Result<BlockHeader, TimDecoderErrors> {
        let length = self.stream.get_u32_le()?;
        let x = self.stream.get_u16_le()?;
        let y = self.stream.get_u16_le()?;
        let width = self.stream.get_u16_le()?;
        let height = self.stream.get_u16_le()?;

        Ok(BlockHeader {
            length,
            x,
            y,
            width,
            height
        })
    }

    /// Return the expected size of the output buffer for which
    /// a contiguous slice of `&[u8]` can store it without needing
    /// reallocation
    ///
    /// Returns `None` if headers haven't been decoded or if the
    /// calculation overflows
    pub fn output_buf_size(&self) -> Option<usize> {
        if !self.decoded_headers {
            return None;
        }
        self.width
            .checked_mul(self.height)?
            .checked_mul(ColorSpace::RGBA.num_components())
    }

    /// Get dimensions of the image
    ///
    /// This is a tuple of width,height
    ///
    /// # Returns
    /// - `Some((width,height))` - The image dimensions
    /// - `None`: Indicates that the image headers weren't decoded
    ///   or an error occurred during decoding the headers
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        if !self.decoded_headers {
            return None;
        }
        Some((self.width, self.height))
    }

    /// Get the image colorspace or none if the headers weren't decoded
    ///
    /// TIM images always decode to RGBA
    pub fn colorspace(&self) -> Option<ColorSpace> {
        if !self.decoded_headers {
            return None;
        }
        Some(ColorSpace::RGBA)
    }

    /// Return the TIM bit depth
    ///
    /// This is always [BitDepth::Eight](psx_core::bit_depth::BitDepth::Eight)
    /// since every packing expands to 8-bit-per-channel RGBA
    pub fn depth(&self) -> BitDepth {
        BitDepth::Eight
    }

    /// Get the VRAM origin of the pixel block or `None` if the headers
    /// weren't decoded.
    ///
    /// Metadata only, it does not affect the decoded pixels
    pub fn origin(&self) -> Option<(u16, u16)> {
        if !self.decoded_headers {
            return None;
        }
        Some(self.origin)
    }

    /// Get the image type or `None` if the headers weren't decoded
    pub fn image_type(&self) -> Option<ImageType> {
        if !self.decoded_headers {
            return None;
        }
        self.image_type
    }

    /// Decode an image returning the decoded RGBA bytes as an
    /// allocated `Vec<u8>` or an error if decoding could not be
    /// completed
    ///
    /// Also see [`decode_into`](Self::decode_into) which decodes into
    /// a pre-allocated buffer
    pub fn decode(&mut self) -> Result<Vec<u8>, TimDecoderErrors> {
        self.decode_headers()?;

        let mut output = vec![
            0_u8;
            self.output_buf_size()
                .ok_or(TimDecoderErrors::OverFlowOccurred)?
        ];

        self.decode_into(&mut output)?;

        Ok(output)
    }

    /// Decode an encoded image into a buffer or return an error
    /// if something bad occurred
    ///
    /// The buffer is filled with `width * height` RGBA pixels, row
    /// major. Nothing is written when an error is returned.
    ///
    /// Also see [`decode`](Self::decode) which allocates and decodes
    /// into the buffer
    pub fn decode_into(&mut self, buf: &mut [u8]) -> Result<(), TimDecoderErrors> {
        self.decode_headers()?;

        let output_size = self
            .output_buf_size()
            .ok_or(TimDecoderErrors::OverFlowOccurred)?;

        if buf.len() < output_size {
            return Err(TimDecoderErrors::TooSmallBuffer(output_size, buf.len()));
        }
        let buf = &mut buf[0..output_size];

        // every format stores two payload bytes per packed 16-bit unit,
        // even the nibble packed one
        let payload_size = self
            .block_width
            .checked_mul(self.block_height)
            .and_then(|x| x.checked_mul(2))
            .ok_or(TimDecoderErrors::OverFlowOccurred)?;

        let mut payload = vec![0_u8; payload_size];
        self.stream.read_exact_bytes(&mut payload)?;

        if output_size == 0 {
            // zero sized images carry no pixels to expand
            return Ok(());
        }

        // image_type is always Some once headers are decoded
        let image_type = self
            .image_type
            .ok_or(TimDecoderErrors::UnsupportedImageType(self.type_code))?;

        match image_type {
            ImageType::Indexed4 => self.expand_indexed4(&payload, buf),
            ImageType::Indexed8 => self.expand_indexed8(&payload, buf),
            ImageType::SixteenBit => expand_sixteen_bit(&payload, buf),
            ImageType::TwentyFourBit => self.expand_twenty_four_bit(&payload, buf)
        }

        Ok(())
    }

    /// Expand 4-bit palette indices to RGBA.
    ///
    /// Each payload byte carries two indices, low nibble first. Nibbles
    /// can never index out of the 16 entry palette.
    fn expand_indexed4(&self, payload: &[u8], buf: &mut [u8]) {
        for (pix, out) in payload.iter().zip(buf.chunks_exact_mut(8)) {
            let low = self.palette[usize::from(pix & 0x0f)];
            let high = self.palette[usize::from(pix >> 4)];

            out[..4].copy_from_slice(&low);
            out[4..].copy_from_slice(&high);
        }
    }

    /// Expand 8-bit palette indices to RGBA, one index per payload
    /// byte.
    fn expand_indexed8(&self, payload: &[u8], buf: &mut [u8]) {
        for (pix, out) in payload.iter().zip(buf.chunks_exact_mut(4)) {
            out.copy_from_slice(&self.palette[usize::from(*pix)]);
        }
    }

    /// Expand 24-bit direct color to RGBA.
    ///
    /// Rows keep the raw 16-bit-unit stride; within a row every three
    /// consecutive bytes are one blue, green, red pixel and only the
    /// leading `width` pixels carry data, the row tail is padding.
    fn expand_twenty_four_bit(&self, payload: &[u8], buf: &mut [u8]) {
        let in_stride = self.block_width * 2;
        let out_stride = self.width * 4;

        for (in_row, out_row) in payload
            .chunks_exact(in_stride)
            .zip(buf.chunks_exact_mut(out_stride))
        {
            for (pix, out) in in_row.chunks_exact(3).zip(out_row.chunks_exact_mut(4)) {
                out[0] = pix[2];
                out[1] = pix[1];
                out[2] = pix[0];
                out[3] = 255;
            }
        }
    }
}

/// Expand packed 15-bit direct color to RGBA, one pixel per 16-bit
/// unit.
fn expand_sixteen_bit(payload: &[u8], buf: &mut [u8]) {
    for (pix, out) in payload.chunks_exact(2).zip(buf.chunks_exact_mut(4)) {
        let packed = u16::from_le_bytes(pix.try_into().unwrap());

        out.copy_from_slice(&rgb555_to_rgba(packed));
    }
}
