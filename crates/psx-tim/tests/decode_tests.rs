/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::io::Cursor;

use psx_tim::psx_core::bytestream::ByteIoError;
use psx_tim::psx_core::options::DecoderOptions;
use psx_tim::{probe_tim, ImageType, TimDecoder, TimDecoderErrors};

/// Magic word plus a flags word for the given type code, with the
/// palette-present bit set when asked.
fn file_header(type_code: u32, has_clut: bool) -> Vec<u8> {
    let flags = type_code | if has_clut { 1 << 3 } else { 0 };

    let mut out = vec![];
    out.extend_from_slice(&0x10_u32.to_le_bytes());
    out.extend_from_slice(&flags.to_le_bytes());
    out
}

fn push_block_header(out: &mut Vec<u8>, length: u32, x: u16, y: u16, width: u16, height: u16) {
    out.extend_from_slice(&length.to_le_bytes());
    out.extend_from_slice(&x.to_le_bytes());
    out.extend_from_slice(&y.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
}

/// A palette block whose entry `i` packs to the raw value `i`, so
/// entry 1 expands to [8, 0, 0, 255] and entry 0 to opaque black.
fn push_counting_clut(out: &mut Vec<u8>, entries: u16, frames: u16) {
    let length = 12 + u32::from(entries) * 2 * u32::from(frames);

    push_block_header(out, length, 0, 0, entries, frames);
    for _ in 0..frames {
        for i in 0..entries {
            out.extend_from_slice(&i.to_le_bytes());
        }
    }
}

#[test]
fn sixteen_bit_single_pixel() {
    let mut data = file_header(2, false);
    push_block_header(&mut data, 12 + 2, 0, 0, 1, 1);
    data.extend_from_slice(&0x7fff_u16.to_le_bytes());

    let mut decoder = TimDecoder::new(Cursor::new(data));
    let pixels = decoder.decode().unwrap();

    assert_eq!(decoder.dimensions(), Some((1, 1)));
    assert_eq!(decoder.image_type(), Some(ImageType::SixteenBit));
    assert_eq!(pixels, [255, 255, 255, 255]);
}

#[test]
fn indexed4_low_nibble_first() {
    let mut data = file_header(0, true);
    push_counting_clut(&mut data, 16, 1);
    // one 16-bit unit, four pixels wide
    push_block_header(&mut data, 12 + 2, 0, 0, 1, 1);
    // nibbles in read order: 0, 1, 0, 0
    data.extend_from_slice(&[0x10, 0x00]);

    let mut decoder = TimDecoder::new(Cursor::new(data));
    let pixels = decoder.decode().unwrap();

    assert_eq!(decoder.dimensions(), Some((4, 1)));

    let c0 = [0, 0, 0, 255];
    let c1 = [8, 0, 0, 255];
    assert_eq!(pixels, [c0, c1, c0, c0].concat());
}

#[test]
fn indexed8_pixels_follow_palette() {
    let mut data = file_header(1, true);
    push_counting_clut(&mut data, 256, 1);
    push_block_header(&mut data, 12 + 4, 0, 0, 2, 1);
    data.extend_from_slice(&[0, 1, 2, 3]);

    let mut decoder = TimDecoder::new(Cursor::new(data));
    let pixels = decoder.decode().unwrap();

    assert_eq!(decoder.dimensions(), Some((4, 1)));
    // entries 0-3 pack red values 0-3, each expanding to i << 3
    assert_eq!(
        pixels,
        [
            [0, 0, 0, 255],
            [8, 0, 0, 255],
            [16, 0, 0, 255],
            [24, 0, 0, 255]
        ]
        .concat()
    );
}

#[test]
fn indexed_without_palette_is_an_error() {
    let data = file_header(1, false);

    let mut decoder = TimDecoder::new(Cursor::new(data));
    let err = decoder.decode().unwrap_err();

    assert!(matches!(err, TimDecoderErrors::MissingColorTable));
}

#[test]
fn zeroed_magic_is_rejected() {
    let data = vec![0_u8; 4];

    let mut decoder = TimDecoder::new(Cursor::new(data));
    let err = decoder.decode().unwrap_err();

    assert!(matches!(err, TimDecoderErrors::InvalidSignature(0)));
}

#[test]
fn only_first_palette_frame_is_honored() {
    let mut data = file_header(0, true);
    // three stacked frames, frames after the first hold garbage
    let mut clut = vec![];
    push_block_header(&mut clut, 12 + 16 * 2 * 3, 0, 0, 16, 3);
    for i in 0_u16..16 {
        clut.extend_from_slice(&i.to_le_bytes());
    }
    clut.extend_from_slice(&[0xff; 16 * 2 * 2]);
    data.extend_from_slice(&clut);

    push_block_header(&mut data, 12 + 2, 0, 0, 1, 1);
    data.extend_from_slice(&[0x01, 0x00]);

    let mut decoder = TimDecoder::new(Cursor::new(data));
    let pixels = decoder.decode().unwrap();

    assert_eq!(&pixels[0..4], [8, 0, 0, 255]);
}

#[test]
fn clut_size_mismatch() {
    let mut data = file_header(0, true);
    // 4-bit images need 16 entries, offer 8
    push_block_header(&mut data, 12 + 8 * 2, 0, 0, 8, 1);
    data.extend_from_slice(&[0; 8 * 2]);

    let mut decoder = TimDecoder::new(Cursor::new(data));
    let err = decoder.decode().unwrap_err();

    assert!(matches!(err, TimDecoderErrors::ClutSizeMismatch(16, 8)));
}

#[test]
fn truncated_pixel_block_is_an_error() {
    let mut data = file_header(2, false);
    push_block_header(&mut data, 12 + 8, 0, 0, 2, 2);
    // only one of the four promised units
    data.extend_from_slice(&0x001f_u16.to_le_bytes());

    let mut decoder = TimDecoder::new(Cursor::new(data));
    let err = decoder.decode().unwrap_err();

    assert!(matches!(
        err,
        TimDecoderErrors::IoErrors(ByteIoError::UnexpectedEof(_, _))
    ));
}

#[test]
fn unknown_image_type_code() {
    let data = file_header(7, false);

    let mut decoder = TimDecoder::new(Cursor::new(data));
    let err = decoder.decode().unwrap_err();

    assert!(matches!(err, TimDecoderErrors::UnsupportedImageType(7)));
}

#[test]
fn direct_color_palette_block_is_skipped() {
    let mut data = file_header(2, true);
    // a stray 16 entry palette before the pixels
    push_counting_clut(&mut data, 16, 1);
    push_block_header(&mut data, 12 + 2, 0, 0, 1, 1);
    data.extend_from_slice(&0x7c00_u16.to_le_bytes());

    let mut decoder = TimDecoder::new(Cursor::new(data));
    let pixels = decoder.decode().unwrap();

    assert_eq!(pixels, [0, 0, 255, 255]);
}

#[test]
fn direct_color_palette_block_errors_in_strict_mode() {
    let mut data = file_header(2, true);
    push_counting_clut(&mut data, 16, 1);
    push_block_header(&mut data, 12 + 2, 0, 0, 1, 1);
    data.extend_from_slice(&0x7c00_u16.to_le_bytes());

    let options = DecoderOptions::default().set_strict_mode(true);
    let mut decoder = TimDecoder::new_with_options(Cursor::new(data), options);

    decoder.decode().unwrap_err();
}

#[test]
fn twenty_four_bit_rows_ignore_tail_padding() {
    // 6 units wide is 12 bytes per row, 4 BGR pixels plus no tail;
    // use 5 units so each row carries 3 pixels and one padding byte
    let mut data = file_header(3, false);
    push_block_header(&mut data, 12 + 5 * 2 * 2, 0, 0, 5, 2);
    for _ in 0..2 {
        // three BGR pixels: blue, green, red
        data.extend_from_slice(&[255, 0, 0, 0, 255, 0, 0, 0, 255]);
        // row tail
        data.push(0xaa);
    }

    let mut decoder = TimDecoder::new(Cursor::new(data));
    let pixels = decoder.decode().unwrap();

    assert_eq!(decoder.dimensions(), Some((2, 2)));
    // width is 5 / 2 units, only the leading two pixels of each row
    // survive
    let row = [[0, 0, 255, 255], [0, 255, 0, 255]].concat();
    assert_eq!(pixels, [row.clone(), row].concat());
}

#[test]
fn headers_are_decoded_once() {
    let mut data = file_header(2, false);
    push_block_header(&mut data, 12 + 2, 0, 0, 1, 1);
    data.extend_from_slice(&0x03e0_u16.to_le_bytes());

    let mut decoder = TimDecoder::new(Cursor::new(data));

    assert_eq!(decoder.dimensions(), None);
    decoder.decode_headers().unwrap();
    // a second call must not re-read the stream
    decoder.decode_headers().unwrap();

    let pixels = decoder.decode().unwrap();
    assert_eq!(pixels, [0, 255, 0, 255]);
}

#[test]
fn decode_into_rejects_short_buffers() {
    let mut data = file_header(2, false);
    push_block_header(&mut data, 12 + 8, 0, 0, 2, 2);
    data.extend_from_slice(&[0; 8]);

    let mut decoder = TimDecoder::new(Cursor::new(data));
    let mut buf = [0_u8; 15];

    let err = decoder.decode_into(&mut buf).unwrap_err();
    assert!(matches!(err, TimDecoderErrors::TooSmallBuffer(16, 15)));
}

#[test]
fn dimension_limits_are_enforced() {
    let mut data = file_header(2, false);
    push_block_header(&mut data, 12, 0, 0, 64, 1);

    let options = DecoderOptions::default().set_max_width(16);
    let mut decoder = TimDecoder::new_with_options(Cursor::new(data), options);

    let err = decoder.decode_headers().unwrap_err();
    assert!(matches!(
        err,
        TimDecoderErrors::TooLargeDimensions("width", 16, 64)
    ));
}

#[test]
fn zero_sized_image_decodes_to_nothing() {
    let mut data = file_header(2, false);
    push_block_header(&mut data, 12, 0, 0, 0, 0);

    let mut decoder = TimDecoder::new(Cursor::new(data));
    let pixels = decoder.decode().unwrap();

    assert_eq!(decoder.dimensions(), Some((0, 0)));
    assert!(pixels.is_empty());
}

#[test]
fn origin_is_reported() {
    let mut data = file_header(2, false);
    push_block_header(&mut data, 12 + 2, 320, 240, 1, 1);
    data.extend_from_slice(&[0, 0]);

    let mut decoder = TimDecoder::new(Cursor::new(data));
    decoder.decode_headers().unwrap();

    assert_eq!(decoder.origin(), Some((320, 240)));
}

#[test]
fn decoding_is_deterministic() {
    let mut data = file_header(0, true);
    push_counting_clut(&mut data, 16, 1);
    push_block_header(&mut data, 12 + 4, 0, 0, 2, 1);
    data.extend_from_slice(&[0x21, 0x43, 0x65, 0x87]);

    let decode = |bytes: &[u8]| {
        let mut decoder = TimDecoder::new(Cursor::new(bytes.to_vec()));
        decoder.decode().unwrap()
    };

    assert_eq!(decode(&data), decode(&data));
}

#[test]
fn probe_accepts_valid_headers() {
    assert!(probe_tim(&file_header(0, true)));
    assert!(probe_tim(&file_header(3, false)));

    // wrong magic
    assert!(!probe_tim(&[0x11, 0, 0, 0, 2, 0, 0, 0]));
    // reserved flag bits set
    assert!(!probe_tim(&[0x10, 0, 0, 0, 2, 1, 0, 0]));
    // too short to carry a flags word
    assert!(!probe_tim(&[0x10, 0, 0, 0]));
    assert!(!probe_tim(&[]));
}
