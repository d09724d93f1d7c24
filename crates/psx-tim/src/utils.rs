/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Expand a packed 15-bit PSX color into 8-bit-per-channel RGBA.
///
/// Bits 0-4 are red, 5-9 green, 10-14 blue. Bit 15 is the PSX
/// transparency flag which we ignore, every pixel comes out opaque.
#[inline]
pub(crate) fn rgb555_to_rgba(packed: u16) -> [u8; 4] {
    let r = expand_channel(packed & 0x1f);
    let g = expand_channel((packed >> 5) & 0x1f);
    let b = expand_channel((packed >> 10) & 0x1f);

    [r, g, b, 255]
}

/// Widen a 5-bit channel to 8 bits by replicating the top three bits
/// into the low bits, spreading the range evenly over 0-255 the way
/// ImageMagick-class decoders do. A plain shift would top out at 248.
#[inline]
const fn expand_channel(channel: u16) -> u8 {
    ((channel << 3) | (channel >> 2)) as u8
}
