/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Formatter};
use std::io::{Read, Seek, SeekFrom};

/// Upper bound for the internal buffer.
///
/// Streams shorter than this get a buffer the size of the stream.
const BUFFER_CAPACITY: usize = 4096;

/// Errors the byte reader can return
pub enum ByteIoError {
    /// An error bubbled up from the underlying source
    StdIoError(std::io::Error),
    /// The source ran out of bytes before a request could be
    /// satisfied, (requested, read)
    UnexpectedEof(usize, usize),
    /// The caller asked for something impossible, e.g a seek before
    /// the start of the stream. Indicates a caller bug, not a bad file
    InvalidArgument(&'static str),
    /// Generic message
    Generic(&'static str)
}

impl Debug for ByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ByteIoError::StdIoError(err) => {
                writeln!(f, "Underlying I/O error {err}")
            }
            ByteIoError::UnexpectedEof(requested, read) => {
                writeln!(
                    f,
                    "Unexpected end of input, requested {requested} bytes but found {read}"
                )
            }
            ByteIoError::InvalidArgument(err) => {
                writeln!(f, "Invalid argument: {err}")
            }
            ByteIoError::Generic(err) => {
                writeln!(f, "Generic I/O error: {err}")
            }
        }
    }
}

impl From<std::io::Error> for ByteIoError {
    fn from(value: std::io::Error) -> Self {
        ByteIoError::StdIoError(value)
    }
}

/// A buffered reader over a seekable byte source.
///
/// Small fixed-width reads (`get_u8`, `get_u16_le`, ...) are served
/// from an internal buffer of at most [`BUFFER_CAPACITY`] bytes which is
/// refilled by sliding the unconsumed remainder to the front, so
/// repositioning within the buffered span never touches the underlying
/// source. Bulk reads via [`read_exact_bytes`](ByteReader::read_exact_bytes)
/// bypass the buffer and go straight into the destination to avoid
/// copying large payloads twice.
///
/// The reader owns its source; [`consume`](ByteReader::consume) hands it
/// back. Callers that keep ownership of their stream can pass `&mut stream`
/// instead, since `Read + Seek` is implemented for mutable references.
pub struct ByteReader<T: Read + Seek> {
    inner:       T,
    buffer:      Vec<u8>,
    /// Offset of the next unconsumed byte in `buffer`
    start:       usize,
    /// Number of valid bytes in `buffer`
    fill:        usize,
    /// Stream offset corresponding to `buffer[0]`
    base:        u64,
    initialized: bool
}

impl<T: Read + Seek> ByteReader<T> {
    /// Create a new reader over `source`.
    ///
    /// The buffer is sized on first use, `min(stream length, 4096)`,
    /// so construction never performs I/O.
    pub fn new(source: T) -> ByteReader<T> {
        ByteReader {
            inner:       source,
            buffer:      Vec::new(),
            start:       0,
            fill:        0,
            base:        0,
            initialized: false
        }
    }

    /// Destroy this reader returning the underlying source of the
    /// bytes from which we were decoding
    #[inline(always)]
    pub fn consume(self) -> T {
        self.inner
    }

    /// Size the buffer to the stream and record where in the stream we
    /// were handed the source.
    fn init(&mut self) -> Result<(), ByteIoError> {
        if self.initialized {
            return Ok(());
        }
        let current = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;

        // Avoid seeking a third time when we were already at the end of
        // the stream. The branch is usually way cheaper than a seek operation.
        if end != current {
            self.inner.seek(SeekFrom::Start(current))?;
        }
        let capacity = end.min(BUFFER_CAPACITY as u64) as usize;

        self.buffer = vec![0; capacity];
        self.base = current;
        self.initialized = true;
        Ok(())
    }

    /// Return the logical offset into the underlying stream.
    #[inline]
    pub fn position(&mut self) -> Result<u64, ByteIoError> {
        self.init()?;
        Ok(self.base + self.start as u64)
    }

    /// Set the logical offset into the underlying stream.
    ///
    /// Positions within the span already buffered are a pure cursor
    /// adjustment, anything else invalidates the buffer and issues one
    /// absolute seek on the source.
    pub fn set_position(&mut self, position: u64) -> Result<(), ByteIoError> {
        self.init()?;
        if position >= self.base && position <= self.base + self.fill as u64 {
            self.start = (position - self.base) as usize;
            return Ok(());
        }
        self.inner.seek(SeekFrom::Start(position))?;
        self.base = position;
        self.start = 0;
        self.fill = 0;
        Ok(())
    }

    /// Skip `num` bytes ahead of the stream without reading them.
    #[inline]
    pub fn skip(&mut self, num: usize) -> Result<(), ByteIoError> {
        let position = self.position()?;
        self.set_position(position + num as u64)
    }

    /// Move `num` bytes back in the stream.
    ///
    /// Rewinding past the start of the stream fails with
    /// [`ByteIoError::InvalidArgument`].
    #[inline]
    pub fn rewind(&mut self, num: usize) -> Result<(), ByteIoError> {
        let position = self.position()?;
        let target = position.checked_sub(num as u64).ok_or(
            ByteIoError::InvalidArgument("cannot seek before the start of the stream")
        )?;
        self.set_position(target)
    }

    /// Make at least `count` unconsumed bytes resident in the buffer.
    ///
    /// Slides the unconsumed remainder to the front and reads more from
    /// the source until the minimum is met, or errors out when the
    /// source is exhausted first.
    fn ensure(&mut self, count: usize) -> Result<(), ByteIoError> {
        self.init()?;
        debug_assert!(count <= BUFFER_CAPACITY);

        if self.fill - self.start >= count {
            return Ok(());
        }
        self.buffer.copy_within(self.start..self.fill, 0);
        self.base += self.start as u64;
        self.fill -= self.start;
        self.start = 0;

        while self.fill < count {
            let read = self.inner.read(&mut self.buffer[self.fill..])?;
            if read == 0 {
                return Err(ByteIoError::UnexpectedEof(count, self.fill));
            }
            self.fill += read;
        }
        Ok(())
    }

    /// Read exactly `buf.len()` bytes or fail with
    /// [`ByteIoError::UnexpectedEof`].
    ///
    /// The buffered span is drained into `buf` first; the remainder is
    /// read straight from the source into `buf`, bypassing the internal
    /// buffer, so megabyte scale payloads are not copied twice.
    pub fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError> {
        self.init()?;

        let buffered = (self.fill - self.start).min(buf.len());
        buf[..buffered].copy_from_slice(&self.buffer[self.start..self.start + buffered]);
        self.start += buffered;

        if buffered == buf.len() {
            return Ok(());
        }
        // buffer drained, the rest comes straight from the source
        self.base += self.fill as u64;
        self.start = 0;
        self.fill = 0;

        let mut done = buffered;
        while done < buf.len() {
            let read = self.inner.read(&mut buf[done..])?;
            if read == 0 {
                return Err(ByteIoError::UnexpectedEof(buf.len(), done));
            }
            done += read;
            self.base += read as u64;
        }
        Ok(())
    }

    /// Read `N` bytes into a fixed size array or error out if we can't.
    #[inline]
    pub fn read_fixed_bytes<const N: usize>(&mut self) -> Result<[u8; N], ByteIoError> {
        let mut byte_store: [u8; N] = [0; N];

        if N <= BUFFER_CAPACITY {
            self.ensure(N)?;
            byte_store.copy_from_slice(&self.buffer[self.start..self.start + N]);
            self.start += N;
        } else {
            self.read_exact_bytes(&mut byte_store)?;
        }
        Ok(byte_store)
    }

    /// Read a single byte, returning an error if the underlying
    /// buffer cannot support the read.
    #[inline]
    pub fn get_u8(&mut self) -> Result<u8, ByteIoError> {
        self.ensure(1)?;
        let byte = self.buffer[self.start];
        self.start += 1;
        Ok(byte)
    }

    /// Read a single byte reinterpreted as `i8`.
    #[inline]
    pub fn get_i8(&mut self) -> Result<i8, ByteIoError> {
        Ok(self.get_u8()? as i8)
    }

    /// Read `f32` as a little endian value, bit-reinterpreted from the
    /// unsigned read.
    #[inline]
    pub fn get_f32_le(&mut self) -> Result<f32, ByteIoError> {
        Ok(f32::from_bits(self.get_u32_le()?))
    }

    /// Read `f64` as a little endian value, bit-reinterpreted from the
    /// unsigned read.
    #[inline]
    pub fn get_f64_le(&mut self) -> Result<f64, ByteIoError> {
        Ok(f64::from_bits(self.get_u64_le()?))
    }
}

macro_rules! get_single_type {
    ($name:tt,$name2:tt,$int_type:tt,$signed_type:tt) => {
        impl<T: Read + Seek> ByteReader<T> {
            #[doc=concat!("Read ",stringify!($int_type)," as a little endian integer,")]
            #[doc="returning an error if the underlying buffer cannot support the read."]
            #[inline]
            pub fn $name(&mut self) -> Result<$int_type, ByteIoError> {
                const SIZE_OF_VAL: usize = core::mem::size_of::<$int_type>();

                self.ensure(SIZE_OF_VAL)?;

                let mut space = [0; SIZE_OF_VAL];
                space.copy_from_slice(&self.buffer[self.start..self.start + SIZE_OF_VAL]);
                self.start += SIZE_OF_VAL;

                Ok($int_type::from_le_bytes(space))
            }

            #[doc=concat!("Read ",stringify!($signed_type)," as a little endian integer,")]
            #[doc="bit-reinterpreted from the unsigned read."]
            #[inline]
            pub fn $name2(&mut self) -> Result<$signed_type, ByteIoError> {
                Ok(self.$name()? as $signed_type)
            }
        }
    };
}

get_single_type!(get_u16_le, get_i16_le, u16, i16);
get_single_type!(get_u32_le, get_i32_le, u32, i32);
get_single_type!(get_u64_le, get_i64_le, u64, i64);

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{ByteIoError, ByteReader};

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|x| (x % 251) as u8).collect()
    }

    #[test]
    fn little_endian_fields() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0xff];
        let mut reader = ByteReader::new(Cursor::new(data));

        assert_eq!(reader.get_u16_le().unwrap(), 0x0201);
        assert_eq!(reader.get_u32_le().unwrap(), 0x0605_0403);
        assert_eq!(reader.get_u8().unwrap(), 0x07);
        assert_eq!(reader.get_i8().unwrap(), 0x08);
        assert_eq!(reader.get_i8().unwrap(), -1);
        assert_eq!(reader.position().unwrap(), 9);
    }

    #[test]
    fn reposition_inside_buffered_span() {
        let data = sample(64);
        let mut reader = ByteReader::new(Cursor::new(data.clone()));

        let first = reader.read_fixed_bytes::<8>().unwrap();
        reader.set_position(0).unwrap();
        let second = reader.read_fixed_bytes::<8>().unwrap();

        assert_eq!(first, second);
        assert_eq!(&first[..], &data[..8]);
    }

    #[test]
    fn reposition_outside_buffered_span() {
        // larger than the internal buffer so the second seek cannot be
        // served from it
        let data = sample(10_000);
        let mut reader = ByteReader::new(Cursor::new(data.clone()));

        let near = reader.read_fixed_bytes::<4>().unwrap();

        reader.set_position(8_000).unwrap();
        let far = reader.read_fixed_bytes::<4>().unwrap();
        assert_eq!(&far[..], &data[8_000..8_004]);

        reader.set_position(0).unwrap();
        assert_eq!(reader.read_fixed_bytes::<4>().unwrap(), near);
    }

    #[test]
    fn bulk_read_bypasses_buffer() {
        let data = sample(9_000);
        let mut reader = ByteReader::new(Cursor::new(data.clone()));

        // pull a few bytes through the buffer first so the bulk read
        // starts partially buffered
        let head = reader.read_fixed_bytes::<16>().unwrap();
        assert_eq!(&head[..], &data[..16]);

        let mut rest = vec![0; data.len() - 16];
        reader.read_exact_bytes(&mut rest).unwrap();
        assert_eq!(rest, &data[16..]);

        // position tracking must survive the direct read
        assert_eq!(reader.position().unwrap(), data.len() as u64);
        reader.set_position(20).unwrap();
        assert_eq!(reader.get_u8().unwrap(), data[20]);
    }

    #[test]
    fn eof_is_an_error_not_a_hang() {
        let mut reader = ByteReader::new(Cursor::new([1, 2, 3]));

        let err = reader.get_u32_le().unwrap_err();
        assert!(matches!(err, ByteIoError::UnexpectedEof(4, 3)));

        let mut sink = [0; 16];
        let mut reader = ByteReader::new(Cursor::new([1, 2, 3]));
        let err = reader.read_exact_bytes(&mut sink).unwrap_err();
        assert!(matches!(err, ByteIoError::UnexpectedEof(16, 3)));
    }

    #[test]
    fn rewind_before_start_is_invalid() {
        let mut reader = ByteReader::new(Cursor::new(sample(8)));

        reader.skip(4).unwrap();
        reader.rewind(2).unwrap();
        assert_eq!(reader.position().unwrap(), 2);

        let err = reader.rewind(3).unwrap_err();
        assert!(matches!(err, ByteIoError::InvalidArgument(_)));
    }

    #[test]
    fn skip_does_not_read() {
        let data = sample(6_000);
        let mut reader = ByteReader::new(Cursor::new(data.clone()));

        reader.skip(5_000).unwrap();
        assert_eq!(reader.get_u8().unwrap(), data[5_000]);
    }

    #[test]
    fn empty_stream() {
        let mut reader = ByteReader::new(Cursor::new([]));
        assert!(matches!(
            reader.get_u8().unwrap_err(),
            ByteIoError::UnexpectedEof(1, 0)
        ));
    }
}
