/*
 * Copyright (c) 2024.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! A buffered bytestream reader
//!
//! This module contains a reader over a seekable byte source that
//! keeps a small internal buffer so that the fixed-width field reads
//! decoders are full of don't each turn into a syscall.
pub use reader::{ByteIoError, ByteReader};

mod reader;
