// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

/// Why a packet failed to parse.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedPacketKind {
    #[error("invalid magic {0:02x?}, expected \"splash\"")]
    InvalidMagic([u8; 6]),
    #[error("header length {0} != 12")]
    InvalidHeaderLength(u32),
    #[error("unsupported version {0}, this decoder supports up to 1")]
    UnsupportedVersion(u8),
    #[error("brush radius 0 is invalid")]
    ZeroRadius,
    #[error("reserved compression tag {0} must be 0")]
    NonZeroCompressionTag(u8),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("out of memory")]
    OutOfMemory(#[from] TryReserveError),
    #[error("invalid image dimensions {width}x{height}: both must be nonzero")]
    InvalidDimensions { width: usize, height: usize },
    #[error("invalid brush radius {0}: must be in 1..=255")]
    InvalidRadius(u32),
    #[error("invalid pixels-per-frame divisor {0}: must be >= 1.0")]
    InvalidPpf(f32),
    #[error("invalid pixels-per-key-frame divisor {0}: must be >= 1.0")]
    InvalidPpk(f32),
    #[error("malformed packet: {0}")]
    MalformedPacket(MalformedPacketKind),
    #[error("packet too short: needed at least {needed} bytes, got {available}")]
    BufferTooShort { needed: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
