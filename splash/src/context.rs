// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! [`SplashContext`]: the per-codec-instance state shared by the encode
//! and decode drivers (spec §3 "SplashContext").

use crate::error::{Error, Result};
use crate::image::Image;
use crate::ruler::ErrorRuler;

/// Encoder-side codec parameters (spec §6 "Codec parameters").
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplashParams {
    /// Pixels-per-frame divisor for non-key frames. Must be `>= 1.0`.
    pub ppf: f32,
    /// Pixels-per-key-frame divisor for the first frame. Must be `>= 1.0`.
    pub ppk: f32,
    /// Brush radius in `1..=255` (wire format caps it to one byte).
    pub radius: u8,
}

impl Default for SplashParams {
    fn default() -> Self {
        SplashParams {
            ppf: 1.0,
            ppk: 2.0,
            radius: 5,
        }
    }
}

impl SplashParams {
    pub fn new(ppf: f32, ppk: f32, radius: u32) -> Result<Self> {
        if !(ppf >= 1.0) {
            return Err(Error::InvalidPpf(ppf));
        }
        if !(ppk >= 1.0) {
            return Err(Error::InvalidPpk(ppk));
        }
        // The wire format stores radius in one byte; reject rather than
        // silently truncate (spec §9 open question).
        if radius == 0 || radius > 255 {
            return Err(Error::InvalidRadius(radius));
        }
        Ok(SplashParams {
            ppf,
            ppk,
            radius: radius as u8,
        })
    }

    pub fn radius(&self) -> usize {
        self.radius as usize
    }
}

/// The ordered byte stream of RGB triples consumed/produced while walking
/// cross points (spec §3 "Sample Stream"). Encoder and decoder share this
/// type so both sides implement sample I/O exactly once.
pub enum SampleCursor<'a> {
    Encode { samples: Vec<u8> },
    Decode { data: &'a [u8], pos: usize },
}

impl<'a> SampleCursor<'a> {
    pub fn for_encode() -> Self {
        SampleCursor::Encode { samples: Vec::new() }
    }

    pub fn for_decode(data: &'a [u8]) -> Self {
        SampleCursor::Decode { data, pos: 0 }
    }

    pub fn write_triple(&mut self, r: u8, g: u8, b: u8) {
        match self {
            SampleCursor::Encode { samples } => samples.extend_from_slice(&[r, g, b]),
            SampleCursor::Decode { .. } => unreachable!("write on a decode cursor"),
        }
    }

    /// Reads the next RGB triple. Returns `None` if fewer than 3 bytes
    /// remain; the caller treats this as a truncated sample stream
    /// (spec §7), not a hard error.
    pub fn read_triple(&mut self) -> Option<(u8, u8, u8)> {
        match self {
            SampleCursor::Encode { .. } => unreachable!("read on an encode cursor"),
            SampleCursor::Decode { data, pos } => {
                if *pos + 3 > data.len() {
                    return None;
                }
                let triple = (data[*pos], data[*pos + 1], data[*pos + 2]);
                *pos += 3;
                Some(triple)
            }
        }
    }

    pub fn remaining(&self) -> usize {
        match self {
            SampleCursor::Encode { samples } => samples.len(),
            SampleCursor::Decode { data, pos } => data.len() - pos,
        }
    }

    pub fn into_encoded(self) -> Vec<u8> {
        match self {
            SampleCursor::Encode { samples } => samples,
            SampleCursor::Decode { .. } => unreachable!("into_encoded on a decode cursor"),
        }
    }

    pub fn at_end(&self) -> bool {
        match self {
            SampleCursor::Encode { .. } => false,
            SampleCursor::Decode { data, pos } => *pos >= data.len(),
        }
    }
}

/// Owns Canvas, both error rulers, configuration, and the per-frame
/// sample counter. Allocated on codec open, reset at frame boundaries,
/// freed on codec close (spec §3, §5).
pub struct SplashContext {
    pub canvas: Image,
    pub x_err: ErrorRuler,
    pub y_err: ErrorRuler,
    pub params: SplashParams,
    /// Samples transmitted so far in the current frame.
    pub num_pixels: usize,
}

impl SplashContext {
    pub fn open(width: usize, height: usize, params: SplashParams) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let canvas = Image::new(width, height)?;
        Ok(SplashContext {
            canvas,
            x_err: ErrorRuler::zeroed(width),
            y_err: ErrorRuler::zeroed(height),
            params,
            num_pixels: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.canvas.width()
    }

    pub fn height(&self) -> usize {
        self.canvas.height()
    }

    /// Resets the per-frame sample counter; the canvas and rulers carry
    /// over across frames within one context (spec §5: the canvas
    /// evolves across calls within one context).
    pub fn begin_frame(&mut self) {
        self.num_pixels = 0;
    }
}
