// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Encoder Driver (spec §4.2): computes the initial rulers, drives the
//! Splash Engine while recording the samples it emits, and stops once
//! the per-frame sample budget is spent.

use crate::context::{SampleCursor, SplashContext, SplashParams};
use crate::engine::{self, Mode};
use crate::error::Result;
use crate::image::Image;
use crate::util::tracing_wrappers::{debug, warn};
use crate::wire;

/// An encoded packet plus the host-visible flag from spec §6 ("Every
/// encoded packet is flagged as a key frame").
pub struct Packet {
    pub bytes: Vec<u8>,
    pub is_key_frame: bool,
}

pub struct Encoder {
    ctx: SplashContext,
    frame_index: u64,
}

impl Encoder {
    pub fn new(width: usize, height: usize, params: SplashParams) -> Result<Self> {
        Ok(Encoder {
            ctx: SplashContext::open(width, height, params)?,
            frame_index: 0,
        })
    }

    pub fn context(&self) -> &SplashContext {
        &self.ctx
    }

    /// Encodes one frame against the current canvas state (spec §4.2).
    pub fn encode_frame(&mut self, target: &Image) -> Result<Packet> {
        assert_eq!(target.size(), (self.ctx.width(), self.ctx.height()));
        self.ctx.begin_frame();

        // Steps 1-2: seed both rulers from the per-line absolute error
        // against the current canvas, and keep a snapshot of this
        // initial state — it is what gets transmitted on the wire. The
        // decoder replays the engine from this same starting point, so
        // the packet must carry the rulers as computed here, not their
        // post-convergence values.
        seed_rulers(&mut self.ctx, target);
        let initial_x_err = self.ctx.x_err.clone();
        let initial_y_err = self.ctx.y_err.clone();

        // Step 3: per-frame sample budget.
        let total_pixels = (self.ctx.width() * self.ctx.height()) as f32;
        let divisor = if self.frame_index == 0 {
            self.ctx.params.ppk
        } else {
            self.ctx.params.ppf
        };
        let max_pixels = (total_pixels / divisor).round() as usize;
        debug!(frame_index = self.frame_index, max_pixels, "encoding frame");

        // Step 4: drive the engine until the budget is spent or the
        // canvas has converged.
        let mut cursor = SampleCursor::for_encode();
        let mode = Mode::Encode { target };
        while self.ctx.num_pixels < max_pixels {
            if !engine::update_lines(&mut self.ctx, &mode, &mut cursor) {
                break;
            }
        }

        // Step 6: lossless-mode verification.
        if self.ctx.params.ppf == 1.0 {
            verify_lossless(&self.ctx, target);
        }

        // Step 5: assemble [header | xErr | yErr | samples], using the
        // rulers' initial (pre-engine) values.
        let mut bytes = Vec::new();
        wire::write_header(&mut bytes, self.ctx.params.radius);
        wire::write_ruler(&mut bytes, &initial_x_err);
        wire::write_ruler(&mut bytes, &initial_y_err);
        bytes.extend_from_slice(&cursor.into_encoded());

        self.frame_index += 1;
        Ok(Packet {
            bytes,
            is_key_frame: true,
        })
    }
}

fn seed_rulers(ctx: &mut SplashContext, target: &Image) {
    let (width, height) = target.size();
    for i in 0..width {
        let mut sum: u64 = 0;
        for j in 0..height {
            sum += ctx.canvas.get(i, j).abs_diff_sum(target.get(i, j)) as u64;
        }
        ctx.x_err.set(i, sum.min(crate::util::MAX_RULER_VALUE as u64) as u32);
    }
    for j in 0..height {
        let mut sum: u64 = 0;
        for i in 0..width {
            sum += ctx.canvas.get(i, j).abs_diff_sum(target.get(i, j)) as u64;
        }
        ctx.y_err.set(j, sum.min(crate::util::MAX_RULER_VALUE as u64) as u32);
    }
}

fn verify_lossless(ctx: &SplashContext, target: &Image) {
    let (width, height) = target.size();
    let mut mismatches = 0u64;
    for j in 0..height {
        for i in 0..width {
            let a = ctx.canvas.get(i, j);
            let b = target.get(i, j);
            if a.r != b.r {
                mismatches += 1;
            }
            if a.g != b.g {
                mismatches += 1;
            }
            if a.b != b.b {
                mismatches += 1;
            }
        }
    }
    if mismatches > 0 {
        warn!(mismatches, "lossless verification miss");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::image::Pixel;

    #[test]
    fn solid_color_single_pixel_matches_spec_scenario() {
        let mut enc = Encoder::new(1, 1, SplashParams::new(1.0, 1.0, 1).unwrap()).unwrap();
        let mut target = Image::new(1, 1).unwrap();
        target.set(0, 0, Pixel::rgb(10, 20, 30));
        let packet = enc.encode_frame(&target).unwrap();
        assert!(packet.is_key_frame);
        // header(12) + xErr(3) + yErr(3) + one sample(3) = 21 bytes.
        assert_eq!(packet.bytes.len(), 21);
        assert_eq!(&packet.bytes[12..15], &[0x41, 0x01, 0x00]);
        assert_eq!(&packet.bytes[15..18], &[0x41, 0x01, 0x00]);
        assert_eq!(&packet.bytes[18..21], &[10, 20, 30]);
    }

    #[test]
    fn uniform_gray_target_emits_no_samples() {
        let mut enc = Encoder::new(8, 8, SplashParams::new(1.0, 1.0, 5).unwrap()).unwrap();
        let target = Image::new(8, 8).unwrap();
        let packet = enc.encode_frame(&target).unwrap();
        // header(12) + 8 xErr entries(24) + 8 yErr entries(24) + 0 samples.
        assert_eq!(packet.bytes.len(), 12 + 24 + 24);
    }
}
