// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Decoder Driver (spec §4.3): reads the initial rulers and sample bytes
//! from the bitstream and replays the Splash Engine bit-identically to
//! the encoder.

use crate::context::{SampleCursor, SplashContext, SplashParams};
use crate::engine::{self, Mode};
use crate::error::Result;
use crate::util::tracing_wrappers::{debug, warn};
use crate::wire;

pub struct Frame {
    pub canvas_bytes: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub is_key_frame: bool,
}

pub struct Decoder {
    ctx: SplashContext,
}

impl Decoder {
    pub fn new(width: usize, height: usize, params: SplashParams) -> Result<Self> {
        Ok(Decoder {
            ctx: SplashContext::open(width, height, params)?,
        })
    }

    pub fn context(&self) -> &SplashContext {
        &self.ctx
    }

    /// Decodes one packet into a frame, replaying it onto the context's
    /// running canvas (spec §4.3).
    pub fn decode_packet(&mut self, packet: &[u8]) -> Result<Frame> {
        // Step 1: parse the header. The packet's radius is authoritative
        // for this frame — it is what the encoder actually used, and the
        // decoder must replay the engine with the same value to stay
        // bit-identical (spec §9).
        let header = wire::read_header(packet)?;
        debug!(radius = header.radius, "decoding packet");
        self.ctx.params.radius = header.radius;
        self.ctx.begin_frame();

        let width = self.ctx.width();
        let height = self.ctx.height();

        // Step 2: read xErr and yErr.
        let (x_err, after_x) = wire::read_ruler(packet, wire::HEADER_LEN, width)?;
        let (y_err, after_y) = wire::read_ruler(packet, after_x, height)?;
        self.ctx.x_err = x_err;
        self.ctx.y_err = y_err;

        // Step 3: drive the engine while the cursor is below the packet
        // end, stopping when the engine signals no more progress.
        let samples = &packet[after_y..];
        let mut cursor = SampleCursor::for_decode(samples);
        loop {
            if cursor.at_end() {
                break;
            }
            if !engine::update_lines(&mut self.ctx, &Mode::Decode, &mut cursor) {
                break;
            }
        }

        // Step 4: a cursor that didn't reach the packet end signals a
        // truncated sample stream; non-fatal, canvas still exported.
        if !cursor.at_end() {
            warn!(
                remaining = cursor.remaining(),
                "incomplete scan line: packet ended before the canvas fully converged"
            );
        }

        // Step 5: export the canvas, forcing the padding byte to 255.
        let mut canvas_bytes = vec![0u8; width * height * 4];
        self.ctx.canvas.export_into(&mut canvas_bytes);
        Ok(Frame {
            canvas_bytes,
            width,
            height,
            is_key_frame: true,
        })
    }
}
