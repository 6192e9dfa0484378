// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![forbid(unsafe_code)]

//! `splash`: a progressive image codec core built around an
//! error-ruler-driven canvas splat.
//!
//! The host-visible surface is intentionally split into [`codec::Encoder`]
//! and [`codec::Decoder`] rather than one tagged `open`/`encode`/`decode`
//! object — each owns its own [`context::SplashContext`], and `close` is
//! simply dropping it. Both share the same [`engine::update_lines`] step,
//! which is the part of this crate that must behave identically on both
//! sides of the wire (see the crate's design notes on determinism).

pub mod codec;
pub mod context;
pub mod engine;
pub mod error;
pub mod image;
pub mod ruler;
mod util;
pub mod wire;

pub use codec::{Decoder, Encoder};
pub use context::SplashParams;
pub use error::{Error, Result};
pub use image::{Image, Pixel};
