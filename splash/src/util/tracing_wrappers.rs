// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Thin wrappers around `tracing`'s event macros so the rest of the crate
//! can log unconditionally; with the `tracing` feature disabled these
//! expand to nothing instead of requiring every call site to be gated.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! noop_log {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop_log as debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use noop_log as trace;
#[cfg(not(feature = "tracing"))]
pub(crate) use noop_log as warn;
