//! Building blocks for processing callbacks.
//!
//! Everything here works on the normalized `f32` channel slices the
//! processing callback receives, so it can be used directly inside the
//! closure passed to [`Framework::start`](crate::Framework::start):
//!
//! ```ignore
//! let mut gain = Gain::new(0.5);
//! framework.start(None::<fn(usize)>, move |rx_l, rx_r, tx_l, tx_r, _| {
//!     gain.apply(rx_l, rx_r, tx_l, tx_r);
//! });
//! ```

mod helpers;
mod tone;

pub use helpers::{passthrough, peak, Gain};
pub use tone::SineTone;
