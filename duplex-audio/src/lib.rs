//! # duplex-audio
//!
//! A `no_std` double-buffered audio transfer framework for full-duplex
//! stereo serial audio peripherals (I²S / SAI) on Cortex-M class
//! microcontrollers. The peripheral's data interrupt moves raw 32-bit
//! samples in and out of a ping-pong buffer; every time a block fills, a
//! lower-priority software interrupt converts it to normalized `f32`
//! channels, calls the application's processing callback and converts the
//! result back for transmission two blocks later.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Hardware | [`hal`] | [`AudioHal`] trait: peripheral, interrupt controller, sample registers |
//! | Memory | [`buffer`] | Fallible allocation of the ping-pong slots and channel buffers |
//! | Callbacks | [`callback`] | Optional instrumentation hooks and the processing callback |
//! | Interrupts | [`stage`] | Transfer and processing stages, sample conversion |
//! | Control | [`framework`] | [`Framework`]: configuration, start, interrupt routing |
//! | DSP | [`dsp`] | Helpers for writing processing callbacks (feature-gated) |
//!
//! ## Quick start
//!
//! ```ignore
//! use core::num::NonZeroUsize;
//! use duplex_audio::{on_process_interrupt, on_transfer_interrupt, Framework};
//!
//! let mut audio = Framework::new(BoardHal::take());
//! audio.set_block_size(NonZeroUsize::new(64).unwrap())?;
//! audio.set_pre_transfer_hook(|| debug_pin_high());
//! audio.set_post_transfer_hook(|| debug_pin_low());
//!
//! audio.start(None::<fn(usize)>, |rx_l, rx_r, tx_l, tx_r, _| {
//!     tx_l.copy_from_slice(rx_l);
//!     tx_r.copy_from_slice(rx_r);
//! });
//!
//! #[interrupt]
//! fn SAI1() {
//!     unsafe { on_transfer_interrupt::<BoardHal>() }
//! }
//!
//! #[interrupt]
//! fn SPI6() {
//!     unsafe { on_process_interrupt::<BoardHal>() }
//! }
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `dsp` | yes | Gain, test tone and level helpers for processing callbacks |
//! | `frame-sync` | yes | Word-select edge wait helper (requires `embedded-hal`) |
//!
//! ## Audio parameters
//!
//! - **Block size:** run-time, default 1 frame ([`constants::DEFAULT_BLOCK_SIZE`])
//! - **Raw format:** `i32`, interleaved left/right
//! - **Processing format:** `f32` in `[-1.0, 1.0)`, one slice per channel
//! - **Latency:** two blocks from reception to transmission

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod buffer;
pub mod callback;
pub mod constants;
pub mod error;
pub mod framework;
pub mod hal;
pub mod stage;

#[cfg(feature = "dsp")]
pub mod dsp;

#[cfg(test)]
mod test_support;

pub use error::{AllocationError, ConfigError};
pub use framework::{on_process_interrupt, on_transfer_interrupt, Framework, State};
pub use hal::AudioHal;
