//! Transfer buffer management.
//!
//! ## Layout
//!
//! ```text
//!              slot 0                    slot 1
//!        ┌──────────────────┐     ┌──────────────────┐
//!  rx    │ L R L R ... (2N) │     │ L R L R ... (2N) │   i32, from peripheral
//!  tx    │ L R L R ... (2N) │     │ L R L R ... (2N) │   i32, to peripheral
//!        └──────────────────┘     └──────────────────┘
//!
//!  rx_left  rx_right  tx_left  tx_right                   f32, N each
//! ```
//!
//! [`Buffers`] holds the optional [`BufferSet`]. Reconfiguring drops the old
//! set before allocating the new one; a failed allocation leaves no set at
//! all, which the stages treat as "paused".

mod set;

use core::num::NonZeroUsize;

use crate::error::AllocationError;

pub use set::{BufferSet, ChannelBuffers, RawSlot};

/// Owner of the current buffer set, if any.
#[derive(Default)]
pub struct Buffers {
    set: Option<BufferSet>,
}

impl Buffers {
    pub const fn empty() -> Self {
        Buffers { set: None }
    }

    /// Replace the working set with one sized for `block_size` frames.
    ///
    /// The existing set is released first. On failure no set remains.
    pub fn configure(&mut self, block_size: NonZeroUsize) -> Result<(), AllocationError> {
        self.set = None;
        self.set = Some(BufferSet::allocate(block_size)?);
        Ok(())
    }

    /// Release the working set.
    pub fn release(&mut self) {
        self.set = None;
    }

    pub fn get(&self) -> Option<&BufferSet> {
        self.set.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut BufferSet> {
        self.set.as_mut()
    }

    pub fn is_allocated(&self) -> bool {
        self.set.is_some()
    }
}
