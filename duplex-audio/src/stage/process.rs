//! Processing stage: the software-triggered interrupt.
//!
//! Pended by the transfer stage each time a slot fills. Runs at the lower
//! priority, so the transfer interrupt keeps servicing the peripheral (on the
//! other slot) while user processing is in progress.
//!
//! ```text
//! slot[p].rx ──deinterleave, /2^31──► rx_left, rx_right
//!                                          │
//!                                   process callback
//!                                          ▼
//! slot[p].tx ◄──interleave, *2^31─── tx_left, tx_right
//! ```
//!
//! The transmit lane written here is played out the next time the transfer
//! stage cycles back to slot `p`, two blocks after it was received.
//!
//! ## Timing
//!
//! Processing one block must finish within one block period
//! (`block_size / sample_rate`). Nothing checks this; an overrun shows up as
//! stale or torn audio.

use crate::buffer::BufferSet;
use crate::callback::{HookPair, ProcessCallback};

use super::convert::{deinterleave_to_float, interleave_from_float};

/// State owned by the processing interrupt.
#[derive(Default)]
pub struct ProcessStage {
    hooks: HookPair,
    callback: Option<ProcessCallback>,
}

impl ProcessStage {
    pub const fn new() -> Self {
        ProcessStage {
            hooks: HookPair::new(),
            callback: None,
        }
    }

    pub fn hooks_mut(&mut self) -> &mut HookPair {
        &mut self.hooks
    }

    pub fn set_callback(&mut self, callback: ProcessCallback) {
        self.callback = Some(callback);
    }

    /// Service one processing interrupt for slot `process_index`.
    ///
    /// Does nothing but fire the hooks when no callback is registered or no
    /// buffer set is installed. Returns `true` if a block was processed.
    ///
    /// # Safety
    ///
    /// The transfer stage must have handed slot `process_index` off and must
    /// not return to it before this call completes. Must not be re-entered.
    pub unsafe fn run(&mut self, buffers: Option<&BufferSet>, process_index: usize) -> bool {
        self.hooks.fire_pre();

        let mut processed = false;
        if let (Some(callback), Some(buffers)) = (self.callback.as_mut(), buffers) {
            // SAFETY: the slot was handed off to this stage and the channel
            // buffers are only ever used here.
            let (slot, channels) = unsafe { (buffers.slot(process_index), buffers.channels()) };

            deinterleave_to_float(
                slot.rx(),
                channels.rx_left.as_mut_slice(),
                channels.rx_right.as_mut_slice(),
            );

            callback(
                channels.rx_left.as_slice(),
                channels.rx_right.as_slice(),
                channels.tx_left.as_mut_slice(),
                channels.tx_right.as_mut_slice(),
                buffers.block_size(),
            );

            interleave_from_float(
                slot.tx_mut(),
                channels.tx_left.as_slice(),
                channels.tx_right.as_slice(),
            );
            processed = true;
        }

        self.hooks.fire_post();
        processed
    }
}
