//! Transfer stage: the data interrupt.
//!
//! Runs at the higher of the two priorities, once per peripheral frame.
//! Each invocation exchanges [`AudioHal::SAMPLES_PER_INTERRUPT`] raw samples
//! with the active ping-pong slot, alternating one read and one write:
//!
//! ```text
//! RX register ──read──► slot[active].rx[sample_index]
//! TX register ◄─write── slot[active].tx[sample_index]
//! ```
//!
//! When the slot is full the stage hands it to the processing stage:
//!
//! 1. publish the active index as the process index
//! 2. flip the active index
//! 3. rewind the sample index
//! 4. pend the processing interrupt
//!
//! This is the only hand-off point. The processing interrupt has lower
//! priority, so it cannot run in the middle of these four steps, and from
//! then on the transfer stage only touches the other slot.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::buffer::BufferSet;
use crate::callback::HookPair;
use crate::hal::AudioHal;

/// State owned by the transfer interrupt.
pub struct TransferStage<H: AudioHal> {
    hal: H,
    hooks: HookPair,
    /// Slot being filled, 0 or 1.
    buffer_index: usize,
    /// Next raw position in the active slot, `0..2 * block_size`.
    sample_index: usize,
}

impl<H: AudioHal> TransferStage<H> {
    pub fn new(hal: H) -> Self {
        TransferStage {
            hal,
            hooks: HookPair::new(),
            buffer_index: 0,
            sample_index: 0,
        }
    }

    /// Restart at the beginning of slot 0. Called after reconfiguration.
    pub fn reset(&mut self) {
        self.buffer_index = 0;
        self.sample_index = 0;
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    pub fn hooks_mut(&mut self) -> &mut HookPair {
        &mut self.hooks
    }

    pub fn buffer_index(&self) -> usize {
        self.buffer_index
    }

    pub fn sample_index(&self) -> usize {
        self.sample_index
    }

    /// Service one transfer interrupt.
    ///
    /// With no buffer set the pipeline is paused: only the hooks run.
    /// Returns `true` if the active slot filled up and was handed off.
    ///
    /// # Safety
    ///
    /// The processing stage must not be using slot
    /// [`buffer_index`](Self::buffer_index) of `buffers`. The swap protocol
    /// guarantees this as long as processing of a block finishes within one
    /// block period.
    pub unsafe fn run(&mut self, buffers: Option<&BufferSet>, process_index: &AtomicUsize) -> bool {
        self.hooks.fire_pre();

        let mut handed_off = false;
        if let Some(buffers) = buffers {
            // SAFETY: the active slot belongs to this stage (see above).
            let slot = unsafe { buffers.slot(self.buffer_index) };

            for _ in 0..H::SAMPLES_PER_INTERRUPT {
                let incoming = self.hal.read_sample();
                // Past the end only happens when SAMPLES_PER_INTERRUPT does
                // not divide the slot length; drop the excess, send silence.
                if let Some(rx) = slot.rx_mut().get_mut(self.sample_index) {
                    *rx = incoming;
                }
                let outgoing = slot.tx().get(self.sample_index).copied().unwrap_or(0);
                self.hal.write_sample(outgoing);
                self.sample_index += 1;
            }

            if self.sample_index >= buffers.slot_len() {
                process_index.store(self.buffer_index, Ordering::Release);
                self.buffer_index ^= 1;
                self.sample_index = 0;
                let irq = self.hal.process_interrupt();
                self.hal.pend_interrupt(irq);
                handed_off = true;
            }
        }

        self.hooks.fire_post();
        handed_off
    }
}
