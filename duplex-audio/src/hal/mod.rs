//! Hardware abstraction boundary.
//!
//! The framework never touches peripheral registers. Sample registers and
//! interrupt controller access come through [`AudioHal`], implemented once
//! per board.
//!
//! ## Contract
//!
//! | Method | Called from | Must |
//! |--------|-------------|------|
//! | [`setup`](AudioHal::setup) | `Framework::new` | leave the peripheral ready but not transferring |
//! | [`wait_frame_sync`](AudioHal::wait_frame_sync) | `Framework::start` | configure pins, block until the word-select edge |
//! | [`start_transfer`](AudioHal::start_transfer) | `Framework::start` | enable the peripheral so data interrupts fire |
//! | [`read_sample`](AudioHal::read_sample) | transfer interrupt | return one received raw sample |
//! | [`write_sample`](AudioHal::write_sample) | transfer interrupt | queue one raw sample for transmission |
//! | [`pend_interrupt`](AudioHal::pend_interrupt) | transfer interrupt | raise the software interrupt, never block |
//!
//! The per-sample methods run inside the data interrupt and must complete
//! well within one sample period.

#[cfg(feature = "frame-sync")]
pub mod frame_sync;

/// Target-specific access to the serial audio peripheral and the interrupt
/// controller.
pub trait AudioHal {
    /// Interrupt identifier type (e.g. the PAC's `Interrupt` enum).
    type Interrupt: Copy;

    /// Raw samples exchanged per transfer interrupt. `2` for one stereo
    /// frame per interrupt.
    ///
    /// Should divide `2 * block_size` evenly. If it does not, the last
    /// interrupt of a block overshoots the slot: the excess received samples
    /// are dropped and silence is sent in their place.
    const SAMPLES_PER_INTERRUPT: usize;

    /// Bring the peripheral to a ready, not yet transferring state.
    fn setup(&mut self);

    /// Configure the signal pins and block until the frame-sync edge, so
    /// that receive and transmit start phase aligned.
    fn wait_frame_sync(&mut self);

    /// Enable the peripheral. Transfer interrupts start firing after this.
    fn start_transfer(&mut self);

    /// The data (transfer stage) interrupt.
    fn transfer_interrupt(&self) -> Self::Interrupt;

    /// The software-triggered (processing stage) interrupt.
    fn process_interrupt(&self) -> Self::Interrupt;

    /// Recommended priority of the transfer interrupt.
    fn transfer_priority(&self) -> u8;

    /// Recommended priority of the processing interrupt. Must be less
    /// urgent than [`transfer_priority`](Self::transfer_priority).
    fn process_priority(&self) -> u8;

    /// Program the interrupt controller priority of `interrupt`.
    fn set_priority(&mut self, interrupt: Self::Interrupt, priority: u8);

    /// Unmask `interrupt` in the interrupt controller.
    fn enable_interrupt(&mut self, interrupt: Self::Interrupt);

    /// Raise `interrupt` by software. Pending an already pending interrupt
    /// is a no-op.
    fn pend_interrupt(&mut self, interrupt: Self::Interrupt);

    /// Read one raw sample from the receive register.
    fn read_sample(&mut self) -> i32;

    /// Write one raw sample to the transmit register.
    fn write_sample(&mut self, sample: i32);
}

/// Whether `transfer` is strictly more urgent than `process` under the
/// NVIC-style encoding, where a lower number preempts a higher one.
pub fn priorities_ordered(transfer: u8, process: u8) -> bool {
    transfer < process
}
