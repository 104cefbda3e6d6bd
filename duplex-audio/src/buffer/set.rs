use alloc::collections::TryReserveError;
use alloc::vec::Vec;
use core::cell::UnsafeCell;
use core::num::NonZeroUsize;

use crate::constants::FRAME_CHANNELS;
use crate::error::AllocationError;

/// One ping-pong slot: interleaved (LRLR...) raw lanes, `2 * block_size`
/// samples each.
pub struct RawSlot {
    /// Samples received from the peripheral.
    rx: Vec<i32>,
    /// Samples to transmit to the peripheral.
    tx: Vec<i32>,
}

impl RawSlot {
    pub fn rx(&self) -> &[i32] {
        &self.rx
    }

    pub fn tx(&self) -> &[i32] {
        &self.tx
    }

    pub fn rx_mut(&mut self) -> &mut [i32] {
        &mut self.rx
    }

    pub fn tx_mut(&mut self) -> &mut [i32] {
        &mut self.tx
    }
}

/// The de-interleaved float buffers handed to the processing callback,
/// `block_size` samples each.
pub struct ChannelBuffers {
    pub(crate) rx_left: Vec<f32>,
    pub(crate) rx_right: Vec<f32>,
    pub(crate) tx_left: Vec<f32>,
    pub(crate) tx_right: Vec<f32>,
}

impl ChannelBuffers {
    pub fn rx_left(&self) -> &[f32] {
        &self.rx_left
    }

    pub fn rx_right(&self) -> &[f32] {
        &self.rx_right
    }

    pub fn tx_left(&self) -> &[f32] {
        &self.tx_left
    }

    pub fn tx_right(&self) -> &[f32] {
        &self.tx_right
    }

    pub fn tx_left_mut(&mut self) -> &mut [f32] {
        &mut self.tx_left
    }

    pub fn tx_right_mut(&mut self) -> &mut [f32] {
        &mut self.tx_right
    }
}

/// Complete working set for one block size: two raw ping-pong slots and the
/// four float channel buffers.
///
/// A `BufferSet` either exists with every buffer allocated and zeroed, or
/// not at all. Dropping it releases everything.
///
/// Each slot and the channel buffers sit in their own `UnsafeCell` so the
/// transfer and processing interrupts can each hold the part they own
/// while the other runs. See [`slot`](Self::slot) and
/// [`channels`](Self::channels) for the ownership rules.
pub struct BufferSet {
    block_size: NonZeroUsize,
    slots: [UnsafeCell<RawSlot>; 2],
    channels: UnsafeCell<ChannelBuffers>,
}

/// Allocate `len` zeroed elements, reporting failure instead of aborting.
fn zeroed<T: Copy + Default>(len: usize) -> Result<Vec<T>, TryReserveError> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len)?;
    buffer.resize(len, T::default());
    Ok(buffer)
}

impl BufferSet {
    /// Allocate all buffers for `block_size` frames.
    ///
    /// Either every buffer is allocated or none is: on failure the buffers
    /// already obtained in this attempt are dropped before returning.
    pub fn allocate(block_size: NonZeroUsize) -> Result<Self, AllocationError> {
        let frames = block_size.get();
        let error = |_: TryReserveError| AllocationError::new(frames);

        let interleaved = frames
            .checked_mul(FRAME_CHANNELS)
            .ok_or(AllocationError::new(frames))?;

        let slot = || -> Result<RawSlot, AllocationError> {
            Ok(RawSlot {
                rx: zeroed(interleaved).map_err(error)?,
                tx: zeroed(interleaved).map_err(error)?,
            })
        };
        let slots = [UnsafeCell::new(slot()?), UnsafeCell::new(slot()?)];

        let channels = ChannelBuffers {
            rx_left: zeroed(frames).map_err(error)?,
            rx_right: zeroed(frames).map_err(error)?,
            tx_left: zeroed(frames).map_err(error)?,
            tx_right: zeroed(frames).map_err(error)?,
        };

        Ok(BufferSet {
            block_size,
            slots,
            channels: UnsafeCell::new(channels),
        })
    }

    /// Frames per block.
    pub fn block_size(&self) -> usize {
        self.block_size.get()
    }

    /// Raw samples per slot, `2 * block_size`.
    pub fn slot_len(&self) -> usize {
        self.block_size.get() * FRAME_CHANNELS
    }

    /// Exclusive access to ping-pong slot `index` (0 or 1).
    pub fn slot_mut(&mut self, index: usize) -> &mut RawSlot {
        self.slots[index].get_mut()
    }

    /// Exclusive access to the float channel buffers.
    pub fn channels_mut(&mut self) -> &mut ChannelBuffers {
        self.channels.get_mut()
    }

    /// Mutable access to slot `index` through a shared reference.
    ///
    /// # Safety
    ///
    /// The caller must be the only context using this slot for the lifetime
    /// of the returned reference. In the pipeline the transfer interrupt owns
    /// the active slot and the processing interrupt owns the slot at the
    /// process index; the swap protocol keeps them distinct.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn slot(&self, index: usize) -> &mut RawSlot {
        unsafe { &mut *self.slots[index].get() }
    }

    /// Mutable access to the channel buffers through a shared reference.
    ///
    /// # Safety
    ///
    /// Only the processing stage may use the channel buffers, and it must
    /// not be re-entered while the reference is alive.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn channels(&self) -> &mut ChannelBuffers {
        unsafe { &mut *self.channels.get() }
    }
}
