//! The public controller tying buffers, stages and hardware together.
//!
//! ## Lifecycle
//!
//! ```text
//! Framework::new ──► Constructed ──set_block_size──► Configured ──start──► Running
//!        │                 └──────────────────start─────────────────────────▲
//!        └─ buffers for 1 frame, peripheral ready, both interrupts enabled
//! ```
//!
//! ## Interrupt routing
//!
//! The two hardware vectors carry no context, so the framework registers
//! itself as the process-wide *active* instance when constructed. The
//! vector handlers forward to [`on_transfer_interrupt`] and
//! [`on_process_interrupt`], which look the active instance up:
//!
//! ```ignore
//! #[interrupt]
//! fn SAI1() {
//!     unsafe { duplex_audio::on_transfer_interrupt::<BoardHal>() }
//! }
//!
//! #[interrupt]
//! fn SPI6() {
//!     unsafe { duplex_audio::on_process_interrupt::<BoardHal>() }
//! }
//! ```
//!
//! Only one framework may be active at a time. Constructing a second one
//! takes over the routing from the first.
//!
//! ## Caller obligations
//!
//! These are not checked at run time; breaking them corrupts audio or is
//! undefined behavior.
//!
//! - The transfer interrupt is strictly more urgent than the processing
//!   interrupt.
//! - The processing callback returns within one block period.
//! - The boxed framework is not moved out of its `Box` while active.
//!
//! Once [`start`](Framework::start) has run, the interrupts own the
//! buffers, hooks and HAL. The block size, hook and priority setters then
//! refuse to change anything, and so does a second `start`. Direct access
//! to interrupt-owned state goes through `unsafe` accessors such as
//! [`hal_mut`](Framework::hal_mut).

use alloc::boxed::Box;
use core::cell::UnsafeCell;
use core::num::NonZeroUsize;
use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

use log::{debug, info, warn};

use crate::buffer::{BufferSet, Buffers};
use crate::callback::{hook, process_callback};
use crate::constants::DEFAULT_BLOCK_SIZE;
use crate::error::ConfigError;
use crate::hal::{priorities_ordered, AudioHal};
use crate::stage::{ProcessStage, TransferStage};

/// Address of the active framework, type-erased. Null when none is active.
static ACTIVE: AtomicPtr<()> = AtomicPtr::new(ptr::null_mut());

/// Lifecycle state of a [`Framework`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Buffers sized for one frame, peripheral ready but idle.
    Constructed,
    /// Block size set explicitly (successfully or not).
    Configured,
    /// Peripheral transferring, interrupts driving the pipeline.
    Running,
}

/// Double-buffered stereo audio framework.
///
/// Owns the hardware abstraction, the transfer buffers and both interrupt
/// stages. Create it with [`Framework::new`], optionally change the block
/// size, hooks and priorities, then call [`start`](Self::start). From then
/// on all work happens in the two interrupts.
pub struct Framework<H: AudioHal> {
    state: State,
    block_size: NonZeroUsize,
    transfer_priority: u8,
    process_priority: u8,
    buffers: Buffers,
    /// Slot most recently handed to the processing stage.
    process_index: AtomicUsize,
    transfer: UnsafeCell<TransferStage<H>>,
    process: UnsafeCell<ProcessStage>,
}

impl<H: AudioHal> Framework<H> {
    /// Set up the peripheral and register the new framework as the active
    /// instance.
    ///
    /// Allocates buffers for a block size of one frame, runs
    /// [`AudioHal::setup`], programs the HAL's recommended priorities and
    /// enables both interrupts. The peripheral is not started.
    ///
    /// If even the one-frame buffers cannot be allocated the framework is
    /// still returned, paused, and the failure is logged.
    pub fn new(mut hal: H) -> Box<Self> {
        let mut buffers = Buffers::empty();
        if let Err(err) = buffers.configure(DEFAULT_BLOCK_SIZE) {
            warn!("{err}, audio pipeline paused");
        }

        hal.setup();

        let transfer_priority = hal.transfer_priority();
        let process_priority = hal.process_priority();
        let transfer_irq = hal.transfer_interrupt();
        let process_irq = hal.process_interrupt();
        hal.set_priority(transfer_irq, transfer_priority);
        hal.enable_interrupt(transfer_irq);
        hal.set_priority(process_irq, process_priority);
        hal.enable_interrupt(process_irq);

        let framework = Box::new(Framework {
            state: State::Constructed,
            block_size: DEFAULT_BLOCK_SIZE,
            transfer_priority,
            process_priority,
            buffers,
            process_index: AtomicUsize::new(0),
            transfer: UnsafeCell::new(TransferStage::new(hal)),
            process: UnsafeCell::new(ProcessStage::new()),
        });
        framework.register();

        info!(
            "audio framework ready: block size {}, priorities {}/{}",
            DEFAULT_BLOCK_SIZE, transfer_priority, process_priority
        );
        framework
    }

    fn as_erased(&self) -> *mut () {
        self as *const Self as *mut ()
    }

    fn register(&self) {
        let previous = ACTIVE.swap(self.as_erased(), Ordering::AcqRel);
        if !previous.is_null() {
            warn!("another audio framework was active; interrupts now route to the new one");
        }
    }

    /// Whether interrupts are currently routed to this instance.
    pub fn is_active(&self) -> bool {
        ACTIVE.load(Ordering::Acquire) == self.as_erased()
    }

    /// Reallocate all buffers for `block_size` frames per callback.
    ///
    /// The old buffers are released first. On failure no buffers remain and
    /// the pipeline stays paused (hooks still run, no data moves) until a
    /// later call succeeds, e.g. with a smaller block size. Either way the
    /// transfer position rewinds to the start of slot 0.
    ///
    /// Refused with [`ConfigError::Running`] once the pipeline runs; the
    /// interrupts may be using the current buffers.
    pub fn set_block_size(&mut self, block_size: NonZeroUsize) -> Result<(), ConfigError> {
        if self.refuse_while_running("block size") {
            return Err(ConfigError::Running);
        }

        let result = self.buffers.configure(block_size);
        self.transfer.get_mut().reset();
        *self.process_index.get_mut() = 0;
        if self.state == State::Constructed {
            self.state = State::Configured;
        }

        match result {
            Ok(()) => {
                self.block_size = block_size;
                info!("audio block size set to {block_size}");
            }
            Err(err) => warn!("{err}, audio pipeline paused"),
        }
        result.map_err(ConfigError::from)
    }

    /// Log and report an attempt to reconfigure a running pipeline.
    fn refuse_while_running(&self, what: &str) -> bool {
        let running = self.state == State::Running;
        if running {
            warn!("audio pipeline is running, {what} left unchanged");
        }
        running
    }

    /// Hook run at the start of every transfer interrupt.
    ///
    /// Hooks can only be changed before [`start`](Self::start).
    pub fn set_pre_transfer_hook<F>(&mut self, f: F)
    where
        F: FnMut() + Send + 'static,
    {
        if !self.refuse_while_running("hooks") {
            self.transfer.get_mut().hooks_mut().set_pre(hook(f));
        }
    }

    /// Hook run at the end of every transfer interrupt, after the swap
    /// decision.
    pub fn set_post_transfer_hook<F>(&mut self, f: F)
    where
        F: FnMut() + Send + 'static,
    {
        if !self.refuse_while_running("hooks") {
            self.transfer.get_mut().hooks_mut().set_post(hook(f));
        }
    }

    /// Hook run at the start of every processing interrupt, before any
    /// conversion.
    pub fn set_pre_process_hook<F>(&mut self, f: F)
    where
        F: FnMut() + Send + 'static,
    {
        if !self.refuse_while_running("hooks") {
            self.process.get_mut().hooks_mut().set_pre(hook(f));
        }
    }

    /// Hook run at the end of every processing interrupt, after the output
    /// conversion.
    pub fn set_post_process_hook<F>(&mut self, f: F)
    where
        F: FnMut() + Send + 'static,
    {
        if !self.refuse_while_running("hooks") {
            self.process.get_mut().hooks_mut().set_post(hook(f));
        }
    }

    /// Remove all four hooks.
    pub fn clear_hooks(&mut self) {
        if self.refuse_while_running("hooks") {
            return;
        }
        self.transfer.get_mut().hooks_mut().clear();
        self.process.get_mut().hooks_mut().clear();
    }

    /// Start the audio transfer.
    ///
    /// Calls `init` once with the current block size, installs `process` as
    /// the processing callback, waits for the frame-sync edge and enables
    /// the peripheral. `process` then runs in the processing interrupt once
    /// per block with `(rx_left, rx_right, tx_left, tx_right, block_size)`.
    ///
    /// Pass `None::<fn(usize)>` to skip `init`. Only the first call has an
    /// effect; later calls are refused and neither run `init` nor replace
    /// the callback.
    pub fn start<I, P>(&mut self, init: Option<I>, process: P)
    where
        I: FnOnce(usize),
        P: FnMut(&[f32], &[f32], &mut [f32], &mut [f32], usize) + Send + 'static,
    {
        if self.state == State::Running {
            warn!("audio framework already running, start ignored");
            return;
        }
        if !priorities_ordered(self.transfer_priority, self.process_priority) {
            warn!(
                "transfer priority {} does not preempt processing priority {}",
                self.transfer_priority, self.process_priority
            );
        }

        if let Some(init) = init {
            init(self.block_size.get());
        }

        self.process.get_mut().set_callback(process_callback(process));

        let hal = self.transfer.get_mut().hal_mut();
        hal.wait_frame_sync();
        hal.start_transfer();
        self.state = State::Running;

        info!("audio framework running, block size {}", self.block_size);
    }

    /// Set the priority of the transfer (peripheral data) interrupt.
    ///
    /// Must be more urgent than the processing interrupt. Ignored after
    /// [`start`](Self::start).
    pub fn set_i2s_irq_priority(&mut self, priority: u8) {
        if self.refuse_while_running("transfer priority") {
            return;
        }
        let hal = self.transfer.get_mut().hal_mut();
        let irq = hal.transfer_interrupt();
        hal.set_priority(irq, priority);
        self.transfer_priority = priority;
        debug!("transfer interrupt priority set to {priority}");
    }

    /// Set the priority of the processing (software) interrupt.
    ///
    /// Must be less urgent than the transfer interrupt. Ignored after
    /// [`start`](Self::start).
    pub fn set_process_irq_priority(&mut self, priority: u8) {
        if self.refuse_while_running("processing priority") {
            return;
        }
        let hal = self.transfer.get_mut().hal_mut();
        let irq = hal.process_interrupt();
        hal.set_priority(irq, priority);
        self.process_priority = priority;
        debug!("processing interrupt priority set to {priority}");
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Frames per processing block. After a failed reconfiguration this is
    /// still the last size that was allocated successfully.
    pub fn block_size(&self) -> usize {
        self.block_size.get()
    }

    /// Priority last programmed for the transfer interrupt.
    pub fn transfer_priority(&self) -> u8 {
        self.transfer_priority
    }

    /// Priority last programmed for the processing interrupt.
    pub fn process_priority(&self) -> u8 {
        self.process_priority
    }

    /// `true` while no buffers are allocated.
    pub fn is_paused(&self) -> bool {
        !self.buffers.is_allocated()
    }

    /// Slot most recently handed to the processing stage.
    pub fn process_index(&self) -> usize {
        self.process_index.load(Ordering::Acquire)
    }

    /// Slot currently being filled by the transfer stage.
    ///
    /// # Safety
    ///
    /// See [`hal_mut`](Self::hal_mut).
    pub unsafe fn buffer_index(&mut self) -> usize {
        self.transfer.get_mut().buffer_index()
    }

    /// Raw position within the active slot.
    ///
    /// # Safety
    ///
    /// See [`hal_mut`](Self::hal_mut).
    pub unsafe fn sample_index(&mut self) -> usize {
        self.transfer.get_mut().sample_index()
    }

    /// Installed buffer set, `None` while paused. Shared access only
    /// exposes the geometry; sample data needs [`buffers_mut`](Self::buffers_mut).
    pub fn buffers(&self) -> Option<&BufferSet> {
        self.buffers.get()
    }

    /// Exclusive access to the sample data.
    ///
    /// # Safety
    ///
    /// See [`hal_mut`](Self::hal_mut).
    pub unsafe fn buffers_mut(&mut self) -> Option<&mut BufferSet> {
        self.buffers.get_mut()
    }

    /// Exclusive access to the hardware abstraction.
    ///
    /// # Safety
    ///
    /// Neither interrupt may service this framework while the returned
    /// borrow (or the call) is alive. This holds before
    /// [`start`](Self::start), with both interrupts masked, and when the
    /// vector handlers are not wired to this framework at all, as in
    /// host-side simulation.
    pub unsafe fn hal_mut(&mut self) -> &mut H {
        self.transfer.get_mut().hal_mut()
    }

    /// Run the transfer stage once.
    ///
    /// # Safety
    ///
    /// Must only be called from the transfer interrupt: never re-entered,
    /// and never preempted by [`service_process`](Self::service_process).
    /// No `&mut` access to the framework may be alive.
    pub unsafe fn service_transfer(&self) {
        // SAFETY: the transfer stage state is only touched from here.
        let stage = unsafe { &mut *self.transfer.get() };
        unsafe { stage.run(self.buffers.get(), &self.process_index) };
    }

    /// Run the processing stage once.
    ///
    /// # Safety
    ///
    /// Must only be called from the processing interrupt, which must have a
    /// strictly lower priority than the transfer interrupt and finish
    /// within one block period. No `&mut` access to the framework may be
    /// alive.
    pub unsafe fn service_process(&self) {
        // SAFETY: the processing stage state is only touched from here.
        let stage = unsafe { &mut *self.process.get() };
        let index = self.process_index.load(Ordering::Acquire);
        unsafe { stage.run(self.buffers.get(), index) };
    }

    /// Run the transfer stage once from thread context, e.g. for polled
    /// bring-up or host-side simulation.
    ///
    /// # Safety
    ///
    /// See [`hal_mut`](Self::hal_mut).
    pub unsafe fn transfer_interrupt(&mut self) {
        // SAFETY: no interrupt runs a stage concurrently (caller contract).
        unsafe { self.service_transfer() }
    }

    /// Run the processing stage once from thread context.
    ///
    /// # Safety
    ///
    /// See [`hal_mut`](Self::hal_mut).
    pub unsafe fn process_interrupt(&mut self) {
        // SAFETY: as in `transfer_interrupt`.
        unsafe { self.service_process() }
    }
}

impl<H: AudioHal> Drop for Framework<H> {
    fn drop(&mut self) {
        // Only unregister if nobody took over in the meantime.
        let _ = ACTIVE.compare_exchange(
            self.as_erased(),
            ptr::null_mut(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

/// Entry point for the transfer interrupt vector.
///
/// Does nothing when no framework is active.
///
/// # Safety
///
/// - `H` must be the HAL type of the active framework.
/// - Must be called only from the transfer interrupt handler, whose
///   priority is strictly higher than the processing interrupt's.
pub unsafe fn on_transfer_interrupt<H: AudioHal>() {
    let active = ACTIVE.load(Ordering::Acquire) as *const Framework<H>;
    // SAFETY: non-null means a live, boxed framework of type `H` (caller
    // guarantees the type); it unregisters itself before being freed.
    if let Some(framework) = unsafe { active.as_ref() } {
        unsafe { framework.service_transfer() }
    }
}

/// Entry point for the processing (software) interrupt vector.
///
/// Does nothing when no framework is active.
///
/// # Safety
///
/// - `H` must be the HAL type of the active framework.
/// - Must be called only from the processing interrupt handler, whose
///   priority is strictly lower than the transfer interrupt's.
pub unsafe fn on_process_interrupt<H: AudioHal>() {
    let active = ACTIVE.load(Ordering::Acquire) as *const Framework<H>;
    // SAFETY: as in `on_transfer_interrupt`.
    if let Some(framework) = unsafe { active.as_ref() } {
        unsafe { framework.service_process() }
    }
}
