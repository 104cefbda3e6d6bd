//! Scripted hardware and helpers shared by the unit and integration tests.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::alloc::{GlobalAlloc, Layout};
use core::cell::Cell;
use core::num::NonZeroUsize;

use std::alloc::System;
use std::sync::{Mutex, MutexGuard};

use crate::buffer::BufferSet;
use crate::callback::Hook;
use crate::framework::Framework;
use crate::hal::AudioHal;

/// Interrupt identifiers of the mock interrupt controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MockIrq {
    Transfer,
    Process,
}

/// Ordered record of everything observable that happened in a test.
#[derive(Clone, Default)]
pub(crate) struct Trace(Arc<Mutex<Vec<&'static str>>>);

impl Trace {
    pub fn push(&self, event: &'static str) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Hook that appends `event` when fired.
    pub fn hook(&self, event: &'static str) -> Hook {
        let trace = self.clone();
        Box::new(move || trace.push(event))
    }

    /// Position of the first occurrence of `event`.
    pub fn first(&self, event: &'static str) -> Option<usize> {
        self.events().iter().position(|&e| e == event)
    }

    /// Position of the last occurrence of `event`.
    pub fn last(&self, event: &'static str) -> Option<usize> {
        self.events().iter().rposition(|&e| e == event)
    }
}

/// Software stand-in for the serial audio peripheral and interrupt
/// controller. Received samples come from `input` (silence once it runs
/// dry); transmitted samples are collected in `output`.
pub(crate) struct MockHal<const SAMPLES: usize = 2> {
    pub input: VecDeque<i32>,
    pub output: Vec<i32>,
    pub pended: Vec<MockIrq>,
    pub enabled: Vec<MockIrq>,
    pub priorities: Vec<(MockIrq, u8)>,
    pub trace: Option<Trace>,
    pub setup_calls: usize,
    pub transferring: bool,
}

impl MockHal {
    pub fn new() -> Self {
        Self::scripted(&[])
    }

    pub fn with_input(input: &[i32]) -> Self {
        Self::scripted(input)
    }
}

impl<const SAMPLES: usize> MockHal<SAMPLES> {
    pub fn scripted(input: &[i32]) -> Self {
        MockHal {
            input: input.iter().copied().collect(),
            output: Vec::new(),
            pended: Vec::new(),
            enabled: Vec::new(),
            priorities: Vec::new(),
            trace: None,
            setup_calls: 0,
            transferring: false,
        }
    }

    pub fn traced(mut self, trace: &Trace) -> Self {
        self.trace = Some(trace.clone());
        self
    }

    pub fn feed(&mut self, samples: &[i32]) {
        self.input.extend(samples.iter().copied());
    }

    pub fn pend_count(&self, irq: MockIrq) -> usize {
        self.pended.iter().filter(|&&p| p == irq).count()
    }

    /// Most recent priority programmed for `irq`.
    pub fn priority_of(&self, irq: MockIrq) -> Option<u8> {
        self.priorities
            .iter()
            .rev()
            .find(|(i, _)| *i == irq)
            .map(|&(_, p)| p)
    }

    fn record(&self, event: &'static str) {
        if let Some(trace) = &self.trace {
            trace.push(event);
        }
    }
}

impl<const SAMPLES: usize> AudioHal for MockHal<SAMPLES> {
    type Interrupt = MockIrq;

    const SAMPLES_PER_INTERRUPT: usize = SAMPLES;

    fn setup(&mut self) {
        self.setup_calls += 1;
        self.record("setup");
    }

    fn wait_frame_sync(&mut self) {
        self.record("frame_sync");
    }

    fn start_transfer(&mut self) {
        self.transferring = true;
        self.record("start_transfer");
    }

    fn transfer_interrupt(&self) -> MockIrq {
        MockIrq::Transfer
    }

    fn process_interrupt(&self) -> MockIrq {
        MockIrq::Process
    }

    fn transfer_priority(&self) -> u8 {
        2
    }

    fn process_priority(&self) -> u8 {
        6
    }

    fn set_priority(&mut self, interrupt: MockIrq, priority: u8) {
        self.priorities.push((interrupt, priority));
    }

    fn enable_interrupt(&mut self, interrupt: MockIrq) {
        self.enabled.push(interrupt);
    }

    fn pend_interrupt(&mut self, interrupt: MockIrq) {
        self.pended.push(interrupt);
        self.record("pend");
    }

    fn read_sample(&mut self) -> i32 {
        self.record("read");
        self.input.pop_front().unwrap_or(0)
    }

    fn write_sample(&mut self, sample: i32) {
        self.record("write");
        self.output.push(sample);
    }
}

/// Host-side driving of a framework whose vector handlers are never wired,
/// which makes the `unsafe` accessors sound to call from a test.
pub(crate) trait Bench<H> {
    fn hal(&mut self) -> &mut H;
    fn sample_data(&mut self) -> Option<&mut BufferSet>;
    /// `(buffer_index, sample_index)` of the transfer stage.
    fn position(&mut self) -> (usize, usize);
    fn step_transfer(&mut self);
    fn step_process(&mut self);
}

impl<H: AudioHal> Bench<H> for Framework<H> {
    fn hal(&mut self) -> &mut H {
        // SAFETY: tests never route interrupts to a framework.
        unsafe { self.hal_mut() }
    }

    fn sample_data(&mut self) -> Option<&mut BufferSet> {
        // SAFETY: as above.
        unsafe { self.buffers_mut() }
    }

    fn position(&mut self) -> (usize, usize) {
        // SAFETY: as above.
        unsafe { (self.buffer_index(), self.sample_index()) }
    }

    fn step_transfer(&mut self) {
        // SAFETY: as above.
        unsafe { self.transfer_interrupt() }
    }

    fn step_process(&mut self) {
        // SAFETY: as above.
        unsafe { self.process_interrupt() }
    }
}

pub(crate) fn n(frames: usize) -> NonZeroUsize {
    NonZeroUsize::new(frames).unwrap()
}

/// Serializes tests that construct a `Framework`: construction registers a
/// process-wide active instance.
pub(crate) fn serial() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

std::thread_local! {
    static TRACKING: Cell<bool> = const { Cell::new(false) };
    static FAIL_AT: Cell<usize> = const { Cell::new(0) };
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
    static LIVE_BYTES: Cell<isize> = const { Cell::new(0) };
}

/// System allocator that, on threads that opted in through [`AllocTracker`],
/// counts allocations and live bytes and can refuse the k-th allocation.
/// Other threads (and therefore other tests) are unaffected.
struct CountingAlloc;

fn tracking() -> bool {
    TRACKING.try_with(Cell::get).unwrap_or(false)
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if tracking() {
            let count = ALLOCATIONS.with(|c| {
                c.set(c.get() + 1);
                c.get()
            });
            if FAIL_AT.with(Cell::get) == count {
                return core::ptr::null_mut();
            }
        }
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() && tracking() {
            LIVE_BYTES.with(|b| b.set(b.get() + layout.size() as isize));
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if tracking() {
            LIVE_BYTES.with(|b| b.set(b.get() - layout.size() as isize));
        }
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

/// Allocation accounting for the current thread while alive.
///
/// Only memory allocated after [`AllocTracker::start`] should be released
/// while it is active, otherwise [`live_bytes`](Self::live_bytes) goes
/// negative.
pub(crate) struct AllocTracker;

impl AllocTracker {
    /// Start counting. `fail_at` refuses the allocation with that 1-based
    /// number; 0 never fails.
    pub fn start(fail_at: usize) -> Self {
        FAIL_AT.with(|c| c.set(fail_at));
        ALLOCATIONS.with(|c| c.set(0));
        LIVE_BYTES.with(|c| c.set(0));
        TRACKING.with(|c| c.set(true));
        AllocTracker
    }

    pub fn allocations(&self) -> usize {
        ALLOCATIONS.with(Cell::get)
    }

    pub fn live_bytes(&self) -> isize {
        LIVE_BYTES.with(Cell::get)
    }
}

impl Drop for AllocTracker {
    fn drop(&mut self) {
        TRACKING.with(|c| c.set(false));
        FAIL_AT.with(|c| c.set(0));
    }
}
