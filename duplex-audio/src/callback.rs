//! Callback registry: instrumentation hooks and the processing callback.
//!
//! Every slot is optional. An empty slot costs one presence check at its
//! call site and nothing else.

use alloc::boxed::Box;

/// Fire-and-forget instrumentation hook, e.g. toggling a test pin to
/// measure interrupt timing. Runs in interrupt context.
pub type Hook = Box<dyn FnMut() + Send>;

/// Signal processing callback.
///
/// Arguments are `(rx_left, rx_right, tx_left, tx_right, block_size)`. The
/// receive slices hold the latest block normalized to `[-1.0, 1.0)`; the
/// callback must fill both transmit slices before returning. All four
/// slices are `block_size` long and are only borrowed for the call.
pub type ProcessCallback = Box<dyn FnMut(&[f32], &[f32], &mut [f32], &mut [f32], usize) + Send>;

/// Box a closure as a [`Hook`].
pub fn hook<F>(f: F) -> Hook
where
    F: FnMut() + Send + 'static,
{
    Box::new(f)
}

/// Box a closure as a [`ProcessCallback`].
pub fn process_callback<F>(f: F) -> ProcessCallback
where
    F: FnMut(&[f32], &[f32], &mut [f32], &mut [f32], usize) + Send + 'static,
{
    Box::new(f)
}

/// A pre/post hook pair bracketing one stage.
#[derive(Default)]
pub struct HookPair {
    pre: Option<Hook>,
    post: Option<Hook>,
}

impl HookPair {
    pub const fn new() -> Self {
        HookPair {
            pre: None,
            post: None,
        }
    }

    pub fn set_pre(&mut self, hook: Hook) {
        self.pre = Some(hook);
    }

    pub fn set_post(&mut self, hook: Hook) {
        self.post = Some(hook);
    }

    pub fn clear(&mut self) {
        self.pre = None;
        self.post = None;
    }

    pub fn has_pre(&self) -> bool {
        self.pre.is_some()
    }

    pub fn has_post(&self) -> bool {
        self.post.is_some()
    }

    #[inline]
    pub fn fire_pre(&mut self) {
        if let Some(hook) = self.pre.as_mut() {
            hook();
        }
    }

    #[inline]
    pub fn fire_post(&mut self) {
        if let Some(hook) = self.post.as_mut() {
            hook();
        }
    }
}
