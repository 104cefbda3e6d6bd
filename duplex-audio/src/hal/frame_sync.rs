//! Word-select (frame-sync) edge detection.
//!
//! Receive and transmit must start on the same frame boundary or the two
//! directions end up a sample apart. Before enabling the peripheral pins, a
//! HAL typically reads the word-select line as a plain GPIO and waits for
//! the edge that marks the start of a left channel slot.
//!
//! The helper is generic over any [`embedded_hal::digital::InputPin`].
//!
//! # Example
//!
//! ```ignore
//! fn wait_frame_sync(&mut self) {
//!     let ws = self.ws_pin.take_as_input();
//!     let _ = wait_for_edge(&mut ws, Edge::Rising);
//!     self.ws_pin.restore_alternate(ws);
//! }
//! ```

use embedded_hal::digital::InputPin;

/// Which transition of the word-select line to wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Low to high.
    Rising,
    /// High to low.
    Falling,
}

/// Spin until `pin` shows `edge`.
///
/// The pin is first observed at the level preceding the edge, so a line that
/// is already at the target level is not mistaken for a fresh transition.
/// Returns the pin's error if a read fails.
pub fn wait_for_edge<P: InputPin>(pin: &mut P, edge: Edge) -> Result<(), P::Error> {
    match edge {
        Edge::Rising => {
            while pin.is_high()? {}
            while pin.is_low()? {}
        }
        Edge::Falling => {
            while pin.is_low()? {}
            while pin.is_high()? {}
        }
    }
    Ok(())
}
