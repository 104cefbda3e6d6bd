//! Block-level helpers on normalized `f32` channels.

use libm::fabsf;

/// Copy both receive channels straight to the transmit channels.
///
/// Has the exact shape of a processing callback, so it can be passed to
/// [`Framework::start`](crate::Framework::start) as is.
pub fn passthrough(
    rx_left: &[f32],
    rx_right: &[f32],
    tx_left: &mut [f32],
    tx_right: &mut [f32],
    _block_size: usize,
) {
    tx_left.copy_from_slice(rx_left);
    tx_right.copy_from_slice(rx_right);
}

/// Largest absolute sample value in `block`, 0.0 for an empty block.
pub fn peak(block: &[f32]) -> f32 {
    block.iter().fold(0.0, |acc, &s| acc.max(fabsf(s)))
}

/// Stereo gain stage.
///
/// Output is clamped to `[-1.0, 1.0]`; the conversion back to raw samples
/// saturates anyway, clamping here keeps the float side well defined too.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gain {
    left: f32,
    right: f32,
}

impl Gain {
    /// Same gain on both channels.
    pub const fn new(gain: f32) -> Self {
        Gain {
            left: gain,
            right: gain,
        }
    }

    pub const fn stereo(left: f32, right: f32) -> Self {
        Gain { left, right }
    }

    pub fn set(&mut self, gain: f32) {
        self.left = gain;
        self.right = gain;
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn right(&self) -> f32 {
        self.right
    }

    /// Scale `rx_*` into `tx_*`.
    pub fn apply(&self, rx_left: &[f32], rx_right: &[f32], tx_left: &mut [f32], tx_right: &mut [f32]) {
        scale(rx_left, tx_left, self.left);
        scale(rx_right, tx_right, self.right);
    }
}

fn scale(src: &[f32], dest: &mut [f32], gain: f32) {
    debug_assert_eq!(src.len(), dest.len());
    for (d, &s) in dest.iter_mut().zip(src.iter()) {
        *d = (s * gain).clamp(-1.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_copies_both_channels() {
        let mut tx_left = [0.0; 3];
        let mut tx_right = [0.0; 3];
        passthrough(&[0.1, 0.2, 0.3], &[-0.1, -0.2, -0.3], &mut tx_left, &mut tx_right, 3);
        assert_eq!(tx_left, [0.1, 0.2, 0.3]);
        assert_eq!(tx_right, [-0.1, -0.2, -0.3]);
    }

    #[test]
    fn peak_is_absolute_maximum() {
        assert_eq!(peak(&[0.25, -0.75, 0.5]), 0.75);
        assert_eq!(peak(&[-1.0]), 1.0);
        assert_eq!(peak(&[]), 0.0);
    }

    #[test]
    fn gain_scales_each_channel() {
        let gain = Gain::stereo(0.5, 2.0);
        let mut tx_left = [0.0; 2];
        let mut tx_right = [0.0; 2];
        gain.apply(&[0.5, -1.0], &[0.25, -0.125], &mut tx_left, &mut tx_right);
        assert_eq!(tx_left, [0.25, -0.5]);
        assert_eq!(tx_right, [0.5, -0.25]);
    }

    #[test]
    fn gain_clamps_to_full_scale() {
        let gain = Gain::new(4.0);
        let mut tx_left = [0.0; 2];
        let mut tx_right = [0.0; 2];
        gain.apply(&[0.5, -0.5], &[0.125, 0.0], &mut tx_left, &mut tx_right);
        assert_eq!(tx_left, [1.0, -1.0]);
        assert_eq!(tx_right, [0.5, 0.0]);
    }

    #[test]
    fn set_updates_both_sides() {
        let mut gain = Gain::stereo(0.1, 0.2);
        gain.set(0.75);
        assert_eq!((gain.left(), gain.right()), (0.75, 0.75));
    }
}
