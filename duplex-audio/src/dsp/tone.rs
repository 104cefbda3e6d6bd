//! Sine test-tone generator.

use core::f32::consts::TAU;

use libm::{floorf, sinf};

/// Sine oscillator with a phase accumulator in cycles (`0.0..1.0`).
///
/// # Example
/// ```ignore
/// let mut tone = SineTone::new(440.0, 48_000.0);
/// tone.set_amplitude(0.25);
/// framework.start(None::<fn(usize)>, move |_, _, tx_l, tx_r, _| {
///     tone.fill(tx_l);
///     tx_r.copy_from_slice(tx_l);
/// });
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineTone {
    /// Current phase in cycles.
    phase: f32,
    /// Phase advance per sample in cycles.
    increment: f32,
    amplitude: f32,
    sample_rate: f32,
}

impl SineTone {
    /// Full-scale tone of `frequency` Hz at `sample_rate` Hz.
    pub fn new(frequency: f32, sample_rate: f32) -> Self {
        let mut tone = SineTone {
            phase: 0.0,
            increment: 0.0,
            amplitude: 1.0,
            sample_rate,
        };
        tone.set_frequency(frequency);
        tone
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.increment = if self.sample_rate > 0.0 {
            frequency / self.sample_rate
        } else {
            0.0
        };
    }

    /// Peak level, clamped to `0.0..=1.0`.
    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude.clamp(0.0, 1.0);
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Restart at phase zero.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Next sample.
    pub fn next_sample(&mut self) -> f32 {
        let sample = self.amplitude * sinf(TAU * self.phase);
        self.phase += self.increment;
        self.phase -= floorf(self.phase);
        sample
    }

    /// Overwrite `block` with the next `block.len()` samples.
    pub fn fill(&mut self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            *sample = self.next_sample();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        libm::fabsf(a - b) < 1e-5
    }

    #[test]
    fn quarter_rate_tone_hits_cardinal_points() {
        let mut tone = SineTone::new(12_000.0, 48_000.0);
        let mut block = [0.0; 5];
        tone.fill(&mut block);
        let expected = [0.0, 1.0, 0.0, -1.0, 0.0];
        for (got, want) in block.iter().zip(expected.iter()) {
            assert!(close(*got, *want), "{block:?}");
        }
    }

    #[test]
    fn amplitude_scales_and_clamps() {
        let mut tone = SineTone::new(12_000.0, 48_000.0);
        tone.set_amplitude(0.5);
        tone.next_sample();
        assert!(close(tone.next_sample(), 0.5));

        tone.set_amplitude(3.0);
        assert_eq!(tone.amplitude(), 1.0);
        tone.set_amplitude(-1.0);
        assert_eq!(tone.amplitude(), 0.0);
    }

    #[test]
    fn continues_across_blocks() {
        let mut split = SineTone::new(1_000.0, 48_000.0);
        let mut whole = split;
        let mut a = [0.0; 7];
        let mut b = [0.0; 9];
        split.fill(&mut a);
        split.fill(&mut b);
        let mut all = [0.0; 16];
        whole.fill(&mut all);
        assert_eq!(&all[..7], &a);
        assert_eq!(&all[7..], &b);
    }

    #[test]
    fn reset_restarts_phase() {
        let mut tone = SineTone::new(12_000.0, 48_000.0);
        tone.next_sample();
        tone.reset();
        assert!(close(tone.next_sample(), 0.0));
    }

    #[test]
    fn zero_sample_rate_is_silent_dc() {
        let mut tone = SineTone::new(440.0, 0.0);
        let mut block = [1.0; 4];
        tone.fill(&mut block);
        assert_eq!(block, [0.0; 4]);
    }
}
