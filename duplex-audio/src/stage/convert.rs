//! Sample format conversion between the raw interleaved slots and the
//! callback's float channels.
//!
//! ## Formats
//!
//! - Raw: `i32`, interleaved `[L0, R0, L1, R1, ...]`, full signed range.
//! - Float: `f32`, one slice per channel, `raw / 2^31`, so `i32::MIN` maps to
//!   exactly `-1.0`. `i32::MAX` rounds up to `1.0` in `f32`.
//!
//! Float to raw scales by `2^31` and truncates toward zero. Values at or
//! beyond `±1.0` saturate to the ends of the `i32` range instead of
//! wrapping.
//!
//! `f32` carries 24 significant bits, so a raw → float → raw round trip is
//! exact for magnitudes below `2^24` and otherwise within `2^7` of the
//! original.

use crate::constants::{RAW_FULL_SCALE, RAW_TO_FLOAT};

/// Convert one raw sample to the normalized float domain.
#[inline(always)]
pub fn raw_to_float(sample: i32) -> f32 {
    sample as f32 * RAW_TO_FLOAT
}

/// Convert one normalized float sample to raw, saturating at the range ends.
#[inline(always)]
pub fn float_to_raw(sample: f32) -> i32 {
    // `as` saturates out-of-range values and maps NaN to 0
    (sample * RAW_FULL_SCALE) as i32
}

/// De-interleave raw frames from `src` into normalized `left`/`right`.
///
/// # Panics
///
/// Debug-asserts that `src` holds exactly one frame per channel sample.
pub fn deinterleave_to_float(src: &[i32], left: &mut [f32], right: &mut [f32]) {
    debug_assert_eq!(src.len(), left.len() * 2);
    debug_assert_eq!(left.len(), right.len());

    for ((frame, l), r) in src.chunks_exact(2).zip(left.iter_mut()).zip(right.iter_mut()) {
        *l = raw_to_float(frame[0]);
        *r = raw_to_float(frame[1]);
    }
}

/// Interleave normalized `left`/`right` into raw frames in `dest`.
///
/// # Panics
///
/// Debug-asserts that `dest` holds exactly one frame per channel sample.
pub fn interleave_from_float(dest: &mut [i32], left: &[f32], right: &[f32]) {
    debug_assert_eq!(dest.len(), left.len() * 2);
    debug_assert_eq!(left.len(), right.len());

    for ((frame, &l), &r) in dest.chunks_exact_mut(2).zip(left.iter()).zip(right.iter()) {
        frame[0] = float_to_raw(l);
        frame[1] = float_to_raw(r);
    }
}
