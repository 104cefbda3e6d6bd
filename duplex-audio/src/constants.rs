use core::num::NonZeroUsize;

/// Block size a freshly constructed framework is configured with.
pub const DEFAULT_BLOCK_SIZE: NonZeroUsize = NonZeroUsize::MIN;

/// Raw samples per stereo frame (left, right).
pub const FRAME_CHANNELS: usize = 2;

/// Magnitude of the most negative raw sample, `-(i32::MIN)`, as `f32`.
///
/// Raw samples are divided by this value on the way in and multiplied by it
/// on the way out, so the signed 32-bit range maps onto `[-1.0, 1.0)`.
pub const RAW_FULL_SCALE: f32 = 2_147_483_648.0;

/// Reciprocal of [`RAW_FULL_SCALE`]. A power of two, so multiplying by it is
/// exact and equivalent to dividing by the full scale.
pub const RAW_TO_FLOAT: f32 = 1.0 / RAW_FULL_SCALE;
