//! The two interrupt stages of the pipeline and the sample conversion
//! between them.
//!
//! | Stage | Priority | Trigger | Work |
//! |-------|----------|---------|------|
//! | [`TransferStage`] | higher | peripheral data interrupt | one frame in, one frame out |
//! | [`ProcessStage`] | lower | pended by the transfer stage | convert, call back, convert |
//!
//! ## Ownership
//!
//! No locks. At any instant the transfer stage owns the active ping-pong
//! slot and the processing stage owns the slot at the process index plus
//! the float channel buffers. Ownership of a slot moves only at the swap in
//! [`TransferStage::run`], which the lower-priority processing interrupt
//! cannot observe half-done.

pub mod convert;
mod process;
mod transfer;

pub use process::ProcessStage;
pub use transfer::TransferStage;
