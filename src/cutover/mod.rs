//! Backlog-to-live cutover protocol.
//!
//! ## Contents
//! - [`CutoverGate`] per-cutover latch + monitor + parked-batch phase
//! - [`Latch`] one-shot monotonic activation flag
//! - [`cut_over`] the full establish → snapshot → replay calling pattern
//!
//! See `gate.rs` for the protocol-level ordering rules.

mod gate;
mod latch;

pub(crate) use gate::{cut_over, CutoverGate};
pub(crate) use latch::Latch;
