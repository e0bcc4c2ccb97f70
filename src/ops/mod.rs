//! Composition operations built on the cutover protocol.
//!
//! ## Contents
//! - [`receive_all`] permanent listeners across the full message history
//! - [`siphon`] forwarding wires into downstream channels under transforms
//! - [`fork_n`] backlog-snapshot duplication into independent copies
//! - [`map`] / [`filter`] derived single-transform channels
//!
//! All of these are built purely on the gate (`cutover/gate.rs`) and the
//! distributor; none of them touches the backlog outside the protocol.

mod derive;
mod fork;
mod receive_all;
mod siphon;

pub(crate) use derive::{filter, map};
pub(crate) use fork::fork_n;
pub(crate) use receive_all::receive_all;
pub(crate) use siphon::siphon;
