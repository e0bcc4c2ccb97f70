//! Channel handle, receiver trait, and construction configuration.
//!
//! ## Contents
//! - [`Channel`] the externally-visible conduit handle
//! - [`Receive`], [`ReceiveFn`], [`ReceiveRef`] receiver contract and adapter
//! - [`ChannelConfig`] construction settings
//!
//! See `channel.rs` for the handle-level wiring diagram.

mod channel;
mod config;
mod constant;
mod receive;

pub use channel::Channel;
pub use config::ChannelConfig;
pub use receive::{Receive, ReceiveFn, ReceiveRef};

pub(crate) use channel::{Body, Delivery};
pub(crate) use constant::ConstantCell;
