//! # Core receiver trait
//!
//! `Receive` is the extension point for consuming a channel's full stream via
//! [`receive_all`](crate::Channel::receive_all). Each receiver gets every
//! batch the channel ever carries — the replayed backlog first, then live
//! batches — in publish order.
//!
//! ## Contract
//! - `on_batch` is invoked under the cutover ordering barrier: for one
//!   registration, calls never overlap and arrive in stream order.
//! - Implementations should avoid long blocking work; a slow receiver delays
//!   later receivers of the same batch and the producer behind them.
//!
//! ## Example (skeleton)
//! ```rust
//! use sluice::Receive;
//! use async_trait::async_trait;
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Receive<String> for Audit {
//!     async fn on_batch(&self, batch: &[String]) {
//!         // write audit records...
//!         let _ = batch;
//!     }
//!     fn name(&self) -> &'static str { "audit" }
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

/// Contract for channel receivers.
///
/// Called from the delivering task. Implementations should prefer async I/O
/// and cooperative waits over blocking the runtime.
#[async_trait]
pub trait Receive<T>: Send + Sync + 'static {
    /// Handles one delivered batch (one or more messages, in order).
    async fn on_batch(&self, batch: &[T]);

    /// Human-readable name (for logs/debugging).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a receiver.
pub type ReceiveRef<T> = Arc<dyn Receive<T>>;

/// Function-backed receiver implementation.
///
/// Wraps a closure that produces a fresh future per batch. The closure takes
/// the batch by value (an owned `Vec`), so no shared mutable state is needed
/// across deliveries; if shared state is wanted, capture an `Arc<...>`
/// explicitly.
pub struct ReceiveFn<F> {
    name: &'static str,
    f: F,
}

impl<F> ReceiveFn<F> {
    /// Creates a new function-backed receiver.
    ///
    /// Prefer [`ReceiveFn::arc`] when you immediately need a [`ReceiveRef`].
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }

    /// Creates the receiver and returns it as a shared handle.
    ///
    /// ## Example
    /// ```rust
    /// use sluice::{ReceiveFn, ReceiveRef};
    ///
    /// let sink: ReceiveRef<i64> = ReceiveFn::arc("sink", |batch: Vec<i64>| async move {
    ///     let _ = batch;
    /// });
    /// assert_eq!(sink.name(), "sink");
    /// ```
    pub fn arc(name: &'static str, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<T, F, Fut> Receive<T> for ReceiveFn<F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(Vec<T>) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn on_batch(&self, batch: &[T]) {
        (self.f)(batch.to_vec()).await;
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
