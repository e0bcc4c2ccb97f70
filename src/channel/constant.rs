//! Single-value state for constant channels.
//!
//! A constant channel delivers at most one value to all current and future
//! receivers and is exempt from the cutover protocol: there is no backlog to
//! snapshot and no live stream to order, just one value and the receivers
//! waiting for it.

use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

use crate::queue::{Batch, BatchFn, QueueId};

struct ConstState<T> {
    value: Option<T>,
    /// Receivers registered before the value was set, in registration order.
    waiters: Vec<BatchFn<T>>,
}

/// One-shot value cell behind a constant channel.
pub(crate) struct ConstantCell<T> {
    id: QueueId,
    state: Mutex<ConstState<T>>,
    /// Wakes pollers blocked on an unset cell.
    set_signal: Notify,
}

impl<T: Clone + Send + Sync + 'static> ConstantCell<T> {
    pub(crate) fn new(id: QueueId, value: Option<T>) -> Self {
        Self {
            id,
            state: Mutex::new(ConstState {
                value,
                waiters: Vec::new(),
            }),
            set_signal: Notify::new(),
        }
    }

    /// Channel identity (used as an idempotent forwarding key).
    pub(crate) fn id(&self) -> QueueId {
        self.id
    }

    /// Sets the single value. The first set wins; later calls return `false`.
    ///
    /// Receivers registered while the cell was unset are delivered now, in
    /// registration order, and blocked pollers are woken.
    pub(crate) async fn set(&self, value: T) -> bool {
        let waiters = {
            let mut state = self.state.lock().await;
            if state.value.is_some() {
                return false;
            }
            state.value = Some(value.clone());
            std::mem::take(&mut state.waiters)
        };
        let batch: Batch<T> = Arc::from(vec![value]);
        for deliver in waiters {
            deliver(batch.clone()).await;
        }
        self.set_signal.notify_waiters();
        true
    }

    /// Returns the value, if set. Never consumes it.
    pub(crate) async fn get(&self) -> Option<T> {
        self.state.lock().await.value.clone()
    }

    /// Delivers the single value to `deliver` — now if set, or as soon as
    /// [`ConstantCell::set`] runs.
    pub(crate) async fn deliver(&self, deliver: BatchFn<T>) {
        let ready = {
            let mut state = self.state.lock().await;
            match &state.value {
                Some(value) => Some(value.clone()),
                None => {
                    state.waiters.push(deliver.clone());
                    None
                }
            }
        };
        if let Some(value) = ready {
            deliver(Arc::from(vec![value])).await;
        }
    }

    pub(crate) fn set_signal(&self) -> &Notify {
        &self.set_signal
    }
}
