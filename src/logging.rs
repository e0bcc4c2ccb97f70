//! # LogTap — simple batch printer
//!
//! A minimal receiver that prints delivered batches to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [events] batch len=3 msgs=[1, 2, 3]
//! [events] batch len=1 msgs=[4]
//! ```

use std::fmt::Debug;

use async_trait::async_trait;

use crate::channel::Receive;

/// Batch printer receiver.
pub struct LogTap {
    tag: &'static str,
}

impl LogTap {
    /// Constructs a new [`LogTap`] printing under `tag`.
    #[must_use]
    pub fn new(tag: &'static str) -> Self {
        Self { tag }
    }
}

impl Default for LogTap {
    fn default() -> Self {
        Self::new("tap")
    }
}

#[async_trait]
impl<T> Receive<T> for LogTap
where
    T: Clone + Debug + Send + Sync + 'static,
{
    async fn on_batch(&self, batch: &[T]) {
        println!("[{}] batch len={} msgs={:?}", self.tag, batch.len(), batch);
    }

    fn name(&self) -> &'static str {
        "LogTap"
    }
}
