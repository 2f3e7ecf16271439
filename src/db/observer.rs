use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;

/// Monotonic write counter for one table. Live queries subscribe and re-run
/// whenever it moves.
#[derive(Clone)]
pub struct TableObserver {
    table: &'static str,
    version: Arc<watch::Sender<u64>>,
}

impl TableObserver {
    pub fn new(table: &'static str) -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            table,
            version: Arc::new(tx),
        }
    }

    pub fn notify(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
        trace!(table = self.table, version = *self.version.borrow(), "table invalidated");
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}
