//! Per-call execution configuration: timeout and cancellation

use std::time::Duration;

use tokio::sync::watch;

use crate::plan::Query;
use super::{DataStore, Row, StoreError};

/// Create a linked cancellation handle and signal
pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, Cancellation { rx })
}

/// Owner side of a cancellation signal
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel every statement running under the linked signal
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observer side of a cancellation signal; cheap to clone
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

impl Cancellation {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled; never resolves if the handle is dropped first
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Timeout and cancellation for statements of one request
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub timeout: Option<Duration>,
    pub cancellation: Option<Cancellation>,
}

impl ExecutionContext {
    /// No timeout, not cancellable
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.as_ref().is_some_and(Cancellation::is_cancelled)
    }
}

/// Execute `query` on `store`, bounded by the context's timeout and
/// cancellation. Store errors are returned unchanged.
pub async fn execute_within(
    store: &dyn DataStore,
    query: &Query,
    ctx: &ExecutionContext,
) -> Result<Vec<Row>, StoreError> {
    if ctx.is_cancelled() {
        return Err(StoreError::Cancelled);
    }

    let run = async {
        match ctx.timeout {
            Some(limit) => match tokio::time::timeout(limit, store.execute(query)).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Timeout(limit)),
            },
            None => store.execute(query).await,
        }
    };

    match &ctx.cancellation {
        Some(cancellation) => {
            tokio::select! {
                result = run => result,
                _ = cancellation.cancelled() => Err(StoreError::Cancelled),
            }
        }
        None => run.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Source;
    use async_trait::async_trait;

    struct SlowStore;

    #[async_trait]
    impl DataStore for SlowStore {
        async fn execute(&self, _query: &Query) -> Result<Vec<Row>, StoreError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }

        fn backend_type(&self) -> &'static str {
            "slow"
        }
    }

    fn query() -> Query {
        Query::new(Source::from_fact("sales", "v"))
    }

    #[tokio::test]
    async fn test_timeout() {
        let ctx = ExecutionContext::new().with_timeout(Duration::from_millis(20));
        let err = execute_within(&SlowStore, &query(), &ctx).await.unwrap_err();
        assert_eq!(err, StoreError::Timeout(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_cancel_while_running() {
        let (handle, signal) = cancellation();
        let ctx = ExecutionContext::new().with_cancellation(signal);

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });
        let err = execute_within(&SlowStore, &query(), &ctx).await.unwrap_err();
        assert_eq!(err, StoreError::Cancelled);
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (handle, signal) = cancellation();
        handle.cancel();
        let ctx = ExecutionContext::new().with_cancellation(signal);
        assert!(ctx.is_cancelled());
        assert_eq!(
            execute_within(&SlowStore, &query(), &ctx).await.unwrap_err(),
            StoreError::Cancelled
        );
    }
}
