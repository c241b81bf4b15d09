use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::core::errors::{KeywardError, Result};
use crate::core::traits::passphrase::{PassphraseDialog, UnlockRequest};

type Job<D> = Box<dyn FnOnce(Arc<D>) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Serializes access to the passphrase dialog.
///
/// A single worker task owns the dialog and runs queued jobs one after
/// another in submission order. Each `push` gets its own result back; a
/// job that fails or panics only fails its caller.
pub struct UnlockQueue<D> {
    sender: mpsc::UnboundedSender<Job<D>>,
}

impl<D> Clone for UnlockQueue<D> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<D: Send + Sync + 'static> UnlockQueue<D> {
    /// Start the worker on the current tokio runtime.
    ///
    /// The worker stops once every handle to the queue is dropped.
    pub fn spawn(dialog: D) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Job<D>>();
        let dialog = Arc::new(dialog);

        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                // a panicking job drops its reply sender; its caller sees the failure
                if let Err(e) = tokio::spawn(job(Arc::clone(&dialog))).await {
                    warn!(error = %e, "unlock job aborted");
                }
            }
            debug!("unlock queue stopped");
        });

        Self { sender }
    }

    /// Queue `op` and wait for its result.
    pub async fn push<T, F, Fut>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<D>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (done, result) = oneshot::channel();
        let job: Job<D> = Box::new(move |dialog| {
            Box::pin(async move {
                if done.send(op(dialog).await).is_err() {
                    warn!("unlock job finished after its caller went away");
                }
            })
        });

        self.sender
            .send(job)
            .map_err(|_| KeywardError::UnlockQueueClosed)?;
        result.await.map_err(|_| {
            if self.sender.is_closed() {
                KeywardError::UnlockQueueClosed
            } else {
                KeywardError::provider("unlock", "passphrase dialog aborted")
            }
        })?
    }

    /// Queue a passphrase prompt for `request`.
    pub async fn unlock<K>(&self, request: UnlockRequest<K>) -> Result<UnlockRequest<K>>
    where
        K: Send + 'static,
        D: PassphraseDialog<K>,
    {
        self.push(move |dialog| async move { dialog.unlock_key(request).await })
            .await
    }
}
