//! Blocking bridge onto a dedicated runtime for async embedding calls.

use std::future::Future;
use std::sync::{Arc, mpsc};

use tokio::runtime::{Builder as TokioRuntimeBuilder, Handle, Runtime};

use crate::error::{LegisearchError, Result};

/// Runs async [`Embedder`](crate::embedding::embedder::Embedder) futures from
/// synchronous callers.
///
/// Futures are spawned on a private multi-thread runtime and the caller blocks
/// on a channel, so this is safe to use from inside another runtime's worker.
/// The runtime shuts down in the background when the last clone is dropped,
/// which is also safe from inside an async context.
#[derive(Clone)]
pub struct EmbedderExecutor {
    handle: Handle,
    _runtime: Arc<OwnedRuntime>,
}

struct OwnedRuntime(Option<Runtime>);

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

impl EmbedderExecutor {
    pub(crate) fn new() -> Result<Self> {
        let runtime = TokioRuntimeBuilder::new_multi_thread()
            .worker_threads(2)
            .thread_name("legisearch-embedder")
            .enable_all()
            .build()
            .map_err(|err| {
                LegisearchError::internal(format!("failed to initialize embedder runtime: {err}"))
            })?;
        Ok(Self {
            handle: runtime.handle().clone(),
            _runtime: Arc::new(OwnedRuntime(Some(runtime))),
        })
    }

    /// Run an async future and wait for its result.
    pub(crate) fn run<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        self.handle.spawn(async move {
            let _ = tx.send(future.await);
        });
        rx.recv().map_err(|err| {
            LegisearchError::model_with_source("embedding task ended without a result", err)
        })?
    }
}
