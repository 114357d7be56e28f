//! Async runtime adapter: hosts the widget library load off the UI thread.

use std::future::Future;
use std::io;

pub struct AsyncRuntime {
    runtime: tokio::runtime::Runtime,
}

impl AsyncRuntime {
    pub fn new() -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("zlive-loader")
            .enable_all()
            .build()
            .inspect_err(|e| {
                tracing::error!(error = %e, "Failed to create tokio runtime");
            })?;
        Ok(Self { runtime })
    }

    pub fn tokio_handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
