use std::future::Future;

use anyhow::{Context, Result};

/// Drives `future` to completion on a fresh current-thread runtime.
///
/// For synchronous entry points only; must not be called from inside a
/// runtime.
pub fn run_blocking<F, T>(future: F) -> Result<T>
where
    F: Future<Output = T>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}
