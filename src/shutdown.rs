//! Process shutdown on Ctrl-C.

use std::future::Future;
use std::io;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Cancel `token` when the process receives Ctrl-C.
///
/// Spawns a task; the returned token is a clone of `token`.
pub fn cancel_on_ctrl_c(token: CancellationToken) -> CancellationToken {
    cancel_on_signal(token.clone(), tokio::signal::ctrl_c());
    token
}

/// Cancel `token` once `signal` resolves.
///
/// A signal that fails to register is logged and leaves the token alone;
/// the process keeps running until something else cancels it.
pub fn cancel_on_signal<F>(token: CancellationToken, signal: F) -> JoinHandle<()>
where
    F: Future<Output = io::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        match signal.await {
            Ok(()) => {
                info!("shutdown signal received");
                token.cancel();
            }
            Err(err) => error!(error = %err, "failed to listen for shutdown signal"),
        }
    })
}
