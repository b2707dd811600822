//! Interrupt handling.
//!
//! Translates process signals into a cancellation token that the session
//! polls at loop checkpoints. The check is advisory, not preemptive: a
//! blocking read or write already in flight completes (or fails) before
//! cancellation takes effect. Tests cancel the token directly, so no real
//! process signals are involved.

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Hand back a token that is cancelled when SIGINT (ctrl-c) or, on unix,
/// SIGTERM is delivered to the process.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let handle = token.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        info!(action = "receive_signal", result = "success");
        handle.cancel();
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            error!(action = "receive_signal", result = "fail", error = %e);
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(action = "receive_signal", result = "fail", error = %e);
    }
}
