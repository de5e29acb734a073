//! Operator interrupt handling.

use tracing::warn;

/// Resolve with the name of the first termination signal received.
///
/// Registration failures are logged; if nothing can be registered the future
/// never resolves and the run ends by completion or timeout.
#[cfg(unix)]
pub async fn shutdown_signal() -> String {
  use tokio::signal::unix::{Signal, SignalKind, signal};

  fn register(kind: SignalKind, name: &str) -> Option<Signal> {
    match signal(kind) {
      Ok(s) => Some(s),
      Err(e) => {
        warn!(signal = name, error = %e, "failed to register signal handler");
        None
      }
    }
  }

  async fn recv(sig: &mut Option<Signal>) {
    match sig {
      Some(s) => {
        s.recv().await;
      }
      None => std::future::pending().await,
    }
  }

  let mut sigint = register(SignalKind::interrupt(), "SIGINT");
  let mut sigterm = register(SignalKind::terminate(), "SIGTERM");
  let mut sighup = register(SignalKind::hangup(), "SIGHUP");
  let mut sigquit = register(SignalKind::quit(), "SIGQUIT");

  let name = tokio::select! {
    _ = recv(&mut sigint) => "SIGINT",
    _ = recv(&mut sigterm) => "SIGTERM",
    _ = recv(&mut sighup) => "SIGHUP",
    _ = recv(&mut sigquit) => "SIGQUIT",
  };
  name.to_string()
}

#[cfg(not(unix))]
pub async fn shutdown_signal() -> String {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  "ctrl-c".to_string()
}
