//! # Simple logging observer for debugging and demos.
//!
//! [`LogWriter`] prints every lifecycle signal of one host to stdout in a
//! human-readable format. This is primarily useful for development,
//! debugging, and examples.
//!
//! ## Output format
//! ```text
//! [will-load] module=shell
//! [did-load] module=shell
//! [did-load-child] module=shell child=cart
//! [did-suspend] module=shell error="on_suspend failed for module 'shell': flush failed"
//! [did-unload] module=shell
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::host::ModuleHost;
use crate::signals::SignalEvent;

/// Simple stdout logging observer.
///
/// Enabled via the `logging` feature. Prints human-readable signal lines for
/// one host until that host's channels close at unload.
///
/// Not intended for production use - subscribe to the signal channels
/// directly for structured logging or metrics collection.
pub struct LogWriter;

impl LogWriter {
    /// Subscribes to every signal of `host` and prints them from a spawned
    /// worker until the host terminates.
    ///
    /// The returned handle can be awaited for drain-on-shutdown, aborted, or
    /// handed to the host's own [`Disposer`](crate::Disposer).
    pub fn attach(host: &Arc<ModuleHost>) -> JoinHandle<()> {
        let mut rx = host.subscribe_all();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => Self::write(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn write(ev: &SignalEvent) {
        match (&ev.child, &ev.error) {
            (None, None) => println!("[{}] module={}", ev.signal, ev.module),
            (Some(child), None) => {
                println!("[{}] module={} child={}", ev.signal, ev.module, child);
            }
            (None, Some(err)) => {
                println!("[{}] module={} error={:?}", ev.signal, ev.module, err.as_message());
            }
            (Some(child), Some(err)) => {
                println!(
                    "[{}] module={} child={} error={:?}",
                    ev.signal,
                    ev.module,
                    child,
                    err.as_message()
                );
            }
        }
    }
}
