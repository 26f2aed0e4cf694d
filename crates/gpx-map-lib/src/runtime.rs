//! Spawning of background loads on the host's event loop
//!
//! On native the current tokio runtime runs the task; on web it is queued on the JavaScript
//! event loop, where futures do not need to be `Send`.

use std::future::Future;

/// Spawn a fire-and-forget task; returns `false` when no runtime is available
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn spawn<F>(future: F) -> bool
where
    F: Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(future);
            true
        }
        Err(_) => false,
    }
}

/// Whether [`spawn`] would find a runtime
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn available() -> bool {
    tokio::runtime::Handle::try_current().is_ok()
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn available() -> bool {
    true
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn spawn<F>(future: F) -> bool
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
    true
}
