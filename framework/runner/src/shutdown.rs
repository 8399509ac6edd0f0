use tokio::signal;

pub(crate) use page_tunnel_core::prelude::{
    DelegatedShutdownListener, ShutdownHandle, ShutdownSignalError,
};

/// Turn Ctrl-C into a shutdown signal for the whole scenario.
pub(crate) fn start_shutdown_listener(runtime: &tokio::runtime::Runtime) -> ShutdownHandle {
    let handle = ShutdownHandle::default();

    let listener_handle = handle.clone();
    runtime.spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                listener_handle.shutdown();
                println!("Received shutdown signal, shutting down...");
            }
            Err(e) => {
                log::warn!("Failed to listen for Ctrl-C, the scenario cannot be interrupted: {e}");
            }
        }
    });

    handle
}
