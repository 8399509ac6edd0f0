use std::sync::Arc;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::{Receiver, Sender};
use tokio::sync::Mutex;

/// Broadcasts a one-shot shutdown signal to every listener created from this handle.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: Sender<()>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self {
            sender: tokio::sync::broadcast::channel(1).0,
        }
    }

    pub fn shutdown(&self) {
        if let Err(e) = self.sender.send(()) {
            // Fails when nobody is listening, which means there is nothing left to stop.
            log::debug!("Shutdown signal had no listeners: {e:?}");
        }
    }

    pub fn new_listener(&self) -> DelegatedShutdownListener {
        DelegatedShutdownListener::new(self.sender.subscribe())
    }
}

/// A cloneable view of the shutdown signal.
///
/// Each clone shares the same receiver, so the signal can be observed from wherever the listener
/// has been passed without re-subscribing.
#[derive(Clone, Debug)]
pub struct DelegatedShutdownListener {
    receiver: Arc<Mutex<Receiver<()>>>,
}

impl DelegatedShutdownListener {
    pub(crate) fn new(receiver: Receiver<()>) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Point in time check whether the shutdown signal has been received. Once this returns true,
    /// work should be stopped so that the scenario can shut down.
    pub fn should_shutdown(&mut self) -> bool {
        let Ok(mut receiver) = self.receiver.try_lock() else {
            // Another clone is currently checking or waiting, let it report the signal.
            return false;
        };
        match receiver.try_recv() {
            Ok(_) => true,
            // A closed channel means the handle is gone, and a lagged receiver has missed a
            // signal that was definitely sent. Either way it is time to stop.
            Err(TryRecvError::Closed) | Err(TryRecvError::Lagged(_)) => true,
            Err(TryRecvError::Empty) => false,
        }
    }

    /// Wait until the shutdown signal is received. Safe to race against another future so that
    /// the signal can cancel work in progress.
    pub async fn wait_for_shutdown(&mut self) {
        let mut receiver = self.receiver.lock().await;
        // An error here means the channel is closed or lagged, both of which count as shutdown.
        let _ = receiver.recv().await;
    }
}

#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct ShutdownSignalError {
    msg: String,
}

impl Default for ShutdownSignalError {
    fn default() -> Self {
        Self {
            msg: "Execution cancelled by shutdown signal".to_string(),
        }
    }
}
