use std::sync::mpsc::{self, Receiver, Sender};

use tracing::error;

use crate::app::{App, ListenerStatus};
use crate::osc::{OscListener, TriggerEvent};

use super::loader::{LoadResult, Loader};

/// Background collaborators of the event loop and the channels that bring
/// their results back onto it.
pub struct Services {
    bind_address: String,
    listener: Option<OscListener>,
    trigger_tx: Sender<TriggerEvent>,
    pub trigger_rx: Receiver<TriggerEvent>,
    pub loader: Loader,
    pub load_rx: Receiver<LoadResult>,
}

impl Services {
    pub fn new(bind_address: String, loader: Loader, load_rx: Receiver<LoadResult>) -> Self {
        let (trigger_tx, trigger_rx) = mpsc::channel();
        Self {
            bind_address,
            listener: None,
            trigger_tx,
            trigger_rx,
            loader,
            load_rx,
        }
    }

    /// (Re)bind the OSC listener on `port`. The previous listener is shut
    /// down and joined first so its port is free again. Trigger bindings live
    /// in the router and are unaffected.
    pub fn restart_listener(&mut self, app: &mut App, port: u16) {
        if let Some(old) = self.listener.take() {
            old.shutdown();
        }

        app.osc_port = port;
        match OscListener::spawn(&self.bind_address, port, self.trigger_tx.clone()) {
            Ok(listener) => {
                app.listener = ListenerStatus::Listening(listener.local_addr());
                self.listener = Some(listener);
            }
            Err(e) => {
                error!("failed to start OSC listener: {e}");
                app.listener = ListenerStatus::Failed(e.to_string());
            }
        }
    }

    pub fn shutdown(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.shutdown();
        }
    }
}
