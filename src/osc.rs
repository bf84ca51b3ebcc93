//! UDP OSC listener.
//!
//! Runs its own thread and never touches playback state: every decoded
//! message is handed to the owning event loop as a [`TriggerEvent`] over an
//! `mpsc` channel. Restarting on another port means shutting this listener
//! down (which joins its thread and frees the port) and spawning a new one.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rosc::{OscMessage, OscPacket, OscType};
use tracing::{info, warn};

use crate::error::ListenerError;

/// How long a blocked receive waits before rechecking the shutdown flag.
const READ_TIMEOUT: Duration = Duration::from_millis(200);

/// One inbound OSC message.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerEvent {
    pub address: String,
    pub args: Vec<OscType>,
}

pub struct OscListener {
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl OscListener {
    /// Bind `bind_address:port` and start forwarding messages to `tx`.
    pub fn spawn(
        bind_address: &str,
        port: u16,
        tx: Sender<TriggerEvent>,
    ) -> Result<Self, ListenerError> {
        let addr = format!("{bind_address}:{port}");
        let socket = UdpSocket::bind(&addr).map_err(|e| ListenerError::bind(&addr, e))?;
        socket.set_read_timeout(Some(READ_TIMEOUT))?;
        let local_addr = socket.local_addr()?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = shutdown.clone();
        let join = thread::Builder::new()
            .name("osc-listener".to_string())
            .spawn(move || listen(socket, tx, flag))?;

        info!(%local_addr, "OSC listener started");
        Ok(Self {
            local_addr,
            shutdown,
            join: Some(join),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Stop the thread and release the socket before returning.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            let _ = join.join();
            info!(local_addr = %self.local_addr, "OSC listener shut down");
        }
    }
}

impl Drop for OscListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn listen(socket: UdpSocket, tx: Sender<TriggerEvent>, shutdown: Arc<AtomicBool>) {
    let mut buf = [0u8; rosc::decoder::MTU];
    let mut messages = Vec::new();

    while !shutdown.load(Ordering::SeqCst) {
        let (len, from) = match socket.recv_from(&mut buf) {
            Ok(r) => r,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => continue,
            Err(e) => {
                warn!("OSC receive failed: {e}");
                thread::sleep(READ_TIMEOUT);
                continue;
            }
        };

        let packet = match rosc::decoder::decode_udp(&buf[..len]) {
            Ok((_, packet)) => packet,
            Err(e) => {
                warn!(%from, "malformed OSC packet: {e:?}");
                continue;
            }
        };

        messages.clear();
        flatten(packet, &mut messages);
        for msg in messages.drain(..) {
            info!(address = %msg.addr, args = ?msg.args, %from, "OSC message received");
            let event = TriggerEvent {
                address: msg.addr,
                args: msg.args,
            };
            // The event loop is gone; nothing left to deliver to.
            if tx.send(event).is_err() {
                return;
            }
        }
    }
}

/// Bundles may nest; triggers only care about the messages inside.
fn flatten(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => out.push(msg),
        OscPacket::Bundle(bundle) => {
            for p in bundle.content {
                flatten(p, out);
            }
        }
    }
}
