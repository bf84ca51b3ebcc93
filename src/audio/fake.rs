//! Controllable audio backend used by unit tests.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::AudioError;

use super::backend::{AudioBackend, AudioHandle, OutputChannel};

/// Loads every path except ones ending in `.bad`.
pub(crate) struct FakeBackend {
    pub length: Duration,
}

impl AudioBackend for FakeBackend {
    fn load(&self, path: &Path) -> Result<Arc<dyn AudioHandle>, AudioError> {
        if path.extension().and_then(|e| e.to_str()) == Some("bad") {
            return Err(AudioError::InvalidFormat {
                path: path.to_path_buf(),
                reason: "not audio".to_string(),
            });
        }
        Ok(FakeHandle::new(self.length))
    }
}

pub(crate) struct FakeHandle {
    length: Duration,
    outputs: Mutex<Vec<Arc<FakeOutput>>>,
    refuse: AtomicBool,
}

impl FakeHandle {
    pub fn new(length: Duration) -> Arc<Self> {
        Arc::new(Self {
            length,
            outputs: Mutex::new(Vec::new()),
            refuse: AtomicBool::new(false),
        })
    }

    /// Every output started from this handle, oldest first.
    pub fn outputs(&self) -> Vec<Arc<FakeOutput>> {
        self.outputs.lock().unwrap().clone()
    }

    pub fn play_count(&self) -> usize {
        self.outputs.lock().unwrap().len()
    }

    pub fn last_output(&self) -> Arc<FakeOutput> {
        self.outputs().last().cloned().expect("handle was never played")
    }

    /// Make every running output report that it ran out of samples.
    pub fn finish_all(&self) {
        for o in self.outputs() {
            o.busy.store(false, Ordering::SeqCst);
        }
    }

    pub fn refuse_channels(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }
}

impl AudioHandle for FakeHandle {
    fn play(&self, volume: f32) -> Option<Box<dyn OutputChannel>> {
        if self.refuse.load(Ordering::SeqCst) {
            return None;
        }
        let output = Arc::new(FakeOutput {
            busy: AtomicBool::new(true),
            stopped: AtomicBool::new(false),
            volume: Mutex::new(volume),
        });
        self.outputs.lock().unwrap().push(output.clone());
        Some(Box::new(FakeChannel(output)))
    }

    fn length(&self) -> Duration {
        self.length
    }
}

pub(crate) struct FakeOutput {
    busy: AtomicBool,
    stopped: AtomicBool,
    volume: Mutex<f32>,
}

impl FakeOutput {
    pub fn volume(&self) -> f32 {
        *self.volume.lock().unwrap()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }
}

struct FakeChannel(Arc<FakeOutput>);

impl OutputChannel for FakeChannel {
    fn is_busy(&self) -> bool {
        self.0.busy.load(Ordering::SeqCst)
    }

    fn set_volume(&self, volume: f32) {
        *self.0.volume.lock().unwrap() = volume;
    }

    fn stop(&self) {
        self.0.stopped.store(true, Ordering::SeqCst);
        self.0.busy.store(false, Ordering::SeqCst);
    }
}
