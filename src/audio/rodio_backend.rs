//! `rodio` implementation of the audio backend.
//!
//! Content is decoded once and wrapped in `Buffered`, so every play is a
//! clone appended to a fresh `Sink` on the shared output mixer.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::mixer::Mixer;
use rodio::source::Buffered;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::error::AudioError;

use super::backend::{AudioBackend, AudioHandle, OutputChannel};

type DecodedSource = Buffered<Decoder<BufReader<File>>>;

/// Owns the default output stream. Must outlive every handle created from
/// [`OutputDevice::backend`], and stays on the thread that opened it.
pub struct OutputDevice {
    stream: OutputStream,
}

impl OutputDevice {
    pub fn open_default() -> Result<Self, AudioError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| AudioError::Device(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped, which would tear the TUI.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }

    pub fn backend(&self) -> RodioBackend {
        RodioBackend {
            mixer: self.stream.mixer().clone(),
        }
    }
}

#[derive(Clone)]
pub struct RodioBackend {
    mixer: Mixer,
}

impl AudioBackend for RodioBackend {
    fn load(&self, path: &Path) -> Result<Arc<dyn AudioHandle>, AudioError> {
        let file = File::open(path).map_err(|source| AudioError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let decoder =
            Decoder::new(BufReader::new(file)).map_err(|e| AudioError::InvalidFormat {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        // Container metadata is more reliable than the decoder's estimate
        // (VBR mp3s in particular), so prefer lofty when it answers.
        let length = probe_length(path)
            .or_else(|| decoder.total_duration())
            .unwrap_or(Duration::ZERO);

        Ok(Arc::new(RodioHandle {
            source: Mutex::new(decoder.buffered()),
            length,
            mixer: self.mixer.clone(),
        }))
    }
}

fn probe_length(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}

struct RodioHandle {
    source: Mutex<DecodedSource>,
    length: Duration,
    mixer: Mixer,
}

impl AudioHandle for RodioHandle {
    fn play(&self, volume: f32) -> Option<Box<dyn OutputChannel>> {
        let source = self.source.lock().ok()?.clone();

        let sink = Sink::connect_new(&self.mixer);
        sink.set_volume(volume);
        sink.append(source);
        Some(Box::new(RodioChannel { sink }))
    }

    fn length(&self) -> Duration {
        self.length
    }
}

struct RodioChannel {
    sink: Sink,
}

impl OutputChannel for RodioChannel {
    fn is_busy(&self) -> bool {
        !self.sink.empty()
    }

    fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn stop(&self) {
        self.sink.stop();
    }
}
