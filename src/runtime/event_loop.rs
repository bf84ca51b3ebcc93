use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info, warn};

use crate::app::{App, Commit};
use crate::config;
use crate::library;
use crate::logging::LogBuffer;
use crate::playback::{CursorReporter, PlaybackEngine, TrackDescriptor};
use crate::ui;

use super::services::Services;
use super::ticker::Ticker;

const VOLUME_STEP: f32 = 0.05;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Finished sessions are detected on this cadence.
    pub completion: Ticker,
    /// Cursor positions are sampled on this cadence.
    pub cursor: Ticker,
    pub reporter: CursorReporter,
    /// Whether the track setup changed since startup.
    pub snapshot_changed: bool,
}

impl EventLoopState {
    pub fn new(timing: &config::TimingSettings) -> Self {
        let now = Instant::now();
        Self {
            completion: Ticker::new(Duration::from_millis(timing.completion_poll_ms), now),
            cursor: Ticker::new(Duration::from_millis(timing.cursor_tick_ms), now),
            reporter: CursorReporter::new(),
            snapshot_changed: false,
        }
    }
}

/// Main terminal event loop. Owns every mutation of playback state: network
/// triggers and decoded audio arrive over channels and are applied here.
/// Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    engine: &mut PlaybackEngine,
    services: &mut Services,
    logs: &LogBuffer,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(trigger) = services.trigger_rx.try_recv() {
            engine.on_trigger(&trigger.address, &trigger.args);
        }

        while let Ok(done) = services.load_rx.try_recv() {
            engine.finish_load(done.id, done.generation, done.result);
        }

        let now = Instant::now();
        if state.completion.poll(now) {
            engine.poll_completions();
        }
        if state.cursor.poll(now) {
            let positions = state.reporter.sample(engine.registry(), now);
            app.set_cursors(&positions);
        }

        if engine.take_dirty() {
            state.snapshot_changed = true;
            let snapshot = engine.snapshot(app.osc_port);
            debug!(
                tracks = snapshot.tracks.len(),
                master_volume = snapshot.audio.master_volume,
                "configuration changed"
            );
        }

        app.clamp_selection(engine.registry().len());
        terminal.draw(|f| ui::draw(f, app, engine, logs))?;

        let now = Instant::now();
        let timeout = state
            .completion
            .until_due(now)
            .min(state.cursor.until_due(now));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, engine, services)? {
                    return Ok(());
                }
            }
        }
    }
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    engine: &mut PlaybackEngine,
    services: &mut Services,
) -> Result<bool, Box<dyn std::error::Error>> {
    if app.is_editing() {
        match key.code {
            KeyCode::Esc => app.cancel_edit(),
            KeyCode::Backspace => app.pop_char(),
            KeyCode::Enter => match app.commit_edit() {
                Ok(Some(Commit::Address(id, address))) => {
                    engine.commit_address(id, &address);
                }
                Ok(Some(Commit::Port(port))) => {
                    if port != app.osc_port {
                        services.restart_listener(app, port);
                        engine.mark_dirty();
                    }
                }
                Ok(None) => {}
                Err(msg) => warn!("{msg}"),
            },
            KeyCode::Char(c) => app.push_char(c),
            _ => {}
        }
        return Ok(false);
    }

    let len = engine.registry().len();
    let selected = app.selected_id(engine.registry());

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
        KeyCode::Char('j') | KeyCode::Down => app.next(len),
        KeyCode::Char('k') | KeyCode::Up => app.prev(len),
        KeyCode::Enter | KeyCode::Char('p') => {
            if let Some(id) = selected {
                app.note_play_result(engine.on_manual_play(id));
            }
        }
        KeyCode::Char('s') => {
            if let Some(id) = selected {
                engine.stop_track(id);
            }
        }
        KeyCode::Char('S') => engine.stop_all(),
        KeyCode::Char('a') => {
            engine.add_track(&TrackDescriptor::default());
            app.selected = engine.registry().len().saturating_sub(1);
        }
        KeyCode::Char('x') | KeyCode::Delete => {
            if let Some(id) = selected {
                engine.remove_track(id);
                app.clamp_selection(engine.registry().len());
            }
        }
        KeyCode::Char('e') => {
            if let Some(track) = selected.and_then(|id| engine.registry().get(id)) {
                app.begin_address_edit(track.id(), track.trigger_address());
            }
        }
        KeyCode::Char('o') => app.begin_port_edit(),
        KeyCode::Char('m') => {
            if let Some(track) = selected.and_then(|id| engine.registry().get(id)) {
                let (id, muted) = (track.id(), track.is_muted());
                engine.set_muted(id, !muted);
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => nudge_volume(engine, selected, VOLUME_STEP),
        KeyCode::Char('-') => nudge_volume(engine, selected, -VOLUME_STEP),
        KeyCode::Char(']') => {
            let v = engine.registry().master_volume();
            engine.set_master_volume(v + VOLUME_STEP);
        }
        KeyCode::Char('[') => {
            let v = engine.registry().master_volume();
            engine.set_master_volume(v - VOLUME_STEP);
        }
        KeyCode::Char('f') => {
            if let Some(track) = selected.and_then(|id| engine.registry().get(id)) {
                let id = track.id();
                let next = app
                    .next_file(track.file())
                    .map(|f| (f.name.clone(), f.path.clone()));
                match next {
                    Some((name, path)) => {
                        if let Some(generation) = engine.assign_file(id, name) {
                            services.loader.request(id, generation, path);
                        }
                    }
                    None => warn!(dir = %app.audio_dir.display(), "no audio files to pick from"),
                }
            }
        }
        KeyCode::Char('r') => {
            app.library = library::scan(&app.audio_dir, &settings.audio);
            info!(files = app.library.len(), "audio directory rescanned");
        }
        _ => {}
    }

    Ok(false)
}

fn nudge_volume(
    engine: &mut PlaybackEngine,
    selected: Option<crate::playback::TrackId>,
    delta: f32,
) {
    if let Some(track) = selected.and_then(|id| engine.registry().get(id)) {
        let (id, volume) = (track.id(), track.volume());
        engine.set_volume(id, volume + delta);
    }
}
