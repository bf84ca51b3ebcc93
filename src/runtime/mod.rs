use std::sync::{Arc, mpsc};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::{AudioBackend, OutputDevice};
use crate::library::scan;
use crate::logging;
use crate::playback::PlaybackEngine;

mod event_loop;
mod loader;
mod services;
mod settings;
mod startup;
mod ticker;

use loader::Loader;
use services::Services;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_warning) = settings::load_settings();
    let logs = logging::init(&settings.log);
    if let Some(msg) = settings_warning {
        warn!("{msg}");
    }

    // Keep the device alive for the whole session; dropping it silences output.
    let device = OutputDevice::open_default()?;
    let backend: Arc<dyn AudioBackend> = Arc::new(device.backend());

    let audio_dir = settings.audio_dir();
    let library = scan(&audio_dir, &settings.audio);
    info!(dir = %audio_dir.display(), files = library.len(), "audio directory scanned");

    let (load_tx, load_rx) = mpsc::channel();
    let loader = Loader::new(backend, load_tx);

    let mut engine = PlaybackEngine::new(settings.audio.master_volume);
    startup::restore_tracks(&mut engine, &loader, &settings.tracks, &audio_dir);

    let mut app = App::new(settings.osc.port, audio_dir, library);
    let mut services = Services::new(settings.osc.bind_address.clone(), loader, load_rx);
    services.restart_listener(&mut app, settings.osc.port);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::new(&settings.timing);
    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut engine,
        &mut services,
        &logs,
        &mut state,
    );

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    engine.stop_all();
    services.shutdown();
    drop(device);

    run_result?;

    if state.snapshot_changed {
        let snapshot = engine.snapshot(app.osc_port);
        println!("# current cue setup; paste into your config to keep it");
        println!("{}", snapshot.to_toml()?);
    }

    Ok(())
}
