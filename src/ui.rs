//! UI rendering for the terminal user interface.
//!
//! Pure view code: everything shown here is read from the `App` model, the
//! playback engine and the log buffer.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, EditTarget, ListenerStatus};
use crate::logging::LogBuffer;
use crate::playback::{PLACEHOLDER_ADDRESS, PlaybackEngine, Track};

const CONTROLS: &[(&str, &str)] = &[
    ("j/k", "up/down"),
    ("enter/p", "play"),
    ("s/S", "stop/stop all"),
    ("a", "add"),
    ("x", "remove"),
    ("f", "next file"),
    ("e", "edit address"),
    ("o", "edit port"),
    ("m", "mute"),
    ("+/-", "volume"),
    ("[/]", "master"),
    ("r", "rescan"),
    ("q", "quit"),
];

const GAUGE_WIDTH: usize = 20;

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Text progress bar for a playback fraction, e.g. `[#####.....]`.
fn gauge(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn percent(v: f32) -> String {
    format!("{:>3}%", (v * 100.0).round() as u32)
}

/// One row of the track list. `length` is the scanned length of its file.
fn track_line(track: &Track, cursor: Option<f64>, length: Option<Duration>) -> String {
    let file = match (track.file(), length) {
        (Some(name), Some(len)) => format!("{name} ({})", format_mmss(len)),
        (Some(name), None) => name.to_string(),
        (None, _) => "<no file>".to_string(),
    };
    let address = match track.trigger_address() {
        "" | PLACEHOLDER_ADDRESS => "-",
        a => a,
    };
    let state = if track.is_active() {
        "▶"
    } else if track.file().is_some() && !track.has_audio() {
        "…"
    } else {
        " "
    };
    let mute = if track.is_muted() { "M" } else { " " };
    let progress = cursor.map(|f| gauge(f, GAUGE_WIDTH)).unwrap_or_default();

    format!(
        "{state} {mute} {vol}  {address:<16}  {file}  {progress}",
        vol = percent(track.volume()),
    )
}

fn status_text(app: &App, engine: &PlaybackEngine) -> String {
    let mut parts: Vec<String> = Vec::new();

    match &app.listener {
        ListenerStatus::Listening(addr) => parts.push(format!("OSC: {addr}")),
        ListenerStatus::Failed(e) => parts.push(format!("OSC port {}: {e}", app.osc_port)),
    }
    parts.push(format!(
        "MASTER: {}",
        percent(engine.registry().master_volume())
    ));
    parts.push(format!("ROUTES: {}", engine.router().addresses().len()));
    parts.push(format!("Dir: {}", app.audio_dir.display()));

    parts.join(" • ")
}

/// Render the entire UI into `frame`.
pub fn draw(frame: &mut Frame, app: &App, engine: &PlaybackEngine, logs: &LogBuffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(8),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let status = Paragraph::new(status_text(app, engine))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" oscue ")
                .title_alignment(Alignment::Center),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[0]);

    // Track list
    {
        let registry = engine.registry();
        let items: Vec<ListItem> = registry
            .iter()
            .map(|t| {
                let length = t.file().and_then(|name| app.file_duration(name));
                ListItem::new(track_line(t, app.cursor(t.id()), length))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(" tracks "))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if !registry.is_empty() {
            state.select(Some(app.selected));
        }
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    let (edit_title, edit_text) = match &app.edit {
        Some(edit) => {
            let title = match edit.target {
                EditTarget::Address(id) => format!(" address for {id} (enter saves, esc cancels) "),
                EditTarget::Port => " OSC port (enter saves, esc cancels) ".to_string(),
            };
            (title, format!("{}_", edit.draft))
        }
        None => (" edit ".to_string(), app.notice.clone().unwrap_or_default()),
    };
    let edit_line = Paragraph::new(edit_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(edit_title),
    );
    let edit_line = if app.is_editing() {
        edit_line.bold()
    } else {
        edit_line
    };
    frame.render_widget(edit_line, chunks[2]);

    let log_height = chunks[3].height.saturating_sub(2) as usize;
    let log = Paragraph::new(logs.tail(log_height).join("\n"))
        .block(Block::default().borders(Borders::ALL).title(" log "));
    frame.render_widget(log, chunks[3]);

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
