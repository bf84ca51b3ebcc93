use std::sync::Arc;
use std::time::{Duration, Instant};

use super::*;
use crate::audio::AudioHandle;
use crate::audio::fake::FakeHandle;
use crate::error::{AudioError, PlaybackError};

fn desc(file: &str, addr: &str) -> TrackDescriptor {
    TrackDescriptor {
        file: Some(file.to_string()),
        osc_message: addr.to_string(),
        ..TrackDescriptor::default()
    }
}

/// Add a track and attach a fake handle of `secs` length to it.
fn loaded_track(
    engine: &mut PlaybackEngine,
    d: &TrackDescriptor,
    secs: u64,
) -> (TrackId, Arc<FakeHandle>) {
    let id = engine.add_track(d);
    let handle = FakeHandle::new(Duration::from_secs(secs));
    let generation = engine.registry().get(id).unwrap().load_generation();
    assert!(engine.finish_load(id, generation, Ok(handle.clone() as Arc<dyn AudioHandle>)));
    (id, handle)
}

#[test]
fn second_start_is_ignored_and_keeps_one_session() {
    let mut engine = PlaybackEngine::new(1.0);
    let (id, handle) = loaded_track(&mut engine, &desc("a.wav", "/a"), 10);

    assert_eq!(engine.on_manual_play(id), Ok(StartOutcome::Started));
    assert_eq!(engine.on_manual_play(id), Ok(StartOutcome::AlreadyPlaying));
    assert_eq!(handle.play_count(), 1);
    assert!(engine.registry().get(id).unwrap().is_active());
}

#[test]
fn muting_mid_playback_silences_without_ending_session() {
    let mut engine = PlaybackEngine::new(1.0);
    let (id, handle) = loaded_track(&mut engine, &desc("a.wav", "/a"), 10);
    engine.on_manual_play(id).unwrap();

    assert!(engine.set_muted(id, true));
    let track = engine.registry().get(id).unwrap();
    assert!(track.is_active());
    assert_eq!(handle.last_output().volume(), 0.0);
    assert!(!handle.last_output().is_stopped());

    engine.set_muted(id, false);
    assert_eq!(handle.last_output().volume(), 1.0);
}

#[test]
fn muted_track_does_not_start() {
    let mut engine = PlaybackEngine::new(1.0);
    let d = TrackDescriptor {
        mute: true,
        ..desc("a.wav", "/a")
    };
    let (id, handle) = loaded_track(&mut engine, &d, 10);

    assert_eq!(engine.on_manual_play(id), Ok(StartOutcome::Muted));
    assert_eq!(handle.play_count(), 0);
    assert!(!engine.registry().get(id).unwrap().is_playing());
}

#[test]
fn start_without_audio_reports_no_audio_loaded() {
    let mut engine = PlaybackEngine::new(1.0);
    let id = engine.add_track(&desc("a.wav", "/a"));
    assert_eq!(
        engine.on_manual_play(id),
        Err(PlaybackError::NoAudioLoaded(id))
    );
}

#[test]
fn start_when_backend_refuses_reports_no_free_channel() {
    let mut engine = PlaybackEngine::new(1.0);
    let (id, handle) = loaded_track(&mut engine, &desc("a.wav", "/a"), 10);
    handle.refuse_channels();
    assert_eq!(
        engine.on_manual_play(id),
        Err(PlaybackError::NoFreeChannel(id))
    );
    assert!(!engine.registry().get(id).unwrap().is_playing());
}

#[test]
fn rebinding_moves_the_trigger_to_the_new_address() {
    let mut engine = PlaybackEngine::new(1.0);
    let (id, _handle) = loaded_track(&mut engine, &desc("a.wav", "/old"), 10);

    assert!(engine.commit_address(id, "/new"));
    assert!(engine.router().dispatch("/old").is_empty());
    assert_eq!(engine.router().dispatch("/new"), vec![id]);
    assert!(engine.on_trigger("/old", &[]).is_empty());
}

#[test]
fn rebinding_keeps_in_flight_playback() {
    let mut engine = PlaybackEngine::new(1.0);
    let (id, handle) = loaded_track(&mut engine, &desc("a.wav", "/old"), 10);
    engine.on_trigger("/old", &[]);

    engine.commit_address(id, "/new");
    assert!(engine.registry().get(id).unwrap().is_active());
    assert!(!handle.last_output().is_stopped());
}

#[test]
fn cursor_fractions_stay_within_unit_range() {
    let mut engine = PlaybackEngine::new(1.0);
    let (id, _h) = loaded_track(&mut engine, &desc("a.wav", "/a"), 10);
    let (idle, _h2) = loaded_track(&mut engine, &desc("b.wav", "/b"), 10);
    engine.on_manual_play(id).unwrap();

    let reporter = CursorReporter::new();
    let now = Instant::now();

    let mid = reporter.sample(engine.registry(), now + Duration::from_secs(5));
    assert_eq!(mid.len(), 1);
    assert_eq!(mid[0].id, id);
    assert!((mid[0].fraction - 0.5).abs() < 0.01);

    let late = reporter.sample(engine.registry(), now + Duration::from_secs(60));
    assert_eq!(late[0].fraction, 1.0);

    let early = reporter.sample(engine.registry(), now - Duration::from_secs(1));
    assert!(early.iter().all(|c| (0.0..=1.0).contains(&c.fraction)));

    assert!(reporter
        .sample(engine.registry(), now)
        .iter()
        .all(|c| c.id != idle));
}

#[test]
fn cursor_skips_zero_length_content() {
    let mut engine = PlaybackEngine::new(1.0);
    let (id, _h) = loaded_track(&mut engine, &desc("a.wav", "/a"), 0);
    engine.on_manual_play(id).unwrap();

    let positions = CursorReporter::new().sample(engine.registry(), Instant::now());
    assert!(positions.is_empty());
}

#[test]
fn removing_a_playing_track_stops_it_and_unbinds_its_address() {
    let mut engine = PlaybackEngine::new(1.0);
    let (id, handle) = loaded_track(&mut engine, &desc("a.wav", "/a"), 10);
    engine.on_trigger("/a", &[]);

    assert!(engine.remove_track(id));
    assert!(handle.last_output().is_stopped());
    assert!(engine.registry().get(id).is_none());
    assert!(engine.router().dispatch("/a").is_empty());
    assert!(engine.on_trigger("/a", &[]).is_empty());
    assert!(!engine.remove_track(id));
}

#[test]
fn two_tracks_on_one_address_both_start() {
    let mut engine = PlaybackEngine::new(1.0);
    let (a, ha) = loaded_track(&mut engine, &desc("a.wav", "/go"), 10);
    let (b, hb) = loaded_track(&mut engine, &desc("b.wav", "/go"), 10);

    let results = engine.on_trigger("/go", &[]);
    assert_eq!(
        results,
        vec![
            TriggerResult {
                id: a,
                outcome: Ok(StartOutcome::Started)
            },
            TriggerResult {
                id: b,
                outcome: Ok(StartOutcome::Started)
            },
        ]
    );
    assert_eq!(ha.play_count(), 1);
    assert_eq!(hb.play_count(), 1);
}

#[test]
fn trigger_arguments_do_not_affect_routing() {
    let mut engine = PlaybackEngine::new(1.0);
    let (id, handle) = loaded_track(&mut engine, &desc("a.wav", "/cue/1"), 10);

    let args = [rosc::OscType::Float(0.0), rosc::OscType::String("x".into())];
    let results = engine.on_trigger(" /cue/1 ", &args);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, id);
    assert_eq!(handle.play_count(), 1);
}

#[test]
fn effective_volume_is_track_times_master() {
    assert!((effective_volume(0.5, false, 0.8) - 0.4).abs() < 1e-6);
    assert_eq!(effective_volume(0.5, true, 0.8), 0.0);

    let mut engine = PlaybackEngine::new(0.8);
    let d = TrackDescriptor {
        volume: 0.5,
        ..desc("a.wav", "/a")
    };
    let (id, handle) = loaded_track(&mut engine, &d, 10);
    engine.on_manual_play(id).unwrap();
    assert!((handle.last_output().volume() - 0.4).abs() < 1e-6);
}

#[test]
fn master_volume_change_reaches_live_sessions() {
    let mut engine = PlaybackEngine::new(1.0);
    let d = TrackDescriptor {
        volume: 0.5,
        ..desc("a.wav", "/a")
    };
    let (id, handle) = loaded_track(&mut engine, &d, 10);
    engine.on_manual_play(id).unwrap();

    engine.set_master_volume(0.5);
    assert!((handle.last_output().volume() - 0.25).abs() < 1e-6);

    engine.set_volume(id, 1.0);
    assert!((handle.last_output().volume() - 0.5).abs() < 1e-6);
}

#[test]
fn placeholder_address_is_left_out_of_snapshot() {
    let mut engine = PlaybackEngine::new(1.0);
    let (_id, _h) = loaded_track(&mut engine, &desc("a.wav", PLACEHOLDER_ADDRESS), 10);
    let (_id2, _h2) = loaded_track(&mut engine, &desc("b.wav", "/b"), 10);

    let snap = engine.snapshot(8000);
    assert_eq!(snap.osc.port, 8000);
    assert_eq!(snap.tracks.len(), 1);
    assert_eq!(snap.tracks[0].file.as_deref(), Some("b.wav"));
    assert_eq!(snap.tracks[0].osc_message, "/b");
}

#[test]
fn completion_poll_clears_finished_sessions_only() {
    let mut engine = PlaybackEngine::new(1.0);
    let (a, ha) = loaded_track(&mut engine, &desc("a.wav", "/a"), 10);
    let (b, _hb) = loaded_track(&mut engine, &desc("b.wav", "/b"), 10);
    engine.on_manual_play(a).unwrap();
    engine.on_manual_play(b).unwrap();

    assert!(engine.poll_completions().is_empty());

    ha.finish_all();
    assert_eq!(engine.poll_completions(), vec![a]);
    assert!(!engine.registry().get(a).unwrap().is_playing());
    assert!(engine.registry().get(b).unwrap().is_playing());

    // Idle again, so the next trigger starts a fresh session.
    assert_eq!(engine.on_manual_play(a), Ok(StartOutcome::Started));
    assert_eq!(ha.play_count(), 2);
}

#[test]
fn stale_load_results_are_discarded() {
    let mut engine = PlaybackEngine::new(1.0);
    let id = engine.add_track(&TrackDescriptor::default());

    let first = engine.assign_file(id, "one.wav").unwrap();
    let second = engine.assign_file(id, "two.wav").unwrap();
    assert_ne!(first, second);

    let old = FakeHandle::new(Duration::from_secs(1));
    assert!(!engine.finish_load(id, first, Ok(old as Arc<dyn AudioHandle>)));
    assert!(!engine.registry().get(id).unwrap().has_audio());

    let new = FakeHandle::new(Duration::from_secs(1));
    assert!(engine.finish_load(id, second, Ok(new as Arc<dyn AudioHandle>)));
    assert_eq!(engine.registry().get(id).unwrap().file(), Some("two.wav"));
}

#[test]
fn failed_load_leaves_track_without_audio() {
    let mut engine = PlaybackEngine::new(1.0);
    let id = engine.add_track(&TrackDescriptor::default());
    let generation = engine.assign_file(id, "x.bad").unwrap();

    let err = AudioError::InvalidFormat {
        path: "x.bad".into(),
        reason: "nope".into(),
    };
    assert!(!engine.finish_load(id, generation, Err(err)));
    assert!(!engine.registry().get(id).unwrap().has_audio());
}

#[test]
fn load_for_removed_track_is_ignored() {
    let mut engine = PlaybackEngine::new(1.0);
    let id = engine.add_track(&desc("a.wav", "/a"));
    engine.remove_track(id);

    let handle = FakeHandle::new(Duration::from_secs(1));
    assert!(!engine.finish_load(id, 0, Ok(handle as Arc<dyn AudioHandle>)));
}

#[test]
fn dirty_flag_tracks_snapshot_changes() {
    let mut engine = PlaybackEngine::new(1.0);
    assert!(!engine.take_dirty());

    let id = engine.add_track(&desc("a.wav", "/a"));
    assert!(engine.take_dirty());
    assert!(!engine.take_dirty());

    engine.set_volume(id, 0.3);
    assert!(engine.take_dirty());

    engine.on_trigger("/a", &[]);
    assert!(!engine.take_dirty());
}

#[test]
fn track_ids_are_never_reused() {
    let mut engine = PlaybackEngine::new(1.0);
    let a = engine.add_track(&TrackDescriptor::default());
    engine.remove_track(a);
    let b = engine.add_track(&TrackDescriptor::default());
    assert_ne!(a, b);
}

#[test]
fn stop_is_idempotent() {
    let mut engine = PlaybackEngine::new(1.0);
    let (id, handle) = loaded_track(&mut engine, &desc("a.wav", "/a"), 10);
    engine.on_manual_play(id).unwrap();

    assert!(engine.stop_track(id));
    assert!(handle.last_output().is_stopped());
    assert!(!engine.stop_track(id));
}

#[test]
fn registry_track_starts_at_its_effective_volume() {
    let mut registry = TrackRegistry::new(0.5);
    let id = registry.add(&desc("a.wav", "/a"));
    let handle = FakeHandle::new(Duration::from_secs(4));
    let master = registry.master_volume();

    let track = registry.get_mut(id).unwrap();
    let generation = track.load_generation();
    assert!(track.attach_audio(generation, handle.clone()));
    assert_eq!(track.start(master), Ok(StartOutcome::Started));

    assert_eq!(handle.last_output().volume(), 0.5);
    let session = registry.get(id).unwrap().session().unwrap();
    assert_eq!(session.duration(), Duration::from_secs(4));
    assert!(session.started_at() <= Instant::now());
}
