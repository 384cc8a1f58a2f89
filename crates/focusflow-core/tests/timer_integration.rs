//! Integration tests for the timer engine, session service and storage.

use std::sync::Arc;
use std::time::Duration;

use focusflow_core::timer::registry;
use focusflow_core::{
    Database, Event, Phase, SessionService, TimerConfig, TimerControl, TimerEngine,
};
use tokio_util::sync::CancellationToken;

fn short_config() -> TimerConfig {
    TimerConfig::new(1, 1, 2, 2)
}

#[tokio::test(start_paused = true)]
async fn test_two_pomodoros_reach_long_break() {
    let engine = TimerEngine::new(short_config());
    let mut events = engine.subscribe_events();

    engine.start();
    tokio::time::sleep(Duration::from_millis(60_500)).await;
    let s = engine.state();
    assert_eq!(s.phase, Phase::ShortBreak);
    assert_eq!(s.remaining_seconds, 60);
    assert_eq!(s.completed_pomodoros, 1);
    assert!(!s.is_running);

    engine.skip_phase();
    let s = engine.state();
    assert_eq!(s.phase, Phase::Focus);
    assert_eq!(s.completed_pomodoros, 1);

    engine.start();
    tokio::time::sleep(Duration::from_secs(61)).await;
    let s = engine.state();
    assert_eq!(s.phase, Phase::LongBreak);
    assert_eq!(s.remaining_seconds, 120);
    assert_eq!(s.total_seconds, 120);
    assert_eq!(s.completed_pomodoros, 2);

    let mut completed = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let Event::PhaseCompleted { from, to, skipped, .. } = event {
            completed.push((from, to, skipped));
        }
    }
    assert_eq!(
        completed,
        vec![
            (Phase::Focus, Phase::ShortBreak, false),
            (Phase::ShortBreak, Phase::Focus, true),
            (Phase::Focus, Phase::LongBreak, false),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_skipping_never_counts_a_pomodoro() {
    let engine = TimerEngine::new(TimerConfig::new(25, 5, 15, 4));
    for i in 0..10 {
        engine.skip_phase();
        let s = engine.state();
        let expected = if i % 2 == 0 { Phase::ShortBreak } else { Phase::Focus };
        assert_eq!(s.phase, expected);
        assert_eq!(s.completed_pomodoros, 0);
        assert!(!s.is_running);
        assert_eq!(s.remaining_seconds, s.total_seconds);
    }
}

#[tokio::test(start_paused = true)]
async fn test_paused_engine_stays_put() {
    let engine = TimerEngine::new(short_config());
    engine.start();
    tokio::time::sleep(Duration::from_millis(5_500)).await;
    engine.pause();
    let paused = engine.state();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(engine.state(), paused);
    assert_eq!(paused.remaining_seconds, 55);
}

#[tokio::test(start_paused = true)]
async fn test_service_records_focus_into_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("focusflow.db");

    let engine = Arc::new(TimerEngine::new(short_config()));
    let slot = registry::EngineSlot::new();
    slot.install(&engine);

    let cancel = CancellationToken::new();
    let service = SessionService::from_slot(&slot)
        .unwrap()
        .with_summary_sink(Database::open_at(&db_path).unwrap());
    let task = tokio::spawn(service.run(cancel.clone()));
    tokio::time::sleep(Duration::from_millis(1)).await;

    engine.start();
    tokio::time::sleep(Duration::from_millis(60_500)).await;
    cancel.cancel();
    task.await.unwrap();

    let db = Database::open_at(&db_path).unwrap();
    let today = db.summary_today().unwrap();
    assert_eq!(today.focus_seconds, 60);
    assert_eq!(today.completed_focus_sessions, 1);
}

#[tokio::test(start_paused = true)]
async fn test_reconfigure_mid_focus_records_only_elapsed_time() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("focusflow.db");

    let engine = Arc::new(TimerEngine::new(TimerConfig::new(25, 5, 15, 4)));
    let cancel = CancellationToken::new();
    let service =
        SessionService::new(engine.clone()).with_summary_sink(Database::open_at(&db_path).unwrap());
    let task = tokio::spawn(service.run(cancel.clone()));
    tokio::time::sleep(Duration::from_millis(1)).await;

    engine.start();
    tokio::time::sleep(Duration::from_millis(4_500)).await;
    engine.set_config(TimerConfig::new(1, 5, 15, 4));
    engine.start();
    tokio::time::sleep(Duration::from_millis(60_500)).await;
    cancel.cancel();
    task.await.unwrap();

    let today = Database::open_at(&db_path).unwrap().summary_today().unwrap();
    assert_eq!(today.focus_seconds, 64);
    assert_eq!(today.completed_focus_sessions, 1);
}

#[tokio::test(start_paused = true)]
async fn test_config_change_restarts_focus() {
    let engine = TimerEngine::new(short_config());
    engine.start();
    tokio::time::sleep(Duration::from_millis(60_500)).await;
    assert_eq!(engine.state().completed_pomodoros, 1);

    engine.set_config(TimerConfig::new(2, 1, 2, 2));
    let s = engine.state();
    assert_eq!(s.phase, Phase::Focus);
    assert_eq!(s.remaining_seconds, 120);
    assert!(!s.is_running);
    assert_eq!(s.completed_pomodoros, 1);
}
