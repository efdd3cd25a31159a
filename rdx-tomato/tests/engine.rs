use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;
use tomato::prelude::*;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn assert_invariant(state: &TimerState) {
    assert!(
        state.remaining <= state.total_duration,
        "remaining exceeds total: {:?}",
        state
    );
    if state.phase == Phase::Idle {
        assert_eq!(state.remaining, Duration::ZERO, "idle with time left: {:?}", state);
    }
}

#[tokio::test(start_paused = true)]
async fn starts_idle() {
    let engine = TimerEngine::without_chaining();
    assert_eq!(engine.state().await, TimerState::idle());
    assert!(!engine.is_running().await);
}

#[tokio::test(start_paused = true)]
async fn start_replaces_state_and_counts_down_once_per_second() {
    let engine = TimerEngine::without_chaining();
    engine.start(secs(300), Phase::Work);

    let state = engine.state().await;
    assert_eq!(state.phase, Phase::Work);
    assert_eq!(state.remaining, secs(300));
    assert_eq!(state.total_duration, secs(300));

    sleep(Duration::from_millis(3500)).await;
    let state = engine.state().await;
    assert_eq!(state.remaining, secs(297));
    assert_eq!(state.total_duration, secs(300));

    engine.start(secs(60), Phase::Break);
    let state = engine.state().await;
    assert_eq!(state.phase, Phase::Break);
    assert_eq!(state.remaining, secs(60));
}

#[tokio::test(start_paused = true)]
async fn pause_freezes_and_resume_restores() {
    let engine = TimerEngine::without_chaining();
    engine.start(secs(300), Phase::Work);
    sleep(Duration::from_millis(1500)).await;

    engine.pause();
    assert!(engine.is_paused().await);
    let paused = engine.state().await;
    assert_eq!(paused.phase, Phase::WorkPaused);
    assert_eq!(paused.remaining, secs(299));

    sleep(secs(10)).await;
    assert_eq!(engine.state().await, paused);

    engine.resume();
    assert!(!engine.is_paused().await);
    let resumed = engine.state().await;
    assert_eq!(resumed.phase, Phase::Work);
    assert_eq!(resumed.remaining, paused.remaining);
    assert_eq!(resumed.total_duration, paused.total_duration);
}

#[tokio::test(start_paused = true)]
async fn pause_is_idempotent() {
    let engine = TimerEngine::without_chaining();
    engine.start(secs(60), Phase::Break);
    engine.pause();
    let once = engine.state().await;
    engine.pause();
    assert_eq!(engine.state().await, once);
    assert_eq!(once.phase, Phase::BreakPaused);
}

#[tokio::test(start_paused = true)]
async fn idle_ignores_pause_resume_and_stop() {
    let engine = TimerEngine::without_chaining();
    engine.pause();
    engine.resume();
    engine.stop();
    assert_eq!(engine.state().await, TimerState::idle());
}

#[tokio::test(start_paused = true)]
async fn resume_on_active_phase_is_noop() {
    let engine = TimerEngine::without_chaining();
    engine.start(secs(60), Phase::Work);
    engine.resume();
    assert_eq!(engine.state().await.phase, Phase::Work);
}

#[tokio::test(start_paused = true)]
async fn stop_resets_from_any_phase() {
    let engine = TimerEngine::without_chaining();
    engine.start(secs(60), Phase::Work);
    engine.pause();
    engine.stop();
    assert_eq!(engine.state().await, TimerState::idle());

    engine.start(secs(60), Phase::Break);
    engine.stop();
    assert_eq!(engine.state().await, TimerState::idle());
}

#[tokio::test(start_paused = true)]
async fn starting_idle_phase_keeps_timer_idle() {
    let engine = TimerEngine::without_chaining();
    engine.start(secs(60), Phase::Idle);
    assert_eq!(engine.state().await, TimerState::idle());
}

#[tokio::test(start_paused = true)]
async fn natural_completion_without_chaining_goes_idle() {
    let engine = TimerEngine::without_chaining();
    engine.start(secs(2), Phase::Work);
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(engine.state().await, TimerState::idle());
}

#[tokio::test(start_paused = true)]
async fn completion_handler_sees_finished_phase_and_chains() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_handler = Arc::clone(&seen);
    let engine = TimerEngine::spawn(move |finished| {
        seen_in_handler.lock().unwrap().push(finished);
        Some(PhaseRequest {
            phase: Phase::Break,
            duration: Duration::from_secs(5),
        })
    });

    engine.start(secs(2), Phase::Work);
    sleep(Duration::from_millis(2500)).await;

    let state = engine.state().await;
    assert_eq!(state.phase, Phase::Break);
    assert_eq!(state.remaining, secs(5));
    assert_eq!(state.total_duration, secs(5));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].phase, Phase::Work);
    assert_eq!(seen[0].total_duration, secs(2));
}

#[tokio::test(start_paused = true)]
async fn stop_does_not_invoke_completion_handler() {
    let calls = Arc::new(Mutex::new(0));
    let calls_in_handler = Arc::clone(&calls);
    let engine = TimerEngine::spawn(move |_| {
        *calls_in_handler.lock().unwrap() += 1;
        None
    });

    engine.start(secs(3), Phase::Work);
    sleep(Duration::from_millis(1500)).await;
    engine.stop();
    sleep(secs(5)).await;
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn paused_phase_never_completes() {
    let engine = TimerEngine::without_chaining();
    engine.start(secs(1), Phase::Work);
    engine.pause();
    sleep(secs(5)).await;
    let state = engine.state().await;
    assert_eq!(state.phase, Phase::WorkPaused);
    assert_eq!(state.remaining, secs(1));
}

#[tokio::test(start_paused = true)]
async fn broadcasts_only_real_transitions() {
    let engine = TimerEngine::without_chaining();
    let mut events = engine.subscribe_events();

    engine.pause();
    engine.start(secs(2), Phase::Work);
    engine.pause();
    engine.pause();
    engine.resume();
    sleep(Duration::from_millis(2500)).await;
    engine.stop();
    engine.state().await;

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert_eq!(
        received,
        vec![
            TimerEvent::PhaseStarted {
                phase: Phase::Work,
                duration: secs(2)
            },
            TimerEvent::Paused {
                phase: Phase::WorkPaused,
                remaining: secs(2)
            },
            TimerEvent::Resumed {
                phase: Phase::Work,
                remaining: secs(2)
            },
            TimerEvent::PhaseCompleted {
                phase: Phase::Work,
                total_duration: secs(2)
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn stop_reports_the_phase_it_interrupted() {
    let engine = TimerEngine::without_chaining();
    let mut events = engine.subscribe_events();

    engine.stop();
    engine.start(secs(60), Phase::Work);
    sleep(Duration::from_millis(1500)).await;
    engine.stop();
    engine.start(secs(30), Phase::Break);
    engine.pause();
    engine.stop();
    assert_eq!(engine.state().await, TimerState::idle());

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert_eq!(
        received,
        vec![
            TimerEvent::PhaseStarted {
                phase: Phase::Work,
                duration: secs(60)
            },
            TimerEvent::Stopped {
                phase: Phase::Work,
                remaining: secs(59)
            },
            TimerEvent::PhaseStarted {
                phase: Phase::Break,
                duration: secs(30)
            },
            TimerEvent::Paused {
                phase: Phase::BreakPaused,
                remaining: secs(30)
            },
            TimerEvent::Stopped {
                phase: Phase::BreakPaused,
                remaining: secs(30)
            },
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_queries_never_observe_torn_state() {
    let engine = TimerEngine::without_chaining();
    let mut handles = Vec::new();

    for writer in 0..4u64 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..200u64 {
                let phase = if (writer + i) % 2 == 0 { Phase::Work } else { Phase::Break };
                engine.start(secs(1 + (writer * 31 + i) % 90), phase);
                engine.pause();
                if i % 3 == 0 {
                    engine.stop();
                }
                engine.resume();
                tokio::task::yield_now().await;
            }
        }));
    }

    for _ in 0..4 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..300 {
                let state = engine.state().await;
                assert_invariant(&state);
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
    assert_invariant(&engine.state().await);
}
