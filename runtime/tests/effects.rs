//! Integration tests for effect execution and cancellation
//!
//! Time is paused in every async test, so delays complete as soon as the
//! runtime is otherwise idle.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::{DateTime, Utc};
use marquee_core::effect::{Effect, EffectId};
use marquee_core::environment::Clock;
use marquee_core::{reducer::Reducer, smallvec, SmallVec};
use marquee_runtime::{Store, StoreError};
use marquee_testing::{assertions, test_clock, FixedClock, ReducerTest};
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

const TIMER: EffectId = EffectId::new("timer");

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    /// Schedule `Fire` after `ms`, cancellable under `TIMER`
    Arm { ms: u64 },
    /// Cancel the timer
    Disarm,
    /// Timer elapsed
    Fire,
    /// Append to the record
    Record(u32),
    /// Run the nested effect tree
    Run(Plan),
}

#[derive(Debug, Clone, PartialEq)]
enum Plan {
    Sequence,
    Race,
    RaceWithTimer,
    Silent,
}

#[derive(Debug, Clone, Default)]
struct TestState {
    fired: u32,
    fired_at: Option<DateTime<Utc>>,
    record: Vec<u32>,
}

struct TestEnvironment {
    clock: FixedClock,
}

struct TestReducer;

fn record_later(ms: u64, value: u32) -> Effect<TestAction> {
    Effect::Delay {
        duration: Duration::from_millis(ms),
        action: Box::new(TestAction::Record(value)),
    }
}

fn record_now(value: u32) -> Effect<TestAction> {
    Effect::Future(Box::pin(async move { Some(TestAction::Record(value)) }))
}

impl Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Environment = TestEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TestAction::Arm { ms } => smallvec![Effect::Delay {
                duration: Duration::from_millis(ms),
                action: Box::new(TestAction::Fire),
            }
            .cancellable(TIMER)],
            TestAction::Disarm => smallvec![Effect::Cancel(TIMER)],
            TestAction::Fire => {
                state.fired += 1;
                state.fired_at = Some(env.clock.now());
                smallvec![Effect::None]
            },
            TestAction::Record(value) => {
                state.record.push(value);
                smallvec![Effect::None]
            },
            TestAction::Run(Plan::Sequence) => smallvec![Effect::Sequential(vec![
                record_now(1),
                record_later(20, 2),
                record_now(3),
            ])],
            TestAction::Run(Plan::Race) => {
                smallvec![Effect::Parallel(vec![record_later(30, 1), record_later(10, 2)])]
            },
            TestAction::Run(Plan::RaceWithTimer) => smallvec![Effect::Parallel(vec![
                record_later(50, 1).cancellable(TIMER),
                record_later(10, 2),
            ])],
            TestAction::Run(Plan::Silent) => {
                smallvec![Effect::Future(Box::pin(async { None }))]
            },
        }
    }
}

fn store() -> Store<TestReducer> {
    Store::new(
        TestState::default(),
        TestReducer,
        TestEnvironment {
            clock: test_clock(),
        },
    )
}

// ============================================================================
// Reducer
// ============================================================================

#[test]
fn arm_schedules_a_cancellable_delay() {
    ReducerTest::new(TestReducer)
        .with_env(TestEnvironment {
            clock: test_clock(),
        })
        .given_state(TestState::default())
        .when_action(TestAction::Arm { ms: 100 })
        .then_state(|state| assert_eq!(state.fired, 0))
        .then_effects(assertions::assert_has_delay_effect)
        .then_effects(|effects| {
            assert!(matches!(
                &effects[0],
                Effect::Cancellable { id, .. } if *id == TIMER
            ));
        })
        .run();
}

#[test]
fn disarm_cancels_the_timer() {
    ReducerTest::new(TestReducer)
        .with_env(TestEnvironment {
            clock: test_clock(),
        })
        .given_state(TestState::default())
        .when_action(TestAction::Disarm)
        .then_effects(|effects| assertions::assert_cancels(effects, &TIMER))
        .run();
}

// ============================================================================
// Store
// ============================================================================

#[tokio::test(start_paused = true)]
async fn delayed_action_reaches_the_reducer() {
    let store = store();

    let mut handle = store.send(TestAction::Arm { ms: 100 }).await.unwrap();
    handle.wait().await;

    assert_eq!(store.state(|s| s.fired).await, 1);
    assert_eq!(store.state(|s| s.fired_at).await, Some(test_clock().now()));
}

#[tokio::test(start_paused = true)]
async fn cancel_effect_stops_pending_delay() {
    let store = store();

    let mut armed = store.send(TestAction::Arm { ms: 100 }).await.unwrap();
    assert_eq!(armed.pending(), 1);

    store.send(TestAction::Disarm).await.unwrap();
    armed.wait().await;

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(store.state(|s| s.fired).await, 0);
}

#[tokio::test(start_paused = true)]
async fn cancel_by_id_reports_aborted_tasks() {
    let store = store();

    store.send(TestAction::Arm { ms: 100 }).await.unwrap();
    store.send(TestAction::Arm { ms: 200 }).await.unwrap();

    assert_eq!(store.cancel(&TIMER), 2);
    assert_eq!(store.cancel(&TIMER), 0);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(store.state(|s| s.fired).await, 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_suppresses_pending_timer() {
    let store = store();

    store.send(TestAction::Arm { ms: 100 }).await.unwrap();
    assert_eq!(store.shutdown(), 1);
    assert!(store.is_shut_down());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(store.state(|s| s.fired).await, 0);
    assert_eq!(
        store.send(TestAction::Fire).await.unwrap_err(),
        StoreError::ShutdownInProgress
    );
}

#[tokio::test(start_paused = true)]
async fn sequential_effects_run_in_order() {
    let store = store();

    let mut handle = store.send(TestAction::Run(Plan::Sequence)).await.unwrap();
    handle.wait().await;

    assert_eq!(store.state(|s| s.record.clone()).await, vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn parallel_effects_run_concurrently() {
    let store = store();
    let started = tokio::time::Instant::now();

    let mut handle = store.send(TestAction::Run(Plan::Race)).await.unwrap();
    handle.wait().await;

    assert_eq!(store.state(|s| s.record.clone()).await, vec![2, 1]);
    assert!(started.elapsed() < Duration::from_millis(60));
}

#[tokio::test(start_paused = true)]
async fn cancelling_a_nested_effect_leaves_siblings_running() {
    let store = store();

    let mut handle = store.send(TestAction::Run(Plan::RaceWithTimer)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    store.send(TestAction::Disarm).await.unwrap();
    handle.wait().await;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.state(|s| s.record.clone()).await, vec![2]);
}

#[tokio::test]
async fn future_without_action_feeds_nothing_back() {
    let store = store();

    let mut handle = store.send(TestAction::Run(Plan::Silent)).await.unwrap();
    handle
        .wait_with_timeout(Duration::from_secs(1))
        .await
        .unwrap();

    assert!(store.state(|s| s.record.is_empty()).await);
}
