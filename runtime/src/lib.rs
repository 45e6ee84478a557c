//! # Marquee Runtime
//!
//! The Store runtime that serializes reducer execution and runs effects.
//!
//! - **Store**: owns the state, runs the reducer for each action, executes effects
//! - **Effect executor**: spawns effect tasks and feeds produced actions back
//! - **Cancellation**: effects registered with [`Effect::Cancellable`] can be aborted
//!   by id, and [`Store::shutdown`] aborts everything still in flight
//!
//! ## Example
//!
//! ```ignore
//! use marquee_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! let mut handle = store.send(Action::DoSomething).await?;
//! handle.wait().await;
//!
//! let value = store.state(|s| s.some_field).await;
//! ```

use marquee_core::effect::{Effect, EffectId};
use marquee_core::reducer::Reducer;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::{AbortHandle, JoinHandle};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// The store was shut down and no longer accepts actions
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Waiting for effects took longer than the allowed time
        #[error("Timeout waiting for effects")]
        Timeout,
    }
}

pub use error::StoreError;

type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send`]. Tracks the effects started directly by that
/// action; actions fed back by those effects are not tracked.
#[derive(Clone, Debug)]
pub struct EffectHandle {
    pending: watch::Receiver<usize>,
}

impl EffectHandle {
    fn new() -> (Self, Tracking) {
        let (tx, rx) = watch::channel(0);
        (Self { pending: rx }, Tracking(Arc::new(tx)))
    }

    /// A handle with nothing to wait for
    #[must_use]
    pub fn completed() -> Self {
        Self::new().0
    }

    /// Number of tracked effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Wait until every tracked effect has finished or been cancelled
    pub async fn wait(&mut self) {
        // The sender lives as long as an effect does, so an error means all are gone.
        let _ = self.pending.wait_for(|count| *count == 0).await;
    }

    /// Like [`EffectHandle::wait`], bounded by `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if effects are still running when the timeout elapses.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

#[derive(Clone)]
struct Tracking(Arc<watch::Sender<usize>>);

impl Tracking {
    fn increment(&self) -> PendingGuard {
        self.0.send_modify(|count| *count += 1);
        PendingGuard(self.clone())
    }
}

/// Decrements the tracked count when the effect task ends, including on abort.
struct PendingGuard(Tracking);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.0.send_modify(|count| *count = count.saturating_sub(1));
    }
}

struct Shared<R: Reducer> {
    state: RwLock<R::State>,
    reducer: R,
    environment: R::Environment,
    shutdown: AtomicBool,
    tasks: Mutex<Vec<AbortHandle>>,
    cancellable: Mutex<HashMap<EffectId, Vec<AbortHandle>>>,
}

/// The Store - runtime for a reducer
///
/// Actions are reduced one at a time under a write lock. Effects run on Tokio
/// tasks and may send further actions back into the store.
pub struct Store<R: Reducer> {
    shared: Arc<Shared<R>>,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R> Store<R>
where
    R: Reducer + Send + Sync + 'static,
    R::State: Send + Sync + 'static,
    R::Action: Send + 'static,
    R::Environment: Send + Sync + 'static,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub fn new(initial_state: R::State, reducer: R, environment: R::Environment) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(initial_state),
                reducer,
                environment,
                shutdown: AtomicBool::new(false),
                tasks: Mutex::new(Vec::new()),
                cancellable: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The environment the reducer runs with
    #[must_use]
    pub fn environment(&self) -> &R::Environment {
        &self.shared.environment
    }

    /// Send an action to the store
    ///
    /// Runs the reducer and starts the returned effects. Returns once the
    /// effects are started, not finished; use the returned [`EffectHandle`]
    /// to wait for them.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`Store::shutdown`].
    #[tracing::instrument(skip(self, action), name = "store_send")]
    pub async fn send(&self, action: R::Action) -> Result<EffectHandle, StoreError> {
        if self.is_shut_down() {
            return Err(StoreError::ShutdownInProgress);
        }

        let effects = {
            let mut state = self.shared.state.write().await;
            // Shutdown may have happened while we waited for the lock.
            if self.is_shut_down() {
                return Err(StoreError::ShutdownInProgress);
            }
            let effects = self
                .shared
                .reducer
                .reduce(&mut state, action, &self.shared.environment);

            // Cancel while still holding the lock: an aborted effect that is
            // waiting to feed an action back must never reach the reducer.
            effects
                .into_iter()
                .filter_map(|effect| match effect {
                    Effect::Cancel(id) => {
                        self.cancel(&id);
                        None
                    },
                    effect => Some(effect),
                })
                .collect::<Vec<_>>()
        };

        let (handle, tracking) = EffectHandle::new();
        for effect in effects {
            self.dispatch(effect, &tracking);
        }
        Ok(handle)
    }

    /// Read from the current state
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&R::State) -> T,
    {
        let state = self.shared.state.read().await;
        f(&state)
    }

    /// Abort every running effect registered under `id`
    ///
    /// Returns the number of aborted tasks.
    pub fn cancel(&self, id: &EffectId) -> usize {
        let handles = self
            .shared
            .cancellable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .unwrap_or_default();

        let mut aborted = 0;
        for handle in handles {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
        }

        if aborted > 0 {
            tracing::debug!(effect_id = %id, aborted, "Cancelled effects");
            metrics::counter!("store.effects.cancelled").increment(aborted as u64);
        }
        aborted
    }

    /// Stop the store
    ///
    /// Further actions are rejected and every in-flight effect is aborted, so
    /// a timer that fires late can no longer reach the reducer. Returns the
    /// number of aborted tasks.
    pub fn shutdown(&self) -> usize {
        self.shared.shutdown.store(true, Ordering::Release);

        self.shared
            .cancellable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        let handles: Vec<AbortHandle> = self
            .shared
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        let mut aborted = 0;
        for handle in handles {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
        }

        tracing::info!(aborted_effects = aborted, "Store shut down");
        aborted
    }

    /// True once [`Store::shutdown`] has been called
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }

    fn dispatch(&self, effect: Effect<R::Action>, tracking: &Tracking) {
        match effect {
            Effect::None => {
                tracing::trace!("Executing Effect::None (no-op)");
            },
            Effect::Cancel(id) => {
                self.cancel(&id);
            },
            Effect::Cancellable { id, effect } => {
                let guard = tracking.increment();
                let store = self.clone();
                self.spawn_task(
                    Box::pin(async move {
                        let _guard = guard;
                        store.run(*effect).await;
                    }),
                    Some(id),
                );
            },
            effect => {
                let guard = tracking.increment();
                let store = self.clone();
                self.spawn_task(
                    Box::pin(async move {
                        let _guard = guard;
                        store.run(effect).await;
                    }),
                    None,
                );
            },
        }
    }

    fn spawn_task(&self, task: BoxFuture, id: Option<EffectId>) -> JoinHandle<()> {
        let join = tokio::spawn(task);

        {
            let mut tasks = self
                .shared
                .tasks
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            tasks.retain(|handle| !handle.is_finished());
            tasks.push(join.abort_handle());
        }

        if let Some(id) = id {
            let mut cancellable = self
                .shared
                .cancellable
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let handles = cancellable.entry(id).or_default();
            handles.retain(|handle| !handle.is_finished());
            handles.push(join.abort_handle());
        }

        // A shutdown that raced with this spawn must still stop the task.
        if self.is_shut_down() {
            join.abort();
        }

        join
    }

    fn run(self, effect: Effect<R::Action>) -> BoxFuture {
        Box::pin(async move {
            match effect {
                Effect::None => {},
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    if let Some(action) = fut.await {
                        tracing::trace!("Effect::Future produced an action, sending to store");
                        self.feed_back(action).await;
                    }
                },
                Effect::Delay { duration, action } => {
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    tracing::trace!(?duration, "Executing Effect::Delay");
                    tokio::time::sleep(duration).await;
                    self.feed_back(*action).await;
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    let runs = effects.into_iter().map(|effect| self.clone().run(effect));
                    futures::future::join_all(runs).await;
                },
                Effect::Sequential(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "sequential")
                        .increment(1);
                    for effect in effects {
                        self.clone().run(effect).await;
                    }
                },
                Effect::Cancellable { id, effect } => {
                    // Own task, so that cancelling it leaves sibling effects running.
                    let store = self.clone();
                    let join = self.spawn_task(
                        Box::pin(async move { store.run(*effect).await }),
                        Some(id),
                    );
                    let _ = join.await;
                },
                Effect::Cancel(id) => {
                    self.cancel(&id);
                },
            }
        })
    }

    async fn feed_back(&self, action: R::Action) {
        if let Err(error) = self.send(action).await {
            tracing::debug!(%error, "Dropped action produced by an effect");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use marquee_core::{smallvec, SmallVec};

    #[derive(Clone, Debug, PartialEq)]
    enum Tick {
        Bump,
        Schedule(u64),
    }

    struct Ticker;

    impl Reducer for Ticker {
        type State = u32;
        type Action = Tick;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut u32,
            action: Tick,
            _env: &(),
        ) -> SmallVec<[Effect<Tick>; 4]> {
            match action {
                Tick::Bump => {
                    *state += 1;
                    smallvec![Effect::None]
                },
                Tick::Schedule(ms) => smallvec![Effect::Delay {
                    duration: Duration::from_millis(ms),
                    action: Box::new(Tick::Bump),
                }],
            }
        }
    }

    #[tokio::test]
    async fn test_send_without_effects_completes_immediately() {
        let store = Store::new(0, Ticker, ());
        let mut handle = store.send(Tick::Bump).await.unwrap();
        assert_eq!(handle.pending(), 0);
        handle.wait().await;
        assert_eq!(store.state(|s| *s).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_tracks_delay() {
        let store = Store::new(0, Ticker, ());
        let mut handle = store.send(Tick::Schedule(50)).await.unwrap();
        assert_eq!(handle.pending(), 1);
        handle.wait().await;
        assert_eq!(store.state(|s| *s).await, 1);
    }

    #[tokio::test]
    async fn test_rejects_actions_after_shutdown() {
        let store = Store::new(0, Ticker, ());
        store.shutdown();
        assert_eq!(
            store.send(Tick::Bump).await.unwrap_err(),
            StoreError::ShutdownInProgress
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_with_timeout_expires() {
        let store = Store::new(0, Ticker, ());
        let mut handle = store.send(Tick::Schedule(10_000)).await.unwrap();
        let result = handle.wait_with_timeout(Duration::from_millis(10)).await;
        assert_eq!(result, Err(StoreError::Timeout));
    }
}
