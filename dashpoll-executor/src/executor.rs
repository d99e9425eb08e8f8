//! Polling executor
//!
//! Fetches a JSON document, hands it to observers, then arms a timer for
//! the next poll. At most one timer is ever pending: every completion
//! clears the previous timer before arming a new one, whatever the outcome
//! of the request was.
//!
//! Each request is tagged with a sequence number. A forced refresh
//! (`fire_now`) issues a new request while an older one may still be in
//! flight; when the older one resolves, observers that drop expired
//! responses can tell it is stale by comparing numbers.
//!
//! All operations must be called from within a Tokio runtime.

use chrono::Utc;
use dashpoll_client::Transport;
use dashpoll_core::{
    ContextRoot, FALLBACK_ROOT, LOGIN_PATH, Payload, PathResolver, PollOutcome, SequenceNumber,
    resolve_url,
};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{LogLoginRedirect, LoginRedirect};
use crate::config::{ConfigError, DeliveryPolicy, ExecutorConfig};
use crate::observer::{Observer, ObserverList};
use crate::stats::PollStats;

/// Predicate over a payload that suspends automatic polling when true
pub type PauseCondition = Box<dyn Fn(&Payload) -> bool + Send + Sync>;

/// Coarse lifecycle state of an executor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    /// Nothing pending
    Idle,
    /// A timer is armed for the next poll
    Scheduled,
    /// A request is outstanding and no timer is armed
    InFlight,
    /// Deliveries are suppressed and no timer will be armed
    Paused,
}

/// Builder for a `PollingExecutor`
pub struct ExecutorBuilder {
    path: String,
    transport: Arc<dyn Transport>,
    resolver: Arc<dyn PathResolver>,
    redirect: Arc<dyn LoginRedirect>,
    login_url: Option<String>,
    pause_condition: Option<PauseCondition>,
    config: ExecutorConfig,
}

impl ExecutorBuilder {
    /// Path resolver used for the polled URL and the login page
    ///
    /// Defaults to a `/go` context root.
    pub fn with_resolver(mut self, resolver: Arc<dyn PathResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_pause_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Payload) -> bool + Send + Sync + 'static,
    {
        self.pause_condition = Some(Box::new(condition));
        self
    }

    pub fn with_login_redirect(mut self, redirect: Arc<dyn LoginRedirect>) -> Self {
        self.redirect = redirect;
        self
    }

    /// Full login URL handed to the redirect on a 401
    ///
    /// Defaults to the resolved `auth/login` application path.
    pub fn with_login_url(mut self, login_url: impl Into<String>) -> Self {
        self.login_url = Some(login_url.into());
        self
    }

    /// Validates the configuration and creates the executor
    pub fn build(self) -> Result<PollingExecutor, ConfigError> {
        self.config.validate()?;
        Ok(self.assemble())
    }

    fn assemble(self) -> PollingExecutor {
        let url = resolve_url(self.resolver.as_ref(), &self.path);
        let login_url = self
            .login_url
            .unwrap_or_else(|| resolve_url(self.resolver.as_ref(), LOGIN_PATH));
        let id = Uuid::new_v4();

        debug!(executor = %id, "Created polling executor for {}", url);

        PollingExecutor {
            inner: Arc::new(Inner {
                id,
                transport: self.transport,
                resolver: self.resolver,
                redirect: self.redirect,
                pause_condition: self.pause_condition,
                config: self.config,
                state: Mutex::new(State {
                    url,
                    login_url,
                    sequence: SequenceNumber::ZERO,
                    paused: false,
                    closed: false,
                    timer: None,
                    timer_generation: 0,
                    in_flight: None,
                    observers: ObserverList::new(),
                    stats: PollStats::default(),
                }),
            }),
        }
    }
}

/// Periodic poller with observer fan-out
///
/// Cloning gives another handle to the same executor. Dropping every
/// handle cancels the pending timer; a request already in flight still
/// completes but schedules nothing that can fire.
#[derive(Clone)]
pub struct PollingExecutor {
    inner: Arc<Inner>,
}

struct Inner {
    id: Uuid,
    transport: Arc<dyn Transport>,
    resolver: Arc<dyn PathResolver>,
    redirect: Arc<dyn LoginRedirect>,
    pause_condition: Option<PauseCondition>,
    config: ExecutorConfig,
    state: Mutex<State>,
}

struct State {
    url: String,
    login_url: String,
    sequence: SequenceNumber,
    paused: bool,
    closed: bool,
    timer: Option<Timer>,
    timer_generation: u64,
    in_flight: Option<InFlight>,
    observers: ObserverList,
    stats: PollStats,
}

struct Timer {
    generation: u64,
    handle: JoinHandle<()>,
}

struct InFlight {
    sequence: SequenceNumber,
    abort: Option<oneshot::Sender<()>>,
}

impl PollingExecutor {
    /// Creates an executor with default configuration
    ///
    /// # Arguments
    /// * `path` - Logical path of the polled document (e.g. `agents.json`)
    /// * `transport` - Transport used to fetch it
    pub fn new(path: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self::builder(path, transport).assemble()
    }

    pub fn builder(path: impl Into<String>, transport: Arc<dyn Transport>) -> ExecutorBuilder {
        ExecutorBuilder {
            path: path.into(),
            transport,
            resolver: Arc::new(ContextRoot::new(FALLBACK_ROOT)),
            redirect: Arc::new(LogLoginRedirect),
            login_url: None,
            pause_condition: None,
            config: ExecutorConfig::default(),
        }
    }

    /// Identifier recorded on this executor's log events
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Polls immediately unless paused
    pub fn start(&self) {
        let mut state = self.inner.lock();
        self.inner.start_locked(&mut state);
    }

    /// Cancels the pending timer
    ///
    /// A request already in flight is left alone; its completion arms a
    /// new timer unless the executor is paused by then.
    pub fn stop(&self) {
        let mut state = self.inner.lock();
        self.inner.clear_timer(&mut state);
    }

    /// Forces a refresh now, superseding the natural schedule
    ///
    /// Clears the pending timer, aborts the in-flight request when
    /// `abort_superseded` is set, then polls unless paused.
    pub fn fire_now(&self) {
        let mut state = self.inner.lock();
        self.inner.clear_timer(&mut state);

        if self.inner.config.abort_superseded {
            if let Some(abort) = state.in_flight.as_mut().and_then(|f| f.abort.take()) {
                // The request may already be completing; a closed channel is fine.
                let _ = abort.send(());
            }
        }

        self.inner.start_locked(&mut state);
    }

    /// Suppresses deliveries and stops rescheduling after the current cycle
    pub fn pause(&self) {
        self.inner.lock().paused = true;
        debug!(executor = %self.inner.id, "Paused");
    }

    /// Clears the pause flag
    ///
    /// Polling does not restart by itself; call `start` or `fire_now`.
    pub fn resume(&self) {
        self.inner.lock().paused = false;
        debug!(executor = %self.inner.id, "Resumed");
    }

    /// Removes every observer and clears the pause flag
    pub fn clean(&self) {
        let mut state = self.inner.lock();
        state.observers.clear();
        state.paused = false;
    }

    /// Stops the executor for good
    ///
    /// Clears the timer and observers and aborts the in-flight request.
    /// Later calls to `start` and `fire_now` do nothing.
    pub fn shutdown(&self) {
        let mut state = self.inner.lock();
        state.closed = true;
        state.observers.clear();
        self.inner.clear_timer(&mut state);
        if let Some(abort) = state.in_flight.as_mut().and_then(|f| f.abort.take()) {
            let _ = abort.send(());
        }
        info!(executor = %self.inner.id, "Polling executor shut down");
    }

    /// Appends an observer
    pub fn register(&self, observer: Arc<dyn Observer>) {
        self.inner.lock().observers.push(observer);
    }

    /// Appends several observers, keeping their order
    pub fn register_all<I>(&self, observers: I)
    where
        I: IntoIterator<Item = Arc<dyn Observer>>,
    {
        let mut state = self.inner.lock();
        for observer in observers {
            state.observers.push(observer);
        }
    }

    /// Removes the first registration of `observer`
    ///
    /// Returns false when it was not registered.
    pub fn unregister(&self, observer: &Arc<dyn Observer>) -> bool {
        self.inner.lock().observers.remove(observer)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.lock().observers.len()
    }

    /// Points the executor at a new logical path
    ///
    /// Takes effect from the next request.
    pub fn set_url(&self, path: &str) {
        let url = resolve_url(self.inner.resolver.as_ref(), path);
        self.inner.lock().url = url;
    }

    /// Resolved URL of the polled document
    pub fn url(&self) -> String {
        self.inner.lock().url.clone()
    }

    pub fn login_url(&self) -> String {
        self.inner.lock().login_url.clone()
    }

    /// Latest issued sequence number
    pub fn sequence_number(&self) -> SequenceNumber {
        self.inner.lock().sequence
    }

    /// Returns true if `sequence` is the latest issued number
    pub fn is_sequence_number_valid(&self, sequence: SequenceNumber) -> bool {
        self.inner.is_sequence_number_valid(sequence)
    }

    pub fn is_paused(&self) -> bool {
        self.inner.lock().paused
    }

    /// Returns true while a timer is armed
    pub fn is_scheduled(&self) -> bool {
        self.inner.lock().timer.is_some()
    }

    /// Returns true while the latest request has not completed
    pub fn is_in_flight(&self) -> bool {
        self.inner.lock().in_flight.is_some()
    }

    pub fn state(&self) -> ExecutorState {
        let state = self.inner.lock();
        if state.paused {
            ExecutorState::Paused
        } else if state.timer.is_some() {
            ExecutorState::Scheduled
        } else if state.in_flight.is_some() {
            ExecutorState::InFlight
        } else {
            ExecutorState::Idle
        }
    }

    pub fn stats(&self) -> PollStats {
        self.inner.lock().stats.clone()
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn is_paused(&self) -> bool {
        self.lock().paused
    }

    fn is_sequence_number_valid(&self, sequence: SequenceNumber) -> bool {
        self.lock().sequence.is_current(sequence)
    }

    fn start_locked(self: &Arc<Self>, state: &mut State) {
        if state.closed {
            debug!(executor = %self.id, "Ignoring start on a shut down executor");
            return;
        }
        if !state.paused {
            self.issue_request(state);
        }
    }

    /// Issues the next request on its own task
    fn issue_request(self: &Arc<Self>, state: &mut State) {
        let sequence = state.sequence.advance();
        state.stats.requests_issued += 1;

        let (abort_tx, abort_rx) = oneshot::channel();
        // Replacing an older entry drops its abort sender, which leaves
        // that request running to completion.
        state.in_flight = Some(InFlight {
            sequence,
            abort: Some(abort_tx),
        });

        let url = state.url.clone();
        let inner = Arc::clone(self);

        debug!(executor = %self.id, "Polling {} (request {})", url, sequence);

        tokio::spawn(async move {
            let outcome = tokio::select! {
                outcome = inner.transport.fetch(&url) => outcome,
                Ok(()) = abort_rx => PollOutcome::Aborted,
            };
            inner.complete(sequence, outcome);
        });
    }

    /// Handles a finished request, then reschedules
    fn complete(self: &Arc<Self>, sequence: SequenceNumber, outcome: PollOutcome) {
        let mut reschedule = true;

        match outcome {
            PollOutcome::Success(payload) => {
                self.lock().stats.succeeded += 1;
                self.loop_observers(&payload, sequence);

                if let Some(condition) = &self.pause_condition {
                    if condition(&payload) {
                        self.lock().paused = true;
                        info!(executor = %self.id, "Pause condition met, polling suspended");
                    }
                }
            }
            PollOutcome::HttpError(status) if status == PollOutcome::UNAUTHORIZED => {
                let login_url = self.lock().login_url.clone();
                warn!(executor = %self.id, "Request {} rejected with 401", sequence);
                self.redirect.redirect_to_login(&login_url);
                reschedule = false;
            }
            PollOutcome::HttpError(status) => {
                debug!(executor = %self.id, "Request {} failed with status {}", sequence, status);
            }
            PollOutcome::TransportError(e) => {
                debug!(executor = %self.id, "Request {} failed: {}", sequence, e);
            }
            PollOutcome::Aborted => {
                debug!(executor = %self.id, "Request {} aborted", sequence);
            }
        }

        let mut state = self.lock();
        if state
            .in_flight
            .as_ref()
            .is_some_and(|f| f.sequence == sequence)
        {
            state.in_flight = None;
        }
        state.stats.completed += 1;
        state.stats.last_completed_at = Some(Utc::now());

        self.clear_timer(&mut state);
        if reschedule && !state.paused && !state.closed {
            self.arm_timer(&mut state);
        }
    }

    /// Delivers a payload to observers in registration order
    ///
    /// Observers are notified without the state lock held, so they may
    /// call back into the executor.
    fn loop_observers(&self, payload: &Payload, sequence: SequenceNumber) {
        if payload.signals_error() {
            debug!(executor = %self.id, "Request {} returned an error payload", sequence);
            return;
        }

        let observers = self.lock().observers.snapshot();
        let halt = self.config.delivery_policy == DeliveryPolicy::HaltCycle;

        for observer in observers {
            if !observer.is_listening() {
                if halt {
                    return;
                }
                continue;
            }

            if observer.drop_expired_callback() && !self.is_sequence_number_valid(sequence) {
                debug!(executor = %self.id, "Dropping expired response {}", sequence);
                if halt {
                    return;
                }
                continue;
            }

            if !self.is_paused() {
                observer.notify(payload);
                self.lock().stats.deliveries += 1;
            }
        }
    }

    fn clear_timer(&self, state: &mut State) {
        if let Some(timer) = state.timer.take() {
            timer.handle.abort();
        }
    }

    fn arm_timer(self: &Arc<Self>, state: &mut State) {
        state.timer_generation += 1;
        let generation = state.timer_generation;
        let interval = self.config.interval;
        let weak: Weak<Inner> = Arc::downgrade(self);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            if let Some(inner) = weak.upgrade() {
                inner.on_timer(generation);
            }
        });

        state.timer = Some(Timer { generation, handle });
        state.stats.timers_armed += 1;
    }

    fn on_timer(self: &Arc<Self>, generation: u64) {
        let mut state = self.lock();
        // A timer cleared after it woke up must not poll.
        if !state
            .timer
            .as_ref()
            .is_some_and(|t| t.generation == generation)
        {
            return;
        }
        state.timer = None;
        self.start_locked(&mut state);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Ok(state) = self.state.get_mut() {
            if let Some(timer) = state.timer.take() {
                timer.handle.abort();
            }
        }
    }
}
