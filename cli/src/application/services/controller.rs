//! Application state machine.
//!
//! `FleetController` owns the observable [`AppState`] and the current
//! instance collection, and runs one operation at a time: starting a new
//! operation cancels the one in flight, and a generation counter keeps the
//! superseded one from writing anything afterwards.
//!
//! The current state lives in a `watch` channel, which only keeps the latest
//! value. Every accepted transition is also sent on a `broadcast` channel so a
//! subscriber sees `Loading` even when the gateway answers without suspending.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::sync::{Arc, Mutex, PoisonError};

use fleet_common::{Instance, InstanceState};
use tokio::sync::{broadcast, watch};

use crate::application::ports::ControlPlane;
use crate::application::services::describe::{self, InstanceDescription};
use crate::application::services::dispatch::{Command, classify, dispatch};
use crate::application::services::reconcile::{
    ListingDefect, ReconcileOutcome, ReconcilePolicy, cancelled, reconcile,
};
use crate::domain::{AppState, ErrorKind};

/// A user-triggered operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List,
    Start(String),
    Stop(String),
    Terminate(String),
}

impl Operation {
    fn command(&self) -> Option<(Command, &str)> {
        match self {
            Self::List => None,
            Self::Start(id) => Some((Command::Start, id)),
            Self::Stop(id) => Some((Command::Stop, id)),
            Self::Terminate(id) => Some((Command::Terminate, id)),
        }
    }
}

/// What an operation ended with, from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Listed { count: usize },
    Converged { polls: u32 },
    /// The command was accepted but the instance had not converged when the
    /// poll budget ran out.
    Exhausted {
        polls: u32,
        last_observed: Option<InstanceState>,
    },
    Failed(ErrorKind),
    Inconsistent(ListingDefect),
    /// A newer operation started before this one finished.
    Superseded,
}

#[derive(Default)]
struct Session {
    generation: u64,
    cancel: Option<watch::Sender<bool>>,
}

const TRANSITION_BUFFER: usize = 64;

pub struct FleetController<G> {
    gateway: G,
    owner: String,
    policy: ReconcilePolicy,
    state: watch::Sender<AppState>,
    transitions: broadcast::Sender<AppState>,
    instances: watch::Sender<Arc<[Instance]>>,
    session: Mutex<Session>,
}

impl<G: ControlPlane> FleetController<G> {
    pub fn new(gateway: G, owner: impl Into<String>, policy: ReconcilePolicy) -> Self {
        let (state, _) = watch::channel(AppState::NoData);
        let (transitions, _) = broadcast::channel(TRANSITION_BUFFER);
        let (instances, _) = watch::channel::<Arc<[Instance]>>(Arc::from(Vec::new()));
        Self {
            gateway,
            owner: owner.into(),
            policy,
            state,
            transitions,
            instances,
            session: Mutex::new(Session::default()),
        }
    }

    /// Subscribe to application state changes.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// Subscribe to every state transition, in the order it was published.
    ///
    /// Unlike [`Self::subscribe_state`], no intermediate value is skipped as
    /// long as the receiver keeps up with the buffer.
    #[must_use]
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<AppState> {
        self.transitions.subscribe()
    }

    /// Subscribe to instance collection replacements.
    #[must_use]
    pub fn subscribe_instances(&self) -> watch::Receiver<Arc<[Instance]>> {
        self.instances.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn instances(&self) -> Arc<[Instance]> {
        Arc::clone(&self.instances.borrow())
    }

    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub async fn list_instances(&self) -> CommandOutcome {
        self.run(Operation::List).await
    }

    pub async fn start_instance(&self, id: &str) -> CommandOutcome {
        self.run(Operation::Start(id.to_string())).await
    }

    pub async fn stop_instance(&self, id: &str) -> CommandOutcome {
        self.run(Operation::Stop(id.to_string())).await
    }

    pub async fn terminate_instance(&self, id: &str) -> CommandOutcome {
        self.run(Operation::Terminate(id.to_string())).await
    }

    /// Describe instance `id`. Read-only: state and collection are untouched.
    ///
    /// # Errors
    ///
    /// Returns the classified failure when the instance or its machine type
    /// cannot be resolved.
    pub async fn describe_instance(&self, id: &str) -> Result<InstanceDescription, ErrorKind> {
        let known = self.instances();
        describe::describe_instance(&self.gateway, &self.owner, &known, id).await
    }

    /// Run `op` to completion, superseding whatever was in flight.
    pub async fn run(&self, op: Operation) -> CommandOutcome {
        let (generation, cancel) = self.begin();
        tracing::info!(generation, ?op, "operation started");
        self.enter_loading();

        let outcome = match op.command() {
            None => self.list_once(generation, cancel).await,
            Some((command, id)) => self.command(generation, command, id, cancel).await,
        };

        self.finish(generation);
        tracing::info!(generation, ?outcome, "operation finished");
        outcome
    }

    async fn list_once(&self, generation: u64, mut cancel: watch::Receiver<bool>) -> CommandOutcome {
        let listing = tokio::select! {
            biased;
            () = cancelled(&mut cancel) => return CommandOutcome::Superseded,
            listing = self.gateway.list_instances(&self.owner) => listing,
        };
        if !self.is_current(generation) {
            return CommandOutcome::Superseded;
        }
        match listing {
            Ok(instances) => {
                let count = instances.len();
                self.publish_instances(generation, instances);
                self.transition(generation, AppState::DataAvailable);
                CommandOutcome::Listed { count }
            }
            Err(err) => {
                let kind = classify(&err);
                self.transition(generation, AppState::error(&kind));
                CommandOutcome::Failed(kind)
            }
        }
    }

    async fn command(
        &self,
        generation: u64,
        command: Command,
        id: &str,
        mut cancel: watch::Receiver<bool>,
    ) -> CommandOutcome {
        let dispatched = tokio::select! {
            biased;
            () = cancelled(&mut cancel) => return CommandOutcome::Superseded,
            dispatched = dispatch(&self.gateway, command, id) => dispatched,
        };
        if !self.is_current(generation) {
            return CommandOutcome::Superseded;
        }
        if let Err(kind) = dispatched {
            self.transition(generation, AppState::error(&kind));
            return CommandOutcome::Failed(kind);
        }

        let outcome = reconcile(
            &self.gateway,
            &self.owner,
            id,
            command.desired_state(),
            &self.policy,
            cancel,
            |snapshot| self.publish_instances(generation, snapshot),
        )
        .await;
        if !self.is_current(generation) {
            return CommandOutcome::Superseded;
        }

        match outcome {
            ReconcileOutcome::Converged { polls } => {
                self.transition(generation, AppState::DataAvailable);
                CommandOutcome::Converged { polls }
            }
            ReconcileOutcome::Exhausted {
                polls,
                last_observed,
            } => {
                tracing::warn!(
                    instance = id,
                    polls,
                    desired = %command.desired_state(),
                    "instance has not converged yet"
                );
                self.transition(generation, AppState::DataAvailable);
                CommandOutcome::Exhausted {
                    polls,
                    last_observed,
                }
            }
            ReconcileOutcome::Failed(kind) => {
                self.transition(generation, AppState::error(&kind));
                CommandOutcome::Failed(kind)
            }
            ReconcileOutcome::Inconsistent(defect) => {
                let kind = ErrorKind::Unknown(defect.describe(id));
                self.transition(generation, AppState::error(&kind));
                CommandOutcome::Inconsistent(defect)
            }
            ReconcileOutcome::Cancelled => CommandOutcome::Superseded,
        }
    }

    // ── Session bookkeeping ──────────────────────────────────────────────────

    fn begin(&self) -> (u64, watch::Receiver<bool>) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = session.cancel.take() {
            let _ = previous.send(true);
            tracing::debug!(generation = session.generation, "superseding operation");
        }
        session.generation += 1;
        let (tx, rx) = watch::channel(false);
        session.cancel = Some(tx);
        (session.generation, rx)
    }

    fn finish(&self, generation: u64) {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.generation == generation {
            session.cancel = None;
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
            == generation
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    fn enter_loading(&self) {
        let changed = self.state.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            *state = AppState::Loading;
            true
        });
        if changed {
            self.announce(AppState::Loading);
        }
    }

    fn transition(&self, generation: u64, next: AppState) {
        if !self.is_current(generation) {
            return;
        }
        let changed = self.state.send_if_modified(|state| {
            if !state.can_transition_to(&next) {
                tracing::warn!(from = ?state, to = ?next, "rejected state transition");
                return false;
            }
            *state = next.clone();
            true
        });
        if changed {
            self.announce(next);
        }
    }

    fn announce(&self, state: AppState) {
        // Fails only when nobody is subscribed.
        let _ = self.transitions.send(state);
    }

    fn publish_instances(&self, generation: u64, snapshot: Vec<Instance>) {
        if self.is_current(generation) {
            self.instances.send_replace(Arc::from(snapshot));
        }
    }
}
