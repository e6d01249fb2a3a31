//! Reconciliation loop: poll the listing until a target reaches its desired
//! state, the attempt ceiling is hit, or the caller cancels.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::time::Duration;

use fleet_common::{DesiredState, Instance, InstanceState};
use tokio::sync::watch;

use crate::application::ports::InstanceLister;
use crate::application::services::dispatch::classify;
use crate::domain::config::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_INTERVAL_SECS, ReconcileConfig};
use crate::domain::{ErrorKind, Located, locate};

/// How many polls, how far apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilePolicy {
    pub max_attempts: u32,
    pub poll_interval: Duration,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

impl From<&ReconcileConfig> for ReconcilePolicy {
    fn from(config: &ReconcileConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            poll_interval: config.poll_interval(),
        }
    }
}

/// A listing that contradicts the command that was just accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingDefect {
    /// The target is absent and the directive was not `Terminated`.
    TargetMissing,
    /// The target id appears more than once.
    DuplicateId,
}

impl ListingDefect {
    #[must_use]
    pub fn describe(self, id: &str) -> String {
        match self {
            Self::TargetMissing => format!("Instance '{id}' disappeared from the listing."),
            Self::DuplicateId => format!("Instance '{id}' appears more than once in the listing."),
        }
    }
}

/// How a reconciliation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A poll observed the desired state.
    Converged { polls: u32 },
    /// The ceiling was reached; the instance may still converge later.
    Exhausted {
        polls: u32,
        last_observed: Option<InstanceState>,
    },
    /// A poll failed permanently, or no poll ever succeeded.
    Failed(ErrorKind),
    Inconsistent(ListingDefect),
    Cancelled,
}

enum Observation {
    State(InstanceState),
    Missing,
    Duplicate,
}

/// `true` once cancellation was requested or the cancelling side went away.
pub(crate) fn is_cancelled(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow() || cancel.has_changed().is_err()
}

/// Resolves when [`is_cancelled`] would return `true`.
pub(crate) async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    // An error means the sender is gone, which counts as cancellation.
    let _ = cancel.wait_for(|c| *c).await;
}

/// Poll `lister` until `target_id` reaches `desired`.
///
/// Every successful listing is handed to `publish` in full before the target
/// is inspected. At most `policy.max_attempts` list calls are made (at least
/// one), and there is no sleep after the last one. A poll or sleep that is in
/// flight when `cancel` fires is abandoned and its result is never published.
///
/// Poll failures are classified: `Unauthorized` and `InvalidParameter` end
/// the loop, anything else is logged and counts as a used attempt.
pub async fn reconcile<L, F>(
    lister: &L,
    owner: &str,
    target_id: &str,
    desired: DesiredState,
    policy: &ReconcilePolicy,
    mut cancel: watch::Receiver<bool>,
    mut publish: F,
) -> ReconcileOutcome
where
    L: InstanceLister + ?Sized,
    F: FnMut(Vec<Instance>),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_observed = None;
    let mut last_failure = None;
    let mut observed_any = false;

    for attempt in 1..=max_attempts {
        if is_cancelled(&cancel) {
            return ReconcileOutcome::Cancelled;
        }

        let listing = tokio::select! {
            biased;
            () = cancelled(&mut cancel) => return ReconcileOutcome::Cancelled,
            listing = lister.list_instances(owner) => listing,
        };

        match listing {
            Ok(instances) => {
                observed_any = true;
                let observation = match locate(&instances, target_id) {
                    Located::Found(instance) => Observation::State(instance.state),
                    Located::Missing => Observation::Missing,
                    Located::Duplicate => Observation::Duplicate,
                };
                publish(instances);

                match observation {
                    Observation::State(state) => {
                        tracing::debug!(
                            attempt,
                            max_attempts,
                            instance = target_id,
                            %state,
                            %desired,
                            "polled instance state"
                        );
                        if desired.is_reached_by(state) {
                            return ReconcileOutcome::Converged { polls: attempt };
                        }
                        last_observed = Some(state);
                    }
                    Observation::Missing if desired == DesiredState::Terminated => {
                        tracing::debug!(attempt, instance = target_id, "instance left the listing");
                        return ReconcileOutcome::Converged { polls: attempt };
                    }
                    Observation::Missing => {
                        return ReconcileOutcome::Inconsistent(ListingDefect::TargetMissing);
                    }
                    Observation::Duplicate => {
                        return ReconcileOutcome::Inconsistent(ListingDefect::DuplicateId);
                    }
                }
            }
            Err(err) => {
                let kind = classify(&err);
                if kind.is_permanent() {
                    return ReconcileOutcome::Failed(kind);
                }
                tracing::warn!(attempt, max_attempts, error = %err, "poll failed, will retry");
                last_failure = Some(kind);
            }
        }

        if attempt < max_attempts {
            if is_cancelled(&cancel) {
                return ReconcileOutcome::Cancelled;
            }
            tokio::select! {
                biased;
                () = cancelled(&mut cancel) => return ReconcileOutcome::Cancelled,
                () = tokio::time::sleep(policy.poll_interval) => {}
            }
        }
    }

    match last_failure {
        Some(kind) if !observed_any => ReconcileOutcome::Failed(kind),
        _ => ReconcileOutcome::Exhausted {
            polls: max_attempts,
            last_observed,
        },
    }
}
