//! Application state machine: observable transitions, published collections
//! and cancel-and-supersede.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use fleet_cli::application::ports::ControlPlane;
use fleet_cli::application::services::{
    CommandOutcome, FleetController, ListingDefect, Operation, ReconcilePolicy,
};
use fleet_cli::domain::{AppError, AppState, ErrorKind, GatewayError};
use fleet_cli::infra::SimulatedGateway;
use fleet_common::{InstanceState, InstanceTypeInfo};
use tokio::sync::broadcast;

use crate::mocks::{Call, ScriptedGateway, instance, only};

const ID: &str = "i-1";

fn controller(gateway: ScriptedGateway) -> FleetController<ScriptedGateway> {
    FleetController::new(
        gateway,
        "alice",
        ReconcilePolicy {
            max_attempts: 100,
            poll_interval: Duration::from_secs(5),
        },
    )
}

/// One observed state change, with the collection size at that moment.
#[derive(Debug, Clone, PartialEq)]
struct Seen {
    state: AppState,
    instances: usize,
}

/// Run `op` while recording every state transition the controller publishes.
async fn run_recording<G: ControlPlane>(
    controller: &FleetController<G>,
    op: Operation,
) -> (CommandOutcome, Vec<Seen>) {
    let mut rx = controller.subscribe_transitions();
    let mut seen = Vec::new();
    let record = |state: AppState| Seen {
        state,
        instances: controller.instances().len(),
    };
    let run = controller.run(op);
    tokio::pin!(run);
    let outcome = loop {
        tokio::select! {
            biased;
            outcome = &mut run => break outcome,
            Ok(state) = rx.recv() => seen.push(record(state)),
        }
    };
    seen.extend(drain(&mut rx).into_iter().map(record));
    (outcome, seen)
}

/// Everything already sent on `rx`, without waiting.
fn drain(rx: &mut broadcast::Receiver<AppState>) -> Vec<AppState> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

fn states(seen: &[Seen]) -> Vec<AppState> {
    seen.iter().map(|s| s.state.clone()).collect()
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn start_scenario_converges_in_two_polls() {
    let ctrl = controller(ScriptedGateway::new(vec![
        only(ID, InstanceState::Pending),
        only(ID, InstanceState::Running),
    ]));
    assert_eq!(ctrl.state(), AppState::NoData);

    let (outcome, seen) = run_recording(&ctrl, Operation::Start(ID.into())).await;

    assert_eq!(outcome, CommandOutcome::Converged { polls: 2 });
    assert_eq!(states(&seen), vec![AppState::Loading, AppState::DataAvailable]);
    assert_eq!(ctrl.state(), AppState::DataAvailable);
    assert_eq!(ctrl.instances()[0].state, InstanceState::Running);
}

#[tokio::test(start_paused = true)]
async fn stop_scenario_stuck_running_ends_exhausted_with_data() {
    let ctrl = controller(ScriptedGateway::new(vec![only(ID, InstanceState::Running)]));

    let (outcome, seen) = run_recording(&ctrl, Operation::Stop(ID.into())).await;

    assert_eq!(
        outcome,
        CommandOutcome::Exhausted {
            polls: 100,
            last_observed: Some(InstanceState::Running),
        }
    );
    assert_eq!(states(&seen), vec![AppState::Loading, AppState::DataAvailable]);
    assert_eq!(ctrl.instances()[0].state, InstanceState::Running);
}

#[tokio::test(start_paused = true)]
async fn terminate_access_denied_is_unauthorized_without_polls() {
    let gateway = ScriptedGateway::new(vec![only(ID, InstanceState::Running)]).failing_commands(
        GatewayError::api("AccessDeniedException", "You may not terminate this instance"),
    );
    let ctrl = controller(gateway);

    let (outcome, seen) = run_recording(&ctrl, Operation::Terminate(ID.into())).await;

    let kind = ErrorKind::Unauthorized("You may not terminate this instance".into());
    assert_eq!(outcome, CommandOutcome::Failed(kind));
    assert_eq!(
        ctrl.state(),
        AppState::Error(AppError {
            title: "Unauthorized Error".into(),
            message: "You may not terminate this instance".into(),
            cause: None,
        })
    );
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].state, AppState::Loading);
}

#[tokio::test(start_paused = true)]
async fn terminate_does_not_touch_the_gateway_list_after_failure() {
    let gateway = ScriptedGateway::new(vec![only(ID, InstanceState::Running)])
        .failing_commands(GatewayError::api("AccessDeniedException", "no"));
    let ctrl = controller(gateway);

    ctrl.terminate_instance(ID).await;

    let calls = ctrl_calls(&ctrl);
    assert_eq!(calls, vec![Call::Terminate(ID.into())]);
}

fn ctrl_calls(ctrl: &FleetController<ScriptedGateway>) -> Vec<Call> {
    ctrl.gateway().calls()
}

#[tokio::test(start_paused = true)]
async fn list_publishes_collection_before_data_available() {
    let ctrl = controller(ScriptedGateway::new(vec![Ok(vec![
        instance("i-1", InstanceState::Running),
        instance("i-2", InstanceState::Stopped),
    ])]));

    let (outcome, seen) = run_recording(&ctrl, Operation::List).await;

    assert_eq!(outcome, CommandOutcome::Listed { count: 2 });
    let last = seen.last().unwrap();
    assert_eq!(last.state, AppState::DataAvailable);
    assert_eq!(last.instances, 2);
}

#[tokio::test(start_paused = true)]
async fn list_transport_failure_is_service_error_with_cause() {
    let ctrl = controller(ScriptedGateway::new(vec![Err(GatewayError::Transport(
        "dns failure".into(),
    ))]));

    let outcome = ctrl.list_instances().await;

    assert!(matches!(
        outcome,
        CommandOutcome::Failed(ErrorKind::ServiceError { .. })
    ));
    let AppState::Error(err) = ctrl.state() else {
        panic!("expected error state");
    };
    assert_eq!(err.title, "Service Error");
    assert_eq!(err.cause.as_deref(), Some("dns failure"));
}

#[tokio::test(start_paused = true)]
async fn missing_target_surfaces_as_unknown_error() {
    let ctrl = controller(ScriptedGateway::new(vec![only(
        "i-other",
        InstanceState::Running,
    )]));

    let outcome = ctrl.start_instance(ID).await;

    assert_eq!(
        outcome,
        CommandOutcome::Inconsistent(ListingDefect::TargetMissing)
    );
    let AppState::Error(err) = ctrl.state() else {
        panic!("expected error state");
    };
    assert_eq!(err.title, "Unknown Error");
    assert!(err.message.contains(ID));
}

#[tokio::test(start_paused = true)]
async fn error_state_reenters_loading_on_next_operation() {
    let ctrl = controller(ScriptedGateway::new(vec![
        Err(GatewayError::Transport("down".into())),
        Ok(vec![instance(ID, InstanceState::Running)]),
    ]));
    ctrl.list_instances().await;
    assert!(matches!(ctrl.state(), AppState::Error(_)));

    let (outcome, seen) = run_recording(&ctrl, Operation::List).await;

    assert_eq!(outcome, CommandOutcome::Listed { count: 1 });
    assert_eq!(states(&seen), vec![AppState::Loading, AppState::DataAvailable]);
}

// ── Gateways that answer without suspending ───────────────────────────────────

fn simulated() -> FleetController<SimulatedGateway> {
    FleetController::new(
        SimulatedGateway::default(),
        "alice",
        ReconcilePolicy {
            max_attempts: 10,
            poll_interval: Duration::from_secs(1),
        },
    )
}

#[tokio::test(start_paused = true)]
async fn immediate_listing_still_publishes_loading() {
    let ctrl = simulated();
    let mut rx = ctrl.subscribe_transitions();

    let outcome = ctrl.list_instances().await;

    assert_eq!(outcome, CommandOutcome::Listed { count: 4 });
    assert_eq!(drain(&mut rx), vec![AppState::Loading, AppState::DataAvailable]);
}

#[tokio::test(start_paused = true)]
async fn immediate_start_still_publishes_loading() {
    let ctrl = simulated();
    ctrl.list_instances().await;
    let mut rx = ctrl.subscribe_transitions();

    let outcome = ctrl.start_instance("i-987654321fedcba").await;

    assert!(
        matches!(outcome, CommandOutcome::Converged { .. }),
        "got {outcome:?}"
    );
    assert_eq!(drain(&mut rx), vec![AppState::Loading, AppState::DataAvailable]);
    assert_eq!(ctrl.state(), AppState::DataAvailable);
}

#[tokio::test(start_paused = true)]
async fn immediate_failure_still_publishes_loading() {
    let ctrl = simulated();
    let mut rx = ctrl.subscribe_transitions();

    let outcome = ctrl.start_instance("i-000000000000000").await;

    assert!(matches!(outcome, CommandOutcome::Failed(_)), "got {outcome:?}");
    let seen = drain(&mut rx);
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], AppState::Loading);
    assert!(matches!(seen[1], AppState::Error(_)));
}

// ── Supersede ─────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn new_operation_supersedes_the_one_in_flight() {
    let ctrl = controller(ScriptedGateway::new(vec![only(ID, InstanceState::Running)]));
    let mut rx = ctrl.subscribe_transitions();

    let (stop, start) = tokio::join!(ctrl.stop_instance(ID), async {
        tokio::time::sleep(Duration::from_secs(7)).await;
        ctrl.start_instance(ID).await
    });

    assert_eq!(stop, CommandOutcome::Superseded);
    assert_eq!(start, CommandOutcome::Converged { polls: 1 });
    // Loading is published once: the second operation finds it already set.
    assert_eq!(drain(&mut rx), vec![AppState::Loading, AppState::DataAvailable]);

    // Stop polled at t=0 and t=5; start polled once at t=7.
    let calls = ctrl_calls(&ctrl);
    assert_eq!(
        calls,
        vec![
            Call::Stop(ID.into()),
            Call::List("alice".into()),
            Call::List("alice".into()),
            Call::Start(ID.into()),
            Call::List("alice".into()),
        ]
    );

    // The superseded stop never writes again.
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(ctrl_calls(&ctrl).len(), 5);
    assert_eq!(ctrl.state(), AppState::DataAvailable);
}

// ── Describe ──────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn describe_is_read_only() {
    let info = InstanceTypeInfo {
        architectures: vec!["x86_64".into()],
        vcpus: 2,
        cores: 1,
        threads_per_core: 2,
        memory_mib: 1024,
        network_performance: "Low".into(),
        ..InstanceTypeInfo::default()
    };
    let ctrl = controller(
        ScriptedGateway::new(vec![only(ID, InstanceState::Running)]).with_catalog(info),
    );
    ctrl.list_instances().await;
    let mut rx = ctrl.subscribe_transitions();

    let description = ctrl.describe_instance(ID).await.unwrap();

    assert!(description.summary.starts_with("A t3.micro instance"));
    assert_eq!(description.instance.id, ID);
    assert!(drain(&mut rx).is_empty());
    assert_eq!(ctrl.state(), AppState::DataAvailable);
    // The known collection answered the lookup; only the catalog was asked.
    assert_eq!(
        ctrl_calls(&ctrl).last(),
        Some(&Call::DescribeType("t3.micro".into()))
    );
    assert_eq!(ctrl.gateway().list_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn describe_unknown_instance_is_invalid_parameter() {
    let ctrl = controller(ScriptedGateway::new(vec![only(ID, InstanceState::Running)]));

    let err = ctrl.describe_instance("i-nope").await.unwrap_err();

    assert!(matches!(err, ErrorKind::InvalidParameter(_)), "got {err:?}");
}
