//! Single-instance lifecycle semantics: serialization, idempotency, illegal
//! transitions, error delivery, and disposal.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;

use common::{Probe, TestModule};
use modvisor::{LifecycleError, LifecycleState, ModuleHost, Signal, TransitionOp};

#[tokio::test]
async fn concurrent_loads_share_one_outcome_and_run_hook_once() {
    let probe = Probe::arc();
    let host = ModuleHost::new(TestModule::new("app", &probe));

    let first = host.load();
    let second = host.load();
    let (r1, r2) = tokio::join!(first.wait(), second.wait());

    assert!(r1.is_ok());
    assert!(r2.is_ok());
    assert_eq!(probe.load_calls.load(Ordering::SeqCst), 1);
    assert!(host.is_loaded());
}

#[tokio::test]
async fn concurrent_failing_loads_share_the_same_error() {
    let probe = Probe::arc();
    let host = ModuleHost::new(TestModule::new("app", &probe).fail_load());

    let first = host.load();
    let second = host.load();
    let (r1, r2) = tokio::join!(first.wait(), second.wait());

    let e1 = r1.expect_err("load hook fails");
    let e2 = r2.expect_err("load hook fails");
    assert_eq!(e1, e2);
    assert_eq!(probe.load_calls.load(Ordering::SeqCst), 1);
    // A failing hook leaves the instance in the intermediate state.
    assert_eq!(host.state(), LifecycleState::Loading);
}

#[tokio::test]
async fn unload_on_unloaded_instance_is_a_resolved_noop() {
    let probe = Probe::arc();
    let host = ModuleHost::new(TestModule::new("app", &probe));

    host.load().wait().await.expect("load");
    host.unload().wait().await.expect("unload");
    assert!(host.is_unloaded());

    host.unload().wait().await.expect("redundant unload is Ok");
    assert_eq!(probe.unload_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn suspend_from_instantiated_fails_without_state_change() {
    let probe = Probe::arc();
    let host = ModuleHost::new(TestModule::new("app", &probe));

    let err = host.suspend().wait().await.expect_err("illegal transition");
    match err {
        LifecycleError::IllegalTransition { op, from, allowed, .. } => {
            assert_eq!(op, TransitionOp::Suspend);
            assert_eq!(from, LifecycleState::Instantiated);
            assert!(allowed.contains("loaded"));
        }
        other => panic!("expected IllegalTransition, got {other:?}"),
    }
    assert!(host.is_instantiated());
    assert_eq!(probe.suspend_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn suspend_resume_cycles_between_loaded_and_suspended() {
    let probe = Probe::arc();
    let host = ModuleHost::new(TestModule::new("app", &probe));

    host.load().wait().await.expect("load");
    for _ in 0..2 {
        host.suspend().wait().await.expect("suspend");
        assert!(host.is_suspended());
        host.resume().wait().await.expect("resume");
        assert!(host.is_loaded());
    }
    assert_eq!(probe.suspend_calls.load(Ordering::SeqCst), 2);
    assert_eq!(probe.resume_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn redundant_suspend_does_not_rerun_the_hook() {
    let probe = Probe::arc();
    let host = ModuleHost::new(TestModule::new("app", &probe));

    host.load().wait().await.expect("load");
    host.suspend().wait().await.expect("suspend");
    host.suspend().wait().await.expect("redundant suspend is Ok");
    assert_eq!(probe.suspend_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn resume_while_loaded_is_a_noop() {
    let probe = Probe::arc();
    let host = ModuleHost::new(TestModule::new("app", &probe));

    host.load().wait().await.expect("load");
    host.resume().wait().await.expect("already at resume target");
    assert!(host.is_loaded());
    assert_eq!(probe.resume_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn back_to_back_requests_serialize_hook_bodies() {
    let probe = Probe::arc();
    let host = ModuleHost::new(
        TestModule::new("app", &probe).load_delay(Duration::from_millis(20)),
    );

    // Request suspend while the load hook is still sleeping: suspend is
    // admitted from `loading` and must chain behind the load transition.
    let load = host.load();
    let suspend = host.suspend();

    suspend.wait().await.expect("suspend after load settles");
    load.wait().await.expect("load succeeded");

    assert_eq!(
        probe.order(),
        vec![
            "app:load:start",
            "app:load:end",
            "app:suspend:start",
            "app:suspend:end",
        ],
        "hook bodies must never interleave"
    );
    assert!(host.is_suspended());
}

#[tokio::test]
async fn hook_failure_reaches_handle_and_did_channel_with_same_identity() {
    let probe = Probe::arc();
    let host = ModuleHost::new(TestModule::new("app", &probe).fail_load());
    let mut did_load = host.subscribe(Signal::DidLoad);

    let err = host.load().wait().await.expect_err("load hook fails");

    let ev = did_load.recv().await.expect("did-load event");
    assert_eq!(ev.signal, Signal::DidLoad);
    assert_eq!(ev.error, Some(err));
}

#[tokio::test]
async fn will_and_did_signals_bracket_a_successful_load() {
    let probe = Probe::arc();
    let host = ModuleHost::new(TestModule::new("app", &probe));
    let mut will = host.subscribe(Signal::WillLoad);
    let mut did = host.subscribe(Signal::DidLoad);

    host.load().wait().await.expect("load");

    let will_ev = will.recv().await.expect("will-load");
    let did_ev = did.recv().await.expect("did-load");
    assert!(will_ev.seq < did_ev.seq);
    assert!(!will_ev.is_error());
    assert!(!did_ev.is_error());
}

#[tokio::test]
async fn unload_releases_disposal_exactly_once_and_closes_channels() {
    let probe = Probe::arc();
    let host = ModuleHost::new(TestModule::new("app", &probe));
    host.load().wait().await.expect("load");

    let released = Arc::new(AtomicUsize::new(0));
    for _ in 0..2 {
        let released = Arc::clone(&released);
        host.disposer().defer(move || {
            released.fetch_add(1, Ordering::SeqCst);
        });
    }

    host.unload().wait().await.expect("unload");
    assert_eq!(released.load(Ordering::SeqCst), 2);
    assert!(host.disposer().is_released());

    // Redundant unload must not re-release.
    host.unload().wait().await.expect("noop");
    assert_eq!(released.load(Ordering::SeqCst), 2);

    // Channels are closed after the terminal did-unload: a fresh subscriber
    // observes closure immediately.
    let mut rx = host.subscribe(Signal::DidLoad);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Closed)));
}

#[tokio::test]
async fn unload_hook_failure_still_completes_teardown() {
    let probe = Probe::arc();
    let host = ModuleHost::new(TestModule::new("app", &probe).fail_unload());
    host.load().wait().await.expect("load");

    let released = Arc::new(AtomicUsize::new(0));
    {
        let released = Arc::clone(&released);
        host.disposer().defer(move || {
            released.fetch_add(1, Ordering::SeqCst);
        });
    }
    let mut did_unload = host.subscribe(Signal::DidUnload);

    let err = host.unload().wait().await.expect_err("unload hook fails");
    assert_eq!(err.as_label(), "hook_failed");

    // Teardown completes despite the hook error.
    assert!(host.is_unloaded());
    assert_eq!(released.load(Ordering::SeqCst), 1);

    let ev = did_unload.recv().await.expect("did-unload carries the error");
    assert_eq!(ev.error, Some(err));
}

#[tokio::test]
async fn self_veto_rolls_back_and_emits_no_unload_events() {
    let probe = Probe::arc();
    let host = ModuleHost::new(TestModule::new("app", &probe).veto("saving"));
    host.load().wait().await.expect("load");

    let mut will_unload = host.subscribe(Signal::WillUnload);
    let mut did_unload = host.subscribe(Signal::DidUnload);

    let err = host.unload().wait().await.expect_err("vetoed");
    assert!(err.is_veto());
    assert_eq!(err.veto_reasons(), ["saving"]);

    // Rolled back, no termination events, no hook ran.
    assert!(host.is_loaded());
    assert_eq!(probe.unload_calls.load(Ordering::SeqCst), 0);
    assert!(matches!(will_unload.try_recv(), Err(TryRecvError::Empty)));
    assert!(matches!(did_unload.try_recv(), Err(TryRecvError::Empty)));

    // No transition handle leaks: the instance accepts new operations.
    host.suspend().wait().await.expect("suspend after veto");
    assert!(host.is_suspended());
}

#[tokio::test]
async fn load_after_unload_is_rejected_as_illegal() {
    let probe = Probe::arc();
    let host = ModuleHost::new(TestModule::new("app", &probe));
    host.load().wait().await.expect("load");
    host.unload().wait().await.expect("unload");

    let err = host.load().wait().await.expect_err("one cycle per instance");
    assert_eq!(err.as_label(), "illegal_transition");
    assert_eq!(probe.load_calls.load(Ordering::SeqCst), 1);
}
