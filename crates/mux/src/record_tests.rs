// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::{FaultingListener, RecordingListener};
use evmux_core::test_support::{
    build_started_event, message_event, project_finished_event, project_started_event,
};
use evmux_core::{Channel, FakeClock, SubmissionId};

fn record(clock: FakeClock) -> SubmissionRecord<FakeClock> {
    SubmissionRecord::new(SubmissionId::new(1), 3, clock)
}

#[test]
fn attach_initializes_the_listener_and_passes_node_count() {
    let clock = FakeClock::new();
    let rec = record(clock);
    let listener = RecordingListener::new();

    rec.attach(listener.clone()).unwrap();

    assert!(listener.was_initialized());
    assert_eq!(listener.max_node_count(), 3);
}

#[test]
fn attach_rejects_the_same_listener_twice() {
    let rec = record(FakeClock::new());
    let listener = RecordingListener::new();
    rec.attach(listener.clone()).unwrap();

    let err = rec.attach(listener).unwrap_err();
    assert_eq!(err, MuxError::AlreadyAttached(SubmissionId::new(1)));
}

#[test]
fn attach_rejects_once_the_record_is_shut_down() {
    let rec = record(FakeClock::new());
    rec.shutdown();

    let err = rec.attach(RecordingListener::new()).unwrap_err();
    assert_eq!(err, MuxError::RecordShutDown(SubmissionId::new(1)));
}

#[test]
fn first_project_started_synthesizes_a_bracketing_build_started() {
    let clock = FakeClock::new();
    let rec = record(clock.clone());
    let listener = RecordingListener::new();
    rec.attach(listener.clone()).unwrap();

    rec.set_build_started_carrier(build_started_event(1, clock.now()));
    clock.advance(5);
    rec.route(&project_started_event(1, "proj", clock.now())).unwrap();

    let received = listener.received();
    assert_eq!(received[0].0, Channel::BuildStarted);
    match &received[0].1 {
        Event::BuildStarted { .. } => {}
        other => panic!("expected synthesized BuildStarted, got {other:?}"),
    }
}

#[test]
fn project_started_without_any_carrier_synthesizes_an_empty_one() {
    let clock = FakeClock::new();
    let rec = record(clock.clone());
    let listener = RecordingListener::new();
    rec.attach(listener.clone()).unwrap();

    rec.route(&project_started_event(1, "proj", clock.now())).unwrap();

    let received = listener.received();
    assert!(matches!(received[0].1, Event::BuildStarted { .. }));
}

#[test]
fn raw_build_started_is_suppressed_before_the_record_is_active() {
    let clock = FakeClock::new();
    let rec = record(clock.clone());
    let listener = RecordingListener::new();
    rec.attach(listener.clone()).unwrap();

    rec.route(&build_started_event(1, clock.now())).unwrap();

    assert!(listener.received().is_empty());
}

#[test]
fn matching_project_finished_synthesizes_build_finished_and_shuts_down() {
    let clock = FakeClock::new();
    let rec = record(clock.clone());
    let listener = RecordingListener::new();
    rec.attach(listener.clone()).unwrap();

    rec.route(&project_started_event(1, "proj", clock.now())).unwrap();
    rec.route(&project_finished_event(1, "proj", clock.now(), true)).unwrap();

    let received = listener.received();
    let last_kind = received.last().unwrap().1.channel();
    assert_eq!(last_kind, Channel::Any);
    let build_finished = received
        .iter()
        .find(|(c, _)| *c == Channel::BuildFinished)
        .expect("build:finished delivered");
    match &build_finished.1 {
        Event::BuildFinished { success, .. } => assert!(*success),
        other => panic!("expected BuildFinished, got {other:?}"),
    }
    assert!(rec.is_terminal());
    assert!(listener.was_shut_down());
}

#[test]
fn shutdown_is_idempotent() {
    let rec = record(FakeClock::new());
    let listener = RecordingListener::new();
    rec.attach(listener.clone()).unwrap();

    rec.shutdown();
    rec.shutdown();

    assert!(rec.is_terminal());
}

#[test]
fn shutdown_before_any_project_started_skips_the_build_brackets() {
    let rec = record(FakeClock::new());
    let listener = RecordingListener::new();
    rec.attach(listener.clone()).unwrap();

    rec.shutdown();

    assert!(listener.was_initialized());
    assert!(listener.was_shut_down());
    assert!(listener.received().is_empty());
}

#[test]
fn a_listener_fault_does_not_stop_delivery_to_its_siblings_for_the_same_event() {
    let clock = FakeClock::new();
    let rec = record(clock.clone());
    let faulting = FaultingListener::new(Channel::Message, SubmissionId::new(1));
    let sibling = RecordingListener::new();
    rec.attach(faulting.clone()).unwrap();
    rec.attach(sibling.clone()).unwrap();

    let err = rec.route(&message_event(1, "hi", clock.now())).unwrap_err();

    assert!(!err.is_polite());
    assert_eq!(sibling.received().len(), 2);
}

#[test]
fn a_fault_shuts_the_whole_record_down_so_later_events_are_dropped() {
    let clock = FakeClock::new();
    let rec = record(clock.clone());
    let faulting = FaultingListener::new(Channel::Message, SubmissionId::new(1));
    let sibling = RecordingListener::new();
    rec.attach(faulting.clone()).unwrap();
    rec.attach(sibling.clone()).unwrap();

    rec.route(&message_event(1, "boom", clock.now())).unwrap_err();
    rec.route(&message_event(1, "after", clock.now())).unwrap();

    assert!(rec.is_terminal());
    assert!(faulting.was_shut_down());
    assert!(sibling.was_shut_down());
    assert_eq!(sibling.received().len(), 2);
}

#[test]
fn polite_fault_is_reported_as_polite() {
    let clock = FakeClock::new();
    let rec = record(clock.clone());
    let faulting = FaultingListener::polite(Channel::Message, SubmissionId::new(1));
    rec.attach(faulting).unwrap();

    let err = rec.route(&message_event(1, "hi", clock.now())).unwrap_err();

    assert!(err.is_polite());
}
