// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tokio::task::JoinHandle;
use zb_adapters::FakeNamespace;
use zb_core::{NameSource, NumberedNames};

fn session(
    ns: &FakeNamespace,
    variant: Variant,
    subgroup: Option<&str>,
    name: &str,
    quorum: usize,
) -> BarrierSession<FakeNamespace> {
    let layout = BarrierLayout::new(variant, "/b1", subgroup.map(String::from)).unwrap();
    BarrierSession::new(ns.connect(), layout, name, quorum).unwrap()
}

/// Spawn `count` participants that enter and then leave
fn run_round(
    ns: &FakeNamespace,
    variant: Variant,
    subgroup: Option<&str>,
    count: usize,
) -> Vec<JoinHandle<Result<(), BarrierError>>> {
    let ids = NumberedNames::default();
    (0..count)
        .map(|_| {
            let mut participant = session(ns, variant, subgroup, &ids.next_name(), count);
            tokio::spawn(async move {
                participant.enter().await?;
                participant.leave().await
            })
        })
        .collect()
}

#[tokio::test]
async fn quorum_participants_all_pass_and_leave_no_residue() {
    let ns = FakeNamespace::new();
    for handle in run_round(&ns, Variant::Double, None, 4) {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(ns.paths(), vec!["/b1"]);
    assert!(ns.peak_watched_entries("/b1") <= 2);
}

#[tokio::test]
async fn exactly_one_marker_after_last_enter() {
    let ns = FakeNamespace::new();
    let mut handles = Vec::new();
    for name in ["a", "b", "c"] {
        let mut participant = session(&ns, Variant::Double, None, name, 3);
        handles.push(tokio::spawn(async move {
            participant.enter().await?;
            Ok::<_, BarrierError>(participant)
        }));
    }
    let mut entered = Vec::new();
    for handle in handles {
        entered.push(handle.await.unwrap().unwrap());
    }

    let children = ns.child_names("/b1");
    assert_eq!(children.iter().filter(|c| *c == "ready").count(), 1);
    assert_eq!(children.len(), 4);
    for participant in &entered {
        assert!(participant.identity().is_some());
        assert!(ns.node_exists(&participant.entry_path().unwrap()));
    }
}

#[tokio::test]
async fn restricted_round_removes_subgroup_and_root() {
    let ns = FakeNamespace::new();
    for handle in run_round(&ns, Variant::Restricted, Some("g1"), 3) {
        handle.await.unwrap().unwrap();
    }

    assert!(ns.paths().is_empty());
}

#[tokio::test]
async fn plain_round_drains_and_keeps_root() {
    let ns = FakeNamespace::new();
    for handle in run_round(&ns, Variant::Plain, None, 3) {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(ns.paths(), vec!["/b1"]);
}

#[tokio::test]
async fn enter_twice_is_rejected() {
    let ns = FakeNamespace::new();
    let mut participant = session(&ns, Variant::Double, None, "a", 1);
    participant.enter().await.unwrap();

    assert!(matches!(
        participant.enter().await,
        Err(BarrierError::AlreadyEntered(_))
    ));
}

#[tokio::test]
async fn leave_without_enter_is_rejected() {
    let ns = FakeNamespace::new();
    let mut participant = session(&ns, Variant::Double, None, "a", 1);

    assert!(matches!(
        participant.leave().await,
        Err(BarrierError::NotEntered)
    ));
}

#[test]
fn zero_quorum_is_rejected() {
    let layout = BarrierLayout::new(Variant::Double, "/b1", None).unwrap();
    let result = BarrierSession::new(FakeNamespace::new(), layout, "a", 0);
    assert!(matches!(result, Err(BarrierError::ZeroQuorum)));
}

#[test]
fn participant_name_must_be_a_single_segment() {
    let layout = BarrierLayout::new(Variant::Double, "/b1", None).unwrap();
    let result = BarrierSession::new(FakeNamespace::new(), layout, "a/b", 1);
    assert!(matches!(result, Err(BarrierError::Layout(_))));
}

#[tokio::test]
async fn crashed_participant_counts_as_departed() {
    let ns = FakeNamespace::new();
    let mut survivor = session(&ns, Variant::Double, None, "a", 2);
    let mut crashed = session(&ns, Variant::Double, None, "b", 2);

    let survivor_task = tokio::spawn(async move {
        survivor.enter().await?;
        survivor.leave().await?;
        Ok::<_, BarrierError>(survivor)
    });
    crashed.enter().await.unwrap();
    crashed.namespace().expire();

    let survivor = survivor_task.await.unwrap().unwrap();
    assert!(survivor.identity().is_none());
    assert_eq!(ns.paths(), vec!["/b1"]);
}

#[tokio::test]
async fn close_releases_held_entry() {
    let ns = FakeNamespace::new();
    let mut participant = session(&ns, Variant::Double, None, "a", 1);
    participant.enter().await.unwrap();
    let entry = participant.entry_path().unwrap();

    participant.close().await.unwrap();

    assert!(!ns.node_exists(&entry));
}

#[tokio::test]
async fn transient_failure_keeps_entry_for_retry() {
    let ns = FakeNamespace::new();
    let mut participant = session(&ns, Variant::Double, None, "a", 1);
    participant.enter().await.unwrap();
    participant.namespace().expire();

    let err = participant.leave().await.unwrap_err();
    assert!(err.is_transient());
    assert!(participant.identity().is_some());
}

#[tokio::test]
async fn small_channel_still_wakes_every_waiter() {
    let ns = FakeNamespace::new();
    let mut handles = Vec::new();
    for name in ["a", "b", "c", "d"] {
        let mut participant = session(&ns, Variant::Double, None, name, 4).with_capacity(1);
        handles.push(tokio::spawn(async move {
            participant.enter().await?;
            participant.leave().await?;
            Ok::<_, BarrierError>(participant)
        }));
    }
    for handle in handles {
        let participant = handle.await.unwrap().unwrap();
        assert!(participant.wakeups() > 0);
    }

    assert_eq!(ns.paths(), vec!["/b1"]);
}

#[tokio::test(start_paused = true)]
async fn next_round_waits_for_previous_marker_removal() {
    let ns = FakeNamespace::new();
    let mut low = session(&ns, Variant::Double, None, "low", 2);
    let mut high = session(&ns, Variant::Double, None, "high", 2);

    let low_task = tokio::spawn(async move {
        low.enter().await?;
        Ok::<_, BarrierError>(low)
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    high.enter().await.unwrap();
    let low = low_task.await.unwrap().unwrap();
    let low_entry = low.entry_path().unwrap();

    let leaving = tokio::spawn(async move {
        high.leave().await?;
        Ok::<_, BarrierError>(high)
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Halfway through the lowest's teardown: entry gone, marker still there
    ns.delete(&low_entry, None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!leaving.is_finished());

    let mut next = session(&ns, Variant::Double, None, "next", 2);
    let next_task = tokio::spawn(async move {
        next.enter().await?;
        Ok::<_, BarrierError>(next)
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!next_task.is_finished());
    assert_eq!(ns.child_names("/b1"), vec!["ready"]);

    ns.delete("/b1/ready", None).await.unwrap();
    let mut high = leaving.await.unwrap().unwrap();
    assert!(high.identity().is_none());

    // A lone entrant of the new round stays below quorum
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!next_task.is_finished());
    assert!(!ns.node_exists("/b1/ready"));

    high.enter().await.unwrap();
    let next = next_task.await.unwrap().unwrap();
    assert!(next.identity().is_some());
    assert!(ns.node_exists("/b1/ready"));
}

#[tokio::test]
async fn intermediate_stage_leave_keeps_subgroup() {
    let ns = FakeNamespace::new();
    let mut participant = session(&ns, Variant::Nested, Some("g1"), "a", 1);

    participant.enter_stage(Some("s1")).await.unwrap();
    participant.leave_stage(false).await.unwrap();

    assert!(!ns.node_exists("/b1/g1/s1"));
    assert!(ns.node_exists("/b1/g1"));
    assert!(ns.node_exists("/b1"));

    participant.enter_stage(Some("s2")).await.unwrap();
    assert!(ns.node_exists("/b1/g1/s2/ready"));
    participant.leave_stage(true).await.unwrap();

    assert!(ns.paths().is_empty());
}
