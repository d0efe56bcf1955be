// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::{Arc, Mutex};
use zb_adapters::FakeNamespace;
use zb_core::BarrierLayout;

fn stages() -> Vec<String> {
    vec!["s1".to_string(), "s2".to_string(), "s3".to_string()]
}

fn controller(ns: &FakeNamespace, group: &str, name: &str) -> StageController<FakeNamespace> {
    let layout = BarrierLayout::new(Variant::Nested, "/b1", Some(group.to_string())).unwrap();
    let session = BarrierSession::new(ns.connect(), layout, name, 2).unwrap();
    StageController::new(session, stages()).unwrap()
}

type StageLog = Arc<Mutex<Vec<(String, String, bool)>>>;

/// Run a controller whose work records each stage and whether its marker
/// was present while working
fn spawn_run(
    ns: &FakeNamespace,
    group: &'static str,
    who: &'static str,
    log: StageLog,
) -> tokio::task::JoinHandle<Result<(), BarrierError>> {
    let mut controller = controller(ns, group, who);
    let ns = ns.clone();
    tokio::spawn(async move {
        controller
            .run_stages(|stage| {
                let marked = ns.node_exists(&format!("/b1/{}/{}/ready", group, stage));
                log.lock().unwrap().push((who.to_string(), stage, marked));
                async {}
            })
            .await
    })
}

fn stages_run_by(log: &StageLog, who: &str) -> Vec<String> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|(participant, _, _)| participant == who)
        .map(|(_, stage, _)| stage.clone())
        .collect()
}

#[tokio::test]
async fn three_stages_run_in_order_and_clean_up() {
    let ns = FakeNamespace::new();
    let log = StageLog::default();

    let a = spawn_run(&ns, "g1", "a", log.clone());
    let b = spawn_run(&ns, "g1", "b", log.clone());
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(stages_run_by(&log, "a"), stages());
    assert_eq!(stages_run_by(&log, "b"), stages());
    assert!(log.lock().unwrap().iter().all(|(_, _, marked)| *marked));
    assert!(ns.paths().is_empty());
}

/// What a participant saw of the namespace while working in one stage
#[derive(Debug)]
struct StageView {
    stage: String,
    subgroup: bool,
    root: bool,
    previous_stage: bool,
}

#[tokio::test]
async fn later_stages_start_after_previous_stage_is_removed() {
    let ns = FakeNamespace::new();
    let views = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for who in ["a", "b"] {
        let mut controller = controller(&ns, "g1", who);
        assert_eq!(controller.stages(), stages().as_slice());
        assert_eq!(controller.session().quorum(), 2);

        let (ns, views) = (ns.clone(), views.clone());
        handles.push(tokio::spawn(async move {
            controller
                .run_stages(|stage| {
                    let position = stages().iter().position(|s| *s == stage).unwrap_or(0);
                    let previous_stage = position
                        .checked_sub(1)
                        .map(|prev| ns.node_exists(&format!("/b1/g1/{}", stages()[prev])))
                        .unwrap_or(false);
                    views.lock().unwrap().push(StageView {
                        stage,
                        subgroup: ns.node_exists("/b1/g1"),
                        root: ns.node_exists("/b1"),
                        previous_stage,
                    });
                    async {}
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let views = views.lock().unwrap();
    for stage in stages() {
        assert_eq!(views.iter().filter(|view| view.stage == stage).count(), 2);
    }
    for view in views.iter() {
        assert!(view.subgroup && view.root, "{:?}", view);
        assert!(!view.previous_stage, "{:?}", view);
    }
    assert!(ns.paths().is_empty());
}

#[tokio::test]
async fn stage_is_gated_until_both_arrive() {
    let ns = FakeNamespace::new();
    let log = StageLog::default();

    let a = spawn_run(&ns, "g1", "a", log.clone());
    tokio::task::yield_now().await;
    assert!(log.lock().unwrap().is_empty());
    assert!(ns.node_exists("/b1/g1/s1"));
    assert!(!ns.node_exists("/b1/g1/s1/ready"));

    let b = spawn_run(&ns, "g1", "b", log.clone());
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();
    assert_eq!(log.lock().unwrap().len(), 6);
}

#[tokio::test]
async fn finishing_group_keeps_shared_root() {
    let ns = FakeNamespace::new();
    let log = StageLog::default();

    // g2 holds the root by entering its first stage and waiting there
    let mut waiting = controller(&ns, "g2", "c").into_session();
    let hold = tokio::spawn(async move { waiting.enter_stage(Some("s1")).await });
    tokio::task::yield_now().await;

    let a = spawn_run(&ns, "g1", "a", log.clone());
    let b = spawn_run(&ns, "g1", "b", log.clone());
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert!(!ns.node_exists("/b1/g1"));
    assert!(ns.node_exists("/b1/g2/s1"));
    assert!(ns.node_exists("/b1"));
    hold.abort();
}

#[test]
fn non_nested_session_is_rejected() {
    let layout = BarrierLayout::new(Variant::Double, "/b1", None).unwrap();
    let session = BarrierSession::new(FakeNamespace::new(), layout, "a", 2).unwrap();

    assert!(matches!(
        StageController::new(session, stages()),
        Err(BarrierError::NotStaged(Variant::Double))
    ));
}

#[test]
fn stage_list_is_validated() {
    let layout = BarrierLayout::new(Variant::Nested, "/b1", Some("g1".into())).unwrap();
    let session = || BarrierSession::new(FakeNamespace::new(), layout.clone(), "a", 2).unwrap();

    assert!(matches!(
        StageController::new(session(), Vec::new()),
        Err(BarrierError::NoStages)
    ));
    assert!(matches!(
        StageController::new(session(), vec!["s1".into(), "s1".into()]),
        Err(BarrierError::DuplicateStage(_))
    ));
    assert!(matches!(
        StageController::new(session(), vec!["ready".into()]),
        Err(BarrierError::Layout(_))
    ));
}
