// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[tokio::test]
async fn wait_returns_delivered_event() {
    let mut channel = NotificationChannel::new(4);
    let notifier = channel.notifier();

    notifier.notify(WatchEvent::new(WatchKind::Created, "/b1/ready"));

    let event = channel.wait().await.unwrap();
    assert_eq!(event, WatchEvent::new(WatchKind::Created, "/b1/ready"));
    assert_eq!(channel.wakeups(), 1);
}

#[tokio::test]
async fn wait_drains_pending_events_in_one_wakeup() {
    let mut channel = NotificationChannel::new(8);
    let notifier = channel.notifier();

    notifier.notify(WatchEvent::new(WatchKind::ChildrenChanged, "/b1"));
    notifier.notify(WatchEvent::new(WatchKind::Deleted, "/b1/a-0000000001"));

    let event = channel.wait().await.unwrap();
    assert_eq!(event.kind, WatchKind::Deleted);
    assert_eq!(channel.wakeups(), 1);

    // Nothing left: a second wait must block
    let pending = tokio::time::timeout(Duration::from_millis(50), channel.wait()).await;
    assert!(pending.is_err());
}

#[tokio::test]
async fn full_channel_coalesces_without_blocking() {
    let mut channel = NotificationChannel::new(1);
    let notifier = channel.notifier();

    for i in 0..10 {
        notifier.notify(WatchEvent::new(WatchKind::Deleted, format!("/b1/e-{:010}", i)));
    }

    let event = channel.wait().await.unwrap();
    assert_eq!(event.path, "/b1/e-0000000000");
}

#[tokio::test]
async fn notify_from_another_task_wakes_waiter() {
    let mut channel = NotificationChannel::default();
    let notifier = channel.notifier();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        notifier.notify(WatchEvent::new(WatchKind::Created, "/b1/ready"));
    });

    let event = tokio::time::timeout(Duration::from_secs(5), channel.wait())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.kind, WatchKind::Created);
}

#[test]
fn sessions_do_not_share_channels() {
    let first = NotificationChannel::default();
    let second = NotificationChannel::default();

    assert!(first.notifier().same_channel(&first.notifier()));
    assert!(!first.notifier().same_channel(&second.notifier()));
}

#[test]
fn notify_after_session_drop_is_silent() {
    let channel = NotificationChannel::new(2);
    let notifier = channel.notifier();
    drop(channel);

    notifier.notify(WatchEvent::new(WatchKind::Deleted, "/b1/ready"));
}
