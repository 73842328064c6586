// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end controller scenarios over the HTTP surface, under a paused
//! clock.

use std::time::Duration;

use semaforo::vehicle::ClassCounts;
use semaforo_specs::{advance, rig};

#[tokio::test(start_paused = true)]
async fn baseline_cycle_observable_over_semaphore_api() -> anyhow::Result<()> {
    let rig = rig(&[])?;
    assert!(rig.toggle().await);
    advance(1).await;

    // All cameras quiet: G2 starts green for green_min + 10 = 20s.
    assert_eq!(rig.color("group_2").await, "green");
    assert_eq!(rig.color("group_1").await, "red");

    advance(18).await;
    assert_eq!(rig.color("group_2").await, "green");

    advance(2).await;
    assert_eq!(rig.color("group_2").await, "yellow");

    // Yellow 5s, then the all-red interlock.
    advance(5).await;
    assert_eq!(rig.color("group_2").await, "red");
    assert_eq!(rig.color("group_1").await, "red");

    // All-red 3s, then G1 gets its green for green_min + 10.
    advance(4).await;
    assert_eq!(rig.color("group_1").await, "green");

    advance(17).await;
    assert_eq!(rig.color("group_1").await, "green");
    advance(3).await;
    assert_eq!(rig.color("group_1").await, "yellow");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn congested_approach_holds_green_max() -> anyhow::Result<()> {
    let rig = rig(&[])?;

    // Cameras 0 and 2 (G1) saturated: weighted 20 each → group 40 → high.
    let heavy = ClassCounts { car: 10, truck: 2, ..Default::default() };
    rig.set_counts(0, heavy);
    rig.set_counts(2, heavy);

    assert!(rig.toggle().await);

    // Whenever G1's green arrives, it lasts the full green_max = 60s.
    rig.wait_for_color("group_1", "green", 40).await?;

    advance(57).await;
    assert_eq!(rig.color("group_1").await, "green");
    advance(4).await;
    assert_eq!(rig.color("group_1").await, "yellow");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn ambulance_preempts_and_recovers() -> anyhow::Result<()> {
    let rig = rig(&[])?;
    assert!(rig.toggle().await);
    advance(2).await;
    assert_eq!(rig.color("group_2").await, "green");

    // Ambulance appears on camera 2, a G1 approach.
    rig.set_counts(2, ClassCounts { ambulance: 1, ..Default::default() });

    // Full safe sequence: G2 yellow, all-red, then G1 green, within
    // yellow + all_red plus scan/frame latency.
    let waited = rig.wait_for_color("group_1", "green", 12).await?;
    assert!(waited <= 12);

    let state = rig.semaphore_data().await;
    assert_eq!(state["emergency_mode"]["active"], true);
    assert_eq!(state["emergency_mode"]["emergency_camera"], 2);
    assert_eq!(state["semaphore_states"]["group_2"]["current_color"], "red");

    // Emergency green holds at least emergency_min_green.
    advance(9).await;
    assert_eq!(rig.color("group_1").await, "green");

    // Ambulance gone: after emergency_hold the mode clears and normal
    // control resumes.
    rig.set_counts(2, ClassCounts::default());
    advance(18).await;
    let state = rig.semaphore_data().await;
    assert_eq!(state["emergency_mode"]["active"], false);
    assert!(state["emergency_mode"]["emergency_camera"].is_null());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn degraded_camera_reported_and_ignored() -> anyhow::Result<()> {
    let rig = rig(&["--video-path-3", "/nonexistent/approach-3.mjpeg"])?;
    assert!(rig.toggle().await);
    advance(3).await;

    let data = rig.detection_data().await;
    let row = &data["cameras_data"]["camera_3"];
    assert_eq!(row["degraded"], true);
    assert_eq!(row["total"], 0);

    // Other cameras keep reporting.
    rig.set_counts(0, ClassCounts { car: 4, ..Default::default() });
    advance(2).await;
    let data = rig.detection_data().await;
    assert_eq!(data["cameras_data"]["camera_0"]["car"], 4);
    assert_eq!(data["cameras_data"]["camera_0"]["degraded"], false);

    // The controller proceeds treating camera 3 as empty.
    advance(17).await;
    assert_eq!(rig.color("group_2").await, "yellow");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn toggle_stop_freezes_and_restart_goes_live() -> anyhow::Result<()> {
    let rig = rig(&[])?;
    assert!(rig.toggle().await);

    rig.set_counts(1, ClassCounts { bus: 2, ..Default::default() });
    advance(2).await;
    let data = rig.detection_data().await;
    assert_eq!(data["cameras_data"]["camera_1"]["bus"], 2);
    assert_eq!(data["processing"], true);

    // Stop: JSON flags it, counts freeze at their last values.
    assert!(!rig.toggle().await);
    let data = rig.detection_data().await;
    assert_eq!(data["processing"], false);
    assert_eq!(data["cameras_data"]["camera_1"]["bus"], 2);

    rig.set_counts(1, ClassCounts { bus: 7, ..Default::default() });
    advance(5).await;
    assert_eq!(rig.detection_data().await["cameras_data"]["camera_1"]["bus"], 2);

    // While stopped both lights are red.
    let state = rig.semaphore_data().await;
    assert_eq!(state["semaphore_states"]["group_1"]["current_color"], "red");
    assert_eq!(state["semaphore_states"]["group_2"]["current_color"], "red");

    // Restart: counts return to live updates within two frame intervals.
    assert!(rig.toggle().await);
    advance(1).await;
    let data = rig.detection_data().await;
    assert_eq!(data["processing"], true);
    assert_eq!(data["cameras_data"]["camera_1"]["bus"], 7);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn slow_subscriber_never_stalls_the_worker() -> anyhow::Result<()> {
    let rig = rig(&[])?;
    assert!(rig.toggle().await);
    advance(1).await;

    // Subscribe but never poll while the worker keeps running.
    let mut reader = rig.app.mailboxes[0].subscribe();
    let before = rig.detection_data().await["cameras_data"]["camera_0"]["last_update_ms"]
        .as_u64()
        .unwrap_or(0);

    advance(5).await;

    // The worker kept updating its row at its own cadence.
    let after = rig.detection_data().await["cameras_data"]["camera_0"]["last_update_ms"]
        .as_u64()
        .unwrap_or(0);
    assert!(after >= before);

    // The stalled subscriber picks up the newest frame, not a backlog.
    match reader.next_frame(Duration::from_secs(1)).await {
        semaforo::mailbox::FrameWait::Frame(jpeg) => {
            assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        }
        other => anyhow::bail!("expected a frame, got {other:?}"),
    }

    rig.toggle().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn repeated_snapshots_stable_without_writers() -> anyhow::Result<()> {
    let rig = rig(&[])?;
    // Processing never started: no writers anywhere.
    let a = rig.detection_data().await;
    let b = rig.detection_data().await;
    assert_eq!(a, b);
    Ok(())
}
