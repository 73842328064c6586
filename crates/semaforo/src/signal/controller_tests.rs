// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::*;
use crate::store::{CameraState, LightColor, StateStore};
use crate::vehicle::{ClassCounts, CongestionThresholds};

fn timings() -> Timings {
    Timings {
        green_min: Duration::from_secs(10),
        green_max: Duration::from_secs(60),
        yellow: Duration::from_secs(5),
        all_red: Duration::from_secs(3),
        emergency_hold: Duration::from_secs(15),
        emergency_min_green: Duration::from_secs(10),
    }
}

fn start_controller(store: &Arc<StateStore>) -> CancellationToken {
    let shutdown = CancellationToken::new();
    SignalController::new(Arc::clone(store), timings(), shutdown.clone()).spawn();
    shutdown
}

fn set_counts(store: &StateStore, camera_id: usize, counts: ClassCounts) {
    store.update(camera_id, CameraState::from_counts(camera_id, counts));
}

async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[tokio::test(start_paused = true)]
async fn initial_pattern_published() {
    let store = Arc::new(StateStore::new(CongestionThresholds::default()));
    let shutdown = start_controller(&store);

    advance(Duration::from_millis(100)).await;
    let lights = store.get_lights();
    assert_eq!(lights.group_2.current_color, LightColor::Green);
    assert_eq!(lights.group_1.current_color, LightColor::Red);

    shutdown.cancel();
}

#[tokio::test(start_paused = true)]
async fn quiet_intersection_cycles_with_balanced_timing() {
    let store = Arc::new(StateStore::new(CongestionThresholds::default()));
    let shutdown = start_controller(&store);

    // Zero counts → G2 green for green_min + 10 = 20s.
    advance(Duration::from_secs(19)).await;
    assert_eq!(store.get_lights().group_2.current_color, LightColor::Green);

    advance(Duration::from_secs(2)).await;
    assert_eq!(store.get_lights().group_2.current_color, LightColor::Yellow);

    // Yellow 5s → all-red 3s → G1 green.
    advance(Duration::from_secs(5)).await;
    let lights = store.get_lights();
    assert_eq!(lights.group_1.current_color, LightColor::Red);
    assert_eq!(lights.group_2.current_color, LightColor::Red);

    advance(Duration::from_secs(4)).await;
    assert_eq!(store.get_lights().group_1.current_color, LightColor::Green);

    shutdown.cancel();
}

#[tokio::test(start_paused = true)]
async fn saturated_group_gets_green_max() {
    let store = Arc::new(StateStore::new(CongestionThresholds::default()));

    // G1 cameras saturated (weighted 20 each → group 40 → high), G2 empty.
    let heavy = ClassCounts { car: 10, truck: 2, ..Default::default() };
    set_counts(&store, 0, heavy);
    set_counts(&store, 2, heavy);

    let shutdown = start_controller(&store);

    // G2 starts green with (low, high) → green_min = 10s, then hands over.
    advance(Duration::from_secs(20)).await;
    assert_eq!(store.get_lights().group_1.current_color, LightColor::Green);

    // G1 holds green_max = 60s.
    advance(Duration::from_secs(56)).await;
    assert_eq!(store.get_lights().group_1.current_color, LightColor::Green);
    advance(Duration::from_secs(4)).await;
    assert_eq!(store.get_lights().group_1.current_color, LightColor::Yellow);

    shutdown.cancel();
}

#[tokio::test(start_paused = true)]
async fn ambulance_preemption_and_recovery() {
    let store = Arc::new(StateStore::new(CongestionThresholds::default()));
    let shutdown = start_controller(&store);

    advance(Duration::from_secs(2)).await;
    assert_eq!(store.get_lights().group_2.current_color, LightColor::Green);

    // Ambulance on camera 2 (a G1 approach).
    set_counts(&store, 2, ClassCounts { ambulance: 1, ..Default::default() });

    // Within yellow + all_red (+ one tick of scan latency) G1 is green.
    advance(Duration::from_secs(10)).await;
    let lights = store.get_lights();
    assert_eq!(lights.group_1.current_color, LightColor::Green);
    assert_eq!(lights.group_2.current_color, LightColor::Red);
    assert!(store.get_emergency().active);
    assert_eq!(store.get_emergency().emergency_camera, Some(2));

    // Green holds at least emergency_min_green.
    advance(Duration::from_secs(9)).await;
    assert_eq!(store.get_lights().group_1.current_color, LightColor::Green);

    // Ambulance clears; after emergency_hold the mode drops and normal
    // control resumes.
    set_counts(&store, 2, ClassCounts::default());
    advance(Duration::from_secs(17)).await;
    assert!(!store.get_emergency().active);

    shutdown.cancel();
}

#[tokio::test(start_paused = true)]
async fn emergency_refreshes_while_ambulance_remains() {
    let store = Arc::new(StateStore::new(CongestionThresholds::default()));
    let shutdown = start_controller(&store);

    set_counts(&store, 1, ClassCounts { ambulance: 1, ..Default::default() });
    advance(Duration::from_secs(30)).await;
    // Well past a single emergency_hold, still active: sighting refreshes it.
    assert!(store.get_emergency().active);
    assert_eq!(store.get_emergency().emergency_camera, Some(1));

    shutdown.cancel();
}

#[tokio::test(start_paused = true)]
async fn safety_invariant_held_throughout() {
    let store = Arc::new(StateStore::new(CongestionThresholds::default()));
    let shutdown = start_controller(&store);

    for second in 0..180u64 {
        // Stir demand and a mid-run emergency.
        if second == 40 {
            set_counts(&store, 0, ClassCounts { truck: 5, ..Default::default() });
        }
        if second == 80 {
            set_counts(&store, 3, ClassCounts { ambulance: 1, ..Default::default() });
        }
        if second == 100 {
            set_counts(&store, 3, ClassCounts::default());
        }

        advance(Duration::from_secs(1)).await;
        let lights = store.get_lights();
        let non_red = [lights.group_1.current_color, lights.group_2.current_color]
            .into_iter()
            .filter(|c| *c != LightColor::Red)
            .count();
        assert!(non_red <= 1, "both groups non-red at t={second}");
    }

    shutdown.cancel();
}

#[tokio::test(start_paused = true)]
async fn degraded_camera_reads_as_empty() {
    let store = Arc::new(StateStore::new(CongestionThresholds::default()));
    store.mark_degraded(0);
    store.mark_degraded(2);

    let shutdown = start_controller(&store);

    // Degraded G1 contributes zero weight → balanced timing, no stall.
    advance(Duration::from_secs(21)).await;
    assert_eq!(store.get_lights().group_2.current_color, LightColor::Yellow);

    shutdown.cancel();
}
