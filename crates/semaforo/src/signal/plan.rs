// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadline-scheduled two-group light state machine.
//!
//! Transitions never sleep: each applied change records the next pending
//! change and returns, and the controller tick applies whatever has come
//! due. A pending `Red → Green` is granted only while the sibling group is
//! red, so no reachable state has both groups green or yellow.

use std::time::Duration;

use tokio::time::Instant;

use crate::store::{LightColor, LightGroup};
use crate::vehicle::CongestionLevel;

/// Phase durations driving the machine.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub green_min: Duration,
    pub green_max: Duration,
    pub yellow: Duration,
    pub all_red: Duration,
    pub emergency_hold: Duration,
    pub emergency_min_green: Duration,
}

impl Timings {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            green_min: config.green_min_duration(),
            green_max: config.green_max_duration(),
            yellow: config.yellow_duration(),
            all_red: config.all_red_duration(),
            emergency_hold: config.emergency_hold_duration(),
            emergency_min_green: config.emergency_min_green_duration(),
        }
    }
}

/// Demand-sensitive green duration, clamped to [green_min, green_max].
pub fn green_duration(
    this: CongestionLevel,
    other: CongestionLevel,
    timings: &Timings,
) -> Duration {
    use CongestionLevel::{High, Low};
    let base = match (this, other) {
        (High, Low) => timings.green_max,
        (High, High) => timings.green_min + Duration::from_secs(20),
        (Low, High) => timings.green_min,
        _ => timings.green_min + Duration::from_secs(10),
    };
    base.clamp(timings.green_min, timings.green_max)
}

/// A scheduled color change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingChange {
    pub color: LightColor,
    pub at: Instant,
}

/// Current color plus the next scheduled change for one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPlan {
    pub color: LightColor,
    pub next: Option<PendingChange>,
}

/// An applied transition, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub group: LightGroup,
    pub from: LightColor,
    pub to: LightColor,
}

/// Inputs to one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    pub now: Instant,
    /// Congestion per group, indexed by `LightGroup::index()`.
    pub congestion: [CongestionLevel; 2],
    /// Group that must end up green for an active emergency.
    pub emergency: Option<LightGroup>,
    /// While set, the emergency group's green deadline is pushed out to at
    /// least this instant.
    pub hold_green_until: Option<Instant>,
}

/// The two-group plan. Owned exclusively by the signal controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightPlan {
    groups: [GroupPlan; 2],
}

impl LightPlan {
    /// Startup pattern: G2 green for `g2_green`, G1 red with a pending green
    /// far enough out that G2 reaches yellow first; the pending is normally
    /// superseded by G2's own `Yellow → Red` rescheduling.
    pub fn initial(now: Instant, g2_green: Duration) -> Self {
        Self {
            groups: [
                GroupPlan {
                    color: LightColor::Red,
                    next: Some(PendingChange {
                        color: LightColor::Green,
                        at: now + Duration::from_secs(30),
                    }),
                },
                GroupPlan {
                    color: LightColor::Green,
                    next: Some(PendingChange { color: LightColor::Yellow, at: now + g2_green }),
                },
            ],
        }
    }

    pub fn group(&self, g: LightGroup) -> GroupPlan {
        self.groups[g.index()]
    }

    /// The group currently green or yellow, if any.
    pub fn active_side(&self) -> Option<LightGroup> {
        LightGroup::BOTH
            .into_iter()
            .find(|g| self.groups[g.index()].color != LightColor::Red)
    }

    /// Apply one tick: emergency steering first, then due transitions.
    pub fn step(&mut self, input: &TickInput, timings: &Timings) -> Vec<Transition> {
        let mut applied = Vec::new();

        if let Some(emergency) = input.emergency {
            self.steer_emergency(emergency, input, timings, &mut applied);
        }

        for group in LightGroup::BOTH {
            self.apply_due(group, input, timings, &mut applied);
        }

        debug_assert!(
            self.groups.iter().filter(|g| g.color != LightColor::Red).count() <= 1,
            "both groups non-red"
        );
        applied
    }

    /// Drive toward a green for the emergency group without ever skipping
    /// the yellow and all-red phases.
    fn steer_emergency(
        &mut self,
        emergency: LightGroup,
        input: &TickInput,
        timings: &Timings,
        applied: &mut Vec<Transition>,
    ) {
        let other = emergency.sibling();

        match self.groups[other.index()].color {
            // The conflicting group holds the green: start closing it now.
            LightColor::Green => {
                self.groups[other.index()] = GroupPlan {
                    color: LightColor::Yellow,
                    next: Some(PendingChange {
                        color: LightColor::Red,
                        at: input.now + timings.yellow,
                    }),
                };
                applied.push(Transition {
                    group: other,
                    from: LightColor::Green,
                    to: LightColor::Yellow,
                });
            }
            // Mid-yellow: let the safe sequence finish on its own.
            LightColor::Yellow => {}
            LightColor::Red => {
                // All-red interlock: make sure the pending green targets the
                // emergency group, not whoever was scheduled next.
                if self.groups[emergency.index()].color == LightColor::Red {
                    if let Some(pending) = self.groups[other.index()].next {
                        if pending.color == LightColor::Green {
                            self.groups[other.index()].next = None;
                            self.groups[emergency.index()].next = Some(pending);
                        }
                    }
                }
            }
        }

        // Hold the emergency green while the emergency lasts.
        if self.groups[emergency.index()].color == LightColor::Green {
            if let (Some(hold_until), Some(pending)) =
                (input.hold_green_until, self.groups[emergency.index()].next.as_mut())
            {
                if pending.color == LightColor::Yellow && pending.at < hold_until {
                    pending.at = hold_until;
                }
            }
        }
    }

    fn apply_due(
        &mut self,
        group: LightGroup,
        input: &TickInput,
        timings: &Timings,
        applied: &mut Vec<Transition>,
    ) {
        let idx = group.index();
        let Some(pending) = self.groups[idx].next else { return };
        if pending.at > input.now {
            return;
        }

        let from = self.groups[idx].color;
        match (from, pending.color) {
            (LightColor::Green, LightColor::Yellow) => {
                self.groups[idx] = GroupPlan {
                    color: LightColor::Yellow,
                    next: Some(PendingChange {
                        color: LightColor::Red,
                        at: input.now + timings.yellow,
                    }),
                };
            }
            (LightColor::Yellow, LightColor::Red) => {
                self.groups[idx] = GroupPlan { color: LightColor::Red, next: None };
                // The sibling goes green once the all-red interlock elapses.
                self.groups[group.sibling().index()].next = Some(PendingChange {
                    color: LightColor::Green,
                    at: input.now + timings.all_red,
                });
            }
            (LightColor::Red, LightColor::Green) => {
                // Grant green only from an all-red interlock; otherwise drop
                // the stale schedule; the sibling's `Yellow → Red` will
                // reschedule it.
                if self.groups[group.sibling().index()].color != LightColor::Red {
                    self.groups[idx].next = None;
                    return;
                }
                let mut duration = green_duration(
                    input.congestion[idx],
                    input.congestion[group.sibling().index()],
                    timings,
                );
                if input.emergency == Some(group) {
                    duration = duration.max(timings.emergency_min_green);
                }
                self.groups[idx] = GroupPlan {
                    color: LightColor::Green,
                    next: Some(PendingChange {
                        color: LightColor::Yellow,
                        at: input.now + duration,
                    }),
                };
            }
            // Stale or invalid pending change: drop it.
            _ => {
                self.groups[idx].next = None;
                return;
            }
        }
        applied.push(Transition { group, from, to: self.groups[idx].color });
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
