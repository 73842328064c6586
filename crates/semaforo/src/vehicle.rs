// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed vehicle vocabulary, detector label normalization, and congestion
//! levels.

use serde::{Deserialize, Serialize};

/// Closed set of vehicle classes the controller reasons about.
///
/// Detector models ship with drifting label sets; everything outside this
/// vocabulary is dropped by [`normalize_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Car,
    Truck,
    Bus,
    Ambulance,
    Mototaxi,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 5] =
        [Self::Car, Self::Truck, Self::Bus, Self::Ambulance, Self::Mototaxi];

    /// Effective road-occupancy weight of one vehicle of this class.
    pub fn weight(self) -> f64 {
        match self {
            Self::Car => 1.0,
            Self::Truck => 5.0,
            Self::Bus => 4.0,
            Self::Ambulance => 10.0,
            Self::Mototaxi => 0.7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Truck => "truck",
            Self::Bus => "bus",
            Self::Ambulance => "ambulance",
            Self::Mototaxi => "mototaxi",
        }
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a raw detector label onto the fixed vocabulary.
///
/// Case- and whitespace-insensitive; unknown labels yield `None` and the
/// detection is dropped.
pub fn normalize_label(raw: &str) -> Option<VehicleClass> {
    match raw.trim().to_lowercase().as_str() {
        "car" | "auto" | "coche" | "carro" => Some(VehicleClass::Car),
        "truck" | "camion" => Some(VehicleClass::Truck),
        "bus" | "autobus" | "omnibus" => Some(VehicleClass::Bus),
        "ambulance" | "ambulancia" => Some(VehicleClass::Ambulance),
        "moto" | "motorcycle" | "mototaxi" => Some(VehicleClass::Mototaxi),
        _ => None,
    }
}

/// Per-class vehicle counts for a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCounts {
    pub car: u32,
    pub truck: u32,
    pub bus: u32,
    pub ambulance: u32,
    pub mototaxi: u32,
}

impl ClassCounts {
    pub fn get(&self, class: VehicleClass) -> u32 {
        match class {
            VehicleClass::Car => self.car,
            VehicleClass::Truck => self.truck,
            VehicleClass::Bus => self.bus,
            VehicleClass::Ambulance => self.ambulance,
            VehicleClass::Mototaxi => self.mototaxi,
        }
    }

    pub fn increment(&mut self, class: VehicleClass) {
        match class {
            VehicleClass::Car => self.car += 1,
            VehicleClass::Truck => self.truck += 1,
            VehicleClass::Bus => self.bus += 1,
            VehicleClass::Ambulance => self.ambulance += 1,
            VehicleClass::Mototaxi => self.mototaxi += 1,
        }
    }

    pub fn total(&self) -> u32 {
        VehicleClass::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Σ count·weight across all classes.
    pub fn weighted_total(&self) -> f64 {
        VehicleClass::ALL.iter().map(|c| f64::from(self.get(*c)) * c.weight()).sum()
    }

    /// Element-wise sum, saturating.
    pub fn add(&mut self, other: &ClassCounts) {
        for class in VehicleClass::ALL {
            let sum = self.get(class).saturating_add(other.get(class));
            self.set(class, sum);
        }
    }

    fn set(&mut self, class: VehicleClass, value: u32) {
        match class {
            VehicleClass::Car => self.car = value,
            VehicleClass::Truck => self.truck = value,
            VehicleClass::Bus => self.bus = value,
            VehicleClass::Ambulance => self.ambulance = value,
            VehicleClass::Mototaxi => self.mototaxi = value,
        }
    }
}

/// Coarse congestion label derived from a weighted total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CongestionLevel {
    Low,
    Medium,
    High,
}

impl CongestionLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weighted-total thresholds for one light group (two cameras).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CongestionThresholds {
    /// Weighted total at or above which congestion is medium.
    pub medium: f64,
    /// Weighted total at or above which congestion is high.
    pub high: f64,
}

impl Default for CongestionThresholds {
    fn default() -> Self {
        Self { medium: 8.0, high: 25.0 }
    }
}

impl CongestionThresholds {
    pub fn level(&self, weighted: f64) -> CongestionLevel {
        self.level_scaled(weighted, 1.0)
    }

    /// Thresholds scaled by `scale`, for aggregates spanning more
    /// than one group's worth of cameras.
    pub fn level_scaled(&self, weighted: f64, scale: f64) -> CongestionLevel {
        if weighted < self.medium * scale {
            CongestionLevel::Low
        } else if weighted < self.high * scale {
            CongestionLevel::Medium
        } else {
            CongestionLevel::High
        }
    }
}

#[cfg(test)]
#[path = "vehicle_tests.rs"]
mod tests;
