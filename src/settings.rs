//! Lane and simulation settings
//!
//! Everything here round-trips through JSON so a lane setup can be saved
//! and replayed.

use serde::{Deserialize, Serialize};

use crate::consts::SIM_DT;
use crate::sim::{CollisionTuning, Lane, LaneGeometry, OilPattern, PhysicsSystem};

/// Oil pattern presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OilPatternPreset {
    #[default]
    House,
    Sport,
    Short,
    Long,
}

impl OilPatternPreset {
    pub const ALL: [OilPatternPreset; 4] = [
        OilPatternPreset::House,
        OilPatternPreset::Sport,
        OilPatternPreset::Short,
        OilPatternPreset::Long,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OilPatternPreset::House => "House",
            OilPatternPreset::Sport => "Sport",
            OilPatternPreset::Short => "Short",
            OilPatternPreset::Long => "Long",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "house" | "ths" => Some(OilPatternPreset::House),
            "sport" => Some(OilPatternPreset::Sport),
            "short" => Some(OilPatternPreset::Short),
            "long" => Some(OilPatternPreset::Long),
            _ => None,
        }
    }

    /// Friction profile for this preset
    pub fn pattern(&self) -> OilPattern {
        match self {
            OilPatternPreset::House => OilPattern::default(),
            // Flatter oil: less friction contrast, weaker hook
            OilPatternPreset::Sport => OilPattern {
                oil_friction: 0.98,
                dry_friction: 0.97,
                hook_strength: 0.6,
                oil_end_y: 600.0,
            },
            // Oil stops early: long dry backend, big hook
            OilPatternPreset::Short => OilPattern {
                oil_friction: 0.985,
                dry_friction: 0.955,
                hook_strength: 1.3,
                oil_end_y: 420.0,
            },
            OilPatternPreset::Long => OilPattern {
                oil_friction: 0.988,
                dry_friction: 0.96,
                hook_strength: 0.8,
                oil_end_y: 720.0,
            },
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub oil_pattern: OilPatternPreset,
    /// Seed for the simulation's random source
    pub seed: u64,
    /// Fixed timestep fed to every tick (seconds)
    pub dt: f32,
    pub lane: LaneGeometry,
    pub collision: CollisionTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            oil_pattern: OilPatternPreset::House,
            seed: 1,
            dt: SIM_DT,
            lane: LaneGeometry::default(),
            collision: CollisionTuning::default(),
        }
    }
}

impl Settings {
    /// Default settings on a different oil pattern
    pub fn from_preset(preset: OilPatternPreset) -> Self {
        Self {
            oil_pattern: preset,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn lane(&self) -> Lane {
        Lane::new(self.lane, self.oil_pattern.pattern())
    }

    /// A physics system for this lane, seeded from these settings
    pub fn physics(&self) -> PhysicsSystem {
        PhysicsSystem::new(self.lane(), self.collision, self.seed)
    }
}
