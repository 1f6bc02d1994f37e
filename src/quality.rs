use crate::scale::{ScaleLevel, ScaleRegistry};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered render-fidelity setting shared by the governor, the user and the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Low,
    Medium,
    #[default]
    High,
    Ultra,
}

impl QualityTier {
    pub const ALL: [QualityTier; 4] = [QualityTier::Low, QualityTier::Medium, QualityTier::High, QualityTier::Ultra];

    pub fn lower(self) -> Option<Self> {
        match self {
            QualityTier::Low => None,
            QualityTier::Medium => Some(QualityTier::Low),
            QualityTier::High => Some(QualityTier::Medium),
            QualityTier::Ultra => Some(QualityTier::High),
        }
    }

    pub fn higher(self) -> Option<Self> {
        match self {
            QualityTier::Low => Some(QualityTier::Medium),
            QualityTier::Medium => Some(QualityTier::High),
            QualityTier::High => Some(QualityTier::Ultra),
            QualityTier::Ultra => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QualityTier::Low => "low",
            QualityTier::Medium => "medium",
            QualityTier::High => "high",
            QualityTier::Ultra => "ultra",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QualityTier {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match QualityTier::ALL.iter().find(|tier| tier.label() == normalized) {
            Some(tier) => Ok(*tier),
            None => bail!("Unknown quality '{value}'. Use low, medium, high or ultra."),
        }
    }
}

/// Scalar applied to a level's LOD tier. Lower quality coarsens detail.
pub fn quality_multiplier(quality: QualityTier) -> f32 {
    match quality {
        QualityTier::Low => 2.0,
        QualityTier::Medium => 1.5,
        QualityTier::High => 1.0,
        QualityTier::Ultra => 0.5,
    }
}

pub fn camera_distance_for(registry: &ScaleRegistry, level: ScaleLevel) -> f32 {
    registry.lookup(level).default_camera_distance
}

/// `(min, max)` distance consumers may zoom to at `level`.
pub fn camera_bounds_for(registry: &ScaleRegistry, level: ScaleLevel) -> (f32, f32) {
    let info = registry.lookup(level);
    (info.min_camera_distance, info.max_camera_distance)
}

pub fn lod_for(registry: &ScaleRegistry, level: ScaleLevel, quality: QualityTier) -> u32 {
    let scaled = registry.lookup(level).lod_level as f32 * quality_multiplier(quality);
    scaled.round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_step_with_floor_and_ceiling() {
        assert_eq!(QualityTier::Low.lower(), None);
        assert_eq!(QualityTier::Ultra.higher(), None);
        assert_eq!(QualityTier::Medium.higher(), Some(QualityTier::High));
        assert!(QualityTier::Low < QualityTier::Ultra);
    }

    #[test]
    fn multipliers_stay_in_expected_range() {
        for tier in QualityTier::ALL {
            let multiplier = quality_multiplier(tier);
            assert!((0.5..=2.0).contains(&multiplier), "{tier}: {multiplier}");
        }
    }

    #[test]
    fn lod_coarsens_as_quality_drops() {
        let registry = ScaleRegistry::standard();
        assert_eq!(lod_for(&registry, ScaleLevel::Galactic, QualityTier::High), 3);
        assert_eq!(lod_for(&registry, ScaleLevel::Galactic, QualityTier::Low), 6);
        assert_eq!(lod_for(&registry, ScaleLevel::Galactic, QualityTier::Ultra), 2);
        assert_eq!(lod_for(&registry, ScaleLevel::Human, QualityTier::Low), 0);
    }

    #[test]
    fn camera_values_come_from_registry() {
        let registry = ScaleRegistry::standard();
        assert_eq!(camera_distance_for(&registry, ScaleLevel::Human), 10.0);
        assert_eq!(camera_bounds_for(&registry, ScaleLevel::Human), (1.0, 50.0));
    }

    #[test]
    fn parses_quality_names() {
        assert_eq!(" Ultra ".parse::<QualityTier>().unwrap(), QualityTier::Ultra);
        assert!("cinematic".parse::<QualityTier>().is_err());
    }
}
