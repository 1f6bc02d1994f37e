use crate::easing::Easing;
use crate::governor::GovernorSettings;
use crate::navigator::{DEFAULT_MAX_HISTORY, DEFAULT_TRANSITION_SECS};
use crate::quality::QualityTier;
use crate::scale::ScaleLevel;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct NavigationConfig {
    #[serde(default = "NavigationConfig::default_initial_scale")]
    pub initial_scale: ScaleLevel,
    #[serde(default = "NavigationConfig::default_transition_duration")]
    pub transition_duration_secs: f32,
    #[serde(default = "NavigationConfig::default_max_history")]
    pub max_history: usize,
    #[serde(default)]
    pub easing: Easing,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QualityConfig {
    #[serde(default)]
    pub tier: QualityTier,
    #[serde(default = "QualityConfig::default_auto_adjust")]
    pub auto_adjust: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GovernorConfig {
    #[serde(default = "GovernorConfig::default_target_fps")]
    pub target_fps: f32,
    #[serde(default = "GovernorConfig::default_report_interval")]
    pub report_interval_secs: f32,
    #[serde(default = "GovernorConfig::default_downgrade_ratio")]
    pub downgrade_ratio: f32,
    #[serde(default = "GovernorConfig::default_upgrade_ratio")]
    pub upgrade_ratio: f32,
    #[serde(default = "GovernorConfig::default_sustain_samples")]
    pub sustain_samples: u32,
    #[serde(default = "GovernorConfig::default_cooldown")]
    pub cooldown_secs: f32,
    #[serde(default = "GovernorConfig::default_memory_headroom")]
    pub memory_headroom_ratio: f32,
    #[serde(default = "GovernorConfig::default_history_capacity")]
    pub history_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "CameraConfig::default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "CameraConfig::default_zoom_sensitivity")]
    pub zoom_sensitivity: f32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub governor: GovernorConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfigOverrides {
    pub initial_scale: Option<ScaleLevel>,
    pub transition_duration_secs: Option<f32>,
    pub quality: Option<QualityTier>,
    pub target_fps: Option<f32>,
    pub max_history: Option<usize>,
}

impl NavigationConfig {
    const fn default_initial_scale() -> ScaleLevel {
        ScaleLevel::Human
    }

    const fn default_transition_duration() -> f32 {
        DEFAULT_TRANSITION_SECS
    }

    const fn default_max_history() -> usize {
        DEFAULT_MAX_HISTORY
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            initial_scale: Self::default_initial_scale(),
            transition_duration_secs: Self::default_transition_duration(),
            max_history: Self::default_max_history(),
            easing: Easing::default(),
        }
    }
}

impl QualityConfig {
    const fn default_auto_adjust() -> bool {
        true
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self { tier: QualityTier::default(), auto_adjust: Self::default_auto_adjust() }
    }
}

impl GovernorConfig {
    const fn default_target_fps() -> f32 {
        60.0
    }

    const fn default_report_interval() -> f32 {
        1.0
    }

    const fn default_downgrade_ratio() -> f32 {
        0.8
    }

    const fn default_upgrade_ratio() -> f32 {
        1.2
    }

    const fn default_sustain_samples() -> u32 {
        3
    }

    const fn default_cooldown() -> f32 {
        5.0
    }

    const fn default_memory_headroom() -> f32 {
        0.8
    }

    const fn default_history_capacity() -> usize {
        120
    }

    pub fn to_settings(&self) -> GovernorSettings {
        GovernorSettings {
            target_fps: self.target_fps,
            report_interval: self.report_interval_secs,
            downgrade_ratio: self.downgrade_ratio,
            upgrade_ratio: self.upgrade_ratio,
            sustain_samples: self.sustain_samples,
            cooldown: self.cooldown_secs,
            memory_headroom_ratio: self.memory_headroom_ratio,
            history_capacity: self.history_capacity,
        }
        .sanitized()
    }
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            target_fps: Self::default_target_fps(),
            report_interval_secs: Self::default_report_interval(),
            downgrade_ratio: Self::default_downgrade_ratio(),
            upgrade_ratio: Self::default_upgrade_ratio(),
            sustain_samples: Self::default_sustain_samples(),
            cooldown_secs: Self::default_cooldown(),
            memory_headroom_ratio: Self::default_memory_headroom(),
            history_capacity: Self::default_history_capacity(),
        }
    }
}

impl CameraConfig {
    const fn default_fov() -> f32 {
        60.0
    }

    const fn default_zoom_sensitivity() -> f32 {
        0.1
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { fov_degrees: Self::default_fov(), zoom_sensitivity: Self::default_zoom_sensitivity() }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!(target: "scale::config", "Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &EngineConfigOverrides) {
        if let Some(scale) = overrides.initial_scale {
            self.navigation.initial_scale = scale;
        }
        if let Some(duration) = overrides.transition_duration_secs {
            self.navigation.transition_duration_secs = duration;
        }
        if let Some(tier) = overrides.quality {
            self.quality.tier = tier;
        }
        if let Some(fps) = overrides.target_fps {
            self.governor.target_fps = fps;
        }
        if let Some(history) = overrides.max_history {
            self.navigation.max_history = history;
        }
    }
}

impl EngineConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.applied_fields().is_empty()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.initial_scale.is_some() {
            fields.push("initial_scale");
        }
        if self.transition_duration_secs.is_some() {
            fields.push("transition_duration_secs");
        }
        if self.quality.is_some() {
            fields.push("quality");
        }
        if self.target_fps.is_some() {
            fields.push("target_fps");
        }
        if self.max_history.is_some() {
            fields.push("max_history");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str("{}").expect("parse empty config");
        assert_eq!(cfg.navigation.initial_scale, ScaleLevel::Human);
        assert_eq!(cfg.navigation.max_history, DEFAULT_MAX_HISTORY);
        assert_eq!(cfg.navigation.easing, Easing::CubicInOut);
        assert_eq!(cfg.quality.tier, QualityTier::High);
        assert!(cfg.quality.auto_adjust);
        assert_eq!(cfg.governor.sustain_samples, 3);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg: EngineConfig = serde_json::from_str(
            r#"{"navigation":{"initial_scale":"galactic","easing":"linear"},"governor":{"target_fps":144}}"#,
        )
        .expect("parse partial config");
        assert_eq!(cfg.navigation.initial_scale, ScaleLevel::Galactic);
        assert_eq!(cfg.navigation.easing, Easing::Linear);
        assert_eq!(cfg.navigation.transition_duration_secs, DEFAULT_TRANSITION_SECS);
        assert_eq!(cfg.governor.target_fps, 144.0);
        assert_eq!(cfg.governor.cooldown_secs, 5.0);
    }

    #[test]
    fn invalid_governor_values_fall_back() {
        let cfg = GovernorConfig { target_fps: -5.0, sustain_samples: 0, cooldown_secs: f32::NAN, ..Default::default() };
        let settings = cfg.to_settings();
        assert_eq!(settings.target_fps, 60.0);
        assert_eq!(settings.sustain_samples, 1);
        assert_eq!(settings.cooldown, 5.0);
    }

    #[test]
    fn overrides_report_applied_fields() {
        let overrides = EngineConfigOverrides {
            quality: Some(QualityTier::Low),
            max_history: Some(4),
            ..Default::default()
        };
        assert_eq!(overrides.applied_fields(), vec!["quality", "max_history"]);
        let mut cfg = EngineConfig::default();
        cfg.apply_overrides(&overrides);
        assert_eq!(cfg.quality.tier, QualityTier::Low);
        assert_eq!(cfg.navigation.max_history, 4);
        assert!(EngineConfigOverrides::default().is_empty());
    }
}
