use crate::navigator::ScaleState;
use crate::quality::{camera_distance_for, lod_for, QualityTier};
use crate::scale::{ScaleLevel, ScaleRegistry};
use bytemuck::{Pod, Zeroable};
use serde::Serialize;

/// Per-frame values the renderer derives from navigation state and quality.
/// Pure function of its inputs, safe to recompute every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderParams {
    pub scale: ScaleLevel,
    pub target_scale: Option<ScaleLevel>,
    pub magnitude: i32,
    pub camera_distance: f32,
    pub target_camera_distance: Option<f32>,
    pub lod: u32,
    pub quality: QualityTier,
    pub transition_progress: f32,
    pub time_scale: f64,
    pub physics_enabled: bool,
}

impl RenderParams {
    pub fn derive(registry: &ScaleRegistry, state: &ScaleState, quality: QualityTier) -> Self {
        let current = state.current();
        let info = registry.lookup(current);
        let target = state.target();
        Self {
            scale: current,
            target_scale: target,
            magnitude: info.magnitude,
            camera_distance: camera_distance_for(registry, current),
            target_camera_distance: target.map(|level| camera_distance_for(registry, level)),
            lod: lod_for(registry, current, quality),
            quality,
            transition_progress: state.progress(),
            time_scale: info.time_scale,
            physics_enabled: info.enable_physics,
        }
    }

    pub fn uniform(&self) -> ScaleUniform {
        ScaleUniform::from_params(self)
    }
}

/// GPU-side mirror of [`RenderParams`], 16-byte aligned.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ScaleUniform {
    pub camera_distance: f32,
    pub target_camera_distance: f32,
    pub transition_progress: f32,
    /// `log10(time_scale)` so the value stays representable in f32.
    pub log_time_scale: f32,
    pub magnitude: i32,
    pub lod: u32,
    pub physics_enabled: u32,
    pub _padding: u32,
}

impl ScaleUniform {
    pub fn from_params(params: &RenderParams) -> Self {
        let log_time_scale = if params.time_scale > 0.0 { params.time_scale.log10() as f32 } else { 0.0 };
        Self {
            camera_distance: params.camera_distance,
            target_camera_distance: params.target_camera_distance.unwrap_or(params.camera_distance),
            transition_progress: params.transition_progress,
            log_time_scale,
            magnitude: params.magnitude,
            lod: params.lod,
            physics_enabled: params.physics_enabled as u32,
            _padding: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_params_have_no_target() {
        let registry = ScaleRegistry::standard();
        let state = ScaleState::new(ScaleLevel::Galactic, 10);
        let params = RenderParams::derive(&registry, &state, QualityTier::Low);
        assert_eq!(params.magnitude, 21);
        assert_eq!(params.target_camera_distance, None);
        assert_eq!(params.lod, 6);
        assert!(!params.physics_enabled);
        let uniform = params.uniform();
        assert_eq!(uniform.target_camera_distance, uniform.camera_distance);
        assert_eq!(uniform.physics_enabled, 0);
        assert!((uniform.log_time_scale - 13.498).abs() < 0.01);
    }

    #[test]
    fn uniform_layout_is_sixteen_byte_aligned() {
        assert_eq!(std::mem::size_of::<ScaleUniform>() % 16, 0);
        let zeroed = ScaleUniform::zeroed();
        let bytes = bytemuck::bytes_of(&zeroed);
        assert!(bytes.iter().all(|byte| *byte == 0));
    }
}
