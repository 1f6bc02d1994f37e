use crate::navigator::ScaleNavigator;
use crate::scale::{ScaleInfo, ScaleLevel};
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;
use winit::dpi::PhysicalSize;

const DEFAULT_UP: Vec3 = Vec3::Y;

/// Orbit camera whose radius lives in the active level's local units.
///
/// Every level renders in its own locally scaled frame, so the radius never needs to
/// span more than the level's `[min, max]` camera bounds. While a transition is in
/// flight the radius is interpolated in log space between the two levels' default
/// distances and `relative_magnitude` tells the renderer how far the frame has
/// re-based.
#[derive(Debug, Clone)]
pub struct ScaleCamera {
    pub target: Vec3,
    pub radius: f32,
    pub yaw_radians: f32,
    pub pitch_radians: f32,
    pub fov_y_radians: f32,
    pub zoom_sensitivity: f32,
    bounds: (f32, f32),
    scale: ScaleLevel,
    relative_magnitude: f64,
    transitioning: bool,
}

impl ScaleCamera {
    pub fn new(info: &ScaleInfo, fov_y_radians: f32, zoom_sensitivity: f32) -> Self {
        Self {
            target: Vec3::ZERO,
            radius: info.default_camera_distance,
            yaw_radians: 0.0,
            pitch_radians: 0.0,
            fov_y_radians,
            zoom_sensitivity,
            bounds: (info.min_camera_distance, info.max_camera_distance),
            scale: info.level,
            relative_magnitude: info.magnitude as f64,
            transitioning: false,
        }
    }

    pub fn scale(&self) -> ScaleLevel {
        self.scale
    }

    pub fn bounds(&self) -> (f32, f32) {
        self.bounds
    }

    /// Fractional magnitude currently on screen; equals the level magnitude when idle.
    pub fn relative_magnitude(&self) -> f64 {
        self.relative_magnitude
    }

    /// Pulls radius and bounds from the navigator. Call once per frame after ticking.
    pub fn follow(&mut self, navigator: &ScaleNavigator) {
        let registry = navigator.registry();
        match navigator.active_transition() {
            Some(active) => {
                let from = registry.lookup(active.from);
                let to = registry.lookup(active.to);
                let t = active.progress();
                self.radius = log_lerp(from.default_camera_distance, to.default_camera_distance, t);
                self.relative_magnitude =
                    from.magnitude as f64 + (to.magnitude - from.magnitude) as f64 * t as f64;
                self.transitioning = true;
            }
            None => {
                let info = navigator.current_info();
                if self.transitioning || self.scale != info.level {
                    self.radius = info.default_camera_distance;
                }
                self.scale = info.level;
                self.bounds = (info.min_camera_distance, info.max_camera_distance);
                self.radius = info.clamp_camera_distance(self.radius);
                self.relative_magnitude = info.magnitude as f64;
                self.transitioning = false;
            }
        }
    }

    /// Scroll zoom within the level's bounds. Ignored mid-transition.
    pub fn apply_scroll_zoom(&mut self, scroll_delta: f32) {
        if self.transitioning || !scroll_delta.is_finite() {
            return;
        }
        let multiplier = (-scroll_delta * self.zoom_sensitivity).exp();
        self.radius = (self.radius * multiplier).clamp(self.bounds.0, self.bounds.1);
    }

    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw_radians += delta.x;
        self.pitch_radians = (self.pitch_radians + delta.y).clamp(-FRAC_PI_2 + 0.01, FRAC_PI_2 - 0.01);
    }

    pub fn position(&self) -> Vec3 {
        let rotation = Quat::from_euler(EulerRot::YXZ, self.yaw_radians, self.pitch_radians, 0.0);
        self.target + rotation * Vec3::new(0.0, 0.0, self.radius)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, DEFAULT_UP)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let near = (self.bounds.0 * 0.01).max(0.0001);
        let far = self.bounds.1 * 100.0;
        Mat4::perspective_rh_gl(self.fov_y_radians, aspect.max(0.0001), near, far)
    }

    pub fn view_projection(&self, viewport: PhysicalSize<u32>) -> Mat4 {
        let aspect = if viewport.height > 0 { viewport.width as f32 / viewport.height as f32 } else { 1.0 };
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

fn log_lerp(a: f32, b: f32, t: f32) -> f32 {
    if a <= 0.0 || b <= 0.0 {
        return a + (b - a) * t;
    }
    (a.ln() + (b.ln() - a.ln()) * t).exp()
}
