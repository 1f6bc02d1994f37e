use serde::{Deserialize, Serialize};

/// Reparameterizes linear progress in `[0, 1]` into perceptual progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    Smoothstep,
    #[default]
    CubicInOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::Smoothstep => t * t * (3.0 - 2.0 * t),
            Easing::CubicInOut => ease_in_out_cubic(t),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Easing::Linear => "Linear",
            Easing::Smoothstep => "Smoothstep",
            Easing::CubicInOut => "Cubic In/Out",
        }
    }
}

pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cubic_hits_boundaries_exactly() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
    }

    #[test]
    fn every_curve_is_monotonic_and_clamped() {
        for easing in [Easing::Linear, Easing::Smoothstep, Easing::CubicInOut] {
            let mut previous = easing.apply(-1.0);
            assert_eq!(previous, 0.0, "{}", easing.label());
            for step in 1..=200 {
                let value = easing.apply(step as f32 / 200.0);
                assert!(value >= previous, "{} decreased at step {step}", easing.label());
                previous = value;
            }
            assert_eq!(easing.apply(2.0), 1.0, "{}", easing.label());
            assert_eq!(easing.apply(f32::NAN), 0.0, "{}", easing.label());
        }
    }

    #[test]
    fn small_positive_input_yields_small_positive_output() {
        let eased = Easing::CubicInOut.apply(0.05);
        assert!(eased > 0.0 && eased < 0.05);
    }
}
