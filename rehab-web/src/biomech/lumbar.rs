//! Lumbar flexion/extension estimation from shoulder and hip midpoints
//!
//! The trunk vector (hip-mid → shoulder-mid) is projected onto the y/z plane
//! and compared against the upright direction with `atan2`, which yields
//! sign and magnitude in one step.
//!
//! Shoulder-hip tracking over-estimates forward lean relative to true lumbar
//! motion, so flexion and extension are scaled separately. These constants
//! were tuned empirically and are exposed through [`LumbarConfig`].

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use super::vector::{magnitude, signed_angle_yz, vector, up, EPSILON};

/// Lean magnitudes below this are treated as detector jitter (degrees)
pub const DEFAULT_DEADBAND_DEG: f32 = 2.0;

/// Forward flexion scale
pub const DEFAULT_FLEXION_SCALE: f32 = 0.8;

/// Backward extension scale
pub const DEFAULT_EXTENSION_SCALE: f32 = 1.0;

/// Physiological envelope (degrees)
pub const MIN_LUMBAR_ANGLE: f32 = -40.0;
pub const MAX_LUMBAR_ANGLE: f32 = 60.0;

/// Tunable constants for [`calculate_lumbar_angle`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LumbarConfig {
    /// +1.0 when a lean toward the camera (negative z) is flexion, -1.0 to flip
    pub forward_sign: f32,
    pub deadband_deg: f32,
    pub flexion_scale: f32,
    pub extension_scale: f32,
    pub min_angle_deg: f32,
    pub max_angle_deg: f32,
}

impl LumbarConfig {
    /// Shoulder/hip trunk tracking preset
    pub fn for_trunk_tracking() -> Self {
        Self {
            forward_sign: 1.0,
            deadband_deg: DEFAULT_DEADBAND_DEG,
            flexion_scale: DEFAULT_FLEXION_SCALE,
            extension_scale: DEFAULT_EXTENSION_SCALE,
            min_angle_deg: MIN_LUMBAR_ANGLE,
            max_angle_deg: MAX_LUMBAR_ANGLE,
        }
    }

    /// Update the empirically tuned parameters, keeping sign and envelope
    pub fn set_params(&mut self, deadband_deg: f32, flexion_scale: f32, extension_scale: f32) {
        self.deadband_deg = deadband_deg.max(0.0);
        self.flexion_scale = flexion_scale.max(0.0);
        self.extension_scale = extension_scale.max(0.0);
    }
}

impl Default for LumbarConfig {
    fn default() -> Self {
        Self::for_trunk_tracking()
    }
}

/// Signed lumbar angle in degrees
///
/// - positive = forward flexion
/// - negative = backward extension
/// - 0 = upright, or shoulder and hip coincide
///
/// Stateless: smoothing lives in [`super::AngleFilter`].
pub fn calculate_lumbar_angle(
    shoulder_mid: &Point3<f32>,
    hip_mid: &Point3<f32>,
    config: &LumbarConfig,
) -> f32 {
    let trunk = vector(hip_mid, shoulder_mid);
    if magnitude(&trunk) < EPSILON {
        return 0.0;
    }

    let angle = signed_angle_yz(&up(), &trunk).to_degrees() * config.forward_sign;
    if angle.abs() < config.deadband_deg {
        return 0.0;
    }

    let scaled = if angle > 0.0 {
        angle * config.flexion_scale
    } else {
        angle * config.extension_scale
    };

    // max/min rather than clamp: an inverted or NaN envelope must not panic
    scaled.max(config.min_angle_deg).min(config.max_angle_deg)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shoulder midpoint for a trunk of length 0.3 leaning `deg` toward the camera
    fn leaning_shoulder(hip: Point3<f32>, deg: f32) -> Point3<f32> {
        let rad = deg.to_radians();
        Point3::new(hip.x, hip.y - 0.3 * rad.cos(), hip.z - 0.3 * rad.sin())
    }

    #[test]
    fn test_upright_is_zero() {
        let hip = Point3::new(0.5, 0.6, 0.0);
        let shoulder = Point3::new(0.52, 0.3, 0.0);
        let angle = calculate_lumbar_angle(&shoulder, &hip, &LumbarConfig::default());
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn test_coincident_points_no_nan() {
        let p = Point3::new(0.5, 0.5, 0.1);
        let angle = calculate_lumbar_angle(&p, &p, &LumbarConfig::default());
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn test_deadband_suppresses_jitter() {
        let hip = Point3::new(0.5, 0.6, 0.0);
        let angle = calculate_lumbar_angle(
            &leaning_shoulder(hip, 1.5),
            &hip,
            &LumbarConfig::default(),
        );
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn test_asymmetric_scaling_under_mirroring() {
        let config = LumbarConfig::default();
        let hip = Point3::new(0.5, 0.6, 0.0);

        let flexion = calculate_lumbar_angle(&leaning_shoulder(hip, 20.0), &hip, &config);
        let extension = calculate_lumbar_angle(&leaning_shoulder(hip, -20.0), &hip, &config);

        assert!((flexion - 20.0 * config.flexion_scale).abs() < 0.01, "got {}", flexion);
        assert!((extension + 20.0 * config.extension_scale).abs() < 0.01, "got {}", extension);
        assert!(flexion > 0.0 && extension < 0.0);
    }

    #[test]
    fn test_clamped_to_envelope() {
        let config = LumbarConfig::default();
        let hip = Point3::new(0.5, 0.6, 0.0);

        let deep_flexion = calculate_lumbar_angle(&leaning_shoulder(hip, 85.0), &hip, &config);
        assert_eq!(deep_flexion, MAX_LUMBAR_ANGLE);

        let deep_extension = calculate_lumbar_angle(&leaning_shoulder(hip, -60.0), &hip, &config);
        assert_eq!(deep_extension, MIN_LUMBAR_ANGLE);
    }

    #[test]
    fn test_inverted_envelope_is_total() {
        let hip = Point3::new(0.5, 0.6, 0.0);
        let inverted = LumbarConfig {
            min_angle_deg: 70.0,
            ..LumbarConfig::default()
        };
        let angle = calculate_lumbar_angle(&leaning_shoulder(hip, 20.0), &hip, &inverted);
        assert_eq!(angle, MAX_LUMBAR_ANGLE);

        let nan_bounds = LumbarConfig {
            min_angle_deg: f32::NAN,
            max_angle_deg: f32::NAN,
            ..LumbarConfig::default()
        };
        let angle = calculate_lumbar_angle(&leaning_shoulder(hip, 20.0), &hip, &nan_bounds);
        assert!((angle - 16.0).abs() < 0.01, "got {}", angle);
    }

    #[test]
    fn test_forward_sign_flips_convention() {
        let config = LumbarConfig {
            forward_sign: -1.0,
            ..LumbarConfig::default()
        };
        let hip = Point3::new(0.5, 0.6, 0.0);
        let angle = calculate_lumbar_angle(&leaning_shoulder(hip, 20.0), &hip, &config);
        assert!((angle + 20.0).abs() < 0.01, "got {}", angle);
    }

    #[test]
    fn test_set_params_rejects_negative() {
        let mut config = LumbarConfig::default();
        config.set_params(3.0, -1.0, 0.9);
        assert_eq!(config.deadband_deg, 3.0);
        assert_eq!(config.flexion_scale, 0.0);
        assert_eq!(config.extension_scale, 0.9);
    }
}
