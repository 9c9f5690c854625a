//! Hip and knee joint angles
//!
//! Hip angle drives the stability analysis; knee angle is the primary
//! measurement of the seated knee extension test.

use nalgebra::Point3;

use super::vector::{angle_2d, signed_angle_yz, vector};

/// Signed hip flexion angle in degrees
///
/// Rotation from the femur (hip → knee) to the downward extension of the
/// trunk line (shoulder → hip), both projected onto the y/z plane.
/// - 0 = standing straight
/// - positive = flexion (knee raised forward or trunk leaning forward)
/// - negative = extension
///
/// `forward_sign` follows the same convention as [`super::LumbarConfig`].
pub fn hip_angle(
    shoulder_mid: &Point3<f32>,
    hip_mid: &Point3<f32>,
    knee_mid: &Point3<f32>,
    forward_sign: f32,
) -> f32 {
    let trunk_down = vector(shoulder_mid, hip_mid);
    let femur = vector(hip_mid, knee_mid);
    signed_angle_yz(&femur, &trunk_down).to_degrees() * forward_sign
}

/// Knee angle in degrees (180° = straight leg, 90° = right angle)
pub fn knee_angle(hip_mid: &Point3<f32>, knee_mid: &Point3<f32>, ankle_mid: &Point3<f32>) -> f32 {
    angle_2d(hip_mid, knee_mid, ankle_mid).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shoulder() -> Point3<f32> {
        Point3::new(0.5, 0.3, 0.0)
    }

    fn hip() -> Point3<f32> {
        Point3::new(0.5, 0.6, 0.0)
    }

    fn knee_at(deg: f32) -> Point3<f32> {
        let rad = deg.to_radians();
        Point3::new(0.5, 0.6 + 0.25 * rad.cos(), -0.25 * rad.sin())
    }

    #[test]
    fn test_standing_is_zero() {
        let angle = hip_angle(&shoulder(), &hip(), &knee_at(0.0), 1.0);
        assert!(angle.abs() < 1e-3, "got {}", angle);
    }

    #[test]
    fn test_knee_raised_is_flexion() {
        let angle = hip_angle(&shoulder(), &hip(), &knee_at(90.0), 1.0);
        assert!((angle - 90.0).abs() < 0.01, "got {}", angle);

        let angle = hip_angle(&shoulder(), &hip(), &knee_at(45.0), 1.0);
        assert!((angle - 45.0).abs() < 0.01, "got {}", angle);
    }

    #[test]
    fn test_trunk_lean_is_flexion() {
        // Trunk tilted 30° toward the camera, femur vertical
        let rad = 30f32.to_radians();
        let shoulder = Point3::new(0.5, 0.6 - 0.3 * rad.cos(), -0.3 * rad.sin());
        let angle = hip_angle(&shoulder, &hip(), &knee_at(0.0), 1.0);
        assert!((angle - 30.0).abs() < 0.01, "got {}", angle);
    }

    #[test]
    fn test_hip_extension_is_negative() {
        let angle = hip_angle(&shoulder(), &hip(), &knee_at(-15.0), 1.0);
        assert!((angle + 15.0).abs() < 0.01, "got {}", angle);
        let flipped = hip_angle(&shoulder(), &hip(), &knee_at(-15.0), -1.0);
        assert!((flipped - 15.0).abs() < 0.01, "got {}", flipped);
    }

    #[test]
    fn test_degenerate_hip_no_nan() {
        let angle = hip_angle(&hip(), &hip(), &hip(), 1.0);
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn test_knee_angle() {
        let hip = Point3::new(0.4, 0.6, 0.0);
        let knee = Point3::new(0.6, 0.6, 0.0);
        let straight = Point3::new(0.8, 0.6, 0.0);
        let bent = Point3::new(0.6, 0.85, 0.0);
        assert!((knee_angle(&hip, &knee, &straight) - 180.0).abs() < 1.0);
        assert!((knee_angle(&hip, &knee, &bent) - 90.0).abs() < 1.0);
    }
}
