//! Vector and angle primitives
//!
//! Landmark positions are MediaPipe-normalized: x/y are fractions of the
//! frame (y grows downward), z is relative depth (smaller = toward camera).

use nalgebra::{Point3, Vector2, Vector3};
use std::f32::consts::PI;

/// Guards the magnitude product in the dot-product angle formula
pub const EPSILON: f32 = 1e-6;

/// "Upright" reference direction in image space (y grows downward)
pub fn up() -> Vector3<f32> {
    Vector3::new(0.0, -1.0, 0.0)
}

/// Vector from `a` to `b` (`b - a` componentwise)
pub fn vector(a: &Point3<f32>, b: &Point3<f32>) -> Vector3<f32> {
    b - a
}

/// Euclidean norm. The zero vector yields 0.
pub fn magnitude(v: &Vector3<f32>) -> f32 {
    v.norm()
}

/// Unsigned angle between two 3D vectors in radians, range [0, π]
///
/// cos(θ) = (v1 · v2) / (|v1| × |v2| + ε)
///
/// Never produces NaN: a near-zero vector drives the cosine towards 0.
pub fn angle_between_vectors_3d(v1: &Vector3<f32>, v2: &Vector3<f32>) -> f32 {
    guarded_acos(v1.dot(v2), v1.norm(), v2.norm())
}

/// Angle at `vertex` formed by `p1` and `p2`, restricted to the x/y plane
///
/// Used for hinge joints (knee, hip-knee-ankle). Returns radians in [0, π]:
/// - π = fully straight
/// - π/2 = right angle
pub fn angle_2d(p1: &Point3<f32>, vertex: &Point3<f32>, p2: &Point3<f32>) -> f32 {
    let v1: Vector2<f32> = (p1 - vertex).xy();
    let v2: Vector2<f32> = (p2 - vertex).xy();
    guarded_acos(v1.dot(&v2), v1.norm(), v2.norm())
}

fn guarded_acos(dot: f32, mag1: f32, mag2: f32) -> f32 {
    let cos_angle = (dot / (mag1 * mag2 + EPSILON)).clamp(-1.0, 1.0);
    cos_angle.acos()
}

/// Signed rotation from `from` to `to` after projecting both onto the
/// vertical/depth (y/z) plane, in radians within (-π, π]
///
/// Positive means the rotation carries an upward-pointing vector toward the
/// camera (negative z). Returns 0 when either projection is degenerate.
pub fn signed_angle_yz(from: &Vector3<f32>, to: &Vector3<f32>) -> f32 {
    let from_len = (from.y * from.y + from.z * from.z).sqrt();
    let to_len = (to.y * to.y + to.z * to.z).sqrt();
    if from_len < EPSILON || to_len < EPSILON {
        return 0.0;
    }

    wrap_angle(to.z.atan2(to.y) - from.z.atan2(from.y))
}

/// Wrap an angle in radians into (-π, π]
pub fn wrap_angle(rad: f32) -> f32 {
    let mut a = rad % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a <= -PI {
        a += 2.0 * PI;
    }
    a
}
