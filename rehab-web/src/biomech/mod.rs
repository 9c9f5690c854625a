//! Biomechanics module - trunk/hip angles, smoothing and stability scoring
//!
//! Re-exports only. All logic in submodules.

mod vector;
mod lumbar;
mod joints;
mod angle_filter;
mod stability;

pub use vector::{
    vector, magnitude, angle_between_vectors_3d, angle_2d, signed_angle_yz, wrap_angle, up,
    EPSILON,
};
pub use lumbar::{
    calculate_lumbar_angle, LumbarConfig,
    DEFAULT_DEADBAND_DEG, DEFAULT_FLEXION_SCALE, DEFAULT_EXTENSION_SCALE,
    MIN_LUMBAR_ANGLE, MAX_LUMBAR_ANGLE,
};
pub use joints::{hip_angle, knee_angle};
pub use angle_filter::{AngleFilter, ANGLE_FILTER_CAPACITY};
pub use stability::{
    StabilityAnalyzer, StabilityConfig, StabilityResult, StabilityGrade, MovementPhase,
    STABILITY_WINDOW, MIN_ANALYSIS_SAMPLES, MOVEMENT_THRESHOLD_DEG, MIN_PHASE_FRAMES,
    COUPLING_ALLOWANCE,
};
