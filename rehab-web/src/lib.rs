//! Rehab Web - Lumbar Stability Self-Assessment (WASM)
//!
//! Turns MediaPipe Pose landmarks into a smoothed lumbar flexion/extension
//! angle and a hip-vs-lumbar stability score for three movement tests:
//! standing hip flexion, rock-back and seated knee extension.
//!
//! Entry point for WASM module. Only contains:
//! - Module declarations
//! - wasm_bindgen entry points that delegate to submodules

use wasm_bindgen::prelude::*;

// ============================================================================
// CONSOLE LOGGING
// ============================================================================

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    pub(crate) fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => ($crate::log(&format_args!($($t)*).to_string()))
}

pub mod assessment;
pub mod biomech;
mod bridge;

// Re-export wasm_bindgen functions and bridge types for JS / Rust callers
pub use bridge::{
    update_landmarks, clear_landmarks,
    start_test, reset_session, reset_angle_filter, configure_session, set_lumbar_params,
    process_pose_frame, get_stability_result, get_movement_phases, get_stability_report,
    get_all_landmarks, parse_landmarks, body_midpoints, parse_config, frame_input, stability_report,
    BodyMidpoints, Landmark, LandmarkError, ConfigError, StabilityReport,
    LANDMARK_COUNT, PHASE_STRIDE,
    LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_HIP, RIGHT_HIP,
    LEFT_KNEE, RIGHT_KNEE, LEFT_ANKLE, RIGHT_ANKLE,
};

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    console_log!("✅ Rehab assessment engine loaded");
}
