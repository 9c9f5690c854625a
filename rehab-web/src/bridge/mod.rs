//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod landmarks;
mod session_integration;

pub use landmarks::{
    // WASM entry points
    update_landmarks,
    clear_landmarks,
    // Internal API
    get_all_landmarks,
    parse_landmarks,
    body_midpoints,
    BodyMidpoints,
    Landmark,
    LandmarkError,
    // Constants
    LANDMARK_COUNT,
    LEFT_SHOULDER, RIGHT_SHOULDER,
    LEFT_HIP, RIGHT_HIP,
    LEFT_KNEE, RIGHT_KNEE,
    LEFT_ANKLE, RIGHT_ANKLE,
};

pub use session_integration::{
    // WASM entry points
    start_test,
    reset_session,
    reset_angle_filter,
    configure_session,
    set_lumbar_params,
    process_pose_frame,
    get_stability_result,
    get_movement_phases,
    get_stability_report,
    // Internal API
    parse_config,
    frame_input,
    stability_report,
    ConfigError,
    StabilityReport,
    PHASE_STRIDE,
};
