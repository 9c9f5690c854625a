//! Session integration - connects the assessment session with landmark data
//!
//! One session lives in thread-local storage for the active test. JS drives
//! it once per video frame and reads results back as flat arrays or JSON.

use serde::Serialize;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

use crate::assessment::{
    AssessmentSession, FrameInput, FrameMetrics, MovementTest, SessionConfig,
};
use crate::biomech::{MovementPhase, StabilityResult};
use super::landmarks::{body_midpoints, get_all_landmarks, BodyMidpoints, LandmarkError};

/// Floats per phase in [`get_movement_phases`]
pub const PHASE_STRIDE: usize = 5;

/// Errors from session configuration calls
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    UnknownTest(usize),
    Parse(String),
    Invalid(String),
    Serialize(String),
}

impl ConfigError {
    pub fn message(&self) -> String {
        match self {
            ConfigError::UnknownTest(idx) => format!("Unknown test index: {}", idx),
            ConfigError::Parse(e) => format!("Invalid session config: {}", e),
            ConfigError::Invalid(e) => format!("Rejected session config: {}", e),
            ConfigError::Serialize(e) => format!("Report serialization failed: {}", e),
        }
    }
}

impl From<ConfigError> for JsValue {
    fn from(err: ConfigError) -> Self {
        JsValue::from_str(&err.message())
    }
}

/// JSON snapshot for the metrics/UI layer
#[derive(Serialize)]
pub struct StabilityReport<'a> {
    pub test: MovementTest,
    pub frames_processed: u64,
    #[serde(flatten)]
    pub result: &'a StabilityResult,
}

thread_local! {
    static SESSION: RefCell<AssessmentSession> = RefCell::new(AssessmentSession::default());
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Start a new recording for the given test (0 = standing hip flexion,
/// 1 = rock-back, 2 = seated knee extension). Always clears history.
#[wasm_bindgen]
pub fn start_test(test_index: usize) -> Result<(), JsValue> {
    let test = MovementTest::from_index(test_index).ok_or(ConfigError::UnknownTest(test_index))?;
    SESSION.with(|session_cell| {
        let mut session = session_cell.borrow_mut();
        if !session.set_test(test) {
            session.reset();
        }
    });
    console_log!("▶️ Started {}", test.as_str());
    Ok(())
}

/// Clear filter and stability history without changing the test
#[wasm_bindgen]
pub fn reset_session() {
    SESSION.with(|session_cell| session_cell.borrow_mut().reset());
}

/// Clear only the angle smoothing filter (e.g. on a cut between clips)
#[wasm_bindgen]
pub fn reset_angle_filter() {
    SESSION.with(|session_cell| session_cell.borrow_mut().reset_angle_filter());
}

/// Replace the session configuration from a JSON document; starts fresh
#[wasm_bindgen]
pub fn configure_session(json: &str) -> Result<(), JsValue> {
    let config = parse_config(json)?;
    SESSION.with(|session_cell| session_cell.borrow_mut().configure(config));
    console_log!("⚙️ Session configured");
    Ok(())
}

/// Tune lumbar deadband and per-direction scaling from JS
#[wasm_bindgen]
pub fn set_lumbar_params(deadband_deg: f32, flexion_scale: f32, extension_scale: f32) {
    SESSION.with(|session_cell| {
        session_cell
            .borrow_mut()
            .set_lumbar_params(deadband_deg, flexion_scale, extension_scale)
    });
}

/// Process the stored landmarks for this frame
///
/// Returns `[lumbar_angle, raw_lumbar_angle, hip_angle, knee_angle]`, with
/// NaN for the knee angle when ankles are not visible.
#[wasm_bindgen]
pub fn process_pose_frame(timestamp_ms: f64) -> Result<Vec<f32>, JsValue> {
    let landmarks = get_all_landmarks().ok_or(LandmarkError::NoData)?;
    SESSION.with(|session_cell| -> Result<Vec<f32>, JsValue> {
        let mut session = session_cell.borrow_mut();
        let midpoints = body_midpoints(&landmarks, session.config().min_visibility)?;
        let input = frame_input(session.test(), &midpoints, timestamp_ms)?;
        let metrics = session.process_frame(&input);
        Ok(metrics_as_flat(&metrics))
    })
}

/// `[score, excessive_movement, ratio, grade_index, phase_count, sample_count]`
#[wasm_bindgen]
pub fn get_stability_result() -> Vec<f32> {
    SESSION.with(|session_cell| result_as_flat(&session_cell.borrow().analyze()))
}

/// Per phase: `[start_index, end_index, hip_range, lumbar_range, duration_ms]`
#[wasm_bindgen]
pub fn get_movement_phases() -> Vec<f32> {
    SESSION.with(|session_cell| {
        phases_as_flat(&session_cell.borrow().analyze().hip_movement_phases)
    })
}

/// Full stability snapshot as JSON
#[wasm_bindgen]
pub fn get_stability_report() -> Result<String, JsValue> {
    SESSION.with(|session_cell| {
        let session = session_cell.borrow();
        stability_report(&session).map_err(JsValue::from)
    })
}

// ============================================================================
// INTERNAL API (no wasm_bindgen)
// ============================================================================

/// Parse and validate a JSON session config; nothing is applied on error
pub fn parse_config(json: &str) -> Result<SessionConfig, ConfigError> {
    let config = SessionConfig::from_json(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
}

/// Gate midpoints for the active test and attach the timestamp
pub fn frame_input(
    test: MovementTest,
    midpoints: &BodyMidpoints,
    timestamp_ms: f64,
) -> Result<FrameInput, LandmarkError> {
    if test.measures_knee() && midpoints.ankle_mid.is_none() {
        return Err(LandmarkError::MissingAnkle);
    }

    Ok(FrameInput {
        shoulder_mid: midpoints.shoulder_mid,
        hip_mid: midpoints.hip_mid,
        knee_mid: midpoints.knee_mid,
        ankle_mid: midpoints.ankle_mid,
        timestamp_ms,
    })
}

pub fn metrics_as_flat(metrics: &FrameMetrics) -> Vec<f32> {
    vec![
        metrics.lumbar_angle,
        metrics.raw_lumbar_angle,
        metrics.hip_angle,
        metrics.knee_angle.unwrap_or(f32::NAN),
    ]
}

pub fn result_as_flat(result: &StabilityResult) -> Vec<f32> {
    vec![
        result.lumbar_stability_score,
        result.lumbar_excessive_movement,
        result.hip_lumbar_ratio,
        result.stability_grade.index() as f32,
        result.hip_movement_phases.len() as f32,
        result.sample_count as f32,
    ]
}

pub fn phases_as_flat(phases: &[MovementPhase]) -> Vec<f32> {
    let mut flat = Vec::with_capacity(phases.len() * PHASE_STRIDE);
    for phase in phases {
        flat.extend_from_slice(&[
            phase.start_index as f32,
            phase.end_index as f32,
            phase.hip_range,
            phase.lumbar_range,
            phase.duration_ms as f32,
        ]);
    }
    flat
}

pub fn stability_report(session: &AssessmentSession) -> Result<String, ConfigError> {
    let result = session.analyze();
    let report = StabilityReport {
        test: session.test(),
        frames_processed: session.frames_processed(),
        result: &result,
    };
    serde_json::to_string(&report).map_err(|e| ConfigError::Serialize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn midpoints(ankle: bool) -> BodyMidpoints {
        BodyMidpoints {
            shoulder_mid: Point3::new(0.5, 0.3, 0.0),
            hip_mid: Point3::new(0.5, 0.6, 0.0),
            knee_mid: Point3::new(0.5, 0.8, 0.0),
            ankle_mid: ankle.then(|| Point3::new(0.5, 0.95, 0.0)),
        }
    }

    #[test]
    fn test_knee_extension_requires_ankles() {
        let err = frame_input(MovementTest::SeatedKneeExtension, &midpoints(false), 0.0);
        assert_eq!(err.unwrap_err(), LandmarkError::MissingAnkle);

        assert!(frame_input(MovementTest::StandingHipFlexion, &midpoints(false), 0.0).is_ok());
        assert!(frame_input(MovementTest::SeatedKneeExtension, &midpoints(true), 0.0).is_ok());
    }

    #[test]
    fn test_missing_knee_is_nan() {
        let mut session = AssessmentSession::default();
        let input = frame_input(session.test(), &midpoints(false), 0.0).unwrap();
        let flat = metrics_as_flat(&session.process_frame(&input));
        assert_eq!(flat.len(), 4);
        assert!(flat[3].is_nan());
    }

    #[test]
    fn test_result_and_phase_layout() {
        let mut session = AssessmentSession::default();
        for i in 0..60 {
            let lift = if i < 10 { 0.0 } else { ((i - 10) as f32 * 0.01).min(0.2) };
            let mids = BodyMidpoints {
                knee_mid: Point3::new(0.5, 0.8 - lift, -lift),
                ..midpoints(true)
            };
            let input = frame_input(session.test(), &mids, i as f64 * 33.0).unwrap();
            session.process_frame(&input);
        }

        let result = session.analyze();
        let flat = result_as_flat(&result);
        assert_eq!(flat.len(), 6);
        assert_eq!(flat[0], result.lumbar_stability_score);
        assert_eq!(flat[3], result.stability_grade.index() as f32);
        assert_eq!(flat[5], 60.0);

        let phases = phases_as_flat(&result.hip_movement_phases);
        assert_eq!(phases.len(), result.hip_movement_phases.len() * PHASE_STRIDE);
        assert!(!result.hip_movement_phases.is_empty());
    }

    #[test]
    fn test_parse_config_rejects_invalid() {
        assert!(parse_config(r#"{ "lumbar": { "deadband_deg": 3.0 } }"#).is_ok());
        assert!(matches!(parse_config("{ lumbar: "), Err(ConfigError::Parse(_))));

        let err = parse_config(r#"{ "lumbar": { "min_angle_deg": 70.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.message().starts_with("Rejected session config"));

        let huge = r#"{ "filter_capacity": 1000000 }"#;
        assert!(matches!(parse_config(huge), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_report_json() {
        let session = AssessmentSession::new(MovementTest::RockBack);
        let json = stability_report(&session).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["test"], "rock_back");
        assert_eq!(value["frames_processed"], 0);
        assert_eq!(value["stability_grade"], "fair");
        assert!(value["hip_movement_phases"].as_array().unwrap().is_empty());
    }
}
