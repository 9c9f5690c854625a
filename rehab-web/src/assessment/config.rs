//! Session configuration
//!
//! Every field has a default, so a partial JSON document only overrides the
//! keys it names.

use serde::{Deserialize, Serialize};

use crate::biomech::{LumbarConfig, StabilityConfig, ANGLE_FILTER_CAPACITY};

/// Landmarks below this visibility are not trusted
pub const DEFAULT_MIN_VISIBILITY: f32 = 0.5;

/// Largest accepted smoothing filter capacity
pub const MAX_FILTER_CAPACITY: usize = 30;

/// Largest accepted stability window (~60 s at 30 fps)
pub const MAX_STABILITY_WINDOW: usize = 1800;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub lumbar: LumbarConfig,
    pub stability: StabilityConfig,
    /// Raw lumbar samples kept by the smoothing filter
    pub filter_capacity: usize,
    /// Feed the smoothed (true) or raw (false) lumbar angle to the analyzer
    pub analyze_smoothed: bool,
    pub min_visibility: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lumbar: LumbarConfig::default(),
            stability: StabilityConfig::default(),
            filter_capacity: ANGLE_FILTER_CAPACITY,
            analyze_smoothed: true,
            min_visibility: DEFAULT_MIN_VISIBILITY,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reject values that would make the pipeline meaningless
    ///
    /// Returns a message naming the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        let lumbar = &self.lumbar;
        let stability = &self.stability;

        if lumbar.forward_sign != 1.0 && lumbar.forward_sign != -1.0 {
            return Err(format!("lumbar.forward_sign must be 1 or -1, got {}", lumbar.forward_sign));
        }
        non_negative("lumbar.deadband_deg", lumbar.deadband_deg)?;
        non_negative("lumbar.flexion_scale", lumbar.flexion_scale)?;
        non_negative("lumbar.extension_scale", lumbar.extension_scale)?;
        finite("lumbar.min_angle_deg", lumbar.min_angle_deg)?;
        finite("lumbar.max_angle_deg", lumbar.max_angle_deg)?;
        if lumbar.min_angle_deg > lumbar.max_angle_deg {
            return Err(format!(
                "lumbar.min_angle_deg ({}) exceeds lumbar.max_angle_deg ({})",
                lumbar.min_angle_deg, lumbar.max_angle_deg
            ));
        }

        within("stability.window_size", stability.window_size, 1, MAX_STABILITY_WINDOW)?;
        within("stability.min_samples", stability.min_samples, 1, stability.window_size)?;
        within("stability.min_phase_frames", stability.min_phase_frames, 1, stability.window_size)?;
        non_negative("stability.movement_threshold_deg", stability.movement_threshold_deg)?;
        non_negative("stability.coupling_allowance", stability.coupling_allowance)?;
        non_negative("stability.min_useful_delta_deg", stability.min_useful_delta_deg)?;

        within("filter_capacity", self.filter_capacity, 1, MAX_FILTER_CAPACITY)?;
        if !(0.0..=1.0).contains(&self.min_visibility) {
            return Err(format!("min_visibility must be in [0, 1], got {}", self.min_visibility));
        }

        Ok(())
    }
}

fn finite(field: &str, value: f32) -> Result<(), String> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(format!("{} must be finite, got {}", field, value))
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), String> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(format!("{} must not be negative, got {}", field, value));
    }
    Ok(())
}

fn within(field: &str, value: usize, min: usize, max: usize) -> Result<(), String> {
    if value < min || value > max {
        return Err(format!("{} must be in {}..={}, got {}", field, min, max, value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SessionConfig::from_json(
            r#"{ "lumbar": { "deadband_deg": 3.0 }, "stability": { "window_size": 90 } }"#,
        )
        .unwrap();

        assert_eq!(config.lumbar.deadband_deg, 3.0);
        assert_eq!(config.lumbar.flexion_scale, LumbarConfig::default().flexion_scale);
        assert_eq!(config.stability.window_size, 90);
        assert_eq!(config.stability.min_phase_frames, StabilityConfig::default().min_phase_frames);
        assert_eq!(config.filter_capacity, ANGLE_FILTER_CAPACITY);
        assert!(config.analyze_smoothed);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(SessionConfig::from_json("{}").unwrap(), SessionConfig::default());
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(SessionConfig::from_json("{ lumbar: ").is_err());
        assert!(SessionConfig::from_json(r#"{ "filter_capacity": "three" }"#).is_err());
    }

    #[test]
    fn test_default_is_valid() {
        assert_eq!(SessionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_inverted_envelope_rejected() {
        let config = SessionConfig::from_json(r#"{ "lumbar": { "min_angle_deg": 70.0 } }"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("min_angle_deg"), "{}", err);
    }

    #[test]
    fn test_non_finite_and_negative_rejected() {
        let mut config = SessionConfig::default();
        config.lumbar.max_angle_deg = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.lumbar.flexion_scale = -0.5;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.stability.movement_threshold_deg = f32::INFINITY;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.lumbar.forward_sign = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_visibility_out_of_range_rejected() {
        for visibility in [-0.1, 1.5, f32::NAN] {
            let mut config = SessionConfig::default();
            config.min_visibility = visibility;
            assert!(config.validate().is_err(), "accepted {}", visibility);
        }
    }

    #[test]
    fn test_buffer_sizes_bounded() {
        let huge = r#"{ "stability": { "window_size": 4000000000 } }"#;
        let config = SessionConfig::from_json(huge).unwrap();
        assert!(config.validate().unwrap_err().contains("window_size"));

        let mut config = SessionConfig::default();
        config.filter_capacity = usize::MAX;
        assert!(config.validate().unwrap_err().contains("filter_capacity"));

        config.filter_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = SessionConfig::default();
        config.stability.min_phase_frames = config.stability.window_size + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = SessionConfig::default();
        config.min_visibility = 0.7;
        let json = config.to_json().unwrap();
        assert_eq!(SessionConfig::from_json(&json).unwrap(), config);
    }
}
