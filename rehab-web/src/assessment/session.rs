//! Per-test assessment session
//!
//! Owns exactly one smoothing filter and one stability analyzer. Frames must
//! be delivered sequentially; a reset is a session boundary and must not race
//! with a frame.

use nalgebra::Point3;
use serde::Serialize;

use crate::biomech::{
    calculate_lumbar_angle, hip_angle, knee_angle, AngleFilter, StabilityAnalyzer,
    StabilityResult,
};
use super::config::SessionConfig;
use super::test_type::MovementTest;

/// Body midpoints for one frame (left/right pairs already averaged)
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    pub shoulder_mid: Point3<f32>,
    pub hip_mid: Point3<f32>,
    pub knee_mid: Point3<f32>,
    pub ankle_mid: Option<Point3<f32>>,
    /// Monotonically increasing, milliseconds
    pub timestamp_ms: f64,
}

/// Per-frame angles in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FrameMetrics {
    pub raw_lumbar_angle: f32,
    /// Smoothed lumbar angle for display
    pub lumbar_angle: f32,
    pub hip_angle: f32,
    /// Present when an ankle midpoint was supplied
    pub knee_angle: Option<f32>,
}

pub struct AssessmentSession {
    test: MovementTest,
    config: SessionConfig,
    angle_filter: AngleFilter,
    analyzer: StabilityAnalyzer,
    frames_processed: u64,
}

impl AssessmentSession {
    pub fn new(test: MovementTest) -> Self {
        Self::with_config(test, SessionConfig::default())
    }

    pub fn with_config(test: MovementTest, config: SessionConfig) -> Self {
        Self {
            test,
            config,
            angle_filter: AngleFilter::with_capacity(config.filter_capacity),
            analyzer: StabilityAnalyzer::with_config(config.stability),
            frames_processed: 0,
        }
    }

    pub fn test(&self) -> MovementTest {
        self.test
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Switch test type. Returns true (and resets all state) if it changed.
    pub fn set_test(&mut self, test: MovementTest) -> bool {
        if test == self.test {
            return false;
        }
        self.test = test;
        self.reset();
        true
    }

    /// Replace the configuration; starts a fresh session
    pub fn configure(&mut self, config: SessionConfig) {
        *self = Self::with_config(self.test, config);
    }

    /// Retune lumbar scaling. Filter and stability history are cleared so
    /// old and new scales are never mixed.
    pub fn set_lumbar_params(&mut self, deadband_deg: f32, flexion_scale: f32, extension_scale: f32) {
        self.config
            .lumbar
            .set_params(deadband_deg, flexion_scale, extension_scale);
        self.angle_filter.reset();
        self.analyzer.reset();
    }

    /// New recording: clear filter and stability history
    pub fn reset(&mut self) {
        self.angle_filter.reset();
        self.analyzer.reset();
        self.frames_processed = 0;
    }

    /// Clear only the smoothing filter
    pub fn reset_angle_filter(&mut self) {
        self.angle_filter.reset();
    }

    /// Run one frame through estimator, filter and analyzer
    pub fn process_frame(&mut self, frame: &FrameInput) -> FrameMetrics {
        let lumbar = &self.config.lumbar;

        let raw_lumbar_angle = calculate_lumbar_angle(&frame.shoulder_mid, &frame.hip_mid, lumbar);
        let lumbar_angle = self.angle_filter.filter(raw_lumbar_angle);
        let hip = hip_angle(
            &frame.shoulder_mid,
            &frame.hip_mid,
            &frame.knee_mid,
            lumbar.forward_sign,
        );
        let knee = frame
            .ankle_mid
            .map(|ankle| knee_angle(&frame.hip_mid, &frame.knee_mid, &ankle));

        let analyzed = if self.config.analyze_smoothed {
            lumbar_angle
        } else {
            raw_lumbar_angle
        };
        self.analyzer.add_data_point(analyzed, hip, frame.timestamp_ms);
        self.frames_processed += 1;

        FrameMetrics {
            raw_lumbar_angle,
            lumbar_angle,
            hip_angle: hip,
            knee_angle: knee,
        }
    }

    /// Stability snapshot over the current window
    pub fn analyze(&self) -> StabilityResult {
        self.analyzer.analyze()
    }
}

impl Default for AssessmentSession {
    fn default() -> Self {
        Self::new(MovementTest::default())
    }
}
