//! Dynamic hip/lumbar stability analysis
//!
//! Buffers a rolling window of (lumbar, hip, timestamp) samples. On demand it
//! segments the hip-angle history into movement phases and scores how much
//! lumbar motion accompanies the hip motion inside those phases.
//!
//! Total by construction: empty or degenerate input degrades to neutral
//! values, never to an error.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Rolling window length (~5 s at 30 fps)
pub const STABILITY_WINDOW: usize = 150;

/// Below this many samples only an endpoint estimate is produced
pub const MIN_ANALYSIS_SAMPLES: usize = 10;

/// Frame-to-frame hip change that opens a phase (degrees).
/// A phase closes once the change drops below half of this.
pub const MOVEMENT_THRESHOLD_DEG: f32 = 2.0;

/// Shortest retained phase (~0.5 s at 30 fps)
pub const MIN_PHASE_FRAMES: usize = 15;

/// Share of hip range that lumbar motion may follow without penalty
pub const COUPLING_ALLOWANCE: f32 = 0.3;

/// Endpoint hip delta below which the endpoint estimate has nothing to
/// normalize against (degrees)
pub const MIN_USEFUL_DELTA_DEG: f32 = 1.0;

/// Score reported alongside a `Fair` grade when there is no usable motion
pub const NEUTRAL_SCORE: f32 = 50.0;

/// Tunable constants for [`StabilityAnalyzer`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    pub window_size: usize,
    pub min_samples: usize,
    pub movement_threshold_deg: f32,
    pub min_phase_frames: usize,
    pub coupling_allowance: f32,
    pub min_useful_delta_deg: f32,
}

impl StabilityConfig {
    /// 30 fps video preset
    pub fn for_video_30fps() -> Self {
        Self {
            window_size: STABILITY_WINDOW,
            min_samples: MIN_ANALYSIS_SAMPLES,
            movement_threshold_deg: MOVEMENT_THRESHOLD_DEG,
            min_phase_frames: MIN_PHASE_FRAMES,
            coupling_allowance: COUPLING_ALLOWANCE,
            min_useful_delta_deg: MIN_USEFUL_DELTA_DEG,
        }
    }
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self::for_video_30fps()
    }
}

/// Qualitative stability grade
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilityGrade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl StabilityGrade {
    pub fn from_score(score: f32) -> Self {
        if score >= 80.0 {
            StabilityGrade::Excellent
        } else if score >= 60.0 {
            StabilityGrade::Good
        } else if score >= 40.0 {
            StabilityGrade::Fair
        } else {
            StabilityGrade::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StabilityGrade::Excellent => "excellent",
            StabilityGrade::Good => "good",
            StabilityGrade::Fair => "fair",
            StabilityGrade::Poor => "poor",
        }
    }

    /// Index for flat JS arrays (0 = excellent .. 3 = poor)
    pub fn index(&self) -> usize {
        match self {
            StabilityGrade::Excellent => 0,
            StabilityGrade::Good => 1,
            StabilityGrade::Fair => 2,
            StabilityGrade::Poor => 3,
        }
    }
}

/// A contiguous span of hip movement within the current window
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovementPhase {
    /// Window index where movement starts
    pub start_index: usize,
    /// Window index of the last moving sample (inclusive)
    pub end_index: usize,
    /// max - min hip angle within the phase
    pub hip_range: f32,
    /// max - min lumbar angle over the same span
    pub lumbar_range: f32,
    /// Timestamp span of the phase
    pub duration_ms: f64,
}

/// Snapshot produced by [`StabilityAnalyzer::analyze`]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StabilityResult {
    pub hip_movement_phases: Vec<MovementPhase>,
    /// 0-100: 100 = lumbar perfectly still while the hip moves
    pub lumbar_stability_score: f32,
    /// Lumbar range beyond the allowed coupling baseline (degrees)
    pub lumbar_excessive_movement: f32,
    pub hip_lumbar_ratio: f32,
    pub stability_grade: StabilityGrade,
    /// Samples the snapshot was computed from
    pub sample_count: usize,
}

impl StabilityResult {
    fn from_ranges(
        phases: Vec<MovementPhase>,
        lumbar_range: f32,
        hip_range: f32,
        coupling_allowance: f32,
        sample_count: usize,
    ) -> Self {
        let ratio = if hip_range > 0.0 {
            lumbar_range / hip_range
        } else {
            0.0
        };
        let score = (100.0 - ratio * 100.0).max(0.0);
        let excessive = (lumbar_range - coupling_allowance * hip_range).max(0.0);

        Self {
            hip_movement_phases: phases,
            lumbar_stability_score: score,
            lumbar_excessive_movement: excessive,
            hip_lumbar_ratio: ratio,
            stability_grade: StabilityGrade::from_score(score),
            sample_count,
        }
    }

    fn neutral(sample_count: usize) -> Self {
        Self {
            hip_movement_phases: Vec::new(),
            lumbar_stability_score: NEUTRAL_SCORE,
            lumbar_excessive_movement: 0.0,
            hip_lumbar_ratio: 0.0,
            stability_grade: StabilityGrade::Fair,
            sample_count,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct StabilitySample {
    lumbar: f32,
    hip: f32,
    timestamp_ms: f64,
}

/// Rolling-window hip/lumbar movement analyzer
pub struct StabilityAnalyzer {
    /// Oldest sample at the front
    history: VecDeque<StabilitySample>,
    config: StabilityConfig,
}

impl StabilityAnalyzer {
    pub fn new() -> Self {
        Self::with_config(StabilityConfig::default())
    }

    pub fn with_config(config: StabilityConfig) -> Self {
        let config = StabilityConfig {
            window_size: config.window_size.max(1),
            ..config
        };
        Self {
            history: VecDeque::with_capacity(config.window_size.min(STABILITY_WINDOW)),
            config,
        }
    }

    /// Append one frame, evicting the oldest beyond the window
    pub fn add_data_point(&mut self, lumbar_angle: f32, hip_angle: f32, timestamp_ms: f64) {
        self.history.push_back(StabilitySample {
            lumbar: lumbar_angle,
            hip: hip_angle,
            timestamp_ms,
        });
        while self.history.len() > self.config.window_size {
            self.history.pop_front();
        }
    }

    /// Analyze the current window
    pub fn analyze(&self) -> StabilityResult {
        let n = self.history.len();
        if n < self.config.min_samples {
            return self.estimate_from_endpoints();
        }

        let phases = self.detect_phases();
        let hip_total: f32 = phases.iter().map(|p| p.hip_range).sum();
        let lumbar_total: f32 = phases.iter().map(|p| p.lumbar_range).sum();

        StabilityResult::from_ranges(
            phases,
            lumbar_total,
            hip_total,
            self.config.coupling_allowance,
            n,
        )
    }

    /// Whole-window first/last delta estimate for short histories
    fn estimate_from_endpoints(&self) -> StabilityResult {
        let n = self.history.len();
        let (first, last) = match (self.history.front(), self.history.back()) {
            (Some(first), Some(last)) => (first, last),
            _ => return StabilityResult::neutral(0),
        };

        let hip_delta = (last.hip - first.hip).abs();
        let lumbar_delta = (last.lumbar - first.lumbar).abs();
        if hip_delta < self.config.min_useful_delta_deg {
            return StabilityResult::neutral(n);
        }

        StabilityResult::from_ranges(
            Vec::new(),
            lumbar_delta,
            hip_delta,
            self.config.coupling_allowance,
            n,
        )
    }

    /// Segment the hip history into movement phases
    ///
    /// A phase opens when the frame-to-frame hip change exceeds the movement
    /// threshold and closes when it drops below half of it. Phases shorter
    /// than `min_phase_frames` are discarded; a phase still open at the end
    /// of the window is kept if long enough.
    fn detect_phases(&self) -> Vec<MovementPhase> {
        let start_threshold = self.config.movement_threshold_deg;
        let end_threshold = start_threshold / 2.0;

        let mut phases = Vec::new();
        let mut open: Option<usize> = None;

        for i in 1..self.history.len() {
            let change = (self.history[i].hip - self.history[i - 1].hip).abs();
            match open {
                None if change > start_threshold => open = Some(i - 1),
                Some(start) if change < end_threshold => {
                    self.close_phase(start, i - 1, &mut phases);
                    open = None;
                }
                _ => {}
            }
        }

        if let Some(start) = open {
            self.close_phase(start, self.history.len() - 1, &mut phases);
        }

        phases
    }

    fn close_phase(&self, start: usize, end: usize, phases: &mut Vec<MovementPhase>) {
        if end - start < self.config.min_phase_frames {
            return;
        }

        let span = || self.history.range(start..=end);
        phases.push(MovementPhase {
            start_index: start,
            end_index: end,
            hip_range: range(span().map(|s| s.hip)),
            lumbar_range: range(span().map(|s| s.lumbar)),
            duration_ms: self.history[end].timestamp_ms - self.history[start].timestamp_ms,
        });
    }

    /// Drop all history (test type change, new recording)
    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn config(&self) -> &StabilityConfig {
        &self.config
    }
}

impl Default for StabilityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// max - min of a sequence; 0 when empty
fn range(values: impl Iterator<Item = f32>) -> f32 {
    let (min, max) = values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if max >= min {
        max - min
    } else {
        0.0
    }
}
