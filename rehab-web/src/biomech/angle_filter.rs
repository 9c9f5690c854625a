//! Recency-weighted angle smoothing
//!
//! Keeps the last few raw angles and returns a fixed-weight convex
//! combination with the newest sample weighted highest. Damps single-frame
//! detector noise while staying responsive to real movement.

use std::collections::VecDeque;

/// Default number of raw samples kept
pub const ANGLE_FILTER_CAPACITY: usize = 3;

/// Weights by buffer length, oldest first
const WEIGHTS_1: [f32; 1] = [1.0];
const WEIGHTS_2: [f32; 2] = [0.3, 0.7];
const WEIGHTS_3: [f32; 3] = [0.2, 0.3, 0.5];

/// Weighted moving filter for a single angle stream
pub struct AngleFilter {
    /// Raw samples, oldest at the front
    history: VecDeque<f32>,
    capacity: usize,
}

impl AngleFilter {
    pub fn new() -> Self {
        Self::with_capacity(ANGLE_FILTER_CAPACITY)
    }

    /// Capacity is at least 1
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity.min(ANGLE_FILTER_CAPACITY)),
            capacity,
        }
    }

    /// Push a raw angle and return the smoothed angle
    ///
    /// The first sample after construction or [`reset`](Self::reset) is
    /// returned unchanged.
    pub fn filter(&mut self, raw_angle: f32) -> f32 {
        self.history.push_back(raw_angle);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }

        match self.history.len() {
            1 => self.weighted(&WEIGHTS_1),
            2 => self.weighted(&WEIGHTS_2),
            3 => self.weighted(&WEIGHTS_3),
            len => {
                // Linear ramp i / Σi for longer buffers
                let total = (len * (len + 1) / 2) as f32;
                self.history
                    .iter()
                    .enumerate()
                    .map(|(i, a)| a * (i + 1) as f32 / total)
                    .sum()
            }
        }
    }

    fn weighted(&self, weights: &[f32]) -> f32 {
        self.history.iter().zip(weights).map(|(a, w)| a * w).sum()
    }

    /// Clear history (test type change, new recording)
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Number of buffered raw samples
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for AngleFilter {
    fn default() -> Self {
        Self::new()
    }
}
