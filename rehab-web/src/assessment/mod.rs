//! Assessment module - one session per active movement test
//!
//! Re-exports only. All logic in submodules.

mod config;
mod session;
mod test_type;

pub use config::{SessionConfig, DEFAULT_MIN_VISIBILITY, MAX_FILTER_CAPACITY, MAX_STABILITY_WINDOW};
pub use session::{AssessmentSession, FrameInput, FrameMetrics};
pub use test_type::{MovementTest, MOVEMENT_TESTS};
