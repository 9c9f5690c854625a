//! Landmark storage and JS bridge
//!
//! Receives MediaPipe Pose landmarks from JavaScript, stores the latest frame
//! and derives the body midpoints the assessment session consumes.

use nalgebra::Point3;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

// ============================================================================
// LANDMARK INDICES (MediaPipe Pose - 33 total)
// ============================================================================

pub const LANDMARK_COUNT: usize = 33;

pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// Left/right pairs every frame needs
const REQUIRED_PAIRS: [(usize, usize); 3] = [
    (LEFT_SHOULDER, RIGHT_SHOULDER),
    (LEFT_HIP, RIGHT_HIP),
    (LEFT_KNEE, RIGHT_KNEE),
];

/// Flat layout without visibility: x, y, z
const XYZ_LEN: usize = LANDMARK_COUNT * 3;
/// Flat layout with visibility: x, y, z, visibility
const XYZV_LEN: usize = LANDMARK_COUNT * 4;

// ============================================================================
// LANDMARK DATA STRUCTURE
// ============================================================================

/// A single 3D landmark point (normalized coordinates)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32, // 0-1 normalized
    pub y: f32, // 0-1 normalized, grows downward
    pub z: f32, // Relative depth
    pub visibility: Option<f32>,
}

impl Landmark {
    pub fn position(&self) -> Point3<f32> {
        Point3::new(self.x, self.y, self.z)
    }

    /// Missing visibility counts as visible
    pub fn is_visible(&self, min_visibility: f32) -> bool {
        self.visibility.map_or(true, |v| v >= min_visibility)
    }
}

/// Shoulder, hip, knee and (optionally) ankle midpoints
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyMidpoints {
    pub shoulder_mid: Point3<f32>,
    pub hip_mid: Point3<f32>,
    pub knee_mid: Point3<f32>,
    pub ankle_mid: Option<Point3<f32>>,
}

/// Reasons a frame cannot be turned into midpoints
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LandmarkError {
    NoData,
    InvalidLength(usize),
    LowVisibility { index: usize, visibility: f32 },
    MissingAnkle,
}

impl LandmarkError {
    pub fn message(&self) -> String {
        match self {
            LandmarkError::NoData => "No landmark data received yet".to_string(),
            LandmarkError::InvalidLength(len) => format!(
                "Invalid landmark data length: {} (expected {} or {})",
                len, XYZ_LEN, XYZV_LEN
            ),
            LandmarkError::LowVisibility { index, visibility } => format!(
                "Landmark {} not visible enough: {:.2}",
                index, visibility
            ),
            LandmarkError::MissingAnkle => "Ankles not visible (required for knee extension)".to_string(),
        }
    }
}

impl From<LandmarkError> for JsValue {
    fn from(err: LandmarkError) -> Self {
        JsValue::from_str(&err.message())
    }
}

/// Internal storage for current frame's landmarks
struct LandmarkStore {
    landmarks: [Landmark; LANDMARK_COUNT],
    has_data: bool,
}

impl Default for LandmarkStore {
    fn default() -> Self {
        Self {
            landmarks: [Landmark::default(); LANDMARK_COUNT],
            has_data: false,
        }
    }
}

// Thread-local storage (WASM is single-threaded)
thread_local! {
    static LANDMARKS: RefCell<LandmarkStore> = RefCell::new(LandmarkStore::default());
}

// ============================================================================
// WASM-BINDGEN ENTRY POINTS
// ============================================================================

/// Called from JavaScript with a flat Float32Array of either
/// 99 values (33 × x, y, z) or 132 values (33 × x, y, z, visibility)
#[wasm_bindgen]
pub fn update_landmarks(data: &[f32]) {
    let landmarks = match parse_landmarks(data) {
        Ok(landmarks) => landmarks,
        Err(err) => {
            web_sys::console::warn_1(&err.message().into());
            return;
        }
    };

    LANDMARKS.with(|store_cell| {
        let mut store = store_cell.borrow_mut();
        store.landmarks = landmarks;
        store.has_data = true;
    });
}

/// Called from JavaScript when the pose is lost
#[wasm_bindgen]
pub fn clear_landmarks() {
    LANDMARKS.with(|store_cell| {
        store_cell.borrow_mut().has_data = false;
    });
}

// ============================================================================
// INTERNAL API (no wasm_bindgen)
// ============================================================================

/// Get all current landmarks
pub fn get_all_landmarks() -> Option<[Landmark; LANDMARK_COUNT]> {
    LANDMARKS.with(|store_cell| {
        let store = store_cell.borrow();
        if store.has_data {
            Some(store.landmarks)
        } else {
            None
        }
    })
}

/// Decode a flat landmark array
pub fn parse_landmarks(data: &[f32]) -> Result<[Landmark; LANDMARK_COUNT], LandmarkError> {
    let stride = match data.len() {
        XYZ_LEN => 3,
        XYZV_LEN => 4,
        len => return Err(LandmarkError::InvalidLength(len)),
    };

    let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
    for (landmark, chunk) in landmarks.iter_mut().zip(data.chunks_exact(stride)) {
        *landmark = Landmark {
            x: chunk[0],
            y: chunk[1],
            z: chunk[2],
            visibility: chunk.get(3).copied(),
        };
    }
    Ok(landmarks)
}

/// Average left/right pairs into body midpoints
///
/// Shoulders, hips and knees must all pass `min_visibility`; ankles are
/// optional and only averaged when both are visible.
pub fn body_midpoints(
    landmarks: &[Landmark; LANDMARK_COUNT],
    min_visibility: f32,
) -> Result<BodyMidpoints, LandmarkError> {
    for &(left, right) in REQUIRED_PAIRS.iter() {
        for index in [left, right] {
            let landmark = &landmarks[index];
            if !landmark.is_visible(min_visibility) {
                return Err(LandmarkError::LowVisibility {
                    index,
                    visibility: landmark.visibility.unwrap_or(0.0),
                });
            }
        }
    }

    let midpoint = |left: usize, right: usize| {
        nalgebra::center(&landmarks[left].position(), &landmarks[right].position())
    };

    let ankles_visible = landmarks[LEFT_ANKLE].is_visible(min_visibility)
        && landmarks[RIGHT_ANKLE].is_visible(min_visibility);

    Ok(BodyMidpoints {
        shoulder_mid: midpoint(LEFT_SHOULDER, RIGHT_SHOULDER),
        hip_mid: midpoint(LEFT_HIP, RIGHT_HIP),
        knee_mid: midpoint(LEFT_KNEE, RIGHT_KNEE),
        ankle_mid: ankles_visible.then(|| midpoint(LEFT_ANKLE, RIGHT_ANKLE)),
    })
}
