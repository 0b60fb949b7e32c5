//! Pan automation — the rotating stereo "spatial" effect.
//!
//! One speed table and one value formula serve both paths: the offline
//! renderer consumes a precomputed curve of scheduled points, the live
//! preview advances a continuous oscillator once per animation frame.
//! Both pre-increment the angle before producing a value, so the first
//! emitted pan is `sin(speed)`, never `sin(0)`.

use crate::settings::SpatialMode;

/// Automation tick length in seconds (one display frame at 60 Hz).
pub const AUTOMATION_STEP: f64 = 1.0 / 60.0;

/// Angle advance per automation tick, in radians.
pub fn pan_speed(mode: SpatialMode) -> f64 {
    match mode {
        SpatialMode::Off => 0.0,
        SpatialMode::EightD => 0.005,
        SpatialMode::SixteenD => 0.015,
        SpatialMode::ThirtyTwoD => 0.03,
        SpatialMode::FortyEightD => 0.06,
    }
}

/// Pan position for a given accumulated angle.
///
/// 48d layers a half-rate cosine onto the sine rotation for its
/// amplitude-modulated sweep; every other mode is a plain sine.
pub fn pan_value(mode: SpatialMode, angle: f64) -> f64 {
    match mode {
        SpatialMode::FortyEightD => angle.sin() * (angle * 0.5).cos(),
        _ => angle.sin(),
    }
}

/// One scheduled automation point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanPoint {
    /// Seconds from render start.
    pub time: f64,
    /// Pan position in [-1, 1].
    pub pan: f32,
}

/// The full automation curve for one offline render.
pub type PanCurve = Vec<PanPoint>;

/// Build the scheduled pan curve for an offline render.
///
/// Walks `t` from 0 in steps of [`AUTOMATION_STEP`] while
/// `t <= render_seconds` (the end boundary is included), advancing the
/// angle before each point. `Off` yields no curve; the renderer then
/// holds pan at 0. Pure function: identical inputs produce identical
/// curves.
pub fn build_pan_curve(mode: SpatialMode, render_seconds: f64) -> Option<PanCurve> {
    if mode == SpatialMode::Off {
        return None;
    }

    let speed = pan_speed(mode);
    let mut points = Vec::with_capacity((render_seconds * 60.0) as usize + 2);
    let mut t = 0.0_f64;
    let mut angle = 0.0_f64;
    while t <= render_seconds {
        angle += speed;
        points.push(PanPoint {
            time: t,
            pan: pan_value(mode, angle) as f32,
        });
        t += AUTOMATION_STEP;
    }
    Some(points)
}

/// Continuous pan state for the live preview path.
///
/// The angle persists across mode changes, matching the original
/// behavior of the animation loop; callers simply stop ticking while
/// spatial is off.
#[derive(Debug, Clone)]
pub struct PanOscillator {
    mode: SpatialMode,
    angle: f64,
}

impl PanOscillator {
    pub fn new(mode: SpatialMode) -> Self {
        PanOscillator { mode, angle: 0.0 }
    }

    pub fn mode(&self) -> SpatialMode {
        self.mode
    }

    /// Switch modes. The accumulated angle is kept.
    pub fn set_mode(&mut self, mode: SpatialMode) {
        self.mode = mode;
    }

    /// Advance one animation frame and return the new pan position.
    pub fn tick(&mut self) -> f64 {
        self.angle += pan_speed(self.mode);
        pan_value(self.mode, self.angle)
    }
}
