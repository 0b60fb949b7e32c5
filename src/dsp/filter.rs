//! Low-shelf biquad — matches the WebAudio BiquadFilterNode `lowshelf` response.

use std::f64::consts::PI;

/// A second-order low-shelf filter boosting frequencies below the
/// shelf frequency by `gain_db`, leaving higher frequencies untouched.
///
/// Implements the standard Direct Form II Transposed structure.
/// Coefficient formulas from the Audio EQ Cookbook (Robert
/// Bristow-Johnson) with fixed shelf slope S = 1, the configuration
/// BiquadFilterNode uses for `lowshelf` (Q has no effect on this
/// type).
#[derive(Debug, Clone)]
pub struct LowShelf {
    pub frequency: f64,
    pub gain_db: f64,

    // Coefficients
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,

    // State (Direct Form II Transposed)
    z1: f64,
    z2: f64,

    sample_rate: f64,
    dirty: bool,
}

impl LowShelf {
    pub fn new(sample_rate: f64, frequency: f64, gain_db: f64) -> Self {
        let mut f = LowShelf {
            frequency,
            gain_db,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            z1: 0.0,
            z2: 0.0,
            sample_rate,
            dirty: true,
        };
        f.update_coefficients();
        f
    }

    /// Recompute filter coefficients from current parameters.
    pub fn update_coefficients(&mut self) {
        let a = (10.0_f64).powf(self.gain_db / 40.0);
        let w0 = 2.0 * PI * self.frequency / self.sample_rate;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();
        // S = 1: alpha = sin(w0)/2 * sqrt((A + 1/A)(1/S - 1) + 2)
        let alpha = sin_w0 / 2.0 * (2.0_f64).sqrt();
        let shelf = 2.0 * a.sqrt() * alpha;

        let b0 = a * ((a + 1.0) - (a - 1.0) * cos_w0 + shelf);
        let b1 = 2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0);
        let b2 = a * ((a + 1.0) - (a - 1.0) * cos_w0 - shelf);
        let a0 = (a + 1.0) + (a - 1.0) * cos_w0 + shelf;
        let a1 = -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0);
        let a2 = (a + 1.0) + (a - 1.0) * cos_w0 - shelf;

        // Normalize by a0
        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
        self.dirty = false;
    }

    /// Process a single sample through the filter.
    pub fn process(&mut self, input: f64) -> f64 {
        if self.dirty {
            self.update_coefficients();
        }

        let output = self.b0 * input + self.z1;
        self.z1 = self.b1 * input - self.a1 * output + self.z2;
        self.z2 = self.b2 * input - self.a2 * output;
        output
    }

    /// Reset filter state.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    /// Set shelf gain and mark coefficients dirty.
    pub fn set_gain_db(&mut self, gain_db: f64) {
        self.gain_db = gain_db;
        self.dirty = true;
    }
}
