//! Effects chain builder — the single parameter source for both paths.
//!
//! Live preview and offline render each call [`build_chain`] (or the
//! individual tables) instead of carrying their own copies, so the
//! bass gains and pan speeds cannot drift between what the user hears
//! and what the exported file contains.

use crate::dsp::pan::{PanCurve, build_pan_curve};
use crate::settings::{BassMode, EffectSettings};

/// Center frequency of the bass low-shelf filter, in Hz.
pub const BASS_SHELF_HZ: f64 = 200.0;

/// Low-shelf gain for a bass preset, in dB.
pub fn bass_gain_db(mode: BassMode) -> f64 {
    match mode {
        BassMode::Off => 0.0,
        BassMode::Low => 5.0,
        BassMode::Medium => 10.0,
        BassMode::High => 15.0,
        BassMode::Extra => 20.0,
        BassMode::Earthquake => 40.0,
    }
}

/// The parameter set shared by live playback and offline render.
#[derive(Debug, Clone)]
pub struct EffectChain {
    /// Gain of the 200 Hz low-shelf, in dB.
    pub bass_gain_db: f64,
    /// Scheduled pan automation, absent when spatial is off.
    pub pan_curve: Option<PanCurve>,
}

/// Build the chain parameters for one render.
///
/// Pure function: no I/O, no shared state.
pub fn build_chain(settings: EffectSettings, render_seconds: f64) -> EffectChain {
    EffectChain {
        bass_gain_db: bass_gain_db(settings.bass),
        pan_curve: build_pan_curve(settings.spatial, render_seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SpatialMode;

    #[test]
    fn bass_gain_table() {
        assert_eq!(bass_gain_db(BassMode::Off), 0.0);
        assert_eq!(bass_gain_db(BassMode::Low), 5.0);
        assert_eq!(bass_gain_db(BassMode::Medium), 10.0);
        assert_eq!(bass_gain_db(BassMode::High), 15.0);
        assert_eq!(bass_gain_db(BassMode::Extra), 20.0);
        assert_eq!(bass_gain_db(BassMode::Earthquake), 40.0);
    }

    #[test]
    fn spatial_off_has_no_curve() {
        let chain = build_chain(
            EffectSettings {
                bass: BassMode::High,
                spatial: SpatialMode::Off,
            },
            60.0,
        );
        assert_eq!(chain.bass_gain_db, 15.0);
        assert!(chain.pan_curve.is_none());
    }

    #[test]
    fn chain_is_pure() {
        let settings = EffectSettings {
            bass: BassMode::Earthquake,
            spatial: SpatialMode::ThirtyTwoD,
        };
        let a = build_chain(settings, 30.0);
        let b = build_chain(settings, 30.0);
        assert_eq!(a.bass_gain_db, b.bass_gain_db);
        assert_eq!(a.pan_curve, b.pan_curve);
    }

    #[test]
    fn curve_spans_render_window() {
        let chain = build_chain(
            EffectSettings {
                bass: BassMode::Off,
                spatial: SpatialMode::EightD,
            },
            10.0,
        );
        let curve = chain.pan_curve.unwrap();
        assert_eq!(curve.first().unwrap().time, 0.0);
        let last = curve.last().unwrap().time;
        assert!(last <= 10.0 && last > 10.0 - 2.0 / 60.0);
    }
}
