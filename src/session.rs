//! Live playback session — explicit per-source state for the preview
//! path.
//!
//! The browser graph (media element source → low-shelf → panner →
//! gain → analyser) stays in JS; this value owns the parameters that
//! graph needs each frame, pulled from the same chain tables the
//! offline render uses. One session per loaded source, torn down with
//! it.

use crate::dsp::chain::bass_gain_db;
use crate::dsp::pan::PanOscillator;
use crate::settings::{BassMode, EffectSettings, SpatialMode};

#[derive(Debug, Clone)]
pub struct PlaybackSession {
    settings: EffectSettings,
    pan: PanOscillator,
}

impl PlaybackSession {
    pub fn new(settings: EffectSettings) -> Self {
        PlaybackSession {
            pan: PanOscillator::new(settings.spatial),
            settings,
        }
    }

    /// Advance the spatial oscillator by one animation frame.
    ///
    /// `None` while spatial is off; the caller parks the panner at 0.
    pub fn pan_tick(&mut self) -> Option<f64> {
        if self.settings.spatial == SpatialMode::Off {
            return None;
        }
        Some(self.pan.tick())
    }

    /// Switch the spatial mode. The pan angle carries over, like the
    /// original animation loop's.
    pub fn set_spatial(&mut self, mode: SpatialMode) {
        self.settings.spatial = mode;
        self.pan.set_mode(mode);
    }

    /// Switch the bass mode and return the new low-shelf target gain
    /// in dB (the UI ramps the filter to it over 0.5 s).
    pub fn set_bass(&mut self, mode: BassMode) -> f64 {
        self.settings.bass = mode;
        bass_gain_db(mode)
    }

    /// Current low-shelf gain in dB.
    pub fn bass_gain_db(&self) -> f64 {
        bass_gain_db(self.settings.bass)
    }

    /// Copy of the current settings, taken at render start so later
    /// UI changes cannot reach an in-flight render.
    pub fn snapshot(&self) -> EffectSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::pan::build_pan_curve;

    #[test]
    fn off_session_reports_no_pan() {
        let mut session = PlaybackSession::new(EffectSettings::default());
        assert_eq!(session.pan_tick(), None);
    }

    #[test]
    fn live_ticks_match_offline_curve() {
        let settings = EffectSettings {
            bass: BassMode::Off,
            spatial: SpatialMode::SixteenD,
        };
        let mut session = PlaybackSession::new(settings);
        let curve = build_pan_curve(SpatialMode::SixteenD, 1.0).unwrap();

        for (i, point) in curve.iter().enumerate() {
            assert_eq!(
                point.pan,
                session.pan_tick().unwrap() as f32,
                "preview diverged from render at tick {i}"
            );
        }
    }

    #[test]
    fn bass_changes_report_target_gain() {
        let mut session = PlaybackSession::new(EffectSettings::default());
        assert_eq!(session.bass_gain_db(), 0.0);
        assert_eq!(session.set_bass(BassMode::Extra), 20.0);
        assert_eq!(session.bass_gain_db(), 20.0);
    }

    #[test]
    fn pan_angle_survives_toggling_off() {
        let mut session = PlaybackSession::new(EffectSettings {
            bass: BassMode::Off,
            spatial: SpatialMode::EightD,
        });
        let first = session.pan_tick().unwrap();
        session.set_spatial(SpatialMode::Off);
        assert_eq!(session.pan_tick(), None);
        session.set_spatial(SpatialMode::EightD);
        let third = session.pan_tick().unwrap();

        // Two accumulated steps, not a restart
        let mut angle = 0.0_f64;
        angle += 0.005;
        assert_eq!(first, angle.sin());
        angle += 0.005;
        assert_eq!(third, angle.sin());
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut session = PlaybackSession::new(EffectSettings::default());
        let snapshot = session.snapshot();
        session.set_bass(BassMode::Earthquake);
        session.set_spatial(SpatialMode::FortyEightD);

        assert_eq!(snapshot.bass, BassMode::Off);
        assert_eq!(snapshot.spatial, SpatialMode::Off);
    }
}
