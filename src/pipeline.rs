//! Offline render pipeline — decode, chain, render, encode, record.
//!
//! Drives one export end to end: source bytes are decoded, the render
//! duration is clamped, the effects chain is built once, the offline
//! engine fills the buffer, and the WAV bytes plus a suggested
//! filename land in the history store — exactly once per successful
//! render, never on failure.

use std::cell::Cell;

use log::{debug, warn};

use crate::decode::decode;
use crate::dsp::chain::build_chain;
use crate::dsp::render::OfflineRenderer;
use crate::dsp::wav::encode_wav;
use crate::error::ExportError;
use crate::history::HistoryStore;
use crate::settings::EffectSettings;

/// Floor of the render window, in seconds.
pub const MIN_RENDER_SECONDS: u32 = 10;
/// Ceiling of the render window, in seconds. Bounds output size for
/// long sources.
pub const MAX_RENDER_SECONDS: u32 = 120;

/// Observable pipeline state. `Failed` records the failing stage of
/// the most recent attempt; the pipeline itself stays usable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderState {
    #[default]
    Idle,
    Decoding,
    Rendering,
    Encoding,
    Done,
    Failed(FailureKind),
}

/// Which stage a failed attempt died in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Decode,
    Render,
}

/// Result of a successful render.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// The encoded WAV container.
    pub wav: Vec<u8>,
    /// Suggested download filename.
    pub file_name: String,
    /// Length of the rendered window.
    pub render_seconds: u32,
}

/// Clamp a source duration to the render window:
/// `clamp(ceil(duration), 10, 120)`.
pub fn render_duration_seconds(duration: f64) -> u32 {
    duration
        .ceil()
        .clamp(MIN_RENDER_SECONDS as f64, MAX_RENDER_SECONDS as f64) as u32
}

/// Suggested filename for an export, both mode tokens upper-cased.
pub fn suggested_filename(settings: EffectSettings) -> String {
    format!(
        "quake1_{}_{}.wav",
        settings.spatial.wire_name().to_uppercase(),
        settings.bass.wire_name().to_uppercase()
    )
}

/// One render pipeline per loaded source, owning its history store.
#[derive(Debug, Default)]
pub struct RenderPipeline {
    history: HistoryStore,
    state: Cell<RenderState>,
    busy: Cell<bool>,
}

impl RenderPipeline {
    pub fn new() -> Self {
        RenderPipeline::default()
    }

    /// Start from an existing history store (e.g. one reloaded from
    /// the archive).
    pub fn with_history(history: HistoryStore) -> Self {
        RenderPipeline {
            history,
            ..RenderPipeline::default()
        }
    }

    pub fn state(&self) -> RenderState {
        self.state.get()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    /// Render `source_bytes` with a settings snapshot taken at call
    /// time. `now_ms` stamps the history record.
    ///
    /// Only one render may be in flight per pipeline; a second request
    /// while one is active is rejected with [`ExportError::Busy`]
    /// rather than racing the first.
    pub fn render_to_wav(
        &mut self,
        source_bytes: &[u8],
        settings: EffectSettings,
        now_ms: u64,
    ) -> Result<RenderOutput, ExportError> {
        if self.busy.replace(true) {
            return Err(ExportError::Busy);
        }
        let result = self.run(source_bytes, settings, now_ms);
        self.busy.set(false);
        result
    }

    fn run(
        &mut self,
        source_bytes: &[u8],
        settings: EffectSettings,
        now_ms: u64,
    ) -> Result<RenderOutput, ExportError> {
        self.state.set(RenderState::Decoding);
        debug!("decoding {} source bytes", source_bytes.len());
        let decoded = match decode(source_bytes) {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!("decode failed: {e}");
                self.state.set(RenderState::Failed(FailureKind::Decode));
                return Err(e.into());
            }
        };

        let render_seconds = render_duration_seconds(decoded.duration());
        let frame_count = decoded.sample_rate() as usize * render_seconds as usize;

        self.state.set(RenderState::Rendering);
        debug!(
            "rendering {render_seconds}s: {} ch, {frame_count} frames @ {} Hz",
            decoded.num_channels(),
            decoded.sample_rate()
        );
        let chain = build_chain(settings, render_seconds as f64);
        let rendered = OfflineRenderer::new(
            decoded.num_channels(),
            frame_count,
            decoded.sample_rate(),
        )
        .and_then(|renderer| renderer.render(&decoded, &chain));
        let rendered = match rendered {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!("render failed: {e}");
                self.state.set(RenderState::Failed(FailureKind::Render));
                return Err(e.into());
            }
        };

        self.state.set(RenderState::Encoding);
        let wav = encode_wav(&rendered);

        let file_name = suggested_filename(settings);
        self.history.append(wav.clone(), &file_name, now_ms);
        self.state.set(RenderState::Done);
        debug!("rendered {} bytes as {file_name}", wav.len());

        Ok(RenderOutput {
            wav,
            file_name,
            render_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::render::RenderedBuffer;
    use crate::settings::{BassMode, SpatialMode};

    /// A tiny valid stereo WAV source via our own encoder.
    fn source_wav(sample_rate: u32, frames: usize) -> Vec<u8> {
        let left: Vec<f32> = (0..frames).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        encode_wav(&RenderedBuffer {
            sample_rate,
            channels: vec![left, right],
        })
    }

    #[test]
    fn duration_clamping() {
        assert_eq!(render_duration_seconds(3.2), 10);
        assert_eq!(render_duration_seconds(45.9), 46);
        assert_eq!(render_duration_seconds(500.0), 120);
        assert_eq!(render_duration_seconds(10.0), 10);
        assert_eq!(render_duration_seconds(120.0), 120);
        assert_eq!(render_duration_seconds(0.0), 10);
    }

    #[test]
    fn filename_tokens_upper_cased() {
        assert_eq!(
            suggested_filename(EffectSettings {
                bass: BassMode::Earthquake,
                spatial: SpatialMode::EightD,
            }),
            "quake1_8D_EARTHQUAKE.wav"
        );
        assert_eq!(
            suggested_filename(EffectSettings::default()),
            "quake1_OFF_OFF.wav"
        );
    }

    #[test]
    fn happy_path_renders_and_records_once() {
        let mut pipeline = RenderPipeline::new();
        let source = source_wav(8000, 16);

        let out = pipeline
            .render_to_wav(&source, EffectSettings::default(), 1234)
            .unwrap();

        // 16 frames at 8 kHz is far below the floor: 10 s window
        assert_eq!(out.render_seconds, 10);
        assert_eq!(out.wav.len(), 44 + 10 * 8000 * 2 * 2);
        assert_eq!(&out.wav[0..4], b"RIFF");
        assert_eq!(
            u32::from_le_bytes(out.wav[24..28].try_into().unwrap()),
            8000
        );
        assert_eq!(out.file_name, "quake1_OFF_OFF.wav");

        assert_eq!(pipeline.state(), RenderState::Done);
        assert_eq!(pipeline.history().len(), 1);
        let record = pipeline.history().list_all().next().unwrap();
        assert_eq!(record.id, 1234);
        assert_eq!(record.display_name, "quake1_OFF_OFF.wav");
        assert_eq!(record.payload, out.wav);
    }

    #[test]
    fn spatial_render_differs_from_flat() {
        let mut pipeline = RenderPipeline::new();
        let source = source_wav(2000, 64);

        let flat = pipeline
            .render_to_wav(&source, EffectSettings::default(), 1)
            .unwrap();
        let spun = pipeline
            .render_to_wav(
                &source,
                EffectSettings {
                    bass: BassMode::Off,
                    spatial: SpatialMode::FortyEightD,
                },
                2,
            )
            .unwrap();

        assert_eq!(flat.wav.len(), spun.wav.len());
        assert_ne!(flat.wav, spun.wav);
        assert_eq!(spun.file_name, "quake1_48D_OFF.wav");
        assert_eq!(pipeline.history().len(), 2);
    }

    #[test]
    fn decode_failure_leaves_history_untouched() {
        let mut pipeline = RenderPipeline::new();

        let err = pipeline
            .render_to_wav(b"definitely not audio", EffectSettings::default(), 7)
            .unwrap_err();

        assert!(matches!(err, ExportError::Decode(_)));
        assert_eq!(pipeline.state(), RenderState::Failed(FailureKind::Decode));
        assert!(pipeline.history().is_empty());
    }

    #[test]
    fn pipeline_recovers_after_failure() {
        let mut pipeline = RenderPipeline::new();
        pipeline
            .render_to_wav(b"garbage", EffectSettings::default(), 1)
            .unwrap_err();

        let source = source_wav(4000, 8);
        let out = pipeline
            .render_to_wav(&source, EffectSettings::default(), 2)
            .unwrap();
        assert_eq!(out.render_seconds, 10);
        assert_eq!(pipeline.state(), RenderState::Done);
        assert_eq!(pipeline.history().len(), 1);
    }

    #[test]
    fn busy_pipeline_rejects_second_render() {
        let mut pipeline = RenderPipeline::new();
        // Simulate an in-flight render holding the guard
        pipeline.busy.set(true);

        let source = source_wav(4000, 8);
        let err = pipeline
            .render_to_wav(&source, EffectSettings::default(), 1)
            .unwrap_err();
        assert!(matches!(err, ExportError::Busy));
        assert!(pipeline.history().is_empty());

        // Releasing the guard unblocks the pipeline
        pipeline.busy.set(false);
        assert!(
            pipeline
                .render_to_wav(&source, EffectSettings::default(), 2)
                .is_ok()
        );
    }

    #[test]
    fn settings_snapshot_is_by_value() {
        // Mutating the caller's settings after the call cannot affect
        // the recorded render.
        let mut pipeline = RenderPipeline::new();
        let source = source_wav(4000, 8);
        let mut settings = EffectSettings {
            bass: BassMode::Low,
            spatial: SpatialMode::Off,
        };

        let out = pipeline.render_to_wav(&source, settings, 1).unwrap();
        settings.bass = BassMode::Earthquake;
        assert_eq!(out.file_name, "quake1_OFF_LOW.wav");
        assert_eq!(
            pipeline.history().list_all().next().unwrap().display_name,
            "quake1_OFF_LOW.wav"
        );
    }
}
