//! Offline render engine — non-realtime source → low-shelf → pan → buffer.
//!
//! Mirrors the browser's `OfflineAudioContext` graph: a looping buffer
//! source feeds a per-channel low-shelf filter and a stereo pan stage,
//! written into a fixed-length render target. Pan automation points are
//! sample-and-hold, matching `setValueAtTime` scheduling.

use std::f32::consts::FRAC_PI_2;

use crate::decode::DecodedAudio;
use crate::dsp::chain::{BASS_SHELF_HZ, EffectChain};
use crate::dsp::filter::LowShelf;
use crate::dsp::pan::PanPoint;
use crate::error::RenderError;

/// Output of one offline render. Same shape contract as
/// [`DecodedAudio`], but always exactly `frame_count` frames long.
#[derive(Debug, Clone)]
pub struct RenderedBuffer {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl RenderedBuffer {
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Frame count (samples per channel).
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fixed-shape non-realtime render target.
#[derive(Debug, Clone, Copy)]
pub struct OfflineRenderer {
    num_channels: usize,
    frame_count: usize,
    sample_rate: u32,
}

impl OfflineRenderer {
    /// Create a render target, validating the requested shape.
    ///
    /// The stereo pan stage limits output to one or two channels.
    pub fn new(
        num_channels: usize,
        frame_count: usize,
        sample_rate: u32,
    ) -> Result<Self, RenderError> {
        if num_channels == 0 {
            return Err(RenderError::NoChannels);
        }
        if num_channels > 2 {
            return Err(RenderError::TooManyChannels(num_channels));
        }
        if frame_count == 0 {
            return Err(RenderError::ZeroLength);
        }
        if sample_rate == 0 {
            return Err(RenderError::ZeroSampleRate);
        }
        Ok(OfflineRenderer {
            num_channels,
            frame_count,
            sample_rate,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Render the looping source through the effects chain.
    ///
    /// The source repeats (frame index modulo source length) until the
    /// render window is filled, so short clips cover the whole export.
    pub fn render(
        &self,
        source: &DecodedAudio,
        chain: &EffectChain,
    ) -> Result<RenderedBuffer, RenderError> {
        if source.num_channels() != self.num_channels {
            return Err(RenderError::ChannelMismatch {
                source: source.num_channels(),
                target: self.num_channels,
            });
        }

        let mut filters: Vec<LowShelf> = (0..self.num_channels)
            .map(|_| LowShelf::new(self.sample_rate as f64, BASS_SHELF_HZ, chain.bass_gain_db))
            .collect();

        let points: &[PanPoint] = chain.pan_curve.as_deref().unwrap_or(&[]);
        let mut next_point = 0_usize;
        let mut pan = 0.0_f32;

        let src_len = source.len();
        let mut channels = vec![vec![0.0_f32; self.frame_count]; self.num_channels];

        for i in 0..self.frame_count {
            let t = i as f64 / self.sample_rate as f64;
            while next_point < points.len() && points[next_point].time <= t {
                pan = points[next_point].pan;
                next_point += 1;
            }

            let src_i = i % src_len;
            match self.num_channels {
                1 => {
                    let s = filters[0].process(source.channel(0)[src_i] as f64) as f32;
                    channels[0][i] = pan_mono(s, pan);
                }
                _ => {
                    let l = filters[0].process(source.channel(0)[src_i] as f64) as f32;
                    let r = filters[1].process(source.channel(1)[src_i] as f64) as f32;
                    let (l_out, r_out) = pan_stereo(l, r, pan);
                    channels[0][i] = l_out;
                    channels[1][i] = r_out;
                }
            }
        }

        Ok(RenderedBuffer {
            sample_rate: self.sample_rate,
            channels,
        })
    }
}

/// StereoPannerNode law for a mono input, folded back to mono.
///
/// The panner up-mixes mono to an equal-power stereo pair; a mono
/// render target then down-mixes that pair as `0.5 * (L + R)`.
fn pan_mono(sample: f32, pan: f32) -> f32 {
    let x = (pan + 1.0) * 0.5;
    let gain_l = (x * FRAC_PI_2).cos();
    let gain_r = (x * FRAC_PI_2).sin();
    0.5 * (sample * gain_l + sample * gain_r)
}

/// StereoPannerNode law for a stereo input.
fn pan_stereo(l: f32, r: f32, pan: f32) -> (f32, f32) {
    let x = if pan <= 0.0 { pan + 1.0 } else { pan };
    let gain_l = (x * FRAC_PI_2).cos();
    let gain_r = (x * FRAC_PI_2).sin();
    if pan <= 0.0 {
        (l + r * gain_l, r * gain_r)
    } else {
        (l * gain_l, r + l * gain_r)
    }
}
