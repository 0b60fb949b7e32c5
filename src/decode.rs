//! Audio decoding — raw container bytes to per-channel f32 samples.
//!
//! Supports the two containers the enhancer accepts as input: RIFF/WAVE
//! (via hound) and MP3 (via minimp3). Everything is normalized to
//! 32-bit float channel buffers in [-1, 1] at the container's native
//! sample rate.

use std::io::Cursor;

use hound::{SampleFormat, WavReader};
use log::warn;
use minimp3::{Decoder as Mp3Decoder, Error as Mp3Error, Frame};

use crate::error::DecodeError;

/// Decoded source audio. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    /// Build from per-channel sample buffers.
    ///
    /// Rejects empty shapes and mismatched channel lengths up front so
    /// downstream code can rely on a well-formed buffer.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self, DecodeError> {
        if sample_rate == 0 {
            return Err(DecodeError::Malformed("zero sample rate".to_string()));
        }
        if channels.is_empty() {
            return Err(DecodeError::Malformed("zero channels".to_string()));
        }
        let frames = channels[0].len();
        if frames == 0 {
            return Err(DecodeError::EmptyAudio);
        }
        if channels.iter().any(|ch| ch.len() != frames) {
            return Err(DecodeError::Malformed(
                "channel buffers differ in length".to_string(),
            ));
        }
        Ok(DecodedAudio {
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Frame count (samples per channel).
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }
}

/// Decode source bytes by sniffing the container.
pub fn decode(bytes: &[u8]) -> Result<DecodedAudio, DecodeError> {
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        return decode_wav(bytes);
    }
    if looks_like_mp3(bytes) {
        return decode_mp3(bytes);
    }
    Err(DecodeError::UnsupportedFormat)
}

/// ID3 tag or an MPEG frame sync at the start of the buffer.
fn looks_like_mp3(bytes: &[u8]) -> bool {
    if bytes.len() < 4 {
        return false;
    }
    bytes.starts_with(b"ID3") || (bytes[0] == 0xFF && bytes[1] & 0xE0 == 0xE0)
}

fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio, DecodeError> {
    let mut reader =
        WavReader::new(Cursor::new(bytes)).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    let spec = reader.spec();
    let num_channels = spec.channels as usize;
    if num_channels == 0 {
        return Err(DecodeError::Malformed("zero channels".to_string()));
    }

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| DecodeError::Malformed(e.to_string()))?,
        (SampleFormat::Int, bits @ (16 | 24 | 32)) => {
            let scale = 1.0 / (1_i64 << (bits - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .map_err(|e| DecodeError::Malformed(e.to_string()))?
        }
        (format, bits) => {
            return Err(DecodeError::Malformed(format!(
                "unsupported wav sample format {format:?}/{bits}-bit"
            )));
        }
    };

    deinterleave(interleaved, num_channels, spec.sample_rate)
}

fn decode_mp3(bytes: &[u8]) -> Result<DecodedAudio, DecodeError> {
    let mut decoder = Mp3Decoder::new(Cursor::new(bytes));
    let mut sample_rate = 0_u32;
    let mut num_channels = 0_usize;
    let mut interleaved: Vec<f32> = Vec::new();

    loop {
        match decoder.next_frame() {
            Ok(Frame {
                data,
                sample_rate: frame_rate,
                channels,
                ..
            }) => {
                let frame_rate = frame_rate as u32;
                if sample_rate == 0 {
                    sample_rate = frame_rate;
                    num_channels = channels;
                } else if frame_rate != sample_rate || channels != num_channels {
                    return Err(DecodeError::InconsistentStream {
                        expected_hz: sample_rate,
                        found_hz: frame_rate,
                    });
                }
                interleaved.extend(data.iter().map(|&s| s as f32 / 32768.0));
            }
            Err(Mp3Error::Eof) => break,
            Err(Mp3Error::SkippedData) => continue,
            Err(Mp3Error::InsufficientData) => {
                warn!("mp3 stream ends with a truncated frame");
                break;
            }
            Err(e) => return Err(DecodeError::Malformed(format!("{e:?}"))),
        }
    }

    if sample_rate == 0 || interleaved.is_empty() {
        return Err(DecodeError::EmptyAudio);
    }
    deinterleave(interleaved, num_channels, sample_rate)
}

/// Split an interleaved buffer into per-channel buffers.
fn deinterleave(
    interleaved: Vec<f32>,
    num_channels: usize,
    sample_rate: u32,
) -> Result<DecodedAudio, DecodeError> {
    let frames = interleaved.len() / num_channels;
    let trailing = interleaved.len() % num_channels;
    if trailing != 0 {
        warn!("dropping {trailing} trailing samples of a partial frame");
    }
    if frames == 0 {
        return Err(DecodeError::EmptyAudio);
    }

    let mut channels: Vec<Vec<f32>> = (0..num_channels)
        .map(|_| Vec::with_capacity(frames))
        .collect();
    for frame in interleaved.chunks_exact(num_channels) {
        for (ch, &sample) in channels.iter_mut().zip(frame) {
            ch.push(sample);
        }
    }
    DecodedAudio::new(sample_rate, channels)
}
