//! WAV encoder — rendered float buffers to a 16-bit PCM byte container.

use crate::dsp::render::RenderedBuffer;

/// Encode a rendered buffer to a canonical RIFF/WAVE byte container:
/// 44-byte header followed by interleaved 16-bit little-endian PCM.
///
/// Caller contract: at least one channel, all channels equally long.
/// The encoder has no failure path for well-formed input; violating
/// the contract is a programming error, not a runtime condition.
pub fn encode_wav(buffer: &RenderedBuffer) -> Vec<u8> {
    debug_assert!(
        !buffer.channels.is_empty(),
        "encode_wav needs at least one channel"
    );
    debug_assert!(
        buffer
            .channels
            .iter()
            .all(|ch| ch.len() == buffer.channels[0].len()),
        "encode_wav needs equally long channels"
    );

    let num_channels = buffer.num_channels() as u16;
    let num_frames = buffer.len();
    let sample_rate = buffer.sample_rate;
    let bits_per_sample: u16 = 16;
    let block_align = num_channels * (bits_per_sample / 8);
    let byte_rate = sample_rate * block_align as u32;
    let data_size = (num_frames * block_align as usize) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&num_channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk, channel 0 fastest-varying within a frame
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for i in 0..num_frames {
        for ch in &buffer.channels {
            buf.extend_from_slice(&quantize(ch[i]).to_le_bytes());
        }
    }

    buf
}

/// Clamp to [-1, 1] and quantize to signed 16-bit.
///
/// Negative values scale by 32768, non-negative by 32767, both
/// truncated toward zero. The asymmetry reproduces the reference
/// exporter bit-for-bit.
fn quantize(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    if s < 0.0 {
        (s * 32768.0) as i16
    } else {
        (s * 32767.0) as i16
    }
}
