use std::fmt;

/// Top-level failure of an export attempt.
#[derive(Debug)]
pub enum ExportError {
    Decode(DecodeError),
    Render(RenderError),
    /// Another render is already in flight on this pipeline.
    Busy,
}

/// Source bytes could not be turned into audio.
#[derive(Debug)]
pub enum DecodeError {
    /// Neither a RIFF/WAVE container nor an MP3 stream.
    UnsupportedFormat,
    /// Container recognized but unreadable.
    Malformed(String),
    /// Decoding succeeded but produced zero frames.
    EmptyAudio,
    /// MP3 stream changed sample rate or channel count mid-file.
    InconsistentStream { expected_hz: u32, found_hz: u32 },
}

/// The offline render engine rejected the requested shape or source.
#[derive(Debug)]
pub enum RenderError {
    NoChannels,
    /// The stereo pan stage handles at most two channels.
    TooManyChannels(usize),
    ZeroLength,
    ZeroSampleRate,
    /// Source channel count does not match the render target.
    ChannelMismatch { source: usize, target: usize },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Decode(e) => write!(f, "Decode error: {e}"),
            ExportError::Render(e) => write!(f, "Render error: {e}"),
            ExportError::Busy => write!(f, "A render is already in progress"),
        }
    }
}

impl std::error::Error for ExportError {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnsupportedFormat => write!(f, "Unsupported audio container"),
            DecodeError::Malformed(msg) => write!(f, "Malformed audio data: {msg}"),
            DecodeError::EmptyAudio => write!(f, "Audio stream contains no frames"),
            DecodeError::InconsistentStream { expected_hz, found_hz } => {
                write!(f, "Stream parameters changed mid-file ({expected_hz} Hz vs {found_hz} Hz)")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NoChannels => write!(f, "Render target needs at least one channel"),
            RenderError::TooManyChannels(n) => {
                write!(f, "Render target supports at most 2 channels, got {n}")
            }
            RenderError::ZeroLength => write!(f, "Render target needs a non-zero frame count"),
            RenderError::ZeroSampleRate => write!(f, "Render target needs a non-zero sample rate"),
            RenderError::ChannelMismatch { source, target } => {
                write!(f, "Source has {source} channels but render target has {target}")
            }
        }
    }
}

impl std::error::Error for RenderError {}

impl From<DecodeError> for ExportError {
    fn from(e: DecodeError) -> Self {
        ExportError::Decode(e)
    }
}

impl From<RenderError> for ExportError {
    fn from(e: RenderError) -> Self {
        ExportError::Render(e)
    }
}
