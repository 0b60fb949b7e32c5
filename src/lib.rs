//! Quake audio core — bass boost + rotating spatial pan, rendered to
//! WAV.
//!
//! The same Rust code powers the browser export path (via WASM) and
//! native consumers: decode a WAV/MP3 source, build the effects chain
//! (200 Hz low-shelf + scheduled pan automation), render offline, and
//! encode 16-bit PCM WAV bytes. Live preview pulls its parameters
//! from the identical chain tables, so what the user hears is what
//! the file contains.

pub mod decode;
pub mod dsp;
pub mod error;
pub mod history;
pub mod pipeline;
pub mod session;
pub mod settings;

use wasm_bindgen::prelude::*;

use crate::decode::decode;
use crate::dsp::chain::build_chain;
use crate::dsp::render::OfflineRenderer;
use crate::dsp::wav::encode_wav;
use crate::settings::EffectSettings;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the quake-audio-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: decode source bytes and render the effects chain to
/// WAV bytes.
///
/// `settings` is the UI's `{ bass, spatial }` object using the radio
/// wire strings. History stays on the JS side (IndexedDB); this path
/// only returns the container bytes.
#[wasm_bindgen]
pub fn render_effects_wav(source: &[u8], settings: JsValue) -> Result<Vec<u8>, JsValue> {
    let settings: EffectSettings =
        serde_wasm_bindgen::from_value(settings).map_err(|e| JsValue::from_str(&format!("{e}")))?;

    let decoded = decode(source).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    let render_seconds = pipeline::render_duration_seconds(decoded.duration());
    let frame_count = decoded.sample_rate() as usize * render_seconds as usize;

    let chain = build_chain(settings, render_seconds as f64);
    let rendered = OfflineRenderer::new(decoded.num_channels(), frame_count, decoded.sample_rate())
        .and_then(|renderer| renderer.render(&decoded, &chain))
        .map_err(|e| JsValue::from_str(&format!("{e}")))?;

    Ok(encode_wav(&rendered))
}

/// WASM-exposed: the suggested download filename for a settings
/// object, e.g. `quake1_8D_EARTHQUAKE.wav`.
#[wasm_bindgen]
pub fn suggested_filename(settings: JsValue) -> Result<String, JsValue> {
    let settings: EffectSettings =
        serde_wasm_bindgen::from_value(settings).map_err(|e| JsValue::from_str(&format!("{e}")))?;
    Ok(pipeline::suggested_filename(settings))
}
