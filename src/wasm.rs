//! WebAssembly bindings for jpegscan-rs.
//!
//! This module lets a browser page drive a refinement session: hand it the
//! JPEG bytes once, then pull progressively sharper RGBA frames for a canvas.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use crate::codec::JpegCodec;
#[cfg(target_arch = "wasm32")]
use crate::loader::{self, LoadStrategy};
#[cfg(target_arch = "wasm32")]
use crate::pixel_buffer::{ChannelLayout, PixelBuffer};
#[cfg(target_arch = "wasm32")]
use crate::scan_sequencer::ScanSequencer;

/// Refinement session exposed to JavaScript.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct WasmScanSession {
    sequencer: ScanSequencer,
    current: PixelBuffer,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl WasmScanSession {
    /// Decode a JPEG and produce its first, coarsest scan.
    ///
    /// # Arguments
    /// * `data` - The JPEG file bytes
    #[wasm_bindgen(constructor)]
    pub fn new(data: &[u8]) -> Result<WasmScanSession, JsValue> {
        let mut sequencer = ScanSequencer::default();
        let outcome =
            loader::load_bytes(data, LoadStrategy::ProgressiveSimulated, &JpegCodec, &mut sequencer)
                .map_err(|e| JsValue::from_str(&format!("Load error: {}", e)))?;
        Ok(Self {
            sequencer,
            current: outcome.image,
        })
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.current.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.current.height()
    }

    #[wasm_bindgen(getter)]
    pub fn scan_index(&self) -> u32 {
        self.sequencer.scan_index()
    }

    pub fn has_more(&self) -> bool {
        self.sequencer.has_more()
    }

    /// Advance to the next scan. Returns false when there is nothing left.
    pub fn next_scan(&mut self) -> bool {
        match self.sequencer.advance() {
            Some(scan) => {
                self.current = scan;
                true
            }
            None => false,
        }
    }

    /// Current scan as RGBA bytes, ready for `ImageData`.
    pub fn rgba(&self) -> Vec<u8> {
        to_rgba(&self.current)
    }
}

#[cfg(target_arch = "wasm32")]
fn to_rgba(buffer: &PixelBuffer) -> Vec<u8> {
    match buffer.layout() {
        ChannelLayout::Rgba => buffer.data().to_vec(),
        ChannelLayout::Rgb => buffer
            .data()
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
    }
}
