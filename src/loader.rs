//! Load and save requests executed against an [`ImageCodec`].

use std::fs;
use std::path::PathBuf;

use crate::codec::{EncodeOptions, ImageCodec};
use crate::eligibility::{self, SourceKind};
use crate::error::ScanError;
use crate::pixel_buffer::PixelBuffer;
use crate::scan_sequencer::ScanSequencer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStrategy {
    /// Decode and show the full-detail image; no refinement session.
    Standard,
    /// Accept JPEG only, show the coarsest scan first and refine on request.
    #[default]
    ProgressiveSimulated,
}

#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub path: PathBuf,
    pub strategy: LoadStrategy,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Image to display: the first scan for a progressive load, the decoded
    /// image otherwise.
    pub image: PixelBuffer,
    pub kind: SourceKind,
    /// Whether a refinement session was started that can be advanced.
    pub eligible: bool,
}

#[derive(Debug, Clone)]
pub struct SaveRequest<'a> {
    pub path: PathBuf,
    pub image: &'a PixelBuffer,
    pub options: EncodeOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    pub bytes_written: usize,
}

/// Reads `request.path` and loads it. The sequencer is reset before the file
/// is read, so a failed load never leaves the previous session behind.
pub fn execute_load<C: ImageCodec + ?Sized>(
    request: &LoadRequest,
    codec: &C,
    sequencer: &mut ScanSequencer,
) -> Result<LoadOutcome, ScanError> {
    sequencer.reset();
    let data = fs::read(&request.path)?;
    let outcome = load_bytes(&data, request.strategy, codec, sequencer)?;
    log::info!(
        "loaded {:?}: {}x{} {:?} eligible={}",
        request.path,
        outcome.image.width(),
        outcome.image.height(),
        outcome.kind,
        outcome.eligible
    );
    Ok(outcome)
}

/// Loads already-read encoded bytes.
pub fn load_bytes<C: ImageCodec + ?Sized>(
    data: &[u8],
    strategy: LoadStrategy,
    codec: &C,
    sequencer: &mut ScanSequencer,
) -> Result<LoadOutcome, ScanError> {
    sequencer.reset();
    let kind = eligibility::sniff(data);

    match strategy {
        LoadStrategy::Standard => {
            let image = codec.decode(data)?;
            Ok(LoadOutcome {
                image,
                kind,
                eligible: false,
            })
        }
        LoadStrategy::ProgressiveSimulated => {
            if !kind.is_jpeg() {
                return Err(ScanError::UnsupportedFormat);
            }
            let eligible = eligibility::detect_eligibility(data);
            let decoded = codec.decode(data)?;
            let first = sequencer.begin(decoded, eligible)?;
            Ok(LoadOutcome {
                image: first,
                kind,
                eligible,
            })
        }
    }
}

pub fn execute_save<C: ImageCodec + ?Sized>(
    request: &SaveRequest<'_>,
    codec: &C,
) -> Result<SaveOutcome, ScanError> {
    let bytes = codec.encode(request.image, &request.options)?;
    fs::write(&request.path, &bytes)?;
    log::info!(
        "saved {:?}: {} bytes, quality {}",
        request.path,
        bytes.len(),
        request.options.quality.value()
    );
    Ok(SaveOutcome {
        bytes_written: bytes.len(),
    })
}
