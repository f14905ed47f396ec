//! Simulated progressive JPEG refinement.
//!
//! Given one fully decoded image, a [`ScanSequencer`] produces a short series
//! of successively sharper approximations that mimic how a progressive JPEG
//! fills in while it downloads. No multi-scan entropy decoding takes place:
//! each "scan" is a box-averaged copy of the decoded pixels
//! ([`approximation::apply`]), with the radius shrinking until the last scan
//! is the original image.

pub mod approximation;
pub mod codec;
pub mod constants;
pub mod eligibility;
pub mod error;
pub mod jpeg_marker_code;
pub mod loader;
pub mod pixel_buffer;
pub mod scan_sequencer;
pub mod viewer;
pub mod wasm;

pub use codec::{DctMethod, EncodeOptions, ImageCodec, JpegCodec, PngCodec, Quality};
pub use eligibility::{SourceKind, detect_eligibility};
pub use error::ScanError;
pub use loader::{LoadOutcome, LoadRequest, LoadStrategy, SaveOutcome, SaveRequest};
pub use pixel_buffer::{ChannelLayout, PixelBuffer};
pub use scan_sequencer::{RefinementSession, ScanSchedule, ScanSequencer, ScanState};
pub use viewer::Viewer;
