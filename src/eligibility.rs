//! Decides whether an encoded file gets the simulated progressive refinement.

use crate::constants::ELIGIBILITY_PROBE_BYTES;
use crate::jpeg_marker_code::JpegMarkerCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// JPEG stream with a SOF2 marker inside the probe window.
    ProgressiveJpeg,
    /// JPEG stream without a visible SOF2 marker.
    BaselineJpeg,
    /// Anything that does not start with SOI.
    Unrecognized,
}

impl SourceKind {
    pub fn is_jpeg(self) -> bool {
        self != Self::Unrecognized
    }

    /// Every JPEG is eligible, including ones that are not progressive.
    ///
    /// Treating baseline JPEGs as eligible keeps the next-scan flow usable for
    /// any JPEG. This is observable behaviour that callers rely on; it is not a
    /// claim that the file really has more than one scan.
    pub fn is_eligible(self) -> bool {
        match self {
            Self::ProgressiveJpeg => true,
            Self::BaselineJpeg => true,
            Self::Unrecognized => false,
        }
    }
}

fn probe_window(data: &[u8]) -> &[u8] {
    &data[..data.len().min(ELIGIBILITY_PROBE_BYTES)]
}

/// True if the SOF2 byte pair occurs within the first
/// `ELIGIBILITY_PROBE_BYTES` bytes. This is a plain byte search, not a
/// marker-segment walk, so a matching pair inside entropy data or metadata
/// counts too.
pub fn contains_progressive_marker(data: &[u8]) -> bool {
    let needle = JpegMarkerCode::StartOfFrameProgressive.to_bytes();
    probe_window(data).windows(2).any(|pair| pair == needle.as_slice())
}

pub fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&JpegMarkerCode::StartOfImage.to_bytes())
}

pub fn sniff(data: &[u8]) -> SourceKind {
    if !is_jpeg(data) {
        SourceKind::Unrecognized
    } else if contains_progressive_marker(data) {
        SourceKind::ProgressiveJpeg
    } else {
        SourceKind::BaselineJpeg
    }
}

/// Eligibility of an encoded file for simulated progressive refinement.
///
/// A SOF2 marker in the probe window makes the file eligible. A JPEG without
/// one is still eligible (see [`SourceKind::is_eligible`]).
pub fn detect_eligibility(data: &[u8]) -> bool {
    if contains_progressive_marker(data) {
        log::debug!("eligibility: SOF2 marker found");
        return true;
    }
    let kind = sniff(data);
    if kind == SourceKind::BaselineJpeg {
        log::warn!("eligibility: no SOF2 marker, treating JPEG as progressive anyway");
    }
    kind.is_eligible()
}
