use num_enum::IntoPrimitive;

pub use crate::constants::JPEG_MARKER_START_BYTE;

/// Second byte of the JPEG markers the format sniffer looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum JpegMarkerCode {
    /// SOF2, progressive DCT frame header.
    StartOfFrameProgressive = 0xC2,

    /// SOI, first marker of every JPEG stream.
    StartOfImage = 0xD8,
}

impl JpegMarkerCode {
    /// The two bytes that introduce this marker in a stream.
    pub fn to_bytes(self) -> [u8; 2] {
        [JPEG_MARKER_START_BYTE, self.into()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bytes() {
        assert_eq!(JpegMarkerCode::StartOfFrameProgressive.to_bytes(), [0xFF, 0xC2]);
        assert_eq!(JpegMarkerCode::StartOfImage.to_bytes(), [0xFF, 0xD8]);
        assert_eq!(u8::from(JpegMarkerCode::StartOfImage), 0xD8);
    }
}
