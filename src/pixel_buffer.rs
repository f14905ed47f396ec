//! Immutable interleaved 8-bit raster shared between scans.

use std::sync::Arc;

use crate::constants::{RGB_CHANNEL_COUNT, RGBA_CHANNEL_COUNT};
use crate::error::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Rgb,
    Rgba,
}

impl ChannelLayout {
    pub fn channel_count(self) -> usize {
        match self {
            Self::Rgb => RGB_CHANNEL_COUNT,
            Self::Rgba => RGBA_CHANNEL_COUNT,
        }
    }

    pub fn has_alpha(self) -> bool {
        self == Self::Rgba
    }
}

impl TryFrom<usize> for ChannelLayout {
    type Error = ScanError;
    fn try_from(v: usize) -> Result<Self, Self::Error> {
        match v {
            RGB_CHANNEL_COUNT => Ok(Self::Rgb),
            RGBA_CHANNEL_COUNT => Ok(Self::Rgba),
            _ => Err(ScanError::UnsupportedChannelCount(v)),
        }
    }
}

/// A width x height grid of interleaved RGB or RGBA samples.
///
/// The sample data sits behind an `Arc`, so cloning a buffer shares the
/// pixels instead of copying them. Nothing hands out mutable access once a
/// buffer is built; every transformation produces a new buffer.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    data: Arc<[u8]>,
}

impl PixelBuffer {
    pub fn from_raw(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        data: Vec<u8>,
    ) -> Result<Self, ScanError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(layout.channel_count()))
            .ok_or(ScanError::BufferSizeMismatch {
                expected: usize::MAX,
                actual: data.len(),
            })?;

        if data.len() != expected {
            return Err(ScanError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            layout,
            data: data.into(),
        })
    }

    /// Buffer of the given size with every pixel set to `pixel`.
    ///
    /// `pixel` must hold exactly one sample per channel of `layout`.
    pub fn filled(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        pixel: &[u8],
    ) -> Result<Self, ScanError> {
        if pixel.len() != layout.channel_count() {
            return Err(ScanError::BufferSizeMismatch {
                expected: layout.channel_count(),
                actual: pixel.len(),
            });
        }
        let count = width as usize * height as usize;
        let data = pixel.iter().copied().cycle().take(count * pixel.len()).collect();
        Self::from_raw(width, height, layout, data)
    }

    /// New buffer with this buffer's dimensions and layout around `data`.
    pub(crate) fn with_same_shape(&self, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), self.data.len());
        Self {
            width: self.width,
            height: self.height,
            layout: self.layout,
            data: data.into(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn channel_count(&self) -> usize {
        self.layout.channel_count()
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn row_stride(&self) -> usize {
        self.width as usize * self.channel_count()
    }

    /// Samples of the pixel at (x, y).
    ///
    /// # Panics
    /// Panics if the coordinates are outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let channels = self.channel_count();
        let offset = y as usize * self.row_stride() + x as usize * channels;
        &self.data[offset..offset + channels]
    }

    pub fn same_shape(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height && self.layout == other.layout
    }

    /// True when both buffers share the same underlying sample storage.
    pub fn ptr_eq(&self, other: &PixelBuffer) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl PartialEq for PixelBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.same_shape(other) && (self.ptr_eq(other) || self.data == other.data)
    }
}

impl Eq for PixelBuffer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_validates_length() {
        let err = PixelBuffer::from_raw(2, 2, ChannelLayout::Rgb, vec![0u8; 11]).unwrap_err();
        assert!(matches!(
            err,
            ScanError::BufferSizeMismatch {
                expected: 12,
                actual: 11
            }
        ));
        assert!(PixelBuffer::from_raw(2, 2, ChannelLayout::Rgba, vec![0u8; 16]).is_ok());
    }

    #[test]
    fn test_pixel_access() {
        let data: Vec<u8> = (0..12).collect();
        let buffer = PixelBuffer::from_raw(2, 2, ChannelLayout::Rgb, data).unwrap();
        assert_eq!(buffer.pixel(0, 0), &[0, 1, 2]);
        assert_eq!(buffer.pixel(1, 0), &[3, 4, 5]);
        assert_eq!(buffer.pixel(0, 1), &[6, 7, 8]);
        assert_eq!(buffer.pixel(1, 1), &[9, 10, 11]);
    }

    #[test]
    fn test_clone_shares_storage() {
        let buffer = PixelBuffer::filled(4, 4, ChannelLayout::Rgba, &[1, 2, 3, 4]).unwrap();
        let copy = buffer.clone();
        assert!(buffer.ptr_eq(&copy));
        assert_eq!(buffer, copy);

        let rebuilt =
            PixelBuffer::from_raw(4, 4, ChannelLayout::Rgba, buffer.data().to_vec()).unwrap();
        assert!(!buffer.ptr_eq(&rebuilt));
        assert_eq!(buffer, rebuilt);
    }

    #[test]
    fn test_filled_rejects_wrong_pixel_width() {
        assert!(matches!(
            PixelBuffer::filled(4, 4, ChannelLayout::Rgba, &[1, 2, 3]),
            Err(ScanError::BufferSizeMismatch {
                expected: 4,
                actual: 3
            })
        ));
        assert!(PixelBuffer::filled(2, 2, ChannelLayout::Rgb, &[1, 2, 3, 4]).is_err());

        let buffer = PixelBuffer::filled(4, 4, ChannelLayout::Rgba, &[1, 2, 3, 4]).unwrap();
        assert_eq!(buffer.data().len(), 64);
    }

    #[test]
    fn test_empty_buffers() {
        let empty = PixelBuffer::from_raw(0, 5, ChannelLayout::Rgb, Vec::new()).unwrap();
        assert!(empty.is_empty());
        assert!(!PixelBuffer::filled(1, 1, ChannelLayout::Rgb, &[0, 0, 0]).unwrap().is_empty());
    }

    #[test]
    fn test_layout_from_channel_count() {
        assert_eq!(ChannelLayout::try_from(3).unwrap(), ChannelLayout::Rgb);
        assert_eq!(ChannelLayout::try_from(4).unwrap(), ChannelLayout::Rgba);
        assert!(matches!(
            ChannelLayout::try_from(1),
            Err(ScanError::UnsupportedChannelCount(1))
        ));
    }
}
