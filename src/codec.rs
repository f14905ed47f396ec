//! Encode/decode capability used by the load and save paths.
//!
//! The refinement core never touches encoded bytes; it only receives the
//! `PixelBuffer` a codec produced. `JpegCodec` and `PngCodec` wrap the
//! `image` crate.

use std::borrow::Cow;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::constants::{COLOR_CHANNEL_COUNT, DEFAULT_QUALITY, MAXIMUM_QUALITY, MINIMUM_QUALITY};
use crate::error::ScanError;
use crate::pixel_buffer::{ChannelLayout, PixelBuffer};

/// DCT implementation requested for encoding.
///
/// Accepted and recorded, but the `image` JPEG encoder has a single DCT, so
/// the choice does not change the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum DctMethod {
    Integer = 0,
    Fast = 1,
    Float = 2,
}

impl Default for DctMethod {
    fn default() -> Self {
        Self::Integer
    }
}

impl DctMethod {
    pub fn from_u8(value: u8) -> Result<Self, ScanError> {
        Self::try_from(value).map_err(|_| ScanError::InvalidDctMethod(value))
    }
}

/// JPEG quality in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Result<Self, ScanError> {
        if !(MINIMUM_QUALITY..=MAXIMUM_QUALITY).contains(&value) {
            return Err(ScanError::InvalidQuality(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(DEFAULT_QUALITY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    pub quality: Quality,
    /// Accepted but not honoured; output is always baseline.
    pub progressive: bool,
    pub dct_method: DctMethod,
}

pub trait ImageCodec {
    fn decode(&self, data: &[u8]) -> Result<PixelBuffer, ScanError>;
    fn encode(&self, image: &PixelBuffer, options: &EncodeOptions) -> Result<Vec<u8>, ScanError>;
}

/// Decodes anything the `image` crate recognises (JPEG, PNG); encodes baseline JPEG.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

impl ImageCodec for JpegCodec {
    fn decode(&self, data: &[u8]) -> Result<PixelBuffer, ScanError> {
        decode_with_image(data)
    }

    fn encode(&self, image: &PixelBuffer, options: &EncodeOptions) -> Result<Vec<u8>, ScanError> {
        if image.is_empty() {
            return Err(ScanError::Encode("image has no pixels".to_string()));
        }
        if options.progressive {
            log::warn!("progressive encoding requested; writing baseline JPEG");
        }
        if options.dct_method != DctMethod::Integer {
            log::warn!("DCT method {:?} requested; encoder DCT is fixed", options.dct_method);
        }

        // JPEG carries no alpha.
        let samples: Cow<'_, [u8]> = match image.layout() {
            ChannelLayout::Rgb => Cow::Borrowed(image.data()),
            ChannelLayout::Rgba => Cow::Owned(
                image
                    .data()
                    .chunks_exact(image.channel_count())
                    .flat_map(|pixel| pixel[..COLOR_CHANNEL_COUNT].iter().copied())
                    .collect(),
            ),
        };

        // The encoder's scale starts at 1.
        let quality = options.quality.value().max(1);
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality)
            .write_image(&samples, image.width(), image.height(), ExtendedColorType::Rgb8)
            .map_err(|e| ScanError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

/// Lossless codec; encode options are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn decode(&self, data: &[u8]) -> Result<PixelBuffer, ScanError> {
        decode_with_image(data)
    }

    fn encode(&self, image: &PixelBuffer, _options: &EncodeOptions) -> Result<Vec<u8>, ScanError> {
        if image.is_empty() {
            return Err(ScanError::Encode("image has no pixels".to_string()));
        }
        let color_type = match image.layout() {
            ChannelLayout::Rgb => ExtendedColorType::Rgb8,
            ChannelLayout::Rgba => ExtendedColorType::Rgba8,
        };
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(image.data(), image.width(), image.height(), color_type)
            .map_err(|e| ScanError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

/// Decodes to RGB, or RGBA when the source has an alpha channel.
fn decode_with_image(data: &[u8]) -> Result<PixelBuffer, ScanError> {
    let decoded = image::load_from_memory(data).map_err(|e| ScanError::Decode(e.to_string()))?;
    let (width, height) = (decoded.width(), decoded.height());

    if decoded.color().has_alpha() {
        PixelBuffer::from_raw(width, height, ChannelLayout::Rgba, decoded.to_rgba8().into_raw())
    } else {
        PixelBuffer::from_raw(width, height, ChannelLayout::Rgb, decoded.to_rgb8().into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility;

    fn stripes(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::new();
        for _y in 0..height {
            for x in 0..width {
                let v = if (x / 4) % 2 == 0 { 40 } else { 220 };
                data.extend_from_slice(&[v, v / 2, 255 - v]);
            }
        }
        PixelBuffer::from_raw(width, height, ChannelLayout::Rgb, data).unwrap()
    }

    #[test]
    fn test_quality_range() {
        assert_eq!(Quality::new(0).unwrap().value(), 0);
        assert_eq!(Quality::new(100).unwrap().value(), 100);
        assert!(matches!(Quality::new(101), Err(ScanError::InvalidQuality(101))));
        assert_eq!(Quality::default().value(), 75);
    }

    #[test]
    fn test_dct_method_from_u8() {
        assert_eq!(DctMethod::from_u8(0).unwrap(), DctMethod::Integer);
        assert_eq!(DctMethod::from_u8(1).unwrap(), DctMethod::Fast);
        assert_eq!(DctMethod::from_u8(2).unwrap(), DctMethod::Float);
        assert!(matches!(DctMethod::from_u8(3), Err(ScanError::InvalidDctMethod(3))));
        assert_eq!(u8::from(DctMethod::Float), 2);
    }

    #[test]
    fn test_jpeg_encode_produces_baseline_jpeg() {
        let image = stripes(24, 16);
        let options = EncodeOptions {
            progressive: true,
            dct_method: DctMethod::Float,
            ..EncodeOptions::default()
        };
        let bytes = JpegCodec.encode(&image, &options).unwrap();
        assert!(eligibility::is_jpeg(&bytes));
        assert_eq!(eligibility::sniff(&bytes), eligibility::SourceKind::BaselineJpeg);

        let decoded = JpegCodec.decode(&bytes).unwrap();
        assert_eq!(decoded.width(), 24);
        assert_eq!(decoded.height(), 16);
        assert_eq!(decoded.layout(), ChannelLayout::Rgb);
    }

    #[test]
    fn test_jpeg_encode_drops_alpha() {
        let image = PixelBuffer::filled(8, 8, ChannelLayout::Rgba, &[200, 100, 50, 128]).unwrap();
        let bytes = JpegCodec.encode(&image, &EncodeOptions::default()).unwrap();
        let decoded = JpegCodec.decode(&bytes).unwrap();
        assert_eq!(decoded.layout(), ChannelLayout::Rgb);
        let pixel = decoded.pixel(4, 4);
        assert!((pixel[0] as i32 - 200).abs() < 12, "red was {}", pixel[0]);
    }

    #[test]
    fn test_png_preserves_pixels_and_alpha() {
        let mut data = Vec::new();
        for i in 0..(5 * 3) {
            data.extend_from_slice(&[i as u8, (i * 3) as u8, (i * 7) as u8, (255 - i) as u8]);
        }
        let image = PixelBuffer::from_raw(5, 3, ChannelLayout::Rgba, data).unwrap();
        let bytes = PngCodec.encode(&image, &EncodeOptions::default()).unwrap();
        let decoded = PngCodec.decode(&bytes).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = JpegCodec.decode(&[0xFF, 0xD8, 0x00, 0x01, 0x02]);
        assert!(matches!(result, Err(ScanError::Decode(_))));
    }

    #[test]
    fn test_encode_empty_fails() {
        let empty = PixelBuffer::from_raw(0, 0, ChannelLayout::Rgb, Vec::new()).unwrap();
        assert!(matches!(
            JpegCodec.encode(&empty, &EncodeOptions::default()),
            Err(ScanError::Encode(_))
        ));
    }
}
