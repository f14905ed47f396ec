//! Box-average approximation used to fake the coarse early scans of a
//! progressive JPEG.
//!
//! Each output pixel takes the unweighted mean of the source pixels in the
//! square window `[x - radius, x + radius] x [y - radius, y + radius]`,
//! clipped to the image (edge pixels average over a smaller window; nothing
//! wraps or reflects).
//!
//! Only every `stride`-th row and column is computed, with
//! `stride = max(1, radius / 2)`. Every other pixel copies the color of the
//! sample at `((x / stride) * stride, (y / stride) * stride)`. The blockiness
//! this introduces at large radii is intentional: it is both cheaper and
//! closer to the look of an early DC-only scan. At `radius == 1` the stride is
//! 1 and the filter is an exact 3x3 box mean.
//!
//! Window sums come from per-column sums over the window rows followed by a
//! running prefix along the row, so each sample costs O(1) once its row band
//! is accumulated.

use crate::constants::{COLOR_CHANNEL_COUNT, RGBA_CHANNEL_COUNT};
use crate::pixel_buffer::PixelBuffer;

type ColorSums = [u64; COLOR_CHANNEL_COUNT];

/// Distance between computed samples for a given radius.
pub fn sampling_stride(radius: u32) -> u32 {
    (radius / 2).max(1)
}

/// Returns a copy of `source` with detail reduced according to `radius`.
///
/// `radius == 0` or an empty source returns `source` itself (a shared clone,
/// no pixel work). Alpha, when present, is copied from the source pixel
/// unchanged; only the color channels are averaged.
pub fn apply(source: &PixelBuffer, radius: u32) -> PixelBuffer {
    if radius == 0 || source.is_empty() {
        return source.clone();
    }

    let width = source.width() as usize;
    let height = source.height() as usize;
    let channels = source.channel_count();
    let row_stride = source.row_stride();
    let radius = radius as usize;
    let stride = sampling_stride(radius as u32) as usize;
    let src = source.data();

    let mut output = vec![0u8; src.len()];
    let mut column_sums: Vec<ColorSums> = vec![[0; COLOR_CHANNEL_COUNT]; width];
    // prefix[x] = sum of column_sums[0..x]
    let mut prefix: Vec<ColorSums> = vec![[0; COLOR_CHANNEL_COUNT]; width + 1];

    for y in (0..height).step_by(stride) {
        let y_start = y.saturating_sub(radius);
        let y_end = y.saturating_add(radius).min(height - 1);
        let window_rows = (y_end - y_start + 1) as u64;

        accumulate_columns(src, row_stride, channels, y_start, y_end, &mut column_sums);
        for x in 0..width {
            for c in 0..COLOR_CHANNEL_COUNT {
                prefix[x + 1][c] = prefix[x][c] + column_sums[x][c];
            }
        }

        let block_y_end = (y + stride).min(height);
        for x in (0..width).step_by(stride) {
            let x_start = x.saturating_sub(radius);
            let x_end = x.saturating_add(radius).min(width - 1);
            let count = window_rows * (x_end - x_start + 1) as u64;

            let mut average = [0u8; COLOR_CHANNEL_COUNT];
            for (c, value) in average.iter_mut().enumerate() {
                let sum = prefix[x_end + 1][c] - prefix[x_start][c];
                *value = (sum / count) as u8;
            }

            let block_x_end = (x + stride).min(width);
            for py in y..block_y_end {
                for px in x..block_x_end {
                    let offset = py * row_stride + px * channels;
                    output[offset..offset + COLOR_CHANNEL_COUNT].copy_from_slice(&average);
                    // The output starts zeroed; alpha must come from the source for every pixel.
                    if channels == RGBA_CHANNEL_COUNT {
                        output[offset + COLOR_CHANNEL_COUNT] = src[offset + COLOR_CHANNEL_COUNT];
                    }
                }
            }
        }
    }

    log::trace!("approximation: radius={radius} stride={stride} {width}x{height}");
    source.with_same_shape(output)
}

fn accumulate_columns(
    src: &[u8],
    row_stride: usize,
    channels: usize,
    y_start: usize,
    y_end: usize,
    column_sums: &mut [ColorSums],
) {
    column_sums.fill([0; COLOR_CHANNEL_COUNT]);
    for row in src[y_start * row_stride..(y_end + 1) * row_stride].chunks_exact(row_stride) {
        for (sums, pixel) in column_sums.iter_mut().zip(row.chunks_exact(channels)) {
            for c in 0..COLOR_CHANNEL_COUNT {
                sums[c] += pixel[c] as u64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_buffer::ChannelLayout;

    fn gradient(width: u32, height: u32, layout: ChannelLayout) -> PixelBuffer {
        let channels = layout.channel_count();
        let mut data = Vec::with_capacity(width as usize * height as usize * channels);
        for y in 0..height {
            for x in 0..width {
                data.push((x * 255 / width.max(1)) as u8);
                data.push((y * 255 / height.max(1)) as u8);
                data.push(((x + y) % 256) as u8);
                if layout.has_alpha() {
                    data.push((x * 16 + y) as u8);
                }
            }
        }
        PixelBuffer::from_raw(width, height, layout, data).unwrap()
    }

    #[test]
    fn test_sampling_stride() {
        assert_eq!(sampling_stride(0), 1);
        assert_eq!(sampling_stride(1), 1);
        assert_eq!(sampling_stride(2), 1);
        assert_eq!(sampling_stride(3), 1);
        assert_eq!(sampling_stride(4), 2);
        assert_eq!(sampling_stride(8), 4);
    }

    #[test]
    fn test_radius_zero_is_identity() {
        let source = gradient(9, 7, ChannelLayout::Rgb);
        let result = apply(&source, 0);
        assert!(result.ptr_eq(&source));
    }

    #[test]
    fn test_empty_source_is_identity() {
        let source = PixelBuffer::from_raw(0, 0, ChannelLayout::Rgba, Vec::new()).unwrap();
        let result = apply(&source, 8);
        assert!(result.ptr_eq(&source));
        assert!(result.is_empty());
    }

    #[test]
    fn test_white_stays_white() {
        let source = PixelBuffer::filled(16, 16, ChannelLayout::Rgb, &[255, 255, 255]).unwrap();
        let result = apply(&source, 8);
        assert_eq!(result.width(), 16);
        assert_eq!(result.height(), 16);
        assert!(result.data().iter().all(|&v| v == 255));
        assert!(!result.ptr_eq(&source));
    }

    #[test]
    fn test_corner_window_is_clipped() {
        let mut data = vec![255u8; 4 * 4 * 3];
        data[0..3].copy_from_slice(&[0, 0, 0]);
        let source = PixelBuffer::from_raw(4, 4, ChannelLayout::Rgb, data).unwrap();

        let result = apply(&source, 1);

        // (0,0): window {(0,0),(1,0),(0,1),(1,1)} -> 3 * 255 / 4
        assert_eq!(result.pixel(0, 0), &[191, 191, 191]);
        // (1,1): full 3x3 window containing the black pixel -> 8 * 255 / 9
        assert_eq!(result.pixel(1, 1), &[226, 226, 226]);
        // Opposite corner never sees the black pixel; no wraparound.
        assert_eq!(result.pixel(3, 3), &[255, 255, 255]);
        assert_eq!(result.pixel(3, 0), &[255, 255, 255]);
        assert_eq!(result.pixel(0, 3), &[255, 255, 255]);
    }

    #[test]
    fn test_sparse_fill_copies_nearest_sample() {
        let source = gradient(13, 11, ChannelLayout::Rgb);
        let radius = 6;
        let stride = sampling_stride(radius);
        let result = apply(&source, radius);

        for y in 0..source.height() {
            for x in 0..source.width() {
                let sx = (x / stride) * stride;
                let sy = (y / stride) * stride;
                assert_eq!(result.pixel(x, y), result.pixel(sx, sy), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_samples_match_exact_box_mean() {
        let source = gradient(10, 6, ChannelLayout::Rgb);
        let radius = 4u32;
        let stride = sampling_stride(radius);
        let result = apply(&source, radius);

        for y in (0..source.height()).step_by(stride as usize) {
            for x in (0..source.width()).step_by(stride as usize) {
                let x0 = x.saturating_sub(radius);
                let x1 = (x + radius).min(source.width() - 1);
                let y0 = y.saturating_sub(radius);
                let y1 = (y + radius).min(source.height() - 1);
                let mut sums = [0u32; 3];
                let mut count = 0u32;
                for py in y0..=y1 {
                    for px in x0..=x1 {
                        let p = source.pixel(px, py);
                        for c in 0..3 {
                            sums[c] += p[c] as u32;
                        }
                        count += 1;
                    }
                }
                let expected: Vec<u8> = sums.iter().map(|s| (s / count) as u8).collect();
                assert_eq!(result.pixel(x, y), expected.as_slice(), "sample ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_alpha_is_preserved_per_pixel() {
        let source = gradient(12, 9, ChannelLayout::Rgba);
        for radius in [1, 2, 5, 8] {
            let result = apply(&source, radius);
            assert_eq!(result.layout(), ChannelLayout::Rgba);
            for y in 0..source.height() {
                for x in 0..source.width() {
                    assert_eq!(result.pixel(x, y)[3], source.pixel(x, y)[3]);
                }
            }
        }
    }

    #[test]
    fn test_single_pixel_image() {
        let source = PixelBuffer::filled(1, 1, ChannelLayout::Rgba, &[10, 20, 30, 40]).unwrap();
        let result = apply(&source, 8);
        assert_eq!(result.pixel(0, 0), &[10, 20, 30, 40]);
    }

    #[test]
    fn test_huge_radius_averages_whole_image() {
        let data = vec![0, 0, 0, 100, 100, 100, 200, 200, 200, 100, 100, 100];
        let source = PixelBuffer::from_raw(2, 2, ChannelLayout::Rgb, data).unwrap();
        let result = apply(&source, u32::MAX);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(result.pixel(x, y), &[100, 100, 100]);
            }
        }
    }
}
