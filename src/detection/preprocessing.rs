use image::{DynamicImage, GrayImage};
use imageproc::contrast::{ThresholdType, threshold};
use imageproc::edges::canny;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Add `border` pixels on every side, repeating the nearest edge pixel.
pub fn pad_replicate(img: &GrayImage, border: u32) -> GrayImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return img.clone();
    }
    GrayImage::from_fn(width + 2 * border, height + 2 * border, |x, y| {
        let sx = x.saturating_sub(border).min(width - 1);
        let sy = y.saturating_sub(border).min(height - 1);
        *img.get_pixel(sx, sy)
    })
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Pixels strictly above `level` become 255, the rest 0.
pub fn binarize(img: &GrayImage, level: u8) -> GrayImage {
    threshold(img, level, ThresholdType::Binary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_pad_replicate_copies_edges() {
        let img = GrayImage::from_fn(3, 2, |x, y| Luma([(y * 3 + x) as u8]));
        let padded = pad_replicate(&img, 2);
        assert_eq!(padded.dimensions(), (7, 6));
        assert_eq!(padded.get_pixel(0, 0)[0], 0);
        assert_eq!(padded.get_pixel(6, 0)[0], 2);
        assert_eq!(padded.get_pixel(0, 5)[0], 3);
        assert_eq!(padded.get_pixel(6, 5)[0], 5);
        assert_eq!(padded.get_pixel(3, 3)[0], 4);
    }

    #[test]
    fn test_binarize_is_strict() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([[127u8, 128, 255][x as usize]]));
        let bin = binarize(&img, 127);
        assert_eq!(bin.as_raw(), &vec![0, 255, 255]);
    }
}
