//! Pixel-remapping distortions applied to CAPTCHA images before letter
//! extraction.
//!
//! Every function here takes a grayscale image and returns a new image with
//! the same dimensions. Row `i` is the image y coordinate, column `j` is x.

pub mod distortion;

pub use distortion::{Distortion, DistortionKind, DistortionSource, RandomDistortions, ScriptedDistortions};

use image::{GrayImage, Luma};

/// Approximation of pi used by the wave generator. Keeping it at two decimals
/// reproduces the exact offsets of existing training sets.
pub const WAVE_PI: f64 = 3.14;

const VERTICAL_AMPLITUDE: f64 = 25.0;
const VERTICAL_FREQUENCY: f64 = 2.0;
const VERTICAL_PERIOD: f64 = 180.0;

const HORIZONTAL_AMPLITUDE: f64 = 16.0;
const HORIZONTAL_FREQUENCY: f64 = 2.0;
const HORIZONTAL_PERIOD: f64 = 150.0;

const BIDIRECTIONAL_AMPLITUDE: f64 = 20.0;
const BIDIRECTIONAL_FREQUENCY: f64 = 2.0;
const BIDIRECTIONAL_PERIOD: f64 = 150.0;

pub const CONCAVE_AMPLITUDE: f64 = 128.0;
pub const CONCAVE_FREQUENCY: u32 = 3;

/// Build an output image by asking `source` where each output pixel reads
/// from. `None` means the read failed its bound check and the pixel is black.
fn remap<F>(img: &GrayImage, source: F) -> GrayImage
where
    F: Fn(i64, i64) -> Option<(i64, i64)>,
{
    let (columns, rows) = img.dimensions();
    let (rows_i, columns_i) = (rows as i64, columns as i64);

    GrayImage::from_fn(columns, rows, |x, y| match source(y as i64, x as i64) {
        Some((si, sj)) => {
            let si = si.rem_euclid(rows_i) as u32;
            let sj = sj.rem_euclid(columns_i) as u32;
            *img.get_pixel(sj, si)
        }
        None => Luma([0]),
    })
}

/// Sine wave along the columns, driven by the row index.
///
/// The forward bound compares against the row count, not the column count.
/// That looks like a defect but changing it alters generated data, so it
/// stays.
pub fn vertical_wave(img: &GrayImage) -> GrayImage {
    let rows = img.height() as i64;
    remap(img, |i, j| {
        let offset_x = (VERTICAL_AMPLITUDE
            * (VERTICAL_FREQUENCY * WAVE_PI * i as f64 / VERTICAL_PERIOD).sin())
            as i64;
        (j + offset_x < rows).then_some((i, j + offset_x))
    })
}

/// Sine wave along the rows, driven by the column index.
pub fn horizontal_wave(img: &GrayImage) -> GrayImage {
    let rows = img.height() as i64;
    remap(img, |i, j| {
        let offset_y = (HORIZONTAL_AMPLITUDE
            * (HORIZONTAL_FREQUENCY * WAVE_PI * j as f64 / HORIZONTAL_PERIOD).sin())
            as i64;
        (i + offset_y < rows).then_some((i + offset_y, j))
    })
}

/// Sine displacement on columns combined with cosine displacement on rows.
pub fn horizontal_vertical_wave(img: &GrayImage) -> GrayImage {
    let (columns, rows) = (img.width() as i64, img.height() as i64);
    remap(img, |i, j| {
        let offset_x = (BIDIRECTIONAL_AMPLITUDE
            * (BIDIRECTIONAL_FREQUENCY * WAVE_PI * i as f64 / BIDIRECTIONAL_PERIOD).sin())
            as i64;
        let offset_y = (BIDIRECTIONAL_AMPLITUDE
            * (BIDIRECTIONAL_FREQUENCY * WAVE_PI * j as f64 / BIDIRECTIONAL_PERIOD).cos())
            as i64;
        (i + offset_y < rows && j + offset_x < columns).then_some((i + offset_y, j + offset_x))
    })
}

/// Bend the image horizontally along a half sine over its height.
pub fn concave(img: &GrayImage, amplitude: f64, frequency: u32) -> GrayImage {
    let columns = img.width() as i64;
    remap(img, |i, j| {
        let offset_x = (amplitude
            * (frequency as f64 * WAVE_PI * i as f64 / (2 * columns) as f64).sin())
            as i64;
        (j + offset_x < columns).then_some((i, j + offset_x))
    })
}

/// Rotate a row left by `shift` using slice semantics: `row[shift..] +
/// row[..shift]`, which leaves the row untouched once `shift` reaches its
/// length.
fn rotate_row(row: &mut [u8], shift: usize) {
    if shift < row.len() {
        row.rotate_left(shift);
    }
}

fn shift_rows<F>(img: &GrayImage, shift_for: F) -> GrayImage
where
    F: Fn(usize) -> usize,
{
    let (columns, rows) = img.dimensions();
    let mut raw = img.as_raw().clone();
    if columns > 0 {
        for (i, row) in raw.chunks_exact_mut(columns as usize).enumerate() {
            rotate_row(row, shift_for(i));
        }
    }
    // Same length and dimensions as the source buffer.
    GrayImage::from_raw(columns, rows, raw).unwrap_or_else(|| img.clone())
}

/// Row `i` is rotated left by `i` pixels.
pub fn left_shift(img: &GrayImage) -> GrayImage {
    shift_rows(img, |i| i)
}

/// Row `i` is rotated left by `rows - i` pixels.
///
/// The row count is the modulus base even though rows are shifted along the
/// column axis, so this only inverts [`left_shift`] on square images.
pub fn right_shift(img: &GrayImage) -> GrayImage {
    let rows = img.height() as usize;
    shift_rows(img, |i| rows - i)
}
