use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};

/// Black canvas with white filled rectangles `(x, y, width, height)`.
pub fn blob_image(width: u32, height: u32, blobs: &[(u32, u32, u32, u32)]) -> GrayImage {
    let mut img = GrayImage::new(width, height);
    for &(bx, by, bw, bh) in blobs {
        for y in by..by + bh {
            for x in bx..bx + bw {
                img.put_pixel(x, y, Luma([255]));
            }
        }
    }
    img
}

/// Four well separated letters on a 100x100 canvas.
pub fn four_letter_image() -> GrayImage {
    blob_image(
        100,
        100,
        &[(22, 35, 6, 30), (38, 35, 6, 30), (54, 35, 6, 30), (70, 35, 6, 30)],
    )
}

/// Save `img` as `<dir>/<label>.png` and return the path.
pub fn write_captcha(dir: &Path, label: &str, img: &GrayImage) -> PathBuf {
    let path = dir.join(format!("{}.png", label));
    img.save(&path).expect("Failed to save test captcha");
    path
}

/// Relative paths of every file under `dir`, sorted.
pub fn files_under(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return files;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let sub = entry.file_name().to_string_lossy().into_owned();
            files.extend(files_under(&path).into_iter().map(|f| format!("{}/{}", sub, f)));
        } else {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    files.sort();
    files
}
