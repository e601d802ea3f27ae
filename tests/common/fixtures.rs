#![allow(dead_code)]

use image::{GrayImage, Luma};
use tempfile::TempDir;

/// 20x12 label image:
/// - label 1: an 8x7 block (columns 2-9, rows 2-8) with a one-pixel hole at (5, 5)
/// - label 2: a solid 6x5 block (columns 12-17, rows 3-7)
pub fn block_with_hole() -> GrayImage {
    let mut img = GrayImage::new(20, 12);
    for y in 2..9 {
        for x in 2..10 {
            if (x, y) != (5, 5) {
                img.put_pixel(x, y, Luma([1]));
            }
        }
    }
    for y in 3..8 {
        for x in 12..18 {
            img.put_pixel(x, y, Luma([2]));
        }
    }
    img
}

/// 11x11 label image: a 3x3 block of label 1 (columns/rows 4-6)
/// whose center pixel (5, 5) is label 2
pub fn block_with_core() -> GrayImage {
    let mut img = GrayImage::new(11, 11);
    for y in 4..7 {
        for x in 4..7 {
            img.put_pixel(x, y, Luma([1]));
        }
    }
    img.put_pixel(5, 5, Luma([2]));
    img
}

/// 15x12 label image: a 9x6 block of label 1 (columns 3-11, rows 3-8)
/// with a one-pixel notch at (5, 3) on its top edge
pub fn block_with_notch() -> GrayImage {
    let mut img = GrayImage::new(15, 12);
    for y in 3..9 {
        for x in 3..12 {
            img.put_pixel(x, y, Luma([1]));
        }
    }
    img.put_pixel(5, 3, Luma([0]));
    img
}

/// 12x5 label image: a 3x3 block of label 1 (columns 4-6, rows 1-3),
/// one pixel away from the top and bottom edges
pub fn block_near_edges() -> GrayImage {
    let mut img = GrayImage::new(12, 5);
    for y in 1..4 {
        for x in 4..7 {
            img.put_pixel(x, y, Luma([1]));
        }
    }
    img
}

/// 12x5 label image: two 3x3 squares of label 1 joined by a one-pixel bridge
pub fn dumbbell() -> GrayImage {
    let mut img = GrayImage::new(12, 5);
    for y in 1..4 {
        for x in (1..4).chain(7..10) {
            img.put_pixel(x, y, Luma([1]));
        }
    }
    for x in 4..7 {
        img.put_pixel(x, 2, Luma([1]));
    }
    img
}

/// Label object made of the given runs
pub fn object(label: u8, runs: &[(u32, u32, u32)]) -> labelmorph::LabelObject {
    let mut object = labelmorph::LabelObject::new(label);
    for &(x, y, length) in runs {
        object.add_run(labelmorph::Run::new(x, y, length));
    }
    object
}

/// Save an image into a fresh temp directory, returning the directory and file path
pub fn save_in_temp_dir(img: &GrayImage, name: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join(name);
    img.save(&path).expect("Failed to save test image");
    (dir, path)
}

/// Count pixels with the given value
pub fn count_value(img: &GrayImage, value: u8) -> usize {
    img.pixels().filter(|p| p[0] == value).count()
}
