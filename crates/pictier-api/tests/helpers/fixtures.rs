//! Test fixtures: encoded images and the seeded tiers.

#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use pictier_core::{AccessTier, ThumbnailSpec};
use uuid::Uuid;

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, format)
        .expect("encode fixture image");
    out.into_inner()
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

/// PNG signature followed by garbage.
pub fn create_corrupt_png() -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(b"this is not really a png");
    data
}

pub fn tier(
    name: &str,
    original_links: bool,
    expiring_links: bool,
    expiration_time: Option<i32>,
) -> AccessTier {
    AccessTier {
        id: Uuid::new_v4(),
        name: name.to_string(),
        original_links,
        expiring_links,
        expiration_time,
    }
}

pub fn spec(tier: &AccessTier, name: &str, max_width: i32, max_height: i32) -> ThumbnailSpec {
    ThumbnailSpec {
        id: Uuid::new_v4(),
        tier_id: tier.id,
        name: name.to_string(),
        max_width,
        max_height,
    }
}
