use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Aspect-preserving resize operations
pub struct ImageResize;

impl ImageResize {
    /// Largest dimensions that fit inside `max_width` x `max_height` while keeping
    /// the aspect ratio. Never upscales.
    ///
    /// The constrained side lands exactly on the box; the other side is floored
    /// and kept at least one pixel.
    pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
        if width == 0 || height == 0 || (width <= max_width && height <= max_height) {
            return (width, height);
        }

        let (w, h) = (u64::from(width), u64::from(height));
        let (max_w, max_h) = (u64::from(max_width), u64::from(max_height));

        // Compare max_w / w against max_h / h without leaving integers.
        if max_w * h <= max_h * w {
            let scaled_h = (h * max_w / w).max(1);
            (max_width, scaled_h as u32)
        } else {
            let scaled_w = (w * max_h / h).max(1);
            (scaled_w as u32, max_height)
        }
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            FilterType::Triangle
        } else if max_ratio > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }

    /// Shrink `img` to fit the box. Images already inside it are returned unchanged.
    pub fn resize_to_fit(img: &DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let (width, height) = Self::fit_within(orig_width, orig_height, max_width, max_height);
        if (width, height) == (orig_width, orig_height) {
            return img.clone();
        }
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        img.resize_exact(width, height, filter)
    }
}
