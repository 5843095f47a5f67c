// SPDX-License-Identifier: GPL-3.0-only

//! CPU image transforms behind the filter set
//!
//! Each transform maps one RGB still to another. A transform that cannot
//! produce output returns `None`; the caller then falls back to the last
//! image that was produced.

use crate::constants::filter_params::{LUMA_B, LUMA_G, LUMA_R};
use image::RgbImage;

/// A single image transform step
pub trait Transform: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Apply the transform, or `None` if no output can be produced
    fn apply(&self, image: &RgbImage) -> Option<RgbImage>;
}

/// Gaussian blur, cropped back to the input extent
#[derive(Debug, Clone, Copy)]
pub struct GaussianBlur {
    pub radius: f32,
}

/// Brightness and saturation adjustment
#[derive(Debug, Clone, Copy)]
pub struct ColorControls {
    /// Added to each normalized channel
    pub brightness: f32,
    /// 1.0 leaves saturation unchanged
    pub saturation: f32,
}

/// Monochrome photo effect
#[derive(Debug, Clone, Copy)]
pub struct Mono;

/// Sepia tone blended with the input
#[derive(Debug, Clone, Copy)]
pub struct SepiaTone {
    /// 0.0 returns the input, 1.0 full sepia
    pub intensity: f32,
}

/// Radial darkening towards the corners
#[derive(Debug, Clone, Copy)]
pub struct Vignette {
    pub intensity: f32,
}

fn has_extent(image: &RgbImage) -> bool {
    image.width() > 0 && image.height() > 0
}

#[inline]
fn luma(r: f32, g: f32, b: f32) -> f32 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

#[inline]
fn to_unit(v: u8) -> f32 {
    v as f32 / 255.0
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Smoothstep function for vignette falloff
#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Run `f` over every pixel in normalized RGB, producing a new image
fn map_pixels<F>(image: &RgbImage, f: F) -> RgbImage
where
    F: Fn(u32, u32, [f32; 3]) -> [f32; 3],
{
    let mut output = image.clone();
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let [r, g, b] = f(x, y, [to_unit(pixel[0]), to_unit(pixel[1]), to_unit(pixel[2])]);
        pixel[0] = to_byte(r);
        pixel[1] = to_byte(g);
        pixel[2] = to_byte(b);
    }
    output
}

impl Transform for GaussianBlur {
    fn name(&self) -> &'static str {
        "gaussian-blur"
    }

    fn apply(&self, image: &RgbImage) -> Option<RgbImage> {
        if !has_extent(image) || !self.radius.is_finite() || self.radius <= 0.0 {
            return None;
        }
        // imageops::blur clamps at the edges, so the result already has the input extent
        let blurred = image::imageops::blur(image, self.radius);
        let (width, height) = image.dimensions();
        if blurred.dimensions() == (width, height) {
            Some(blurred)
        } else {
            Some(image::imageops::crop_imm(&blurred, 0, 0, width, height).to_image())
        }
    }
}

impl Transform for ColorControls {
    fn name(&self) -> &'static str {
        "color-controls"
    }

    fn apply(&self, image: &RgbImage) -> Option<RgbImage> {
        if !has_extent(image) || !self.brightness.is_finite() || !self.saturation.is_finite() {
            return None;
        }
        let brightness = self.brightness;
        let saturation = self.saturation;
        Some(map_pixels(image, |_, _, [r, g, b]| {
            let gray = luma(r, g, b);
            [
                gray + (r - gray) * saturation + brightness,
                gray + (g - gray) * saturation + brightness,
                gray + (b - gray) * saturation + brightness,
            ]
        }))
    }
}

impl Transform for Mono {
    fn name(&self) -> &'static str {
        "mono"
    }

    fn apply(&self, image: &RgbImage) -> Option<RgbImage> {
        if !has_extent(image) {
            return None;
        }
        Some(map_pixels(image, |_, _, [r, g, b]| {
            let gray = luma(r, g, b);
            [gray, gray, gray]
        }))
    }
}

impl Transform for SepiaTone {
    fn name(&self) -> &'static str {
        "sepia-tone"
    }

    fn apply(&self, image: &RgbImage) -> Option<RgbImage> {
        if !has_extent(image) || !self.intensity.is_finite() {
            return None;
        }
        let k = self.intensity.clamp(0.0, 1.0);
        Some(map_pixels(image, |_, _, [r, g, b]| {
            let sr = 0.393 * r + 0.769 * g + 0.189 * b;
            let sg = 0.349 * r + 0.686 * g + 0.168 * b;
            let sb = 0.272 * r + 0.534 * g + 0.131 * b;
            [r + (sr - r) * k, g + (sg - g) * k, b + (sb - b) * k]
        }))
    }
}

impl Transform for Vignette {
    fn name(&self) -> &'static str {
        "vignette"
    }

    fn apply(&self, image: &RgbImage) -> Option<RgbImage> {
        if !has_extent(image) || !self.intensity.is_finite() {
            return None;
        }
        let (width, height) = image.dimensions();
        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;
        let half_diagonal = (cx * cx + cy * cy).sqrt();
        // At intensity 2.0 the corners keep half their brightness
        let strength = self.intensity * 0.25;

        Some(map_pixels(image, |x, y, [r, g, b]| {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let dist = (dx * dx + dy * dy).sqrt() / half_diagonal;
            let factor = (1.0 - strength * smoothstep(0.0, 1.0, dist)).clamp(0.0, 1.0);
            [r * factor, g * factor, b * factor]
        }))
    }
}

/// Apply `steps` in order and return the last image that was produced.
///
/// A step that yields no output ends the chain; the previous result (or the
/// input itself when the first step fails) is returned.
pub fn apply_chain(image: &RgbImage, steps: &[&dyn Transform]) -> RgbImage {
    let mut current: Option<RgbImage> = None;
    for step in steps {
        let source = current.as_ref().unwrap_or(image);
        match step.apply(source) {
            Some(output) => current = Some(output),
            None => {
                tracing::warn!(transform = step.name(), "Transform produced no output, keeping previous image");
                break;
            }
        }
    }
    current.unwrap_or_else(|| image.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Transform that never produces output
    struct Unavailable;

    impl Transform for Unavailable {
        fn name(&self) -> &'static str {
            "unavailable"
        }

        fn apply(&self, _image: &RgbImage) -> Option<RgbImage> {
            None
        }
    }

    fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(color))
    }

    #[test]
    fn test_blur_preserves_extent() {
        let mut image = solid(17, 9, [0, 0, 0]);
        image.put_pixel(8, 4, Rgb([255, 255, 255]));
        let blurred = GaussianBlur { radius: 2.0 }.apply(&image).unwrap();
        assert_eq!(blurred.dimensions(), (17, 9));
        // Energy spreads to the neighbours
        assert!(blurred.get_pixel(8, 4)[0] < 255);
        assert!(blurred.get_pixel(9, 4)[0] > 0);
    }

    #[test]
    fn test_color_controls_brightens() {
        let image = solid(2, 2, [100, 100, 100]);
        let out = ColorControls {
            brightness: 0.2,
            saturation: 1.1,
        }
        .apply(&image)
        .unwrap();
        // Gray input has no chroma, so only the offset applies
        assert_eq!(out.get_pixel(0, 0).0, [151, 151, 151]);
    }

    #[test]
    fn test_mono_equalizes_channels() {
        let out = Mono.apply(&solid(3, 3, [200, 40, 90])).unwrap();
        let p = out.get_pixel(1, 1);
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
    }

    #[test]
    fn test_sepia_zero_intensity_is_identity() {
        let image = solid(2, 2, [10, 120, 230]);
        let out = SepiaTone { intensity: 0.0 }.apply(&image).unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn test_vignette_darkens_corners_not_center() {
        let image = solid(64, 64, [200, 200, 200]);
        let out = Vignette { intensity: 2.0 }.apply(&image).unwrap();
        assert_eq!(out.dimensions(), (64, 64));
        let center = out.get_pixel(32, 32)[0];
        let corner = out.get_pixel(0, 0)[0];
        assert!(corner < center);
        assert!(center >= 195);
    }

    #[test]
    fn test_empty_image_produces_no_output() {
        let empty = RgbImage::new(0, 0);
        assert!(GaussianBlur { radius: 2.0 }.apply(&empty).is_none());
        assert!(Mono.apply(&empty).is_none());
        assert!(Vignette { intensity: 2.0 }.apply(&empty).is_none());
    }

    #[test]
    fn test_chain_keeps_last_successful_step() {
        let image = solid(4, 4, [10, 120, 230]);
        let sepia = SepiaTone { intensity: 0.8 };
        let sepia_only = sepia.apply(&image).unwrap();

        let out = apply_chain(&image, &[&sepia, &Unavailable]);
        assert_eq!(out, sepia_only);

        let out = apply_chain(&image, &[&Unavailable, &sepia]);
        assert_eq!(out, image);
    }
}
