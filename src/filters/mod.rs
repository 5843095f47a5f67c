// SPDX-License-Identifier: GPL-3.0-only

//! Photo filters
//!
//! The filter set is fixed:
//!
//! | name         | transform chain                         |
//! |--------------|-----------------------------------------|
//! | `none`       | identity                                |
//! | `smooth`     | Gaussian blur (radius 2.0)              |
//! | `brightness` | brightness +0.3, saturation ×1.1        |
//! | `grayscale`  | monochrome                              |
//! | `vintage`    | sepia (0.8), then vignette (2.0)        |
//!
//! The [`FilterSelector`] stores whatever name it was last given. Names are
//! only interpreted when a filter is applied, and unknown names behave like
//! `none`.

pub mod transforms;

use crate::constants::filter_params;
use image::RgbImage;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};
use transforms::{ColorControls, GaussianBlur, Mono, SepiaTone, Transform, Vignette, apply_chain};

/// Recognized filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    /// No filter applied
    #[default]
    None,
    /// Gaussian blur
    Smooth,
    /// Brighter, slightly more saturated
    Brightness,
    /// Monochrome
    Grayscale,
    /// Sepia with darkened edges
    Vintage,
}

impl FilterType {
    /// All filters in display order
    pub const ALL: [FilterType; 5] = [
        FilterType::None,
        FilterType::Smooth,
        FilterType::Brightness,
        FilterType::Grayscale,
        FilterType::Vintage,
    ];

    /// Name used on the channel
    pub fn name(&self) -> &'static str {
        match self {
            FilterType::None => "none",
            FilterType::Smooth => "smooth",
            FilterType::Brightness => "brightness",
            FilterType::Grayscale => "grayscale",
            FilterType::Vintage => "vintage",
        }
    }

    /// Resolve a name, treating anything unrecognized as [`FilterType::None`]
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|filter| filter.name() == name)
            .unwrap_or_default()
    }

    /// Apply this filter to a captured still.
    ///
    /// Never fails. If a step cannot produce output, the nearest image that
    /// was produced is returned instead: for `vintage` that is the sepia
    /// result, then the input; for every other filter it is the input.
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        match self {
            FilterType::None => image.clone(),
            FilterType::Smooth => apply_chain(
                image,
                &[&GaussianBlur {
                    radius: filter_params::SMOOTH_BLUR_RADIUS,
                }],
            ),
            FilterType::Brightness => apply_chain(
                image,
                &[&ColorControls {
                    brightness: filter_params::BRIGHTNESS_OFFSET,
                    saturation: filter_params::BRIGHTNESS_SATURATION,
                }],
            ),
            FilterType::Grayscale => apply_chain(image, &[&Mono]),
            FilterType::Vintage => {
                let steps: [&dyn Transform; 2] = [
                    &SepiaTone {
                        intensity: filter_params::SEPIA_INTENSITY,
                    },
                    &Vignette {
                        intensity: filter_params::VIGNETTE_INTENSITY,
                    },
                ];
                apply_chain(image, &steps)
            }
        }
    }
}

impl std::fmt::Display for FilterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Holds the current filter name. Last write wins.
#[derive(Debug)]
pub struct FilterSelector {
    current: Mutex<String>,
}

impl FilterSelector {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(initial.into()),
        }
    }

    /// Overwrite the current selection. Any name is accepted.
    pub fn set_filter(&self, name: &str) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = name.to_string();
        info!(filter = %name, "Filter set");
    }

    /// The name as last set, which may be unrecognized
    pub fn current_name(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The filter the current name resolves to
    pub fn current(&self) -> FilterType {
        FilterType::from_name(&self.current_name())
    }

    /// Apply the currently selected filter
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        let filter = self.current();
        debug!(filter = %filter, "Applying filter");
        filter.apply(image)
    }
}

impl Default for FilterSelector {
    fn default() -> Self {
        Self::new(FilterType::None.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
        })
    }

    #[test]
    fn test_names_round_trip() {
        for filter in FilterType::ALL {
            assert_eq!(FilterType::from_name(filter.name()), filter);
        }
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert_eq!(FilterType::from_name("sparkle"), FilterType::None);
        assert_eq!(FilterType::from_name(""), FilterType::None);
        assert_eq!(FilterType::from_name("Vintage"), FilterType::None);
    }

    #[test]
    fn test_unknown_name_applies_identity() {
        let image = gradient(16, 12);
        let selector = FilterSelector::default();
        selector.set_filter("sparkle");
        assert_eq!(selector.current_name(), "sparkle");
        assert_eq!(selector.apply(&image), image);
    }

    #[test]
    fn test_last_write_wins() {
        let selector = FilterSelector::default();
        selector.set_filter("smooth");
        selector.set_filter("grayscale");
        assert_eq!(selector.current(), FilterType::Grayscale);
    }

    #[test]
    fn test_filters_preserve_extent() {
        let image = gradient(33, 21);
        for filter in FilterType::ALL {
            assert_eq!(filter.apply(&image).dimensions(), (33, 21), "{}", filter);
        }
    }

    #[test]
    fn test_vintage_differs_from_none() {
        let image = gradient(32, 32);
        assert_ne!(FilterType::Vintage.apply(&image), FilterType::None.apply(&image));
    }

    #[test]
    fn test_empty_image_falls_back_to_input() {
        let empty = RgbImage::new(0, 0);
        for filter in FilterType::ALL {
            assert_eq!(filter.apply(&empty).dimensions(), (0, 0));
        }
    }
}
