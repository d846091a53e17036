//! Colour statistics of a photograph, sampled on a fixed grid.

use image::{imageops::FilterType, RgbImage};
use log::{debug, warn};
use serde::Serialize;

/// Images are resampled to `SAMPLE_EDGE` x `SAMPLE_EDGE` before any statistics.
pub const SAMPLE_EDGE: u32 = 100;

/// Aggregate pixel statistics of a sampled image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorProfile {
    /// Mean red, green, blue, each 0-255
    pub dominant_color: [u8; 3],
    /// Luma-weighted brightness, 0-255
    pub brightness: f64,
    /// Mean of the three per-channel standard deviations
    pub color_variance: f64,
}

/// Profile substituted when the bytes cannot be decoded.
pub const NEUTRAL_PROFILE: ColorProfile = ColorProfile {
    dominant_color: [100, 150, 200],
    brightness: 128.0,
    color_variance: 30.0,
};

/// Whether a profile was measured or substituted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ProfileSource {
    Decoded,
    Defaulted { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedProfile {
    pub profile: ColorProfile,
    pub source: ProfileSource,
}

impl ExtractedProfile {
    fn defaulted(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!("Using neutral colour profile: {}", reason);
        ExtractedProfile {
            profile: NEUTRAL_PROFILE,
            source: ProfileSource::Defaulted { reason },
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self.source, ProfileSource::Defaulted { .. })
    }
}

/// Decode `bytes` and compute its colour profile.
///
/// Never fails: undecodable input yields [`NEUTRAL_PROFILE`] tagged as
/// [`ProfileSource::Defaulted`].
pub fn extract_profile(bytes: &[u8]) -> ExtractedProfile {
    match image::load_from_memory(bytes) {
        Ok(img) => {
            debug!("Decoded {}x{} image", img.width(), img.height());
            let sampled = img
                .resize_exact(SAMPLE_EDGE, SAMPLE_EDGE, FilterType::Triangle)
                .to_rgb8();
            ExtractedProfile {
                profile: profile_of(&sampled),
                source: ProfileSource::Decoded,
            }
        }
        Err(e) => ExtractedProfile::defaulted(format!("image decode failed: {}", e)),
    }
}

/// [`extract_profile`] on the blocking thread pool.
pub async fn extract_profile_offloaded(bytes: Vec<u8>) -> ExtractedProfile {
    match tokio::task::spawn_blocking(move || extract_profile(&bytes)).await {
        Ok(extracted) => extracted,
        Err(e) => ExtractedProfile::defaulted(format!("image worker failed: {}", e)),
    }
}

/// Per-channel mean and standard deviation over every pixel of `img`.
pub fn profile_of(img: &RgbImage) -> ColorProfile {
    let n = (img.width() as f64) * (img.height() as f64);
    if n == 0.0 {
        return NEUTRAL_PROFILE;
    }
    let mut sum = [0f64; 3];
    let mut sum_sq = [0f64; 3];
    for pixel in img.pixels() {
        for (c, value) in pixel.0.iter().enumerate() {
            let v = *value as f64;
            sum[c] += v;
            sum_sq[c] += v * v;
        }
    }
    let mean = sum.map(|s| s / n);
    let mut std_total = 0.0;
    for c in 0..3 {
        std_total += (sum_sq[c] / n - mean[c] * mean[c]).max(0.0).sqrt();
    }
    let brightness = 0.299 * mean[0] + 0.587 * mean[1] + 0.114 * mean[2];

    ColorProfile {
        dominant_color: mean.map(|m| m.round().clamp(0.0, 255.0) as u8),
        brightness: brightness.round(),
        color_variance: (std_total / 3.0).round(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb};
    use std::io::Cursor;

    pub(crate) fn png_bytes(img: RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_black_image() {
        let bytes = png_bytes(RgbImage::from_pixel(32, 24, Rgb([0, 0, 0])));
        let extracted = extract_profile(&bytes);
        assert_eq!(extracted.source, ProfileSource::Decoded);
        assert_eq!(extracted.profile.dominant_color, [0, 0, 0]);
        assert!((extracted.profile.brightness - 0.0).abs() < f64::EPSILON);
        assert!((extracted.profile.color_variance - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_uniform_colour_brightness() {
        let bytes = png_bytes(RgbImage::from_pixel(200, 150, Rgb([200, 100, 50])));
        let profile = extract_profile(&bytes).profile;
        assert_eq!(profile.dominant_color, [200, 100, 50]);
        // 0.299*200 + 0.587*100 + 0.114*50 = 124.2
        assert!((profile.brightness - 124.0).abs() < f64::EPSILON);
        assert!((profile.color_variance - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_checkerboard_variance() {
        // Exact statistics without resampling: half 0, half 255 on every channel.
        let img = RgbImage::from_fn(SAMPLE_EDGE, SAMPLE_EDGE, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let profile = profile_of(&img);
        assert_eq!(profile.dominant_color, [128, 128, 128]);
        assert!((profile.color_variance - 128.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_undecodable_bytes_are_flagged() {
        let extracted = extract_profile(b"definitely not an image");
        assert!(extracted.is_defaulted());
        assert_eq!(extracted.profile, NEUTRAL_PROFILE);
        match extracted.source {
            ProfileSource::Defaulted { reason } => assert!(reason.contains("decode")),
            ProfileSource::Decoded => panic!("expected a defaulted profile"),
        }
    }

    #[test]
    fn test_empty_bytes_are_flagged() {
        assert!(extract_profile(&[]).is_defaulted());
    }

    #[tokio::test]
    async fn test_offloaded_matches_inline() {
        let bytes = png_bytes(RgbImage::from_pixel(10, 10, Rgb([10, 200, 30])));
        let inline = extract_profile(&bytes);
        let offloaded = extract_profile_offloaded(bytes).await;
        assert_eq!(inline, offloaded);
    }
}
