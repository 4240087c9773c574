mod transform;

use glam::IVec2;

pub use transform::{construct_transform, construct_transforms};

/// Dimension of the feature space the denoiser fits against.
pub const DENOISE_FEATURES: usize = 10;

/// Reads per-pixel denoising features out of an accumulated sample buffer.
/// `pixel_buffer` is the pixel's `pass_stride`-long slice of the buffer.
pub trait FeatureExtractor {
    /// Fill `features` for the pixel, subtracting `mean` when given.
    fn get_features(
        &self,
        pixel: IVec2,
        pixel_buffer: &[f32],
        features: &mut [f32; DENOISE_FEATURES],
        mean: Option<&[f32; DENOISE_FEATURES]>,
    );

    /// Fill `scales` with the pixel's feature magnitudes relative to the
    /// window mean; the component-wise window maximum of these feeds
    /// `calculate_scale`.
    fn get_feature_scales(
        &self,
        pixel: IVec2,
        pixel_buffer: &[f32],
        scales: &mut [f32; DENOISE_FEATURES],
        mean: &[f32; DENOISE_FEATURES],
    );

    /// Turn the window's maximum magnitudes into per-feature multipliers so
    /// scaled features land roughly in [-1, 1].
    fn calculate_scale(&self, scale: &mut [f32; DENOISE_FEATURES]);
}

/// Feature extraction over the standard render-pass layout: screen
/// position, depth, world normal, albedo and shadowing, each pass at a
/// fixed channel offset within the pixel.
pub struct RenderPassFeatures {
    pub pass_depth: usize,
    pub pass_normal: usize,
    pub pass_albedo: usize,
    pub pass_shadow: usize,
}

impl Default for RenderPassFeatures {
    fn default() -> Self {
        Self {
            pass_depth: 0,
            pass_normal: 1,
            pass_albedo: 4,
            pass_shadow: 7,
        }
    }
}

impl FeatureExtractor for RenderPassFeatures {
    fn get_features(
        &self,
        pixel: IVec2,
        pixel_buffer: &[f32],
        features: &mut [f32; DENOISE_FEATURES],
        mean: Option<&[f32; DENOISE_FEATURES]>,
    ) {
        features[0] = pixel.x as f32;
        features[1] = pixel.y as f32;
        features[2] = pixel_buffer[self.pass_depth].abs();
        features[3] = pixel_buffer[self.pass_normal];
        features[4] = pixel_buffer[self.pass_normal + 1];
        features[5] = pixel_buffer[self.pass_normal + 2];
        features[6] = pixel_buffer[self.pass_albedo];
        features[7] = pixel_buffer[self.pass_albedo + 1];
        features[8] = pixel_buffer[self.pass_albedo + 2];
        features[9] = pixel_buffer[self.pass_shadow];

        if let Some(mean) = mean {
            for (feature, mean) in features.iter_mut().zip(mean) {
                *feature -= mean;
            }
        }
    }

    fn get_feature_scales(
        &self,
        pixel: IVec2,
        pixel_buffer: &[f32],
        scales: &mut [f32; DENOISE_FEATURES],
        mean: &[f32; DENOISE_FEATURES],
    ) {
        self.get_features(pixel, pixel_buffer, scales, Some(mean));
        for scale in scales.iter_mut() {
            *scale = scale.abs();
        }
    }

    fn calculate_scale(&self, scale: &mut [f32; DENOISE_FEATURES]) {
        for s in scale.iter_mut() {
            *s = 1.0 / s.max(0.01);
        }
    }
}
