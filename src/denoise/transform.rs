use glam::{IVec2, IVec4};
use log::debug;
use rayon::prelude::*;

use crate::buffers::pixel_offset;
use crate::math::{
    symmetric_add_gramian, symmetric_jacobi_eigendecomposition, vector_add, vector_max,
    vector_mul, vector_scale,
};

use super::{FeatureExtractor, DENOISE_FEATURES};

const F: usize = DENOISE_FEATURES;

/// Build the rank-reduced feature transform for the output pixel (x, y).
///
/// The denoising window is the `radius`-neighborhood of the pixel clamped
/// to `rect`, the valid region of `buffer`. The transform maps the
/// F-dimensional feature space to a reduced space, which mainly helps to
/// prevent overfitting; rows `0..rank` of `transform` are filled with the
/// reduced orthonormal basis, with the per-feature scaling baked in so
/// downstream code applies a single matrix multiply. Returns the rank,
/// which is never below 2.
pub fn construct_transform<E: FeatureExtractor>(
    extractor: &E,
    buffer: &[f32],
    x: i32,
    y: i32,
    rect: IVec4,
    pass_stride: usize,
    radius: i32,
    pca_threshold: f32,
    transform: &mut [f32],
) -> usize {
    debug_assert!(transform.len() >= F * F);

    let low = IVec2::new((x - radius).max(rect.x), (y - radius).max(rect.y));
    let high = IVec2::new((x + radius + 1).min(rect.z), (y + radius + 1).min(rect.w));

    let pixel_at = |px: i32, py: i32| -> &[f32] {
        let offset = pixel_offset(rect, px, py, pass_stride);
        &buffer[offset..offset + pass_stride]
    };

    let mut features = [0.0f32; F];

    // Shift the feature passes to mean 0.
    let mut feature_means = [0.0f32; F];
    for py in low.y..high.y {
        for px in low.x..high.x {
            extractor.get_features(IVec2::new(px, py), pixel_at(px, py), &mut features, None);
            vector_add(&mut feature_means, &features);
        }
    }
    let pixel_scale = 1.0 / ((high.y - low.y) * (high.x - low.x)) as f32;
    vector_scale(&mut feature_means, pixel_scale);

    // Scale factors mapping the shifted features to roughly [-1, 1]; baked
    // into the transform at the end.
    let mut feature_scale = [0.0f32; F];
    for py in low.y..high.y {
        for px in low.x..high.x {
            extractor.get_feature_scales(
                IVec2::new(px, py),
                pixel_at(px, py),
                &mut features,
                &feature_means,
            );
            vector_max(&mut feature_scale, &features);
        }
    }
    extractor.calculate_scale(&mut feature_scale);

    // Gramian of the scaled, mean-shifted features over the window.
    let mut feature_matrix = [0.0f32; F * F];
    for py in low.y..high.y {
        for px in low.x..high.x {
            extractor.get_features(
                IVec2::new(px, py),
                pixel_at(px, py),
                &mut features,
                Some(&feature_means),
            );
            vector_mul(&mut features, &feature_scale);
            symmetric_add_gramian(&mut feature_matrix, F, &features, 1.0);
        }
    }

    symmetric_jacobi_eigendecomposition(&mut feature_matrix, transform, F);

    let mut rank = 0;
    if pca_threshold > 0.0 {
        // Keep components until the retained energy reaches the threshold
        // share of the total; never fewer than two.
        let total_energy: f32 = (0..F).map(|i| feature_matrix[i * F + i]).sum();
        let threshold_energy = total_energy * (1.0 - pca_threshold);

        let mut reduced_energy = 0.0;
        for i in 0..F {
            let eigenvalue = feature_matrix[i * F + i];
            if i >= 2 && reduced_energy >= threshold_energy {
                break;
            }
            reduced_energy += eigenvalue;
            vector_mul(&mut transform[i * F..(i + 1) * F], &feature_scale);
            rank += 1;
        }
    } else {
        // Negative thresholds select by standard deviation instead.
        for i in 0..F {
            let eigenvalue = feature_matrix[i * F + i];
            if i >= 2 && eigenvalue.sqrt() < -pca_threshold {
                break;
            }
            vector_mul(&mut transform[i * F..(i + 1) * F], &feature_scale);
            rank += 1;
        }
    }

    rank
}

/// Build the transforms for every output pixel of `tile_rect`, one builder
/// per pixel in parallel. `transforms` holds F*F floats per pixel and
/// `ranks` one entry per pixel, both row-major over the tile rect.
/// `sample` is only passed through from the render phase.
#[allow(clippy::too_many_arguments)]
pub fn construct_transforms<E>(
    extractor: &E,
    sample: i32,
    buffer: &[f32],
    tile_rect: IVec4,
    rect: IVec4,
    pass_stride: usize,
    radius: i32,
    pca_threshold: f32,
    transforms: &mut [f32],
    ranks: &mut [usize],
) where
    E: FeatureExtractor + Sync,
{
    let tile_w = (tile_rect.z - tile_rect.x).max(0) as usize;
    let tile_h = (tile_rect.w - tile_rect.y).max(0) as usize;
    debug_assert_eq!(ranks.len(), tile_w * tile_h);
    debug_assert_eq!(transforms.len(), ranks.len() * F * F);

    debug!(
        "constructing feature transforms for {}x{} pixels, sample {}",
        tile_w, tile_h, sample
    );

    transforms
        .par_chunks_exact_mut(F * F)
        .zip(ranks.par_iter_mut())
        .enumerate()
        .for_each(|(idx, (transform, rank))| {
            let x = tile_rect.x + (idx % tile_w) as i32;
            let y = tile_rect.y + (idx / tile_w) as i32;
            *rank = construct_transform(
                extractor,
                buffer,
                x,
                y,
                rect,
                pass_stride,
                radius,
                pca_threshold,
                transform,
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two live features with different variances; the rest constant. The
    // fixed multipliers stand in for whatever calculate_scale would derive.
    struct TwoAxisFeatures {
        multipliers: [f32; F],
    }

    impl TwoAxisFeatures {
        fn new() -> Self {
            let mut multipliers = [1.0; F];
            multipliers[0] = 2.0;
            multipliers[1] = 3.0;
            Self { multipliers }
        }
    }

    impl FeatureExtractor for TwoAxisFeatures {
        fn get_features(
            &self,
            pixel: IVec2,
            _pixel_buffer: &[f32],
            features: &mut [f32; F],
            mean: Option<&[f32; F]>,
        ) {
            let sign_x = if pixel.x % 2 == 0 { 1.0 } else { -1.0 };
            let sign_y = if pixel.y % 2 == 0 { 1.0 } else { -1.0 };
            features[0] = 10.0f32.sqrt() * sign_x;
            features[1] = sign_y;
            for f in features.iter_mut().skip(2) {
                *f = 3.0;
            }
            if let Some(mean) = mean {
                for (f, m) in features.iter_mut().zip(mean) {
                    *f -= m;
                }
            }
        }

        fn get_feature_scales(
            &self,
            pixel: IVec2,
            pixel_buffer: &[f32],
            scales: &mut [f32; F],
            mean: &[f32; F],
        ) {
            self.get_features(pixel, pixel_buffer, scales, Some(mean));
            for s in scales.iter_mut() {
                *s = s.abs();
            }
        }

        fn calculate_scale(&self, scale: &mut [f32; F]) {
            *scale = self.multipliers;
        }
    }

    struct ConstantFeatures;

    impl FeatureExtractor for ConstantFeatures {
        fn get_features(
            &self,
            _pixel: IVec2,
            _pixel_buffer: &[f32],
            features: &mut [f32; F],
            mean: Option<&[f32; F]>,
        ) {
            features.fill(1.5);
            if let Some(mean) = mean {
                for (f, m) in features.iter_mut().zip(mean) {
                    *f -= m;
                }
            }
        }

        fn get_feature_scales(
            &self,
            pixel: IVec2,
            pixel_buffer: &[f32],
            scales: &mut [f32; F],
            mean: &[f32; F],
        ) {
            self.get_features(pixel, pixel_buffer, scales, Some(mean));
            for s in scales.iter_mut() {
                *s = s.abs();
            }
        }

        fn calculate_scale(&self, scale: &mut [f32; F]) {
            for s in scale.iter_mut() {
                *s = 1.0 / s.max(0.01);
            }
        }
    }

    // 4x4 window covering the whole rect, so the alternating-sign features
    // have exact zero mean and zero cross-covariance.
    const RECT: IVec4 = IVec4::new(0, 0, 4, 4);

    #[test]
    fn energy_threshold_keeps_two_axes() {
        let extractor = TwoAxisFeatures::new();
        let buffer = [0.0; 64];
        let mut transform = [0.0; F * F];
        let rank =
            construct_transform(&extractor, &buffer, 0, 0, RECT, 1, 3, 0.1, &mut transform);

        assert_eq!(rank, 2);

        // First row picks the high-variance axis, scaled by its multiplier.
        assert!((transform[0].abs() - 2.0).abs() < 1e-3);
        for &v in &transform[1..F] {
            assert!(v.abs() < 1e-3);
        }
        // Second row picks the low-variance axis.
        assert!((transform[F + 1].abs() - 3.0).abs() < 1e-3);
        for (i, &v) in transform[F..2 * F].iter().enumerate() {
            if i != 1 {
                assert!(v.abs() < 1e-3);
            }
        }
    }

    #[test]
    fn stddev_cutoff_drops_dead_axes() {
        let extractor = TwoAxisFeatures::new();
        let buffer = [0.0; 64];
        let mut transform = [0.0; F * F];
        // Keep components with a standard deviation of at least 2.
        let rank =
            construct_transform(&extractor, &buffer, 0, 0, RECT, 1, 3, -2.0, &mut transform);
        assert_eq!(rank, 2);
    }

    #[test]
    fn zero_variance_window_still_yields_a_basis() {
        let buffer = [0.0; 64];
        let mut transform = [0.0; F * F];
        let rank =
            construct_transform(&ConstantFeatures, &buffer, 1, 1, RECT, 1, 3, 0.1, &mut transform);

        assert_eq!(rank, 2);
        // The Gramian is all-zero, so the basis stays identity-like over
        // the first two features (times the degenerate scale).
        for row in 0..rank {
            for col in 0..F {
                let expected = if row == col { 100.0 } else { 0.0 };
                assert!((transform[row * F + col] - expected).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn baked_rows_scale_the_orthonormal_basis() {
        // With unit multipliers, the baked rows are the eigenvector rows
        // themselves and must stay orthonormal.
        let extractor = TwoAxisFeatures {
            multipliers: [1.0; F],
        };
        let buffer = [0.0; 64];
        let mut transform = [0.0; F * F];
        let rank =
            construct_transform(&extractor, &buffer, 0, 0, RECT, 1, 3, 0.1, &mut transform);

        assert!(rank >= 2 && rank <= F);
        for i in 0..rank {
            for j in 0..rank {
                let dot: f32 = (0..F)
                    .map(|k| transform[i * F + k] * transform[j * F + k])
                    .sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn parallel_driver_matches_single_pixel_builds() {
        let extractor = TwoAxisFeatures::new();
        let buffer = [0.0; 64];
        let tile_rect = IVec4::new(1, 1, 3, 3);

        let mut transforms = vec![0.0; 4 * F * F];
        let mut ranks = vec![0usize; 4];
        construct_transforms(
            &extractor,
            0,
            &buffer,
            tile_rect,
            RECT,
            1,
            3,
            0.1,
            &mut transforms,
            &mut ranks,
        );

        for (idx, &rank) in ranks.iter().enumerate() {
            let x = tile_rect.x + (idx % 2) as i32;
            let y = tile_rect.y + (idx / 2) as i32;
            let mut reference = [0.0; F * F];
            let reference_rank =
                construct_transform(&extractor, &buffer, x, y, RECT, 1, 3, 0.1, &mut reference);
            assert_eq!(rank, reference_rank);
            assert_eq!(&transforms[idx * F * F..(idx + 1) * F * F], &reference[..]);
        }
    }
}
