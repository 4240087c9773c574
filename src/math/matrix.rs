// Symmetric matrices are stored row-major in a flat n*n slice with only the
// upper triangle (row <= col) kept up to date.

#[inline]
fn at(n: usize, row: usize, col: usize) -> usize {
    row * n + col
}

fn matrix_identity(m: &mut [f32], n: usize) {
    for row in 0..n {
        for col in 0..n {
            m[at(n, row, col)] = if row == col { 1.0 } else { 0.0 };
        }
    }
}

/// M += weight * v vᵀ, upper triangle only.
pub fn symmetric_add_gramian(m: &mut [f32], n: usize, v: &[f32], weight: f32) {
    for row in 0..n {
        for col in row..n {
            m[at(n, row, col)] += weight * v[row] * v[col];
        }
    }
}

// One Jacobi rotation applied to the element pair (i1, i2), reformulated
// with sin(phi) and tan(phi/2) to avoid cancellation.
#[inline]
fn rotate(m: &mut [f32], i1: usize, i2: usize, sin: f32, tan_half: f32) {
    let m1 = m[i1];
    let m2 = m[i2];
    m[i1] = m1 - sin * (m2 + tan_half * m1);
    m[i2] = m2 + sin * (m1 - tan_half * m2);
}

/// Cyclic Jacobi eigendecomposition of the symmetric matrix in `m`.
///
/// On return the eigenvalues sit on the diagonal of `m` in descending order
/// and the rows of `v` hold the matching orthonormal eigenvectors. Sweeps
/// stop once the summed off-diagonal magnitude drops below a fixed
/// tolerance; the eigenvalues only feed a truncation decision downstream,
/// so a few ULPs of residual error are acceptable.
pub fn symmetric_jacobi_eigendecomposition(m: &mut [f32], v: &mut [f32], n: usize) {
    const SINGULAR_EPSILON: f32 = 1e-9;
    const OFF_DIAGONAL_TOLERANCE: f32 = 1e-7;

    matrix_identity(v, n);

    for sweep in 0..8 {
        let mut off_diagonal = 0.0;
        for row in 0..n {
            for col in (row + 1)..n {
                off_diagonal += m[at(n, row, col)].abs();
            }
        }
        if off_diagonal < OFF_DIAGONAL_TOLERANCE {
            break;
        }

        // In early sweeps, skip elements below a tenth of the average
        // off-diagonal magnitude.
        let threshold = 0.2 * off_diagonal / ((n * n) as f32);

        for p in 0..n {
            for q in (p + 1)..n {
                let element = m[at(n, p, q)];
                let abs_element = element.abs();

                // In later sweeps, flush elements that are negligible
                // relative to both diagonal entries.
                if sweep > 3
                    && abs_element <= SINGULAR_EPSILON * m[at(n, p, p)].abs()
                    && abs_element <= SINGULAR_EPSILON * m[at(n, q, q)].abs()
                {
                    m[at(n, p, q)] = 0.0;
                    continue;
                }
                if element == 0.0 {
                    continue;
                }
                if sweep < 3 && abs_element < threshold {
                    continue;
                }

                // tan(phi) of the rotation that zeroes this element; the
                // cotangent form is unstable near 45 degrees, so fall back
                // to the small-angle ratio there.
                let diff = m[at(n, q, q)] - m[at(n, p, p)];
                let ratio = if abs_element > SINGULAR_EPSILON * diff.abs() {
                    let cot_2phi = 0.5 * diff / element;
                    let r = 1.0 / (cot_2phi.abs() + (1.0 + cot_2phi * cot_2phi).sqrt());
                    if cot_2phi < 0.0 {
                        -r
                    } else {
                        r
                    }
                } else {
                    element / diff
                };

                let cos = 1.0 / (1.0 + ratio * ratio).sqrt();
                let sin = ratio * cos;
                let tan_half = sin / (1.0 + cos);

                let delta = ratio * element;
                m[at(n, q, q)] += delta;
                m[at(n, p, p)] -= delta;
                m[at(n, p, q)] = 0.0;

                // Rotate the remaining pairs, split so only the stored upper
                // triangle is touched.
                for i in 0..p {
                    rotate(m, at(n, i, p), at(n, i, q), sin, tan_half);
                }
                for i in (p + 1)..q {
                    rotate(m, at(n, p, i), at(n, i, q), sin, tan_half);
                }
                for i in (q + 1)..n {
                    rotate(m, at(n, p, i), at(n, q, i), sin, tan_half);
                }
                for i in 0..n {
                    rotate(v, at(n, p, i), at(n, q, i), sin, tan_half);
                }
            }
        }
    }

    // Selection sort of eigenvalues, descending, keeping rows of v paired.
    for i in 0..n.saturating_sub(1) {
        let mut max_val = m[at(n, i, i)];
        let mut k = i;
        for j in (i + 1)..n {
            if m[at(n, j, j)] > max_val {
                max_val = m[at(n, j, j)];
                k = j;
            }
        }
        if k != i {
            m[at(n, k, k)] = m[at(n, i, i)];
            m[at(n, i, i)] = max_val;
            for j in 0..n {
                v.swap(at(n, i, j), at(n, k, j));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eigenvalues(m: &[f32], n: usize) -> Vec<f32> {
        (0..n).map(|i| m[at(n, i, i)]).collect()
    }

    #[test]
    fn gramian_touches_upper_triangle_only() {
        let mut m = [0.0; 9];
        symmetric_add_gramian(&mut m, 3, &[1.0, 2.0, 3.0], 1.0);
        assert_eq!(m[at(3, 0, 1)], 2.0);
        assert_eq!(m[at(3, 1, 2)], 6.0);
        assert_eq!(m[at(3, 1, 0)], 0.0);
        assert_eq!(m[at(3, 2, 2)], 9.0);
    }

    #[test]
    fn jacobi_2x2() {
        // [[2, 1], [1, 2]] has eigenvalues 3 and 1.
        let mut m = [2.0, 1.0, 0.0, 2.0];
        let mut v = [0.0; 4];
        symmetric_jacobi_eigendecomposition(&mut m, &mut v, 2);

        assert!((m[0] - 3.0).abs() < 1e-5);
        assert!((m[3] - 1.0).abs() < 1e-5);

        let inv_sqrt2 = std::f32::consts::FRAC_1_SQRT_2;
        assert!((v[0].abs() - inv_sqrt2).abs() < 1e-5);
        assert!((v[1].abs() - inv_sqrt2).abs() < 1e-5);
        // First eigenvector is (1, 1)/sqrt(2) up to a common sign.
        assert!((v[0] - v[1]).abs() < 1e-5);
        assert!((v[0] * v[2] + v[1] * v[3]).abs() < 1e-5);
    }

    #[test]
    fn jacobi_sorts_descending() {
        let mut m = [0.0; 9];
        m[at(3, 0, 0)] = 2.0;
        m[at(3, 1, 1)] = 5.0;
        m[at(3, 2, 2)] = 3.0;
        let mut v = [0.0; 9];
        symmetric_jacobi_eigendecomposition(&mut m, &mut v, 3);

        let eig = eigenvalues(&m, 3);
        assert_eq!(eig, vec![5.0, 3.0, 2.0]);
        // Rows of v are the matching permutation of the identity.
        assert_eq!(v[at(3, 0, 1)].abs(), 1.0);
        assert_eq!(v[at(3, 1, 2)].abs(), 1.0);
        assert_eq!(v[at(3, 2, 0)].abs(), 1.0);
    }

    #[test]
    fn jacobi_rank_one_gramian() {
        let dir = [1.0f32, 2.0, 3.0];
        let mut m = [0.0; 9];
        symmetric_add_gramian(&mut m, 3, &dir, 1.0);
        let mut v = [0.0; 9];
        symmetric_jacobi_eigendecomposition(&mut m, &mut v, 3);

        let eig = eigenvalues(&m, 3);
        assert!((eig[0] - 14.0).abs() < 1e-4);
        assert!(eig[1].abs() < 1e-4 && eig[2].abs() < 1e-4);

        // Leading eigenvector is dir normalized, up to sign.
        let len = 14.0f32.sqrt();
        let dot: f32 = (0..3).map(|j| v[at(3, 0, j)] * dir[j] / len).sum();
        assert!((dot.abs() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn jacobi_rows_orthonormal_and_reconstruct() {
        const N: usize = 5;
        let samples: [[f32; N]; 7] = [
            [1.0, 0.5, -0.25, 2.0, 0.0],
            [0.0, 1.5, 0.75, -1.0, 0.5],
            [2.0, -0.5, 1.0, 0.25, -1.5],
            [-1.0, 1.0, 0.5, 0.5, 1.0],
            [0.5, 0.25, -2.0, 1.5, 0.75],
            [1.5, -1.0, 0.0, -0.5, 2.0],
            [-0.75, 2.0, 1.25, 0.0, -0.5],
        ];

        let mut m = [0.0; N * N];
        for s in &samples {
            symmetric_add_gramian(&mut m, N, s, 1.0);
        }

        // Keep a fully mirrored copy for the reconstruction check.
        let mut full = [0.0; N * N];
        for r in 0..N {
            for c in 0..N {
                full[at(N, r, c)] = m[at(N, r.min(c), r.max(c))];
            }
        }

        let mut v = [0.0; N * N];
        symmetric_jacobi_eigendecomposition(&mut m, &mut v, N);
        let eig = eigenvalues(&m, N);

        for i in 0..N - 1 {
            assert!(eig[i] >= eig[i + 1]);
        }

        for i in 0..N {
            for j in 0..N {
                let dot: f32 = (0..N).map(|k| v[at(N, i, k)] * v[at(N, j, k)]).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (dot - expected).abs() < 1e-4,
                    "rows {i} and {j} not orthonormal: {dot}"
                );
            }
        }

        // Sum of eigenvalue-weighted outer products recovers the Gramian.
        for r in 0..N {
            for c in 0..N {
                let sum: f32 = (0..N)
                    .map(|k| eig[k] * v[at(N, k, r)] * v[at(N, k, c)])
                    .sum();
                let reference = full[at(N, r, c)];
                assert!(
                    (sum - reference).abs() < 1e-3 * reference.abs().max(1.0),
                    "reconstruction mismatch at ({r}, {c}): {sum} vs {reference}"
                );
            }
        }
    }
}
