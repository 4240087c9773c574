use glam::IVec2;

/// Legs of the square spiral walked over Hilbert blocks, turning inward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpiralDirection {
    Up,
    Left,
    Down,
    Right,
}

/// Position of index `d` on a Hilbert curve over an `n` x `n` grid
/// (`n` must be a power of two).
pub fn hilbert_index_to_pos(n: i32, mut d: i32) -> IVec2 {
    let mut xy = IVec2::ZERO;
    let mut s = 1;
    while s < n {
        let rx = (d >> 1) & 1;
        let ry = (d ^ rx) & 1;
        if ry == 0 {
            if rx == 1 {
                xy = IVec2::splat(s - 1) - xy;
            }
            std::mem::swap(&mut xy.x, &mut xy.y);
        }
        xy += IVec2::new(rx * s, ry * s);
        d >>= 2;
        s *= 2;
    }
    xy
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn hilbert_is_a_bijection() {
        for n in [2, 4, 8, 16] {
            let mut seen = HashSet::new();
            for d in 0..n * n {
                let pos = hilbert_index_to_pos(n, d);
                assert!(pos.x >= 0 && pos.x < n && pos.y >= 0 && pos.y < n);
                assert!(seen.insert((pos.x, pos.y)), "duplicate position {pos:?}");
            }
            assert_eq!(seen.len(), (n * n) as usize);
        }
    }

    #[test]
    fn hilbert_steps_are_adjacent() {
        let n = 8;
        let mut prev = hilbert_index_to_pos(n, 0);
        for d in 1..n * n {
            let pos = hilbert_index_to_pos(n, d);
            let step = (pos - prev).abs();
            assert_eq!(step.x + step.y, 1, "non-adjacent step at index {d}");
            prev = pos;
        }
    }

    #[test]
    fn hilbert_first_quadrant_order() {
        // The standard curve on a 2x2 grid visits (0,0), (0,1), (1,1), (1,0).
        let expected = [(0, 0), (0, 1), (1, 1), (1, 0)];
        for (d, &(x, y)) in expected.iter().enumerate() {
            assert_eq!(hilbert_index_to_pos(2, d as i32), IVec2::new(x, y));
        }
    }
}
