//! Isoline extraction for contour plots.
//!
//! A marching-squares pass over the gridded field produces one set of line
//! segments per contour level; linear interpolation places the crossings on
//! the cell edges. Fields are expected in canonical orientation (rows index
//! y, columns index x).

use log::warn;
use nalgebra::{DMatrix, DVector};

/// One isoline segment in data coordinates.
pub type Segment = ((f64, f64), (f64, f64));

/// Automatically chosen contour levels: `n` values strictly inside
/// `(zmin, zmax)`, evenly spaced. Degenerate ranges yield no levels.
#[must_use]
pub fn auto_levels(zmin: f64, zmax: f64, n: usize) -> Vec<f64> {
    if n == 0 || !zmin.is_finite() || !zmax.is_finite() || zmax <= zmin {
        warn!("cannot choose contour levels for degenerate range [{zmin}, {zmax}]");
        return Vec::new();
    }
    #[allow(clippy::cast_precision_loss)]
    let step = (zmax - zmin) / (n + 1) as f64;
    #[allow(clippy::cast_precision_loss)]
    (1..=n).map(|i| zmin + i as f64 * step).collect()
}

fn interpolate(p1: (f64, f64), v1: f64, p2: (f64, f64), v2: f64, level: f64) -> (f64, f64) {
    let denom = v2 - v1;
    let t = if denom.abs() < f64::EPSILON {
        0.5
    } else {
        ((level - v1) / denom).clamp(0.0, 1.0)
    };
    (p1.0 + t * (p2.0 - p1.0), p1.1 + t * (p2.1 - p1.1))
}

/// Extract the isoline segments of `z` at a single contour value.
///
/// `x_ax` has one entry per column of `z`, `y_ax` one entry per row. Cells
/// touching non-finite samples are skipped.
#[must_use]
pub fn contour_segments(
    x_ax: &DVector<f64>,
    y_ax: &DVector<f64>,
    z: &DMatrix<f64>,
    level: f64,
) -> Vec<Segment> {
    let (rows, cols) = z.shape();
    if rows != y_ax.len() || cols != x_ax.len() {
        warn!("Shapes of x, y and z do not match!");
        return Vec::new();
    }
    let mut segments = Vec::new();
    for iy in 0..rows.saturating_sub(1) {
        for ix in 0..cols.saturating_sub(1) {
            // cell corners, counter-clockwise from bottom-left
            let corners = [
                ((x_ax[ix], y_ax[iy]), z[(iy, ix)]),
                ((x_ax[ix + 1], y_ax[iy]), z[(iy, ix + 1)]),
                ((x_ax[ix + 1], y_ax[iy + 1]), z[(iy + 1, ix + 1)]),
                ((x_ax[ix], y_ax[iy + 1]), z[(iy + 1, ix)]),
            ];
            if corners.iter().any(|(_, v)| !v.is_finite()) {
                continue;
            }
            let mut crossings = Vec::with_capacity(2);
            for edge in 0..4 {
                let (p1, v1) = corners[edge];
                let (p2, v2) = corners[(edge + 1) % 4];
                if (v1 < level) != (v2 < level) {
                    crossings.push(interpolate(p1, v1, p2, v2, level));
                }
            }
            // 0, 2 or 4 crossings per cell; saddles are split arbitrarily
            for pair in crossings.chunks_exact(2) {
                segments.push((pair[0], pair[1]));
            }
        }
    }
    segments
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp_field() -> (DVector<f64>, DVector<f64>, DMatrix<f64>) {
        // z = x over [0, 4] on a 5x5 grid
        let ax = DVector::from_iterator(5, (0..5).map(f64::from));
        let z = DMatrix::from_fn(5, 5, |_, ix| f64::from(u32::try_from(ix).unwrap()));
        (ax.clone(), ax, z)
    }

    #[test]
    fn auto_levels_stay_inside_range() {
        let levels = auto_levels(0.0, 1.0, 8);
        assert_eq!(levels.len(), 8);
        assert!(levels.iter().all(|l| *l > 0.0 && *l < 1.0));
        assert_relative_eq!(levels[3] - levels[2], levels[1] - levels[0]);
    }
    #[test]
    fn auto_levels_degenerate_range() {
        testing_logger::setup();
        assert!(auto_levels(1.0, 1.0, 8).is_empty());
        assert!(auto_levels(f64::NAN, 1.0, 8).is_empty());
    }
    #[test]
    fn ramp_isoline_is_vertical() {
        let (x, y, z) = ramp_field();
        let segments = contour_segments(&x, &y, &z, 1.5);
        // one segment per cell row
        assert_eq!(segments.len(), 4);
        for ((x1, _), (x2, _)) in segments {
            assert_relative_eq!(x1, 1.5);
            assert_relative_eq!(x2, 1.5);
        }
    }
    #[test]
    fn level_outside_range_gives_no_segments() {
        let (x, y, z) = ramp_field();
        assert!(contour_segments(&x, &y, &z, 99.0).is_empty());
    }
    #[test]
    fn shape_mismatch_warns() {
        testing_logger::setup();
        let (x, y, z) = ramp_field();
        let short_y = DVector::from_vec(vec![0.0, 1.0]);
        assert!(contour_segments(&x, &short_y, &z, 1.5).is_empty());
        crate::utils::test_helper::test_helper::check_warnings(vec![
            "Shapes of x, y and z do not match!",
        ]);
        let _ = (y, x);
    }
    #[test]
    fn nonfinite_cells_are_skipped() {
        let (x, y, mut z) = ramp_field();
        z[(0, 1)] = f64::NAN;
        let segments = contour_segments(&x, &y, &z, 1.5);
        assert_eq!(segments.len(), 3);
    }
}
