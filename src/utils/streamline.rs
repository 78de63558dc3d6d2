//! Field-line tracing for stream plots.
//!
//! Stream lines are integrated through a gridded 2D velocity field with a
//! fixed-step midpoint (RK2) scheme. The field is sampled bilinearly between
//! grid nodes; tracing stops when the line leaves the grid, enters a
//! non-finite or vanishing velocity region, or reaches the step limit.

use log::warn;
use nalgebra::{DMatrix, DVector};

use crate::utils::griddata::typical_spacing;

/// Maximum number of integration steps per stream line.
const MAX_STEPS: usize = 10_000;
/// Step length as a fraction of the typical grid spacing.
const STEP_FRACTION: f64 = 0.2;
/// Velocities with a magnitude below this value terminate the trace.
const STAGNATION_SPEED: f64 = 1e-12;

/// Bilinear interpolation of a gridded scalar field at `(x, y)`.
///
/// The field is in canonical orientation (rows index y, columns index x) and
/// the axes must be monotonically increasing. Returns `None` outside the grid.
#[must_use]
pub fn sample_bilinear(
    x_ax: &DVector<f64>,
    y_ax: &DVector<f64>,
    field: &DMatrix<f64>,
    x: f64,
    y: f64,
) -> Option<f64> {
    let ix = cell_index(x_ax, x)?;
    let iy = cell_index(y_ax, y)?;
    let tx = fraction(x_ax[ix], x_ax[ix + 1], x);
    let ty = fraction(y_ax[iy], y_ax[iy + 1], y);
    let bottom = field[(iy, ix)] * (1.0 - tx) + field[(iy, ix + 1)] * tx;
    let top = field[(iy + 1, ix)] * (1.0 - tx) + field[(iy + 1, ix + 1)] * tx;
    let value = bottom * (1.0 - ty) + top * ty;
    value.is_finite().then_some(value)
}

fn cell_index(ax: &DVector<f64>, value: f64) -> Option<usize> {
    if ax.len() < 2 || value < ax[0] || value > ax[ax.len() - 1] {
        return None;
    }
    // linear scan; grid axes are short compared to the trace length
    for i in 0..ax.len() - 1 {
        if value <= ax[i + 1] {
            return Some(i);
        }
    }
    None
}

fn fraction(lo: f64, hi: f64, value: f64) -> f64 {
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        0.0
    } else {
        ((value - lo) / span).clamp(0.0, 1.0)
    }
}

fn velocity_at(
    x_ax: &DVector<f64>,
    y_ax: &DVector<f64>,
    u: &DMatrix<f64>,
    v: &DMatrix<f64>,
    x: f64,
    y: f64,
) -> Option<(f64, f64)> {
    let vx = sample_bilinear(x_ax, y_ax, u, x, y)?;
    let vy = sample_bilinear(x_ax, y_ax, v, x, y)?;
    Some((vx, vy))
}

/// Trace a single stream line seeded at `(x0, y0)`, following the field
/// downstream. Returns the polyline in data coordinates; a seed outside the
/// grid or inside a stagnant region yields an empty polyline.
#[must_use]
pub fn trace_streamline(
    x_ax: &DVector<f64>,
    y_ax: &DVector<f64>,
    u: &DMatrix<f64>,
    v: &DMatrix<f64>,
    x0: f64,
    y0: f64,
) -> Vec<(f64, f64)> {
    if u.shape() != (y_ax.len(), x_ax.len()) || v.shape() != u.shape() {
        warn!("Shapes of x, y, u and v do not match!");
        return Vec::new();
    }
    let step = STEP_FRACTION * typical_spacing(x_ax).min(typical_spacing(y_ax));
    let mut line = Vec::new();
    let (mut x, mut y) = (x0, y0);
    for _ in 0..MAX_STEPS {
        let Some((vx, vy)) = velocity_at(x_ax, y_ax, u, v, x, y) else {
            break;
        };
        let speed = vx.hypot(vy);
        if speed < STAGNATION_SPEED {
            break;
        }
        line.push((x, y));
        // midpoint scheme on the normalized field
        let (mx, my) = (x + 0.5 * step * vx / speed, y + 0.5 * step * vy / speed);
        let Some((mvx, mvy)) = velocity_at(x_ax, y_ax, u, v, mx, my) else {
            break;
        };
        let mspeed = mvx.hypot(mvy);
        if mspeed < STAGNATION_SPEED {
            break;
        }
        x += step * mvx / mspeed;
        y += step * mvy / mspeed;
    }
    line
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn uniform_field() -> (DVector<f64>, DVector<f64>, DMatrix<f64>, DMatrix<f64>) {
        let ax = DVector::from_iterator(11, (0..11).map(f64::from));
        let u = DMatrix::from_element(11, 11, 1.0);
        let v = DMatrix::from_element(11, 11, 0.0);
        (ax.clone(), ax, u, v)
    }

    #[test]
    fn bilinear_reproduces_nodes_and_centers() {
        let ax = DVector::from_vec(vec![0.0, 1.0, 2.0]);
        let field = DMatrix::from_row_slice(3, 3, &[0., 1., 2., 1., 2., 3., 2., 3., 4.]);
        assert_relative_eq!(sample_bilinear(&ax, &ax, &field, 1.0, 1.0).unwrap(), 2.0);
        assert_relative_eq!(sample_bilinear(&ax, &ax, &field, 0.5, 0.5).unwrap(), 1.0);
        assert!(sample_bilinear(&ax, &ax, &field, -0.1, 0.0).is_none());
        assert!(sample_bilinear(&ax, &ax, &field, 0.0, 2.1).is_none());
    }
    #[test]
    fn uniform_flow_traces_straight_line() {
        let (x_ax, y_ax, u, v) = uniform_field();
        let line = trace_streamline(&x_ax, &y_ax, &u, &v, 0.0, 5.0);
        assert!(line.len() > 10);
        for (_, y) in &line {
            assert_relative_eq!(*y, 5.0);
        }
        let last = line.last().unwrap();
        assert!(last.0 > 9.0);
    }
    #[test]
    fn seed_outside_grid_is_empty() {
        let (x_ax, y_ax, u, v) = uniform_field();
        assert!(trace_streamline(&x_ax, &y_ax, &u, &v, -1.0, 5.0).is_empty());
    }
    #[test]
    fn stagnant_field_is_empty() {
        let ax = DVector::from_vec(vec![0.0, 1.0]);
        let zero = DMatrix::from_element(2, 2, 0.0);
        assert!(trace_streamline(&ax, &ax, &zero, &zero, 0.5, 0.5).is_empty());
    }
    #[test]
    fn shape_mismatch_warns() {
        testing_logger::setup();
        let (x_ax, y_ax, u, _) = uniform_field();
        let v_bad = DMatrix::from_element(2, 2, 0.0);
        assert!(trace_streamline(&x_ax, &y_ax, &u, &v_bad, 0.0, 5.0).is_empty());
        crate::utils::test_helper::test_helper::check_warnings(vec![
            "Shapes of x, y, u and v do not match!",
        ]);
    }
}
