//! Grid construction helpers shared by the field-plot commands.

#![warn(missing_docs)]
use crate::error::{UniResult, UniplotError};
use kahan::KahanSum;
use log::warn;
use nalgebra::{DMatrix, DVector, Scalar};
use num::{Float, NumCast};

/// A linearly spaced vector of `num` entries from `start` to `end`, with
/// Kahan-compensated stepping so the endpoints come out exact.
///
/// # Errors
/// [`UniplotError::BadValue`] for non-finite endpoints,
/// [`UniplotError::Other`] when a step index does not fit the float type.
pub fn linspace<T: Float + Scalar>(start: T, end: T, num: usize) -> UniResult<DVector<T>> {
    if !start.is_finite() || !end.is_finite() {
        return Err(UniplotError::BadValue(
            "linspace endpoints must be finite".into(),
        ));
    }

    let mut spaced = DVector::<T>::from_element(num, start);
    if num < 2 {
        warn!("linspace with num < 2 yields an empty vector or the start value alone");
        return Ok(spaced);
    }

    let cast_step = |step: usize| {
        <T as NumCast>::from(step)
            .ok_or_else(|| UniplotError::Other(format!("step {step} does not fit the float type")))
    };
    let bin_size = (end - start) / cast_step(num - 1)?;
    for (step, val) in spaced.iter_mut().enumerate() {
        let mut sum = KahanSum::new_with_value(*val);
        sum += cast_step(step)? * bin_size;
        *val = sum.sum();
    }
    Ok(spaced)
}

/// Expand two grid vectors into full 2D coordinate matrices in "ndgrid"
/// orientation: `xx[(i, j)] = x[i]`, `yy[(i, j)] = y[j]`, both of shape
/// `(x.len(), y.len())`.
#[must_use]
pub fn ndgrid(x: &DVector<f64>, y: &DVector<f64>) -> (DMatrix<f64>, DMatrix<f64>) {
    let xx = DMatrix::from_fn(x.len(), y.len(), |i, _| x[i]);
    let yy = DMatrix::from_fn(x.len(), y.len(), |_, j| y[j]);
    (xx, yy)
}

/// Expand two grid vectors into full 2D coordinate matrices in "meshgrid"
/// orientation: `xx[(i, j)] = x[j]`, `yy[(i, j)] = y[i]`, both of shape
/// `(y.len(), x.len())`.
#[must_use]
pub fn meshgrid(x: &DVector<f64>, y: &DVector<f64>) -> (DMatrix<f64>, DMatrix<f64>) {
    let xx = DMatrix::from_fn(y.len(), x.len(), |_, j| x[j]);
    let yy = DMatrix::from_fn(y.len(), x.len(), |i, _| y[i]);
    (xx, yy)
}

/// Minimum and maximum of a value sequence, skipping non-finite entries.
/// Returns `None` if no finite entry exists.
pub fn min_max_filter_nonfinite<'a, I: IntoIterator<Item = &'a f64>>(
    values: I,
) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in values {
        if value.is_finite() {
            min = min.min(*value);
            max = max.max(*value);
        }
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

/// Typical spacing of a grid vector (median of adjacent differences). Falls
/// back to 1.0 for vectors with fewer than two entries.
#[must_use]
pub fn typical_spacing(ax: &DVector<f64>) -> f64 {
    if ax.len() < 2 {
        return 1.0;
    }
    let mut diffs: Vec<f64> = ax
        .iter()
        .zip(ax.iter().skip(1))
        .map(|(a, b)| (b - a).abs())
        .collect();
    diffs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    diffs[diffs.len() / 2]
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::test_helper::test_helper::check_warnings;
    use approx::assert_relative_eq;
    #[test]
    fn linspace_endpoints() {
        let v = linspace(-2.0, 2.0, 41).unwrap();
        assert_eq!(v.len(), 41);
        assert_relative_eq!(v[0], -2.0);
        assert_relative_eq!(v[40], 2.0);
        assert_relative_eq!(v[20], 0.0);
    }
    #[test]
    fn linspace_nonfinite() {
        assert!(linspace(f64::NAN, 1.0, 5).is_err());
        assert!(linspace(0.0, f64::INFINITY, 5).is_err());
    }
    #[test]
    fn linspace_degenerate_warns() {
        testing_logger::setup();
        let v = linspace(1.0, 2.0, 1).unwrap();
        assert_eq!(v.len(), 1);
        assert_relative_eq!(v[0], 1.0);
        check_warnings(vec![
            "linspace with num < 2 yields an empty vector or the start value alone",
        ]);
    }
    #[test]
    fn ndgrid_orientation() {
        let x = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let y = DVector::from_vec(vec![10.0, 20.0]);
        let (xx, yy) = ndgrid(&x, &y);
        assert_eq!(xx.shape(), (3, 2));
        assert_relative_eq!(xx[(2, 0)], 3.0);
        assert_relative_eq!(xx[(2, 1)], 3.0);
        assert_relative_eq!(yy[(0, 1)], 20.0);
        assert_relative_eq!(yy[(2, 1)], 20.0);
    }
    #[test]
    fn meshgrid_is_ndgrid_transposed() {
        let x = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let y = DVector::from_vec(vec![10.0, 20.0]);
        let (xx_n, yy_n) = ndgrid(&x, &y);
        let (xx_m, yy_m) = meshgrid(&x, &y);
        assert_eq!(xx_m, xx_n.transpose());
        assert_eq!(yy_m, yy_n.transpose());
    }
    #[test]
    fn min_max_skips_nonfinite() {
        let values = [1.0, f64::NAN, -3.0, f64::INFINITY, 2.0];
        assert_eq!(min_max_filter_nonfinite(values.iter()), Some((-3.0, 2.0)));
        let empty = [f64::NAN];
        assert_eq!(min_max_filter_nonfinite(empty.iter()), None);
    }
    #[test]
    fn spacing_of_uniform_grid() {
        let ax = DVector::from_vec(vec![0.0, 0.5, 1.0, 1.5]);
        assert_relative_eq!(typical_spacing(&ax), 0.5);
        assert_relative_eq!(typical_spacing(&DVector::from_vec(vec![1.0])), 1.0);
    }
}
