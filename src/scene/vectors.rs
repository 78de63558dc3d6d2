#![warn(missing_docs)]
//! The vector-field (quiver) plot item.

use nalgebra::DMatrix;

use crate::error::{UniResult, UniplotError};
use crate::scene::item::{to_canonical, GridAxes, ItemStyle, MemoryOrder};
use crate::utils::griddata::typical_spacing;

/// A vector-field arrow plot: one arrow per grid node.
///
/// `arrowscale` is a multiplicative factor on the autoscaled arrow length;
/// zero disables autoscaling entirely and the components are rendered in raw
/// data units. Autoscaling is applied in-place at construction time so every
/// backend sees the same component values; `autoscaled` records whether that
/// happened.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityVectors {
    /// grid coordinates
    pub grid: GridAxes,
    /// x components, canonical orientation (rows = y)
    pub u: DMatrix<f64>,
    /// y components
    pub v: DMatrix<f64>,
    /// z components of a 3D field
    pub w: Option<DMatrix<f64>>,
    /// arrow length factor; 0 disables autoscaling
    pub arrowscale: f64,
    /// draw filled arrow heads
    pub filledarrows: bool,
    /// true if `scale_vectors` has been applied
    pub autoscaled: bool,
    /// styling attributes
    pub style: ItemStyle,
}

impl VelocityVectors {
    /// Create a 2D vector field from components in the given memory order.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if the component shapes differ or do not
    /// match the grid.
    pub fn new(
        grid: GridAxes,
        u: DMatrix<f64>,
        v: DMatrix<f64>,
        order: MemoryOrder,
    ) -> UniResult<Self> {
        let u = to_canonical(u, order);
        let v = to_canonical(v, order);
        if u.shape() != v.shape() {
            return Err(UniplotError::BadValue(format!(
                "u and v must have the same shape, got {:?} and {:?}",
                u.shape(),
                v.shape()
            )));
        }
        grid.validate(u.shape())?;
        Ok(Self {
            grid,
            u,
            v,
            w: None,
            arrowscale: 1.0,
            filledarrows: false,
            autoscaled: false,
            style: ItemStyle::default(),
        })
    }

    /// Attach the z components of a 3D field.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] on shape mismatch.
    pub fn set_w(&mut self, w: DMatrix<f64>, order: MemoryOrder) -> UniResult<()> {
        let w = to_canonical(w, order);
        if w.shape() != self.u.shape() {
            return Err(UniplotError::BadValue(format!(
                "w shape {:?} does not match u shape {:?}",
                w.shape(),
                self.u.shape()
            )));
        }
        self.w = Some(w);
        Ok(())
    }

    /// Rescale the components in-place so the longest arrow is comparable to
    /// the grid spacing, scaled by `arrowscale`. With `arrowscale == 0`, or on
    /// an all-zero field, the components are left untouched. Idempotent: a
    /// second call is a no-op.
    pub fn scale_vectors(&mut self) {
        if self.autoscaled || self.arrowscale == 0.0 {
            return;
        }
        let max_len = self
            .u
            .iter()
            .zip(self.v.iter())
            .map(|(u, v)| u.hypot(*v))
            .filter(|l| l.is_finite())
            .fold(0.0_f64, f64::max);
        if max_len <= 0.0 {
            return;
        }
        let (x_ax, y_ax) = self.grid.axis_vectors();
        let spacing = typical_spacing(&x_ax).min(typical_spacing(&y_ax));
        let factor = self.arrowscale * spacing / max_len;
        self.u *= factor;
        self.v *= factor;
        if let Some(w) = &mut self.w {
            *w *= factor;
        }
        self.autoscaled = true;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;
    use nalgebra::DVector;

    fn sample() -> VelocityVectors {
        let grid = GridAxes::Vectors {
            x: DVector::from_vec(vec![0., 1., 2.]),
            y: DVector::from_vec(vec![0., 1., 2.]),
        };
        let u = DMatrix::from_element(3, 3, 4.0);
        let v = DMatrix::from_element(3, 3, 0.0);
        VelocityVectors::new(grid, u, v, MemoryOrder::Yxz).unwrap()
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let grid = GridAxes::Vectors {
            x: DVector::from_vec(vec![0., 1., 2.]),
            y: DVector::from_vec(vec![0., 1., 2.]),
        };
        assert_matches!(
            VelocityVectors::new(
                grid,
                DMatrix::from_element(3, 3, 1.0),
                DMatrix::from_element(2, 3, 1.0),
                MemoryOrder::Yxz
            ),
            Err(UniplotError::BadValue(_))
        );
    }
    #[test]
    fn autoscale_keeps_arrows_near_grid_spacing() {
        let mut vectors = sample();
        vectors.scale_vectors();
        assert!(vectors.autoscaled);
        // longest arrow == arrowscale * spacing
        assert_relative_eq!(vectors.u[(0, 0)], 1.0);
        assert_relative_eq!(vectors.v[(0, 0)], 0.0);
        // idempotent
        let before = vectors.clone();
        vectors.scale_vectors();
        assert_eq!(vectors, before);
    }
    #[test]
    fn arrowscale_zero_is_raw_pass_through() {
        let mut vectors = sample();
        vectors.arrowscale = 0.0;
        vectors.scale_vectors();
        assert!(!vectors.autoscaled);
        assert_relative_eq!(vectors.u[(0, 0)], 4.0);
    }
    #[test]
    fn zero_field_is_left_untouched() {
        let grid = GridAxes::Vectors {
            x: DVector::from_vec(vec![0., 1.]),
            y: DVector::from_vec(vec![0., 1.]),
        };
        let zero = DMatrix::from_element(2, 2, 0.0);
        let mut vectors =
            VelocityVectors::new(grid, zero.clone(), zero, MemoryOrder::Yxz).unwrap();
        vectors.scale_vectors();
        assert!(!vectors.autoscaled);
    }
}
