#![warn(missing_docs)]
//! The isocontour plot item.

use nalgebra::DMatrix;
use strum::{Display, EnumString};

use crate::error::{UniResult, UniplotError};
use crate::scene::item::{to_canonical, GridAxes, ItemStyle, MemoryOrder};
use crate::utils::contour::auto_levels;
use crate::utils::griddata::min_max_filter_nonfinite;

/// Where the contour lines are drawn in a 3D scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ContourLocation {
    /// lines follow the field surface (`contour3`)
    Surface,
    /// lines are projected onto the base plane
    #[default]
    Base,
}

/// A set of isocontours of a 2D scalar field.
///
/// Without an explicit `cvector`, level values are chosen automatically with
/// `clevels` as the requested count. A `cvector` overrides `clevels` and is
/// kept sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct Contours {
    /// grid coordinates
    pub grid: GridAxes,
    /// field values, canonical orientation (rows = y)
    pub z: DMatrix<f64>,
    clevels: usize,
    cvector: Option<Vec<f64>>,
    /// label the contour lines with their values
    pub clabels: bool,
    /// placement of the lines in 3D
    pub location: ContourLocation,
    /// fill the regions between the lines
    pub filled: bool,
    /// styling attributes
    pub style: ItemStyle,
}

impl Contours {
    /// Create a contour set from a field in the given memory order.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if the grid does not match the field shape.
    pub fn new(grid: GridAxes, z: DMatrix<f64>, order: MemoryOrder) -> UniResult<Self> {
        let z = to_canonical(z, order);
        grid.validate(z.shape())?;
        Ok(Self {
            grid,
            z,
            clevels: 8,
            cvector: None,
            clabels: false,
            location: ContourLocation::default(),
            filled: false,
            style: ItemStyle::default(),
        })
    }

    /// Requested number of automatic levels (default 8).
    #[must_use]
    pub const fn clevels(&self) -> usize {
        self.clevels
    }

    /// Set the number of automatic levels.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if `clevels` is zero.
    pub fn set_clevels(&mut self, clevels: usize) -> UniResult<()> {
        if clevels == 0 {
            return Err(UniplotError::BadValue(
                "clevels must be a positive integer".into(),
            ));
        }
        self.clevels = clevels;
        Ok(())
    }

    /// Explicit level values, if any.
    #[must_use]
    pub fn cvector(&self) -> Option<&[f64]> {
        self.cvector.as_deref()
    }

    /// Set explicit level values; overrides `clevels`. The values are stored
    /// in sorted order.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if the vector is empty or contains
    /// non-finite values.
    pub fn set_cvector(&mut self, mut cvector: Vec<f64>) -> UniResult<()> {
        if cvector.is_empty() || cvector.iter().any(|v| !v.is_finite()) {
            return Err(UniplotError::BadValue(
                "cvector must be a non-empty list of finite values".into(),
            ));
        }
        cvector.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        self.cvector = Some(cvector);
        Ok(())
    }

    /// The level values this item renders at: the explicit `cvector`, or up to
    /// `clevels` automatically chosen values inside the field range.
    #[must_use]
    pub fn levels(&self) -> Vec<f64> {
        if let Some(cvector) = &self.cvector {
            return cvector.clone();
        }
        let Some((zmin, zmax)) = min_max_filter_nonfinite(self.z.iter()) else {
            return Vec::new();
        };
        auto_levels(zmin, zmax, self.clevels)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    use nalgebra::DVector;

    fn sample() -> Contours {
        let grid = GridAxes::Vectors {
            x: DVector::from_vec(vec![0., 1., 2.]),
            y: DVector::from_vec(vec![0., 1.]),
        };
        let z = DMatrix::from_row_slice(3, 2, &[0., 1., 2., 3., 4., 5.]);
        Contours::new(grid, z, MemoryOrder::Xyz).unwrap()
    }

    #[test]
    fn construction_validates_grid_after_transpose() {
        let contours = sample();
        assert_eq!(contours.z.shape(), (2, 3));
        let grid = GridAxes::Vectors {
            x: DVector::from_vec(vec![0., 1.]),
            y: DVector::from_vec(vec![0., 1.]),
        };
        let z = DMatrix::from_element(3, 2, 0.0);
        assert_matches!(
            Contours::new(grid, z, MemoryOrder::Xyz),
            Err(UniplotError::BadValue(_))
        );
    }
    #[test]
    fn clevels_default_and_bounds() {
        let mut contours = sample();
        assert_eq!(contours.clevels(), 8);
        assert_matches!(contours.set_clevels(0), Err(UniplotError::BadValue(_)));
        contours.set_clevels(3).unwrap();
        assert_eq!(contours.levels().len(), 3);
    }
    #[test]
    fn cvector_overrides_clevels_and_is_sorted() {
        let mut contours = sample();
        contours.set_cvector(vec![0.5, -0.2, 0.2, -0.5]).unwrap();
        assert_eq!(contours.levels(), vec![-0.5, -0.2, 0.2, 0.5]);
        assert_matches!(
            contours.set_cvector(vec![]),
            Err(UniplotError::BadValue(_))
        );
        assert_matches!(
            contours.set_cvector(vec![f64::NAN]),
            Err(UniplotError::BadValue(_))
        );
    }
    #[test]
    fn auto_levels_stay_inside_field_range() {
        let contours = sample();
        let levels = contours.levels();
        assert!(!levels.is_empty());
        assert!(levels.iter().all(|l| *l > 0.0 && *l < 5.0));
    }
}
