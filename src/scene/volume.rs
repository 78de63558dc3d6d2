#![warn(missing_docs)]
//! The volume plot item: isosurfaces, slice planes and contour slices of a 3D
//! scalar field.

use nalgebra::DVector;

use crate::error::{UniResult, UniplotError};
use crate::scene::item::ItemStyle;

/// A 3D scalar field on a rectilinear grid, stored flat with explicit
/// dimensions `(nx, ny, nz)` and x-fastest ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeField {
    /// x axis values, one per field column
    pub x: DVector<f64>,
    /// y axis values
    pub y: DVector<f64>,
    /// z axis values
    pub z: DVector<f64>,
    values: Vec<f64>,
}

impl VolumeField {
    /// Create a field from its axis vectors and flat sample values.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if the value count does not equal
    /// `x.len() * y.len() * z.len()` or any axis is empty.
    pub fn new(
        x: DVector<f64>,
        y: DVector<f64>,
        z: DVector<f64>,
        values: Vec<f64>,
    ) -> UniResult<Self> {
        if x.is_empty() || y.is_empty() || z.is_empty() {
            return Err(UniplotError::BadValue(
                "volume axes must be non-empty".into(),
            ));
        }
        if values.len() != x.len() * y.len() * z.len() {
            return Err(UniplotError::BadValue(format!(
                "volume data of length {} does not match grid {}x{}x{}",
                values.len(),
                x.len(),
                y.len(),
                z.len()
            )));
        }
        Ok(Self { x, y, z, values })
    }

    /// Grid dimensions `(nx, ny, nz)`.
    #[must_use]
    pub fn dims(&self) -> (usize, usize, usize) {
        (self.x.len(), self.y.len(), self.z.len())
    }

    /// Sample value at grid node `(ix, iy, iz)`.
    #[must_use]
    pub fn value(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        self.values[ix + self.x.len() * (iy + self.y.len() * iz)]
    }

    /// All sample values in storage order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Extract the slice plane `z = z[iz]` as per-row vectors of y.
    #[must_use]
    pub fn z_plane(&self, iz: usize) -> Vec<Vec<f64>> {
        (0..self.y.len())
            .map(|iy| (0..self.x.len()).map(|ix| self.value(ix, iy, iz)).collect())
            .collect()
    }
}

/// Function-specific volume parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeMode {
    /// surface of constant scalar value
    Isosurface {
        /// the value the surface follows
        isovalue: f64,
    },
    /// axis-aligned pseudocolor slice planes
    Slices {
        /// x coordinates of y-z planes
        sx: Vec<f64>,
        /// y coordinates of x-z planes
        sy: Vec<f64>,
        /// z coordinates of x-y planes
        sz: Vec<f64>,
    },
    /// contour lines drawn in axis-aligned slice planes
    ContourSlices {
        /// x coordinates of y-z planes
        sx: Vec<f64>,
        /// y coordinates of x-z planes
        sy: Vec<f64>,
        /// z coordinates of x-y planes
        sz: Vec<f64>,
        /// number of automatic contour levels per plane
        clevels: usize,
        /// explicit contour values, overriding `clevels`
        cvector: Option<Vec<f64>>,
    },
}

/// A volume rendering of a 3D scalar field.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// the scalar field
    pub field: VolumeField,
    /// pseudocolor data of the field's sample count
    pub cdata: Option<Vec<f64>>,
    /// rendering mode
    pub mode: VolumeMode,
    /// styling attributes
    pub style: ItemStyle,
}

impl Volume {
    /// Create a volume item.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for a non-finite isovalue, an empty slice
    /// set, or a zero contour-level count.
    pub fn new(field: VolumeField, mode: VolumeMode) -> UniResult<Self> {
        match &mode {
            VolumeMode::Isosurface { isovalue } => {
                if !isovalue.is_finite() {
                    return Err(UniplotError::BadValue(format!(
                        "isovalue must be finite, got {isovalue}"
                    )));
                }
            }
            VolumeMode::Slices { sx, sy, sz } => {
                if sx.is_empty() && sy.is_empty() && sz.is_empty() {
                    return Err(UniplotError::BadValue(
                        "slice plot needs at least one slice coordinate".into(),
                    ));
                }
            }
            VolumeMode::ContourSlices {
                sx,
                sy,
                sz,
                clevels,
                cvector,
            } => {
                if sx.is_empty() && sy.is_empty() && sz.is_empty() {
                    return Err(UniplotError::BadValue(
                        "contour slices need at least one slice coordinate".into(),
                    ));
                }
                if *clevels == 0 && cvector.is_none() {
                    return Err(UniplotError::BadValue(
                        "clevels must be a positive integer".into(),
                    ));
                }
            }
        }
        Ok(Self {
            field,
            cdata: None,
            mode,
            style: ItemStyle::default(),
        })
    }

    /// Attach pseudocolor data of the field's sample count.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] on length mismatch.
    pub fn set_cdata(&mut self, cdata: Vec<f64>) -> UniResult<()> {
        if cdata.len() != self.field.values().len() {
            return Err(UniplotError::BadValue(format!(
                "cdata of length {} does not match field sample count {}",
                cdata.len(),
                self.field.values().len()
            )));
        }
        self.cdata = Some(cdata);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;

    fn sample_field() -> VolumeField {
        let ax = DVector::from_vec(vec![0.0, 1.0]);
        let values: Vec<f64> = (0..8).map(f64::from).collect();
        VolumeField::new(ax.clone(), ax.clone(), ax, values).unwrap()
    }

    #[test]
    fn field_indexing_is_x_fastest() {
        let field = sample_field();
        assert_eq!(field.dims(), (2, 2, 2));
        assert_eq!(field.value(1, 0, 0), 1.0);
        assert_eq!(field.value(0, 1, 0), 2.0);
        assert_eq!(field.value(0, 0, 1), 4.0);
        let plane = field.z_plane(1);
        assert_eq!(plane, vec![vec![4.0, 5.0], vec![6.0, 7.0]]);
    }
    #[test]
    fn field_length_is_checked() {
        let ax = DVector::from_vec(vec![0.0, 1.0]);
        assert_matches!(
            VolumeField::new(ax.clone(), ax.clone(), ax, vec![0.0; 7]),
            Err(UniplotError::BadValue(_))
        );
    }
    #[test]
    fn mode_parameters_are_validated() {
        assert_matches!(
            Volume::new(
                sample_field(),
                VolumeMode::Isosurface {
                    isovalue: f64::NAN
                }
            ),
            Err(UniplotError::BadValue(_))
        );
        assert_matches!(
            Volume::new(
                sample_field(),
                VolumeMode::Slices {
                    sx: vec![],
                    sy: vec![],
                    sz: vec![]
                }
            ),
            Err(UniplotError::BadValue(_))
        );
        assert!(Volume::new(
            sample_field(),
            VolumeMode::Slices {
                sx: vec![0.5],
                sy: vec![],
                sz: vec![]
            }
        )
        .is_ok());
    }
    #[test]
    fn cdata_length_is_checked() {
        let mut volume = Volume::new(
            sample_field(),
            VolumeMode::Isosurface { isovalue: 3.5 },
        )
        .unwrap();
        assert_matches!(
            volume.set_cdata(vec![0.0; 3]),
            Err(UniplotError::BadValue(_))
        );
        assert!(volume.set_cdata(vec![0.0; 8]).is_ok());
    }
}
