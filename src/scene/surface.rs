#![warn(missing_docs)]
//! The surface plot item.

use nalgebra::DMatrix;

use crate::error::{UniResult, UniplotError};
use crate::scene::contours::Contours;
use crate::scene::item::{to_canonical, GridAxes, ItemStyle, MemoryOrder};

/// A solid or wireframe surface over a 2D scalar field.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// grid coordinates
    pub grid: GridAxes,
    /// height values, canonical orientation (rows = y)
    pub z: DMatrix<f64>,
    /// pseudocolor data; `None` colors by height
    pub cdata: Option<DMatrix<f64>>,
    /// embedded contour set of the `meshc`/`surfc` commands
    pub contours: Option<Box<Contours>>,
    /// draw as wireframe mesh instead of filled quads
    pub wireframe: bool,
    /// styling attributes
    pub style: ItemStyle,
}

impl Surface {
    /// Create a surface from a field in the given memory order.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if the grid does not match the field shape.
    pub fn new(grid: GridAxes, z: DMatrix<f64>, order: MemoryOrder) -> UniResult<Self> {
        let z = to_canonical(z, order);
        grid.validate(z.shape())?;
        Ok(Self {
            grid,
            z,
            cdata: None,
            contours: None,
            wireframe: false,
            style: ItemStyle::default(),
        })
    }

    /// Attach pseudocolor data of the field's shape. The data follows the same
    /// memory order as the field.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] on shape mismatch.
    pub fn set_cdata(&mut self, cdata: DMatrix<f64>, order: MemoryOrder) -> UniResult<()> {
        let cdata = to_canonical(cdata, order);
        if cdata.shape() != self.z.shape() {
            return Err(UniplotError::BadValue(format!(
                "cdata shape {:?} does not match field shape {:?}",
                cdata.shape(),
                self.z.shape()
            )));
        }
        self.cdata = Some(cdata);
        Ok(())
    }

    /// Attach the embedded contour set of a combined surface-with-contours
    /// command.
    pub fn set_contours(&mut self, contours: Contours) {
        self.contours = Some(Box::new(contours));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    use nalgebra::DVector;

    fn grid_2x3() -> GridAxes {
        GridAxes::Vectors {
            x: DVector::from_vec(vec![0., 1., 2.]),
            y: DVector::from_vec(vec![0., 1.]),
        }
    }

    #[test]
    fn construction_canonicalizes_orientation() {
        // xyz input: rows run along x
        let z = DMatrix::from_row_slice(3, 2, &[1., 2., 3., 4., 5., 6.]);
        let surface = Surface::new(grid_2x3(), z, MemoryOrder::Xyz).unwrap();
        assert_eq!(surface.z.shape(), (2, 3));
        // yxz input is stored as-is
        let z = DMatrix::from_element(2, 3, 0.0);
        let surface = Surface::new(grid_2x3(), z, MemoryOrder::Yxz).unwrap();
        assert_eq!(surface.z.shape(), (2, 3));
    }
    #[test]
    fn cdata_shape_is_checked() {
        let z = DMatrix::from_element(3, 2, 0.0);
        let mut surface = Surface::new(grid_2x3(), z, MemoryOrder::Xyz).unwrap();
        assert!(surface
            .set_cdata(DMatrix::from_element(3, 2, 1.0), MemoryOrder::Xyz)
            .is_ok());
        assert_matches!(
            surface.set_cdata(DMatrix::from_element(2, 3, 1.0), MemoryOrder::Xyz),
            Err(UniplotError::BadValue(_))
        );
    }
    #[test]
    fn grid_mismatch_is_rejected() {
        let z = DMatrix::from_element(4, 4, 0.0);
        assert_matches!(
            Surface::new(grid_2x3(), z, MemoryOrder::Yxz),
            Err(UniplotError::BadValue(_))
        );
    }
}
