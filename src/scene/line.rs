#![warn(missing_docs)]
//! The curve plot item.

use nalgebra::DVector;

use crate::error::{UniResult, UniplotError};
use crate::scene::item::ItemStyle;

/// A 2D or 3D curve through the given points, drawn in data order.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// x coordinates
    pub x: DVector<f64>,
    /// y coordinates
    pub y: DVector<f64>,
    /// z coordinates of a space curve
    pub z: Option<DVector<f64>>,
    /// styling attributes
    pub style: ItemStyle,
}

impl Line {
    /// Create a 2D curve.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if `x` and `y` differ in length or are
    /// empty.
    pub fn new(x: DVector<f64>, y: DVector<f64>) -> UniResult<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(UniplotError::BadValue(format!(
                "line data must be non-empty and of equal length, got ({}, {})",
                x.len(),
                y.len()
            )));
        }
        Ok(Self {
            x,
            y,
            z: None,
            style: ItemStyle::default(),
        })
    }

    /// Create a 3D space curve.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] on any length mismatch.
    pub fn new3(x: DVector<f64>, y: DVector<f64>, z: DVector<f64>) -> UniResult<Self> {
        if z.len() != x.len() {
            return Err(UniplotError::BadValue(format!(
                "line data must be of equal length, got ({}, {}, {})",
                x.len(),
                y.len(),
                z.len()
            )));
        }
        let mut line = Self::new(x, y)?;
        line.z = Some(z);
        Ok(line)
    }

    /// Create a curve over an implicit index axis `0..y.len()`.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if `y` is empty.
    pub fn from_index(y: DVector<f64>) -> UniResult<Self> {
        #[allow(clippy::cast_precision_loss)]
        let x = DVector::from_iterator(y.len(), (0..y.len()).map(|i| i as f64));
        Self::new(x, y)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    #[test]
    fn new_checks_lengths() {
        let x = DVector::from_vec(vec![1., 2., 3.]);
        let y = DVector::from_vec(vec![4., 5., 4.]);
        assert!(Line::new(x.clone(), y.clone()).is_ok());
        assert_matches!(
            Line::new(x.clone(), DVector::from_vec(vec![1.])),
            Err(UniplotError::BadValue(_))
        );
        assert_matches!(
            Line::new(DVector::from_vec(vec![]), DVector::from_vec(vec![])),
            Err(UniplotError::BadValue(_))
        );
        assert_matches!(
            Line::new3(x, y, DVector::from_vec(vec![0., 0.])),
            Err(UniplotError::BadValue(_))
        );
    }
    #[test]
    fn from_index_counts_from_zero() {
        let line = Line::from_index(DVector::from_vec(vec![5., 6., 7.])).unwrap();
        assert_eq!(line.x.as_slice(), &[0., 1., 2.]);
    }
}
