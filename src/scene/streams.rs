#![warn(missing_docs)]
//! The stream (field-line) plot item.

use nalgebra::{DMatrix, DVector};

use crate::error::{UniResult, UniplotError};
use crate::scene::item::{to_canonical, GridAxes, ItemStyle, MemoryOrder};

/// How the traced field lines are drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMode {
    /// plain polylines
    Lines,
    /// tubes of field-dependent radius
    Tubes {
        /// number of samples around the tube circumference
        n: usize,
        /// radius scaling factor
        tubescale: f64,
    },
    /// twisted ribbons
    Ribbons {
        /// ribbon width in data units
        ribbonwidth: f64,
    },
}

/// Field lines seeded at explicit start points, traced through a gridded
/// vector field.
#[derive(Debug, Clone, PartialEq)]
pub struct Streams {
    /// grid coordinates
    pub grid: GridAxes,
    /// x components, canonical orientation (rows = y)
    pub u: DMatrix<f64>,
    /// y components
    pub v: DMatrix<f64>,
    /// z components of a 3D field
    pub w: Option<DMatrix<f64>>,
    /// seed x coordinates
    pub startx: DVector<f64>,
    /// seed y coordinates
    pub starty: DVector<f64>,
    /// seed z coordinates of a 3D trace
    pub startz: Option<DVector<f64>>,
    /// drawing sub-mode
    pub mode: StreamMode,
    /// styling attributes
    pub style: ItemStyle,
}

impl Streams {
    /// Create a stream-line item.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if component shapes differ, the grid does
    /// not match, or the seed arrays differ in length.
    pub fn new(
        grid: GridAxes,
        u: DMatrix<f64>,
        v: DMatrix<f64>,
        startx: DVector<f64>,
        starty: DVector<f64>,
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
        if startx.len() != starty.len() || startx.is_empty() {
            return Err(UniplotError::BadValue(format!(
                "seed arrays must be non-empty and of equal length, got ({}, {})",
                startx.len(),
                starty.len()
            )));
        }
        Ok(Self {
            grid,
            u,
            v,
            w: None,
            startx,
            starty,
            startz: None,
            mode: StreamMode::Lines,
            style: ItemStyle::default(),
        })
    }

    /// Attach the z components and seed z coordinates of a 3D trace.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] on any shape or length mismatch.
    pub fn set_3d(
        &mut self,
        w: DMatrix<f64>,
        startz: DVector<f64>,
        order: MemoryOrder,
    ) -> UniResult<()> {
        let w = to_canonical(w, order);
        if w.shape() != self.u.shape() {
            return Err(UniplotError::BadValue(format!(
                "w shape {:?} does not match u shape {:?}",
                w.shape(),
                self.u.shape()
            )));
        }
        if startz.len() != self.startx.len() {
            return Err(UniplotError::BadValue(format!(
                "startz length {} does not match startx length {}",
                startz.len(),
                self.startx.len()
            )));
        }
        self.w = Some(w);
        self.startz = Some(startz);
        Ok(())
    }

    /// Switch to tube drawing.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for a degenerate circumference count or a
    /// non-positive scale.
    pub fn set_tubes(&mut self, n: usize, tubescale: f64) -> UniResult<()> {
        if n < 3 || tubescale <= 0.0 {
            return Err(UniplotError::BadValue(format!(
                "tubes need n >= 3 and a positive tubescale, got ({n}, {tubescale})"
            )));
        }
        self.mode = StreamMode::Tubes { n, tubescale };
        Ok(())
    }

    /// Switch to ribbon drawing.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for a non-positive width.
    pub fn set_ribbons(&mut self, ribbonwidth: f64) -> UniResult<()> {
        if ribbonwidth <= 0.0 {
            return Err(UniplotError::BadValue(format!(
                "ribbonwidth must be positive, got {ribbonwidth}"
            )));
        }
        self.mode = StreamMode::Ribbons { ribbonwidth };
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;

    fn sample() -> Streams {
        let grid = GridAxes::Vectors {
            x: DVector::from_vec(vec![0., 1., 2.]),
            y: DVector::from_vec(vec![0., 1., 2.]),
        };
        Streams::new(
            grid,
            DMatrix::from_element(3, 3, 1.0),
            DMatrix::from_element(3, 3, 0.0),
            DVector::from_vec(vec![0.0, 0.0]),
            DVector::from_vec(vec![0.5, 1.5]),
            MemoryOrder::Yxz,
        )
        .unwrap()
    }

    #[test]
    fn seed_lengths_must_match() {
        let grid = GridAxes::Vectors {
            x: DVector::from_vec(vec![0., 1.]),
            y: DVector::from_vec(vec![0., 1.]),
        };
        assert_matches!(
            Streams::new(
                grid,
                DMatrix::from_element(2, 2, 1.0),
                DMatrix::from_element(2, 2, 0.0),
                DVector::from_vec(vec![0.0]),
                DVector::from_vec(vec![0.5, 1.5]),
                MemoryOrder::Yxz,
            ),
            Err(UniplotError::BadValue(_))
        );
    }
    #[test]
    fn default_mode_is_lines() {
        assert_eq!(sample().mode, StreamMode::Lines);
    }
    #[test]
    fn tube_and_ribbon_parameters_are_checked() {
        let mut streams = sample();
        assert_matches!(streams.set_tubes(2, 1.0), Err(UniplotError::BadValue(_)));
        streams.set_tubes(8, 0.5).unwrap();
        assert_eq!(
            streams.mode,
            StreamMode::Tubes {
                n: 8,
                tubescale: 0.5
            }
        );
        assert_matches!(
            streams.set_ribbons(0.0),
            Err(UniplotError::BadValue(_))
        );
        streams.set_ribbons(0.25).unwrap();
    }
    #[test]
    fn three_d_extension_is_validated() {
        let mut streams = sample();
        assert_matches!(
            streams.set_3d(
                DMatrix::from_element(2, 2, 0.0),
                DVector::from_vec(vec![0., 0.]),
                MemoryOrder::Yxz
            ),
            Err(UniplotError::BadValue(_))
        );
        streams
            .set_3d(
                DMatrix::from_element(3, 3, 0.0),
                DVector::from_vec(vec![0., 0.]),
                MemoryOrder::Yxz,
            )
            .unwrap();
        assert!(streams.w.is_some());
    }
}
