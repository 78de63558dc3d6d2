#![warn(missing_docs)]
//! Light sources attached to an axis.

use crate::error::{UniResult, UniplotError};

/// A point light with a position in data coordinates and an RGB color with
/// components in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// light position
    pub position: (f64, f64, f64),
    /// RGB color, each component in `[0, 1]`
    pub color: (f64, f64, f64),
}

impl Light {
    /// Create a light source.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if any color component is outside `[0, 1]`.
    pub fn new(position: (f64, f64, f64), color: (f64, f64, f64)) -> UniResult<Self> {
        for component in [color.0, color.1, color.2] {
            if !(0.0..=1.0).contains(&component) {
                return Err(UniplotError::BadValue(format!(
                    "light color components must be in [0, 1], got {color:?}"
                )));
            }
        }
        Ok(Self { position, color })
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: (1.0, 1.0, 1.0),
            color: (1.0, 1.0, 1.0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    #[test]
    fn color_range_is_checked() {
        assert!(Light::new((0., 0., 5.), (0.5, 0.5, 0.5)).is_ok());
        assert_matches!(
            Light::new((0., 0., 5.), (1.5, 0.0, 0.0)),
            Err(UniplotError::BadValue(_))
        );
        assert_matches!(
            Light::new((0., 0., 5.), (0.0, -0.1, 0.0)),
            Err(UniplotError::BadValue(_))
        );
    }
}
