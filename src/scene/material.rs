#![warn(missing_docs)]
//! Surface material properties used by lit 3D rendering.

use crate::error::{UniResult, UniplotError};

/// Lighting coefficients of surfaces in an axis. All coefficients are in
/// `[0, 1]` except `specularpower`, which must be positive.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialProperties {
    /// surface opacity
    pub opacity: f64,
    /// ambient reflection coefficient
    pub ambient: f64,
    /// diffuse reflection coefficient
    pub diffuse: f64,
    /// specular reflection coefficient
    pub specular: f64,
    /// specular exponent
    pub specularpower: f64,
}

impl Default for MaterialProperties {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            ambient: 0.3,
            diffuse: 0.7,
            specular: 0.4,
            specularpower: 10.0,
        }
    }
}

impl MaterialProperties {
    /// Set one of the unit-interval coefficients by name.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] if the value is outside its legal range.
    pub fn set_coefficient(&mut self, name: &str, value: f64) -> UniResult<()> {
        if name == "specularpower" {
            if value <= 0.0 || !value.is_finite() {
                return Err(UniplotError::BadValue(format!(
                    "specularpower must be positive, got {value}"
                )));
            }
            self.specularpower = value;
            return Ok(());
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(UniplotError::BadValue(format!(
                "{name} must be in [0, 1], got {value}"
            )));
        }
        match name {
            "opacity" => self.opacity = value,
            "ambient" => self.ambient = value,
            "diffuse" => self.diffuse = value,
            "specular" => self.specular = value,
            _ => {
                return Err(UniplotError::UnknownOption(format!(
                    "material has no coefficient named {name}"
                )))
            }
        }
        Ok(())
    }

    /// Look up a coefficient by name.
    ///
    /// # Errors
    /// [`UniplotError::UnknownOption`] for an unregistered name.
    pub fn coefficient(&self, name: &str) -> UniResult<f64> {
        match name {
            "opacity" => Ok(self.opacity),
            "ambient" => Ok(self.ambient),
            "diffuse" => Ok(self.diffuse),
            "specular" => Ok(self.specular),
            "specularpower" => Ok(self.specularpower),
            _ => Err(UniplotError::UnknownOption(format!(
                "material has no coefficient named {name}"
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    #[test]
    fn coefficients_round_trip() {
        let mut material = MaterialProperties::default();
        material.set_coefficient("opacity", 0.5).unwrap();
        assert_eq!(material.coefficient("opacity").unwrap(), 0.5);
        material.set_coefficient("specularpower", 20.0).unwrap();
        assert_eq!(material.coefficient("specularpower").unwrap(), 20.0);
    }
    #[test]
    fn ranges_are_checked() {
        let mut material = MaterialProperties::default();
        assert_matches!(
            material.set_coefficient("ambient", 1.5),
            Err(UniplotError::BadValue(_))
        );
        assert_matches!(
            material.set_coefficient("specularpower", 0.0),
            Err(UniplotError::BadValue(_))
        );
        assert_matches!(
            material.set_coefficient("shininess", 0.5),
            Err(UniplotError::UnknownOption(_))
        );
    }
}
