#![warn(missing_docs)]
//! Camera state of an axis.

use crate::error::{UniResult, UniplotError};

/// 2D top-down or 3D projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    /// strict top-down orthographic projection
    #[default]
    TwoDim,
    /// 3D projection
    ThreeDim,
}

/// Optional manual camera bundle for fine-grained 3D control. Any field left
/// `None` keeps the backend default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraManual {
    /// camera mode (`auto` or `manual`)
    pub cammode: Option<String>,
    /// roll angle in degrees
    pub camroll: Option<f64>,
    /// zoom factor
    pub camzoom: Option<f64>,
    /// dolly offset
    pub camdolly: Option<(f64, f64, f64)>,
    /// look-at point
    pub camtarget: Option<(f64, f64, f64)>,
    /// camera position
    pub campos: Option<(f64, f64, f64)>,
    /// camera up vector
    pub camup: Option<(f64, f64, f64)>,
    /// view angle in degrees
    pub camva: Option<f64>,
    /// projection (`orthographic` or `perspective`)
    pub camproj: Option<String>,
}

/// Camera state: view dimensionality plus an optional azimuth/elevation pair.
/// Both `None` under [`View::ThreeDim`] means the backend's default 3D view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Camera {
    /// projection dimensionality
    pub view: View,
    /// azimuth in degrees
    pub azimuth: Option<f64>,
    /// elevation in degrees
    pub elevation: Option<f64>,
    /// optional manual bundle
    pub manual: Option<CameraManual>,
}

impl Camera {
    /// Set the view from its numeric form as used by the `view` command.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for anything other than 2 or 3.
    pub fn set_view(&mut self, view: i64) -> UniResult<()> {
        self.view = match view {
            2 => {
                self.azimuth = None;
                self.elevation = None;
                View::TwoDim
            }
            3 => View::ThreeDim,
            other => {
                return Err(UniplotError::BadValue(format!(
                    "view must be 2 or 3, got {other}"
                )))
            }
        };
        Ok(())
    }

    /// Set an explicit 3D view direction; implies `view(3)`.
    pub fn set_direction(&mut self, azimuth: f64, elevation: f64) {
        self.view = View::ThreeDim;
        self.azimuth = Some(azimuth);
        self.elevation = Some(elevation);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;
    #[test]
    fn default_is_top_down() {
        assert_eq!(Camera::default().view, View::TwoDim);
    }
    #[test]
    fn view_accepts_only_two_and_three() {
        let mut camera = Camera::default();
        camera.set_view(3).unwrap();
        assert_eq!(camera.view, View::ThreeDim);
        assert_matches!(camera.set_view(4), Err(UniplotError::BadValue(_)));
        assert_eq!(camera.view, View::ThreeDim);
    }
    #[test]
    fn direction_implies_three_d() {
        let mut camera = Camera::default();
        camera.set_direction(30.0, 60.0);
        assert_eq!(camera.view, View::ThreeDim);
        assert_eq!(camera.azimuth, Some(30.0));
    }
    #[test]
    fn back_to_two_d_clears_direction() {
        let mut camera = Camera::default();
        camera.set_direction(30.0, 60.0);
        camera.set_view(2).unwrap();
        assert_eq!(camera.azimuth, None);
        assert_eq!(camera.elevation, None);
    }
}
