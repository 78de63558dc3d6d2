#![warn(missing_docs)]
//! The axis: a coordinate system inside a figure, owning plot items and the
//! display attributes of the `axis`, `view`, `shading`, `colorbar` and
//! related commands.

use strum::{Display, EnumString};

use crate::colormap::Colormap;
use crate::error::{UniResult, UniplotError};
use crate::options::{unknown_option, Configurable, PropValue};
use crate::scene::camera::Camera;
use crate::scene::colorbar::Colorbar;
use crate::scene::item::PlotItem;
use crate::scene::light::Light;
use crate::scene::material::MaterialProperties;

/// Axis scale selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Scale {
    /// linear x and y
    #[default]
    Linear,
    /// logarithmic x
    Logx,
    /// logarithmic y
    Logy,
    /// logarithmic x and y
    Loglog,
}

/// How axis limits are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LimitMode {
    /// engine autoscaling
    #[default]
    Auto,
    /// explicit limits
    Manual,
    /// limits hug the data
    Tight,
    /// limits fill the viewport
    Fill,
}

/// Aspect-ratio handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum AspectMethod {
    /// free aspect
    #[default]
    Normal,
    /// equal data units on all axes
    Equal,
    /// equal units and tight limits
    Image,
    /// square axis box
    Square,
    /// 3D aspect frozen for rotation
    Vis3d,
}

/// Axis orientation: `ij` puts the y origin at the top (matrix convention).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// y grows upwards
    #[default]
    Xy,
    /// y grows downwards
    Ij,
}

/// Surface shading selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Shading {
    /// filled faces with mesh lines
    #[default]
    Faceted,
    /// filled faces without mesh lines
    Flat,
    /// color-interpolated faces
    Interp,
}

/// Per-dimension axis limits; `None` lets the engine autoscale that bound.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisLimits {
    /// lower x bound
    pub xmin: Option<f64>,
    /// upper x bound
    pub xmax: Option<f64>,
    /// lower y bound
    pub ymin: Option<f64>,
    /// upper y bound
    pub ymax: Option<f64>,
    /// lower z bound
    pub zmin: Option<f64>,
    /// upper z bound
    pub zmax: Option<f64>,
}

/// A coordinate system inside a figure.
///
/// Mutation goes through typed setters or [`Configurable::set_named`];
/// `reset` restores defaults while preserving the viewport, which is the
/// clear step of every plot command issued with `hold` off.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    /// plot items in creation order
    pub items: Vec<PlotItem>,
    /// explicit viewport `[left, bottom, right, top]` in normalized figure
    /// coordinates; `None` derives the viewport from the subplot grid
    pub viewport: Option<[f64; 4]>,
    /// axis limits
    pub limits: AxisLimits,
    /// scale selection
    pub scale: Scale,
    /// limit mode
    pub mode: LimitMode,
    /// aspect method
    pub method: AspectMethod,
    /// orientation
    pub direction: Direction,
    /// x axis label
    pub xlabel: String,
    /// y axis label
    pub ylabel: String,
    /// z axis label
    pub zlabel: String,
    /// axis title
    pub title: String,
    /// draw the axis box
    pub box_on: bool,
    /// draw grid lines
    pub grid_on: bool,
    /// hidden-line removal for wireframes
    pub hidden: bool,
    /// axis frame visibility (`axis off`)
    pub visible: bool,
    /// surface shading
    pub shading: Shading,
    /// explicit pseudocolor range; `None` maps the full data range
    pub caxis: Option<(f64, f64)>,
    /// active colormap
    pub colormap: Colormap,
    /// camera state
    pub camera: Camera,
    /// colorbar state
    pub colorbar: Colorbar,
    /// light sources
    pub lights: Vec<Light>,
    /// lighting coefficients
    pub material: MaterialProperties,
    /// data aspect ratio of the `daspect` command
    pub daspect: Option<[f64; 3]>,
    /// append instead of replace on the next plot command
    pub hold: bool,
}

impl Default for Axis {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            viewport: None,
            limits: AxisLimits::default(),
            scale: Scale::default(),
            mode: LimitMode::default(),
            method: AspectMethod::default(),
            direction: Direction::default(),
            xlabel: String::new(),
            ylabel: String::new(),
            zlabel: String::new(),
            title: String::new(),
            box_on: false,
            grid_on: false,
            hidden: true,
            visible: true,
            shading: Shading::default(),
            caxis: None,
            colormap: Colormap::default(),
            camera: Camera::default(),
            colorbar: Colorbar::default(),
            lights: Vec::new(),
            material: MaterialProperties::default(),
            daspect: None,
            hold: false,
        }
    }
}

impl Axis {
    /// Create a default axis.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore default state while preserving the viewport. The `hold` flag is
    /// preserved as well since resetting it is the caller's decision.
    pub fn reset(&mut self) {
        let viewport = self.viewport;
        let hold = self.hold;
        *self = Self::default();
        self.viewport = viewport;
        self.hold = hold;
    }

    /// The clear step of a plot command: with `hold` off, drop all items and
    /// reset the attributes.
    pub fn prepare_for_plot(&mut self) {
        if !self.hold {
            self.reset();
        }
    }

    /// Append a plot item.
    pub fn push_item(&mut self, item: PlotItem) {
        self.items.push(item);
    }

    /// Items in render order: fixed variant precedence, creation order within
    /// a variant.
    #[must_use]
    pub fn sorted_items(&self) -> Vec<&PlotItem> {
        let mut items: Vec<&PlotItem> = self.items.iter().collect();
        items.sort_by_key(|item| item.precedence());
        items
    }

    /// True if any item needs a 3D projection.
    #[must_use]
    pub fn needs_3d(&self) -> bool {
        matches!(self.camera.view, crate::scene::camera::View::ThreeDim)
            || self.items.iter().any(PlotItem::is_volumetric)
    }

    /// Apply one token of the string form of the `axis` command
    /// (`auto`, `manual`, `tight`, `fill`, `equal`, `image`, `square`,
    /// `normal`, `vis3d`, `on`, `off`, `ij`, `xy`).
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for an unrecognized token.
    pub fn apply_token(&mut self, token: &str) -> UniResult<()> {
        if let Ok(mode) = token.parse::<LimitMode>() {
            self.mode = mode;
            return Ok(());
        }
        if let Ok(method) = token.parse::<AspectMethod>() {
            self.method = method;
            return Ok(());
        }
        if let Ok(direction) = token.parse::<Direction>() {
            self.direction = direction;
            return Ok(());
        }
        match token {
            "on" => self.visible = true,
            "off" => self.visible = false,
            _ => {
                return Err(UniplotError::BadValue(format!(
                    "{token} is not a legal axis token"
                )))
            }
        }
        Ok(())
    }

    /// Apply the numeric form of the `axis` command: `[xmin, xmax, ymin,
    /// ymax]` or `[xmin, xmax, ymin, ymax, zmin, zmax]`. Switches the limit
    /// mode to manual.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for any other tuple length or an inverted
    /// range.
    pub fn set_limits(&mut self, limits: &[f64]) -> UniResult<()> {
        if limits.len() != 4 && limits.len() != 6 {
            return Err(UniplotError::BadValue(format!(
                "axis limits need 4 or 6 values, got {}",
                limits.len()
            )));
        }
        for pair in limits.chunks_exact(2) {
            if pair[0] > pair[1] {
                return Err(UniplotError::BadValue(format!(
                    "axis limits must be ordered, got ({}, {})",
                    pair[0], pair[1]
                )));
            }
        }
        self.limits.xmin = Some(limits[0]);
        self.limits.xmax = Some(limits[1]);
        self.limits.ymin = Some(limits[2]);
        self.limits.ymax = Some(limits[3]);
        if limits.len() == 6 {
            self.limits.zmin = Some(limits[4]);
            self.limits.zmax = Some(limits[5]);
        }
        self.mode = LimitMode::Manual;
        Ok(())
    }
}

fn limit_value(limit: Option<f64>) -> PropValue {
    limit.map_or(PropValue::Str("auto".to_owned()), PropValue::Float)
}

impl Configurable for Axis {
    fn set_named(&mut self, name: &str, value: PropValue) -> UniResult<()> {
        match name {
            "xmin" => self.limits.xmin = Some(value.as_float(name)?),
            "xmax" => self.limits.xmax = Some(value.as_float(name)?),
            "ymin" => self.limits.ymin = Some(value.as_float(name)?),
            "ymax" => self.limits.ymax = Some(value.as_float(name)?),
            "zmin" => self.limits.zmin = Some(value.as_float(name)?),
            "zmax" => self.limits.zmax = Some(value.as_float(name)?),
            "xlabel" => self.xlabel = value.as_str(name)?.to_owned(),
            "ylabel" => self.ylabel = value.as_str(name)?.to_owned(),
            "zlabel" => self.zlabel = value.as_str(name)?.to_owned(),
            "title" => self.title = value.as_str(name)?.to_owned(),
            "scale" => {
                self.scale = value.as_str(name)?.parse().map_err(|_| {
                    UniplotError::BadValue(format!("{value:?} is not a legal scale"))
                })?;
            }
            "mode" => {
                self.mode = value.as_str(name)?.parse().map_err(|_| {
                    UniplotError::BadValue(format!("{value:?} is not a legal limit mode"))
                })?;
            }
            "method" => {
                self.method = value.as_str(name)?.parse().map_err(|_| {
                    UniplotError::BadValue(format!("{value:?} is not a legal aspect method"))
                })?;
            }
            "direction" => {
                self.direction = value.as_str(name)?.parse().map_err(|_| {
                    UniplotError::BadValue(format!("{value:?} is not a legal direction"))
                })?;
            }
            "shading" => {
                self.shading = value.as_str(name)?.parse().map_err(|_| {
                    UniplotError::BadValue(format!("{value:?} is not a legal shading"))
                })?;
            }
            "box" => self.box_on = value.as_bool(name)?,
            "grid" => self.grid_on = value.as_bool(name)?,
            "hidden" => self.hidden = value.as_bool(name)?,
            "hold" => self.hold = value.as_bool(name)?,
            "colorbar" => self.colorbar.visible = value.as_bool(name)?,
            "cblocation" => {
                self.colorbar.location = value.as_str(name)?.parse().map_err(|_| {
                    UniplotError::BadValue(format!("{value:?} is not a legal colorbar location"))
                })?;
            }
            "cbtitle" => self.colorbar.title = value.as_str(name)?.to_owned(),
            "colormap" => self.colormap = Colormap::lookup(value.as_str(name)?)?,
            "caxis" => {
                let (cmin, cmax) = value.as_pair(name)?;
                if cmin >= cmax {
                    return Err(UniplotError::BadValue(format!(
                        "caxis range must be increasing, got ({cmin}, {cmax})"
                    )));
                }
                self.caxis = Some((cmin, cmax));
            }
            "view" => self.camera.set_view(value.as_int(name)?)?,
            "azimuth" => {
                let elevation = self.camera.elevation.unwrap_or(30.0);
                self.camera.set_direction(value.as_float(name)?, elevation);
            }
            "elevation" => {
                let azimuth = self.camera.azimuth.unwrap_or(-37.5);
                self.camera.set_direction(azimuth, value.as_float(name)?);
            }
            "daspect" => {
                let ratios = value.as_floats(name)?;
                let [x, y, z] = ratios else {
                    return Err(UniplotError::BadValue(format!(
                        "daspect needs 3 ratios, got {}",
                        ratios.len()
                    )));
                };
                if ratios.iter().any(|r| *r <= 0.0) {
                    return Err(UniplotError::BadValue(
                        "daspect ratios must be positive".into(),
                    ));
                }
                self.daspect = Some([*x, *y, *z]);
            }
            "viewport" => {
                let viewport = value.as_floats(name)?;
                let [left, bottom, right, top] = viewport else {
                    return Err(UniplotError::BadValue(format!(
                        "viewport needs [left, bottom, right, top], got {} values",
                        viewport.len()
                    )));
                };
                if !(left < right && bottom < top)
                    || viewport.iter().any(|v| !(0.0..=1.0).contains(v))
                {
                    return Err(UniplotError::BadValue(format!(
                        "viewport must be normalized and ordered, got {viewport:?}"
                    )));
                }
                self.viewport = Some([*left, *bottom, *right, *top]);
            }
            "opacity" | "ambient" | "diffuse" | "specular" | "specularpower" => {
                self.material.set_coefficient(name, value.as_float(name)?)?;
            }
            _ => return Err(unknown_option("axis", name)),
        }
        Ok(())
    }

    fn get_named(&self, name: &str) -> UniResult<PropValue> {
        match name {
            "xmin" => Ok(limit_value(self.limits.xmin)),
            "xmax" => Ok(limit_value(self.limits.xmax)),
            "ymin" => Ok(limit_value(self.limits.ymin)),
            "ymax" => Ok(limit_value(self.limits.ymax)),
            "zmin" => Ok(limit_value(self.limits.zmin)),
            "zmax" => Ok(limit_value(self.limits.zmax)),
            "xlabel" => Ok(PropValue::Str(self.xlabel.clone())),
            "ylabel" => Ok(PropValue::Str(self.ylabel.clone())),
            "zlabel" => Ok(PropValue::Str(self.zlabel.clone())),
            "title" => Ok(PropValue::Str(self.title.clone())),
            "scale" => Ok(PropValue::Str(self.scale.to_string())),
            "mode" => Ok(PropValue::Str(self.mode.to_string())),
            "method" => Ok(PropValue::Str(self.method.to_string())),
            "direction" => Ok(PropValue::Str(self.direction.to_string())),
            "shading" => Ok(PropValue::Str(self.shading.to_string())),
            "box" => Ok(PropValue::Bool(self.box_on)),
            "grid" => Ok(PropValue::Bool(self.grid_on)),
            "hidden" => Ok(PropValue::Bool(self.hidden)),
            "hold" => Ok(PropValue::Bool(self.hold)),
            "colorbar" => Ok(PropValue::Bool(self.colorbar.visible)),
            "cblocation" => Ok(PropValue::Str(self.colorbar.location.to_string())),
            "cbtitle" => Ok(PropValue::Str(self.colorbar.title.clone())),
            "colormap" => Ok(PropValue::Str(self.colormap.to_string())),
            "caxis" => self.caxis.map(PropValue::from).ok_or_else(|| {
                UniplotError::BadValue("caxis is in automatic mode".into())
            }),
            "view" => Ok(PropValue::Int(match self.camera.view {
                crate::scene::camera::View::TwoDim => 2,
                crate::scene::camera::View::ThreeDim => 3,
            })),
            "azimuth" => Ok(limit_value(self.camera.azimuth)),
            "elevation" => Ok(limit_value(self.camera.elevation)),
            "daspect" => Ok(PropValue::Floats(
                self.daspect.map(|d| d.to_vec()).unwrap_or_default(),
            )),
            "viewport" => Ok(PropValue::Floats(
                self.viewport.map(|v| v.to_vec()).unwrap_or_default(),
            )),
            "opacity" | "ambient" | "diffuse" | "specular" | "specularpower" => {
                Ok(PropValue::Float(self.material.coefficient(name)?))
            }
            _ => Err(unknown_option("axis", name)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scene::line::Line;
    use assert_matches::assert_matches;
    use nalgebra::DVector;

    fn line_item() -> PlotItem {
        PlotItem::Line(
            Line::new(
                DVector::from_vec(vec![1., 2.]),
                DVector::from_vec(vec![3., 4.]),
            )
            .unwrap(),
        )
    }

    #[test]
    fn reset_preserves_viewport_and_hold() {
        let mut axis = Axis::new();
        axis.viewport = Some([0.1, 0.1, 0.9, 0.9]);
        axis.hold = true;
        axis.title = "t".to_owned();
        axis.push_item(line_item());
        axis.reset();
        assert_eq!(axis.viewport, Some([0.1, 0.1, 0.9, 0.9]));
        assert!(axis.hold);
        assert!(axis.items.is_empty());
        assert!(axis.title.is_empty());
    }
    #[test]
    fn prepare_clears_only_without_hold() {
        let mut axis = Axis::new();
        axis.push_item(line_item());
        axis.hold = true;
        axis.prepare_for_plot();
        assert_eq!(axis.items.len(), 1);
        axis.hold = false;
        axis.prepare_for_plot();
        assert!(axis.items.is_empty());
    }
    #[test]
    fn tokens_cover_the_axis_vocabulary() {
        let mut axis = Axis::new();
        for token in [
            "auto", "manual", "tight", "fill", "equal", "image", "square", "normal", "vis3d",
            "on", "off", "ij", "xy",
        ] {
            axis.apply_token(token).unwrap();
        }
        assert_matches!(axis.apply_token("sideways"), Err(UniplotError::BadValue(_)));
        axis.apply_token("ij").unwrap();
        assert_eq!(axis.direction, Direction::Ij);
        axis.apply_token("off").unwrap();
        assert!(!axis.visible);
    }
    #[test]
    fn numeric_limits_switch_to_manual() {
        let mut axis = Axis::new();
        axis.set_limits(&[0., 1., -1., 1.]).unwrap();
        assert_eq!(axis.mode, LimitMode::Manual);
        assert_eq!(axis.limits.xmax, Some(1.0));
        assert_eq!(axis.limits.zmin, None);
        assert_matches!(axis.set_limits(&[0., 1.]), Err(UniplotError::BadValue(_)));
        assert_matches!(
            axis.set_limits(&[1., 0., 0., 1.]),
            Err(UniplotError::BadValue(_))
        );
    }
    #[test]
    fn set_get_round_trip() {
        let mut axis = Axis::new();
        axis.set_named("xlabel", "time".into()).unwrap();
        axis.set_named("scale", "loglog".into()).unwrap();
        axis.set_named("grid", true.into()).unwrap();
        axis.set_named("caxis", (0.0, 2.0).into()).unwrap();
        axis.set_named("colormap", "hot".into()).unwrap();
        assert_eq!(axis.get_named("xlabel").unwrap(), "time".into());
        assert_eq!(axis.get_named("scale").unwrap(), "loglog".into());
        assert_eq!(axis.get_named("grid").unwrap(), true.into());
        assert_eq!(axis.get_named("caxis").unwrap(), (0.0, 2.0).into());
        assert_eq!(axis.get_named("colormap").unwrap(), "hot".into());
    }
    #[test]
    fn failed_set_leaves_prior_value() {
        let mut axis = Axis::new();
        axis.set_named("shading", "interp".into()).unwrap();
        assert_matches!(
            axis.set_named("shading", "glossy".into()),
            Err(UniplotError::BadValue(_))
        );
        assert_eq!(axis.get_named("shading").unwrap(), "interp".into());
        assert_matches!(
            axis.set_named("nosuch", 0.0.into()),
            Err(UniplotError::UnknownOption(_))
        );
    }
    #[test]
    fn sorted_items_follow_precedence() {
        use crate::scene::contours::Contours;
        use crate::scene::item::{GridAxes, MemoryOrder};
        use nalgebra::DMatrix;
        let mut axis = Axis::new();
        axis.push_item(line_item());
        let grid = GridAxes::Vectors {
            x: DVector::from_vec(vec![0., 1.]),
            y: DVector::from_vec(vec![0., 1.]),
        };
        let contours =
            Contours::new(grid, DMatrix::from_element(2, 2, 0.0), MemoryOrder::Yxz).unwrap();
        axis.push_item(PlotItem::Contours(contours));
        let sorted = axis.sorted_items();
        assert_matches!(sorted[0], PlotItem::Contours(_));
        assert_matches!(sorted[1], PlotItem::Line(_));
    }
    #[test]
    fn view_switches_dimensionality() {
        let mut axis = Axis::new();
        axis.set_named("view", PropValue::Int(3)).unwrap();
        assert!(axis.needs_3d());
        assert_eq!(axis.get_named("view").unwrap(), PropValue::Int(3));
        assert_matches!(
            axis.set_named("view", PropValue::Int(5)),
            Err(UniplotError::BadValue(_))
        );
    }
}
