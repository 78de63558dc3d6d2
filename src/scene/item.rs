#![warn(missing_docs)]
//! Common plot-item plumbing: the per-item style record, grid-axes handling
//! and the [`PlotItem`] sum type with its fixed render precedence.

use nalgebra::{DMatrix, DVector};
use strum::{Display, EnumString};

use crate::error::{UniResult, UniplotError};
use crate::options::{unknown_option, Configurable, PropValue};
use crate::scene::{
    contours::Contours, line::Line, streams::Streams, surface::Surface, vectors::VelocityVectors,
    volume::Volume,
};
use crate::style::{Color, FormatSpec, LineStyle, Marker};

/// Index convention of a user-supplied 2D field: `Xyz` means `a[i=x, j=y]`,
/// `Yxz` means `a[i=y, j=x]`.
///
/// Fields are stored canonically with rows indexing y and columns indexing x;
/// an `Xyz` input is transposed exactly once at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MemoryOrder {
    /// first index runs along x
    #[default]
    Xyz,
    /// first index runs along y
    Yxz,
}

/// Bring a user-supplied field into canonical orientation (rows = y).
#[must_use]
pub fn to_canonical(field: DMatrix<f64>, order: MemoryOrder) -> DMatrix<f64> {
    match order {
        MemoryOrder::Xyz => field.transpose(),
        MemoryOrder::Yxz => field,
    }
}

/// Styling attributes shared by every plot item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStyle {
    /// curve color; `None` lets the backend choose
    pub linecolor: Option<Color>,
    /// line style; `None` means solid
    pub linetype: Option<LineStyle>,
    /// point marker; `None` draws no markers
    pub linemarker: Option<Marker>,
    /// line width in backend units
    pub linewidth: f64,
    /// marker size in backend units
    pub pointsize: f64,
    /// legend entry; empty string suppresses the entry
    pub legend: String,
    /// name of the command that created the item (`plot`, `surf`, ...)
    pub function: String,
}

impl Default for ItemStyle {
    fn default() -> Self {
        Self {
            linecolor: None,
            linetype: None,
            linemarker: None,
            linewidth: 1.0,
            pointsize: 1.0,
            legend: String::new(),
            function: String::new(),
        }
    }
}

impl ItemStyle {
    /// Merge a parsed format string into this style. Slots the format string
    /// does not name are left untouched.
    pub fn apply_format(&mut self, spec: &FormatSpec) {
        if spec.color.is_some() {
            self.linecolor = spec.color;
        }
        if spec.style.is_some() {
            self.linetype = spec.style;
        }
        if spec.marker.is_some() {
            self.linemarker = spec.marker;
        }
    }
}

impl Configurable for ItemStyle {
    fn set_named(&mut self, name: &str, value: PropValue) -> UniResult<()> {
        match name {
            "linecolor" => {
                let letter = value.as_str(name)?;
                let mut chars = letter.chars();
                match (chars.next().and_then(Color::from_letter), chars.next()) {
                    (Some(color), None) => self.linecolor = Some(color),
                    _ => {
                        return Err(UniplotError::BadValue(format!(
                            "{letter} is not a legal color letter"
                        )))
                    }
                }
            }
            "linetype" => {
                let token = value.as_str(name)?;
                let spec = FormatSpec::parse(token);
                self.linetype = Some(spec.style.ok_or_else(|| {
                    UniplotError::BadValue(format!("{token} is not a legal line style"))
                })?);
            }
            "linemarker" => {
                let letter = value.as_str(name)?;
                let mut chars = letter.chars();
                match (chars.next().and_then(Marker::from_letter), chars.next()) {
                    (Some(marker), None) => self.linemarker = Some(marker),
                    _ => {
                        return Err(UniplotError::BadValue(format!(
                            "{letter} is not a legal marker letter"
                        )))
                    }
                }
            }
            "linewidth" => {
                let width = value.as_float(name)?;
                if width <= 0.0 || !width.is_finite() {
                    return Err(UniplotError::BadValue(format!(
                        "linewidth must be positive, got {width}"
                    )));
                }
                self.linewidth = width;
            }
            "pointsize" => {
                let size = value.as_float(name)?;
                if size <= 0.0 || !size.is_finite() {
                    return Err(UniplotError::BadValue(format!(
                        "pointsize must be positive, got {size}"
                    )));
                }
                self.pointsize = size;
            }
            "legend" => self.legend = value.as_str(name)?.to_owned(),
            _ => return Err(unknown_option("plot item", name)),
        }
        Ok(())
    }

    fn get_named(&self, name: &str) -> UniResult<PropValue> {
        match name {
            "linecolor" => Ok(PropValue::Str(
                self.linecolor.map(Color::letter).iter().collect(),
            )),
            "linetype" => Ok(PropValue::Str(
                self.linetype.map_or("", LineStyle::token).to_owned(),
            )),
            "linemarker" => Ok(PropValue::Str(
                self.linemarker.map(Marker::letter).iter().collect(),
            )),
            "linewidth" => Ok(PropValue::Float(self.linewidth)),
            "pointsize" => Ok(PropValue::Float(self.pointsize)),
            "legend" => Ok(PropValue::Str(self.legend.clone())),
            _ => Err(unknown_option("plot item", name)),
        }
    }
}

/// The grid coordinates of a 2D-field plot item. Either two 1D axis vectors
/// (implicitly broadcast) or two pre-meshgridded 2D matrices.
#[derive(Debug, Clone, PartialEq)]
pub enum GridAxes {
    /// axis vectors: `x` has one entry per field column, `y` one per row
    Vectors {
        /// x axis values
        x: DVector<f64>,
        /// y axis values
        y: DVector<f64>,
    },
    /// full coordinate matrices of the field's shape
    Matrices {
        /// x coordinate of every field sample
        x: DMatrix<f64>,
        /// y coordinate of every field sample
        y: DMatrix<f64>,
    },
}

impl GridAxes {
    /// Check this grid against a canonically oriented field shape
    /// `(rows, cols)`.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] on any shape mismatch.
    pub fn validate(&self, shape: (usize, usize)) -> UniResult<()> {
        let (rows, cols) = shape;
        match self {
            Self::Vectors { x, y } => {
                if x.len() != cols || y.len() != rows {
                    return Err(UniplotError::BadValue(format!(
                        "grid vectors of lengths ({}, {}) do not match field shape ({rows}, {cols})",
                        x.len(),
                        y.len()
                    )));
                }
            }
            Self::Matrices { x, y } => {
                if x.shape() != shape || y.shape() != shape {
                    return Err(UniplotError::BadValue(format!(
                        "grid matrices of shapes {:?}, {:?} do not match field shape ({rows}, {cols})",
                        x.shape(),
                        y.shape()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Reduce the grid to its axis vectors `(x, y)` with `x` along the field
    /// columns. For matrix grids the first row / first column are taken.
    #[must_use]
    pub fn axis_vectors(&self) -> (DVector<f64>, DVector<f64>) {
        match self {
            Self::Vectors { x, y } => (x.clone(), y.clone()),
            Self::Matrices { x, y } => (x.row(0).transpose(), y.column(0).clone_owned()),
        }
    }
}

/// One renderable element of an axis.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotItem {
    /// a curve
    Line(Line),
    /// a solid or wireframe surface
    Surface(Surface),
    /// a set of isocontours
    Contours(Contours),
    /// a vector-field arrow plot
    VelocityVectors(VelocityVectors),
    /// field lines, tubes or ribbons
    Streams(Streams),
    /// a volume rendering
    Volume(Volume),
}

impl PlotItem {
    /// Fixed render precedence: 3D opaque objects first, overlays last.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Volume(_) => 0,
            Self::Streams(_) => 1,
            Self::Surface(_) => 2,
            Self::Contours(_) => 3,
            Self::VelocityVectors(_) => 4,
            Self::Line(_) => 5,
        }
    }
    /// The item's style record.
    #[must_use]
    pub const fn style(&self) -> &ItemStyle {
        match self {
            Self::Line(item) => &item.style,
            Self::Surface(item) => &item.style,
            Self::Contours(item) => &item.style,
            Self::VelocityVectors(item) => &item.style,
            Self::Streams(item) => &item.style,
            Self::Volume(item) => &item.style,
        }
    }
    /// Mutable access to the item's style record.
    pub fn style_mut(&mut self) -> &mut ItemStyle {
        match self {
            Self::Line(item) => &mut item.style,
            Self::Surface(item) => &mut item.style,
            Self::Contours(item) => &mut item.style,
            Self::VelocityVectors(item) => &mut item.style,
            Self::Streams(item) => &mut item.style,
            Self::Volume(item) => &mut item.style,
        }
    }
    /// True if the item needs a 3D projection even under `view(2)`.
    #[must_use]
    pub const fn is_volumetric(&self) -> bool {
        matches!(self, Self::Volume(_) | Self::Streams(_))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn memoryorder_parses_lowercase() {
        assert_eq!("xyz".parse::<MemoryOrder>().unwrap(), MemoryOrder::Xyz);
        assert_eq!("yxz".parse::<MemoryOrder>().unwrap(), MemoryOrder::Yxz);
        assert!("zyx".parse::<MemoryOrder>().is_err());
    }
    #[test]
    fn canonical_transposes_xyz_once() {
        let field = DMatrix::from_row_slice(2, 3, &[1., 2., 3., 4., 5., 6.]);
        let canonical = to_canonical(field.clone(), MemoryOrder::Xyz);
        assert_eq!(canonical.shape(), (3, 2));
        assert_eq!(canonical[(2, 0)], 3.0);
        assert_eq!(to_canonical(field.clone(), MemoryOrder::Yxz), field);
    }
    #[test]
    fn style_set_get_round_trip() {
        let mut style = ItemStyle::default();
        style.set_named("linecolor", "r".into()).unwrap();
        style.set_named("linetype", "--".into()).unwrap();
        style.set_named("linewidth", 2.5.into()).unwrap();
        assert_eq!(style.get_named("linecolor").unwrap(), "r".into());
        assert_eq!(style.get_named("linetype").unwrap(), "--".into());
        assert_eq!(style.get_named("linewidth").unwrap(), 2.5.into());
    }
    #[test]
    fn style_rejects_bad_values_without_mutation() {
        let mut style = ItemStyle::default();
        style.set_named("linewidth", 2.0.into()).unwrap();
        assert_matches!(
            style.set_named("linewidth", (-1.0).into()),
            Err(UniplotError::BadValue(_))
        );
        assert_eq!(style.get_named("linewidth").unwrap(), 2.0.into());
        assert_matches!(
            style.set_named("linecolor", "q".into()),
            Err(UniplotError::BadValue(_))
        );
        assert_matches!(
            style.set_named("nosuchoption", 1.0.into()),
            Err(UniplotError::UnknownOption(_))
        );
    }
    #[test]
    fn format_spec_only_overrides_named_slots() {
        let mut style = ItemStyle {
            linecolor: Some(Color::Blue),
            ..Default::default()
        };
        style.apply_format(&FormatSpec::parse("--"));
        assert_eq!(style.linecolor, Some(Color::Blue));
        assert_eq!(style.linetype, Some(LineStyle::Dashed));
    }
    #[test]
    fn grid_validation() {
        let grid = GridAxes::Vectors {
            x: DVector::from_vec(vec![1., 2., 3.]),
            y: DVector::from_vec(vec![1., 2.]),
        };
        assert!(grid.validate((2, 3)).is_ok());
        assert_matches!(grid.validate((3, 2)), Err(UniplotError::BadValue(_)));
        let (x, y) = grid.axis_vectors();
        assert_eq!(x.len(), 3);
        assert_eq!(y.len(), 2);
    }
    #[test]
    fn matrix_grid_axis_vectors() {
        let grid = GridAxes::Matrices {
            x: DMatrix::from_row_slice(2, 3, &[1., 2., 3., 1., 2., 3.]),
            y: DMatrix::from_row_slice(2, 3, &[5., 5., 5., 6., 6., 6.]),
        };
        assert!(grid.validate((2, 3)).is_ok());
        let (x, y) = grid.axis_vectors();
        assert_eq!(x.as_slice(), &[1., 2., 3.]);
        assert_eq!(y.as_slice(), &[5., 6.]);
    }
}
