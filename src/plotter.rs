#![warn(missing_docs)]
//! The front-end command API.
//!
//! [`Plotter`] owns the [`Session`] and the selected backend and exposes the
//! MATLAB-style command vocabulary (`plot`, `surf`, `contour`, `quiver`,
//! `subplot`, `hold`, `hardcopy`, ...). Commands parse their positional and
//! keyword arguments, construct plot items, attach them to the current axis
//! and trigger a replot while the session's `show` flag is active.
//!
//! Positional payloads are modelled as [`PlotArg`] values; keyword arguments
//! arrive as `(name, PropValue)` pairs. Recognized item options are applied
//! to the freshly created items, everything else goes to the current axis via
//! its name-keyed `set` surface.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use nalgebra::{DMatrix, DVector};

use crate::backend::{select_backend, Backend};
use crate::config::Config;
use crate::error::{UniResult, UniplotError};
use crate::options::{Configurable, PropValue};
use crate::scene::contours::{ContourLocation, Contours};
use crate::scene::item::{GridAxes, MemoryOrder, PlotItem};
use crate::scene::line::Line;
use crate::scene::streams::Streams;
use crate::scene::surface::Surface;
use crate::scene::vectors::VelocityVectors;
use crate::scene::volume::{Volume, VolumeField, VolumeMode};
use crate::session::Session;
use crate::style::FormatSpec;

/// One positional argument of a data command.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotArg {
    /// a 1D data vector
    V(DVector<f64>),
    /// a 2D data matrix
    M(DMatrix<f64>),
    /// a scalar (arrow scale, isovalue, ...)
    N(f64),
    /// a format string
    Fmt(String),
}

impl From<Vec<f64>> for PlotArg {
    fn from(value: Vec<f64>) -> Self {
        Self::V(DVector::from_vec(value))
    }
}
impl From<DVector<f64>> for PlotArg {
    fn from(value: DVector<f64>) -> Self {
        Self::V(value)
    }
}
impl From<DMatrix<f64>> for PlotArg {
    fn from(value: DMatrix<f64>) -> Self {
        Self::M(value)
    }
}
impl From<&str> for PlotArg {
    fn from(value: &str) -> Self {
        Self::Fmt(value.to_owned())
    }
}
impl From<f64> for PlotArg {
    fn from(value: f64) -> Self {
        Self::N(value)
    }
}

/// Keyword arguments of a data command.
pub type KwArgs<'a> = [(&'a str, PropValue)];

struct CurveGroup {
    x: DVector<f64>,
    y: DVector<f64>,
    z: Option<DVector<f64>>,
    fmt: Option<FormatSpec>,
}

fn close_group(vectors: &mut Vec<DVector<f64>>, fmt: Option<&str>, with_z: bool) -> UniResult<CurveGroup> {
    let fmt = fmt.map(FormatSpec::parse);
    match vectors.len() {
        1 => {
            let y = vectors.pop().ok_or_else(|| UniplotError::Other("empty group".into()))?;
            #[allow(clippy::cast_precision_loss)]
            let x = DVector::from_iterator(y.len(), (0..y.len()).map(|i| i as f64));
            Ok(CurveGroup { x, y, z: None, fmt })
        }
        2 => {
            let y = vectors.pop().ok_or_else(|| UniplotError::Other("empty group".into()))?;
            let x = vectors.pop().ok_or_else(|| UniplotError::Other("empty group".into()))?;
            Ok(CurveGroup { x, y, z: None, fmt })
        }
        3 if with_z => {
            let z = vectors.pop().ok_or_else(|| UniplotError::Other("empty group".into()))?;
            let y = vectors.pop().ok_or_else(|| UniplotError::Other("empty group".into()))?;
            let x = vectors.pop().ok_or_else(|| UniplotError::Other("empty group".into()))?;
            Ok(CurveGroup { x, y, z: Some(z), fmt })
        }
        n => Err(UniplotError::BadValue(format!(
            "curve commands take groups of {} data vectors, got {n}",
            if with_z { "2 or 3" } else { "1 or 2" }
        ))),
    }
}

/// Parse `(x, y, [z], [fmt], x, y, [z], [fmt], ...)` groups.
fn parse_curve_groups(args: &[PlotArg], with_z: bool) -> UniResult<Vec<CurveGroup>> {
    let max_vectors = if with_z { 3 } else { 2 };
    let mut groups = Vec::new();
    let mut vectors: Vec<DVector<f64>> = Vec::new();
    for arg in args {
        match arg {
            PlotArg::V(vector) => {
                if vectors.len() == max_vectors {
                    groups.push(close_group(&mut vectors, None, with_z)?);
                }
                vectors.push(vector.clone());
            }
            PlotArg::Fmt(fmt) => {
                groups.push(close_group(&mut vectors, Some(fmt), with_z)?);
            }
            PlotArg::M(_) | PlotArg::N(_) => {
                return Err(UniplotError::BadValue(
                    "curve commands take data vectors and format strings".into(),
                ))
            }
        }
    }
    if !vectors.is_empty() {
        groups.push(close_group(&mut vectors, None, with_z)?);
    }
    if groups.is_empty() {
        return Err(UniplotError::BadValue("no plot data given".into()));
    }
    Ok(groups)
}

#[allow(clippy::cast_precision_loss)]
fn index_vector(len: usize) -> DVector<f64> {
    DVector::from_iterator(len, (0..len).map(|i| i as f64))
}

/// Parse the grid/field forms of the 2D-field commands: `(z)`,
/// `(x_vec, y_vec, z)` or `(xx, yy, z)` with full coordinate matrices. The
/// field is returned untransposed; memory-order handling happens at item
/// construction.
fn parse_field_args(
    args: &[PlotArg],
    order: MemoryOrder,
) -> UniResult<(GridAxes, DMatrix<f64>)> {
    match args {
        [PlotArg::M(z)] => {
            // implicit index grid in canonical orientation
            let (x_len, y_len) = match order {
                MemoryOrder::Xyz => (z.nrows(), z.ncols()),
                MemoryOrder::Yxz => (z.ncols(), z.nrows()),
            };
            Ok((
                GridAxes::Vectors {
                    x: index_vector(x_len),
                    y: index_vector(y_len),
                },
                z.clone(),
            ))
        }
        [PlotArg::V(x), PlotArg::V(y), PlotArg::M(z)] => Ok((
            GridAxes::Vectors {
                x: x.clone(),
                y: y.clone(),
            },
            z.clone(),
        )),
        [PlotArg::M(xx), PlotArg::M(yy), PlotArg::M(z)] => {
            let canonical = |m: &DMatrix<f64>| match order {
                MemoryOrder::Xyz => m.transpose(),
                MemoryOrder::Yxz => m.clone(),
            };
            Ok((
                GridAxes::Matrices {
                    x: canonical(xx),
                    y: canonical(yy),
                },
                z.clone(),
            ))
        }
        _ => Err(UniplotError::BadValue(
            "field commands take (z), (x, y, z) with grid vectors, or (xx, yy, z) with grid matrices".into(),
        )),
    }
}

/// Pull the `memoryorder` keyword out of the argument list; remaining keyword
/// arguments are returned for item/axis routing.
fn split_memoryorder<'a>(
    kwargs: &'a KwArgs<'a>,
) -> UniResult<(MemoryOrder, Vec<(&'a str, PropValue)>)> {
    let mut order = MemoryOrder::default();
    let mut rest = Vec::with_capacity(kwargs.len());
    for (name, value) in kwargs {
        if *name == "memoryorder" {
            order = value.as_str(name)?.parse().map_err(|_| {
                UniplotError::BadValue(format!("{value:?} is not a legal memory order"))
            })?;
        } else {
            rest.push((*name, value.clone()));
        }
    }
    Ok((order, rest))
}

/// The command front end: session state plus the selected backend.
pub struct Plotter {
    session: Session,
    backend: Box<dyn Backend>,
    /// figure numbers already announced to the backend
    opened: BTreeSet<usize>,
}

impl Plotter {
    /// Create a plotter with the backend resolved from the environment, the
    /// layered config file or the built-in default.
    ///
    /// # Errors
    /// [`UniplotError::BackendUnavailable`] if the resolved backend name is
    /// not registered.
    pub fn new() -> UniResult<Self> {
        let config = Config::load(&[]);
        let backend = select_backend(None, &config)?;
        let mut session = Session::new();
        if let Ok(show) = config.get_bool("modes", "show") {
            session.set_show(show);
        }
        Ok(Self {
            session,
            backend,
            opened: BTreeSet::new(),
        })
    }

    /// Create a plotter with an explicitly named backend.
    ///
    /// # Errors
    /// [`UniplotError::BackendUnavailable`] for an unregistered name.
    pub fn with_backend(name: &str) -> UniResult<Self> {
        let config = Config::load(&[]);
        let backend = select_backend(Some(name), &config)?;
        Ok(Self {
            session: Session::new(),
            backend,
            opened: BTreeSet::new(),
        })
    }

    /// The session state.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable session access for scene inspection and direct mutation.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Name of the active backend.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Re-render the current figure through the backend. A no-op until a
    /// figure exists.
    ///
    /// # Errors
    /// [`UniplotError::Render`] if the backend fails as a whole.
    pub fn replot(&mut self) -> UniResult<()> {
        let num = self.session.current_figure();
        if let Some(figure) = self.session.gcf_ref() {
            self.backend.replot(num, figure)?;
        }
        Ok(())
    }

    /// Announce the current figure to the backend exactly once, whether it
    /// was created explicitly or implicitly.
    fn open_current_figure(&mut self) {
        let snapshot = self.session.gcf().clone();
        let num = self.session.current_figure();
        if self.opened.insert(num) {
            self.backend.figure_opened(num, &snapshot);
        }
    }

    fn maybe_replot(&mut self) -> UniResult<()> {
        if self.session.show() {
            self.replot()?;
        }
        Ok(())
    }

    /// Toggle rendering after scene mutations.
    pub fn set_show(&mut self, show: bool) {
        self.session.set_show(show);
    }

    // ---------------------------------------------------------------- curves

    fn add_curves(
        &mut self,
        args: &[PlotArg],
        kwargs: &KwArgs<'_>,
        with_z: bool,
        function: &str,
    ) -> UniResult<()> {
        let groups = parse_curve_groups(args, with_z)?;
        self.open_current_figure();
        {
            let axis = self.session.gca();
            let mut items = Vec::with_capacity(groups.len());
            for group in groups {
                let mut line = match group.z {
                    Some(z) => Line::new3(group.x, group.y, z)?,
                    None => Line::new(group.x, group.y)?,
                };
                line.style.function = function.to_owned();
                if let Some(fmt) = group.fmt {
                    line.style.apply_format(&fmt);
                }
                items.push(PlotItem::Line(line));
            }
            // staged on a copy so a failing command leaves the axis untouched
            let mut staged = axis.clone();
            staged.prepare_for_plot();
            route_kwargs(&mut staged, &mut items, kwargs)?;
            if with_z {
                staged.camera.set_view(3)?;
            }
            for item in items {
                staged.push_item(item);
            }
            *axis = staged;
        }
        self.maybe_replot()
    }

    /// Plot 2D curves: `plot(x, y, [fmt], ...)`; a single vector plots
    /// against its index.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for malformed argument groups or failing
    /// keyword options.
    pub fn plot(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_curves(args, kwargs, false, "plot")
    }

    /// Plot 3D space curves: `plot3(x, y, z, [fmt], ...)`.
    ///
    /// # Errors
    /// Same failure modes as [`Plotter::plot`].
    pub fn plot3(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_curves(args, kwargs, true, "plot3")
    }

    // -------------------------------------------------------------- surfaces

    fn add_surface(
        &mut self,
        args: &[PlotArg],
        kwargs: &KwArgs<'_>,
        wireframe: bool,
        with_contours: bool,
        three_d: bool,
        function: &str,
    ) -> UniResult<()> {
        let (order, rest) = split_memoryorder(kwargs)?;
        let (grid, z) = parse_field_args(args, order)?;
        self.open_current_figure();
        {
            let axis = self.session.gca();
            let mut surface = Surface::new(grid.clone(), z.clone(), order)?;
            surface.wireframe = wireframe;
            surface.style.function = function.to_owned();
            if with_contours {
                let mut contours = Contours::new(grid, z, order)?;
                contours.location = ContourLocation::Base;
                contours.style.function = function.to_owned();
                surface.set_contours(contours);
            }
            let mut items = vec![PlotItem::Surface(surface)];
            let mut staged = axis.clone();
            staged.prepare_for_plot();
            route_kwargs(&mut staged, &mut items, &rest)?;
            if three_d {
                staged.camera.set_view(3)?;
            }
            for item in items {
                staged.push_item(item);
            }
            *axis = staged;
        }
        self.maybe_replot()
    }

    /// Wireframe surface plot.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for malformed field arguments.
    pub fn mesh(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_surface(args, kwargs, true, false, true, "mesh")
    }

    /// Wireframe surface with contours projected to the base plane.
    ///
    /// # Errors
    /// Same failure modes as [`Plotter::mesh`].
    pub fn meshc(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_surface(args, kwargs, true, true, true, "meshc")
    }

    /// Solid surface plot.
    ///
    /// # Errors
    /// Same failure modes as [`Plotter::mesh`].
    pub fn surf(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_surface(args, kwargs, false, false, true, "surf")
    }

    /// Solid surface with contours projected to the base plane.
    ///
    /// # Errors
    /// Same failure modes as [`Plotter::mesh`].
    pub fn surfc(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_surface(args, kwargs, false, true, true, "surfc")
    }

    /// Top-down pseudocolor plot of a 2D field.
    ///
    /// # Errors
    /// Same failure modes as [`Plotter::mesh`].
    pub fn pcolor(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_surface(args, kwargs, false, false, false, "pcolor")
    }

    // -------------------------------------------------------------- contours

    fn add_contours(
        &mut self,
        args: &[PlotArg],
        kwargs: &KwArgs<'_>,
        location: ContourLocation,
        filled: bool,
        three_d: bool,
        function: &str,
    ) -> UniResult<()> {
        let (order, rest) = split_memoryorder(kwargs)?;
        // an optional trailing vector names explicit contour values
        let (field_args, explicit_cvector) = match args {
            [field @ .., PlotArg::V(cvector)] if field.len() >= 3 || field.len() == 1 => {
                if matches!(field.last(), Some(PlotArg::M(_))) {
                    (field, Some(cvector.iter().copied().collect::<Vec<f64>>()))
                } else {
                    (args, None)
                }
            }
            _ => (args, None),
        };
        let (grid, z) = parse_field_args(field_args, order)?;
        self.open_current_figure();
        {
            let axis = self.session.gca();
            let mut contours = Contours::new(grid, z, order)?;
            contours.location = location;
            contours.filled = filled;
            contours.style.function = function.to_owned();
            if let Some(cvector) = explicit_cvector {
                contours.set_cvector(cvector)?;
            }
            let mut rest_axis = Vec::new();
            for (name, value) in rest {
                match name {
                    "clevels" => {
                        #[allow(clippy::cast_sign_loss)]
                        contours.set_clevels(value.as_int(name)?.max(0) as usize)?;
                    }
                    "cvector" => contours.set_cvector(value.as_floats(name)?.to_vec())?,
                    "clabels" => contours.clabels = value.as_bool(name)?,
                    _ => rest_axis.push((name, value)),
                }
            }
            let mut items = vec![PlotItem::Contours(contours)];
            let mut staged = axis.clone();
            staged.prepare_for_plot();
            route_kwargs(&mut staged, &mut items, &rest_axis)?;
            if three_d {
                staged.camera.set_view(3)?;
            }
            for item in items {
                staged.push_item(item);
            }
            *axis = staged;
        }
        self.maybe_replot()
    }

    /// Contour lines of a 2D field, projected top-down.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for malformed field arguments or level
    /// specifications.
    pub fn contour(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_contours(args, kwargs, ContourLocation::Base, false, false, "contour")
    }

    /// Contour lines drawn at their height in a 3D view.
    ///
    /// # Errors
    /// Same failure modes as [`Plotter::contour`].
    pub fn contour3(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_contours(
            args,
            kwargs,
            ContourLocation::Surface,
            false,
            true,
            "contour3",
        )
    }

    /// Filled contour plot.
    ///
    /// # Errors
    /// Same failure modes as [`Plotter::contour`].
    pub fn contourf(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_contours(args, kwargs, ContourLocation::Base, true, false, "contourf")
    }

    // --------------------------------------------------------------- vectors

    fn vector_field_args(
        args: &[PlotArg],
        order: MemoryOrder,
    ) -> UniResult<(GridAxes, DMatrix<f64>, DMatrix<f64>, Option<f64>)> {
        // an optional trailing scalar is the arrowscale
        let (data, scale) = match args {
            [data @ .., PlotArg::N(scale)] => (data, Some(*scale)),
            _ => (args, None),
        };
        match data {
            [PlotArg::M(u), PlotArg::M(v)] => {
                let (x_len, y_len) = match order {
                    MemoryOrder::Xyz => (u.nrows(), u.ncols()),
                    MemoryOrder::Yxz => (u.ncols(), u.nrows()),
                };
                Ok((
                    GridAxes::Vectors {
                        x: index_vector(x_len),
                        y: index_vector(y_len),
                    },
                    u.clone(),
                    v.clone(),
                    scale,
                ))
            }
            [PlotArg::V(x), PlotArg::V(y), PlotArg::M(u), PlotArg::M(v)] => Ok((
                GridAxes::Vectors {
                    x: x.clone(),
                    y: y.clone(),
                },
                u.clone(),
                v.clone(),
                scale,
            )),
            [PlotArg::M(xx), PlotArg::M(yy), PlotArg::M(u), PlotArg::M(v)] => {
                let canonical = |m: &DMatrix<f64>| match order {
                    MemoryOrder::Xyz => m.transpose(),
                    MemoryOrder::Yxz => m.clone(),
                };
                Ok((
                    GridAxes::Matrices {
                        x: canonical(xx),
                        y: canonical(yy),
                    },
                    u.clone(),
                    v.clone(),
                    scale,
                ))
            }
            _ => Err(UniplotError::BadValue(
                "quiver takes (u, v) or (x, y, u, v), optionally followed by an arrow scale".into(),
            )),
        }
    }

    fn add_vectors(
        &mut self,
        args: &[PlotArg],
        kwargs: &KwArgs<'_>,
        w: Option<&DMatrix<f64>>,
        three_d: bool,
        function: &str,
    ) -> UniResult<()> {
        let (order, rest) = split_memoryorder(kwargs)?;
        let (grid, u, v, scale) = Self::vector_field_args(args, order)?;
        self.open_current_figure();
        {
            let axis = self.session.gca();
            let mut vectors = VelocityVectors::new(grid, u, v, order)?;
            if let Some(w) = w {
                vectors.set_w(w.clone(), order)?;
            }
            vectors.style.function = function.to_owned();
            if let Some(scale) = scale {
                if scale < 0.0 {
                    return Err(UniplotError::BadValue(format!(
                        "arrowscale must be non-negative, got {scale}"
                    )));
                }
                vectors.arrowscale = scale;
            }
            let mut rest_axis = Vec::new();
            for (name, value) in rest {
                match name {
                    "arrowscale" => vectors.arrowscale = value.as_float(name)?,
                    "filledarrows" => vectors.filledarrows = value.as_bool(name)?,
                    _ => rest_axis.push((name, value)),
                }
            }
            vectors.scale_vectors();
            let mut items = vec![PlotItem::VelocityVectors(vectors)];
            let mut staged = axis.clone();
            staged.prepare_for_plot();
            route_kwargs(&mut staged, &mut items, &rest_axis)?;
            if three_d {
                staged.camera.set_view(3)?;
            }
            for item in items {
                staged.push_item(item);
            }
            *axis = staged;
        }
        self.maybe_replot()
    }

    /// Vector-field arrow plot: `quiver(u, v)` or `quiver(x, y, u, v)`,
    /// optionally followed by an arrow scale (0 disables autoscaling).
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for malformed arguments.
    pub fn quiver(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_vectors(args, kwargs, None, false, "quiver")
    }

    /// 3D vector-field plot with explicit z components.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for malformed arguments or shape mismatch.
    pub fn quiver3(
        &mut self,
        args: &[PlotArg],
        w: &DMatrix<f64>,
        kwargs: &KwArgs<'_>,
    ) -> UniResult<()> {
        self.add_vectors(args, kwargs, Some(w), true, "quiver3")
    }

    // --------------------------------------------------------------- streams

    fn add_streams(
        &mut self,
        args: &[PlotArg],
        kwargs: &KwArgs<'_>,
        function: &str,
    ) -> UniResult<()> {
        let (order, rest) = split_memoryorder(kwargs)?;
        let [data @ .., PlotArg::V(startx), PlotArg::V(starty)] = args else {
            return Err(UniplotError::BadValue(
                "stream commands take the vector field followed by seed coordinate vectors".into(),
            ));
        };
        let (grid, u, v, _) = Self::vector_field_args(data, order)?;
        self.open_current_figure();
        {
            let axis = self.session.gca();
            let mut streams =
                Streams::new(grid, u, v, startx.clone(), starty.clone(), order)?;
            streams.style.function = function.to_owned();
            let mut rest_axis = Vec::new();
            let mut tube: Option<(usize, f64)> = None;
            let mut ribbon: Option<f64> = None;
            for (name, value) in rest {
                match name {
                    "n" => {
                        #[allow(clippy::cast_sign_loss)]
                        let n = value.as_int(name)?.max(0) as usize;
                        tube = Some((n, tube.map_or(1.0, |t| t.1)));
                    }
                    "tubescale" => {
                        let scale = value.as_float(name)?;
                        tube = Some((tube.map_or(10, |t| t.0), scale));
                    }
                    "ribbonwidth" => ribbon = Some(value.as_float(name)?),
                    _ => rest_axis.push((name, value)),
                }
            }
            match function {
                "streamtube" => {
                    let (n, scale) = tube.unwrap_or((10, 1.0));
                    streams.set_tubes(n, scale)?;
                }
                "streamribbon" => streams.set_ribbons(ribbon.unwrap_or(0.5))?,
                _ => {}
            }
            let mut items = vec![PlotItem::Streams(streams)];
            let mut staged = axis.clone();
            staged.prepare_for_plot();
            route_kwargs(&mut staged, &mut items, &rest_axis)?;
            staged.camera.set_view(3)?;
            for item in items {
                staged.push_item(item);
            }
            *axis = staged;
        }
        self.maybe_replot()
    }

    /// Field lines traced from seed points:
    /// `streamline(x, y, u, v, startx, starty)`.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for malformed arguments.
    pub fn streamline(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_streams(args, kwargs, "streamline")
    }

    /// Stream tubes (keyword arguments `n` and `tubescale`).
    ///
    /// # Errors
    /// Same failure modes as [`Plotter::streamline`].
    pub fn streamtube(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_streams(args, kwargs, "streamtube")
    }

    /// Stream ribbons (keyword argument `ribbonwidth`).
    ///
    /// # Errors
    /// Same failure modes as [`Plotter::streamline`].
    pub fn streamribbon(&mut self, args: &[PlotArg], kwargs: &KwArgs<'_>) -> UniResult<()> {
        self.add_streams(args, kwargs, "streamribbon")
    }

    // --------------------------------------------------------------- volumes

    fn add_volume(
        &mut self,
        field: VolumeField,
        mode: VolumeMode,
        kwargs: &KwArgs<'_>,
        function: &str,
    ) -> UniResult<()> {
        self.open_current_figure();
        {
            let axis = self.session.gca();
            let mut volume = Volume::new(field, mode)?;
            volume.style.function = function.to_owned();
            let mut items = vec![PlotItem::Volume(volume)];
            let mut staged = axis.clone();
            staged.prepare_for_plot();
            route_kwargs(&mut staged, &mut items, kwargs)?;
            staged.camera.set_view(3)?;
            for item in items {
                staged.push_item(item);
            }
            *axis = staged;
        }
        self.maybe_replot()
    }

    /// Axis-aligned pseudocolor slice planes of a 3D field.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for an empty slice set.
    pub fn slice_plot(
        &mut self,
        field: VolumeField,
        sx: Vec<f64>,
        sy: Vec<f64>,
        sz: Vec<f64>,
        kwargs: &KwArgs<'_>,
    ) -> UniResult<()> {
        self.add_volume(field, VolumeMode::Slices { sx, sy, sz }, kwargs, "slice")
    }

    /// Contour lines in axis-aligned slice planes of a 3D field.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for an empty slice set or degenerate level
    /// count.
    pub fn contourslice(
        &mut self,
        field: VolumeField,
        sx: Vec<f64>,
        sy: Vec<f64>,
        sz: Vec<f64>,
        kwargs: &KwArgs<'_>,
    ) -> UniResult<()> {
        let mut clevels = 8;
        let mut cvector = None;
        let mut rest = Vec::new();
        for (name, value) in kwargs {
            match *name {
                "clevels" => {
                    #[allow(clippy::cast_sign_loss)]
                    {
                        clevels = value.as_int(name)?.max(0) as usize;
                    }
                }
                "cvector" => cvector = Some(value.as_floats(name)?.to_vec()),
                _ => rest.push((*name, value.clone())),
            }
        }
        self.add_volume(
            field,
            VolumeMode::ContourSlices {
                sx,
                sy,
                sz,
                clevels,
                cvector,
            },
            &rest,
            "contourslice",
        )
    }

    /// Surface of constant scalar value in a 3D field.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for a non-finite isovalue.
    pub fn isosurface(
        &mut self,
        field: VolumeField,
        isovalue: f64,
        kwargs: &KwArgs<'_>,
    ) -> UniResult<()> {
        self.add_volume(
            field,
            VolumeMode::Isosurface { isovalue },
            kwargs,
            "isosurface",
        )
    }

    // --------------------------------------------------- axis/figure commands

    /// Set the current-axis title.
    ///
    /// # Errors
    /// Propagates backend render failures of the triggered replot.
    pub fn title(&mut self, title: &str) -> UniResult<()> {
        self.session.gca().title = title.to_owned();
        self.maybe_replot()
    }

    /// Set the x-axis label.
    ///
    /// # Errors
    /// Propagates backend render failures of the triggered replot.
    pub fn xlabel(&mut self, label: &str) -> UniResult<()> {
        self.session.gca().xlabel = label.to_owned();
        self.maybe_replot()
    }

    /// Set the y-axis label.
    ///
    /// # Errors
    /// Propagates backend render failures of the triggered replot.
    pub fn ylabel(&mut self, label: &str) -> UniResult<()> {
        self.session.gca().ylabel = label.to_owned();
        self.maybe_replot()
    }

    /// Set the z-axis label.
    ///
    /// # Errors
    /// Propagates backend render failures of the triggered replot.
    pub fn zlabel(&mut self, label: &str) -> UniResult<()> {
        self.session.gca().zlabel = label.to_owned();
        self.maybe_replot()
    }

    /// Set the figure-wide title above all subplot axes.
    ///
    /// # Errors
    /// Propagates backend render failures of the triggered replot.
    pub fn suptitle(&mut self, title: &str) -> UniResult<()> {
        self.session.gcf().suptitle = title.to_owned();
        self.maybe_replot()
    }

    /// The string form of the `axis` command (`equal`, `tight`, `off`, ...).
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for an unrecognized token.
    pub fn axis_str(&mut self, token: &str) -> UniResult<()> {
        self.session.gca().apply_token(token)?;
        self.maybe_replot()
    }

    /// The numeric form of the `axis` command: a 4- or 6-tuple of limits.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for any other tuple length.
    pub fn axis_limits(&mut self, limits: &[f64]) -> UniResult<()> {
        self.session.gca().set_limits(limits)?;
        self.maybe_replot()
    }

    /// `view(2)` or `view(3)`.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for any other value.
    pub fn view(&mut self, view: i64) -> UniResult<()> {
        self.session.gca().camera.set_view(view)?;
        self.maybe_replot()
    }

    /// `view(azimuth, elevation)`; implies a 3D view.
    ///
    /// # Errors
    /// Propagates backend render failures of the triggered replot.
    pub fn view_direction(&mut self, azimuth: f64, elevation: f64) -> UniResult<()> {
        self.session.gca().camera.set_direction(azimuth, elevation);
        self.maybe_replot()
    }

    /// Toggle grid lines.
    ///
    /// # Errors
    /// Propagates backend render failures of the triggered replot.
    pub fn grid(&mut self, on: bool) -> UniResult<()> {
        self.session.gca().grid_on = on;
        self.maybe_replot()
    }

    /// Toggle the axis box.
    ///
    /// # Errors
    /// Propagates backend render failures of the triggered replot.
    pub fn box_on(&mut self, on: bool) -> UniResult<()> {
        self.session.gca().box_on = on;
        self.maybe_replot()
    }

    /// Toggle hidden-line removal.
    ///
    /// # Errors
    /// Propagates backend render failures of the triggered replot.
    pub fn hidden(&mut self, on: bool) -> UniResult<()> {
        self.session.gca().hidden = on;
        self.maybe_replot()
    }

    /// Toggle the colorbar.
    ///
    /// # Errors
    /// Propagates backend render failures of the triggered replot.
    pub fn colorbar(&mut self, on: bool) -> UniResult<()> {
        self.session.gca().colorbar.visible = on;
        self.maybe_replot()
    }

    /// Select the active colormap by name.
    ///
    /// # Errors
    /// [`UniplotError::UnknownOption`] for an unregistered name.
    pub fn colormap(&mut self, name: &str) -> UniResult<()> {
        self.session.gca().set_named("colormap", name.into())?;
        self.maybe_replot()
    }

    /// Set an explicit pseudocolor range.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for a non-increasing range.
    pub fn caxis(&mut self, cmin: f64, cmax: f64) -> UniResult<()> {
        self.session.gca().set_named("caxis", (cmin, cmax).into())?;
        self.maybe_replot()
    }

    /// Return the pseudocolor range to automatic.
    ///
    /// # Errors
    /// Propagates backend render failures of the triggered replot.
    pub fn caxis_auto(&mut self) -> UniResult<()> {
        self.session.gca().caxis = None;
        self.maybe_replot()
    }

    /// Select surface shading (`faceted`, `flat`, `interp`).
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for an unrecognized mode.
    pub fn shading(&mut self, mode: &str) -> UniResult<()> {
        self.session.gca().set_named("shading", mode.into())?;
        self.maybe_replot()
    }

    /// Attach legends to the current axis's items, in creation order.
    ///
    /// # Errors
    /// Propagates backend render failures of the triggered replot.
    pub fn legend(&mut self, labels: &[&str]) -> UniResult<()> {
        {
            let axis = self.session.gca();
            for (item, label) in axis.items.iter_mut().zip(labels) {
                item.style_mut().legend = (*label).to_owned();
            }
        }
        self.maybe_replot()
    }

    /// Set the data aspect ratio.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for anything but three positive ratios.
    pub fn daspect(&mut self, ratios: &[f64]) -> UniResult<()> {
        self.session
            .gca()
            .set_named("daspect", ratios.to_vec().into())?;
        self.maybe_replot()
    }

    /// Toggle the current-axis hold flag.
    pub fn hold(&mut self, state: bool) {
        self.session.hold(state);
    }

    /// The string form of the `hold` command.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for anything but `on`/`off`.
    pub fn hold_str(&mut self, state: &str) -> UniResult<()> {
        match state {
            "on" => self.session.hold(true),
            "off" => self.session.hold(false),
            other => {
                return Err(UniplotError::BadValue(format!(
                    "hold takes on or off, got {other}"
                )))
            }
        }
        Ok(())
    }

    /// Select axis slot `p` in an `r x c` grid of the current figure.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for a slot outside the grid.
    pub fn subplot(&mut self, rows: usize, cols: usize, slot: usize) -> UniResult<()> {
        self.session.subplot(rows, cols, slot)?;
        self.open_current_figure();
        Ok(())
    }

    /// Create an axis at an explicit viewport.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for an unnormalized viewport.
    pub fn axes(&mut self, viewport: [f64; 4]) -> UniResult<()> {
        self.session.custom_axes(viewport)?;
        self.open_current_figure();
        Ok(())
    }

    /// Select (and create if needed) figure `num`.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for figure number 0.
    pub fn figure(&mut self, num: usize) -> UniResult<()> {
        self.session.figure(num)?;
        self.open_current_figure();
        Ok(())
    }

    /// Erase the current figure's content.
    ///
    /// # Errors
    /// Propagates backend render failures of the triggered replot.
    pub fn clf(&mut self) -> UniResult<()> {
        self.session.clf();
        self.maybe_replot()
    }

    /// Close figure `num`, releasing its backend resources.
    pub fn closefig(&mut self, num: usize) {
        self.session.closefig(num);
        self.opened.remove(&num);
        self.backend.figure_closed(num);
    }

    /// Close all figures.
    pub fn closefigs(&mut self) {
        let nums: Vec<usize> = self.session.figures().map(|(n, _)| n).collect();
        for num in nums {
            self.backend.figure_closed(num);
        }
        self.opened.clear();
        self.session.closefigs();
    }

    /// Export the current figure. A missing extension gets the backend's
    /// default; an extension outside the backend's supported set fails
    /// without touching the file system.
    ///
    /// # Errors
    /// [`UniplotError::NotImplemented`] for an unsupported extension,
    /// [`UniplotError::Render`] when the backend fails to write.
    pub fn hardcopy(&mut self, path: &Path) -> UniResult<()> {
        let path: PathBuf = if path.extension().is_none() {
            path.with_extension(self.backend.default_suffix())
        } else {
            path.to_path_buf()
        };
        let suffix = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !self.backend.supported_suffixes().contains(&suffix.as_str()) {
            return Err(UniplotError::NotImplemented(format!(
                "backend {} cannot export {suffix} files",
                self.backend.name()
            )));
        }
        let num = self.session.current_figure();
        let figure = self.session.gcf().clone();
        self.backend.hardcopy(num, &figure, &path)
    }
}

/// Route keyword arguments: options the item style knows are applied to every
/// new item, the rest goes to the axis. Failures abort with the offending
/// name.
fn route_kwargs(
    axis: &mut crate::scene::axis::Axis,
    items: &mut [PlotItem],
    kwargs: &KwArgs<'_>,
) -> UniResult<()> {
    for (name, value) in kwargs {
        let mut item_option = false;
        for item in items.iter_mut() {
            match item.style_mut().set_named(name, value.clone()) {
                Ok(()) => item_option = true,
                Err(UniplotError::UnknownOption(_)) => break,
                Err(other) => return Err(other),
            }
        }
        if !item_option {
            axis.set_named(name, value.clone())?;
        }
    }
    Ok(())
}
