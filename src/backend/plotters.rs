#![warn(missing_docs)]
//! The fully worked backend: renders the scene through the `plotters` crate.
//!
//! `replot` renders the figure from scratch into an in-memory [`RgbImage`]
//! kept per figure; `hardcopy` renders straight to file (bitmap formats
//! through `BitMapBackend`, `svg` through `SVGBackend`). Feature gaps (log
//! scales, isosurfaces, tube/ribbon streams, filled contours) are logged and
//! the affected item is skipped or degraded; rendering of the remaining items
//! continues.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::path::Path;

use image::RgbImage;
use itertools::izip;
use log::warn;
use nalgebra::DVector;
use plotters::{
    backend::{DrawingBackend, PixelFormat},
    chart::{ChartBuilder, ChartContext, SeriesLabelPosition},
    coord::{cartesian::Cartesian2d, ranged3d::Cartesian3d, types::RangedCoordf64, Shift},
    element::{Circle, Cross, PathElement, Polygon, Rectangle, TriangleMarker},
    prelude::{BitMapBackend, DrawingArea, IntoDrawingArea, SVGBackend},
    series::{DashedLineSeries, LineSeries},
    style::{Color as PlottersColor, IntoFont, RGBAColor, ShapeStyle, BLACK, WHITE},
};

use crate::backend::Backend;
use crate::error::{UniResult, UniplotError};
use crate::scene::axis::{Axis, Direction, Scale, Shading};
use crate::scene::contours::{ContourLocation, Contours};
use crate::scene::figure::Figure;
use crate::scene::item::{GridAxes, ItemStyle, PlotItem};
use crate::scene::line::Line;
use crate::scene::streams::{StreamMode, Streams};
use crate::scene::surface::Surface;
use crate::scene::vectors::VelocityVectors;
use crate::scene::volume::{Volume, VolumeMode};
use crate::style::{Color, LineStyle, Marker};
use crate::utils::contour::contour_segments;
use crate::utils::griddata::min_max_filter_nonfinite;
use crate::utils::streamline::trace_streamline;

/// Window size used when the figure does not specify one.
pub const DEFAULT_FIG_SIZE: (u32, u32) = (640, 480);

const COLOR_CYCLE: [Color; 7] = [
    Color::Blue,
    Color::Green,
    Color::Red,
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Black,
];

type Chart2d<'a, B> = ChartContext<'a, B, Cartesian2d<RangedCoordf64, RangedCoordf64>>;
type Chart3d<'a, B> =
    ChartContext<'a, B, Cartesian3d<RangedCoordf64, RangedCoordf64, RangedCoordf64>>;

/// Backend rendering through the `plotters` crate.
#[derive(Debug, Default)]
pub struct PlottersBackend {
    rendered: HashMap<usize, RgbImage>,
}

impl PlottersBackend {
    /// Create a plotters backend with an empty render cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last rendered image of a figure, if `replot` has run for it.
    #[must_use]
    pub fn rendered(&self, num: usize) -> Option<&RgbImage> {
        self.rendered.get(&num)
    }
}

impl Backend for PlottersBackend {
    fn name(&self) -> &'static str {
        "plotters"
    }

    fn figure_closed(&mut self, num: usize) {
        self.rendered.remove(&num);
    }

    fn replot(&mut self, num: usize, figure: &Figure) -> UniResult<()> {
        let fig_size = figure.size.unwrap_or(DEFAULT_FIG_SIZE);
        let mut image_buffer = vec![
            0;
            (fig_size.0 * fig_size.1) as usize
                * plotters::backend::RGBPixel::PIXEL_SIZE
        ];
        {
            let root = BitMapBackend::with_buffer(&mut image_buffer, fig_size).into_drawing_area();
            render_figure(&root, figure)?;
        }
        let img = RgbImage::from_raw(fig_size.0, fig_size.1, image_buffer)
            .ok_or_else(|| UniplotError::Other("image buffer size too small".into()))?;
        self.rendered.insert(num, img);
        Ok(())
    }

    fn hardcopy(&mut self, _num: usize, figure: &Figure, path: &Path) -> UniResult<()> {
        let fig_size = figure.size.unwrap_or(DEFAULT_FIG_SIZE);
        let suffix = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match suffix.as_str() {
            "png" | "jpg" | "jpeg" | "bmp" => {
                let root = BitMapBackend::new(path, fig_size).into_drawing_area();
                render_figure(&root, figure)
            }
            "svg" => {
                let root = SVGBackend::new(path, fig_size).into_drawing_area();
                render_figure(&root, figure)
            }
            _ => Err(UniplotError::Render(format!(
                "cannot export {suffix} files"
            ))),
        }
    }

    fn supported_suffixes(&self) -> &'static [&'static str] {
        &["png", "jpg", "jpeg", "bmp", "svg"]
    }
    fn default_suffix(&self) -> &'static str {
        "png"
    }
}

/// Render a whole figure onto a drawing area: viewport per axis, then the
/// axis content. Axes without plot items reserve no drawn area.
fn render_figure<B: DrawingBackend>(
    root: &DrawingArea<B, Shift>,
    figure: &Figure,
) -> UniResult<()> {
    let _ = root.fill(&WHITE);
    for (slot, axis) in figure.axes() {
        if axis.items.is_empty() {
            continue;
        }
        let area = viewport_area(root, figure.slot_viewport(slot));
        render_axis(&area, axis);
    }
    root.present()
        .map_err(|e| UniplotError::Render(format!("present failed: {e}")))?;
    Ok(())
}

/// Shrink the root area to a normalized viewport `[left, bottom, right, top]`.
fn viewport_area<B: DrawingBackend>(
    root: &DrawingArea<B, Shift>,
    viewport: [f64; 4],
) -> DrawingArea<B, Shift> {
    let (width, height) = root.dim_in_pixel();
    let [left, bottom, right, top] = viewport;
    #[allow(clippy::cast_possible_truncation)]
    root.margin(
        ((1.0 - top) * f64::from(height)) as u32,
        (bottom * f64::from(height)) as u32,
        (left * f64::from(width)) as u32,
        ((1.0 - right) * f64::from(width)) as u32,
    )
}

fn render_axis<B: DrawingBackend>(area: &DrawingArea<B, Shift>, axis: &Axis) {
    if axis.scale != Scale::Linear {
        warn!("log axis scales are not supported by the plotters backend, rendering linear");
    }
    let area = if axis.colorbar.visible {
        if let Some(range) = color_range(axis) {
            let (width, _) = area.dim_in_pixel();
            let (main, cbar) = area.split_horizontally(width.saturating_sub(110));
            draw_colorbar(&cbar, axis, range);
            main
        } else {
            area.clone()
        }
    } else {
        area.clone()
    };
    if axis.needs_3d() {
        render_axis_3d(&area, axis);
    } else {
        render_axis_2d(&area, axis);
    }
}

fn render_axis_2d<B: DrawingBackend>(area: &DrawingArea<B, Shift>, axis: &Axis) {
    let bounds = Bounds::of_axis(axis);
    let (x_range, mut y_range) = (bounds.x_range(), bounds.y_range());
    if axis.direction == Direction::Ij {
        y_range = y_range.end..y_range.start;
    }
    let mut builder = ChartBuilder::on(area);
    builder.margin(10).set_all_label_area_size(40);
    if !axis.title.is_empty() {
        builder.caption(&axis.title, ("sans-serif", 20).into_font());
    }
    let Ok(mut chart) = builder.build_cartesian_2d(x_range, y_range) else {
        warn!("could not build 2d chart, skipping axis");
        return;
    };
    {
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(5).y_labels(5);
        mesh.x_desc(&axis.xlabel).y_desc(&axis.ylabel);
        if !axis.grid_on {
            mesh.disable_mesh();
        }
        if !axis.visible {
            mesh.disable_x_axis();
            mesh.disable_y_axis();
        }
        let _ = mesh.draw();
    }
    let mut label_flag = false;
    for (index, item) in axis.sorted_items().into_iter().enumerate() {
        match item {
            PlotItem::Line(line) => {
                label_flag |= add_line_2d(&mut chart, line, index);
            }
            PlotItem::Surface(surface) => add_surface_2d(&mut chart, surface, axis),
            PlotItem::Contours(contours) => add_contours_2d(&mut chart, contours, axis),
            PlotItem::VelocityVectors(vectors) => add_vectors_2d(&mut chart, vectors, index),
            PlotItem::Streams(_) | PlotItem::Volume(_) => {
                // unreachable under needs_3d, kept for robustness
                warn!("volumetric items need a 3d view, skipping");
            }
        }
    }
    if label_flag {
        let _ = chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(BLACK.mix(0.05))
            .border_style(BLACK)
            .label_font(("sans-serif", 15).into_font())
            .draw();
    }
}

fn render_axis_3d<B: DrawingBackend>(area: &DrawingArea<B, Shift>, axis: &Axis) {
    let bounds = Bounds::of_axis(axis);
    let mut builder = ChartBuilder::on(area);
    builder.margin(10).set_all_label_area_size(60);
    if !axis.title.is_empty() {
        builder.caption(&axis.title, ("sans-serif", 20).into_font());
    }
    // plotters 3d charts have y going up, data z is mapped onto it
    let Ok(mut chart) =
        builder.build_cartesian_3d(bounds.x_range(), bounds.z_range(), bounds.y_range())
    else {
        warn!("could not build 3d chart, skipping axis");
        return;
    };
    let azimuth = axis.camera.azimuth.unwrap_or(-37.5);
    let elevation = axis.camera.elevation.unwrap_or(30.0);
    chart.with_projection(|mut pb| {
        pb.yaw = azimuth / 180. * PI;
        pb.pitch = elevation / 180. * PI;
        pb.scale = 0.8;
        pb.into_matrix()
    });
    if axis.visible {
        let _ = chart.configure_axes().draw();
    }
    for (index, item) in axis.sorted_items().into_iter().enumerate() {
        match item {
            PlotItem::Line(line) => add_line_3d(&mut chart, line, index),
            PlotItem::Surface(surface) => add_surface_3d(&mut chart, surface, axis),
            PlotItem::Contours(contours) => add_contours_3d(&mut chart, contours, axis),
            PlotItem::VelocityVectors(vectors) => add_vectors_3d(&mut chart, vectors, index),
            PlotItem::Streams(streams) => add_streams_3d(&mut chart, streams, index),
            PlotItem::Volume(volume) => add_volume_3d(&mut chart, volume, axis),
        }
    }
}

fn line_color(style: &ItemStyle, index: usize) -> RGBAColor {
    style
        .linecolor
        .unwrap_or(COLOR_CYCLE[index % COLOR_CYCLE.len()])
        .rgba()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn stroke(style: &ItemStyle, color: RGBAColor) -> ShapeStyle {
    Into::<ShapeStyle>::into(color).stroke_width(style.linewidth.round().max(1.0) as u32)
}

fn draw_styled_path_2d<B: DrawingBackend>(
    chart: &mut Chart2d<'_, B>,
    points: Vec<(f64, f64)>,
    style: &ItemStyle,
    color: RGBAColor,
) {
    let shape = stroke(style, color);
    match style.linetype.unwrap_or(LineStyle::Solid) {
        LineStyle::Solid => {
            chart.draw_series(LineSeries::new(points, shape)).unwrap();
        }
        LineStyle::Dashed => {
            chart
                .draw_series(DashedLineSeries::new(points, 10, 6, shape))
                .unwrap();
        }
        LineStyle::DashDot => {
            chart
                .draw_series(DashedLineSeries::new(points, 8, 4, shape))
                .unwrap();
        }
        LineStyle::Dotted => {
            chart
                .draw_series(DashedLineSeries::new(points, 2, 4, shape))
                .unwrap();
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_markers_2d<B: DrawingBackend>(
    chart: &mut Chart2d<'_, B>,
    points: &[(f64, f64)],
    marker: Marker,
    style: &ItemStyle,
    color: RGBAColor,
) {
    let size = (3.0 * style.pointsize).round().max(1.0) as u32;
    let shape = Into::<ShapeStyle>::into(color).filled();
    match marker {
        Marker::Point | Marker::Circle => {
            chart
                .draw_series(points.iter().map(|p| Circle::new(*p, size, shape)))
                .unwrap();
        }
        Marker::Cross | Marker::Plus | Marker::Star => {
            chart
                .draw_series(points.iter().map(|p| Cross::new(*p, size, shape)))
                .unwrap();
        }
        Marker::TriangleUp | Marker::TriangleDown | Marker::TriangleLeft | Marker::TriangleRight => {
            chart
                .draw_series(points.iter().map(|p| TriangleMarker::new(*p, size, shape)))
                .unwrap();
        }
        // no native polygon markers in plotters, round markers stand in
        Marker::Square | Marker::Diamond | Marker::Pentagram | Marker::Hexagram => {
            chart
                .draw_series(points.iter().map(|p| Circle::new(*p, size, shape)))
                .unwrap();
        }
    }
}

fn add_line_2d<B: DrawingBackend>(
    chart: &mut Chart2d<'_, B>,
    line: &Line,
    index: usize,
) -> bool {
    let color = line_color(&line.style, index);
    let points: Vec<(f64, f64)> = izip!(&line.x, &line.y).map(|(x, y)| (*x, *y)).collect();
    // marker-only format strings suppress the connecting line
    let draw_connecting = line.style.linetype.is_some() || line.style.linemarker.is_none();
    if draw_connecting {
        draw_styled_path_2d(chart, points.clone(), &line.style, color);
    }
    if let Some(marker) = line.style.linemarker {
        draw_markers_2d(chart, &points, marker, &line.style, color);
    }
    if line.style.legend.is_empty() {
        false
    } else {
        let anno = chart
            .draw_series(LineSeries::new(std::iter::empty::<(f64, f64)>(), color))
            .unwrap();
        let label_color = RGBAColor(color.0, color.1, color.2, 1.).stroke_width(4);
        anno.label(&line.style.legend)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], label_color));
        true
    }
}

/// Pseudocolor rendering of a surface seen top-down (`pcolor`); adapted cell
/// centers with half-spacing extents.
fn add_surface_2d<B: DrawingBackend>(chart: &mut Chart2d<'_, B>, surface: &Surface, axis: &Axis) {
    let Ok(gradient) = axis.colormap.try_gradient() else {
        warn!("colormap {} is not realizable, skipping surface", axis.colormap);
        return;
    };
    let cdata = surface.cdata.as_ref().unwrap_or(&surface.z);
    let Some((c_min, c_max)) = caxis_range(axis, cdata.iter()) else {
        warn!("surface has no finite color data, skipping");
        return;
    };
    let span = (c_max - c_min).max(f64::EPSILON);
    let (x_ax, y_ax) = surface.grid.axis_vectors();
    let (rows, cols) = surface.z.shape();
    let mut rect_vec = Vec::<Rectangle<(f64, f64)>>::with_capacity(rows * cols);
    for y_idx in 0..rows {
        let y_center = y_ax[y_idx];
        let y_dist = if y_idx == rows - 1 {
            y_ax[y_idx] - y_ax[y_idx.saturating_sub(1)]
        } else {
            y_ax[y_idx + 1] - y_center
        };
        for x_idx in 0..cols {
            let x_center = x_ax[x_idx];
            let x_dist = if x_idx == cols - 1 {
                x_ax[x_idx] - x_ax[x_idx.saturating_sub(1)]
            } else {
                x_ax[x_idx + 1] - x_center
            };
            let cor = gradient.eval_continuous((cdata[(y_idx, x_idx)] - c_min) / span);
            let color = RGBAColor(cor.r, cor.g, cor.b, 1.);
            rect_vec.push(Rectangle::new(
                [
                    (x_center - x_dist / 2., y_center + y_dist / 2.),
                    (x_center + x_dist / 2., y_center - y_dist / 2.),
                ],
                Into::<ShapeStyle>::into(color).filled(),
            ));
        }
    }
    chart.draw_series(rect_vec).unwrap();
    if let Some(contours) = &surface.contours {
        add_contours_2d(chart, contours, axis);
    }
}

fn contour_color(
    axis: &Axis,
    level: f64,
    levels: &[f64],
    style: &ItemStyle,
) -> RGBAColor {
    if let Some(color) = style.linecolor {
        return color.rgba();
    }
    let Some(gradient) = axis.colormap.gradient() else {
        return BLACK.to_rgba();
    };
    let (lo, hi) = (
        levels.first().copied().unwrap_or(0.0),
        levels.last().copied().unwrap_or(1.0),
    );
    let span = (hi - lo).max(f64::EPSILON);
    let cor = gradient.eval_continuous((level - lo) / span);
    RGBAColor(cor.r, cor.g, cor.b, 1.)
}

fn add_contours_2d<B: DrawingBackend>(
    chart: &mut Chart2d<'_, B>,
    contours: &Contours,
    axis: &Axis,
) {
    if contours.filled {
        warn!("filled contours are not supported by the plotters backend, drawing lines");
    }
    if contours.clabels {
        warn!("contour labels are not supported by the plotters backend");
    }
    let (x_ax, y_ax) = contours.grid.axis_vectors();
    let levels = contours.levels();
    for level in &levels {
        let color = contour_color(axis, *level, &levels, &contours.style);
        let shape = stroke(&contours.style, color);
        let segments = contour_segments(&x_ax, &y_ax, &contours.z, *level);
        chart
            .draw_series(
                segments
                    .into_iter()
                    .map(|(a, b)| PathElement::new(vec![a, b], shape)),
            )
            .unwrap();
    }
}

fn add_vectors_2d<B: DrawingBackend>(
    chart: &mut Chart2d<'_, B>,
    vectors: &VelocityVectors,
    index: usize,
) {
    let color = line_color(&vectors.style, index);
    let shape = stroke(&vectors.style, color);
    let (x_ax, y_ax) = vectors.grid.axis_vectors();
    let mut arrows = Vec::new();
    for (y_idx, y) in y_ax.iter().enumerate() {
        for (x_idx, x) in x_ax.iter().enumerate() {
            let (u, v) = (vectors.u[(y_idx, x_idx)], vectors.v[(y_idx, x_idx)]);
            if !u.is_finite() || !v.is_finite() {
                continue;
            }
            let tip = (x + u, y + v);
            arrows.push(PathElement::new(vec![(*x, *y), tip], shape));
            // arrow head as two short back-strokes
            let len = u.hypot(v);
            if len > 0.0 {
                let (hx, hy) = (u / len * 0.2 * len, v / len * 0.2 * len);
                let left = (tip.0 - hx + hy * 0.5, tip.1 - hy - hx * 0.5);
                let right = (tip.0 - hx - hy * 0.5, tip.1 - hy + hx * 0.5);
                arrows.push(PathElement::new(vec![left, tip, right], shape));
            }
        }
    }
    chart.draw_series(arrows).unwrap();
}

fn add_line_3d<B: DrawingBackend>(chart: &mut Chart3d<'_, B>, line: &Line, index: usize) {
    let color = line_color(&line.style, index);
    let z_default = DVector::zeros(line.x.len());
    let z = line.z.as_ref().unwrap_or(&z_default);
    chart
        .draw_series(LineSeries::new(
            izip!(&line.x, &line.y, z).map(|(x, y, z)| (*x, *z, *y)),
            stroke(&line.style, color),
        ))
        .unwrap();
}

fn add_surface_3d<B: DrawingBackend>(chart: &mut Chart3d<'_, B>, surface: &Surface, axis: &Axis) {
    let (x_ax, y_ax) = surface.grid.axis_vectors();
    let (rows, cols) = surface.z.shape();
    let cdata = surface.cdata.as_ref().unwrap_or(&surface.z);
    let gradient = axis.colormap.gradient();
    let color_bounds = caxis_range(axis, cdata.iter());
    let wireframe = surface.wireframe || axis.shading == Shading::Faceted;
    for y_idx in 0..rows.saturating_sub(1) {
        for x_idx in 0..cols.saturating_sub(1) {
            let quad = vec![
                (x_ax[x_idx], surface.z[(y_idx, x_idx)], y_ax[y_idx]),
                (x_ax[x_idx + 1], surface.z[(y_idx, x_idx + 1)], y_ax[y_idx]),
                (
                    x_ax[x_idx + 1],
                    surface.z[(y_idx + 1, x_idx + 1)],
                    y_ax[y_idx + 1],
                ),
                (x_ax[x_idx], surface.z[(y_idx + 1, x_idx)], y_ax[y_idx + 1]),
            ];
            if quad.iter().any(|(_, z, _)| !z.is_finite()) {
                continue;
            }
            if !surface.wireframe {
                let color = match (gradient, color_bounds) {
                    (Some(gradient), Some((c_min, c_max))) => {
                        let span = (c_max - c_min).max(f64::EPSILON);
                        let cor = gradient
                            .eval_continuous((cdata[(y_idx, x_idx)] - c_min) / span);
                        RGBAColor(cor.r, cor.g, cor.b, 1.)
                    }
                    _ => RGBAColor(160, 160, 160, 1.),
                };
                let face = RGBAColor(color.0, color.1, color.2, axis.material.opacity);
                chart
                    .draw_series(std::iter::once(Polygon::new(
                        quad.clone(),
                        Into::<ShapeStyle>::into(face).filled(),
                    )))
                    .unwrap();
            }
            if wireframe {
                let mut outline = quad;
                outline.push(outline[0]);
                chart
                    .draw_series(std::iter::once(PathElement::new(
                        outline,
                        stroke(&surface.style, line_color(&surface.style, 6)),
                    )))
                    .unwrap();
            }
        }
    }
    if let Some(contours) = &surface.contours {
        add_contours_3d(chart, contours, axis);
    }
}

fn add_contours_3d<B: DrawingBackend>(
    chart: &mut Chart3d<'_, B>,
    contours: &Contours,
    axis: &Axis,
) {
    let (x_ax, y_ax) = contours.grid.axis_vectors();
    let base = min_max_filter_nonfinite(contours.z.iter()).map_or(0.0, |(zmin, _)| zmin);
    let levels = contours.levels();
    for level in &levels {
        let color = contour_color(axis, *level, &levels, &contours.style);
        let shape = stroke(&contours.style, color);
        let height = match contours.location {
            ContourLocation::Surface => *level,
            ContourLocation::Base => base,
        };
        let segments = contour_segments(&x_ax, &y_ax, &contours.z, *level);
        chart
            .draw_series(segments.into_iter().map(|((x1, y1), (x2, y2))| {
                PathElement::new(vec![(x1, height, y1), (x2, height, y2)], shape)
            }))
            .unwrap();
    }
}

fn add_vectors_3d<B: DrawingBackend>(
    chart: &mut Chart3d<'_, B>,
    vectors: &VelocityVectors,
    index: usize,
) {
    let color = line_color(&vectors.style, index);
    let shape = stroke(&vectors.style, color);
    let (x_ax, y_ax) = vectors.grid.axis_vectors();
    let mut arrows = Vec::new();
    for (y_idx, y) in y_ax.iter().enumerate() {
        for (x_idx, x) in x_ax.iter().enumerate() {
            let (u, v) = (vectors.u[(y_idx, x_idx)], vectors.v[(y_idx, x_idx)]);
            let w = vectors.w.as_ref().map_or(0.0, |w| w[(y_idx, x_idx)]);
            if !u.is_finite() || !v.is_finite() || !w.is_finite() {
                continue;
            }
            arrows.push(PathElement::new(
                vec![(*x, 0.0, *y), (x + u, w, y + v)],
                shape,
            ));
        }
    }
    chart.draw_series(arrows).unwrap();
}

fn add_streams_3d<B: DrawingBackend>(
    chart: &mut Chart3d<'_, B>,
    streams: &Streams,
    index: usize,
) {
    match streams.mode {
        StreamMode::Lines => {}
        StreamMode::Tubes { .. } => {
            warn!("stream tubes are not supported by the plotters backend, drawing lines");
        }
        StreamMode::Ribbons { .. } => {
            warn!("stream ribbons are not supported by the plotters backend, drawing lines");
        }
    }
    let color = line_color(&streams.style, index);
    let shape = stroke(&streams.style, color);
    let (x_ax, y_ax) = streams.grid.axis_vectors();
    for (seed_x, seed_y) in izip!(&streams.startx, &streams.starty) {
        let line = trace_streamline(&x_ax, &y_ax, &streams.u, &streams.v, *seed_x, *seed_y);
        if line.len() < 2 {
            continue;
        }
        chart
            .draw_series(LineSeries::new(
                line.into_iter().map(|(x, y)| (x, 0.0, y)),
                shape,
            ))
            .unwrap();
    }
}

fn add_volume_3d<B: DrawingBackend>(chart: &mut Chart3d<'_, B>, volume: &Volume, axis: &Axis) {
    match &volume.mode {
        VolumeMode::Isosurface { .. } => {
            warn!("isosurfaces are not supported by the plotters backend, skipping item");
        }
        VolumeMode::Slices { sx, sy, sz } => {
            if !sx.is_empty() || !sy.is_empty() {
                warn!("only z slice planes are supported by the plotters backend");
            }
            for z_coord in sz {
                draw_z_slice(chart, volume, axis, *z_coord);
            }
        }
        VolumeMode::ContourSlices {
            sx,
            sy,
            sz,
            clevels,
            cvector,
        } => {
            if !sx.is_empty() || !sy.is_empty() {
                warn!("only z slice planes are supported by the plotters backend");
            }
            for z_coord in sz {
                draw_z_contour_slice(chart, volume, axis, *z_coord, *clevels, cvector.as_deref());
            }
        }
    }
}

fn nearest_index(ax: &DVector<f64>, value: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (idx, v) in ax.iter().enumerate() {
        let dist = (v - value).abs();
        if dist < best_dist {
            best = idx;
            best_dist = dist;
        }
    }
    best
}

fn slice_matrix(volume: &Volume, z_coord: f64) -> (DVector<f64>, DVector<f64>, nalgebra::DMatrix<f64>, f64) {
    let iz = nearest_index(&volume.field.z, z_coord);
    let plane = volume.field.z_plane(iz);
    let (nx, ny, _) = volume.field.dims();
    let values = nalgebra::DMatrix::from_fn(ny, nx, |iy, ix| plane[iy][ix]);
    (
        volume.field.x.clone(),
        volume.field.y.clone(),
        values,
        volume.field.z[iz],
    )
}

fn draw_z_slice<B: DrawingBackend>(
    chart: &mut Chart3d<'_, B>,
    volume: &Volume,
    axis: &Axis,
    z_coord: f64,
) {
    let Ok(gradient) = axis.colormap.try_gradient() else {
        warn!("colormap {} is not realizable, skipping slice", axis.colormap);
        return;
    };
    let (x_ax, y_ax, values, z_at) = slice_matrix(volume, z_coord);
    let Some((c_min, c_max)) = caxis_range(axis, volume.field.values().iter()) else {
        warn!("volume has no finite data, skipping slice");
        return;
    };
    let span = (c_max - c_min).max(f64::EPSILON);
    for y_idx in 0..y_ax.len().saturating_sub(1) {
        for x_idx in 0..x_ax.len().saturating_sub(1) {
            let cor = gradient.eval_continuous((values[(y_idx, x_idx)] - c_min) / span);
            let color = RGBAColor(cor.r, cor.g, cor.b, axis.material.opacity);
            chart
                .draw_series(std::iter::once(Polygon::new(
                    vec![
                        (x_ax[x_idx], z_at, y_ax[y_idx]),
                        (x_ax[x_idx + 1], z_at, y_ax[y_idx]),
                        (x_ax[x_idx + 1], z_at, y_ax[y_idx + 1]),
                        (x_ax[x_idx], z_at, y_ax[y_idx + 1]),
                    ],
                    Into::<ShapeStyle>::into(color).filled(),
                )))
                .unwrap();
        }
    }
}

fn draw_z_contour_slice<B: DrawingBackend>(
    chart: &mut Chart3d<'_, B>,
    volume: &Volume,
    axis: &Axis,
    z_coord: f64,
    clevels: usize,
    cvector: Option<&[f64]>,
) {
    let (x_ax, y_ax, values, z_at) = slice_matrix(volume, z_coord);
    let levels: Vec<f64> = if let Some(cvector) = cvector {
        cvector.to_vec()
    } else {
        let Some((v_min, v_max)) = min_max_filter_nonfinite(values.iter()) else {
            return;
        };
        crate::utils::contour::auto_levels(v_min, v_max, clevels)
    };
    for level in &levels {
        let color = contour_color(axis, *level, &levels, &volume.style);
        let shape = stroke(&volume.style, color);
        let segments = contour_segments(&x_ax, &y_ax, &values, *level);
        chart
            .draw_series(segments.into_iter().map(|((x1, y1), (x2, y2))| {
                PathElement::new(vec![(x1, z_at, y1), (x2, z_at, y2)], shape)
            }))
            .unwrap();
    }
}

/// Pseudocolor range of an axis: the explicit `caxis` range or the min/max of
/// the given values.
fn caxis_range<'a, I: IntoIterator<Item = &'a f64>>(axis: &Axis, values: I) -> Option<(f64, f64)> {
    axis.caxis.or_else(|| min_max_filter_nonfinite(values))
}

fn color_range(axis: &Axis) -> Option<(f64, f64)> {
    if let Some(range) = axis.caxis {
        return Some(range);
    }
    let mut all: Vec<f64> = Vec::new();
    for item in &axis.items {
        match item {
            PlotItem::Surface(surface) => {
                all.extend(surface.cdata.as_ref().unwrap_or(&surface.z).iter());
            }
            PlotItem::Contours(contours) => all.extend(contours.z.iter()),
            PlotItem::Volume(volume) => all.extend(volume.field.values()),
            _ => {}
        }
    }
    min_max_filter_nonfinite(all.iter())
}

/// Vertical colormap strip with the value range along its y axis.
fn draw_colorbar<B: DrawingBackend>(area: &DrawingArea<B, Shift>, axis: &Axis, range: (f64, f64)) {
    let Ok(gradient) = axis.colormap.try_gradient() else {
        warn!("colormap {} is not realizable, skipping colorbar", axis.colormap);
        return;
    };
    let (c_min, c_max) = range;
    let mut builder = ChartBuilder::on(area);
    builder
        .margin(10)
        .set_label_area_size(plotters::chart::LabelAreaPosition::Right, 50);
    if !axis.colorbar.title.is_empty() {
        builder.caption(&axis.colorbar.title, ("sans-serif", 15).into_font());
    }
    let Ok(mut chart) = builder.build_cartesian_2d(0.0..1.0, c_min..c_max) else {
        warn!("could not build colorbar chart");
        return;
    };
    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_x_axis().disable_mesh().y_labels(5);
        let _ = mesh.draw();
    }
    const STEPS: usize = 64;
    let span = c_max - c_min;
    #[allow(clippy::cast_precision_loss)]
    let rects = (0..STEPS).map(|i| {
        let lo = c_min + span * i as f64 / STEPS as f64;
        let hi = c_min + span * (i + 1) as f64 / STEPS as f64;
        let cor = gradient.eval_continuous(i as f64 / (STEPS - 1) as f64);
        Rectangle::new(
            [(0.0, lo), (1.0, hi)],
            Into::<ShapeStyle>::into(RGBAColor(cor.r, cor.g, cor.b, 1.)).filled(),
        )
    });
    chart.draw_series(rects).unwrap();
}

/// Data bounds of an axis, merged over all items and overridden by explicit
/// axis limits. Degenerate ranges are widened so chart construction never
/// sees an empty range.
#[derive(Debug, Clone, Copy, Default)]
struct Bounds {
    x: Option<(f64, f64)>,
    y: Option<(f64, f64)>,
    z: Option<(f64, f64)>,
}

fn merge(bound: &mut Option<(f64, f64)>, min: f64, max: f64) {
    if !min.is_finite() || !max.is_finite() {
        return;
    }
    *bound = Some(match bound {
        Some((lo, hi)) => (lo.min(min), hi.max(max)),
        None => (min, max),
    });
}

fn widen(range: Option<(f64, f64)>, fallback: (f64, f64)) -> std::ops::Range<f64> {
    let (mut lo, mut hi) = range.unwrap_or(fallback);
    if lo >= hi {
        lo -= 0.5;
        hi += 0.5;
    }
    lo..hi
}

impl Bounds {
    fn of_axis(axis: &Axis) -> Self {
        let mut bounds = Self::default();
        for item in &axis.items {
            bounds.include(item);
        }
        // explicit limits override autoscaling per bound
        let limits = &axis.limits;
        if let (Some(xmin), Some(xmax)) = (limits.xmin, limits.xmax) {
            bounds.x = Some((xmin, xmax));
        }
        if let (Some(ymin), Some(ymax)) = (limits.ymin, limits.ymax) {
            bounds.y = Some((ymin, ymax));
        }
        if let (Some(zmin), Some(zmax)) = (limits.zmin, limits.zmax) {
            bounds.z = Some((zmin, zmax));
        }
        bounds
    }

    fn include(&mut self, item: &PlotItem) {
        match item {
            PlotItem::Line(line) => {
                if let Some((min, max)) = min_max_filter_nonfinite(line.x.iter()) {
                    merge(&mut self.x, min, max);
                }
                if let Some((min, max)) = min_max_filter_nonfinite(line.y.iter()) {
                    merge(&mut self.y, min, max);
                }
                if let Some(z) = &line.z {
                    if let Some((min, max)) = min_max_filter_nonfinite(z.iter()) {
                        merge(&mut self.z, min, max);
                    }
                }
            }
            PlotItem::Surface(surface) => {
                self.include_grid(&surface.grid);
                if let Some((min, max)) = min_max_filter_nonfinite(surface.z.iter()) {
                    merge(&mut self.z, min, max);
                }
            }
            PlotItem::Contours(contours) => {
                self.include_grid(&contours.grid);
                if let Some((min, max)) = min_max_filter_nonfinite(contours.z.iter()) {
                    merge(&mut self.z, min, max);
                }
            }
            PlotItem::VelocityVectors(vectors) => {
                self.include_grid(&vectors.grid);
                merge(&mut self.z, 0.0, 0.0);
            }
            PlotItem::Streams(streams) => {
                self.include_grid(&streams.grid);
                merge(&mut self.z, 0.0, 0.0);
            }
            PlotItem::Volume(volume) => {
                if let Some((min, max)) = min_max_filter_nonfinite(volume.field.x.iter()) {
                    merge(&mut self.x, min, max);
                }
                if let Some((min, max)) = min_max_filter_nonfinite(volume.field.y.iter()) {
                    merge(&mut self.y, min, max);
                }
                if let Some((min, max)) = min_max_filter_nonfinite(volume.field.z.iter()) {
                    merge(&mut self.z, min, max);
                }
            }
        }
    }

    fn include_grid(&mut self, grid: &GridAxes) {
        let (x_ax, y_ax) = grid.axis_vectors();
        if let Some((min, max)) = min_max_filter_nonfinite(x_ax.iter()) {
            merge(&mut self.x, min, max);
        }
        if let Some((min, max)) = min_max_filter_nonfinite(y_ax.iter()) {
            merge(&mut self.y, min, max);
        }
    }

    fn x_range(&self) -> std::ops::Range<f64> {
        widen(self.x, (0.0, 1.0))
    }
    fn y_range(&self) -> std::ops::Range<f64> {
        widen(self.y, (0.0, 1.0))
    }
    fn z_range(&self) -> std::ops::Range<f64> {
        widen(self.z, (0.0, 1.0))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::scene::item::MemoryOrder;
    use nalgebra::DMatrix;

    fn line_figure() -> Figure {
        let mut figure = Figure::new();
        let line = Line::new(
            DVector::from_vec(vec![1., 2., 3.]),
            DVector::from_vec(vec![4., 5., 4.]),
        )
        .unwrap();
        figure.gca_mut().push_item(PlotItem::Line(line));
        figure
    }

    #[test]
    fn replot_caches_an_image_of_figure_size() {
        let mut backend = PlottersBackend::new();
        let mut figure = line_figure();
        figure.size = Some((100, 80));
        backend.replot(1, &figure).unwrap();
        let img = backend.rendered(1).unwrap();
        assert_eq!((img.width(), img.height()), (100, 80));
        backend.figure_closed(1);
        assert!(backend.rendered(1).is_none());
    }
    #[test]
    fn replot_is_deterministic() {
        let mut backend = PlottersBackend::new();
        let mut figure = line_figure();
        figure.size = Some((120, 90));
        backend.replot(1, &figure).unwrap();
        let first = backend.rendered(1).unwrap().clone();
        backend.replot(1, &figure).unwrap();
        assert_eq!(backend.rendered(1).unwrap().as_raw(), first.as_raw());
    }
    #[test]
    fn empty_axes_reserve_no_area() {
        let mut backend = PlottersBackend::new();
        let mut figure = Figure::new();
        figure.set_subplot_grid(1, 2, 1).unwrap();
        let line = Line::new(
            DVector::from_vec(vec![0., 1.]),
            DVector::from_vec(vec![0., 1.]),
        )
        .unwrap();
        figure.gca_mut().push_item(PlotItem::Line(line));
        figure.set_subplot_grid(1, 2, 2).unwrap();
        // slot 2 stays empty, replot must not error
        figure.size = Some((100, 50));
        backend.replot(1, &figure).unwrap();
    }
    #[test]
    fn surface_and_contours_render_in_3d() {
        let mut backend = PlottersBackend::new();
        let mut figure = Figure::new();
        let grid = GridAxes::Vectors {
            x: DVector::from_vec(vec![0., 1., 2.]),
            y: DVector::from_vec(vec![0., 1., 2.]),
        };
        let z = DMatrix::from_fn(3, 3, |r, c| (r * c) as f64);
        let mut surface = Surface::new(grid.clone(), z.clone(), MemoryOrder::Yxz).unwrap();
        let contours = Contours::new(grid, z, MemoryOrder::Yxz).unwrap();
        surface.set_contours(contours);
        let axis = figure.gca_mut();
        axis.camera.set_view(3).unwrap();
        axis.push_item(PlotItem::Surface(surface));
        figure.size = Some((120, 120));
        backend.replot(1, &figure).unwrap();
    }
    #[test]
    fn unsupported_hardcopy_extension_fails() {
        let mut backend = PlottersBackend::new();
        let figure = line_figure();
        assert!(backend
            .hardcopy(1, &figure, Path::new("out.xyz"))
            .is_err());
    }
    #[test]
    fn bounds_widen_degenerate_ranges() {
        let range = widen(Some((2.0, 2.0)), (0.0, 1.0));
        assert!(range.start < range.end);
        let range = widen(None, (0.0, 1.0));
        assert_eq!(range, 0.0..1.0);
    }
}
