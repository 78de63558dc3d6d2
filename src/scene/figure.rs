#![warn(missing_docs)]
//! The figure: a top-level output surface containing one or more axes.

use std::collections::BTreeMap;

use crate::error::{UniResult, UniplotError};
use crate::options::{unknown_option, Configurable, PropValue};
use crate::scene::axis::Axis;

/// A top-level output surface. Axes live in numbered slots of a regular
/// `rows x cols` grid (or at explicit viewports); slot numbers are 1-based and
/// row-major.
///
/// Invariant: `rows * cols` is never smaller than the largest created slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// window size `(width, height)` in pixels; `None` uses the backend
    /// default
    pub size: Option<(u32, u32)>,
    axes: BTreeMap<usize, Axis>,
    grid: (usize, usize),
    current: usize,
    /// caption placed on hardcopies of the whole figure
    pub suptitle: String,
}

impl Default for Figure {
    fn default() -> Self {
        let mut axes = BTreeMap::new();
        axes.insert(1, Axis::new());
        Self {
            size: None,
            axes,
            grid: (1, 1),
            current: 1,
            suptitle: String::new(),
        }
    }
}

impl Figure {
    /// Create a figure with a single default axis in slot 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The axis-grid shape `(rows, cols)`.
    #[must_use]
    pub const fn grid(&self) -> (usize, usize) {
        self.grid
    }

    /// Slot number of the current axis.
    #[must_use]
    pub const fn current_slot(&self) -> usize {
        self.current
    }

    /// All occupied slots with their axes, in slot order.
    pub fn axes(&self) -> impl Iterator<Item = (usize, &Axis)> {
        self.axes.iter().map(|(slot, axis)| (*slot, axis))
    }

    /// The current axis.
    ///
    /// # Panics
    /// Never panics; the current slot always exists.
    #[must_use]
    pub fn gca(&self) -> &Axis {
        &self.axes[&self.current]
    }

    /// Mutable access to the current axis.
    pub fn gca_mut(&mut self) -> &mut Axis {
        self.axes
            .entry(self.current)
            .or_insert_with(Axis::new)
    }

    /// Select axis slot `p` in an `r x c` grid, creating it with default state
    /// if needed. A shape change discards every existing axis and creates slot
    /// `p` only; other slots stay empty until referenced.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for a degenerate grid or a slot outside it.
    pub fn set_subplot_grid(&mut self, rows: usize, cols: usize, slot: usize) -> UniResult<()> {
        if rows == 0 || cols == 0 {
            return Err(UniplotError::BadValue(format!(
                "subplot grid must be non-degenerate, got ({rows}, {cols})"
            )));
        }
        if slot == 0 || slot > rows * cols {
            return Err(UniplotError::BadValue(format!(
                "subplot slot {slot} is outside the {rows}x{cols} grid"
            )));
        }
        if self.grid != (rows, cols) {
            self.axes.clear();
            self.grid = (rows, cols);
        }
        self.axes.entry(slot).or_insert_with(Axis::new);
        self.current = slot;
        Ok(())
    }

    /// Create an axis at an explicit viewport `[left, bottom, right, top]` and
    /// make it current. The grid is widened so the slot invariant holds.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for an unnormalized or inverted viewport.
    pub fn custom_axis(&mut self, viewport: [f64; 4]) -> UniResult<()> {
        let [left, bottom, right, top] = viewport;
        if !(left < right && bottom < top) || viewport.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(UniplotError::BadValue(format!(
                "viewport must be normalized and ordered, got {viewport:?}"
            )));
        }
        let slot = self.axes.keys().max().copied().unwrap_or(0) + 1;
        let mut axis = Axis::new();
        axis.viewport = Some(viewport);
        self.axes.insert(slot, axis);
        self.grid = (1, slot);
        self.current = slot;
        Ok(())
    }

    /// Erase all axes and plot items but keep the figure itself: one default
    /// axis in a `1x1` grid remains.
    pub fn clf(&mut self) {
        self.axes.clear();
        self.axes.insert(1, Axis::new());
        self.grid = (1, 1);
        self.current = 1;
        self.suptitle.clear();
    }

    /// Derive the viewport of a grid slot in normalized figure coordinates
    /// (row-major, row 1 at the top).
    #[must_use]
    pub fn slot_viewport(&self, slot: usize) -> [f64; 4] {
        if let Some(viewport) = self.axes.get(&slot).and_then(|a| a.viewport) {
            return viewport;
        }
        let (rows, cols) = self.grid;
        #[allow(clippy::cast_precision_loss)]
        let (width, height) = (1.0 / cols as f64, 1.0 / rows as f64);
        let row = (slot - 1) / cols;
        let col = (slot - 1) % cols;
        #[allow(clippy::cast_precision_loss)]
        let left = col as f64 * width;
        #[allow(clippy::cast_precision_loss)]
        let top = 1.0 - row as f64 * height;
        [left, top - height, left + width, top]
    }
}

impl Configurable for Figure {
    fn set_named(&mut self, name: &str, value: PropValue) -> UniResult<()> {
        match name {
            "size" => {
                let (width, height) = value.as_pair(name)?;
                if width < 1.0 || height < 1.0 {
                    return Err(UniplotError::BadValue(format!(
                        "figure size must be positive, got ({width}, {height})"
                    )));
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    self.size = Some((width as u32, height as u32));
                }
            }
            "suptitle" => self.suptitle = value.as_str(name)?.to_owned(),
            _ => return Err(unknown_option("figure", name)),
        }
        Ok(())
    }

    fn get_named(&self, name: &str) -> UniResult<PropValue> {
        match name {
            "size" => Ok(self
                .size
                .map_or(PropValue::Pair(0.0, 0.0), |(w, h)| {
                    PropValue::Pair(f64::from(w), f64::from(h))
                })),
            "suptitle" => Ok(PropValue::Str(self.suptitle.clone())),
            _ => Err(unknown_option("figure", name)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    #[test]
    fn new_figure_has_one_default_axis() {
        let figure = Figure::new();
        assert_eq!(figure.grid(), (1, 1));
        assert_eq!(figure.current_slot(), 1);
        assert_eq!(figure.axes().count(), 1);
    }
    #[test]
    fn subplot_reshape_discards_axes() {
        let mut figure = Figure::new();
        figure.gca_mut().title = "old".to_owned();
        figure.set_subplot_grid(2, 2, 1).unwrap();
        assert_eq!(figure.grid(), (2, 2));
        assert!(figure.gca().title.is_empty());
        figure.set_subplot_grid(2, 2, 4).unwrap();
        assert_eq!(figure.axes().count(), 2);
        assert_eq!(figure.current_slot(), 4);
        // same shape keeps existing axes
        figure.set_subplot_grid(2, 2, 1).unwrap();
        assert_eq!(figure.axes().count(), 2);
    }
    #[test]
    fn subplot_slot_is_bounded() {
        let mut figure = Figure::new();
        assert_matches!(
            figure.set_subplot_grid(2, 2, 5),
            Err(UniplotError::BadValue(_))
        );
        assert_matches!(
            figure.set_subplot_grid(0, 2, 1),
            Err(UniplotError::BadValue(_))
        );
    }
    #[test]
    fn custom_axis_keeps_slot_invariant() {
        let mut figure = Figure::new();
        figure.custom_axis([0.1, 0.1, 0.5, 0.5]).unwrap();
        let (rows, cols) = figure.grid();
        assert!(rows * cols >= figure.current_slot());
        assert_eq!(figure.gca().viewport, Some([0.1, 0.1, 0.5, 0.5]));
        assert_matches!(
            figure.custom_axis([0.5, 0.1, 0.1, 0.5]),
            Err(UniplotError::BadValue(_))
        );
    }
    #[test]
    fn clf_restores_single_axis() {
        let mut figure = Figure::new();
        figure.set_subplot_grid(2, 3, 5).unwrap();
        figure.suptitle = "caption".to_owned();
        figure.clf();
        assert_eq!(figure.grid(), (1, 1));
        assert_eq!(figure.axes().count(), 1);
        assert!(figure.suptitle.is_empty());
    }
    #[test]
    fn slot_viewports_tile_the_figure() {
        let mut figure = Figure::new();
        figure.set_subplot_grid(2, 2, 1).unwrap();
        let [left, bottom, right, top] = figure.slot_viewport(1);
        assert_relative_eq!(left, 0.0);
        assert_relative_eq!(bottom, 0.5);
        assert_relative_eq!(right, 0.5);
        assert_relative_eq!(top, 1.0);
        let [left, bottom, right, top] = figure.slot_viewport(4);
        assert_relative_eq!(left, 0.5);
        assert_relative_eq!(bottom, 0.0);
        assert_relative_eq!(right, 1.0);
        assert_relative_eq!(top, 0.5);
    }
    #[test]
    fn size_round_trip() {
        let mut figure = Figure::new();
        figure.set_named("size", (640.0, 480.0).into()).unwrap();
        assert_eq!(figure.size, Some((640, 480)));
        assert_matches!(
            figure.set_named("size", (0.0, 480.0).into()),
            Err(UniplotError::BadValue(_))
        );
    }
}
