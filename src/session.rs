#![warn(missing_docs)]
//! The session: process-wide plotting state.
//!
//! A session owns an ordered mapping of figure numbers to [`Figure`]s, the
//! current-figure cursor and the global `show`/`interactive` flags. All
//! front-end commands mutate the scene through the session.

use std::collections::BTreeMap;

use crate::error::{UniResult, UniplotError};
use crate::scene::axis::Axis;
use crate::scene::figure::Figure;

/// Ordered figure store with a current-figure cursor.
///
/// Figure 1 is created implicitly on first access; closing a figure makes its
/// number reusable.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    figures: BTreeMap<usize, Figure>,
    current: usize,
    show: bool,
    /// interactive mode flag of the original front end; carried for backends
    /// that drive an event loop
    pub interactive: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            figures: BTreeMap::new(),
            current: 1,
            show: true,
            interactive: false,
        }
    }
}

impl Session {
    /// Create an empty session. The first figure materializes on first use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Global render-after-mutation flag.
    #[must_use]
    pub const fn show(&self) -> bool {
        self.show
    }

    /// Toggle rendering after scene mutations; turning it off batches
    /// mutations without re-rendering.
    pub fn set_show(&mut self, show: bool) {
        self.show = show;
    }

    /// Number of the current figure.
    #[must_use]
    pub const fn current_figure(&self) -> usize {
        self.current
    }

    /// All open figures with their numbers, in numeric order.
    pub fn figures(&self) -> impl Iterator<Item = (usize, &Figure)> {
        self.figures.iter().map(|(num, figure)| (*num, figure))
    }

    /// Select (and create if needed) figure `num`, making it current.
    ///
    /// # Errors
    /// [`UniplotError::BadValue`] for figure number 0.
    pub fn figure(&mut self, num: usize) -> UniResult<&mut Figure> {
        if num == 0 {
            return Err(UniplotError::BadValue(
                "figure numbers start at 1".into(),
            ));
        }
        self.current = num;
        Ok(self.figures.entry(num).or_default())
    }

    /// The current figure, created on first use.
    pub fn gcf(&mut self) -> &mut Figure {
        self.figures.entry(self.current).or_default()
    }

    /// Read-only view of the current figure, if it exists yet.
    #[must_use]
    pub fn gcf_ref(&self) -> Option<&Figure> {
        self.figures.get(&self.current)
    }

    /// The current axis of the current figure.
    pub fn gca(&mut self) -> &mut Axis {
        self.gcf().gca_mut()
    }

    /// `subplot(rows, cols, slot)` on the current figure.
    ///
    /// # Errors
    /// Propagates the grid checks of
    /// [`Figure::set_subplot_grid`].
    pub fn subplot(&mut self, rows: usize, cols: usize, slot: usize) -> UniResult<()> {
        self.gcf().set_subplot_grid(rows, cols, slot)
    }

    /// Create a custom-viewport axis on the current figure.
    ///
    /// # Errors
    /// Propagates the viewport checks of [`Figure::custom_axis`].
    pub fn custom_axes(&mut self, viewport: [f64; 4]) -> UniResult<()> {
        self.gcf().custom_axis(viewport)
    }

    /// Toggle the current-axis hold flag.
    pub fn hold(&mut self, state: bool) {
        self.gca().hold = state;
    }

    /// Erase the current figure's content, keeping its number.
    pub fn clf(&mut self) {
        self.gcf().clf();
    }

    /// Close figure `num`. Its number becomes reusable; when the current
    /// figure is closed the cursor moves to the lowest remaining figure (or
    /// back to 1).
    pub fn closefig(&mut self, num: usize) {
        self.figures.remove(&num);
        if self.current == num {
            self.current = self.figures.keys().next().copied().unwrap_or(1);
        }
    }

    /// Close all figures.
    pub fn closefigs(&mut self) {
        self.figures.clear();
        self.current = 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn first_figure_is_implicit() {
        let mut session = Session::new();
        assert_eq!(session.figures().count(), 0);
        session.gcf();
        assert_eq!(session.figures().count(), 1);
        assert_eq!(session.current_figure(), 1);
    }
    #[test]
    fn figure_switch_preserves_other_figures() {
        let mut session = Session::new();
        session.gca().title = "first".to_owned();
        session.figure(2).unwrap();
        session.gca().title = "second".to_owned();
        session.figure(1).unwrap();
        assert_eq!(session.gca().title, "first");
        let (_, fig2) = session.figures().nth(1).unwrap();
        assert_eq!(fig2.gca().title, "second");
    }
    #[test]
    fn figure_zero_is_rejected() {
        let mut session = Session::new();
        assert_matches!(session.figure(0), Err(UniplotError::BadValue(_)));
    }
    #[test]
    fn closefig_moves_cursor() {
        let mut session = Session::new();
        session.figure(1).unwrap();
        session.figure(2).unwrap();
        session.figure(3).unwrap();
        session.closefig(3);
        assert_eq!(session.current_figure(), 1);
        session.closefig(2);
        assert_eq!(session.figures().count(), 1);
        session.closefigs();
        assert_eq!(session.figures().count(), 0);
        assert_eq!(session.current_figure(), 1);
    }
    #[test]
    fn hold_toggles_current_axis() {
        let mut session = Session::new();
        session.hold(true);
        assert!(session.gca().hold);
        session.hold(false);
        assert!(!session.gca().hold);
    }
    #[test]
    fn subplot_delegates_to_current_figure() {
        let mut session = Session::new();
        session.subplot(2, 2, 3).unwrap();
        assert_eq!(session.gcf().grid(), (2, 2));
        assert_eq!(session.gcf().current_slot(), 3);
    }
}
