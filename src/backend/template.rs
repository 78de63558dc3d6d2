#![warn(missing_docs)]
//! The template backend: renders nothing, logs every contract call.
//!
//! Serves as the skeleton for new backend implementations and as the silent
//! backend of the test-suite.

use std::path::Path;

use log::debug;

use crate::backend::Backend;
use crate::error::UniResult;
use crate::scene::figure::Figure;

/// A backend that performs no rendering. Every contract call is logged at
/// debug level and counted.
#[derive(Debug, Default)]
pub struct TemplateBackend {
    /// number of completed `replot` calls
    pub replot_count: usize,
    /// number of completed `hardcopy` calls
    pub hardcopy_count: usize,
}

impl TemplateBackend {
    /// Create a template backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for TemplateBackend {
    fn name(&self) -> &'static str {
        "template"
    }
    fn figure_opened(&mut self, num: usize, _figure: &Figure) {
        debug!("template backend: figure {num} opened");
    }
    fn figure_closed(&mut self, num: usize) {
        debug!("template backend: figure {num} closed");
    }
    fn replot(&mut self, num: usize, figure: &Figure) -> UniResult<()> {
        debug!(
            "template backend: replot of figure {num} with {} axes",
            figure.axes().count()
        );
        self.replot_count += 1;
        Ok(())
    }
    fn hardcopy(&mut self, num: usize, _figure: &Figure, path: &Path) -> UniResult<()> {
        debug!(
            "template backend: hardcopy of figure {num} to {}",
            path.display()
        );
        self.hardcopy_count += 1;
        Ok(())
    }
    fn supported_suffixes(&self) -> &'static [&'static str] {
        // every extension is "supported" since nothing is written
        &[
            "ps", "eps", "pdf", "png", "jpg", "svg", "gif", "tif", "bmp", "pnm",
        ]
    }
    fn default_suffix(&self) -> &'static str {
        "ps"
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn calls_are_counted() {
        let mut backend = TemplateBackend::new();
        let figure = Figure::new();
        backend.figure_opened(1, &figure);
        backend.replot(1, &figure).unwrap();
        backend.replot(1, &figure).unwrap();
        backend
            .hardcopy(1, &figure, Path::new("out.ps"))
            .unwrap();
        backend.figure_closed(1);
        assert_eq!(backend.replot_count, 2);
        assert_eq!(backend.hardcopy_count, 1);
    }
}
