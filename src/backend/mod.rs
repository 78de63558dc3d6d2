#![warn(missing_docs)]
//! The backend contract and the compile-time backend registry.
//!
//! A backend renders the scene model; it owns no scene state of its own
//! beyond per-figure rendering caches. Exactly one backend is selected at
//! session construction, resolved from the `UNIPLOT_BACKEND` environment
//! variable, the layered config file (`[modes] backend`) or the built-in
//! default, in that order.

pub mod plotters;
pub mod template;

use std::path::Path;

use crate::config::Config;
use crate::error::{UniResult, UniplotError};
use crate::scene::figure::Figure;

/// Environment variable naming the backend to use.
pub const BACKEND_ENV_VAR: &str = "UNIPLOT_BACKEND";

/// The scene-rendering contract every backend implements.
///
/// `replot` re-renders one figure from scratch; other figures are untouched.
/// Per-item feature gaps are logged and skipped inside `replot` so one
/// unsupported item never prevents others from rendering; `hardcopy` failures
/// are returned.
pub trait Backend {
    /// The registered name of this backend.
    fn name(&self) -> &'static str;

    /// Called when a figure is first selected; backends attach per-figure
    /// rendering handles here.
    fn figure_opened(&mut self, _num: usize, _figure: &Figure) {}

    /// Called when a figure is closed; releases its rendering resources.
    fn figure_closed(&mut self, _num: usize) {}

    /// Re-render figure `num` from scratch.
    ///
    /// # Errors
    /// [`UniplotError::Render`] when the engine layer fails as a whole.
    fn replot(&mut self, num: usize, figure: &Figure) -> UniResult<()>;

    /// Export figure `num` to `path`. The extension has already been checked
    /// against [`Backend::supported_suffixes`].
    ///
    /// # Errors
    /// [`UniplotError::Render`] when the engine layer fails.
    fn hardcopy(&mut self, num: usize, figure: &Figure, path: &Path) -> UniResult<()>;

    /// File extensions (without dot) this backend can export.
    fn supported_suffixes(&self) -> &'static [&'static str];

    /// Extension appended when a hardcopy path has none.
    fn default_suffix(&self) -> &'static str;
}

/// Construct a backend by its registered name.
///
/// # Errors
/// [`UniplotError::BackendUnavailable`] for an unregistered name.
pub fn backend_by_name(name: &str) -> UniResult<Box<dyn Backend>> {
    match name {
        "plotters" => Ok(Box::new(plotters::PlottersBackend::new())),
        "template" => Ok(Box::new(template::TemplateBackend::new())),
        _ => Err(UniplotError::BackendUnavailable(format!(
            "no backend named {name} is registered"
        ))),
    }
}

/// Resolve and construct the backend: an explicit name wins, then
/// `$UNIPLOT_BACKEND`, then the config file, then the default.
///
/// # Errors
/// [`UniplotError::BackendUnavailable`] if the resolved name is not
/// registered.
pub fn select_backend(explicit: Option<&str>, config: &Config) -> UniResult<Box<dyn Backend>> {
    let name = match explicit {
        Some(name) => name.to_owned(),
        None => match std::env::var(BACKEND_ENV_VAR) {
            Ok(name) if !name.is_empty() => name,
            _ => config
                .get_str("modes", "backend")
                .unwrap_or_else(|_| "plotters".to_owned()),
        },
    };
    backend_by_name(&name)
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn registry_knows_both_backends() {
        assert_eq!(backend_by_name("plotters").unwrap().name(), "plotters");
        assert_eq!(backend_by_name("template").unwrap().name(), "template");
        assert_matches!(
            backend_by_name("gnuplot").err(),
            Some(UniplotError::BackendUnavailable(_))
        );
    }
    #[test]
    fn explicit_name_wins_over_config() {
        let mut config = Config::defaults();
        config.merge_str("[modes]\nbackend = <str> template\n");
        let backend = select_backend(Some("plotters"), &config).unwrap();
        assert_eq!(backend.name(), "plotters");
    }
    #[test]
    fn config_supplies_fallback_name() {
        let mut config = Config::defaults();
        config.merge_str("[modes]\nbackend = <str> template\n");
        // only meaningful when the environment variable is unset
        if std::env::var(BACKEND_ENV_VAR).is_err() {
            let backend = select_backend(None, &config).unwrap();
            assert_eq!(backend.name(), "template");
        }
    }
}
