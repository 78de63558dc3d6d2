//! **uniplot** — a backend-independent, MATLAB-style plotting layer.
//!
//! The crate keeps a complete scene model of every figure ([`scene`]): axes,
//! curves, surfaces, contours, vector fields, stream items and volume items,
//! with their styling, camera and colormap state. The command front end
//! ([`plotter::Plotter`]) mutates that model with the familiar MATLAB
//! vocabulary (`plot`, `surf`, `contour`, `quiver`, `subplot`, `hold`,
//! `hardcopy`, ...) and asks the selected [`backend`] to re-render the
//! affected figure. Backends are interchangeable because the scene model
//! carries everything a renderer needs; switching backends never changes
//! scene state.
//!
//! ```no_run
//! use uniplot::plotter::Plotter;
//!
//! # fn main() -> Result<(), uniplot::error::UniplotError> {
//! let mut plotter = Plotter::new()?;
//! let x: Vec<f64> = (0..100).map(|i| f64::from(i) * 0.1).collect();
//! let y: Vec<f64> = x.iter().map(|x| x.sin()).collect();
//! plotter.plot(&[x.into(), y.into(), "b-".into()], &[("title", "sine".into())])?;
//! plotter.hardcopy(std::path::Path::new("sine.png"))?;
//! # Ok(())
//! # }
//! ```
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod colormap;
pub mod config;
pub mod error;
pub mod movie;
pub mod options;
pub mod plotter;
pub mod scene;
pub mod session;
pub mod style;
pub mod utils;

pub use error::{UniResult, UniplotError};
pub use plotter::{PlotArg, Plotter};
pub use session::Session;
