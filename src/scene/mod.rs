//! The scene object model: figures own axes, axes own plot items and a small
//! number of singleton sub-objects (camera, colorbar, lights, material).
//!
//! Scene objects are plain values. Mutation goes through typed setters or the
//! name-keyed [`Configurable`](crate::options::Configurable) surface; plot
//! items are never mutated after construction.

pub mod axis;
pub mod camera;
pub mod colorbar;
pub mod contours;
pub mod figure;
pub mod item;
pub mod light;
pub mod line;
pub mod material;
pub mod streams;
pub mod surface;
pub mod vectors;
pub mod volume;
