//! Numerical helper routines shared by the scene model and the backends.

pub mod contour;
pub mod griddata;
pub mod streamline;
pub mod test_helper;
