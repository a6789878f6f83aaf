//! Common utilities for physics visualizations
//!
//! This crate provides shared graphics setup, the 2D camera and the camera
//! uniform used by the simulation front-ends.

pub mod graphics;
pub mod camera;

pub use graphics::*;
pub use camera::*;
