//! Double-Slit Experiment Visualization
//!
//! An animation engine for the classic two-slit experiment:
//!
//! - **Detector off**: a drifting interference pattern on the screen, with
//!   optional wavefronts travelling from the slits
//! - **Detector on**: discrete particles passing through a known slit and
//!   leaving impact dots, with no interference
//!
//! The engine draws against the [`surface::Surface`] trait and is driven by
//! explicit time steps, so every frame is a pure function of the frame index
//! and the experiment switches.

pub mod apparatus;
pub mod config;
pub mod engine;
pub mod equations_ui;
pub mod error;
pub mod interference;
pub mod particles;
pub mod renderer;
pub mod scheduler;
pub mod surface;

pub use config::SceneConfig;
pub use engine::{AnimationState, DoubleSlitEngine, ExperimentConfig, FrameReport, RenderMode};
pub use error::{ConfigError, EngineError};
pub use surface::{Color, CommandBuffer, DrawCommand, Rect, Surface};

/// Apparatus geometry in surface units (y grows downward)
pub mod layout {
    /// Particles are emitted here
    pub const SOURCE_X: f32 = 30.0;
    /// Horizontal span covered by one particle pass before wrapping
    pub const PARTICLE_TRAVEL: f32 = 400.0;
    /// Particles at or beyond this x are no longer drawn
    pub const PARTICLE_CUTOFF_X: f32 = 420.0;

    pub const BARRIER_X: f32 = 150.0;
    pub const BARRIER_WIDTH: f32 = 20.0;
    pub const BARRIER_TOP: f32 = 50.0;
    pub const BARRIER_BOTTOM: f32 = 250.0;
    /// Opening between the two barrier halves
    pub const SLIT_GAP_TOP: f32 = 130.0;
    pub const SLIT_GAP_BOTTOM: f32 = 170.0;

    /// Particle path heights through each slit
    pub const UPPER_SLIT_Y: f32 = 130.0;
    pub const LOWER_SLIT_Y: f32 = 180.0;

    pub const SCREEN_X: f32 = 400.0;
    pub const SCREEN_WIDTH: f32 = 10.0;
    pub const SCREEN_TOP: f32 = 50.0;
    pub const SCREEN_BOTTOM: f32 = 250.0;
    pub const SCREEN_CENTER_Y: f32 = 150.0;

    /// Fringe strip painted over the screen
    pub const FRINGE_X: f32 = 410.0;
    /// Impact dots are drawn on this line
    pub const IMPACT_X: f32 = 410.0;
    /// A particle past this x has hit the screen
    pub const IMPACT_THRESHOLD_X: f32 = 380.0;
}
