//! Animation loop and lifecycle control
//!
//! The engine owns the animation state and an optional surface slot. The host
//! toggles the experiment flags at will and feeds elapsed time through
//! [`DoubleSlitEngine::advance`]; every due tick redraws the whole scene from
//! the frame index and the flags as they are at that moment.

use crate::apparatus::render_apparatus;
use crate::config::SceneConfig;
use crate::error::EngineError;
use crate::interference::render_interference_pattern;
use crate::particles::render_particle_pattern;
use crate::scheduler::RecurringTimer;
use crate::surface::{CommandBuffer, Surface};
use std::time::Duration;

/// Experiment switches controlled by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExperimentConfig {
    /// Observe which slit each particle goes through
    pub detector_enabled: bool,
    /// Draw wavefronts between slits and screen in wave mode
    pub wave_overlay_enabled: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationState {
    /// Index of the next frame to render
    pub frame_index: u64,
    pub running: bool,
}

/// Which visualization a tick produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Particles,
    Interference,
}

impl RenderMode {
    pub fn label(self) -> &'static str {
        match self {
            RenderMode::Particles => "Particles (which-path known)",
            RenderMode::Interference => "Interference",
        }
    }
}

/// Summary of one rendered tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub mode: RenderMode,
}

/// Double-slit animation engine
pub struct DoubleSlitEngine<S: Surface> {
    surface: Option<S>,
    scene: SceneConfig,
    config: ExperimentConfig,
    state: AnimationState,
    timer: RecurringTimer,
    last_frame: Option<FrameReport>,
}

impl DoubleSlitEngine<CommandBuffer> {
    /// Engine drawing into a fresh [`CommandBuffer`] sized from `scene`
    pub fn recording(scene: SceneConfig) -> Self {
        let buffer = CommandBuffer::new(scene.width, scene.height);
        Self::with_surface(buffer, scene)
    }
}

impl<S: Surface> DoubleSlitEngine<S> {
    /// Engine without a surface; lifecycle calls are declined until one is attached.
    ///
    /// `scene` is taken as given: an invalid one is logged, not rejected, and
    /// the renderers stay panic-free on degenerate values.
    pub fn new(scene: SceneConfig) -> Self {
        if let Err(err) = scene.validate() {
            log::warn!("Engine built from an invalid scene config: {}", err);
        }
        Self {
            surface: None,
            scene,
            config: ExperimentConfig::default(),
            state: AnimationState::default(),
            timer: RecurringTimer::new(),
            last_frame: None,
        }
    }

    pub fn with_surface(surface: S, scene: SceneConfig) -> Self {
        let mut engine = Self::new(scene);
        engine.attach_surface(surface);
        engine
    }

    /// Attach a surface and draw the static apparatus on it.
    ///
    /// Returns the previously attached surface, if any.
    pub fn attach_surface(&mut self, surface: S) -> Option<S> {
        let previous = self.surface.replace(surface);
        self.redraw_apparatus();
        previous
    }

    /// Detach the surface, stopping the animation first.
    pub fn detach_surface(&mut self) -> Option<S> {
        if self.state.running {
            self.halt();
            log::info!("Surface detached; experiment stopped");
        }
        self.surface.take()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    pub fn config(&self) -> ExperimentConfig {
        self.config
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn last_frame(&self) -> Option<FrameReport> {
        self.last_frame
    }

    /// Start the experiment from frame 0, restarting it if already running.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.surface.is_none() {
            log::warn!("Cannot start double-slit experiment: no surface attached");
            return Err(EngineError::NoSurface);
        }

        if self.state.running {
            log::debug!("Restarting experiment at frame {}", self.state.frame_index);
            self.halt();
        }

        self.state = AnimationState {
            frame_index: 0,
            running: true,
        };
        self.last_frame = None;
        self.redraw_apparatus();
        self.timer.schedule(self.scene.tick_interval());

        log::info!(
            "Double-slit experiment started (detector {}, wave overlay {})",
            on_off(self.config.detector_enabled),
            on_off(self.config.wave_overlay_enabled)
        );
        Ok(())
    }

    /// Stop the experiment and leave only the apparatus on the surface.
    ///
    /// No tick renders after this returns. Stopping a stopped engine only
    /// redraws the apparatus.
    pub fn stop(&mut self) {
        if self.state.running {
            log::info!("Double-slit experiment stopped after {} frames", self.state.frame_index);
        }
        self.halt();
        if !self.redraw_apparatus() {
            log::warn!("Stopped without a surface; nothing redrawn");
        }
    }

    pub fn set_detector_enabled(&mut self, enabled: bool) {
        if self.config.detector_enabled == enabled {
            return;
        }
        self.config.detector_enabled = enabled;
        log::debug!("Detector {}", on_off(enabled));

        // Wipe the previous mode right away; the next tick draws the new one
        if self.state.running {
            self.redraw_apparatus();
        }
    }

    pub fn set_wave_overlay_enabled(&mut self, enabled: bool) {
        if self.config.wave_overlay_enabled != enabled {
            log::debug!("Wave overlay {}", on_off(enabled));
        }
        self.config.wave_overlay_enabled = enabled;
    }

    /// Let `elapsed` time pass and render every tick that became due.
    ///
    /// Returns the number of frames rendered.
    pub fn advance(&mut self, elapsed: Duration) -> Result<u32, EngineError> {
        if !self.state.running {
            return Ok(0);
        }

        let due = self.timer.advance(elapsed, self.scene.max_catch_up_ticks);
        let mut rendered = 0;
        for _ in 0..due {
            if self.tick()?.is_some() {
                rendered += 1;
            }
        }
        Ok(rendered)
    }

    /// Produce one frame. A stopped engine renders nothing.
    pub fn tick(&mut self) -> Result<Option<FrameReport>, EngineError> {
        if !self.state.running {
            return Ok(None);
        }
        let surface = self.surface.as_mut().ok_or(EngineError::NoSurface)?;

        let frame_index = self.state.frame_index;
        surface.clear();
        render_apparatus(surface);

        let mode = if self.config.detector_enabled {
            render_particle_pattern(surface, frame_index, &self.scene);
            RenderMode::Particles
        } else {
            render_interference_pattern(
                surface,
                frame_index,
                self.config.wave_overlay_enabled,
                &self.scene,
            );
            RenderMode::Interference
        };

        self.state.frame_index += 1;
        let report = FrameReport { frame_index, mode };
        self.last_frame = Some(report);
        log::trace!("Rendered frame {} ({:?})", frame_index, mode);
        Ok(Some(report))
    }

    fn halt(&mut self) {
        if let Some(handle) = self.timer.active_handle() {
            self.timer.cancel(handle);
        }
        self.state = AnimationState::default();
    }

    fn redraw_apparatus(&mut self) -> bool {
        match self.surface.as_mut() {
            Some(surface) => {
                surface.clear();
                render_apparatus(surface);
                true
            }
            None => false,
        }
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DrawCommand;

    const TICK: Duration = Duration::from_millis(50);

    fn apparatus_only() -> Vec<DrawCommand> {
        let mut buffer = CommandBuffer::new(500.0, 300.0);
        render_apparatus(&mut buffer);
        buffer.commands().to_vec()
    }

    #[test]
    fn start_draws_apparatus_immediately() {
        let mut engine = DoubleSlitEngine::recording(SceneConfig::default());
        engine.start().unwrap();

        let state = engine.state();
        assert!(state.running);
        assert_eq!(state.frame_index, 0);
        assert_eq!(engine.surface().unwrap().commands(), apparatus_only().as_slice());
    }

    #[test]
    fn start_without_surface_is_declined() {
        let mut engine: DoubleSlitEngine<CommandBuffer> =
            DoubleSlitEngine::new(SceneConfig::default());
        assert_eq!(engine.start(), Err(EngineError::NoSurface));
        assert_eq!(engine.state(), AnimationState::default());
        assert_eq!(engine.advance(Duration::from_secs(1)), Ok(0));
    }

    #[test]
    fn tick_when_stopped_is_noop() {
        let mut engine = DoubleSlitEngine::recording(SceneConfig::default());
        let issued = engine.surface().unwrap().issued();
        assert_eq!(engine.tick(), Ok(None));
        assert_eq!(engine.surface().unwrap().issued(), issued);
    }

    #[test]
    fn first_tick_waits_one_interval() {
        let mut engine = DoubleSlitEngine::recording(SceneConfig::default());
        engine.start().unwrap();
        assert_eq!(engine.advance(Duration::from_millis(30)), Ok(0));
        assert_eq!(engine.advance(Duration::from_millis(20)), Ok(1));
        assert_eq!(engine.last_frame().map(|f| f.frame_index), Some(0));
    }

    #[test]
    fn catch_up_is_bounded() {
        let scene = SceneConfig {
            max_catch_up_ticks: 3,
            ..SceneConfig::default()
        };
        let mut engine = DoubleSlitEngine::recording(scene);
        engine.start().unwrap();
        assert_eq!(engine.advance(TICK * 10), Ok(3));
        assert_eq!(engine.state().frame_index, 3);
    }

    #[test]
    fn redundant_start_restarts_from_zero() {
        let mut engine = DoubleSlitEngine::recording(SceneConfig::default());
        engine.start().unwrap();
        for _ in 0..4 {
            engine.advance(TICK).unwrap();
        }
        assert_eq!(engine.state().frame_index, 4);

        engine.start().unwrap();
        assert_eq!(engine.state().frame_index, 0);
        engine.advance(TICK).unwrap();
        assert_eq!(engine.last_frame().map(|f| f.frame_index), Some(0));
    }

    #[test]
    fn stop_when_stopped_only_redraws_apparatus() {
        let mut engine = DoubleSlitEngine::recording(SceneConfig::default());
        engine.stop();
        let before = engine.state();
        engine.stop();

        assert_eq!(engine.state(), before);
        assert_eq!(engine.surface().unwrap().commands(), apparatus_only().as_slice());
    }

    #[test]
    fn detector_toggle_wipes_previous_mode_while_running() {
        let mut engine = DoubleSlitEngine::recording(SceneConfig::default());
        engine.start().unwrap();
        engine.advance(TICK).unwrap();
        assert_ne!(engine.surface().unwrap().commands(), apparatus_only().as_slice());

        engine.set_detector_enabled(true);
        assert_eq!(engine.surface().unwrap().commands(), apparatus_only().as_slice());
        assert_eq!(engine.state().frame_index, 1);
    }

    #[test]
    fn wave_toggle_does_not_redraw() {
        let mut engine = DoubleSlitEngine::recording(SceneConfig::default());
        engine.start().unwrap();
        let issued = engine.surface().unwrap().issued();
        engine.set_wave_overlay_enabled(true);
        assert_eq!(engine.surface().unwrap().issued(), issued);
        assert!(engine.config().wave_overlay_enabled);
    }

    #[test]
    fn stalled_particles_keep_ticking() {
        let scene = SceneConfig::from_toml("particle_speed = 1e-38").unwrap();
        let mut engine = DoubleSlitEngine::recording(scene);
        engine.set_detector_enabled(true);
        engine.start().unwrap();
        assert_eq!(engine.advance(TICK * 3), Ok(3));
        assert_eq!(engine.last_frame().map(|f| f.mode), Some(RenderMode::Particles));
    }

    #[test]
    fn unvalidated_zero_speed_still_renders() {
        let scene = SceneConfig {
            particle_speed: 0.0,
            ..SceneConfig::default()
        };
        let mut engine = DoubleSlitEngine::recording(scene);
        engine.set_detector_enabled(true);
        engine.start().unwrap();
        assert_eq!(engine.advance(TICK), Ok(1));
    }

    #[test]
    fn detach_stops_running_experiment() {
        let mut engine = DoubleSlitEngine::recording(SceneConfig::default());
        engine.start().unwrap();
        engine.advance(TICK).unwrap();

        let buffer = engine.detach_surface();
        assert!(buffer.is_some());
        assert!(!engine.is_running());
        assert_eq!(engine.advance(TICK * 4), Ok(0));
        assert_eq!(engine.tick(), Ok(None));
    }
}
