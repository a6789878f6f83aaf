//! Detector-off visualization: interference fringes on the screen
//!
//! Intensity along the screen is `|sin(k (y - y_c) + ω n)|` for frame `n`,
//! painted as opacity so the fringes drift as frames advance.

use crate::config::SceneConfig;
use crate::layout::*;
use crate::surface::{Color, Rect, Surface};
use glam::Vec2;

const FRINGE_STEP: f32 = 2.0;
const FRINGE_WIDTH: f32 = 8.0;
const MAX_OPACITY: f32 = 0.8;

const WAVE_STEP: f32 = 5.0;
const WAVE_AMPLITUDE: f32 = 20.0;
const WAVE_NUMBER: f32 = 0.1;
/// Wavefront drift in surface units per frame
const WAVE_SPEED: f32 = 5.0;
const WAVE_SEGMENT: f32 = 2.0;
const WAVE_LINE_WIDTH: f32 = 2.0;
const WAVE_START_X: f32 = 50.0;

/// Fringe brightness in `0.0..=1.0` at screen height `y`
pub fn fringe_intensity(y: f32, frame_index: u64, scene: &SceneConfig) -> f32 {
    let drift = frame_index as f64 * f64::from(scene.fringe_omega);
    let phase = f64::from(scene.fringe_k * (y - SCREEN_CENTER_Y)) + drift;
    phase.sin().abs() as f32
}

/// Height of one wavefront trace at `x`, `center_y` being its slit
pub fn wavefront_y(x: f32, center_y: f32, frame_index: u64) -> f32 {
    let shift = frame_index as f64 * f64::from(WAVE_SPEED);
    let phase = (f64::from(x) - shift) * f64::from(WAVE_NUMBER);
    center_y + WAVE_AMPLITUDE * phase.sin() as f32
}

/// Paint the fringe pattern and, when enabled, the travelling wavefronts.
pub fn render_interference_pattern<S: Surface + ?Sized>(
    surface: &mut S,
    frame_index: u64,
    wave_overlay_enabled: bool,
    scene: &SceneConfig,
) {
    let cyan = Color::from_rgb8(79, 195, 247);

    let mut y = SCREEN_TOP;
    while y < SCREEN_BOTTOM {
        let opacity = fringe_intensity(y, frame_index, scene) * MAX_OPACITY;
        surface.fill_rect(
            Rect::new(FRINGE_X, y, FRINGE_WIDTH, FRINGE_STEP),
            cyan.with_alpha(opacity),
        );
        y += FRINGE_STEP;
    }

    if !wave_overlay_enabled {
        return;
    }

    let stroke = cyan.with_alpha(0.6);
    let mut x = WAVE_START_X;
    while x < SCREEN_X {
        for center in [UPPER_SLIT_Y, LOWER_SLIT_Y] {
            let y = wavefront_y(x, center, frame_index);
            surface.stroke_line(
                Vec2::new(x, y),
                Vec2::new(x + WAVE_SEGMENT, y),
                WAVE_LINE_WIDTH,
                stroke,
            );
        }
        x += WAVE_STEP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{CommandBuffer, DrawCommand};

    fn render(frame: u64, overlay: bool) -> Vec<DrawCommand> {
        let scene = SceneConfig::default();
        let mut buffer = CommandBuffer::new(scene.width, scene.height);
        render_interference_pattern(&mut buffer, frame, overlay, &scene);
        buffer.commands().to_vec()
    }

    #[test]
    fn same_frame_same_commands() {
        for frame in [0, 4, 99] {
            assert_eq!(render(frame, false), render(frame, false));
            assert_eq!(render(frame, true), render(frame, true));
        }
    }

    #[test]
    fn fringe_strip_covers_screen_span() {
        let commands = render(0, false);
        assert_eq!(commands.len(), 100);
        assert!(commands
            .iter()
            .all(|c| matches!(c, DrawCommand::FillRect { rect, .. } if rect.origin.x == FRINGE_X)));
    }

    #[test]
    fn center_is_dark_at_frame_zero() {
        let scene = SceneConfig::default();
        assert!(fringe_intensity(SCREEN_CENTER_Y, 0, &scene) < 1e-6);
        let quarter_period = std::f32::consts::FRAC_PI_2 / scene.fringe_k;
        let bright = fringe_intensity(SCREEN_CENTER_Y + quarter_period, 0, &scene);
        assert!((bright - 1.0).abs() < 1e-4);
    }

    #[test]
    fn pattern_drifts_between_frames() {
        assert_ne!(render(0, false), render(1, false));
    }

    #[test]
    fn drift_stays_smooth_after_millions_of_frames() {
        let scene = SceneConfig::default();
        let omega = f64::from(scene.fringe_omega);
        for frame in [20_000_000u64, 20_000_001, 20_000_002] {
            let expected = (frame as f64 * omega).sin().abs() as f32;
            assert!((fringe_intensity(SCREEN_CENTER_Y, frame, &scene) - expected).abs() < 1e-6);
        }

        // One frame shifts the trace by exactly WAVE_SPEED
        let now = wavefront_y(200.0, UPPER_SLIT_Y, 20_000_000);
        let next = wavefront_y(200.0 + WAVE_SPEED, UPPER_SLIT_Y, 20_000_001);
        assert!((now - next).abs() < 1e-3);
    }

    #[test]
    fn overlay_adds_two_traces() {
        let plain = render(7, false);
        let overlay = render(7, true);
        let lines = overlay
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeLine { .. }))
            .count();

        // 70 samples between x = 50 and the screen, one segment per slit
        assert_eq!(lines, 140);
        assert_eq!(&overlay[..plain.len()], plain.as_slice());
    }

    #[test]
    fn no_lines_without_overlay() {
        assert!(render(7, false)
            .iter()
            .all(|c| !matches!(c, DrawCommand::StrokeLine { .. })));
    }
}
