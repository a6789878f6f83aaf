//! Detector-on visualization: discrete particles through a known slit
//!
//! Each stream emits one particle per pass across the scene. Its position is
//! derived from the frame index alone, so impact dots of earlier passes can
//! be recomputed every frame without keeping a hit list.

use crate::config::SceneConfig;
use crate::layout::*;
use crate::surface::{Color, Surface};
use glam::Vec2;

const PARTICLE_RADIUS: f32 = 4.0;
const TRAIL_LENGTH: u32 = 4;
const TRAIL_SPACING: f32 = 8.0;
const IMPACT_RADIUS: f32 = 3.0;
const JITTER_AMPLITUDE: f32 = 5.0;
const JITTER_RATE: f32 = 0.2;
/// Second-slit particles are emitted on the later half of this window
const STAGGER_PERIOD: u64 = 40;
const STREAM_OFFSET: u64 = 20;

/// Which opening a particle passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slit {
    Upper,
    Lower,
}

impl Slit {
    fn center_y(self) -> f32 {
        match self {
            Slit::Upper => UPPER_SLIT_Y,
            Slit::Lower => LOWER_SLIT_Y,
        }
    }

    fn phase(self) -> f32 {
        match self {
            Slit::Upper => 0.0,
            Slit::Lower => std::f32::consts::PI,
        }
    }
}

/// One particle stream; stream `i` lags the first by `20 i` units and frames
#[derive(Debug, Clone, Copy)]
pub struct ParticleStream {
    pub index: u32,
    offset: u64,
    speed: f32,
}

impl ParticleStream {
    pub fn new(index: u32, speed: f32) -> Self {
        Self {
            index,
            offset: u64::from(index) * STREAM_OFFSET,
            speed,
        }
    }

    /// Distance travelled since frame 0, including the stream offset
    fn distance(&self, frame: u64) -> f64 {
        frame as f64 * f64::from(self.speed) + self.offset as f64
    }

    /// Completed passes across the travel span before `frame`
    pub fn pass_at(&self, frame: u64) -> u64 {
        (self.distance(frame) / f64::from(PARTICLE_TRAVEL)).floor() as u64
    }

    /// Horizontal position, wrapping back to the source after each pass
    pub fn x_at(&self, frame: u64) -> f32 {
        SOURCE_X + self.distance(frame).rem_euclid(f64::from(PARTICLE_TRAVEL)) as f32
    }

    /// Vertical position with a small jitter around the slit center
    pub fn y_at(&self, frame: u64, slit: Slit) -> f32 {
        let t = frame.saturating_add(self.offset) as f64 * f64::from(JITTER_RATE);
        slit.center_y() + (t + f64::from(slit.phase())).sin() as f32 * JITTER_AMPLITUDE
    }

    pub fn emits_lower(&self, frame: u64) -> bool {
        frame.saturating_add(self.offset) % STAGGER_PERIOD > STAGGER_PERIOD / 2
    }

    /// First frame at which the particle of `pass` is past the impact
    /// threshold, or `None` if it jumps over the threshold window entirely.
    pub fn crossing_frame(&self, pass: u64) -> Option<u64> {
        let travel = f64::from(PARTICLE_TRAVEL);
        let span = f64::from(IMPACT_THRESHOLD_X - SOURCE_X);
        let pass_start = pass as f64 * travel;
        let threshold = pass_start + span - self.offset as f64;
        let frame = if threshold < 0.0 {
            0
        } else {
            // `as` saturates, so a stalled stream lands on u64::MAX
            ((threshold / f64::from(self.speed)).floor() as u64).saturating_add(1)
        };

        let distance = self.distance(frame);
        let in_window = distance - pass_start > span && distance < pass_start + travel;
        in_window.then_some(frame)
    }

    fn color(&self, alpha: f32) -> Color {
        Color::from_hsla(200.0 + 30.0 * self.index as f32, 0.8, 0.6, alpha)
    }
}

/// Draw particles travelling towards the screen plus their impact dots.
pub fn render_particle_pattern<S: Surface + ?Sized>(
    surface: &mut S,
    frame_index: u64,
    scene: &SceneConfig,
) {
    let impact = Color::from_rgb8(0xff, 0x57, 0x22);

    for index in 0..scene.particle_count {
        let stream = ParticleStream::new(index, scene.particle_speed);
        let x = stream.x_at(frame_index);

        if x < PARTICLE_CUTOFF_X {
            let upper = Vec2::new(x, stream.y_at(frame_index, Slit::Upper));
            draw_particle(surface, &stream, upper);
            if stream.emits_lower(frame_index) {
                let lower = Vec2::new(x, stream.y_at(frame_index, Slit::Lower));
                draw_particle(surface, &stream, lower);
            }
        }

        // Impact dots of the current pass and the ones before it
        let current = stream.pass_at(frame_index);
        let first = current
            .saturating_add(1)
            .saturating_sub(u64::from(scene.impact_history));
        for pass in first..=current {
            let Some(hit) = stream.crossing_frame(pass) else {
                continue;
            };
            if hit > frame_index {
                continue;
            }
            let upper = Vec2::new(IMPACT_X, stream.y_at(hit, Slit::Upper));
            surface.fill_circle(upper, IMPACT_RADIUS, impact);
            if stream.emits_lower(hit) {
                let lower = Vec2::new(IMPACT_X, stream.y_at(hit, Slit::Lower));
                surface.fill_circle(lower, IMPACT_RADIUS, impact);
            }
        }
    }

    surface.fill_text("🔍 DETECTOR ON", Vec2::new(160.0, 30.0), 12.0, impact);
    surface.fill_text("(Observing which slit)", Vec2::new(160.0, 45.0), 12.0, impact);
}

fn draw_particle<S: Surface + ?Sized>(surface: &mut S, stream: &ParticleStream, position: Vec2) {
    surface.fill_circle(position, PARTICLE_RADIUS, stream.color(1.0));

    let trail = stream.color(0.3);
    for j in 1..=TRAIL_LENGTH {
        let offset = Vec2::new(j as f32 * TRAIL_SPACING, 0.0);
        surface.fill_circle(position - offset, PARTICLE_RADIUS - j as f32, trail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{CommandBuffer, DrawCommand};

    fn render(frame: u64, scene: &SceneConfig) -> Vec<DrawCommand> {
        let mut buffer = CommandBuffer::new(scene.width, scene.height);
        render_particle_pattern(&mut buffer, frame, scene);
        buffer.commands().to_vec()
    }

    fn impact_dots(commands: &[DrawCommand]) -> Vec<Vec2> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillCircle { center, radius, color }
                    if *radius == IMPACT_RADIUS
                        && center.x == IMPACT_X
                        && *color == Color::from_rgb8(0xff, 0x57, 0x22) =>
                {
                    Some(*center)
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn same_frame_same_commands() {
        let scene = SceneConfig::default();
        for frame in [0, 1, 17, 66, 500] {
            assert_eq!(render(frame, &scene), render(frame, &scene));
        }
    }

    #[test]
    fn particles_progress_left_to_right() {
        let stream = ParticleStream::new(0, 6.0);
        assert_eq!(stream.x_at(0), SOURCE_X);
        assert_eq!(stream.x_at(1), SOURCE_X + 6.0);
        assert!(stream.x_at(10) > stream.x_at(9));
    }

    #[test]
    fn position_wraps_after_full_pass() {
        let stream = ParticleStream::new(0, 8.0);
        // 50 frames * 8 units = one 400-unit pass
        assert_eq!(stream.x_at(50), SOURCE_X);
        assert_eq!(stream.pass_at(49), 0);
        assert_eq!(stream.pass_at(50), 1);
    }

    #[test]
    fn jitter_stays_near_slit() {
        let stream = ParticleStream::new(1, 6.0);
        let bound = JITTER_AMPLITUDE + 1e-4;
        for frame in 0..200 {
            assert!((stream.y_at(frame, Slit::Upper) - UPPER_SLIT_Y).abs() <= bound);
            assert!((stream.y_at(frame, Slit::Lower) - LOWER_SLIT_Y).abs() <= bound);
        }
    }

    #[test]
    fn crossing_frame_is_first_frame_past_threshold() {
        let stream = ParticleStream::new(0, 6.0);
        // 350 / 6 = 58.33, so frame 59 is the first with x > 380
        assert_eq!(stream.crossing_frame(0), Some(59));
        assert!(stream.x_at(58) <= IMPACT_THRESHOLD_X);
        assert!(stream.x_at(59) > IMPACT_THRESHOLD_X);
    }

    #[test]
    fn no_impacts_before_first_crossing() {
        let scene = SceneConfig {
            particle_count: 1,
            ..SceneConfig::default()
        };
        assert!(impact_dots(&render(0, &scene)).is_empty());
        assert!(impact_dots(&render(58, &scene)).is_empty());
        assert!(!impact_dots(&render(59, &scene)).is_empty());
    }

    #[test]
    fn impacts_accumulate_across_passes() {
        let scene = SceneConfig {
            particle_count: 1,
            ..SceneConfig::default()
        };
        let stream = ParticleStream::new(0, scene.particle_speed);
        let first = stream.crossing_frame(0).unwrap();
        let third = stream.crossing_frame(2).unwrap();

        let early = impact_dots(&render(first, &scene)).len();
        let later = impact_dots(&render(third, &scene)).len();
        assert!(later > early);
    }

    #[test]
    fn impact_history_bounds_dot_count() {
        let scene = SceneConfig {
            particle_count: 1,
            impact_history: 2,
            ..SceneConfig::default()
        };
        // Upper plus possibly lower dot per remembered pass
        assert!(impact_dots(&render(10_000, &scene)).len() <= 4);
    }

    #[test]
    fn steady_step_after_millions_of_frames() {
        let stream = ParticleStream::new(0, 6.0);
        // 20_000_001 * 6 = 120_000_006, which is 6 past a whole pass
        assert_eq!(stream.x_at(20_000_001), SOURCE_X + 6.0);
        assert_eq!(stream.x_at(20_000_002) - stream.x_at(20_000_001), 6.0);
        assert_eq!(stream.pass_at(20_000_001), 300_000);
    }

    #[test]
    fn degenerate_speeds_render_without_overflow() {
        for speed in [1e-38, 0.0, f32::INFINITY, f32::NAN, -6.0] {
            let scene = SceneConfig {
                particle_speed: speed,
                ..SceneConfig::default()
            };
            for frame in [0, 1, 59, 10_000, u64::MAX] {
                let commands = render(frame, &scene);
                assert!(commands
                    .iter()
                    .any(|c| matches!(c, DrawCommand::FillText { .. })));
            }
        }
    }

    #[test]
    fn stalled_stream_never_crosses() {
        let stream = ParticleStream::new(0, 1e-38);
        assert_eq!(stream.crossing_frame(0), None);
    }

    #[test]
    fn detector_indicator_is_drawn() {
        let commands = render(3, &SceneConfig::default());
        let texts: Vec<&str> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, ["🔍 DETECTOR ON", "(Observing which slit)"]);
    }

    #[test]
    fn draws_only_discrete_shapes() {
        let commands = render(120, &SceneConfig::default());
        assert!(commands.iter().all(|c| matches!(
            c,
            DrawCommand::FillCircle { .. } | DrawCommand::FillText { .. }
        )));
    }
}
