//! Static experiment apparatus: source label, two-slit barrier and screen

use crate::layout::*;
use crate::surface::{Color, Rect, Surface};
use glam::Vec2;

const LABEL_SIZE: f32 = 12.0;

/// Draw the config-independent part of the scene.
///
/// Idempotent: drawing it twice only overdraws the same shapes.
pub fn render_apparatus<S: Surface + ?Sized>(surface: &mut S) {
    let barrier = Color::from_rgb8(0x66, 0x66, 0x66);
    let screen = Color::from_rgb8(0x33, 0x33, 0x33);

    // Barrier halves leave the slit gap between them
    surface.fill_rect(
        Rect::new(BARRIER_X, BARRIER_TOP, BARRIER_WIDTH, SLIT_GAP_TOP - BARRIER_TOP),
        barrier,
    );
    surface.fill_rect(
        Rect::new(BARRIER_X, SLIT_GAP_BOTTOM, BARRIER_WIDTH, BARRIER_BOTTOM - SLIT_GAP_BOTTOM),
        barrier,
    );

    surface.fill_rect(
        Rect::new(SCREEN_X, SCREEN_TOP, SCREEN_WIDTH, SCREEN_BOTTOM - SCREEN_TOP),
        screen,
    );

    let labels = [
        ("Source", Vec2::new(20.0, 160.0)),
        ("Double Slit", Vec2::new(120.0, 40.0)),
        ("Screen", Vec2::new(420.0, 40.0)),
        ("Slit 1", Vec2::new(180.0, 145.0)),
        ("Slit 2", Vec2::new(180.0, 165.0)),
    ];
    for (text, position) in labels {
        surface.fill_text(text, position, LABEL_SIZE, Color::WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{CommandBuffer, DrawCommand};

    #[test]
    fn draws_two_barrier_halves_screen_and_labels() {
        let mut buffer = CommandBuffer::new(500.0, 300.0);
        render_apparatus(&mut buffer);

        let rects: Vec<Rect> = buffer
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(
            rects,
            vec![
                Rect::new(150.0, 50.0, 20.0, 80.0),
                Rect::new(150.0, 170.0, 20.0, 80.0),
                Rect::new(400.0, 50.0, 10.0, 200.0),
            ]
        );

        let labels: Vec<&str> = buffer
            .text_commands()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["Source", "Double Slit", "Screen", "Slit 1", "Slit 2"]);
    }

    #[test]
    fn repeated_calls_draw_identical_geometry() {
        let mut once = CommandBuffer::new(500.0, 300.0);
        render_apparatus(&mut once);

        let mut twice = CommandBuffer::new(500.0, 300.0);
        render_apparatus(&mut twice);
        render_apparatus(&mut twice);

        let n = once.commands().len();
        assert_eq!(twice.commands().len(), 2 * n);
        assert_eq!(&twice.commands()[..n], once.commands());
        assert_eq!(&twice.commands()[n..], once.commands());
    }
}
