//! Immediate-mode 2D drawing surface
//!
//! The engine never talks to a graphics API directly. It issues drawing
//! instructions against [`Surface`], with every style attribute passed
//! explicitly on each call. [`CommandBuffer`] records those instructions so
//! they can be replayed by a GPU front-end or inspected in tests.

use glam::Vec2;

/// Straight-alpha RGBA colour, components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Colour from 8-bit channels and an alpha in `0.0..=1.0`
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, 1.0)
    }

    /// Colour from hue in degrees, saturation and lightness in `0.0..=1.0`
    pub fn from_hsla(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        let (r, g, b) = hsl_to_rgb(hue, saturation, lightness);
        Self::new(r, g, b, alpha.clamp(0.0, 1.0))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Axis-aligned rectangle in surface units, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.origin.x >= self.origin.x
            && other.origin.y >= self.origin.y
            && other.origin.x + other.size.x <= self.origin.x + self.size.x
            && other.origin.y + other.size.y <= self.origin.y + self.size.y
    }
}

/// Minimal immediate-mode drawing capability set
pub trait Surface {
    /// Logical dimensions in surface units
    fn size(&self) -> Vec2;

    fn clear_rect(&mut self, rect: Rect);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color);

    /// Draw text with its baseline starting at `position`
    fn fill_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color);

    /// Clear the whole surface
    fn clear(&mut self) {
        let size = self.size();
        self.clear_rect(Rect::new(0.0, 0.0, size.x, size.y));
    }
}

/// One recorded drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        rect: Rect,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    StrokeLine {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    FillText {
        text: String,
        position: Vec2,
        font_size: f32,
        color: Color,
    },
}

/// Surface that records drawing instructions instead of rasterizing them
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    size: Vec2,
    commands: Vec<DrawCommand>,
    issued: u64,
}

impl CommandBuffer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::with_capacity(256),
            issued: 0,
        }
    }

    /// Commands retained since the last full-surface clear
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Total number of instructions ever issued, clears included
    pub fn issued(&self) -> u64 {
        self.issued
    }

    pub fn text_commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillText { .. }))
    }

    fn push(&mut self, command: DrawCommand) {
        self.issued += 1;
        self.commands.push(command);
    }
}

impl Surface for CommandBuffer {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear_rect(&mut self, rect: Rect) {
        let bounds = Rect::new(0.0, 0.0, self.size.x, self.size.y);
        if rect.contains_rect(&bounds) {
            // Everything recorded so far is covered
            self.issued += 1;
            self.commands.clear();
        } else {
            self.push(DrawCommand::Clear { rect });
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.push(DrawCommand::FillRect { rect, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.push(DrawCommand::FillCircle { center, radius, color });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color) {
        self.push(DrawCommand::StrokeLine { from, to, width, color });
    }

    fn fill_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color) {
        self.push(DrawCommand::FillText {
            text: text.to_owned(),
            position,
            font_size,
            color,
        });
    }
}

/// HSL to RGB, hue in degrees
fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> (f32, f32, f32) {
    let h = hue.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = match h as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (r + m, g + m, b + m)
}
