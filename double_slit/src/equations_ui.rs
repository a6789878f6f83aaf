//! egui panels for the double-slit front-end
//!
//! A right-hand sidebar with the relevant equations, and a top bar holding
//! the experiment controls and a status readout.

use crate::engine::{ExperimentConfig, FrameReport};
use egui::{Color32, Context, FontFamily, FontId, RichText};

/// Equation entry with label and formula
pub struct Equation {
    pub name: &'static str,
    pub formula: &'static str,
    pub description: &'static str,
}

/// Draw a styled equation sidebar
pub fn draw_equations_sidebar(
    ctx: &Context,
    title: &str,
    equations: &[Equation],
    variables: &[(&str, &str)],
) {
    egui::SidePanel::right("equations_panel")
        .min_width(280.0)
        .max_width(350.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(RichText::new(title).color(Color32::from_rgb(100, 200, 255)));
            });

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(5.0);

            ui.label(RichText::new("Equations").strong().color(Color32::from_rgb(255, 200, 100)));
            ui.add_space(5.0);

            for eq in equations {
                draw_equation(ui, eq);
                ui.add_space(8.0);
            }

            ui.add_space(10.0);
            ui.separator();
            ui.add_space(5.0);

            ui.label(RichText::new("Variables").strong().color(Color32::from_rgb(255, 200, 100)));
            ui.add_space(5.0);

            for (symbol, meaning) in variables {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(*symbol).color(Color32::from_rgb(150, 255, 150))
                        .font(FontId::new(14.0, FontFamily::Monospace)));
                    ui.label(RichText::new("=").color(Color32::GRAY));
                    ui.label(RichText::new(*meaning).color(Color32::LIGHT_GRAY));
                });
            }
        });
}

fn draw_equation(ui: &mut egui::Ui, eq: &Equation) {
    ui.group(|ui| {
        ui.label(RichText::new(eq.name).strong().color(Color32::WHITE));
        ui.label(
            RichText::new(eq.formula)
                .font(FontId::new(16.0, FontFamily::Monospace))
                .color(Color32::from_rgb(200, 220, 255))
        );
        ui.label(RichText::new(eq.description).small().color(Color32::GRAY));
    });
}

/// What the user asked for through the control bar this frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ControlActions {
    pub toggle_running: bool,
    pub detector_enabled: Option<bool>,
    pub wave_overlay_enabled: Option<bool>,
}

/// Top bar with Start/Stop, detector and wave controls plus frame status
pub fn draw_control_bar(
    ctx: &Context,
    running: bool,
    config: ExperimentConfig,
    last_frame: Option<FrameReport>,
) -> ControlActions {
    let mut actions = ControlActions::default();

    egui::TopBottomPanel::top("controls").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if ui.button(start_label(running)).clicked() {
                actions.toggle_running = true;
            }

            let detector = config.detector_enabled;
            let fill = if detector {
                Color32::from_rgb(0xf4, 0x43, 0x36)
            } else {
                Color32::from_rgb(0x4c, 0xaf, 0x50)
            };
            let text = RichText::new(detector_label(detector)).color(Color32::WHITE);
            let button = egui::Button::new(text).fill(fill);
            if ui.add(button).clicked() {
                actions.detector_enabled = Some(!detector);
            }

            let mut show_wave = config.wave_overlay_enabled;
            if ui.checkbox(&mut show_wave, "Show wave").changed() {
                actions.wave_overlay_enabled = Some(show_wave);
            }

            ui.separator();
            match last_frame {
                Some(frame) if running => {
                    ui.label(format!("Frame: {}", frame.frame_index));
                    ui.separator();
                    ui.label(frame.mode.label());
                }
                _ if running => {
                    ui.label(RichText::new("RUNNING").color(Color32::GREEN));
                }
                _ => {
                    ui.label(RichText::new("STOPPED").color(Color32::GRAY));
                }
            }
        });
    });

    actions
}

pub fn start_label(running: bool) -> &'static str {
    if running {
        "Stop Experiment"
    } else {
        "Start Experiment"
    }
}

pub fn detector_label(enabled: bool) -> &'static str {
    if enabled {
        "🔍 Detector ON"
    } else {
        "👁️ Detector OFF"
    }
}

// ============================================
// Double-Slit Equations
// ============================================

pub const DOUBLE_SLIT_EQUATIONS: &[Equation] = &[
    Equation {
        name: "Superposition",
        formula: "ψ = ψ₁ + ψ₂",
        description: "Amplitudes from both slits add",
    },
    Equation {
        name: "Interference Intensity",
        formula: "I = |ψ₁|² + |ψ₂|² + 2Re(ψ₁*ψ₂)",
        description: "Cross term produces the fringes",
    },
    Equation {
        name: "Bright Fringes",
        formula: "d sinθ = mλ",
        description: "Path difference of whole wavelengths",
    },
    Equation {
        name: "Fringe Spacing",
        formula: "Δy = λL / d",
        description: "Small-angle distance between maxima",
    },
    Equation {
        name: "With Detector",
        formula: "P = |ψ₁|² + |ψ₂|²",
        description: "Which-path information removes the cross term",
    },
    Equation {
        name: "Animated Pattern",
        formula: "I(y, n) = |sin(k(y − y_c) + ωn)|",
        description: "Screen intensity drawn at frame n",
    },
];

pub const DOUBLE_SLIT_VARIABLES: &[(&str, &str)] = &[
    ("ψ₁, ψ₂", "Amplitude through each slit"),
    ("d", "Slit separation"),
    ("λ", "Wavelength"),
    ("L", "Slit-to-screen distance"),
    ("θ", "Angle from the axis"),
    ("m", "Fringe order"),
    ("k", "Fringe spatial frequency"),
    ("ω", "Fringe drift per frame"),
    ("n", "Frame index"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_swap_with_state() {
        assert_eq!(start_label(false), "Start Experiment");
        assert_eq!(start_label(true), "Stop Experiment");
        assert_eq!(detector_label(true), "🔍 Detector ON");
        assert_eq!(detector_label(false), "👁️ Detector OFF");
    }
}
