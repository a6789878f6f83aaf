//! Double-Slit Experiment Visualization
//!
//! Particles or waves through two slits, with a live which-path detector.
//!
//! Controls:
//! - Space: Start/stop the experiment
//! - D: Toggle the detector (particle vs. interference view)
//! - W: Toggle the wavefront overlay
//! - Escape: Quit

use clap::Parser;
use common::{Camera2D, GraphicsContext, GraphicsError};
use double_slit::equations_ui::{
    draw_control_bar, draw_equations_sidebar, ControlActions, DOUBLE_SLIT_EQUATIONS,
    DOUBLE_SLIT_VARIABLES,
};
use double_slit::renderer::{SceneGeometry, SceneRenderer};
use double_slit::{CommandBuffer, DoubleSlitEngine, DrawCommand, SceneConfig};
use glam::Vec2;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use winit::{
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::ControlFlow,
    keyboard::{KeyCode, PhysicalKey},
};

/// Fraction of the scene left as border around it
const SCENE_MARGIN: f32 = 0.05;
/// Longest time step fed to the engine after a stall
const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "double_slit", about = "Double-slit experiment visualization")]
struct Args {
    /// TOML file overriding scene and animation parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with the which-path detector switched on
    #[arg(long)]
    detector: bool,

    /// Start with the wavefront overlay switched on
    #[arg(long)]
    wave: bool,

    /// Start the experiment as soon as the window opens
    #[arg(long)]
    autostart: bool,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    renderer: SceneRenderer,
    engine: DoubleSlitEngine<CommandBuffer>,
    camera: Camera2D,
    egui: EguiState,
}

impl App {
    fn new(ctx: GraphicsContext, scene: SceneConfig) -> Self {
        let renderer = SceneRenderer::new(&ctx, 4096, 512);
        let mut camera = Camera2D::new(ctx.aspect_ratio());
        camera.fit_to_scene(scene.width, scene.height, SCENE_MARGIN);

        let engine = DoubleSlitEngine::recording(scene);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &ctx.device,
            ctx.config.format,
            None,
            1,
        );

        Self {
            ctx,
            renderer,
            engine,
            camera,
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.camera.update_aspect_ratio(self.ctx.aspect_ratio());
        let scene = self.engine.scene();
        self.camera.fit_to_scene(scene.width, scene.height, SCENE_MARGIN);
    }

    fn update(&mut self, dt: Duration) {
        if let Err(err) = self.engine.advance(dt) {
            log::debug!("Tick skipped: {err}");
        }
    }

    fn toggle_running(&mut self) {
        if self.engine.is_running() {
            self.engine.stop();
        } else if let Err(err) = self.engine.start() {
            log::warn!("Start ignored: {err}");
        }
    }

    fn apply(&mut self, actions: ControlActions) {
        if actions.toggle_running {
            self.toggle_running();
        }
        if let Some(enabled) = actions.detector_enabled {
            self.engine.set_detector_enabled(enabled);
        }
        if let Some(enabled) = actions.wave_overlay_enabled {
            self.engine.set_wave_overlay_enabled(enabled);
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.update_camera(&self.ctx.queue, &self.camera);

        let scene_height = self.engine.scene().height;
        let surface = self.engine.surface();
        let commands: &[DrawCommand] = surface.map(|s| s.commands()).unwrap_or_default();
        let labels: Vec<&DrawCommand> = surface
            .map(|s| s.text_commands().collect())
            .unwrap_or_default();
        let geometry = SceneGeometry::from_commands(commands, scene_height);
        self.renderer.update_geometry(&self.ctx.queue, &geometry);

        // Build egui UI
        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let viewport = Vec2::new(self.ctx.size.width as f32, self.ctx.size.height as f32);
        let running = self.engine.is_running();
        let config = self.engine.config();
        let last_frame = self.engine.last_frame();
        let mut actions = ControlActions::default();

        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            actions = draw_control_bar(ctx, running, config, last_frame);
            draw_equations_sidebar(
                ctx,
                "Double-Slit Experiment",
                DOUBLE_SLIT_EQUATIONS,
                DOUBLE_SLIT_VARIABLES,
            );
            paint_scene_text(ctx, &labels, &self.camera, viewport, scene_height);
        });

        self.egui.state.handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self.egui.ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui.renderer.update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.size.width, self.ctx.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.renderer.render(&mut encoder, &view);

        self.egui.renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui.renderer.render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.apply(actions);
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState) {
        if state != ElementState::Pressed {
            return;
        }

        match key {
            KeyCode::Space => self.toggle_running(),
            KeyCode::KeyD => {
                let enabled = !self.engine.config().detector_enabled;
                self.engine.set_detector_enabled(enabled);
            }
            KeyCode::KeyW => {
                let enabled = !self.engine.config().wave_overlay_enabled;
                self.engine.set_wave_overlay_enabled(enabled);
            }
            _ => {}
        }
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui.state.on_window_event(&self.ctx.window, event).consumed
    }
}

/// Paint the scene's text commands with egui, mapped through the camera
fn paint_scene_text(
    ctx: &egui::Context,
    labels: &[&DrawCommand],
    camera: &Camera2D,
    viewport: Vec2,
    scene_height: f32,
) {
    let pixels_per_point = ctx.pixels_per_point();
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("scene_labels"),
    ));

    for label in labels {
        let DrawCommand::FillText { text, position, font_size, color } = label else {
            continue;
        };
        let world = Vec2::new(position.x, scene_height - position.y);
        let screen = camera.world_to_screen(world, viewport) / pixels_per_point;
        let size = font_size * camera.pixels_per_unit(viewport) / pixels_per_point;
        let [r, g, b, a] = color.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);

        painter.text(
            egui::pos2(screen.x, screen.y),
            egui::Align2::LEFT_BOTTOM,
            text,
            egui::FontId::proportional(size),
            egui::Color32::from_rgba_unmultiplied(r, g, b, a),
        );
    }
}

fn load_scene(path: Option<&PathBuf>) -> SceneConfig {
    let Some(path) = path else {
        return SceneConfig::default();
    };
    match SceneConfig::load(path) {
        Ok(scene) => scene,
        Err(err) => {
            log::warn!("{err}; using default scene");
            SceneConfig::default()
        }
    }
}

fn run(args: Args) -> Result<(), GraphicsError> {
    let scene = load_scene(args.config.as_ref());

    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        "Double-Slit Experiment",
        args.width,
        args.height,
    ))?;

    let mut app = App::new(ctx, scene);
    app.engine.set_detector_enabled(args.detector);
    app.engine.set_wave_overlay_enabled(args.wave);
    if args.autostart {
        app.toggle_running();
    }

    let mut last_time = Instant::now();

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { ref event, .. } => {
                let consumed = app.handle_window_event(event);

                if !consumed {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(size) => app.resize(*size),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                                    state: ElementState::Pressed,
                                    ..
                                },
                            ..
                        } => elwt.exit(),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    physical_key: PhysicalKey::Code(key),
                                    state,
                                    ..
                                },
                            ..
                        } => app.handle_key(*key, *state),
                        WindowEvent::RedrawRequested => {
                            let now = Instant::now();
                            let dt = (now - last_time).min(MAX_FRAME_STEP);
                            last_time = now;

                            app.update(dt);
                            match app.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                                Err(e) => log::error!("Render error: {:?}", e),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.ctx.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(err) = run(args) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
