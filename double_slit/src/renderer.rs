//! GPU replay of recorded scene commands
//!
//! Rectangles and circles share one instanced-quad pipeline, line segments go
//! through a line-list pipeline. Text is left to the egui overlay.

use crate::surface::{Color, DrawCommand};
use common::{Camera2D, CameraUniform, GraphicsContext};
use glam::Vec2;
use wgpu::util::DeviceExt;

/// Window background, also used to paint partial clears
pub const BACKGROUND: Color = Color::new(0.02, 0.02, 0.08, 1.0);

/// Instance data for one filled rectangle or circle
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShapeInstance {
    pub center: [f32; 2],
    pub half_extent: [f32; 2],
    pub color: [f32; 4],
    /// 1.0 clips the quad to its inscribed ellipse
    pub rounded: f32,
    pub _padding: [f32; 3],
}

impl ShapeInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        1 => Float32x2,  // center
        2 => Float32x2,  // half extent
        3 => Float32x4,  // color
        4 => Float32,    // rounded
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShapeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Quad vertex for shape instances
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, 1.0] },
];

/// Line vertex for stroked segments
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// GPU-ready geometry for one frame, in world space (y up)
#[derive(Debug, Default, Clone)]
pub struct SceneGeometry {
    pub shapes: Vec<ShapeInstance>,
    pub lines: Vec<LineVertex>,
}

impl SceneGeometry {
    /// Convert surface commands (y down) into world-space geometry.
    ///
    /// Text commands are skipped. Stroke width is not honoured: the line
    /// pipeline rasterizes one-pixel lines.
    pub fn from_commands(commands: &[DrawCommand], scene_height: f32) -> Self {
        let flip = |p: Vec2| Vec2::new(p.x, scene_height - p.y);
        let mut geometry = Self::default();

        for command in commands {
            match command {
                DrawCommand::Clear { rect } => geometry.shapes.push(rect_instance(
                    flip(rect.center()),
                    rect.size * 0.5,
                    BACKGROUND,
                    false,
                )),
                DrawCommand::FillRect { rect, color } => geometry.shapes.push(rect_instance(
                    flip(rect.center()),
                    rect.size * 0.5,
                    *color,
                    false,
                )),
                DrawCommand::FillCircle { center, radius, color } => {
                    geometry.shapes.push(rect_instance(
                        flip(*center),
                        Vec2::splat(radius.max(0.0)),
                        *color,
                        true,
                    ))
                }
                DrawCommand::StrokeLine { from, to, color, .. } => {
                    let color = linear_color(*color);
                    for p in [flip(*from), flip(*to)] {
                        geometry.lines.push(LineVertex {
                            position: [p.x, p.y, 0.0],
                            color,
                        });
                    }
                }
                DrawCommand::FillText { .. } => {}
            }
        }

        geometry
    }
}

fn rect_instance(center: Vec2, half_extent: Vec2, color: Color, rounded: bool) -> ShapeInstance {
    ShapeInstance {
        center: center.to_array(),
        half_extent: half_extent.to_array(),
        color: linear_color(color),
        rounded: if rounded { 1.0 } else { 0.0 },
        _padding: [0.0; 3],
    }
}

/// sRGB-encoded colour to the linear values an sRGB render target expects
fn linear_color(color: Color) -> [f32; 4] {
    let to_linear = |c: f32| {
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [to_linear(color.r), to_linear(color.g), to_linear(color.b), color.a]
}

/// Renderer for the double-slit scene
pub struct SceneRenderer {
    shape_pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    shape_buffer: wgpu::Buffer,
    max_shapes: usize,
    shape_count: u32,

    line_pipeline: wgpu::RenderPipeline,
    line_buffer: wgpu::Buffer,
    max_lines: usize,
    line_vertex_count: u32,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

impl SceneRenderer {
    pub fn new(ctx: &GraphicsContext, max_shapes: usize, max_lines: usize) -> Self {
        let device = &ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let blend_target = [Some(wgpu::ColorTargetState {
            format: ctx.config.format,
            blend: Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent::OVER,
            }),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let shape_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shape Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_shape",
                buffers: &[QuadVertex::layout(), ShapeInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_shape",
                targets: &blend_target,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_line",
                buffers: &[LineVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_line",
                targets: &blend_target,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let shape_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shape Instance Buffer"),
            size: (std::mem::size_of::<ShapeInstance>() * max_shapes) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Line Buffer"),
            size: (std::mem::size_of::<LineVertex>() * max_lines * 2) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            shape_pipeline,
            quad_buffer,
            shape_buffer,
            max_shapes,
            shape_count: 0,
            line_pipeline,
            line_buffer,
            max_lines,
            line_vertex_count: 0,
            camera_buffer,
            camera_bind_group,
        }
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &Camera2D) {
        let uniform = CameraUniform::from_camera_2d(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    /// Upload this frame's geometry, dropping anything past buffer capacity
    pub fn update_geometry(&mut self, queue: &wgpu::Queue, geometry: &SceneGeometry) {
        let shapes = &geometry.shapes[..geometry.shapes.len().min(self.max_shapes)];
        let lines = &geometry.lines[..geometry.lines.len().min(self.max_lines * 2)];

        if shapes.len() < geometry.shapes.len() || lines.len() < geometry.lines.len() {
            log::warn!(
                "Scene geometry truncated: {} shapes, {} line vertices",
                geometry.shapes.len(),
                geometry.lines.len()
            );
        }

        if !shapes.is_empty() {
            queue.write_buffer(&self.shape_buffer, 0, bytemuck::cast_slice(shapes));
        }
        if !lines.is_empty() {
            queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(lines));
        }
        self.shape_count = shapes.len() as u32;
        self.line_vertex_count = lines.len() as u32;
    }

    /// Clear the target and draw shapes, then lines on top
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let background = linear_color(BACKGROUND);
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: background[0] as f64,
                        g: background[1] as f64,
                        b: background[2] as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

        if self.shape_count > 0 {
            render_pass.set_pipeline(&self.shape_pipeline);
            render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.shape_buffer.slice(..));
            render_pass.draw(0..6, 0..self.shape_count);
        }

        if self.line_vertex_count > 0 {
            render_pass.set_pipeline(&self.line_pipeline);
            render_pass.set_vertex_buffer(0, self.line_buffer.slice(..));
            render_pass.draw(0..self.line_vertex_count, 0..1);
        }
    }
}
