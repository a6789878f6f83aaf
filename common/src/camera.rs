//! Camera system for 2D scenes

use glam::{Mat4, Vec2, Vec3};

/// 2D orthographic camera
#[derive(Debug, Clone)]
pub struct Camera2D {
    pub position: Vec3,
    pub zoom: f32,
    pub aspect_ratio: f32,
}

impl Camera2D {
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            zoom: 1.0,
            aspect_ratio,
        }
    }

    /// Center the camera on a `width` x `height` scene anchored at the origin
    /// and zoom out until the whole scene fits, leaving `margin` (fraction of
    /// the scene) around it.
    pub fn fit_to_scene(&mut self, width: f32, height: f32, margin: f32) {
        self.position = Vec3::new(width / 2.0, height / 2.0, 0.0);
        let half_height = height / 2.0;
        let half_width_as_height = width / 2.0 / self.aspect_ratio.max(f32::EPSILON);
        self.zoom = half_height.max(half_width_as_height) * (1.0 + margin);
    }

    /// Get the view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        let half_width = self.zoom * self.aspect_ratio;
        let half_height = self.zoom;

        let projection = Mat4::orthographic_rh(
            -half_width,
            half_width,
            -half_height,
            half_height,
            -1.0,
            1.0,
        );

        let view = Mat4::from_translation(-self.position);

        projection * view
    }

    /// Map a world point to window pixels (origin top-left, y down)
    pub fn world_to_screen(&self, world: Vec2, viewport: Vec2) -> Vec2 {
        let half_width = self.zoom * self.aspect_ratio;
        let half_height = self.zoom;
        let ndc_x = (world.x - self.position.x) / half_width;
        let ndc_y = (world.y - self.position.y) / half_height;

        Vec2::new(
            (ndc_x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc_y) * 0.5 * viewport.y,
        )
    }

    /// Window pixels covered by one world unit
    pub fn pixels_per_unit(&self, viewport: Vec2) -> f32 {
        viewport.y / (2.0 * self.zoom)
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera_2d(camera: &Camera2D) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            position: [camera.position.x, camera.position.y, camera.position.z, 1.0],
        }
    }
}
