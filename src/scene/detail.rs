//! The lit single-body view.

use std::sync::Arc;

use glam::Mat4;
use log::{info, warn};

use super::{SurfaceInfo, SurfaceRenderer, aspect_ratio};
use crate::camera::{Camera, Frustum, global_scale, normal_matrix};
use crate::catalog;
use crate::clock::{AnimationClock, turn_radians};
use crate::config::DetailConfig;
use crate::drawable::{Drawable, DrawableContext, PhongFrame, PhongTexturedSphere};
use crate::error::SceneError;
use crate::lighting::PhongParams;
use crate::selection::{SelectionError, SelectionHandle};
use crate::shader::ProgramLibrary;
use crate::texture::{ImageData, TextureSource};

/// CPU state of the detail view for one catalog body.
#[derive(Debug)]
pub struct DetailScene {
    config: DetailConfig,
    body: usize,
    clock: AnimationClock,
    view: Mat4,
    projection: Mat4,
    aspect: f32,
    lighting: PhongParams,
}

impl DetailScene {
    /// Creates the view for catalog entry `body`.
    pub fn new(config: DetailConfig, body: usize) -> Result<Self, SelectionError> {
        if catalog::body(body).is_none() {
            return Err(SelectionError::OutOfRange {
                index: body as i64,
                count: catalog::BODY_COUNT,
            });
        }

        let [x, y, z] = config.eye;
        let view = Camera::new().at(x, y, z).looking_at(0.0, 0.0, 0.0).view_matrix();

        let mut scene = Self {
            body,
            clock: AnimationClock::new(config.clock_step),
            view,
            projection: Mat4::IDENTITY,
            aspect: 1.0,
            lighting: config.lighting(),
            config,
        };
        scene.resize(1, 1);
        Ok(scene)
    }

    /// Creates the view for whatever `selection` currently points at.
    pub fn for_selection(
        config: DetailConfig,
        selection: &SelectionHandle,
    ) -> Result<Self, SelectionError> {
        Self::new(config, selection.get_selected_index())
    }

    pub fn body(&self) -> usize {
        self.body
    }

    pub fn clock(&self) -> f64 {
        self.clock.angle()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
        self.projection =
            Frustum::symmetric(self.aspect, self.config.near, self.config.far).matrix();
    }

    pub fn scale(&self) -> f32 {
        global_scale(self.aspect, self.config.wide_scale, self.config.tall_scale)
    }

    /// Scaled, spinning slowly about y, with its axis leaning towards the viewer.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale(glam::Vec3::splat(self.scale()))
            * Mat4::from_rotation_y(turn_radians(self.clock.angle(), self.config.spin_rate))
            * Mat4::from_rotation_x(self.config.tilt.to_radians())
    }

    /// Advances the clock one frame and returns that frame's inputs.
    pub fn advance(&mut self) -> PhongFrame {
        self.clock.tick();
        self.frame()
    }

    /// Frame inputs for the current state.
    pub fn frame(&self) -> PhongFrame {
        let model_view = self.view * self.model_matrix();
        PhongFrame {
            mvp: self.projection * model_view,
            model_view,
            normal_matrix: normal_matrix(model_view),
            lighting: self.lighting,
        }
    }
}

/// Draws a [`DetailScene`] as one Phong-lit textured sphere.
pub struct DetailRenderer {
    scene: DetailScene,
    textures: Arc<dyn TextureSource>,
    sphere: Option<PhongTexturedSphere>,
}

impl DetailRenderer {
    pub fn new(scene: DetailScene, textures: Arc<dyn TextureSource>) -> Self {
        Self {
            scene,
            textures,
            sphere: None,
        }
    }

    pub fn scene(&self) -> &DetailScene {
        &self.scene
    }

    pub fn is_ready(&self) -> bool {
        self.sphere.is_some()
    }

    /// The body's texture, or a 1x1 image in its catalog colour when the
    /// texture is missing or too large for the device.
    fn body_image(&self, max_dimension: u32) -> ImageData {
        let spec = &catalog::CATALOG[self.scene.body()];
        let loaded = self.textures.load(spec.texture_id).and_then(|image| {
            image.check_upload(spec.texture_id, max_dimension)?;
            Ok(image)
        });
        loaded.unwrap_or_else(|e| {
            warn!("{}; lighting a flat {} instead", e, spec.name);
            flat_image(spec.color)
        })
    }
}

fn flat_image(color: [f32; 4]) -> ImageData {
    let pixel = color.map(|c| (c.clamp(0.0, 1.0) * 255.0) as u8);
    image::RgbaImage::from_pixel(1, 1, image::Rgba(pixel)).into()
}

impl SurfaceRenderer for DetailRenderer {
    fn on_surface_created(&mut self, surface: &SurfaceInfo) -> Result<(), SceneError> {
        self.release();

        let image = self.body_image(surface.device.limits().max_texture_dimension_2d);
        let mut programs = ProgramLibrary::new(surface.format);
        let mut ctx = DrawableContext {
            device: surface.device,
            queue: surface.queue,
            programs: &mut programs,
        };

        let name = catalog::CATALOG[self.scene.body()].name;
        let sphere = PhongTexturedSphere::new(
            &mut ctx,
            name,
            self.scene.config.sphere_stacks,
            self.scene.config.sphere_slices,
            &image,
        )?;

        info!("Detail view ready for {}", name);
        self.sphere = Some(sphere);
        Ok(())
    }

    fn on_surface_changed(&mut self, width: u32, height: u32) {
        self.scene.resize(width, height);
    }

    fn on_draw_frame(&mut self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>) {
        let Some(sphere) = &self.sphere else {
            return;
        };
        let frame = self.scene.advance();
        sphere.draw(queue, pass, &frame);
    }

    fn release(&mut self) {
        if let Some(mut sphere) = self.sphere.take() {
            sphere.release();
        }
    }
}
