//! Runs a [`SurfaceRenderer`] against a drawing surface.
//!
//! [`SurfaceDriver`] owns the depth buffer and enforces the renderer
//! lifecycle: nothing is drawn until `on_surface_created` has succeeded, and
//! a view that failed to build stays dark instead of drawing half-built
//! resources.

use log::{debug, error, info};

use crate::error::SceneError;
use crate::gpu::GpuContext;
use crate::scene::{SurfaceInfo, SurfaceRenderer};

/// Depth format shared by the depth buffer and every pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Creates a depth buffer matching a `width` × `height` colour target.
pub fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Buffer"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

/// Where a driven renderer is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    /// Resources not built yet.
    Pending,
    /// Resources built; frames are drawn.
    Ready,
    /// Building failed; frames are skipped.
    Failed,
    /// Resources freed.
    Released,
}

/// Owns a renderer and calls it in lifecycle order.
pub struct SurfaceDriver<R: SurfaceRenderer> {
    renderer: R,
    state: DriverState,
    depth: Option<(wgpu::Texture, wgpu::TextureView)>,
}

impl<R: SurfaceRenderer> SurfaceDriver<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            state: DriverState::Pending,
            depth: None,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Builds the renderer's resources for a `width` × `height` target.
    ///
    /// On failure the error is logged and returned, and the driver stays in
    /// [`DriverState::Failed`] until the next successful `create`.
    pub fn create(
        &mut self,
        surface: &SurfaceInfo,
        width: u32,
        height: u32,
    ) -> Result<(), SceneError> {
        match self.renderer.on_surface_created(surface) {
            Ok(()) => {
                self.state = DriverState::Ready;
                self.resize(surface.device, width, height);
                Ok(())
            }
            Err(e) => {
                error!("Failed to build view: {}", e);
                self.renderer.release();
                self.state = DriverState::Failed;
                Err(e)
            }
        }
    }

    /// Creates the renderer against a window's GPU context.
    pub fn create_for(&mut self, gpu: &GpuContext) -> Result<(), SceneError> {
        let info = SurfaceInfo {
            device: &gpu.device,
            queue: &gpu.queue,
            format: gpu.format(),
        };
        self.create(&info, gpu.width(), gpu.height())
    }

    /// Propagates a new target size and rebuilds the depth buffer.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.renderer.on_surface_changed(width, height);
        if self.state == DriverState::Ready {
            if let Some((old, _)) = self.depth.take() {
                old.destroy();
            }
            self.depth = Some(create_depth_texture(device, width, height));
            debug!("Depth buffer resized to {}x{}", width, height);
        }
    }

    /// Clears `target` and records one frame of the renderer into it.
    pub fn render_to(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
    ) -> Result<(), SceneError> {
        if self.state != DriverState::Ready {
            return Err(SceneError::NotReady("view resources are not built"));
        }
        let Some((_, depth_view)) = &self.depth else {
            return Err(SceneError::NotReady("depth buffer missing"));
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Frame Encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Frame Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer.on_draw_frame(queue, &mut pass);
        }
        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    /// Draws one frame to the window surface and presents it.
    pub fn draw_frame(&mut self, gpu: &GpuContext) -> Result<(), SceneError> {
        if self.state != DriverState::Ready {
            return Err(SceneError::NotReady("view resources are not built"));
        }
        let output = gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.render_to(&gpu.device, &gpu.queue, &view)?;
        output.present();
        Ok(())
    }

    /// Frees the renderer's resources and the depth buffer. Idempotent.
    pub fn release(&mut self) {
        if self.state == DriverState::Released {
            return;
        }
        self.renderer.release();
        if let Some((texture, _)) = self.depth.take() {
            texture.destroy();
        }
        info!("View released");
        self.state = DriverState::Released;
    }
}

impl<R: SurfaceRenderer> Drop for SurfaceDriver<R> {
    fn drop(&mut self) {
        self.release();
    }
}
