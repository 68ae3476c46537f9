//! The windowed host: one window, an overview and an optional detail view.

use std::sync::Arc;

use log::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::catalog;
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::gpu::GpuContext;
use crate::input::{Command, Input};
use crate::scene::{DetailRenderer, DetailScene, OverviewRenderer, OverviewScene, ViewKind};
use crate::selection::SelectionHandle;
use crate::surface::SurfaceDriver;
use crate::texture::{DirectoryTextures, ProceduralTextures, TextureSource};

/// Picks the texture source named by the config.
pub fn texture_source(config: &SceneConfig) -> Arc<dyn TextureSource> {
    match &config.textures {
        Some(dir) => {
            info!("Loading textures from {}", dir.display());
            Arc::new(DirectoryTextures::new(dir.clone()))
        }
        None => {
            info!("Using procedural textures");
            Arc::new(ProceduralTextures::default())
        }
    }
}

/// Window title naming the selected body.
pub fn window_title(base: &str, selected: usize) -> String {
    match catalog::body(selected) {
        Some(body) => format!("{} - {}", base, body.name),
        None => base.to_string(),
    }
}

/// Opens the window and runs until it is closed.
pub fn run(config: SceneConfig) -> Result<(), SceneError> {
    let selection = SelectionHandle::new(config.initial_body, catalog::BODY_COUNT)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = OrreryApp {
        textures: texture_source(&config),
        config,
        selection,
        running: None,
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct Running {
    overview: SurfaceDriver<OverviewRenderer>,
    detail: Option<SurfaceDriver<DetailRenderer>>,
    input: Input,
    gpu: GpuContext,
    window: Arc<Window>,
}

impl Running {
    fn view(&self) -> ViewKind {
        if self.detail.is_some() {
            ViewKind::Detail
        } else {
            ViewKind::Overview
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        self.overview.resize(&self.gpu.device, width, height);
        if let Some(detail) = &mut self.detail {
            detail.resize(&self.gpu.device, width, height);
        }
    }

    fn draw(&mut self) -> Result<(), SceneError> {
        match &mut self.detail {
            Some(detail) => detail.draw_frame(&self.gpu),
            None => self.overview.draw_frame(&self.gpu),
        }
    }
}

struct OrreryApp {
    config: SceneConfig,
    textures: Arc<dyn TextureSource>,
    selection: SelectionHandle,
    running: Option<Running>,
    error: Option<SceneError>,
}

impl OrreryApp {
    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running, SceneError> {
        let window_config = &self.config.window;
        let attrs = WindowAttributes::default()
            .with_title(window_title(
                &window_config.title,
                self.selection.get_selected_index(),
            ))
            .with_inner_size(winit::dpi::LogicalSize::new(
                window_config.width,
                window_config.height,
            ));

        let window = Arc::new(event_loop.create_window(attrs)?);
        let gpu = GpuContext::new(window.clone())?;

        let scene = OverviewScene::new(self.config.overview.clone(), self.selection.clone());
        let mut overview = SurfaceDriver::new(OverviewRenderer::new(scene, self.textures.clone()));
        overview.create_for(&gpu)?;

        let mut running = Running {
            overview,
            detail: None,
            input: Input::new(),
            gpu,
            window,
        };
        if self.config.start_in_detail {
            self.open_detail(&mut running);
        }
        Ok(running)
    }

    /// Builds the detail view for the current selection. A failure is logged
    /// and leaves the overview showing.
    fn open_detail(&self, running: &mut Running) {
        let scene = match DetailScene::for_selection(self.config.detail.clone(), &self.selection) {
            Ok(scene) => scene,
            Err(e) => {
                warn!("Cannot open detail view: {}", e);
                return;
            }
        };
        let body = scene.body();
        let mut driver = SurfaceDriver::new(DetailRenderer::new(scene, self.textures.clone()));
        if driver.create_for(&running.gpu).is_ok() {
            info!("Opened detail view of {}", catalog::CATALOG[body].name);
            running.detail = Some(driver);
        }
    }

    fn apply(&self, command: Command, running: &mut Running, event_loop: &ActiveEventLoop) {
        match command {
            Command::SelectPrev | Command::SelectNext => {
                let index = if command == Command::SelectNext {
                    self.selection.select_next()
                } else {
                    self.selection.select_prev()
                };
                debug!("Selected {}", catalog::CATALOG[index].name);
                running
                    .window
                    .set_title(&window_title(&self.config.window.title, index));
            }
            Command::OpenDetail => self.open_detail(running),
            Command::Back => {
                if let Some(mut detail) = running.detail.take() {
                    detail.release();
                }
            }
            Command::Quit => event_loop.exit(),
        }
    }
}

impl ApplicationHandler for OrreryApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(e) => {
                error!("Startup failed: {}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(mut running) = self.running.take() else {
            return;
        };

        running.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => running.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                for command in running.input.commands(running.view()) {
                    self.apply(command, &mut running, event_loop);
                }
                running.input.begin_frame();

                match running.draw() {
                    Ok(()) => {}
                    Err(SceneError::Surface(
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                    )) => {
                        debug!("Surface lost; reconfiguring");
                        running.gpu.reconfigure();
                    }
                    Err(SceneError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                        error!("Out of GPU memory");
                        self.error = Some(SceneError::Surface(wgpu::SurfaceError::OutOfMemory));
                        event_loop.exit();
                    }
                    Err(e) => warn!("Frame skipped: {}", e),
                }
                running.window.request_redraw();
            }
            _ => {}
        }

        self.running = Some(running);
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut running) = self.running.take() {
            if let Some(mut detail) = running.detail.take() {
                detail.release();
            }
            running.overview.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_names_the_selection() {
        assert_eq!(window_title("Orrery", 3), "Orrery - Earth");
        assert_eq!(window_title("Orrery", 99), "Orrery");
    }

    #[test]
    fn procedural_textures_without_a_directory() {
        let source = texture_source(&SceneConfig::default());
        assert!(source.load(catalog::BACKGROUND_TEXTURE_ID).is_ok());
    }
}
