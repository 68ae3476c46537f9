//! The animated solar-system view.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use log::{debug, info, warn};

use super::{SurfaceInfo, SurfaceRenderer, aspect_ratio};
use crate::camera::{Camera, Frustum, global_scale};
use crate::catalog::{self, BodySpec, CATALOG};
use crate::clock::AnimationClock;
use crate::config::OverviewConfig;
use crate::cursor::Cursor;
use crate::drawable::{
    BodyDrawable, ColorCube, ColoredSphere, Drawable, DrawableContext, LineParams, LineRect,
    Rect, TexturedQuad, TexturedSphere,
};
use crate::error::SceneError;
use crate::geometry::CUBE_FACE_COLORS;
use crate::orbit::OrbitingBody;
use crate::selection::SelectionHandle;
use crate::shader::ProgramLibrary;
use crate::texture::TextureSource;
use crate::wanderer::{WanderingBody, background_extent};

/// What a draw command renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawItem {
    Background,
    /// Outline of the wanderer's bound.
    BoundingBox,
    Wanderer,
    /// Catalog entry by index.
    Body(usize),
    Cursor,
}

/// One draw in a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    pub item: DrawItem,
    pub model: Mat4,
    /// `projection * view * model`.
    pub mvp: Mat4,
}

/// Everything the overview draws in one frame, in draw order.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub clock: f64,
    pub selected: usize,
    pub bounding_box: Rect,
    pub commands: Vec<DrawCommand>,
}

impl FramePlan {
    pub fn items(&self) -> impl Iterator<Item = DrawItem> + '_ {
        self.commands.iter().map(|c| c.item)
    }

    pub fn command(&self, item: DrawItem) -> Option<&DrawCommand> {
        self.commands.iter().find(|c| c.item == item)
    }
}

/// CPU state of the overview: clock, camera, projection, wanderer and selection.
#[derive(Debug)]
pub struct OverviewScene {
    config: OverviewConfig,
    clock: AnimationClock,
    view: Mat4,
    projection: Mat4,
    aspect: f32,
    bodies: Vec<OrbitingBody>,
    cursor: Cursor,
    wanderer: WanderingBody,
    selection: SelectionHandle,
}

impl OverviewScene {
    /// Creates the scene with its clock at zero and a square viewport.
    pub fn new(config: OverviewConfig, selection: SelectionHandle) -> Self {
        let [x, y, z] = config.eye;
        let view = Camera::new().at(x, y, z).looking_at(0.0, 0.0, 0.0).view_matrix();

        let w = &config.wanderer;
        let wanderer = WanderingBody::new(w.start(), w.velocity(), w.depth, w.size);

        let mut scene = Self {
            clock: AnimationClock::new(config.clock_step),
            view,
            projection: Mat4::IDENTITY,
            aspect: 1.0,
            bodies: CATALOG.iter().map(OrbitingBody::from).collect(),
            cursor: config.cursor(),
            wanderer,
            selection,
            config,
        };
        scene.resize(1, 1);
        scene
    }

    /// Recomputes the projection and the wanderer's bound.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
        self.projection =
            Frustum::symmetric(self.aspect, self.config.near, self.config.far).matrix();

        let extent = background_extent(self.aspect, self.config.background_size);
        self.wanderer
            .set_bounds(extent, -self.config.background_distance);

        debug!(
            "Overview resized to {}x{} (aspect {:.3}, scale {})",
            width,
            height,
            self.aspect,
            self.global_scale()
        );
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn clock(&self) -> f64 {
        self.clock.angle()
    }

    /// System scale for the current viewport band.
    pub fn global_scale(&self) -> f32 {
        global_scale(
            self.aspect,
            self.config.wide_scale,
            self.config.tall_scale,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn wanderer(&self) -> &WanderingBody {
        &self.wanderer
    }

    pub fn selection(&self) -> &SelectionHandle {
        &self.selection
    }

    pub fn config(&self) -> &OverviewConfig {
        &self.config
    }

    /// Tilted, pushed back and stretched to overfill the viewport.
    pub fn background_model(&self) -> Mat4 {
        let extent = background_extent(self.aspect, self.config.background_size);
        Mat4::from_rotation_x(self.config.background_tilt.to_radians())
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -self.config.background_distance))
            * Mat4::from_scale(extent.extend(1.0))
    }

    /// Advances the clock and the wanderer one frame, then plans the frame.
    pub fn advance(&mut self) -> FramePlan {
        self.clock.tick();
        self.wanderer.step();
        self.plan()
    }

    /// Plans a frame from the current state.
    ///
    /// Order: background, bounding box, wanderer, bodies in catalog order
    /// (the Moon right after Earth), cursor.
    pub fn plan(&self) -> FramePlan {
        let vp = self.view_projection();
        let clock = self.clock.angle();
        let scale = self.global_scale();
        let selected = self.selection.get_selected_index();

        let command = |item, model: Mat4| DrawCommand {
            item,
            model,
            mvp: vp * model,
        };

        let mut commands = Vec::with_capacity(self.bodies.len() + 4);
        commands.push(command(DrawItem::Background, self.background_model()));
        commands.push(command(DrawItem::BoundingBox, self.wanderer.plane_matrix()));
        commands.push(command(DrawItem::Wanderer, self.wanderer.model_matrix()));

        for (i, body) in self.bodies.iter().enumerate() {
            commands.push(command(DrawItem::Body(i), body.model_matrix(clock, scale)));
        }

        if let Some(spec) = catalog::body(selected) {
            commands.push(command(
                DrawItem::Cursor,
                self.cursor.model_matrix(spec, clock, scale),
            ));
        }

        let limit = self.wanderer.limit();
        FramePlan {
            clock,
            selected,
            bounding_box: Rect::centered(limit.x, limit.y),
            commands,
        }
    }
}

struct OverviewResources {
    programs: ProgramLibrary,
    background: TexturedQuad,
    bounding_box: LineRect,
    wanderer: ColoredSphere,
    bodies: Vec<BodyDrawable>,
    cursor: ColorCube,
}

impl OverviewResources {
    fn release(&mut self) {
        self.background.release();
        self.bounding_box.release();
        self.wanderer.release();
        for body in &mut self.bodies {
            body.release();
        }
        self.cursor.release();
    }
}

/// Draws an [`OverviewScene`] with one drawable per item.
pub struct OverviewRenderer {
    scene: OverviewScene,
    textures: Arc<dyn TextureSource>,
    resources: Option<OverviewResources>,
}

impl OverviewRenderer {
    pub fn new(scene: OverviewScene, textures: Arc<dyn TextureSource>) -> Self {
        Self {
            scene,
            textures,
            resources: None,
        }
    }

    pub fn scene(&self) -> &OverviewScene {
        &self.scene
    }

    /// Whether GPU resources currently exist.
    pub fn is_ready(&self) -> bool {
        self.resources.is_some()
    }

    /// Catalog indices drawn as flat-coloured spheres because their texture failed.
    pub fn fallback_bodies(&self) -> Vec<usize> {
        self.resources
            .as_ref()
            .map(|res| {
                res.bodies
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| matches!(b, BodyDrawable::Colored(_)))
                    .map(|(i, _)| i)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn build_body(
    ctx: &mut DrawableContext,
    textures: &dyn TextureSource,
    spec: &BodySpec,
    stacks: u32,
    slices: u32,
) -> Result<BodyDrawable, SceneError> {
    let textured = textures
        .load(spec.texture_id)
        .map_err(SceneError::from)
        .and_then(|image| TexturedSphere::new(ctx, spec.name, stacks, slices, &image));

    match textured {
        Ok(sphere) => Ok(BodyDrawable::Textured(sphere)),
        Err(SceneError::Texture(e)) => {
            warn!("{}; drawing {} in its catalog colour", e, spec.name);
            Ok(BodyDrawable::Colored(ColoredSphere::new(
                ctx, spec.name, stacks, slices, spec.color,
            )?))
        }
        Err(e) => Err(e),
    }
}

impl SurfaceRenderer for OverviewRenderer {
    fn on_surface_created(&mut self, surface: &SurfaceInfo) -> Result<(), SceneError> {
        self.release();

        let config = self.scene.config();
        let (stacks, slices) = (config.sphere_stacks, config.sphere_slices);

        let mut programs = ProgramLibrary::new(surface.format);
        let mut ctx = DrawableContext {
            device: surface.device,
            queue: surface.queue,
            programs: &mut programs,
        };

        let background_image = self.textures.load(catalog::BACKGROUND_TEXTURE_ID)?;
        let background = TexturedQuad::new(&mut ctx, &background_image)?;
        let bounding_box = LineRect::new(&mut ctx)?;
        let wanderer = ColoredSphere::new(
            &mut ctx,
            "Wanderer",
            stacks,
            slices,
            config.wanderer.color,
        )?;

        let mut bodies = Vec::with_capacity(CATALOG.len());
        for spec in &CATALOG {
            bodies.push(build_body(
                &mut ctx,
                self.textures.as_ref(),
                spec,
                stacks,
                slices,
            )?);
        }

        let cursor = ColorCube::new(&mut ctx, &CUBE_FACE_COLORS)?;

        info!(
            "Overview ready: {} bodies, {} programs",
            bodies.len(),
            programs.len()
        );

        self.resources = Some(OverviewResources {
            programs,
            background,
            bounding_box,
            wanderer,
            bodies,
            cursor,
        });
        Ok(())
    }

    fn on_surface_changed(&mut self, width: u32, height: u32) {
        self.scene.resize(width, height);
    }

    fn on_draw_frame(&mut self, queue: &wgpu::Queue, pass: &mut wgpu::RenderPass<'_>) {
        let Some(res) = &self.resources else {
            return;
        };

        let plan = self.scene.advance();
        let box_color = self.scene.config().wanderer.box_color;

        for command in &plan.commands {
            match command.item {
                DrawItem::Background => res.background.draw(queue, pass, &command.mvp),
                DrawItem::BoundingBox => res.bounding_box.draw(
                    queue,
                    pass,
                    &LineParams {
                        mvp: command.mvp,
                        rect: plan.bounding_box,
                        color: box_color,
                    },
                ),
                DrawItem::Wanderer => res.wanderer.draw(queue, pass, &command.mvp),
                DrawItem::Body(i) => {
                    if let Some(body) = res.bodies.get(i) {
                        body.draw(queue, pass, &command.mvp);
                    }
                }
                DrawItem::Cursor => res.cursor.draw(queue, pass, &command.mvp),
            }
        }
    }

    fn release(&mut self) {
        if let Some(mut res) = self.resources.take() {
            res.release();
            info!("Overview released {} programs", res.programs.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BODY_COUNT, EARTH, MOON};
    use crate::gpu::test_device;
    use crate::texture::{ImageData, ProceduralTextures, TextureError};

    fn scene_at(index: i64) -> OverviewScene {
        let selection = SelectionHandle::new(index, BODY_COUNT).unwrap();
        OverviewScene::new(OverviewConfig::default(), selection)
    }

    #[test]
    fn draw_order_is_fixed() {
        let mut scene = scene_at(0);
        scene.resize(1600, 900);
        let items: Vec<_> = scene.advance().items().collect();

        let mut expected = vec![DrawItem::Background, DrawItem::BoundingBox, DrawItem::Wanderer];
        expected.extend((0..BODY_COUNT).map(DrawItem::Body));
        expected.push(DrawItem::Cursor);

        assert_eq!(items, expected);
    }

    #[test]
    fn moon_is_drawn_right_after_earth() {
        let plan = scene_at(0).plan();
        let items: Vec<_> = plan.items().collect();
        let earth = items.iter().position(|i| *i == DrawItem::Body(EARTH)).unwrap();
        assert_eq!(items[earth + 1], DrawItem::Body(MOON));
    }

    #[test]
    fn clock_advances_once_per_frame() {
        let mut scene = scene_at(0);
        assert_eq!(scene.clock(), 0.0);
        assert_eq!(scene.advance().clock, 0.5);
        assert_eq!(scene.advance().clock, 1.0);
        assert_eq!(scene.clock(), 1.0);
    }

    #[test]
    fn mvp_is_view_projection_times_model() {
        let mut scene = scene_at(3);
        scene.resize(800, 600);
        let plan = scene.advance();
        let vp = scene.view_projection();
        for command in &plan.commands {
            assert!((vp * command.model).abs_diff_eq(command.mvp, 1e-6));
        }
    }

    #[test]
    fn cursor_tracks_selection_changes() {
        let scene = scene_at(0);
        scene.selection().select_next();
        scene.selection().select_next();

        let plan = scene.plan();
        assert_eq!(plan.selected, 2);

        let cursor = plan.command(DrawItem::Cursor).unwrap();
        let venus = plan.command(DrawItem::Body(2)).unwrap();
        let a = cursor.model.transform_point3(Vec3::ZERO);
        let b = venus.model.transform_point3(Vec3::ZERO);
        assert!((a - b).length() < 1e-5);
    }

    #[test]
    fn global_scale_follows_orientation() {
        let mut scene = scene_at(0);
        scene.resize(1920, 1080);
        assert_eq!(scene.global_scale(), 2.0);
        scene.resize(1080, 1920);
        assert_eq!(scene.global_scale(), 1.0);
    }

    #[test]
    fn wanderer_bound_follows_viewport() {
        let mut scene = scene_at(0);
        scene.resize(2000, 1000);
        let wide = scene.wanderer().limit();
        scene.resize(1000, 2000);
        let tall = scene.wanderer().limit();

        // 40 * aspect * 8 / 30 horizontally when wide.
        assert!((wide.x - 40.0 * 2.0 * 8.0 / 30.0).abs() < 1e-4);
        assert!(tall.y > tall.x);
    }

    #[test]
    fn wanderer_stays_inside_its_box() {
        let mut scene = scene_at(0);
        scene.resize(1280, 720);
        for _ in 0..5000 {
            let plan = scene.advance();
            let p = scene.wanderer().position;
            assert!(p.x.abs() <= plan.bounding_box.max_x);
            assert!(p.y.abs() <= plan.bounding_box.max_y);
        }
    }

    #[test]
    fn background_sits_behind_everything() {
        let scene = scene_at(0);
        let centre = scene.background_model().transform_point3(Vec3::ZERO);
        assert!(centre.z < scene.wanderer().depth);
    }

    struct MissingEarth(ProceduralTextures);

    impl TextureSource for MissingEarth {
        fn load(&self, id: &str) -> Result<ImageData, TextureError> {
            if id == "earth" {
                Err(TextureError::Load {
                    id: id.into(),
                    reason: "gone".into(),
                })
            } else {
                self.0.load(id)
            }
        }
    }

    /// Serves Mars wider than the device allows.
    struct WideMars {
        inner: ProceduralTextures,
        width: u32,
    }

    impl TextureSource for WideMars {
        fn load(&self, id: &str) -> Result<ImageData, TextureError> {
            if id == "mars" {
                ImageData::new(id, self.width, 1, vec![128; self.width as usize * 4])
            } else {
                self.inner.load(id)
            }
        }
    }

    struct NoTextures;

    impl TextureSource for NoTextures {
        fn load(&self, id: &str) -> Result<ImageData, TextureError> {
            Err(TextureError::Load {
                id: id.into(),
                reason: "empty".into(),
            })
        }
    }

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    #[test]
    fn missing_body_texture_falls_back_to_colour() {
        let Some((device, queue)) = test_device() else {
            return;
        };
        let textures = Arc::new(MissingEarth(ProceduralTextures { size: 8, seed: 1 }));
        let mut renderer = OverviewRenderer::new(scene_at(0), textures);

        renderer
            .on_surface_created(&SurfaceInfo {
                device: &device,
                queue: &queue,
                format: FORMAT,
            })
            .unwrap();

        assert_eq!(renderer.fallback_bodies(), vec![EARTH]);
        renderer.release();
        renderer.release();
        assert!(!renderer.is_ready());
    }

    #[test]
    fn missing_background_is_fatal() {
        let Some((device, queue)) = test_device() else {
            return;
        };
        let mut renderer = OverviewRenderer::new(scene_at(0), Arc::new(NoTextures));

        let result = renderer.on_surface_created(&SurfaceInfo {
            device: &device,
            queue: &queue,
            format: FORMAT,
        });

        assert!(matches!(result, Err(SceneError::Texture(_))));
        assert!(!renderer.is_ready());
        renderer.release();
    }

    #[test]
    fn oversized_body_texture_falls_back_to_colour() {
        let Some((device, queue)) = test_device() else {
            return;
        };
        let textures = Arc::new(WideMars {
            inner: ProceduralTextures { size: 8, seed: 1 },
            width: device.limits().max_texture_dimension_2d + 1,
        });
        let mut renderer = OverviewRenderer::new(scene_at(0), textures);

        renderer
            .on_surface_created(&SurfaceInfo {
                device: &device,
                queue: &queue,
                format: FORMAT,
            })
            .unwrap();

        let mars = CATALOG.iter().position(|b| b.name == "Mars").unwrap();
        assert_eq!(renderer.fallback_bodies(), vec![mars]);
    }
}
