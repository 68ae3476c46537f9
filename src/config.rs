//! Scene configuration with defaults and RON persistence.
//!
//! Every struct is `#[serde(default)]`, so a file only needs the values it
//! changes:
//!
//! ```ron
//! (
//!     window: (width: 1920, height: 1080),
//!     detail: (shininess: 64.0),
//! )
//! ```

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::cursor::Cursor;
use crate::lighting::PhongParams;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file from disk.
    #[error("failed to read config: {0}")]
    Read(#[source] std::io::Error),

    /// Failed to parse RON content.
    #[error("failed to parse config: {0}")]
    Parse(#[source] ron::error::SpannedError),

    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub overview: OverviewConfig,
    pub detail: DetailConfig,
    /// Catalog index selected at startup.
    pub initial_body: i64,
    /// Open the detail view of the initial body instead of the overview.
    pub start_in_detail: bool,
    /// Directory holding `<id>.png` textures. Procedural textures when unset.
    pub textures: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is unset (e.g. "debug", "info,wgpu=warn").
    pub log_level: String,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Width in logical pixels.
    pub width: u32,
    /// Height in logical pixels.
    pub height: u32,
}

/// Settings of the animated solar-system view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverviewConfig {
    /// Clock degrees added per frame.
    pub clock_step: f32,
    pub sphere_stacks: u32,
    pub sphere_slices: u32,
    pub eye: [f32; 3],
    pub near: f32,
    pub far: f32,
    /// System scale when the viewport is wider than tall.
    pub wide_scale: f32,
    /// System scale otherwise.
    pub tall_scale: f32,
    /// Lean of the background plane about x, in degrees.
    pub background_tilt: f32,
    /// Distance of the background plane from the origin along -z.
    pub background_distance: f32,
    /// Base half-size of the background plane.
    pub background_size: f32,
    /// Lean of the selection cube about x, in degrees.
    pub cursor_tilt: f32,
    /// Selection cube edge as a multiple of the body's diameter.
    pub cursor_padding: f32,
    pub wanderer: WandererConfig,
}

/// Settings of the bouncing decoration and its bounding box.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WandererConfig {
    /// Plane the body moves in; negative, in front of the background.
    pub depth: f32,
    pub start: [f32; 2],
    /// Units per frame.
    pub velocity: [f32; 2],
    pub size: f32,
    pub color: [f32; 4],
    /// Colour of the bounding-box outline.
    pub box_color: [f32; 4],
}

/// Settings of the lit single-body view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetailConfig {
    pub clock_step: f32,
    pub sphere_stacks: u32,
    pub sphere_slices: u32,
    pub eye: [f32; 3],
    pub near: f32,
    pub far: f32,
    /// Sphere scale when the viewport is wider than tall.
    pub wide_scale: f32,
    /// Sphere scale otherwise.
    pub tall_scale: f32,
    /// Lean of the spin axis about x, in degrees.
    pub tilt: f32,
    /// Spin degrees per clock unit.
    pub spin_rate: f32,
    /// Light position in eye space.
    pub light_position: [f32; 3],
    /// Viewer position in eye space.
    pub view_position: [f32; 3],
    pub ambient: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            overview: OverviewConfig::default(),
            detail: DetailConfig::default(),
            initial_body: 0,
            start_in_detail: false,
            textures: None,
            log_level: "info".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Orrery".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            clock_step: 0.5,
            sphere_stacks: 24,
            sphere_slices: 48,
            eye: [0.0, 3.0, 10.0],
            near: 1.0,
            far: 100.0,
            wide_scale: 2.0,
            tall_scale: 1.0,
            background_tilt: -17.0,
            background_distance: 30.0,
            background_size: 40.0,
            cursor_tilt: 20.0,
            cursor_padding: 1.2,
            wanderer: WandererConfig::default(),
        }
    }
}

impl Default for WandererConfig {
    fn default() -> Self {
        Self {
            depth: -8.0,
            start: [0.0, 0.0],
            velocity: [0.03, 0.02],
            size: 0.4,
            color: [0.08, 0.0, 0.12, 1.0],
            box_color: [1.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Default for DetailConfig {
    fn default() -> Self {
        Self {
            clock_step: 0.5,
            sphere_stacks: 48,
            sphere_slices: 48,
            eye: [0.0, 0.0, 5.0],
            near: 1.0,
            far: 100.0,
            wide_scale: 3.5,
            tall_scale: 2.0,
            tilt: 25.0,
            spin_rate: 0.5,
            light_position: [5.0, 8.0, 10.0],
            view_position: [0.0, 0.0, 0.0],
            ambient: 0.18,
            specular: 0.7,
            shininess: 32.0,
        }
    }
}

impl OverviewConfig {
    pub fn cursor(&self) -> Cursor {
        Cursor {
            padding: self.cursor_padding,
            tilt: self.cursor_tilt,
        }
    }
}

impl WandererConfig {
    pub fn start(&self) -> Vec2 {
        Vec2::from(self.start)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::from(self.velocity)
    }
}

impl DetailConfig {
    /// Lighting inputs, with strengths clamped into range.
    pub fn lighting(&self) -> PhongParams {
        PhongParams {
            light_position: Vec3::from(self.light_position),
            view_position: Vec3::from(self.view_position),
            ambient: self.ambient,
            specular: self.specular,
            shininess: self.shininess,
        }
        .sanitized()
    }
}

impl SceneConfig {
    /// Reads and parses a RON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        let config = Self::from_ron_str(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Parses RON and checks every value is in range.
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would give a degenerate window, projection,
    /// sphere or clock.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.window.width > 0, "window.width", "must be non-zero")?;
        check(self.window.height > 0, "window.height", "must be non-zero")?;

        let overview = &self.overview;
        check_clock("overview", overview.clock_step)?;
        check_tessellation("overview", overview.sphere_stacks, overview.sphere_slices)?;
        check_projection("overview", overview.near, overview.far)?;
        check_scales("overview", overview.wide_scale, overview.tall_scale)?;
        check(
            overview.background_distance > 0.0,
            "overview.background_distance",
            format!("{} is not positive", overview.background_distance),
        )?;
        check(
            overview.background_size > 0.0,
            "overview.background_size",
            format!("{} is not positive", overview.background_size),
        )?;
        let depth = overview.wanderer.depth;
        check(
            depth < 0.0 && depth > -overview.background_distance,
            "overview.wanderer.depth",
            format!(
                "{depth} must lie between 0 and the background at -{}",
                overview.background_distance
            ),
        )?;

        let detail = &self.detail;
        check_clock("detail", detail.clock_step)?;
        check_tessellation("detail", detail.sphere_stacks, detail.sphere_slices)?;
        check_projection("detail", detail.near, detail.far)?;
        check_scales("detail", detail.wide_scale, detail.tall_scale)
    }
}

fn check(ok: bool, field: &str, reason: impl Into<String>) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        })
    }
}

fn check_clock(section: &str, step: f32) -> Result<(), ConfigError> {
    check(
        step.is_finite() && step >= 0.0,
        &format!("{section}.clock_step"),
        format!("{step} must be finite and not negative"),
    )
}

fn check_tessellation(section: &str, stacks: u32, slices: u32) -> Result<(), ConfigError> {
    check(
        stacks >= 1,
        &format!("{section}.sphere_stacks"),
        "needs at least 1",
    )?;
    check(
        slices >= 3,
        &format!("{section}.sphere_slices"),
        format!("{slices} is below 3"),
    )
}

fn check_projection(section: &str, near: f32, far: f32) -> Result<(), ConfigError> {
    check(
        near > 0.0,
        &format!("{section}.near"),
        format!("{near} is not positive"),
    )?;
    check(
        far > near,
        &format!("{section}.far"),
        format!("{far} is not beyond near plane {near}"),
    )
}

fn check_scales(section: &str, wide: f32, tall: f32) -> Result<(), ConfigError> {
    check(
        wide > 0.0,
        &format!("{section}.wide_scale"),
        format!("{wide} is not positive"),
    )?;
    check(
        tall > 0.0,
        &format!("{section}.tall_scale"),
        format!("{tall} is not positive"),
    )
}
