//! # Orrery
//!
//! **An animated solar system on wgpu, with a lit close-up of any body.**
//!
//! The overview shows the Sun and nine bodies orbiting it in front of a
//! starfield, a translucent cube marking the selected body and a small
//! wanderer bouncing inside a red bounding rectangle. The detail view shows
//! one body alone, spinning slowly under a Phong light.
//!
//! ## Quick Start
//!
//! ```no_run
//! use orrery::config::SceneConfig;
//!
//! fn main() -> Result<(), orrery::SceneError> {
//!     orrery::logging::init_logging("info");
//!     orrery::app::run(SceneConfig::default())
//! }
//! ```
//!
//! ## Layout
//!
//! - Pure math and state: [`geometry`], [`camera`], [`clock`], [`orbit`],
//!   [`cursor`], [`wanderer`], [`lighting`], [`selection`], [`catalog`].
//!   None of it needs a GPU.
//! - GPU building blocks: [`gpu`], [`mesh`], [`shader`], [`texture`] and the
//!   [`drawable`]s built from them.
//! - Views: [`scene`] splits each view into a CPU scene and a renderer that
//!   a [`surface::SurfaceDriver`] runs; [`app`] hosts both in one window.
//!
//! Keys: Left/Right change the selection, Enter opens the detail view,
//! Escape goes back (or quits from the overview).

pub mod app;
pub mod camera;
pub mod catalog;
pub mod cli;
pub mod clock;
pub mod config;
pub mod cursor;
pub mod drawable;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod input;
pub mod lighting;
pub mod logging;
pub mod mesh;
pub mod orbit;
pub mod scene;
pub mod selection;
pub mod shader;
pub mod surface;
pub mod texture;
pub mod wanderer;

pub use camera::{Camera, Frustum};
pub use catalog::{BodySpec, CATALOG};
pub use config::SceneConfig;
pub use error::SceneError;
pub use geometry::{GeometryError, MeshData};
pub use gpu::GpuContext;
pub use selection::{SelectionError, SelectionHandle};
pub use shader::{ProgramLibrary, ShaderError, ShaderProgram};
pub use texture::{ImageData, TextureError, TextureSource};

// Re-export glam math types for convenience
pub use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
