//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::config::SceneConfig;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from the config file.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Animated solar system with a lit detail view")]
pub struct CliArgs {
    /// Path to a RON config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding `<id>.png` or `<id>.jpg` textures.
    #[arg(long)]
    pub textures: Option<PathBuf>,

    /// Catalog index selected at startup (0 = Sun .. 9 = Neptune).
    #[arg(long)]
    pub body: Option<i64>,

    /// Start in the detail view of the selected body.
    #[arg(long)]
    pub detail: bool,

    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl SceneConfig {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref dir) = args.textures {
            self.textures = Some(dir.clone());
        }
        if let Some(body) = args.body {
            self.initial_body = body;
        }
        if args.detail {
            self.start_in_detail = true;
        }
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref level) = args.log_level {
            self.log_level = level.clone();
        }
    }
}
