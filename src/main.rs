use clap::Parser;
use log::{error, info};

use orrery::cli::CliArgs;
use orrery::config::SceneConfig;
use orrery::logging::init_logging;

fn main() {
    let args = CliArgs::parse();

    let mut config = match SceneConfig::load_or_default(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("orrery: {}", e);
            std::process::exit(2);
        }
    };
    config.apply_cli_overrides(&args);
    if let Err(e) = config.validate() {
        eprintln!("orrery: {}", e);
        std::process::exit(2);
    }

    init_logging(&config.log_level);
    info!(
        "Starting {} at {}x{}",
        config.window.title, config.window.width, config.window.height
    );

    if let Err(e) = orrery::app::run(config) {
        error!("{}", e);
        std::process::exit(1);
    }
}
