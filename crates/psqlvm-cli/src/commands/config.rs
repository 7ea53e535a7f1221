//! `psqlvm config`.

use super::Context;
use psqlvm_config::default_config_path;
use psqlvm_core::{Error, Result};

/// Show the effective configuration and the directories it resolves to.
pub fn show(ctx: &Context) -> Result<i32> {
    let output = &ctx.output;
    let settings = &ctx.settings;

    output.header("Directories");
    output.list_item("home", &settings.paths.home().display().to_string());
    output.list_item(
        "install root",
        &settings.paths.install_root().display().to_string(),
    );
    output.list_item(
        "downloads",
        &settings.paths.download_dir().display().to_string(),
    );
    output.list_item(
        "active",
        &settings
            .paths
            .active_dir_for(settings.config.activation.mode)
            .display()
            .to_string(),
    );
    output.list_item(
        "config file",
        &settings
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none, using defaults)".to_string()),
    );
    output.header("Effective configuration");

    let toml = settings
        .config
        .to_file_layer()
        .to_toml()
        .map_err(Error::from)?;
    output.println(toml.trim_end());
    Ok(0)
}

/// Print the path of the config file in use, or where one would be read from.
pub fn path(ctx: &Context) -> Result<i32> {
    match ctx.settings.config_file.clone().or_else(default_config_path) {
        Some(path) => {
            ctx.output.println(&path.display().to_string());
            Ok(0)
        }
        None => {
            ctx.output.error("Could not determine config path");
            Ok(1)
        }
    }
}
