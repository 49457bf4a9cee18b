//! Config file location.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Config file name.
const CONFIG_FILE: &str = "config.toml";

/// Application directory under the XDG config root.
const APP_DIR: &str = "streamkit";

/// Resolves the config file path.
///
/// Precedence: `{dir}/config.toml`, then
/// `$XDG_CONFIG_HOME/streamkit/config.toml`, then
/// `~/.config/streamkit/config.toml`.
///
/// # Errors
///
/// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` is usable
/// (when `dir` is `None`).
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    config_path_from(
        dir.map(PathBuf::as_path),
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

/// Applies the lookup order to already-read environment values.
fn config_path_from(
    dir: Option<&Path>,
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }

    // Relative XDG values are invalid and ignored.
    let root = match (xdg_config_home.filter(|p| p.is_absolute()), home) {
        (Some(xdg), _) => xdg,
        (None, Some(home)) if !home.as_os_str().is_empty() => home.join(".config"),
        _ => bail!("cannot locate config directory: neither XDG_CONFIG_HOME nor HOME is set"),
    };
    Ok(root.join(APP_DIR).join(CONFIG_FILE))
}
