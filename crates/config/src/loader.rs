use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{env_subst::substitute_env, schema::BellbotConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["bellbot.toml", "bellbot.json"];

/// Load configuration.
///
/// An explicit path must exist and parse; otherwise the standard locations
/// are searched. There is no usable default — the bot token and operator
/// chat id are mandatory — so a missing config is an error.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<BellbotConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_config_file().ok_or_else(|| {
            anyhow::anyhow!(
                "no config file found (looked for bellbot.{{toml,json}} in . and ~/.config/bellbot/)"
            )
        })?,
    };
    debug!(path = %path.display(), "loading config");
    load_file(&path)
}

fn load_file(path: &Path) -> anyhow::Result<BellbotConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    match ext {
        "toml" => Ok(toml::from_str(&raw)?),
        "json" => Ok(serde_json::from_str(&raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

/// Find the first config file in standard locations: project-local `./`,
/// then the user-global `~/.config/bellbot/`.
#[must_use]
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "bellbot") {
        let config_dir = dirs.config_dir();
        for name in CONFIG_FILENAMES {
            let p = config_dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}
