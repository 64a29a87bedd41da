use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Config, ConfigError};

/// Ordered list of config file locations searched from lowest to highest
/// priority. Later files override earlier ones.
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("/etc/scenario-bot/config.yaml"));

    if let Some(cfg) = dirs::config_dir() {
        paths.push(cfg.join("scenario-bot/config.yaml"));
    }

    paths.push(PathBuf::from(".scenario-bot.yaml"));
    paths.push(PathBuf::from("scenario-bot.yaml"));

    paths
}

/// Load configuration by merging all discovered YAML files, with `extra`
/// (e.g. a `--config` CLI flag) applied last, and `BOT_TOKEN` overriding the
/// `token` field if set. Fails validation (`Config::validate`) before
/// returning.
pub fn load(extra: Option<&Path>) -> Result<Config, ConfigError> {
    let mut merged = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());

    for path in config_search_paths() {
        if path.is_file() {
            debug!(path = %path.display(), "loading config layer");
            merge_file(&mut merged, &path)?;
        }
    }

    if let Some(p) = extra {
        debug!(path = %p.display(), "loading explicit config");
        merge_file(&mut merged, p)?;
    }

    let mut config: Config = serde_yaml::from_value(merged)
        .map_err(|source| ConfigError::Parse { path: "<merged>".into(), source })?;

    if let Ok(token) = std::env::var("BOT_TOKEN") {
        if !token.is_empty() {
            config.token = token;
        }
    }

    config.validate()?;
    Ok(config)
}

fn merge_file(dst: &mut serde_yaml::Value, path: &Path) -> Result<(), ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let layer: serde_yaml::Value = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    merge_yaml(dst, layer);
    Ok(())
}

/// Deep-merge `src` into `dst`; `src` wins on scalar conflicts.
fn merge_yaml(dst: &mut serde_yaml::Value, src: serde_yaml::Value) {
    match (dst, src) {
        (serde_yaml::Value::Mapping(d), serde_yaml::Value::Mapping(s)) => {
            for (k, v) in s {
                let entry = d
                    .entry(k)
                    .or_insert(serde_yaml::Value::Mapping(serde_yaml::Mapping::new()));
                merge_yaml(entry, v);
            }
        }
        (dst, src) => *dst = src,
    }
}
