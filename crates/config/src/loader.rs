use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::PlazaConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["plaza.toml", "plaza.yaml", "plaza.yml", "plaza.json"];

/// Override for the config directory, set via `set_config_dir()`.
static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Set a custom config directory. When set, config discovery only looks in
/// this directory (project-local and user-global paths are skipped).
/// Can be called multiple times (e.g. in tests); each call replaces the
/// previous override.
pub fn set_config_dir(path: PathBuf) {
    *CONFIG_DIR_OVERRIDE.lock().unwrap() = Some(path);
}

/// Clear the config directory override, restoring default discovery.
pub fn clear_config_dir() {
    *CONFIG_DIR_OVERRIDE.lock().unwrap() = None;
}

fn config_dir_override() -> Option<PathBuf> {
    CONFIG_DIR_OVERRIDE.lock().unwrap().clone()
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<PlazaConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./plaza.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/plaza/plaza.{toml,yaml,yml,json}` (user-global)
///
/// Returns `PlazaConfig::default()` if no config file is found.
pub fn discover_and_load() -> PlazaConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    }
    PlazaConfig::default()
}

/// Find the first config file in standard locations.
///
/// When a config dir override is set, only that directory is searched —
/// project-local and user-global paths are skipped for isolation.
fn find_config_file() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        for name in CONFIG_FILENAMES {
            let p = dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
        // Override is set — don't fall through to other locations.
        return None;
    }

    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/plaza/
    if let Some(dir) = home_dir().map(|h| h.join(".config").join("plaza")) {
        for name in CONFIG_FILENAMES {
            let p = dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

/// Returns the config directory: override, or `~/.config/plaza/` on all platforms.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = config_dir_override() {
        return Some(dir);
    }
    home_dir().map(|h| h.join(".config").join("plaza"))
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Returns the path of an existing config file, or the default TOML path.
pub fn find_or_default_config_path() -> PathBuf {
    if let Some(path) = find_config_file() {
        return path;
    }
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plaza.toml")
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<PlazaConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        set_config_dir(dir.path().to_path_buf());
        let cfg = discover_and_load();
        clear_config_dir();
        assert_eq!(cfg.auth.token_ttl_secs, 3600);
        assert!(cfg.session.announce_joins);
    }

    #[test]
    fn test_load_toml_with_env_substitution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plaza.toml");
        unsafe { std::env::set_var("PLAZA_TEST_ISSUER", "http://localhost:9100/token") };
        std::fs::write(
            &path,
            "[auth]\nissuer_url = \"${PLAZA_TEST_ISSUER}\"\ntoken_ttl_secs = 120\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        unsafe { std::env::remove_var("PLAZA_TEST_ISSUER") };
        assert_eq!(
            cfg.auth.issuer_url.as_deref(),
            Some("http://localhost:9100/token")
        );
        assert_eq!(cfg.auth.token_ttl_secs, 120);
        // Unset sections fall back to defaults.
        assert_eq!(cfg.session.town_label, "Town Chat");
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plaza.ini");
        std::fs::write(&path, "auth=1").unwrap();
        assert!(load_config(&path).is_err());
    }
}
