//! Configuration loading: a TOML file read at startup, clamped to valid
//! ranges on load, with built-in defaults substituted on any read or
//! parse error. Config is advisory, so a bad file degrades to defaults
//! rather than failing startup.

use serde::Deserialize;
use std::path::PathBuf;
use teco_types::{DEFAULT_MMX, DEFAULT_MQX, Radix};
use tracing::warn;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct LimitsConfig {
    pub mqx: Option<usize>,
    pub mmx: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    #[serde(default = "EngineConfig::default_radix")]
    pub radix: u32,
    #[serde(default)]
    pub trace: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            radix: Self::default_radix(),
            trace: false,
        }
    }
}

impl EngineConfig {
    const fn default_radix() -> u32 {
        10
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// The resolved, ready-to-use configuration: the raw parsed file plus the
/// clamped values a caller actually needs (`MQX`/`MMX` bounds, default
/// radix, trace-mode default).
#[derive(Debug, Clone)]
pub struct Config {
    pub file: ConfigFile,
    pub mqx: usize,
    pub mmx: usize,
    pub radix: Radix,
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(ConfigFile::default())
    }
}

impl Config {
    fn from_file(file: ConfigFile) -> Self {
        let mqx = file.limits.mqx.unwrap_or(DEFAULT_MQX);
        let mmx = file.limits.mmx.unwrap_or(DEFAULT_MMX);
        let radix = match Radix::from_value(i64::from(file.engine.radix)) {
            Ok(r) => r,
            Err(_) => {
                warn!(
                    target: "config",
                    requested = file.engine.radix,
                    "invalid engine.radix, falling back to decimal"
                );
                Radix::Decimal
            }
        };
        let trace = file.engine.trace;
        Self {
            file,
            mqx,
            mmx,
            radix,
            trace,
        }
    }
}

/// Best-effort config path: a local `teco.toml` takes precedence over the
/// platform config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("teco.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("teco").join("teco.toml");
    }
    PathBuf::from("teco.toml")
}

pub fn load_from(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = std::fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config::from_file(file)),
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e,
                "config parse error, using defaults"
            );
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_teco_toml__"))).unwrap();
        assert_eq!(cfg.mqx, DEFAULT_MQX);
        assert_eq!(cfg.mmx, DEFAULT_MMX);
        assert_eq!(cfg.radix, Radix::Decimal);
        assert!(!cfg.trace);
    }

    #[test]
    fn parses_limits_and_engine_values() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[limits]\nmqx = 8\nmmx = 12\n[engine]\nradix = 16\ntrace = true\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.mqx, 8);
        assert_eq!(cfg.mmx, 12);
        assert_eq!(cfg.radix, Radix::Hex);
        assert!(cfg.trace);
    }

    #[test]
    fn partial_file_falls_back_per_field() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[limits]\nmqx = 4\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.mqx, 4);
        assert_eq!(cfg.mmx, DEFAULT_MMX);
        assert_eq!(cfg.radix, Radix::Decimal);
    }

    #[test]
    fn invalid_radix_falls_back_to_decimal() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[engine]\nradix = 2\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.radix, Radix::Decimal);
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "limits = not valid toml [[[").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.mqx, DEFAULT_MQX);
        assert_eq!(cfg.mmx, DEFAULT_MMX);
    }
}
