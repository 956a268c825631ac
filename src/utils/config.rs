use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

pub const ENV_FILE: &str = ".env";

const DB_PATH_KEY: &str = "CATALOG_DB_PATH";
const IMAGE_DIR_KEY: &str = "CATALOG_IMAGE_DIR";
const BIND_KEY: &str = "CATALOG_BIND";
const FRONT_URL_KEY: &str = "FRONT_URL";
const MAX_UPLOAD_MB_KEY: &str = "CATALOG_MAX_UPLOAD_MB";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub image_dir: PathBuf,
    pub bind: String,
    /// Origin allowed by CORS.
    pub front_url: String,
    /// Largest accepted `POST /items` body, in MiB.
    pub max_upload_mb: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("db/catalog.sqlite3"),
            image_dir: PathBuf::from("images"),
            bind: "0.0.0.0:9000".to_string(),
            front_url: "http://localhost:3000".to_string(),
            max_upload_mb: 32,
        }
    }
}

impl Config {
    /// Defaults, then `.env` if present, then the process environment.
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        let env_path = Path::new(ENV_FILE);
        if env_path.exists() {
            load_from_env(env_path, &mut config)?;
            info!("Loaded configuration from {}", ENV_FILE);
        }

        config.apply(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn apply(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(DB_PATH_KEY) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = lookup(IMAGE_DIR_KEY) {
            self.image_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(BIND_KEY) {
            self.bind = value;
        }
        if let Some(value) = lookup(FRONT_URL_KEY) {
            if !value.is_empty() {
                self.front_url = value;
            }
        }
        if let Some(value) = lookup(MAX_UPLOAD_MB_KEY) {
            match value.parse() {
                Ok(mb) => self.max_upload_mb = mb,
                Err(e) => warn!("Ignoring {}={:?}: {}", MAX_UPLOAD_MB_KEY, value, e),
            }
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn load_from_env(path: &Path, config: &mut Config) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let reader = BufReader::new(file);

    let mut values = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            values.push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    config.apply(|key| {
        values
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    });
    Ok(())
}

pub fn save_to_env(path: &Path, config: &Config) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    writeln!(file, "{}={}", DB_PATH_KEY, config.db_path.display())?;
    writeln!(file, "{}={}", IMAGE_DIR_KEY, config.image_dir.display())?;
    writeln!(file, "{}={}", BIND_KEY, config.bind)?;
    writeln!(file, "{}={}", FRONT_URL_KEY, config.front_url)?;
    writeln!(file, "{}={}", MAX_UPLOAD_MB_KEY, config.max_upload_mb)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    #[test]
    fn test_save_and_load_env() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("test_env_file");
        let config = Config {
            db_path: PathBuf::from("/tmp/catalog.sqlite3"),
            image_dir: PathBuf::from("/tmp/images"),
            bind: "127.0.0.1:9100".to_string(),
            front_url: "http://example.test".to_string(),
            max_upload_mb: 8,
        };

        save_to_env(&path, &config)?;

        let content = fs::read_to_string(&path)?;
        assert!(content.contains("CATALOG_DB_PATH=/tmp/catalog.sqlite3"));
        assert!(content.contains("FRONT_URL=http://example.test"));

        let mut loaded = Config::default();
        load_from_env(&path, &mut loaded)?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_partial_env_keeps_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("partial_env");
        fs::write(&path, "# local overrides\nCATALOG_IMAGE_DIR = uploads\nUNRELATED=1\n")?;

        let mut loaded = Config::default();
        load_from_env(&path, &mut loaded)?;
        assert_eq!(loaded.image_dir, PathBuf::from("uploads"));
        assert_eq!(loaded.db_path, Config::default().db_path);
        assert_eq!(loaded.bind, Config::default().bind);
        Ok(())
    }

    #[test]
    fn test_empty_front_url_keeps_default() {
        let vars: HashMap<&str, &str> = [("FRONT_URL", ""), ("CATALOG_BIND", "127.0.0.1:1")].into();
        let mut config = Config::default();
        config.apply(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.front_url, "http://localhost:3000");
        assert_eq!(config.bind, "127.0.0.1:1");
    }

    #[test]
    fn test_upload_limit_parsing() {
        let mut config = Config::default();
        config.apply(|key| (key == "CATALOG_MAX_UPLOAD_MB").then(|| "not a number".to_string()));
        assert_eq!(config.max_upload_mb, 32);

        config.apply(|key| (key == "CATALOG_MAX_UPLOAD_MB").then(|| "5".to_string()));
        assert_eq!(config.max_upload_bytes(), 5 * 1024 * 1024);
    }
}
