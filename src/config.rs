use crate::error::CatalogError;
use crate::present::YearLabels;
use crate::tmdb::TMDB_BASE;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::{env, fs, net::SocketAddr, path::Path};
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "config.yaml";
const DEFAULT_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub addr: SocketAddr,
    pub api_base: String,
    pub include_adult: bool,
    pub year_labels: YearLabels,
}

/// Shape of the optional `config.yaml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub token: Option<String>,
}

impl Config {
    /// Reads the process environment, falling back to the YAML file for the token.
    pub fn load() -> Result<Self> {
        let path = env::var("BLUNT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let env_token = env_value("TMDB_TOKEN");
        let file = match env_token {
            Some(_) => FileConfig::default(),
            None => read_file_config(Path::new(&path))?,
        };
        let token = resolve_token(env_token, file, &path)?;

        let addr = env_value("BLUNT_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse()
            .context("BLUNT_ADDR is not a valid socket address")?;
        let include_adult = match env_value("TMDB_INCLUDE_ADULT") {
            Some(v) => parse_bool(&v)
                .ok_or_else(|| anyhow!("TMDB_INCLUDE_ADULT must be true or false, got '{}'", v))?,
            None => false,
        };

        let defaults = YearLabels::default();
        // Labels may legitimately be empty, so presence is checked with env::var directly.
        let year_labels = YearLabels {
            search: env::var("BLUNT_SEARCH_EMPTY_YEAR").unwrap_or(defaults.search),
            detail: env::var("BLUNT_DETAIL_EMPTY_YEAR").unwrap_or(defaults.detail),
        };

        Ok(Self {
            token,
            addr,
            api_base: env_value("TMDB_API_BASE").unwrap_or_else(|| TMDB_BASE.to_string()),
            include_adult,
            year_labels,
        })
    }
}

/// `TMDB_TOKEN` wins over the file. With neither, the error downcasts to
/// `CatalogError::MissingCredential`.
pub fn resolve_token(env_token: Option<String>, file: FileConfig, path: &str) -> Result<String> {
    if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
        info!("Using TMDB token from TMDB_TOKEN");
        return Ok(token);
    }
    match file.token.filter(|t| !t.trim().is_empty()) {
        Some(token) => {
            info!("Using TMDB token from {}", path);
            Ok(token)
        }
        None => Err(CatalogError::MissingCredential)
            .with_context(|| format!("Set TMDB_TOKEN or 'token' in {}", path)),
    }
}

pub fn read_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_file_config(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_file_config(text: &str) -> Result<FileConfig> {
    if text.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    Ok(serde_yaml::from_str(text)?)
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
