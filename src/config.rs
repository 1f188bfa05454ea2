use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::camera::CameraCredentials;
use crate::devices::{Device, DeviceClass};

pub fn config_path() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("home-dispatch")
        .join("config.toml")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub auth_token: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8086
}

impl ServerConfig {
    /// The server refuses to start without a non-blank token.
    pub fn is_configured(&self) -> bool {
        !self.auth_token.trim().is_empty()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth_token: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default = "default_onvif_port")]
    pub onvif_port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_camera_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,
}

fn default_onvif_port() -> u16 {
    8000
}

fn default_camera_timeout() -> u64 {
    10
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            onvif_port: default_onvif_port(),
            username: String::new(),
            password: String::new(),
            timeout_secs: default_camera_timeout(),
            ffmpeg: default_ffmpeg(),
        }
    }
}

impl CameraConfig {
    /// Host, user and password must all be set; the port always has a value.
    pub fn credentials(&self) -> Option<CameraCredentials> {
        if self.host.is_empty() || self.username.is_empty() || self.password.is_empty() {
            return None;
        }
        Some(CameraCredentials {
            host: self.host.clone(),
            port: self.onvif_port,
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

fn default_user_agent() -> String {
    "Puch/1.0 (Autonomous)".to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

/// A `[[devices]]` entry. Capabilities follow from the type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(rename = "type", default)]
    pub class: DeviceClass,
}

impl DeviceEntry {
    pub fn to_device(&self) -> Device {
        Device::new(&self.id, &self.name, self.aliases.clone(), self.class)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Returned by the `validate` tool.
    #[serde(default)]
    pub owner_number: String,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub devices: Vec<DeviceEntry>,
}

impl Config {
    /// Read the TOML file (defaults when absent), then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override settings from `AUTH_TOKEN`, `MY_NUMBER`, `CAMERA_IP`,
    /// `ONVIF_PORT`, `ONVIF_USER` and `ONVIF_PASS`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("AUTH_TOKEN") {
            self.server.auth_token = v;
        }
        if let Some(v) = get("MY_NUMBER") {
            self.owner_number = v;
        }
        if let Some(v) = get("CAMERA_IP") {
            self.camera.host = v;
        }
        if let Some(v) = get("ONVIF_PORT") {
            self.camera.onvif_port = v
                .trim()
                .parse()
                .with_context(|| format!("invalid ONVIF_PORT: {v}"))?;
        }
        if let Some(v) = get("ONVIF_USER") {
            self.camera.username = v;
        }
        if let Some(v) = get("ONVIF_PASS") {
            self.camera.password = v;
        }
        Ok(())
    }

    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)?;
        std::fs::write(&path, text)?;
        Ok(())
    }
}
