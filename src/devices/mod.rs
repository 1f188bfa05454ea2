//! Devices known to the dispatcher: identity, aliases and class.

pub mod registry;
pub mod resolver;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use registry::DeviceRegistry;
pub use resolver::resolve_device;

/// Closed set of device classes. The class decides both which actions are
/// legal and whether the mock or the camera path executes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Light,
    Thermostat,
    Plug,
    Camera,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Light => "light",
            DeviceClass::Thermostat => "thermostat",
            DeviceClass::Plug => "plug",
            DeviceClass::Camera => "camera",
        }
    }

    /// Capabilities assigned when a device is added at runtime.
    pub fn default_capabilities(&self) -> Vec<String> {
        match self {
            DeviceClass::Thermostat => vec!["set_temperature".to_string()],
            _ => vec!["on_off".to_string()],
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(DeviceClass::Light),
            "thermostat" => Ok(DeviceClass::Thermostat),
            "plug" => Ok(DeviceClass::Plug),
            "camera" => Ok(DeviceClass::Camera),
            other => Err(format!("Unknown device type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    /// Lower-cased phrases matched against free text.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(rename = "type")]
    pub class: DeviceClass,
    /// Informational only, never polled or mutated by commands.
    #[serde(default = "default_online")]
    pub online: bool,
    /// Advisory metadata; dispatch does not consult it.
    #[serde(default)]
    pub capabilities: Vec<String>,
}

fn default_online() -> bool {
    true
}

impl Device {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        aliases: Vec<String>,
        class: DeviceClass,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            aliases: aliases.into_iter().map(|a| a.to_lowercase()).collect(),
            class,
            online: true,
            capabilities: class.default_capabilities(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: &[&str]) -> Self {
        self.capabilities = capabilities.iter().map(|c| c.to_string()).collect();
        self
    }

    /// One line of the discovery listing.
    pub fn summary_line(&self) -> String {
        format!(
            "- {} | {} | aliases={} | type={} | caps={} | online={}",
            self.id,
            self.name,
            quoted_list(&self.aliases),
            self.class,
            quoted_list(&self.capabilities),
            self.online
        )
    }
}

fn quoted_list(items: &[String]) -> String {
    let inner = items
        .iter()
        .map(|s| format!("'{s}'"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{inner}]")
}
