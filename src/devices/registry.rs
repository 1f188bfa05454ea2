use crate::error::{ToolError, ToolResult};

use super::{Device, DeviceClass};

/// In-process device store. Iteration follows insertion order, which is
/// also the order the resolver tries devices in.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four devices every fresh process starts with.
    pub fn with_defaults() -> Self {
        let devices = vec![
            Device::new(
                "lamp",
                "Desk Lamp",
                vec!["desk lamp".to_string(), "lamp".to_string()],
                DeviceClass::Light,
            )
            .with_capabilities(&["on_off"]),
            Device::new(
                "therm",
                "Living-Room Thermostat",
                vec!["thermostat".to_string()],
                DeviceClass::Thermostat,
            )
            .with_capabilities(&["set_temperature", "on_off"]),
            Device::new(
                "plug",
                "Coffee Plug",
                vec!["coffee maker".to_string()],
                DeviceClass::Plug,
            )
            .with_capabilities(&["on_off"]),
            Device::new(
                "cam",
                "Security Camera",
                vec!["camera".to_string(), "security cam".to_string()],
                DeviceClass::Camera,
            )
            .with_capabilities(&["reboot", "get_status", "take_snapshot"]),
        ];
        Self { devices }
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    /// Insert a fully-formed device. Duplicate ids and blank names or
    /// aliases are rejected and leave the registry untouched; a blank name
    /// would be a substring of every sentence.
    pub fn insert(&mut self, device: Device) -> ToolResult<()> {
        if device.id.trim().is_empty() {
            return Err(ToolError::invalid_params("Device id must not be empty"));
        }
        if device.name.trim().is_empty() {
            return Err(ToolError::invalid_params("Device name must not be empty"));
        }
        if device.aliases.iter().any(|a| a.trim().is_empty()) {
            return Err(ToolError::invalid_params("Device aliases must not be empty"));
        }
        if self.contains(&device.id) {
            return Err(ToolError::invalid_params("Device id already exists"));
        }
        self.devices.push(device);
        Ok(())
    }

    /// Runtime "add device": capabilities come from the class alone.
    pub fn add_device(
        &mut self,
        id: &str,
        name: &str,
        aliases: Vec<String>,
        class: DeviceClass,
    ) -> ToolResult<&Device> {
        self.insert(Device::new(id, name, aliases, class))?;
        tracing::info!(id, name, class = %class, "device added");
        Ok(&self.devices[self.devices.len() - 1])
    }

    /// Text listing returned by the discover tool.
    pub fn listing(&self) -> String {
        let mut lines = vec!["Discovered devices:".to_string()];
        lines.extend(self.devices.iter().map(Device::summary_line));
        lines.join("\n")
    }
}
