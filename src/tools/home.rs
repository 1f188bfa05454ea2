//! Smart-home tools: discover, free-text command, structured execute, add.

use std::sync::{Arc, RwLock};

use serde::Deserialize;
use serde_json::json;

use crate::camera::CameraAdapter;
use crate::command::{normalize, parse_command, Normalized, StructuredCommand};
use crate::config::Config;
use crate::devices::{DeviceClass, DeviceRegistry};
use crate::dispatch::{Dispatcher, SharedRegistry};
use crate::error::{ToolError, ToolResult};

use super::{rich_description, ToolDef, ToolOutput};

#[derive(Debug, Deserialize)]
pub struct CommandArgs {
    #[serde(default)]
    pub command_text: String,
}

#[derive(Debug, Deserialize)]
pub struct AddDeviceArgs {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub aliases: Option<Vec<String>>,
    #[serde(rename = "type", default = "default_type")]
    pub class: String,
}

fn default_type() -> String {
    "light".to_string()
}

pub struct HomeTool {
    dispatcher: Dispatcher,
}

impl HomeTool {
    pub fn new(registry: DeviceRegistry, camera: CameraAdapter) -> Self {
        let shared: SharedRegistry = Arc::new(RwLock::new(registry));
        Self {
            dispatcher: Dispatcher::new(shared, camera),
        }
    }

    /// Seed devices, then the configured ones. Duplicate ids in the config
    /// are skipped.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = DeviceRegistry::with_defaults();
        for entry in &config.devices {
            if let Err(e) = registry.insert(entry.to_device()) {
                tracing::warn!(id = %entry.id, "skipping configured device: {e}");
            }
        }
        let camera = CameraAdapter::from_config(&config.camera);
        if !camera.is_configured() {
            tracing::warn!("camera credentials not configured; camera commands will report it");
        }
        Self::new(registry, camera)
    }

    pub fn tool_defs() -> Vec<ToolDef> {
        vec![
            ToolDef {
                name: "smart_home_discover".to_string(),
                description: rich_description(
                    "Scan and list all connected smart home devices.",
                    "Use this tool when the user needs to see which devices are available and their capabilities before sending a command.",
                    Some("None. Only returns a list of devices and their details."),
                ),
                input_schema: json!({"type": "object", "properties": {}, "required": []}),
            },
            ToolDef {
                name: "smart_home_command".to_string(),
                description: rich_description(
                    "Control smart home devices by sending a plain-language text command. \
                     Supports lights, plugs, thermostats, and ONVIF-compatible security cameras.",
                    "Use this when the user wants to turn devices on/off, set temperatures, check status of devices, reboot a camera, or take snapshots or pictures of camera.",
                    Some("May change device states such as turning devices on/off, changing thermostat temperature, or rebooting a camera. Camera snapshot commands will return an image."),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "command_text": {
                            "type": "string",
                            "description": "Plain-language command like 'turn on desk lamp'"
                        }
                    },
                    "required": ["command_text"]
                }),
            },
            ToolDef {
                name: "smart_home_execute".to_string(),
                description: rich_description(
                    "Run an exact action on a device by id.",
                    "Use this when the device id and action are already known, e.g. from smart_home_discover.",
                    Some("Same as smart_home_command."),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "device_id": {"type": "string", "description": "Device id from the discovery list"},
                        "action": {
                            "type": "string",
                            "description": "turn_on | turn_off | set_temperature | get_status | reboot | take_snapshot"
                        },
                        "params": {
                            "type": "object",
                            "description": "Action parameters, e.g. {\"temperature\": 24}",
                            "properties": {"temperature": {"type": "integer"}}
                        }
                    },
                    "required": ["device_id", "action"]
                }),
            },
            ToolDef {
                name: "smart_home_add_device".to_string(),
                description: rich_description(
                    "Add a new mock smart device into the system for testing or demonstration purposes.",
                    "Use this tool when you want to simulate a new smart device without using real hardware.",
                    Some("Updates the in-memory device store, making the new device available for control."),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "id": {"type": "string", "description": "Unique device id e.g. dev-xyz"},
                        "name": {"type": "string", "description": "Human friendly name"},
                        "aliases": {
                            "type": "array",
                            "items": {"type": "string"},
                            "description": "List of searchable aliases"
                        },
                        "type": {
                            "type": "string",
                            "enum": ["light", "thermostat", "plug", "camera"],
                            "default": "light",
                            "description": "Device type, e.g., 'light' or 'thermostat'"
                        }
                    },
                    "required": ["id", "name"]
                }),
            },
        ]
    }

    pub fn discover(&self) -> String {
        self.dispatcher
            .registry()
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .listing()
    }

    /// Free text in, result or terminal reply out.
    pub async fn command(&self, text: &str) -> ToolResult<ToolOutput> {
        if text.trim().is_empty() {
            return Err(ToolError::invalid_params("Please provide a text command."));
        }

        let normalized = {
            let registry = self
                .dispatcher
                .registry()
                .read()
                .unwrap_or_else(|e| e.into_inner());
            normalize(parse_command(text, &registry))
        };

        match normalized {
            Normalized::Rejected(reply) => {
                tracing::debug!(text, reply, "command rejected");
                Ok(ToolOutput::text(reply))
            }
            Normalized::Ready(command) => self.dispatcher.dispatch(&command).await,
        }
    }

    pub async fn execute(&self, command: StructuredCommand) -> ToolResult<ToolOutput> {
        self.dispatcher.dispatch(&command).await
    }

    pub fn add_device(&self, args: AddDeviceArgs) -> ToolResult<String> {
        let class: DeviceClass = args.class.parse().map_err(ToolError::InvalidParams)?;
        let mut registry = self
            .dispatcher
            .registry()
            .write()
            .unwrap_or_else(|e| e.into_inner());
        let device = registry.add_device(
            &args.id,
            &args.name,
            args.aliases.unwrap_or_default(),
            class,
        )?;
        Ok(format!("Added device {} | {}", device.id, device.name))
    }
}
