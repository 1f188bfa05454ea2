//! Stateless responder for simulated lights, plugs and thermostats.

use crate::command::StructuredCommand;
use crate::devices::Device;
use crate::error::{ToolError, ToolResult};

/// Never mutates the device; `online` is only reported.
pub fn execute(device: &Device, command: &StructuredCommand) -> ToolResult<String> {
    let name = &device.name;
    match command.action.as_str() {
        "turn_on" => Ok(format!("OK: Mock {name} is now ON")),
        "turn_off" => Ok(format!("OK: Mock {name} is now OFF")),
        "get_status" => {
            let state = if device.online { "online" } else { "offline" };
            Ok(format!("OK: Mock {name} is {state}"))
        }
        "set_temperature" => {
            let temp = command
                .params
                .temperature()
                .ok_or_else(|| ToolError::invalid_params("Missing temperature"))?;
            Ok(format!("OK: Mock {name} temperature set to {temp}°C"))
        }
        other => Err(ToolError::invalid_params(format!(
            "Unsupported command '{other}' for device type '{}'",
            device.class
        ))),
    }
}
