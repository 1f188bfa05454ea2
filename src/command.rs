//! Command shapes and the text-to-command normalizer.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::devices::{resolve_device, DeviceRegistry};
use crate::error::{ToolError, ToolResult};
use crate::intent::{parse_intent, Action};

pub const COULD_NOT_PARSE: &str =
    "Sorry — I couldn't parse that. Try: 'turn on desk lamp' or 'set thermostat to 24'.";
pub const DEVICE_NOT_FOUND: &str = "Device not found in your device list. \
     Run 'smart_home_discover' to see device names you can use.";

/// Action-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandParams {
    #[default]
    None,
    SetTemperature {
        value: i64,
    },
}

impl CommandParams {
    pub fn temperature(&self) -> Option<i64> {
        match self {
            CommandParams::SetTemperature { value } => Some(*value),
            CommandParams::None => None,
        }
    }

    /// Lift a loose JSON params object into the tagged form. Only an
    /// integer `temperature` key is meaningful; anything else is ignored.
    pub fn from_json(params: Option<&Map<String, Value>>) -> ToolResult<Self> {
        let Some(temp) = params.and_then(|p| p.get("temperature")) else {
            return Ok(CommandParams::None);
        };
        match temp {
            Value::Null => Ok(CommandParams::None),
            Value::Number(n) => n
                .as_i64()
                .map(|value| CommandParams::SetTemperature { value })
                .ok_or_else(|| ToolError::invalid_params("temperature must be an integer")),
            _ => Err(ToolError::invalid_params("temperature must be an integer")),
        }
    }
}

/// Classifier + resolver output, consumed immediately by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub action: Option<Action>,
    pub device_id: Option<String>,
    pub params: CommandParams,
}

/// A pre-parsed request. The device id and the action are validated only
/// when dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredCommand {
    pub device_id: String,
    pub action: String,
    pub params: CommandParams,
}

impl StructuredCommand {
    pub fn new(device_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            action: action.into(),
            params: CommandParams::None,
        }
    }

    pub fn with_params(mut self, params: CommandParams) -> Self {
        self.params = params;
        self
    }
}

/// Wire shape of the structured-command tool arguments.
#[derive(Debug, Deserialize)]
pub struct StructuredCommandArgs {
    pub device_id: String,
    #[serde(alias = "command")]
    pub action: String,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

impl TryFrom<StructuredCommandArgs> for StructuredCommand {
    type Error = ToolError;

    fn try_from(args: StructuredCommandArgs) -> ToolResult<Self> {
        let params = CommandParams::from_json(args.params.as_ref())?;
        Ok(StructuredCommand::new(args.device_id, args.action).with_params(params))
    }
}

/// Outcome of normalizing free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Ready(StructuredCommand),
    /// Terminal reply; nothing is dispatched.
    Rejected(&'static str),
}

/// Run classifier and resolver over a sentence.
pub fn parse_command(text: &str, registry: &DeviceRegistry) -> ParsedCommand {
    let Some(intent) = parse_intent(text) else {
        return ParsedCommand {
            action: None,
            device_id: None,
            params: CommandParams::None,
        };
    };
    let device_id = resolve_device(text, registry).map(|d| d.id.clone());
    let params = intent
        .temperature
        .map(|value| CommandParams::SetTemperature { value })
        .unwrap_or_default();
    ParsedCommand {
        action: Some(intent.action),
        device_id,
        params,
    }
}

/// Turn a parsed command into something dispatchable, or a terminal reply.
pub fn normalize(parsed: ParsedCommand) -> Normalized {
    let Some(action) = parsed.action else {
        return Normalized::Rejected(COULD_NOT_PARSE);
    };
    let Some(device_id) = parsed.device_id else {
        return Normalized::Rejected(DEVICE_NOT_FOUND);
    };
    Normalized::Ready(StructuredCommand::new(device_id, action.as_str()).with_params(parsed.params))
}
