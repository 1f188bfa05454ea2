pub mod fetch;
pub mod home;

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::{ToolError, ToolResult};

/// A tool definition advertised to the calling agent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Structured description: what the tool does, when to reach for it, and
/// what it changes. Serialized to JSON as the tool's description string.
#[derive(Debug, Serialize)]
struct RichDescription<'a> {
    description: &'a str,
    use_when: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    side_effects: Option<&'a str>,
}

pub(crate) fn rich_description(
    description: &str,
    use_when: &str,
    side_effects: Option<&str>,
) -> String {
    let rich = RichDescription {
        description,
        use_when,
        side_effects,
    };
    serde_json::to_string(&rich).unwrap_or_else(|_| description.to_string())
}

/// Result payload of a tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Text(String),
    Image { data: Vec<u8>, mime_type: String },
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        ToolOutput::Text(text.into())
    }

    pub fn png(data: Vec<u8>) -> Self {
        ToolOutput::Image {
            data,
            mime_type: "image/png".to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolOutput::Text(text) => Some(text),
            ToolOutput::Image { .. } => None,
        }
    }

    /// One JSON-RPC content item: `{type:"text"}` or base64 `{type:"image"}`.
    pub fn to_content(&self) -> Value {
        match self {
            ToolOutput::Text(text) => json!({"type": "text", "text": text}),
            ToolOutput::Image { data, mime_type } => json!({
                "type": "image",
                "data": B64.encode(data),
                "mimeType": mime_type,
            }),
        }
    }
}

/// Decode tool arguments into a typed struct. Missing `arguments` is an
/// empty object.
fn args<T: DeserializeOwned>(input: &Value) -> ToolResult<T> {
    let input = if input.is_null() { json!({}) } else { input.clone() };
    serde_json::from_value(input)
        .map_err(|e| ToolError::invalid_params(format!("Invalid arguments: {e}")))
}

/// All tools served to the agent.
pub struct ToolRegistry {
    pub home: home::HomeTool,
    pub web: fetch::FetchTool,
    owner_number: String,
}

impl ToolRegistry {
    pub fn new(config: &Config) -> Self {
        Self {
            home: home::HomeTool::from_config(config),
            web: fetch::FetchTool::new(&config.fetch),
            owner_number: config.owner_number.clone(),
        }
    }

    pub fn with_parts(home: home::HomeTool, web: fetch::FetchTool, owner_number: String) -> Self {
        Self {
            home,
            web,
            owner_number,
        }
    }

    /// Return all tool definitions for the agent.
    pub fn tool_defs(&self) -> Vec<ToolDef> {
        let mut defs = vec![ToolDef {
            name: "validate".to_string(),
            description: "Return the owner's phone number so the platform can bind this server."
                .to_string(),
            input_schema: json!({"type": "object", "properties": {}, "required": []}),
        }];
        defs.extend(home::HomeTool::tool_defs());
        defs.extend(fetch::FetchTool::tool_defs());
        defs
    }

    /// Execute a tool by name with the given JSON arguments.
    pub async fn execute(&self, name: &str, input: &Value) -> ToolResult<ToolOutput> {
        tracing::debug!(tool = name, "tool call");
        match name {
            "validate" => Ok(ToolOutput::text(self.owner_number.clone())),
            "smart_home_discover" => Ok(ToolOutput::Text(self.home.discover())),
            "smart_home_command" => {
                let a: home::CommandArgs = args(input)?;
                self.home.command(&a.command_text).await
            }
            "smart_home_execute" => {
                let a: crate::command::StructuredCommandArgs = args(input)?;
                self.home.execute(a.try_into()?).await
            }
            "smart_home_add_device" => {
                let a: home::AddDeviceArgs = args(input)?;
                self.home.add_device(a).map(ToolOutput::Text)
            }
            "fetch" => {
                let a: fetch::FetchArgs = args(input)?;
                self.web.fetch(&a).await.map(ToolOutput::Text)
            }
            "web_search" => {
                let a: fetch::SearchArgs = args(input)?;
                Ok(ToolOutput::Text(
                    self.web.web_search(&a.query, a.num_results).await,
                ))
            }
            _ => Err(ToolError::invalid_params(format!("Unknown tool: {name}"))),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::camera::CameraAdapter;
    use crate::config::{CameraConfig, FetchConfig};
    use crate::devices::DeviceRegistry;

    pub fn registry() -> ToolRegistry {
        ToolRegistry::with_parts(
            home::HomeTool::new(
                DeviceRegistry::with_defaults(),
                CameraAdapter::from_config(&CameraConfig::default()),
            ),
            fetch::FetchTool::new(&FetchConfig::default()),
            "919876543210".to_string(),
        )
    }

    // ── definitions ───────────────────────────────────────────────

    #[test]
    fn tool_names_are_unique_and_complete() {
        let defs = registry().tool_defs();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        for expected in [
            "validate",
            "smart_home_discover",
            "smart_home_command",
            "smart_home_execute",
            "smart_home_add_device",
            "fetch",
            "web_search",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
        let mut sorted = names.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
    }

    #[test]
    fn tool_def_serializes_input_schema_in_camel_case() {
        let v = serde_json::to_value(&registry().tool_defs()[0]).unwrap();
        assert!(v.get("inputSchema").is_some());
        assert!(v.get("input_schema").is_none());
    }

    #[test]
    fn rich_description_is_json() {
        let s = rich_description("Does a thing.", "When needed.", None);
        let v: Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["use_when"], "When needed.");
        assert!(v.get("side_effects").is_none());
    }

    // ── outputs ───────────────────────────────────────────────────

    #[test]
    fn image_content_is_base64() {
        let content = ToolOutput::png(vec![1, 2, 3]).to_content();
        assert_eq!(content["type"], "image");
        assert_eq!(content["mimeType"], "image/png");
        assert_eq!(content["data"], "AQID");
    }

    #[test]
    fn text_content() {
        let content = ToolOutput::text("hi").to_content();
        assert_eq!(content, json!({"type": "text", "text": "hi"}));
    }

    // ── execute ───────────────────────────────────────────────────

    #[tokio::test]
    async fn validate_returns_owner_number() {
        let out = registry().execute("validate", &Value::Null).await.unwrap();
        assert_eq!(out.as_text(), Some("919876543210"));
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let err = registry().execute("teleport", &json!({})).await.unwrap_err();
        assert_eq!(err, ToolError::invalid_params("Unknown tool: teleport"));
    }

    #[tokio::test]
    async fn command_routes_through_home_tool() {
        let out = registry()
            .execute(
                "smart_home_command",
                &json!({"command_text": "turn on desk lamp"}),
            )
            .await
            .unwrap();
        assert_eq!(out.as_text(), Some("OK: Mock Desk Lamp is now ON"));
    }

    #[tokio::test]
    async fn execute_accepts_params_object() {
        let out = registry()
            .execute(
                "smart_home_execute",
                &json!({"device_id": "therm", "action": "set_temperature", "params": {"temperature": 22}}),
            )
            .await
            .unwrap();
        assert_eq!(
            out.as_text(),
            Some("OK: Mock Living-Room Thermostat temperature set to 22°C")
        );
    }

    #[tokio::test]
    async fn execute_rejects_non_integer_temperature() {
        let err = registry()
            .execute(
                "smart_home_execute",
                &json!({"device_id": "therm", "action": "set_temperature", "params": {"temperature": "hot"}}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), crate::error::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn missing_required_argument_is_invalid_params() {
        let err = registry()
            .execute("smart_home_execute", &json!({"action": "turn_on"}))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid arguments"));
    }

    #[tokio::test]
    async fn add_then_discover() {
        let reg = registry();
        let added = reg
            .execute(
                "smart_home_add_device",
                &json!({"id": "fan", "name": "Ceiling Fan", "aliases": ["Fan"]}),
            )
            .await
            .unwrap();
        assert_eq!(added.as_text(), Some("Added device fan | Ceiling Fan"));

        let listing = reg
            .execute("smart_home_discover", &json!({}))
            .await
            .unwrap();
        assert!(listing
            .as_text()
            .unwrap()
            .contains("- fan | Ceiling Fan | aliases=['fan'] | type=light | caps=['on_off'] | online=true"));
    }
}
