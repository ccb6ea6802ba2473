/*!
 * Tool Definitions and Dispatch
 * The two secure file tools exposed to the calling agent
 */

use crate::core::ToolError;
use crate::mediator::AccessMediator;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

pub const READ_FILE_TOOL: &str = "read_file_secure";
pub const LIST_FILES_TOOL: &str = "list_files_secure";

/// Tool descriptor as returned by `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Text block returned by a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl TextContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

pub fn tool_definitions(default_list_dir: &Path) -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: READ_FILE_TOOL.to_string(),
            description: "Read file contents with security monitoring".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Path to the file to read"
                    }
                },
                "required": ["path"]
            }),
        },
        ToolDefinition {
            name: LIST_FILES_TOOL.to_string(),
            description: "List files in directory with security monitoring".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Directory path to list",
                        "default": default_list_dir.to_string_lossy()
                    }
                }
            }),
        },
    ]
}

/// Routes tool calls to the access mediator
#[derive(Clone)]
pub struct ToolDispatcher {
    mediator: AccessMediator,
}

impl ToolDispatcher {
    pub fn new(mediator: AccessMediator) -> Self {
        Self { mediator }
    }

    pub fn mediator(&self) -> &AccessMediator {
        &self.mediator
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        tool_definitions(&self.mediator.config().default_list_dir)
    }

    pub async fn call(&self, name: &str, arguments: &Value) -> Result<Vec<TextContent>, ToolError> {
        info!(tool = name, "Tool call");
        let outcome = match name {
            READ_FILE_TOOL => {
                let path = path_argument(arguments)?.ok_or(ToolError::MissingArgument("path"))?;
                self.mediator.read_secure(path).await
            }
            LIST_FILES_TOOL => self.mediator.list_secure(path_argument(arguments)?).await,
            other => return Err(ToolError::UnknownTool(other.to_string())),
        };
        Ok(vec![TextContent::text(outcome.to_string())])
    }
}

fn path_argument(arguments: &Value) -> Result<Option<&str>, ToolError> {
    match arguments {
        Value::Null => Ok(None),
        Value::Object(map) => match map.get("path") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(path)) => Ok(Some(path.as_str())),
            Some(other) => Err(ToolError::InvalidArguments(format!(
                "path must be a string, got {}",
                other
            ))),
        },
        other => Err(ToolError::InvalidArguments(format!(
            "arguments must be an object, got {}",
            other
        ))),
    }
}
