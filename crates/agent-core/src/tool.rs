//! Tool System
//!
//! Tools are declared once at startup and looked up by name when the model
//! asks for them. The registry is read-only after construction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::message::ToolInput;

/// Primitive JSON types a tool parameter may take
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Number,
    Integer,
    Boolean,
}

impl ParamKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON type
    #[serde(rename = "type")]
    pub kind: ParamKind,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

impl ParameterSchema {
    pub fn required(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// Structural description of a tool's named parameters
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InputSchema {
    pub parameters: Vec<ParameterSchema>,
}

impl InputSchema {
    pub const fn new(parameters: Vec<ParameterSchema>) -> Self {
        Self { parameters }
    }

    /// Render as a JSON Schema object for the model provider
    pub fn to_json_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    json!({ "type": p.kind.as_str(), "description": p.description }),
                )
            })
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check required presence and primitive types. Unknown keys pass.
    pub fn validate(&self, input: &ToolInput) -> Result<()> {
        for param in &self.parameters {
            match input.get(&param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(AgentError::ToolValidation(format!(
                        "missing required parameter '{}'",
                        param.name
                    )));
                }
                Some(value) if !value.is_null() && !param.kind.accepts(value) => {
                    return Err(AgentError::ToolValidation(format!(
                        "parameter '{}' must be a {}",
                        param.name,
                        param.kind.as_str()
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Static declaration of a callable tool
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to the model)
    pub description: String,

    pub input_schema: InputSchema,
}

/// Success-or-error result of running a tool handler
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutcome {
    Error { error: String },
    Success(Value),
}

impl ToolOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Flatten to the string carried inside a tool result block
    pub fn to_content(&self) -> String {
        match self {
            Self::Success(Value::String(s)) => s.clone(),
            Self::Success(value) => value.to_string(),
            Self::Error { error } => json!({ "error": error }).to_string(),
        }
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and input shape
    fn descriptor(&self) -> ToolDescriptor;

    /// Execute the tool with already-validated input
    async fn execute(&self, input: &ToolInput) -> Result<Value>;
}

/// Fixed name → handler mapping
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Registration order, so descriptors go out in a stable order
    order: Vec<ToolDescriptor>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a new tool; names must be unique
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let descriptor = tool.descriptor();
        if self.tools.contains_key(&descriptor.name) {
            return Err(AgentError::Config(format!(
                "tool '{}' registered twice",
                descriptor.name
            )));
        }
        self.tools.insert(descriptor.name.clone(), tool);
        self.order.push(descriptor);
        Ok(())
    }

    /// Get a tool by name
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.order
    }

    pub fn descriptor(&self, name: &str) -> Option<&ToolDescriptor> {
        self.order.iter().find(|d| d.name == name)
    }

    /// Get tool names
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|d| d.name.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
