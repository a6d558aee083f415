//! Tool schema entities

use super::wire::WireTool;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Declared type of a tool parameter, as far as coercion is concerned.
///
/// Only three tags are coerced. Every other tag (`boolean`, `object`,
/// `array`, a missing tag, ...) is passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Unconstrained,
}

impl ParamType {
    /// Classify a raw JSON Schema type tag (case-insensitive).
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("string") => ParamType::String,
            Some("integer") => ParamType::Integer,
            Some("number") => ParamType::Number,
            _ => ParamType::Unconstrained,
        }
    }
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParameter {
    /// Parameter name (unique within its tool)
    pub name: String,
    /// Raw type tag as declared in the schema (`"string"`, `"integer"`, ...)
    pub type_tag: Option<String>,
    /// Parameter description
    pub description: Option<String>,
    /// Whether this parameter is required
    pub required: bool,
    /// Schema keywords we do not interpret (`enum`, `default`, ...)
    pub(crate) extra: serde_json::Map<String, serde_json::Value>,
    /// Property value that is not a JSON object, kept verbatim
    pub(crate) raw: Option<serde_json::Value>,
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            type_tag: Some(type_tag.into()),
            description: None,
            required,
            extra: serde_json::Map::new(),
            raw: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn param_type(&self) -> ParamType {
        ParamType::from_tag(self.type_tag.as_deref())
    }
}

/// Declarative contract of one callable function.
///
/// Serializes to and from the JSON Schema shape callers supply:
///
/// ```json
/// {"name": "get_weather", "description": "...",
///  "parameters": {"type": "object",
///                 "properties": {"location": {"type": "string", "description": "City name"}},
///                 "required": ["location"]}}
/// ```
///
/// # Example
///
/// ```
/// use fncall_domain::tool::{ToolParameter, ToolSchema};
///
/// let tool = ToolSchema::new("get_weather", "Get current weather for a location")
///     .with_parameter(ToolParameter::new("location", "string", true).with_description("City name"))
///     .unwrap();
///
/// assert_eq!(tool.required_names(), ["location"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireTool", into = "WireTool")]
pub struct ToolSchema {
    name: String,
    description: Option<String>,
    parameters: Vec<ToolParameter>,
    /// Required names in declaration order. May name parameters that have
    /// no property entry; such a tool can never produce a valid call.
    required: Vec<String>,
    pub(crate) schema_type: String,
    pub(crate) parameters_extra: serde_json::Map<String, serde_json::Value>,
    pub(crate) extra: serde_json::Map<String, serde_json::Value>,
}

impl ToolSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            parameters: Vec::new(),
            required: Vec::new(),
            schema_type: "object".to_string(),
            parameters_extra: serde_json::Map::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Add a parameter, rejecting duplicate names.
    pub fn with_parameter(mut self, param: ToolParameter) -> Result<Self, DomainError> {
        if self.parameter(&param.name).is_some() {
            return Err(DomainError::DuplicateParameter {
                tool: self.name,
                parameter: param.name,
            });
        }
        if param.required && !self.required.contains(&param.name) {
            self.required.push(param.name.clone());
        }
        self.parameters.push(param);
        Ok(self)
    }

    pub(crate) fn from_parts(
        name: String,
        description: Option<String>,
        mut parameters: Vec<ToolParameter>,
        required: Vec<String>,
    ) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::EmptyToolName);
        }
        for (i, param) in parameters.iter().enumerate() {
            if parameters[..i].iter().any(|p| p.name == param.name) {
                return Err(DomainError::DuplicateParameter {
                    tool: name,
                    parameter: param.name.clone(),
                });
            }
        }
        for param in &mut parameters {
            param.required = required.contains(&param.name);
        }
        Ok(Self {
            name,
            description,
            parameters,
            required,
            ..Self::new("", "")
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Empty when the schema declares no description.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub(crate) fn declared_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parameters(&self) -> &[ToolParameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ToolParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn required_names(&self) -> &[String] {
        &self.required
    }

    /// Name, description, parameter names and parameter descriptions joined
    /// into one text, used for lexical tool scoring.
    pub fn searchable_text(&self) -> String {
        let mut text = format!("{} {}", self.name, self.description());
        for param in &self.parameters {
            text.push(' ');
            text.push_str(&param.name);
            if let Some(description) = &param.description {
                text.push(' ');
                text.push_str(description);
            }
        }
        text
    }
}
