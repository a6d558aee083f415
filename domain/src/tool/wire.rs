//! JSON Schema wire shape of a tool.
//!
//! Keywords the domain does not interpret are carried in flattened `extra`
//! maps so that a schema serializes back to what the caller supplied.

use super::entities::{ToolParameter, ToolSchema};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn object_type() -> String {
    "object".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireTool {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    parameters: WireParameters,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireParameters {
    #[serde(rename = "type", default = "object_type")]
    schema_type: String,
    #[serde(default)]
    properties: Map<String, Value>,
    #[serde(default)]
    required: Vec<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Default for WireParameters {
    fn default() -> Self {
        Self {
            schema_type: object_type(),
            properties: Map::new(),
            required: Vec::new(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireProperty {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    type_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl WireProperty {
    /// `None` for non-objects and for objects with a non-string `type` or
    /// `description`.
    fn from_object(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Self::deserialize(value).ok()
    }
}

impl TryFrom<WireTool> for ToolSchema {
    type Error = DomainError;

    fn try_from(wire: WireTool) -> Result<Self, Self::Error> {
        let parameters = wire
            .parameters
            .properties
            .into_iter()
            .map(|(name, value)| match WireProperty::from_object(&value) {
                Some(prop) => ToolParameter {
                    name,
                    type_tag: prop.type_tag,
                    description: prop.description,
                    required: false,
                    extra: prop.extra,
                    raw: None,
                },
                // No usable type information; serialized back unchanged.
                None => ToolParameter {
                    name,
                    type_tag: None,
                    description: None,
                    required: false,
                    extra: Map::new(),
                    raw: Some(value),
                },
            })
            .collect();

        let mut tool = ToolSchema::from_parts(
            wire.name,
            wire.description,
            parameters,
            wire.parameters.required,
        )?;
        tool.schema_type = wire.parameters.schema_type;
        tool.parameters_extra = wire.parameters.extra;
        tool.extra = wire.extra;
        Ok(tool)
    }
}

impl From<ToolSchema> for WireTool {
    fn from(tool: ToolSchema) -> Self {
        let mut properties = Map::new();
        for param in tool.parameters() {
            if let Some(raw) = &param.raw {
                properties.insert(param.name.clone(), raw.clone());
                continue;
            }
            let prop = WireProperty {
                type_tag: param.type_tag.clone(),
                description: param.description.clone(),
                extra: param.extra.clone(),
            };
            properties.insert(
                param.name.clone(),
                serde_json::to_value(prop).unwrap_or(Value::Null),
            );
        }

        WireTool {
            name: tool.name().to_string(),
            description: tool.declared_description().map(str::to_string),
            parameters: WireParameters {
                schema_type: tool.schema_type.clone(),
                properties,
                required: tool.required_names().to_vec(),
                extra: tool.parameters_extra.clone(),
            },
            extra: tool.extra,
        }
    }
}
