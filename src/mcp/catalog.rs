use crate::errors::ToolError;
use crate::utils::suggest::suggest;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

static TOOL_CATALOG: Lazy<Vec<ToolDef>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tool_catalog.json"));
    serde_json::from_str(raw).expect("tool_catalog.json must be valid JSON")
});

static TOOL_MAP: Lazy<HashMap<String, ToolDef>> = Lazy::new(|| {
    TOOL_CATALOG
        .iter()
        .cloned()
        .map(|tool| (tool.name.clone(), tool))
        .collect()
});

static TOOL_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for tool in TOOL_CATALOG.iter() {
        if let Ok(schema) = JSONSchema::compile(&tool.input_schema) {
            map.insert(tool.name.clone(), schema);
        }
    }
    map
});

pub fn tool_catalog() -> &'static Vec<ToolDef> {
    &TOOL_CATALOG
}

pub fn tool_by_name(name: &str) -> Option<&'static ToolDef> {
    TOOL_MAP.get(name)
}

pub fn list_tools() -> Vec<ToolDef> {
    TOOL_CATALOG.clone()
}

/// The `action` enum declared for a tool's input schema.
pub fn tool_actions(name: &str) -> Vec<String> {
    tool_by_name(name)
        .and_then(|tool| tool.input_schema.pointer("/properties/action/enum"))
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Checks call arguments against the tool's declared input schema.
/// Unknown tools pass through; the executor reports them.
pub fn validate_tool_args(tool_name: &str, args: &Value) -> Result<(), ToolError> {
    let Some(tool) = tool_by_name(tool_name) else {
        return Ok(());
    };
    let Some(schema) = TOOL_VALIDATORS.get(tool_name) else {
        return Ok(());
    };
    if let Err(errors) = schema.validate(args) {
        let (message, hint) = format_schema_errors(tool_name, args, errors, &tool.input_schema);
        return Err(ToolError::invalid_params(message).with_hint(hint));
    }
    Ok(())
}

fn format_schema_errors(
    tool_name: &str,
    args: &Value,
    errors: jsonschema::ErrorIterator,
    schema: &Value,
) -> (String, String) {
    let action = args.get("action").and_then(|v| v.as_str());
    let header = if let Some(action) = action {
        format!("Invalid arguments for {}:{}", tool_name, action)
    } else {
        format!("Invalid arguments for {}", tool_name)
    };
    let mut rendered = Vec::new();
    let mut did_you_means = Vec::new();

    for err in errors.take(10) {
        let instance_path = if err.instance_path.to_string().is_empty() {
            "(root)".to_string()
        } else {
            err.instance_path.to_string()
        };
        match &err.kind {
            jsonschema::error::ValidationErrorKind::AdditionalProperties { unexpected } => {
                if unexpected.is_empty() {
                    rendered.push(format!("{}: unknown field", instance_path));
                }
                for unknown in unexpected {
                    rendered.push(format!("{}: unknown field '{}'", instance_path, unknown));
                    if let Some(parent) = schema_parent_at(schema, err.schema_path.to_string()) {
                        let props: Vec<String> = parent
                            .get("properties")
                            .and_then(|v| v.as_object())
                            .map(|map| map.keys().cloned().collect())
                            .unwrap_or_default();
                        let suggestions = suggest(unknown, &props, 3);
                        if !suggestions.is_empty() {
                            did_you_means.push(format!(
                                "field '{}': {}",
                                unknown,
                                suggestions.join(", ")
                            ));
                        }
                    }
                }
            }
            jsonschema::error::ValidationErrorKind::Enum { options } => {
                let allowed_list: Vec<String> = options
                    .as_array()
                    .map(|arr| {
                        arr.iter()
                            .map(|v| {
                                v.as_str()
                                    .map(|s| s.to_string())
                                    .unwrap_or_else(|| v.to_string())
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                if allowed_list.is_empty() {
                    rendered.push(format!("{}: invalid value", instance_path));
                } else {
                    rendered.push(format!(
                        "{}: expected one of {}",
                        instance_path,
                        allowed_list
                            .iter()
                            .take(12)
                            .cloned()
                            .collect::<Vec<_>>()
                            .join(", ")
                    ));
                    let received = schema_node_at(args, &err.instance_path.to_string());
                    let suggestions = suggest(received.as_str().unwrap_or(""), &allowed_list, 3);
                    if !suggestions.is_empty() {
                        did_you_means.push(format!(
                            "{}: {}",
                            instance_path,
                            suggestions.join(", ")
                        ));
                    }
                }
            }
            jsonschema::error::ValidationErrorKind::Required { property } => {
                let prop = property
                    .as_str()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| property.to_string());
                rendered.push(format!(
                    "{}: missing required field '{}'",
                    instance_path, prop
                ));
            }
            jsonschema::error::ValidationErrorKind::Type { kind } => {
                rendered.push(format!(
                    "{}: expected {}",
                    instance_path,
                    format_type_kind(kind)
                ));
            }
            _ => {
                rendered.push(format!("{}: {}", instance_path, err));
            }
        }
    }

    let mut lines = vec![header];
    lines.extend(rendered.iter().map(|line| format!("- {}", line)));
    let hint = if did_you_means.is_empty() {
        format!("See the {} input schema in tools/list", tool_name)
    } else {
        format!(
            "Did you mean: {}",
            did_you_means
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(" | ")
        )
    };
    (lines.join("\n"), hint)
}

fn format_type_kind(kind: &jsonschema::error::TypeKind) -> String {
    match kind {
        jsonschema::error::TypeKind::Single(primitive) => primitive.to_string(),
        jsonschema::error::TypeKind::Multiple(types) => {
            let list: Vec<String> = (*types).into_iter().map(|t| t.to_string()).collect();
            if list.is_empty() {
                "unknown".to_string()
            } else {
                list.join(" | ")
            }
        }
    }
}

fn schema_parent_at(schema: &Value, schema_path: String) -> Option<Value> {
    let mut current = schema;
    for segment in schema_path.split('/') {
        if segment.is_empty() || segment == "additionalProperties" {
            continue;
        }
        if let Some(obj) = current.as_object() {
            current = obj.get(segment)?;
        } else if let Some(arr) = current.as_array() {
            let idx = segment.parse::<usize>().ok()?;
            current = arr.get(idx)?;
        }
    }
    Some(current.clone())
}

fn schema_node_at(root: &Value, instance_path: &str) -> Value {
    if instance_path.is_empty() {
        return root.clone();
    }
    let mut current = root;
    for segment in instance_path.trim_start_matches('/').split('/') {
        if segment.is_empty() {
            continue;
        }
        if let Some(obj) = current.as_object() {
            current = obj.get(segment).unwrap_or(&Value::Null);
        } else if let Some(arr) = current.as_array() {
            let idx = segment.parse::<usize>().unwrap_or(0);
            current = arr.get(idx).unwrap_or(&Value::Null);
        }
    }
    current.clone()
}
