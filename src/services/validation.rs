use crate::errors::{FalconError, ToolError};
use crate::falcon::{ActionParameter, QueryParams};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;

/// Argument coercion from tool-call JSON into typed operation inputs.
#[derive(Clone)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    pub fn ensure_string(
        &self,
        value: &Value,
        label: &str,
        trim: bool,
    ) -> Result<String, ToolError> {
        let text = value.as_str().ok_or_else(|| {
            ToolError::invalid_params(format!("{} must be a non-empty string", label))
        })?;
        let normalized = text.trim();
        if normalized.is_empty() {
            return Err(ToolError::invalid_params(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        Ok(if trim {
            normalized.to_string()
        } else {
            text.to_string()
        })
    }

    pub fn ensure_optional_string(
        &self,
        value: Option<&Value>,
        label: &str,
        trim: bool,
    ) -> Result<Option<String>, ToolError> {
        match value {
            None => Ok(None),
            Some(val) if val.is_null() => Ok(None),
            Some(val) => self.ensure_string(val, label, trim).map(Some),
        }
    }

    pub fn required_string(&self, args: &Value, key: &str) -> Result<String, ToolError> {
        self.ensure_string(args.get(key).unwrap_or(&Value::Null), key, true)
    }

    pub fn ensure_optional_bool(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Option<bool>, ToolError> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(flag)) => Ok(Some(*flag)),
            Some(Value::String(text)) => match text.trim().to_lowercase().as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(ToolError::invalid_params(format!(
                    "{} must be a boolean",
                    label
                ))),
            },
            Some(_) => Err(ToolError::invalid_params(format!(
                "{} must be a boolean",
                label
            ))),
        }
    }

    pub fn ensure_optional_u32(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Option<u32>, ToolError> {
        let Some(value) = value else {
            return Ok(None);
        };
        if value.is_null() {
            return Ok(None);
        }
        let numeric = value
            .as_u64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse::<u64>().ok()))
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| {
                ToolError::invalid_params(format!("{} must be a non-negative integer", label))
            })?;
        Ok(Some(numeric))
    }

    /// Identifier list from `args[key]`. Accepts an array of strings or a
    /// single string; a missing key yields an empty list.
    pub fn ensure_id_list(&self, args: &Value, key: &str) -> Result<Vec<String>, ToolError> {
        match args.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(single)) => Ok(vec![self.ensure_identifier(single, key)?]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    let text = item.as_str().ok_or_else(|| {
                        ToolError::invalid_params(format!("{} must contain only strings", key))
                    })?;
                    self.ensure_identifier(text, key)
                })
                .collect(),
            Some(_) => Err(ToolError::invalid_params(format!(
                "{} must be an array of strings",
                key
            ))),
        }
    }

    pub fn ensure_identifier(&self, value: &str, label: &str) -> Result<String, ToolError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ToolError::invalid_params(format!(
                "{} must not contain empty identifiers",
                label
            )));
        }
        if trimmed.contains('\0') {
            return Err(ToolError::invalid_params(format!(
                "{} must not contain null bytes",
                label
            )));
        }
        Ok(trimmed.to_string())
    }

    pub fn query_params(&self, args: &Value) -> Result<QueryParams, ToolError> {
        Ok(QueryParams {
            filter: self.ensure_optional_string(args.get("filter"), "filter", true)?,
            limit: self.ensure_optional_u32(args.get("limit"), "limit")?,
            offset: self.ensure_optional_u32(args.get("offset"), "offset")?,
            sort: self.ensure_optional_string(args.get("sort"), "sort", true)?,
            after: self.ensure_optional_string(args.get("after"), "after", true)?,
        })
    }

    /// `[{name, value}]`; non-string values are rendered as JSON text.
    pub fn action_parameters(
        &self,
        value: Option<&Value>,
    ) -> Result<Vec<ActionParameter>, ToolError> {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Ok(Vec::new());
        };
        let items = value
            .as_array()
            .ok_or_else(|| ToolError::invalid_params("action_parameters must be an array"))?;
        items
            .iter()
            .map(|item| {
                let name = self.ensure_string(
                    item.get("name").unwrap_or(&Value::Null),
                    "action_parameters[].name",
                    true,
                )?;
                let value = match item.get("value") {
                    Some(Value::String(text)) => text.clone(),
                    Some(Value::Null) | None => {
                        return Err(ToolError::invalid_params(format!(
                            "action parameter '{}' is missing a value",
                            name
                        )))
                    }
                    Some(other) => other.to_string(),
                };
                Ok(ActionParameter::new(name, value))
            })
            .collect()
    }

    /// Parses `args[key]` through the type's `FromStr`.
    pub fn parse_enum<T>(&self, args: &Value, key: &str) -> Result<T, ToolError>
    where
        T: FromStr<Err = FalconError>,
    {
        let raw = self.required_string(args, key)?;
        raw.parse::<T>().map_err(ToolError::from)
    }

    pub fn records<T: DeserializeOwned>(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Vec<T>, ToolError> {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Ok(Vec::new());
        };
        if !value.is_array() {
            return Err(ToolError::invalid_params(format!("{} must be an array", label)));
        }
        serde_json::from_value(value.clone())
            .map_err(|err| ToolError::invalid_params(format!("{}: {}", label, err)))
    }

    pub fn record<T: DeserializeOwned>(&self, value: Option<&Value>, label: &str) -> Result<T, ToolError> {
        let value = value
            .filter(|v| v.is_object())
            .ok_or_else(|| ToolError::invalid_params(format!("{} must be an object", label)))?;
        serde_json::from_value(value.clone())
            .map_err(|err| ToolError::invalid_params(format!("{}: {}", label, err)))
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::new()
    }
}
