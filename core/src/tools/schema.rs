//! Declarative parameter schemas for tools.
//!
//! A [`ToolDescriptor`] carries the tool's name, description, and an
//! ordered parameter list. The same description drives both the JSON
//! schema shown to callers and the validation/coercion step that turns a
//! raw argument object into [`Args`] before a handler runs.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use super::error::{ToolError, ToolResult};
use crate::config::RuntimeDefaults;

/// Scalar kinds a parameter can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Boolean,
    StringList,
}

impl ParamKind {
    fn json_type(self) -> Value {
        match self {
            ParamKind::String => json!({ "type": "string" }),
            ParamKind::Integer => json!({ "type": "integer" }),
            ParamKind::Boolean => json!({ "type": "boolean" }),
            ParamKind::StringList => json!({ "type": "array", "items": { "type": "string" } }),
        }
    }

    fn label(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Boolean => "boolean",
            ParamKind::StringList => "list of strings",
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
    pub default: Option<Value>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    /// Fall back to the process-wide default handle when no value and no
    /// literal default is supplied.
    pub handle_fallback: bool,
}

impl ParamSpec {
    pub fn new(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: true,
            default: None,
            min: None,
            max: None,
            handle_fallback: false,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::String, description)
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Integer, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Boolean, description)
    }

    pub fn string_list(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::StringList, description)
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.required = false;
        self.default = Some(default);
        self
    }

    /// Inclusive numeric bounds, checked after coercion.
    pub fn bounds(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Marks an identity parameter that falls back to the configured
    /// default handle.
    pub fn default_handle(mut self) -> Self {
        self.required = false;
        self.handle_fallback = true;
        self
    }
}

/// Declarative tool metadata: unique name, description, parameter list.
/// Immutable once registered.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    pub fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// The JSON Schema object advertised to callers.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for spec in &self.params {
            let mut schema = spec.kind.json_type();
            if let Some(obj) = schema.as_object_mut() {
                obj.insert("description".into(), Value::String(spec.description.into()));
                if let Some(default) = &spec.default {
                    obj.insert("default".into(), default.clone());
                }
                if let Some(min) = spec.min {
                    obj.insert("minimum".into(), json!(min));
                }
                if let Some(max) = spec.max {
                    obj.insert("maximum".into(), json!(max));
                }
            }
            properties.insert(spec.name.to_string(), schema);
            if spec.required {
                required.push(Value::String(spec.name.to_string()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Validates and coerces a raw argument object into [`Args`].
    ///
    /// Unknown keys are ignored for forward compatibility. Missing
    /// optional parameters take their literal default, or the configured
    /// default handle for identity parameters; missing required
    /// parameters are an error. String inputs coerce to the declared
    /// scalar kind; numeric bounds are inclusive.
    pub fn validate(&self, arguments: &Value, defaults: &RuntimeDefaults) -> ToolResult<Args> {
        let empty = Map::new();
        let raw = match arguments {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => {
                return Err(ToolError::InvalidArguments(
                    "arguments must be a JSON object".into(),
                ))
            }
        };

        let mut values = BTreeMap::new();
        for spec in &self.params {
            let supplied = raw.get(spec.name).filter(|v| !v.is_null());
            let value = match supplied {
                Some(value) => Some(coerce(spec, value)?),
                None => fallback_value(spec, defaults),
            };

            match value {
                Some(value) => {
                    check_bounds(spec, &value)?;
                    values.insert(spec.name.to_string(), value);
                }
                None if spec.required => {
                    return Err(ToolError::InvalidArguments(format!(
                        "missing required parameter '{}'",
                        spec.name
                    )));
                }
                None => {}
            }
        }

        Ok(Args { values })
    }
}

fn fallback_value(spec: &ParamSpec, defaults: &RuntimeDefaults) -> Option<Value> {
    if let Some(default) = &spec.default {
        return Some(default.clone());
    }
    if spec.handle_fallback {
        if let Some(handle) = &defaults.default_handle {
            return Some(match spec.kind {
                ParamKind::StringList => json!([handle]),
                _ => Value::String(handle.clone()),
            });
        }
    }
    None
}

fn coerce(spec: &ParamSpec, value: &Value) -> ToolResult<Value> {
    let mismatch = || {
        ToolError::InvalidArguments(format!(
            "parameter '{}' must be a {}",
            spec.name,
            spec.kind.label()
        ))
    };

    match spec.kind {
        ParamKind::String => match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err(mismatch()),
        },
        ParamKind::Integer => match value {
            Value::Number(n) => n.as_i64().map(|v| json!(v)).ok_or_else(mismatch),
            Value::String(s) => s.trim().parse::<i64>().map(|v| json!(v)).map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        ParamKind::Boolean => match value {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(mismatch()),
            },
            _ => Err(mismatch()),
        },
        ParamKind::StringList => match value {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => out.push(Value::String(s.clone())),
                        Value::Number(n) => out.push(Value::String(n.to_string())),
                        _ => return Err(mismatch()),
                    }
                }
                Ok(Value::Array(out))
            }
            // A bare or comma-separated string coerces to a list.
            Value::String(s) => Ok(Value::Array(
                s.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| Value::String(part.to_string()))
                    .collect(),
            )),
            _ => Err(mismatch()),
        },
    }
}

fn check_bounds(spec: &ParamSpec, value: &Value) -> ToolResult<()> {
    if spec.min.is_none() && spec.max.is_none() {
        return Ok(());
    }
    let Some(v) = value.as_i64() else {
        return Ok(());
    };
    let min = spec.min.unwrap_or(i64::MIN);
    let max = spec.max.unwrap_or(i64::MAX);
    if v < min || v > max {
        return Err(ToolError::InvalidArguments(format!(
            "parameter '{}' must be between {min} and {max}",
            spec.name
        )));
    }
    Ok(())
}

/// The validated argument view handed to handlers.
///
/// Every key present was either supplied (and coerced) or defaulted;
/// absent keys were optional with no applicable default.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: BTreeMap<String, Value>,
}

impl Args {
    /// Builds arguments directly; used by tests and internal callers
    /// that bypass schema validation.
    pub fn from_values(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(Value::as_i64)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    pub fn string_list(&self, name: &str) -> Option<Vec<String>> {
        self.values.get(name).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
    }

    pub fn require_str(&self, name: &str) -> ToolResult<String> {
        self.str(name)
            .map(str::to_string)
            .ok_or_else(|| ToolError::InvalidArguments(format!("missing parameter '{name}'")))
    }

    pub fn require_integer(&self, name: &str) -> ToolResult<i64> {
        self.integer(name)
            .ok_or_else(|| ToolError::InvalidArguments(format!("missing parameter '{name}'")))
    }

    pub fn require_string_list(&self, name: &str) -> ToolResult<Vec<String>> {
        self.string_list(name)
            .ok_or_else(|| ToolError::InvalidArguments(format!("missing parameter '{name}'")))
    }
}
