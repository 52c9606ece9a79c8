//! Typed input-schema descriptors and structural validation
//!
//! Every tool declares its parameters as tagged-variant descriptors. The
//! registry validates raw arguments against the descriptor before the
//! handler runs, so handlers always receive already-typed, already-defaulted
//! argument maps and never perform their own coercion.

use serde_json::{json, Map, Value};

use crate::error::{McpError, McpResult};

/// Parameter type descriptor.
#[derive(Debug, Clone)]
pub enum ParamType {
    String,
    /// Unsigned integer. Negative and fractional JSON numbers are rejected
    /// rather than truncated, since every numeric parameter is an offset,
    /// count, or identifier.
    Number,
    Boolean,
    Array(Box<ParamType>),
    Object(InputSchema),
}

impl ParamType {
    fn json_type_name(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "integer",
            ParamType::Boolean => "boolean",
            ParamType::Array(_) => "array",
            ParamType::Object(_) => "object",
        }
    }

    fn check(&self, path: &str, value: &Value) -> McpResult<()> {
        match self {
            ParamType::String if value.is_string() => Ok(()),
            ParamType::Number if value.as_u64().is_some() => Ok(()),
            ParamType::Number if value.is_number() => Err(McpError::validation(
                path,
                "expected unsigned integer",
            )),
            ParamType::Boolean if value.is_boolean() => Ok(()),
            ParamType::Array(item) => {
                let items = value.as_array().ok_or_else(|| {
                    McpError::validation(path, format!("expected array, got {}", type_of(value)))
                })?;
                for (i, item_value) in items.iter().enumerate() {
                    item.check(&format!("{path}.{i}"), item_value)?;
                }
                Ok(())
            }
            ParamType::Object(schema) => {
                let obj = value.as_object().ok_or_else(|| {
                    McpError::validation(path, format!("expected object, got {}", type_of(value)))
                })?;
                schema.validate_at(path, obj)?;
                Ok(())
            }
            _ => Err(McpError::validation(
                path,
                format!(
                    "expected {}, got {}",
                    self.json_type_name(),
                    type_of(value)
                ),
            )),
        }
    }

    fn to_json_schema(&self, description: Option<&str>) -> Value {
        let mut schema = match self {
            ParamType::Array(item) => json!({
                "type": "array",
                "items": item.to_json_schema(None),
            }),
            ParamType::Object(inner) => inner.to_json_schema(),
            other => json!({ "type": other.json_type_name() }),
        };
        if let (Some(desc), Some(obj)) = (description, schema.as_object_mut()) {
            obj.insert("description".to_string(), json!(desc));
        }
        schema
    }
}

/// A single declared parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub ty: ParamType,
    pub description: String,
    pub required: bool,
    pub default: Option<Value>,
}

/// Ordered mapping from parameter name to its descriptor.
#[derive(Debug, Clone, Default)]
pub struct InputSchema {
    params: Vec<(String, Param)>,
    open: bool,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// An object with no declared shape. Fields pass through unvalidated;
    /// used where keys are data (IDL argument maps) rather than parameters.
    pub fn open() -> Self {
        Self {
            params: Vec::new(),
            open: true,
        }
    }

    pub fn required(mut self, name: &str, ty: ParamType, description: &str) -> Self {
        self.params.push((
            name.to_string(),
            Param {
                ty,
                description: description.to_string(),
                required: true,
                default: None,
            },
        ));
        self
    }

    pub fn optional(mut self, name: &str, ty: ParamType, description: &str) -> Self {
        self.params.push((
            name.to_string(),
            Param {
                ty,
                description: description.to_string(),
                required: false,
                default: None,
            },
        ));
        self
    }

    pub fn optional_with_default(
        mut self,
        name: &str,
        ty: ParamType,
        description: &str,
        default: Value,
    ) -> Self {
        self.params.push((
            name.to_string(),
            Param {
                ty,
                description: description.to_string(),
                required: false,
                default: Some(default),
            },
        ));
        self
    }

    /// Validate raw arguments, returning the typed, defaulted argument map.
    ///
    /// `Value::Null` is treated as an empty object so zero-parameter tools
    /// accept calls with omitted arguments. Undeclared fields are rejected,
    /// keeping handler inputs exactly the shapes the schema guarantees.
    pub fn validate(&self, raw: Value) -> McpResult<Map<String, Value>> {
        let obj = match raw {
            Value::Null => Map::new(),
            Value::Object(m) => m,
            other => {
                return Err(McpError::validation(
                    "",
                    format!("expected object arguments, got {}", type_of(&other)),
                ))
            }
        };
        self.validate_at("", &obj)
    }

    fn validate_at(&self, prefix: &str, obj: &Map<String, Value>) -> McpResult<Map<String, Value>> {
        let mut out = Map::new();

        for (name, param) in &self.params {
            let path = join_path(prefix, name);
            match obj.get(name) {
                Some(Value::Null) | None => {
                    if param.required {
                        return Err(McpError::validation(&path, "missing required field"));
                    }
                    if let Some(default) = &param.default {
                        out.insert(name.clone(), default.clone());
                    }
                }
                Some(value) => {
                    param.ty.check(&path, value)?;
                    out.insert(name.clone(), value.clone());
                }
            }
        }

        for (name, value) in obj {
            if !self.params.iter().any(|(n, _)| n == name) {
                if self.open {
                    out.insert(name.clone(), value.clone());
                } else {
                    return Err(McpError::validation(
                        join_path(prefix, name),
                        "unknown field",
                    ));
                }
            }
        }

        Ok(out)
    }

    /// Render the JSON Schema object advertised in `tools/list`.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for (name, param) in &self.params {
            let mut prop = param.ty.to_json_schema(Some(&param.description));
            if let (Some(default), Some(obj)) = (&param.default, prop.as_object_mut()) {
                obj.insert("default".to_string(), default.clone());
            }
            properties.insert(name.clone(), prop);
            if param.required {
                required.push(json!(name));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": self.open
        })
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance_schema() -> InputSchema {
        InputSchema::new().required("publicKey", ParamType::String, "Account address")
    }

    #[test]
    fn test_valid_input_passes() {
        let args = balance_schema()
            .validate(json!({ "publicKey": "abc" }))
            .unwrap();
        assert_eq!(args["publicKey"], "abc");
    }

    #[test]
    fn test_missing_required_field_names_path() {
        let err = balance_schema().validate(json!({})).unwrap_err();
        match err {
            McpError::Validation { path, .. } => assert_eq!(path, "publicKey"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_type_rejected() {
        let err = balance_schema()
            .validate(json!({ "publicKey": 42 }))
            .unwrap_err();
        match err {
            McpError::Validation { path, message } => {
                assert_eq!(path, "publicKey");
                assert!(message.contains("expected string"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = balance_schema()
            .validate(json!({ "publicKey": "abc", "extra": 1 }))
            .unwrap_err();
        match err {
            McpError::Validation { path, .. } => assert_eq!(path, "extra"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_number_rejected() {
        let schema =
            InputSchema::new().required("offset", ParamType::Number, "Byte offset");
        let err = schema.validate(json!({ "offset": -5 })).unwrap_err();
        match err {
            McpError::Validation { path, message } => {
                assert_eq!(path, "offset");
                assert!(message.contains("unsigned integer"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fractional_number_rejected() {
        let schema =
            InputSchema::new().required("slot", ParamType::Number, "Slot number");
        let err = schema.validate(json!({ "slot": 1.5 })).unwrap_err();
        match err {
            McpError::Validation { path, message } => {
                assert_eq!(path, "slot");
                assert!(message.contains("unsigned integer"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_default_substitution() {
        let schema = InputSchema::new().optional_with_default(
            "encoding",
            ParamType::String,
            "Output encoding",
            json!("hex"),
        );
        let args = schema.validate(json!({})).unwrap();
        assert_eq!(args["encoding"], "hex");
    }

    #[test]
    fn test_null_arguments_ok_for_no_params() {
        let args = InputSchema::new().validate(Value::Null).unwrap();
        assert!(args.is_empty());
    }

    #[test]
    fn test_nested_object_path() {
        let schema = InputSchema::new().required(
            "filter",
            ParamType::Object(InputSchema::new().required(
                "offset",
                ParamType::Number,
                "Byte offset",
            )),
            "Filter settings",
        );
        let err = schema
            .validate(json!({ "filter": { "offset": "zero" } }))
            .unwrap_err();
        match err {
            McpError::Validation { path, .. } => assert_eq!(path, "filter.offset"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_array_element_path() {
        let schema = InputSchema::new().optional(
            "accounts",
            ParamType::Array(Box::new(ParamType::String)),
            "Account list",
        );
        let err = schema
            .validate(json!({ "accounts": ["ok", 7] }))
            .unwrap_err();
        match err {
            McpError::Validation { path, .. } => assert_eq!(path, "accounts.1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_open_object_passes_fields_through() {
        let schema = InputSchema::new().optional(
            "args",
            ParamType::Object(InputSchema::open()),
            "Free-form argument map",
        );
        let args = schema
            .validate(json!({ "args": { "amount": 5, "delegate": "abc" } }))
            .unwrap();
        assert_eq!(args["args"]["amount"], 5);
    }

    #[test]
    fn test_json_schema_rendering() {
        let rendered = balance_schema().to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["properties"]["publicKey"]["type"], "string");
        assert_eq!(rendered["required"][0], "publicKey");
    }
}
