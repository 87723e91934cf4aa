//! Request validation against a tool's [`Schema`].
//!
//! Validation is a pure function of `(schema, raw arguments)`: it never touches
//! the remote API. It applies defaults for omitted optional fields, drops
//! undeclared keys on closed objects, and fails on the first violation with the
//! path of the offending field.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    error::{McpError, McpResult, ValidationError, ValidationErrorKind},
    schema::{ObjectSchema, Schema, SchemaKind},
};

/// Arguments that passed validation, defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedArgs(Value);

impl ValidatedArgs {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    /// Deserialize into a typed argument struct.
    pub fn parse<T: DeserializeOwned>(self) -> McpResult<T> {
        serde_json::from_value(self.0)
            .map_err(|e| McpError::Internal(format!("validated arguments did not decode: {}", e)))
    }
}

/// Validate raw tool arguments. A missing argument bag is treated as `{}`.
pub fn validate(schema: &Schema, raw: Option<&Value>) -> Result<ValidatedArgs, ValidationError> {
    let empty = Value::Object(Map::new());
    let raw = match raw {
        None | Some(Value::Null) => &empty,
        Some(value) => value,
    };
    validate_value(schema, raw, "").map(ValidatedArgs)
}

fn validate_value(schema: &Schema, value: &Value, path: &str) -> Result<Value, ValidationError> {
    match &schema.kind {
        SchemaKind::String { allowed } => {
            let s = value
                .as_str()
                .ok_or_else(|| mismatch(path, &schema.kind, value))?;
            if let Some(allowed) = allowed {
                if !allowed.iter().any(|a| a == s) {
                    return Err(ValidationError::new(
                        path,
                        ValidationErrorKind::NotInEnum {
                            value: s.to_string(),
                            allowed: allowed.clone(),
                        },
                    ));
                }
            }
            Ok(value.clone())
        }
        SchemaKind::Number { minimum, maximum } => {
            let n = value
                .as_f64()
                .ok_or_else(|| mismatch(path, &schema.kind, value))?;
            check_range(path, n, *minimum, *maximum)?;
            Ok(value.clone())
        }
        SchemaKind::Integer { minimum, maximum } => {
            let n = as_integer(value).ok_or_else(|| mismatch(path, &schema.kind, value))?;
            check_range(
                path,
                n as f64,
                minimum.map(|m| m as f64),
                maximum.map(|m| m as f64),
            )?;
            Ok(Value::from(n))
        }
        SchemaKind::Boolean => {
            if value.is_boolean() {
                Ok(value.clone())
            } else {
                Err(mismatch(path, &schema.kind, value))
            }
        }
        SchemaKind::Array { items } => {
            let elements = value
                .as_array()
                .ok_or_else(|| mismatch(path, &schema.kind, value))?;
            match items {
                Some(item_schema) => elements
                    .iter()
                    .enumerate()
                    .map(|(i, element)| {
                        validate_value(item_schema, element, &join_path(path, &i.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                None => Ok(value.clone()),
            }
        }
        SchemaKind::Object(object) => {
            let map = value
                .as_object()
                .ok_or_else(|| mismatch(path, &schema.kind, value))?;
            validate_object(object, map, path).map(Value::Object)
        }
    }
}

fn validate_object(
    object: &ObjectSchema,
    map: &Map<String, Value>,
    path: &str,
) -> Result<Map<String, Value>, ValidationError> {
    let mut out = Map::new();

    for (name, prop_schema) in &object.properties {
        let field_path = join_path(path, name);
        // Explicit null on an optional field reads as "omitted".
        match map.get(name).filter(|v| !v.is_null()) {
            Some(raw) => {
                out.insert(name.clone(), validate_value(prop_schema, raw, &field_path)?);
            }
            None => {
                if let Some(default) = &prop_schema.default {
                    out.insert(name.clone(), default.clone());
                } else if object.is_required(name) {
                    return Err(ValidationError::missing(field_path));
                }
            }
        }
    }

    if object.additional_properties {
        for (key, raw) in map {
            if object.property(key).is_none() {
                out.insert(key.clone(), raw.clone());
            }
        }
    }

    Ok(out)
}

fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    // Hosts sometimes send 10.0 for an integer field.
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

fn check_range(
    path: &str,
    value: f64,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), ValidationError> {
    let below = min.is_some_and(|lo| value < lo);
    let above = max.is_some_and(|hi| value > hi);
    if below || above {
        Err(ValidationError::new(
            path,
            ValidationErrorKind::OutOfRange { value, min, max },
        ))
    } else {
        Ok(())
    }
}

fn mismatch(path: &str, expected: &SchemaKind, actual: &Value) -> ValidationError {
    ValidationError::new(
        path,
        ValidationErrorKind::TypeMismatch {
            expected: expected.type_name(),
            actual: json_type_name(actual),
        },
    )
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}.{}", parent, child)
    }
}
