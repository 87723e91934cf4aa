//! Structural input schemas for tools.
//!
//! A [`Schema`] is both the contract advertised to the protocol host (rendered
//! as a JSON Schema object) and the model the validator checks raw arguments
//! against, so the two can never drift apart.

use serde_json::{Map, Value};

/// Schema node: a kind plus optional description and default.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub kind: SchemaKind,
    pub description: Option<String>,
    /// Applied by the validator when an optional field is omitted.
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    String {
        /// Closed set of allowed values.
        allowed: Option<Vec<String>>,
    },
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    Boolean,
    Array {
        items: Option<Box<Schema>>,
    },
    Object(ObjectSchema),
}

impl SchemaKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaKind::String { .. } => "string",
            SchemaKind::Number { .. } => "number",
            SchemaKind::Integer { .. } => "integer",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Array { .. } => "array",
            SchemaKind::Object(_) => "object",
        }
    }
}

/// Object shape with declared properties, in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    pub properties: Vec<(String, Schema)>,
    pub required: Vec<String>,
    /// Undeclared keys are passed through when set, dropped otherwise.
    pub additional_properties: bool,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn required(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.push((name, schema.into()));
        self
    }

    #[must_use]
    pub fn optional(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.properties.push((name.into(), schema.into()));
        self
    }

    #[must_use]
    pub fn allow_additional(mut self) -> Self {
        self.additional_properties = true;
        self
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties
            .iter()
            .find(|(prop, _)| prop == name)
            .map(|(_, schema)| schema)
    }
}

impl From<ObjectSchema> for Schema {
    fn from(object: ObjectSchema) -> Self {
        Schema::new(SchemaKind::Object(object))
    }
}

impl Schema {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
            default: None,
        }
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String { allowed: None })
    }

    pub fn string_enum<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SchemaKind::String {
            allowed: Some(allowed.into_iter().map(Into::into).collect()),
        })
    }

    pub fn number() -> Self {
        Self::new(SchemaKind::Number {
            minimum: None,
            maximum: None,
        })
    }

    pub fn integer() -> Self {
        Self::new(SchemaKind::Integer {
            minimum: None,
            maximum: None,
        })
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn array(items: impl Into<Schema>) -> Self {
        Self::new(SchemaKind::Array {
            items: Some(Box::new(items.into())),
        })
    }

    /// Object accepting any keys, passed through untouched.
    pub fn any_object() -> Self {
        ObjectSchema::new().allow_additional().into()
    }

    /// Object with no declared properties; the shape of a tool taking no input.
    pub fn empty_object() -> Self {
        ObjectSchema::new().into()
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Inclusive bounds for numeric kinds; ignored for other kinds.
    #[must_use]
    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        match &mut self.kind {
            SchemaKind::Integer { minimum, maximum } => {
                *minimum = Some(min);
                *maximum = Some(max);
            }
            SchemaKind::Number { minimum, maximum } => {
                *minimum = Some(min as f64);
                *maximum = Some(max as f64);
            }
            _ => {}
        }
        self
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            SchemaKind::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Render as a JSON Schema object.
    pub fn to_json_schema(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("type".to_string(), Value::from(self.kind.type_name()));
        if let Some(description) = &self.description {
            out.insert("description".to_string(), Value::from(description.as_str()));
        }

        match &self.kind {
            SchemaKind::String { allowed } => {
                if let Some(allowed) = allowed {
                    out.insert("enum".to_string(), Value::from(allowed.clone()));
                }
            }
            SchemaKind::Number { minimum, maximum } => {
                if let Some(min) = minimum {
                    out.insert("minimum".to_string(), Value::from(*min));
                }
                if let Some(max) = maximum {
                    out.insert("maximum".to_string(), Value::from(*max));
                }
            }
            SchemaKind::Integer { minimum, maximum } => {
                if let Some(min) = minimum {
                    out.insert("minimum".to_string(), Value::from(*min));
                }
                if let Some(max) = maximum {
                    out.insert("maximum".to_string(), Value::from(*max));
                }
            }
            SchemaKind::Boolean => {}
            SchemaKind::Array { items } => {
                if let Some(items) = items {
                    out.insert("items".to_string(), Value::Object(items.to_json_schema()));
                }
            }
            SchemaKind::Object(object) => {
                let properties: Map<String, Value> = object
                    .properties
                    .iter()
                    .map(|(name, schema)| (name.clone(), Value::Object(schema.to_json_schema())))
                    .collect();
                out.insert("properties".to_string(), Value::Object(properties));
                if !object.required.is_empty() {
                    out.insert("required".to_string(), Value::from(object.required.clone()));
                }
                if object.additional_properties {
                    out.insert("additionalProperties".to_string(), Value::Bool(true));
                }
            }
        }

        if let Some(default) = &self.default {
            out.insert("default".to_string(), default.clone());
        }
        out
    }
}
