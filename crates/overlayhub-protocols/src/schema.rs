//! Command schema definitions.
//!
//! A [`CommandSchema`] describes the parameters one `action` accepts. Schemas
//! are plain data: the registry that validates commands against them lives in
//! `overlayhub-core`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::SchemaError;

/// Semantic type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    /// Returns true when `value` has this semantic type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format tags checked after the range constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamFormat {
    Url,
}

/// Specification of a single command parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub kind: ParamType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ParamType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ParamFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, ParamSpec>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParamSpec {
    pub fn new(kind: ParamType) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            allowed: None,
            min: None,
            max: None,
            max_length: None,
            length: None,
            items: None,
            format: None,
            properties: None,
            description: None,
        }
    }

    pub fn string() -> Self {
        Self::new(ParamType::String)
    }

    pub fn number() -> Self {
        Self::new(ParamType::Number)
    }

    pub fn boolean() -> Self {
        Self::new(ParamType::Boolean)
    }

    pub fn array() -> Self {
        Self::new(ParamType::Array)
    }

    pub fn object() -> Self {
        Self::new(ParamType::Object)
    }

    /// A required two-element numeric array (`[x, y]`).
    pub fn point() -> Self {
        Self::array().with_length(2).with_items(ParamType::Number)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_items(mut self, items: ParamType) -> Self {
        self.items = Some(items);
        self
    }

    pub fn with_format(mut self, format: ParamFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), spec);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn check(&self, schema: &str, param: &str) -> Result<(), SchemaError> {
        let invalid = |reason: String| SchemaError::InvalidParameter {
            schema: schema.to_string(),
            param: param.to_string(),
            reason,
        };

        if param.is_empty() {
            return Err(invalid("parameter name must not be empty".into()));
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(invalid(format!("min {} exceeds max {}", min, max)));
            }
        }
        if (self.min.is_some() || self.max.is_some()) && self.kind != ParamType::Number {
            return Err(invalid(format!("min/max require a number, not {}", self.kind)));
        }
        if self.max_length.is_some() && self.kind != ParamType::String {
            return Err(invalid(format!("maxLength requires a string, not {}", self.kind)));
        }
        if (self.length.is_some() || self.items.is_some()) && self.kind != ParamType::Array {
            return Err(invalid(format!("length/items require an array, not {}", self.kind)));
        }
        if self.format.is_some() && self.kind != ParamType::String {
            return Err(invalid(format!("format requires a string, not {}", self.kind)));
        }
        if let Some(allowed) = &self.allowed {
            if allowed.is_empty() {
                return Err(invalid("enum must list at least one value".into()));
            }
        }
        if let Some(default) = &self.default {
            if !self.kind.matches(default) {
                return Err(invalid(format!("default is not a {}", self.kind)));
            }
        }
        if let Some(properties) = &self.properties {
            if self.kind != ParamType::Object {
                return Err(invalid(format!("properties require an object, not {}", self.kind)));
            }
            for (name, spec) in properties {
                spec.check(schema, &format!("{}.{}", param, name))?;
            }
        }
        Ok(())
    }
}

/// Schema of one command `action`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandSchema {
    pub description: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
}

impl CommandSchema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            parameters: BTreeMap::new(),
            examples: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.parameters.insert(name.into(), spec);
        self
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.examples.push(example);
        self
    }

    /// Structural sanity check run at registration time.
    pub fn check(&self, name: &str) -> Result<(), SchemaError> {
        if name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }
        for (param, spec) in &self.parameters {
            spec.check(name, param)?;
        }
        Ok(())
    }
}
