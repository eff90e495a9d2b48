//! Schema registry: named command schemas and named field validators.

pub mod builtin;
pub mod validators;

use dashmap::DashMap;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use overlayhub_protocols::command::ValidationResult;
use overlayhub_protocols::error::SchemaError;
use overlayhub_protocols::schema::{CommandSchema, ParamFormat, ParamSpec};
use overlayhub_protocols::types::Fields;

pub use validators::Validator;

/// Holds command schemas and field validators.
///
/// Schemas are stored behind `Arc`, so re-registering a name swaps the whole
/// schema at once; validations already running keep the old one.
pub struct SchemaRegistry {
    schemas: DashMap<String, Arc<CommandSchema>>,
    validators: DashMap<String, Validator>,
}

impl SchemaRegistry {
    /// An empty registry with only the built-in validators.
    pub fn new() -> Self {
        let registry = Self {
            schemas: DashMap::new(),
            validators: DashMap::new(),
        };
        for (name, validator) in validators::builtin() {
            registry.validators.insert(name.to_string(), validator);
        }
        registry
    }

    /// A registry preloaded with the built-in command catalog.
    pub fn with_builtin_catalog() -> Self {
        let registry = Self::new();
        for (name, schema) in builtin::catalog() {
            registry
                .schemas
                .insert(name.to_string(), Arc::new(schema));
        }
        registry
    }

    /// Insert or replace a schema. Returns the schema it replaced.
    pub fn register_schema(
        &self,
        name: impl Into<String>,
        schema: CommandSchema,
    ) -> Result<Option<Arc<CommandSchema>>, SchemaError> {
        let name = name.into();
        schema.check(&name)?;
        debug!("Registering command schema: {}", name);
        Ok(self.schemas.insert(name, Arc::new(schema)))
    }

    /// Put back a previously returned schema without re-checking it.
    pub fn restore_schema(&self, name: impl Into<String>, schema: Arc<CommandSchema>) {
        self.schemas.insert(name.into(), schema);
    }

    pub fn unregister_schema(&self, name: &str) -> Option<Arc<CommandSchema>> {
        self.schemas.remove(name).map(|(_, schema)| schema)
    }

    pub fn get_schema(&self, name: &str) -> Option<Arc<CommandSchema>> {
        self.schemas.get(name).map(|schema| schema.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Sorted action names.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Snapshot of every schema, for the outbound catalog.
    pub fn catalog(&self) -> BTreeMap<String, CommandSchema> {
        self.schemas
            .iter()
            .map(|e| (e.key().clone(), e.value().as_ref().clone()))
            .collect()
    }

    pub fn register_validator<F>(&self, name: impl Into<String>, validator: F)
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.insert(name.into(), Arc::new(validator));
    }

    /// Run a named validator. Unknown names pass.
    pub fn run_validator(&self, name: &str, value: &Value) -> Result<(), String> {
        let validator = self.validators.get(name).map(|v| v.clone());
        match validator {
            Some(validator) => validator(value),
            None => Ok(()),
        }
    }

    /// Validate a raw command.
    ///
    /// Every declared parameter is checked and all errors are collected; for
    /// a single parameter only the first failing check is reported. An
    /// unknown action passes with a warning.
    pub fn validate(&self, command: &Fields) -> ValidationResult {
        let mut result = ValidationResult::ok();

        let action = match command.get("action") {
            Some(Value::String(action)) if !action.is_empty() => action,
            _ => {
                result.push_error("command must have an \"action\" field");
                return result;
            }
        };

        let Some(schema) = self.get_schema(action) else {
            result.push_warning(format!(
                "Unknown action \"{}\"; forwarding without validation",
                action
            ));
            return result;
        };

        let mut failed = HashSet::new();
        for (name, spec) in &schema.parameters {
            if !self.check_param(name, spec, present(command, name), &mut result) {
                failed.insert(name.as_str());
            }
        }

        for (field, validator, label) in [
            ("selector", validators::SELECTOR, "Invalid selector"),
            ("color", validators::COLOR, "Invalid color"),
        ] {
            if failed.contains(field) {
                continue;
            }
            if let Some(value) = present(command, field) {
                if let Err(e) = self.run_validator(validator, value) {
                    result.push_error(format!("{}: {}", label, e));
                }
            }
        }

        result
    }

    /// Check one parameter. Returns false when an error was recorded.
    fn check_param(
        &self,
        name: &str,
        spec: &ParamSpec,
        value: Option<&Value>,
        result: &mut ValidationResult,
    ) -> bool {
        let Some(value) = value else {
            if spec.required {
                result.push_error(format!("{} is required", name));
                return false;
            }
            return true;
        };

        if let Err(error) = self.check_value(name, spec, value) {
            result.push_error(error);
            return false;
        }

        let mut ok = true;
        if let (Some(properties), Value::Object(object)) = (&spec.properties, value) {
            for (child, child_spec) in properties {
                let path = format!("{}.{}", name, child);
                ok &= self.check_param(&path, child_spec, present(object, child), result);
            }
        }
        ok
    }

    /// Fixed-order checks for a present value; first failure wins.
    fn check_value(&self, name: &str, spec: &ParamSpec, value: &Value) -> Result<(), String> {
        if !spec.kind.matches(value) {
            return Err(format!("{} must be of type {}", name, spec.kind));
        }

        if let Some(allowed) = &spec.allowed {
            if !allowed.contains(value) {
                let options: Vec<String> = allowed.iter().map(display_value).collect();
                return Err(format!("{} must be one of: {}", name, options.join(", ")));
            }
        }

        if let (Some(min), Some(number)) = (spec.min, value.as_f64()) {
            if number < min {
                return Err(format!("{} must be at least {}", name, display_number(min)));
            }
        }

        if let (Some(max), Some(number)) = (spec.max, value.as_f64()) {
            if number > max {
                return Err(format!("{} must be at most {}", name, display_number(max)));
            }
        }

        if let (Some(max_length), Some(text)) = (spec.max_length, value.as_str()) {
            if text.chars().count() > max_length {
                return Err(format!("{} must not exceed {} characters", name, max_length));
            }
        }

        if let Some(length) = spec.length {
            let actual = match value {
                Value::Array(items) => Some(items.len()),
                Value::String(text) => Some(text.chars().count()),
                _ => None,
            };
            if actual.is_some_and(|actual| actual != length) {
                return Err(format!("{} must have exactly {} elements", name, length));
            }
        }

        if let (Some(item_kind), Value::Array(items)) = (spec.items, value) {
            if !items.iter().all(|item| item_kind.matches(item)) {
                return Err(format!("{} elements must be of type {}", name, item_kind));
            }
        }

        if let Some(ParamFormat::Url) = spec.format {
            self.run_validator(validators::URL, value)
                .map_err(|e| format!("{}: {}", name, e))?;
        }

        Ok(())
    }

    /// Fill absent parameters with their defaults.
    ///
    /// Nested defaults apply only when the parent object is present.
    pub fn apply_defaults(&self, command: &mut Fields) {
        let Some(action) = command.get("action").and_then(Value::as_str) else {
            return;
        };
        let Some(schema) = self.get_schema(action) else {
            return;
        };
        fill_defaults(&schema.parameters, command);
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn fill_defaults(parameters: &BTreeMap<String, ParamSpec>, object: &mut Fields) {
    for (name, spec) in parameters {
        if present(object, name).is_none() {
            if let Some(default) = &spec.default {
                object.insert(name.clone(), default.clone());
            }
        }
        if let (Some(properties), Some(Value::Object(child))) =
            (&spec.properties, object.get_mut(name))
        {
            fill_defaults(properties, child);
        }
    }
}

/// A field counts as present when it exists and is not `null`.
fn present<'a>(object: &'a Fields, name: &str) -> Option<&'a Value> {
    object.get(name).filter(|value| !value.is_null())
}

fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
