//! JSON schema validators for checkreport DTOs.
//!
//! Schemas are generated from the types with `schemars`, the same way
//! `cargo xtask schema` writes them to `schemas/`.

use checkreport_types::{ConfigFile, StoreDump};
use jsonschema::JSONSchema;
use schemars::schema_for;

/// Error type for schema validation failures.
#[derive(Debug)]
pub struct SchemaValidationError {
    /// The validation errors.
    pub errors: Vec<String>,
}

impl std::fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Schema validation failed: {}", self.errors.join("; "))
    }
}

impl std::error::Error for SchemaValidationError {}

fn compile(schema: schemars::schema::RootSchema) -> JSONSchema {
    let value = serde_json::to_value(schema).expect("schema should serialize to JSON");
    JSONSchema::compile(&value).expect("schema should compile")
}

/// Compile the StoreDump JSON schema.
pub fn load_store_schema() -> JSONSchema {
    compile(schema_for!(StoreDump))
}

/// Compile the ConfigFile JSON schema.
pub fn load_config_schema() -> JSONSchema {
    compile(schema_for!(ConfigFile))
}

/// Validate a StoreDump against its JSON schema.
pub fn validate_store_dump(dump: &StoreDump) -> Result<(), SchemaValidationError> {
    let json_value = serde_json::to_value(dump).expect("StoreDump should serialize to JSON");
    validate_store_json(&json_value)
}

/// Validate any JSON value against the StoreDump schema.
pub fn validate_store_json(json: &serde_json::Value) -> Result<(), SchemaValidationError> {
    validate_with_schema(&load_store_schema(), json)
}

/// Validate a ConfigFile against its JSON schema.
pub fn validate_config_file(config: &ConfigFile) -> Result<(), SchemaValidationError> {
    let json_value = serde_json::to_value(config).expect("ConfigFile should serialize to JSON");
    validate_with_schema(&load_config_schema(), &json_value)
}

fn validate_with_schema(
    schema: &JSONSchema,
    json: &serde_json::Value,
) -> Result<(), SchemaValidationError> {
    match schema.validate(json) {
        Ok(()) => Ok(()),
        Err(errors) => Err(SchemaValidationError {
            errors: errors.map(|e| e.to_string()).collect(),
        }),
    }
}

/// Check if a string is in snake_case format.
pub fn is_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Field names of a JSON value that are not snake_case, recursively.
///
/// Only object keys are inspected; map-valued fields such as `settings`
/// should be removed first when their keys are free-form.
pub fn non_snake_case_fields(value: &serde_json::Value) -> Vec<String> {
    let mut out = Vec::new();
    collect(value, &mut out);
    out
}

fn collect(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                if !is_snake_case(key) {
                    out.push(key.clone());
                }
                collect(val, out);
            }
        }
        serde_json::Value::Array(items) => items.iter().for_each(|item| collect(item, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_stores;
    use serde_json::json;

    #[test]
    fn validates_default_config() {
        assert!(validate_config_file(&ConfigFile::default()).is_ok());
    }

    #[test]
    fn validates_empty_store() {
        assert!(validate_store_dump(&StoreDump::default()).is_ok());
    }

    #[test]
    fn validates_sample_stores() {
        for (name, dump) in sample_stores::all() {
            if let Err(err) = validate_store_dump(&dump) {
                panic!("sample store '{name}' should validate: {err}");
            }
        }
    }

    #[test]
    fn rejects_store_without_schema_field() {
        let result = validate_store_json(&json!({ "checks": [] }));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_check_with_string_status() {
        let result = validate_store_json(&json!({
            "schema": "checkreport.store.v1",
            "checks": [{
                "id": 1, "kind": 12, "checker": 2, "status": "error",
                "statement_id": 1, "call_context_id": 1
            }]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn sample_store_fields_are_snake_case() {
        for (name, dump) in sample_stores::all() {
            let mut value = serde_json::to_value(&dump).unwrap();
            value.as_object_mut().unwrap().remove("settings");
            let bad = non_snake_case_fields(&value);
            assert!(bad.is_empty(), "{name}: {bad:?}");
        }
    }

    #[test]
    fn snake_case_detection() {
        assert!(is_snake_case("call_context_id"));
        assert!(is_snake_case("times"));
        assert!(!is_snake_case("callContextId"));
        assert!(!is_snake_case("_private"));
        assert!(!is_snake_case("double__underscore"));
        assert!(!is_snake_case(""));
    }
}
