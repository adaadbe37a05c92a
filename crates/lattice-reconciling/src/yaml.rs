//! YAML parsing for policy documents
//!
//! Parses YAML with yaml-rust2 and converts it to `serde_json::Value` so the
//! result can be deserialized into typed structs with serde.

use serde_json::{Map, Number, Value};
use yaml_rust2::{Yaml, YamlLoader};

use crate::error::DefaultingError;

/// Parse a YAML string into a `serde_json::Value`.
///
/// Only the first document is used. Empty input yields `Value::Null`.
pub(crate) fn parse_yaml(input: &str) -> Result<Value, DefaultingError> {
    let docs = YamlLoader::load_from_str(input)
        .map_err(|e| DefaultingError::invalid_policy(e.to_string()))?;
    match docs.into_iter().next() {
        Some(doc) => yaml_to_json(doc),
        None => Ok(Value::Null),
    }
}

fn yaml_to_json(yaml: Yaml) -> Result<Value, DefaultingError> {
    match yaml {
        Yaml::Null => Ok(Value::Null),
        Yaml::Boolean(b) => Ok(Value::Bool(b)),
        Yaml::Integer(i) => Ok(Value::Number(i.into())),
        Yaml::Real(s) => {
            let f: f64 = s
                .parse()
                .map_err(|e: std::num::ParseFloatError| {
                    DefaultingError::invalid_policy(e.to_string())
                })?;
            Ok(Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null))
        }
        Yaml::String(s) => Ok(Value::String(s)),
        Yaml::Array(arr) => arr
            .into_iter()
            .map(yaml_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Yaml::Hash(map) => map
            .into_iter()
            .map(|(k, v)| {
                let key = match k {
                    Yaml::String(s) => s,
                    Yaml::Integer(i) => i.to_string(),
                    Yaml::Boolean(b) => b.to_string(),
                    _ => return Err(DefaultingError::invalid_policy("unsupported YAML key type")),
                };
                yaml_to_json(v).map(|v| (key, v))
            })
            .collect::<Result<Map<String, Value>, _>>()
            .map(Value::Object),
        Yaml::Alias(_) => Err(DefaultingError::invalid_policy(
            "YAML aliases not supported",
        )),
        Yaml::BadValue => Err(DefaultingError::invalid_policy("bad YAML value")),
    }
}
