//! Fact tables for the command line and the wasm wrapper: an array of JSON
//! (or JSON5) objects, grouped by named fields.

use crate::spec::{FillColor, Layer, PartitionSpec};
use serde_json::Value;

pub type Fact = Value;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("invalid facts document: {0}")]
    Invalid(String),

    #[error("facts document must be an array of objects")]
    NotAnArray,

    #[error("fact #{index} is not an object")]
    NotAnObject { index: usize },

    #[error("fact #{index} has no field '{field}'")]
    MissingField { index: usize, field: String },

    #[error("fact #{index} has a non-numeric value in '{field}'")]
    NonNumeric { index: usize, field: String },
}

/// Parses a facts document, trying strict JSON before JSON5.
pub fn parse_facts(source: &str) -> Result<Vec<Fact>, DataError> {
    let document: Value = match serde_json::from_str(source) {
        Ok(value) => value,
        Err(json_error) => json5::from_str(source)
            .map_err(|json5_error| DataError::Invalid(format!("{json_error}; as JSON5: {json5_error}")))?,
    };
    match document {
        Value::Array(facts) => Ok(facts),
        _ => Err(DataError::NotAnArray),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Group key of a field value; strings are used as they are.
fn group_key(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Checks that every fact carries the value and layer fields, so grouping
/// never sees a silently missing key.
pub fn validate_facts(facts: &[Fact], value_field: &str, layer_fields: &[String]) -> Result<(), DataError> {
    for (index, fact) in facts.iter().enumerate() {
        let Some(object) = fact.as_object() else {
            return Err(DataError::NotAnObject { index });
        };
        let value = object.get(value_field).ok_or_else(|| DataError::MissingField {
            index,
            field: value_field.to_string(),
        })?;
        if numeric(value).is_none() {
            return Err(DataError::NonNumeric {
                index,
                field: value_field.to_string(),
            });
        }
        if let Some(field) = layer_fields.iter().find(|field| !object.contains_key(field.as_str())) {
            return Err(DataError::MissingField {
                index,
                field: field.clone(),
            });
        }
    }
    Ok(())
}

/// One layer per field, in order, summing `value_field`. Subtrees of a
/// first-layer node share its `palette` colour.
pub fn spec_from_fields(value_field: &str, layer_fields: &[String], palette: &[String]) -> PartitionSpec<Fact> {
    let value_field = value_field.to_string();
    let mut spec = PartitionSpec::new(move |fact: &Fact| fact.get(&value_field).and_then(numeric).unwrap_or(f64::NAN));
    for field in layer_fields {
        let field = field.clone();
        spec = spec.with_layer(
            Layer::new(move |fact: &Fact| group_key(fact.get(&field)))
                .with_fill_color(FillColor::SortIndexPalette(palette.to_vec())),
        );
    }
    spec
}
