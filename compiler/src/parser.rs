use crate::{
    error::SchemaError,
    strings::Symbols,
    types::{BridgeTable, ClassSchema},
    verifier::{validate_bridge, validate_class, verify_hierarchy},
};
use serde_json::Value as Json;

/// Parses and validates a single class schema document.
pub fn parse_class(text: &str, symbols: &dyn Symbols) -> Result<ClassSchema, SchemaError> {
    let json: Json = serde_json::from_str(text)?;
    validate_class(&json, symbols)
}

/// Parses a document holding either one class object or an array of them.
/// Base classes are not resolved; see [parse_classes].
pub fn parse_class_list(text: &str, symbols: &dyn Symbols) -> Result<Vec<ClassSchema>, SchemaError> {
    let json: Json = serde_json::from_str(text)?;

    match json {
        Json::Array(items) => items.iter().map(|item| validate_class(item, symbols)).collect(),
        other => Ok(vec![validate_class(&other, symbols)?]),
    }
}

/// Like [parse_class_list], then checks the classes form a valid hierarchy.
pub fn parse_classes(text: &str, symbols: &dyn Symbols) -> Result<Vec<ClassSchema>, SchemaError> {
    let classes = parse_class_list(text, symbols)?;
    verify_hierarchy(&classes)?;
    Ok(classes)
}

pub fn parse_bridge(text: &str) -> Result<BridgeTable, SchemaError> {
    let json: Json = serde_json::from_str(text)?;
    validate_bridge(&json)
}
