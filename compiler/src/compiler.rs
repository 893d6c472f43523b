use crate::{
    error::SchemaError,
    gen_accessors::compile_class_to_rust,
    gen_bridge::compile_bridge_to_rust,
    gen_strings::compile_strings_to_rust,
    parser::{parse_bridge, parse_class},
    strings::{StringTables, Symbols},
};

/// Validate a class schema document and render its accessor source.
/// Returns `Err(SchemaError)` if parsing or validation fails.
pub fn compile_class(text: &str, symbols: &dyn Symbols, source: &str) -> Result<String, SchemaError> {
    let class = parse_class(text, symbols)?;
    tracing::debug!(class = %class.class_name, properties = class.properties.len(), "validated class schema");
    compile_class_to_rust(&class, source)
}

/// Validate a bridge table document and render its trampolines.
pub fn compile_bridge(text: &str, source: &str) -> Result<String, SchemaError> {
    let table = parse_bridge(text)?;
    tracing::debug!(entries = table.entries.len(), "validated bridge table");
    Ok(compile_bridge_to_rust(&table, source))
}

/// Mine a constant corpus and render the seven lookup functions.
/// Mining skips what it cannot evaluate, so this never fails.
pub fn compile_strings(corpus: &str, source: &str) -> String {
    compile_strings_to_rust(&StringTables::mine(corpus), source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::NoSymbols;

    #[test]
    fn unknown_field_aborts() {
        let result = compile_class(
            r#"{ "className": "A", "classIdentityChain": [1], "colour": "red" }"#,
            &NoSymbols,
            "A.json",
        );
        assert!(matches!(result, Err(SchemaError::UnknownField { ref field, .. }) if field == "colour"));
    }

    #[test]
    fn class_compiles() {
        let code = compile_class(
            r#"{
                "className": "Box",
                "classIdentityChain": ["abox", "aobj"],
                "properties": { "Name": { "selectorCode": "lnam", "wireType": "UInt32" } }
            }"#,
            &NoSymbols,
            "Box.json",
        )
        .unwrap();
        assert!(code.contains("pub trait BoxAccessors: Send + Sync {"));
        assert!(code.contains("    fn get_name(&self) -> u32;"));
    }
}
