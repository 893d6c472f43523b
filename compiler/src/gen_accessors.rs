use crate::{
    error::SchemaError,
    types::{ClassSchema, Code, PropertySchema},
    utils::{escape_rust_keyword, quote, to_snake_case},
};
use propdispatch_schema::code_to_string;

/// Leading comment of every generated file.
pub fn header(generator: &str, source: &str) -> Vec<String> {
    vec![
        "// THIS FILE IS AUTO-GENERATED. DO NOT EDIT!".to_string(),
        format!("// Generator: propgen {}", generator),
        format!("// Source: {}", source),
        "".to_string(),
    ]
}

/// Symbolic name of a code, or its raw rendering.
pub fn describe_code(code: &Code) -> String {
    match code.name {
        Some(ref name) => name.clone(),
        None => code_to_string(code.value),
    }
}

/// Rust type handed to and returned by the typed accessors.
fn rust_type(property: &PropertySchema) -> String {
    let element = property.host_type.name();
    if property.is_array {
        format!("Vec<{}>", element)
    } else {
        element.to_string()
    }
}

fn qualifier_type(property: &PropertySchema) -> Option<&'static str> {
    property.qualifier_type.map(|wire| wire.natural_host().name())
}

fn method(prefix: &str, property: &PropertySchema, suffix: &str) -> String {
    escape_rust_keyword(&format!("{}{}{}", prefix, to_snake_case(&property.name), suffix))
}

/// Whether the implementer supplies a plain, scoped or qualified getter.
/// Setter wrappers compare against the current value, so they need one too.
fn has_getter(property: &PropertySchema) -> bool {
    (property.gettable && !property.is_converter) || property.has_setter_wrapper()
}

fn getter_signature(property: &PropertySchema) -> String {
    let name = method("get_", property, "");
    let ty = rust_type(property);
    if property.scoped_getter {
        format!("fn {}(&self, scope: u32) -> {}", name, ty)
    } else if let Some(qualifier) = qualifier_type(property) {
        format!("fn {}(&self, qualifier: {}) -> {}", name, qualifier, ty)
    } else {
        format!("fn {}(&self) -> {}", name, ty)
    }
}

/// Compiles one validated class into Rust source: identity constants, the
/// embedded schema, a typed accessor trait with its `PropertyHost` adapter,
/// and typed accessor wrappers over `PropertyObject`.
pub fn compile_class_to_rust(class: &ClassSchema, source: &str) -> Result<String, SchemaError> {
    let mut rust_code = header("accessors", source);

    let snake = to_snake_case(&class.class_name);
    let upper = snake.to_uppercase();

    rust_code.push("use propdispatch::prelude::*;".to_string());
    rust_code.push("use std::sync::Arc;".to_string());
    rust_code.push("".to_string());

    rust_code.push(generate_identity(class, &upper));
    rust_code.push(generate_selectors(class, &snake));
    rust_code.push(generate_schema(class, &snake, &upper)?);
    rust_code.push(generate_accessor_trait(class));
    rust_code.push(generate_host(class));
    rust_code.push(generate_wrappers(class));

    Ok(rust_code.join("\n"))
}

fn generate_identity(class: &ClassSchema, upper: &str) -> String {
    let mut lines = Vec::new();
    let chain = &class.class_identity_chain;

    lines.push(format!("pub const {}_CLASS_NAME: &str = {};", upper, quote(&class.class_name)));

    if let Some(own) = chain.first() {
        lines.push(format!(
            "pub const {}_CLASS_ID: u32 = 0x{:08x}; // {}",
            upper,
            own.value,
            describe_code(own)
        ));
        let base = chain.get(1).unwrap_or(own);
        lines.push(format!(
            "pub const {}_BASE_CLASS_ID: u32 = 0x{:08x}; // {}",
            upper,
            base.value,
            describe_code(base)
        ));
    }

    let codes: Vec<String> = chain.iter().map(|c| format!("0x{:08x}", c.value)).collect();
    lines.push(format!(
        "pub const {}_IDENTITY_CHAIN: [u32; {}] = [{}];",
        upper,
        codes.len(),
        codes.join(", ")
    ));
    lines.push("".to_string());

    lines.join("\n")
}

fn generate_selectors(class: &ClassSchema, snake: &str) -> String {
    let mut lines = Vec::new();
    lines.push(format!("pub mod {}_selectors {{", snake));
    for property in &class.properties {
        lines.push(format!(
            "    pub const {}: u32 = 0x{:08x}; // {}",
            to_snake_case(&property.name).to_uppercase(),
            property.selector_code.value,
            describe_code(&property.selector_code)
        ));
    }
    lines.push("}".to_string());
    lines.push("".to_string());
    lines.join("\n")
}

fn generate_schema(class: &ClassSchema, snake: &str, upper: &str) -> Result<String, SchemaError> {
    let json = serde_json::to_string_pretty(class)?;

    let mut lines = Vec::new();
    lines.push(format!("pub const {}_SCHEMA: &str = r###\"{}\"###;", upper, json));
    lines.push("".to_string());
    lines.push(format!("/// Validated schema of `{}`, as embedded at generation time.", class.class_name));
    lines.push(format!(
        "pub fn {}_schema() -> Result<propdispatch::compiler::ClassSchema, propdispatch::compiler::SchemaError> {{",
        snake
    ));
    lines.push(format!(
        "    propdispatch::compiler::parse_class({}_SCHEMA, &propdispatch::compiler::NoSymbols)",
        upper
    ));
    lines.push("}".to_string());
    lines.push("".to_string());
    Ok(lines.join("\n"))
}

fn generate_accessor_trait(class: &ClassSchema) -> String {
    let mut lines = Vec::new();
    lines.push(format!("/// Property storage and hooks of `{}`.", class.class_name));
    lines.push(format!("pub trait {}Accessors: Send + Sync {{", class.class_name));

    for property in &class.properties {
        if has_getter(property) {
            lines.push(format!("    {};", getter_signature(property)));
        }
        if property.gettable && property.is_converter {
            let ty = rust_type(property);
            lines.push(format!("    fn {}(&self, input: {}) -> {};", method("convert_", property, ""), ty, ty));
        }
        if property.has_setter_wrapper() {
            let ty = rust_type(property);
            if property.validated {
                lines.push(format!(
                    "    fn {}(&self, value: &{}) -> Result<(), OsStatus>;",
                    method("check_", property, ""),
                    ty
                ));
            }
            lines.push(format!(
                "    fn {}(&self, value: {}) -> Result<(), OsStatus>;",
                method("set_", property, "_impl"),
                ty
            ));
        }
    }

    lines.push("}".to_string());
    lines.push("".to_string());
    lines.join("\n")
}

fn extract(ty: &str, expr: &str) -> String {
    format!("<{}>::from_value({}).map_err(|_| UNSPECIFIED_ERROR)?", ty, expr)
}

fn generate_host(class: &ClassSchema) -> String {
    let name = &class.class_name;
    let mut lines = Vec::new();

    lines.push(format!("/// Serves the properties of `{}` from a typed implementation.", name));
    lines.push(format!("pub struct {}Host<T>(pub Arc<T>);", name));
    lines.push("".to_string());
    lines.push(format!("impl<T: {}Accessors> PropertyHost for {}Host<T> {{", name, name));

    // get
    lines.push("    fn get(&self, key: &PropertyKey, read: Read) -> Result<Value, OsStatus> {".to_string());
    lines.push("        match (key.property, read) {".to_string());
    for property in class.properties.iter().filter(|p| has_getter(p)) {
        let getter = method("get_", property, "");
        let key = quote(&property.name);
        if property.scoped_getter {
            lines.push(format!("            ({}, Read::Scoped(scope)) => Ok(self.0.{}(scope).into()),", key, getter));
        } else if let Some(qualifier) = qualifier_type(property) {
            lines.push(format!("            ({}, Read::Qualified(qualifier)) => {{", key));
            lines.push(format!("                let qualifier = {};", extract(qualifier, "&qualifier")));
            lines.push(format!("                Ok(self.0.{}(qualifier).into())", getter));
            lines.push("            }".to_string());
        } else {
            lines.push(format!("            ({}, _) => Ok(self.0.{}().into()),", key, getter));
        }
    }
    lines.push("            _ => Err(UNKNOWN_PROPERTY_ERROR),".to_string());
    lines.push("        }".to_string());
    lines.push("    }".to_string());

    // convert
    let converters: Vec<&PropertySchema> = class.properties.iter().filter(|p| p.gettable && p.is_converter).collect();
    if !converters.is_empty() {
        lines.push("".to_string());
        lines.push("    fn convert(&self, key: &PropertyKey, input: Value) -> Result<Value, OsStatus> {".to_string());
        lines.push("        match key.property {".to_string());
        for property in converters {
            lines.push(format!("            {} => {{", quote(&property.name)));
            lines.push(format!("                let input = {};", extract(&rust_type(property), "&input")));
            lines.push(format!("                Ok(self.0.{}(input).into())", method("convert_", property, "")));
            lines.push("            }".to_string());
        }
        lines.push("            _ => Err(UNKNOWN_PROPERTY_ERROR),".to_string());
        lines.push("        }".to_string());
        lines.push("    }".to_string());
    }

    // check
    let validated: Vec<&PropertySchema> =
        class.properties.iter().filter(|p| p.validated && p.has_setter_wrapper()).collect();
    if !validated.is_empty() {
        lines.push("".to_string());
        lines.push("    fn check(&self, key: &PropertyKey, value: &Value) -> Result<(), OsStatus> {".to_string());
        lines.push("        match key.property {".to_string());
        for property in validated {
            lines.push(format!(
                "            {} => self.0.{}(&{}),",
                quote(&property.name),
                method("check_", property, ""),
                extract(&rust_type(property), "value")
            ));
        }
        lines.push("            _ => Ok(()),".to_string());
        lines.push("        }".to_string());
        lines.push("    }".to_string());
    }

    // set
    let setters: Vec<&PropertySchema> = class.properties.iter().filter(|p| p.has_setter_wrapper()).collect();
    let value = if setters.is_empty() { "_value" } else { "value" };
    lines.push("".to_string());
    lines.push(format!("    fn set(&self, key: &PropertyKey, {}: Value) -> Result<(), OsStatus> {{", value));
    lines.push("        match key.property {".to_string());
    for property in setters {
        lines.push(format!(
            "            {} => self.0.{}({}),",
            quote(&property.name),
            method("set_", property, "_impl"),
            extract(&rust_type(property), "&value")
        ));
    }
    lines.push("            _ => Err(UNKNOWN_PROPERTY_ERROR),".to_string());
    lines.push("        }".to_string());
    lines.push("    }".to_string());

    lines.push("}".to_string());
    lines.push("".to_string());
    lines.join("\n")
}

fn generate_wrappers(class: &ClassSchema) -> String {
    let name = &class.class_name;
    let mut signatures = Vec::new();
    let mut bodies = Vec::new();

    for property in &class.properties {
        let ty = rust_type(property);
        let key = quote(&property.name);

        if property.gettable && !property.is_converter && !property.is_qualified {
            let signature = format!("fn {}(&self) -> Result<{}, DispatchError>", method("get_", property, ""), ty);
            signatures.push(format!("    {};", signature));
            bodies.push(format!("    {} {{", signature));
            bodies.push(format!("        let value = self.get_property({})?;", key));
            bodies.push(format!("        Ok(<{}>::from_value(&value)?)", ty));
            bodies.push("    }".to_string());
            bodies.push("".to_string());
        }

        if property.has_setter_wrapper() {
            let signature = format!("fn {}(&self, value: {}) -> Result<(), DispatchError>", method("set_", property, ""), ty);
            signatures.push(format!("    {};", signature));
            bodies.push(format!("    {} {{", signature));
            bodies.push(format!("        self.set_property({}, value)", key));
            bodies.push("    }".to_string());
            bodies.push("".to_string());
        }
    }

    if bodies.last().map_or(false, String::is_empty) {
        bodies.pop();
    }

    let mut lines = Vec::new();
    lines.push(format!("/// Typed accessor wrappers of `{}` over the dynamic property object.", name));
    lines.push(format!("pub trait {}Properties {{", name));
    lines.extend(signatures);
    lines.push("}".to_string());
    lines.push("".to_string());
    lines.push(format!("impl {}Properties for PropertyObject {{", name));
    lines.extend(bodies);
    lines.push("}".to_string());
    lines.push("".to_string());
    lines.join("\n")
}
