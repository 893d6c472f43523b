use crate::{
    gen_accessors::header,
    types::{BridgeEntry, BridgeTable},
    utils::{escape_rust_keyword, to_snake_case},
};

/// Compiles a bridge table into one trampoline per entry, in table order.
pub fn compile_bridge_to_rust(table: &BridgeTable, source: &str) -> String {
    let mut rust_code = header("bridge", source);

    rust_code.push("use propdispatch::prelude::*;".to_string());
    rust_code.push("".to_string());

    for entry in &table.entries {
        rust_code.push(generate_trampoline(entry));
    }

    rust_code.join("\n")
}

fn generate_trampoline(entry: &BridgeEntry) -> String {
    let name = escape_rust_keyword(&to_snake_case(&entry.name));
    let arguments: Vec<(String, &str)> = entry
        .ordered_arguments
        .iter()
        .map(|(arg, ty)| (escape_rust_keyword(&to_snake_case(arg)), ty.as_str()))
        .collect();

    // Validated tables carry at least the driver handle and the object id
    let driver = &arguments[0].0;
    let object_id = &arguments[1].0;

    let (no_driver, no_object, finish) = if entry.returns_status() {
        ("UNSPECIFIED_ERROR", "BAD_OBJECT_ERROR", ".into_status()")
    } else {
        ("Default::default()", "Default::default()", "")
    };

    let parameters: Vec<String> = arguments.iter().map(|(arg, ty)| format!("{}: {}", arg, ty)).collect();
    let forwarded: Vec<&str> = arguments[1..].iter().map(|(arg, _)| arg.as_str()).collect();

    let mut lines = Vec::new();
    lines.push(format!("/// Forwards `{}` to `{}::{}`.", entry.name, entry.owner_type, name));
    lines.push(format!("pub fn {}({}) -> {} {{", name, parameters.join(", "), entry.return_type));
    lines.push(format!("    let driver = match Driver::from_ref({}) {{", driver));
    lines.push("        Some(driver) => driver,".to_string());
    lines.push(format!("        None => return {},", no_driver));
    lines.push("    };".to_string());
    lines.push(format!("    let object = driver.dispatcher().find_object({});", object_id));
    lines.push("    let owner = match object".to_string());
    lines.push("        .as_deref()".to_string());
    lines.push(format!("        .and_then(|object| object.as_any().downcast_ref::<{}>())", entry.owner_type));
    lines.push("    {".to_string());
    lines.push("        Some(owner) => owner,".to_string());
    lines.push("        None => {".to_string());
    lines.push("            driver".to_string());
    lines.push("                .context()".to_string());
    lines.push("                .tracer".to_string());
    lines.push(format!(
        "                .message(&format!(\"{}(): object {{}} not found\", {}));",
        entry.name, object_id
    ));
    lines.push(format!("            return {};", no_object));
    lines.push("        }".to_string());
    lines.push("    };".to_string());
    lines.push(format!("    owner.{}({}){}", name, forwarded.join(", "), finish));
    lines.push("}".to_string());
    lines.push("".to_string());

    lines.join("\n")
}
