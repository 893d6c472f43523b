use crate::{
    gen_accessors::header,
    strings::{CodeKind, StringTables},
    utils::quote,
};
use std::collections::BTreeMap;
use std::collections::HashSet;

const LOOKUPS: [(&str, CodeKind); 6] = [
    ("class_id_to_string", CodeKind::Class),
    ("property_selector_to_string", CodeKind::Selector),
    ("property_scope_to_string", CodeKind::Scope),
    ("operation_id_to_string", CodeKind::Operation),
    ("status_to_string", CodeKind::Status),
    ("format_id_to_string", CodeKind::FormatId),
];

/// Compiles the mined tables into seven lookup functions.
pub fn compile_strings_to_rust(tables: &StringTables, source: &str) -> String {
    let mut rust_code = header("strings", source);

    rust_code.push("use propdispatch::schema::code_to_string;".to_string());
    rust_code.push("".to_string());

    for (name, kind) in LOOKUPS {
        rust_code.push(generate_lookup(name, kind, tables.table(kind)));
    }
    rust_code.push(generate_flags(&tables.format_flags));

    rust_code.join("\n")
}

fn generate_lookup(name: &str, kind: CodeKind, table: &BTreeMap<String, u32>) -> String {
    let mut lines = Vec::new();
    let mut seen = HashSet::new();

    if kind == CodeKind::Status {
        lines.push(format!("pub fn {}(status: i32) -> String {{", name));
        lines.push("    match status as u32 {".to_string());
        lines.push("        0 => \"OK\".to_string(),".to_string());
        seen.insert(0);
    } else {
        lines.push(format!("pub fn {}(code: u32) -> String {{", name));
        lines.push("    match code {".to_string());
    }

    // Entries in name order; a code already claimed by an earlier name is unreachable
    for (symbol, &code) in table {
        if seen.insert(code) {
            lines.push(format!("        0x{:08x} => {}.to_string(),", code, quote(symbol)));
        }
    }

    lines.push("        other => code_to_string(other),".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push("".to_string());
    lines.join("\n")
}

fn generate_flags(flags: &BTreeMap<String, u32>) -> String {
    let mut lines = Vec::new();
    lines.push("pub fn format_flags_to_string(flags: u32) -> String {".to_string());
    if flags.is_empty() {
        lines.push("    let _ = flags;".to_string());
        lines.push("    String::new()".to_string());
    } else {
        lines.push("    let mut names = Vec::new();".to_string());
        for (symbol, &mask) in flags {
            lines.push(format!("    if flags & 0x{:08x} != 0 {{", mask));
            lines.push(format!("        names.push({});", quote(symbol)));
            lines.push("    }".to_string());
        }
        lines.push("    names.join(\"|\")".to_string());
    }
    lines.push("}".to_string());
    lines.push("".to_string());
    lines.join("\n")
}
