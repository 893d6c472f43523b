pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

/// Converts a string to snake_case.
/// Runs of capitals stay together, so acronyms remain intact
/// (e.g. "DeviceUID" becomes "device_uid", "IOProc" becomes "io_proc").
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::new();
    for i in 0..chars.len() {
        let c = chars[i];
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                // Insert an underscore if the previous character is not uppercase,
                // or if the next character exists and is lowercase.
                if (!prev.is_uppercase() && prev != '_')
                    || (prev.is_uppercase() && i + 1 < chars.len() && chars[i + 1].is_lowercase())
                {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}

/// Escapes Rust reserved keywords by suffixing with an underscore.
pub fn escape_rust_keyword(s: &str) -> String {
    let keywords = [
        "as", "break", "const", "continue", "crate", "else",
        "enum", "extern", "false", "fn", "for", "if", "impl",
        "in", "let", "loop", "match", "mod", "move", "mut",
        "pub", "ref", "return", "self", "Self", "static",
        "struct", "super", "trait", "true", "type", "unsafe",
        "use", "where", "while",
    ];
    if keywords.contains(&s) {
        format!("{}_", s)
    } else {
        s.to_string()
    }
}

#[test]
fn snake_case_keeps_acronyms() {
    assert_eq!(to_snake_case("Volume"), "volume");
    assert_eq!(to_snake_case("DeviceUID"), "device_uid");
    assert_eq!(to_snake_case("IOProcBufferSize"), "io_proc_buffer_size");
    assert_eq!(to_snake_case("GetPropertyData"), "get_property_data");
    assert_eq!(to_snake_case("Is_Running"), "is_running");
}

#[test]
fn keywords_are_escaped() {
    assert_eq!(escape_rust_keyword("type"), "type_");
    assert_eq!(escape_rust_keyword("scope"), "scope");
}
