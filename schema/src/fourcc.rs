/// Packs a four-character code such as `"lnam"` into its big-endian `u32`.
/// Returns `None` unless `text` is exactly four bytes long.
pub fn fourcc(text: &str) -> Option<u32> {
    let bytes: [u8; 4] = text.as_bytes().try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

/// Fallback rendering for codes that have no registered name.
///
/// Printable four-character codes render as `'lnam' (0x6c6e616d)`,
/// anything else as plain hex.
pub fn code_to_string(code: u32) -> String {
    let bytes = code.to_be_bytes();
    if bytes.iter().all(|b| (0x20..0x7f).contains(b)) {
        let text: String = bytes.iter().map(|&b| b as char).collect();
        format!("'{}' (0x{:x})", text, code)
    } else {
        format!("0x{:x}", code)
    }
}

#[test]
fn packs_four_char_codes() {
    assert_eq!(fourcc("glob"), Some(0x676c_6f62));
    assert_eq!(fourcc("uid "), Some(0x7569_6420));
    assert_eq!(fourcc("toolong"), None);
}

#[test]
fn renders_unknown_codes() {
    assert_eq!(code_to_string(0x676c_6f62), "'glob' (0x676c6f62)");
    assert_eq!(code_to_string(0), "0x0");
    assert_eq!(code_to_string(3), "0x3");
}
