//! Selector registry: mines named constants out of a reference text and
//! builds the seven code-to-name tables used for diagnostics.

use lazy_static::lazy_static;
use propdispatch_schema::{code_to_string, fourcc};
use regex::Regex;
use std::collections::BTreeMap;

lazy_static! {
    static ref SELECTOR_RX:  Regex = Regex::new(r"(kAudio\S+Property\S+)\s*=\s*('[^'\r\n]+')").unwrap();
    static ref CLASS_RX:     Regex = Regex::new(r"(kAudio\S+ClassID)\s*=\s*('[^'\r\n]+')").unwrap();
    static ref SCOPE_RX:     Regex = Regex::new(r"(kAudioObjectPropertyScope\S+)\s*=\s*('[^'\r\n]+')").unwrap();
    static ref OPERATION_RX: Regex = Regex::new(r"(kAudioServerPlugInIOOperation\S+)\s*=\s*('[^'\r\n]+')").unwrap();
    static ref STATUS_RX:    Regex = Regex::new(r"(kAudio\S+Error)\s*=\s*('[^'\r\n]+')").unwrap();
    static ref FORMAT_RX:    Regex = Regex::new(r"(kAudioFormat\S+)\s*=\s*([^,}]+)").unwrap();
    static ref SYMBOL_RX:    Regex = Regex::new(r"\b(k[A-Za-z0-9_]+)\s*=\s*([^,};\r\n]+)").unwrap();
    static ref SHIFT_RX:     Regex = Regex::new(r"^(\w+)\s*<<\s*(\w+)$").unwrap();
}

/// Selectors starting with these prefixes win duplicate-code conflicts.
pub const HIGH_PRIORITY_PREFIXES: [&str; 6] = [
    "kAudioObject",
    "kAudioDevice",
    "kAudioStream",
    "kAudioControl",
    "kAudioLevelControl",
    "kAudioPlugIn",
];

const EXCLUDED_FLAG_NAMES: [&str; 2] = ["kAudioFormatFlagsAreAllClear", "kAudioFormatFlagsNativeEndian"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeKind {
    Class,
    Selector,
    Scope,
    Operation,
    Status,
    FormatId,
    FormatFlag,
}

/// Resolves symbolic constant names used in schemas.
pub trait Symbols {
    fn code_of(&self, name: &str) -> Option<u32>;
}

/// Resolves nothing; schemas must spell codes numerically or as four-char strings.
pub struct NoSymbols;

impl Symbols for NoSymbols {
    fn code_of(&self, _name: &str) -> Option<u32> {
        None
    }
}

/// The seven name tables, each sorted by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringTables {
    pub classes:      BTreeMap<String, u32>,
    pub selectors:    BTreeMap<String, u32>,
    pub scopes:       BTreeMap<String, u32>,
    pub operations:   BTreeMap<String, u32>,
    pub statuses:     BTreeMap<String, u32>,
    pub format_ids:   BTreeMap<String, u32>,
    pub format_flags: BTreeMap<String, u32>,
    symbols:          BTreeMap<String, u32>,
}

/// Evaluates the right-hand side of a constant declaration: `'abcd'`,
/// decimal or hex integers with `U`/`L` suffixes, and `a << b` shifts,
/// optionally parenthesized.
pub fn parse_code_literal(text: &str) -> Option<u32> {
    let mut text = text.trim();
    while text.starts_with('(') && text.ends_with(')') {
        text = text[1..text.len() - 1].trim();
    }

    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        return fourcc(&text[1..text.len() - 1]);
    }

    if let Some(caps) = SHIFT_RX.captures(text) {
        let base = parse_integer(&caps[1])?;
        let shift = parse_integer(&caps[2])?;
        return base.checked_shl(shift);
    }

    parse_integer(text)
}

fn parse_integer(text: &str) -> Option<u32> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);
    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).ok();
    }
    if let Some(negative) = digits.strip_prefix('-') {
        return negative.parse::<i32>().ok().map(|v| (-v) as u32);
    }
    digits.parse::<u32>().ok()
}

/// Whether selector name `a` should replace `b` when both map to one code.
///
/// Total order: high-priority prefix first, then the shorter name (shorter
/// names denote the more generic concept), then the lexically smaller one.
pub fn selector_is_better(a: &str, b: &str) -> bool {
    let a_high = HIGH_PRIORITY_PREFIXES.iter().any(|p| a.starts_with(p));
    let b_high = HIGH_PRIORITY_PREFIXES.iter().any(|p| b.starts_with(p));

    if a_high != b_high {
        return a_high;
    }
    if a.len() != b.len() {
        return a.len() < b.len();
    }
    a < b
}

fn is_excluded_selector(name: &str) -> bool {
    name.starts_with("kAudioObjectPropertyScope")
        || name.starts_with("kAudioObjectPropertyElement")
        || name.ends_with("Error")
        || name.starts_with("kAudioServerPlugInCustomPropertyDataType")
}

fn mine_table(text: &str, rx: &Regex) -> BTreeMap<String, u32> {
    let mut table = BTreeMap::new();
    for caps in rx.captures_iter(text) {
        let (name, literal) = (&caps[1], &caps[2]);
        match parse_code_literal(literal) {
            Some(code) => {
                table.insert(name.to_string(), code);
            }
            None => tracing::warn!("skipping {}: cannot evaluate {}", name, literal.trim()),
        }
    }
    table
}

impl StringTables {
    /// Builds all tables from a constant corpus. Mining never fails;
    /// declarations that cannot be evaluated are skipped.
    pub fn mine(text: &str) -> StringTables {
        let mut tables = StringTables {
            classes: mine_table(text, &CLASS_RX),
            scopes: mine_table(text, &SCOPE_RX),
            operations: mine_table(text, &OPERATION_RX),
            statuses: mine_table(text, &STATUS_RX),
            ..Default::default()
        };

        // Selectors, one name per code
        let mut code_to_selector: BTreeMap<u32, String> = BTreeMap::new();
        for (name, code) in mine_table(text, &SELECTOR_RX) {
            if is_excluded_selector(&name) {
                continue;
            }
            let replace = match code_to_selector.get(&code) {
                Some(other) => selector_is_better(&name, other),
                None => true,
            };
            if replace {
                code_to_selector.insert(code, name);
            }
        }
        tables.selectors = code_to_selector.into_iter().map(|(code, name)| (name, code)).collect();

        // Format identifiers and atomic format flags
        for caps in FORMAT_RX.captures_iter(text) {
            let name = &caps[1];
            let literal = caps[2].trim();

            if EXCLUDED_FLAG_NAMES.contains(&name) {
                continue;
            }

            if name.starts_with("kAudioFormatFlag") {
                if literal == "0" || literal.contains('|') {
                    continue;
                }
                match parse_code_literal(literal) {
                    Some(0) => {}
                    Some(code) => {
                        tables.format_flags.insert(name.to_string(), code);
                    }
                    None => tracing::warn!("skipping flag {}: cannot evaluate {}", name, literal),
                }
            } else {
                match parse_code_literal(literal) {
                    Some(code) => {
                        tables.format_ids.insert(name.to_string(), code);
                    }
                    None => tracing::warn!("skipping format {}: cannot evaluate {}", name, literal),
                }
            }
        }

        for caps in SYMBOL_RX.captures_iter(text) {
            if let Some(code) = parse_code_literal(&caps[2]) {
                tables.symbols.entry(caps[1].to_string()).or_insert(code);
            }
        }

        tracing::debug!(
            classes = tables.classes.len(),
            selectors = tables.selectors.len(),
            scopes = tables.scopes.len(),
            operations = tables.operations.len(),
            statuses = tables.statuses.len(),
            format_ids = tables.format_ids.len(),
            format_flags = tables.format_flags.len(),
            "mined constant tables"
        );

        tables
    }

    pub fn table(&self, kind: CodeKind) -> &BTreeMap<String, u32> {
        match kind {
            CodeKind::Class => &self.classes,
            CodeKind::Selector => &self.selectors,
            CodeKind::Scope => &self.scopes,
            CodeKind::Operation => &self.operations,
            CodeKind::Status => &self.statuses,
            CodeKind::FormatId => &self.format_ids,
            CodeKind::FormatFlag => &self.format_flags,
        }
    }

    /// First name (in name order) registered for `code`.
    pub fn name_of(&self, kind: CodeKind, code: u32) -> Option<&str> {
        self.table(kind)
            .iter()
            .find(|(_, &c)| c == code)
            .map(|(name, _)| name.as_str())
    }

    /// Registered name of `code`, or its raw rendering.
    pub fn code_to_string(&self, kind: CodeKind, code: u32) -> String {
        if kind == CodeKind::Status && code == 0 {
            return "OK".to_string();
        }
        match self.name_of(kind, code) {
            Some(name) => name.to_string(),
            None => code_to_string(code),
        }
    }

    /// Decomposes a flag mask into `|`-joined atomic flag names sorted by name.
    pub fn flags_to_string(&self, mask: u32) -> String {
        self.format_flags
            .iter()
            .filter(|(_, &flag)| mask & flag != 0)
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl Symbols for StringTables {
    fn code_of(&self, name: &str) -> Option<u32> {
        self.symbols.get(name).copied()
    }
}
