//! Generator drivers: read an input file, validate, render, and write the
//! output only once every step has succeeded.

use crate::{
    compiler::{compile_bridge, compile_class, compile_strings},
    error::SchemaError,
    parser::parse_class_list,
    strings::StringTables,
    verifier::verify_hierarchy,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Accessors,
    Bridge,
    Strings,
}

impl Target {
    pub fn name(self) -> &'static str {
        match self {
            Target::Accessors => "accessors",
            Target::Bridge => "bridge",
            Target::Strings => "strings",
        }
    }
}

fn source_name(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

/// Mines the constant corpus at `path`; no corpus resolves no symbols.
pub fn load_symbols(path: Option<&Path>) -> Result<StringTables, SchemaError> {
    match path {
        Some(path) => {
            let corpus = fs::read_to_string(path)?;
            Ok(StringTables::mine(&corpus))
        }
        None => Ok(StringTables::default()),
    }
}

/// Renders the source for `input` without touching the filesystem otherwise.
pub fn generate(target: Target, input: &Path, symbols: &StringTables) -> Result<String, SchemaError> {
    let text = fs::read_to_string(input)?;
    let source = source_name(input);

    tracing::debug!(kind = target.name(), input = %input.display(), "generating");

    match target {
        Target::Accessors => compile_class(&text, symbols, &source),
        Target::Bridge => compile_bridge(&text, &source),
        Target::Strings => Ok(compile_strings(&text, &source)),
    }
}

/// Generates and writes `output`. Nothing is written when generation fails.
pub fn run(target: Target, input: &Path, output: &Path, symbols: &StringTables) -> Result<(), SchemaError> {
    let rust_code = generate(target, input, symbols)?;
    fs::write(output, rust_code)?;
    tracing::info!("{} {} -> {}", target.name(), input.display(), output.display());
    Ok(())
}

/// Validates class documents (each one class or an array of classes) and
/// the hierarchy they form together. Returns the number of classes checked.
pub fn check(inputs: &[PathBuf], symbols: &StringTables) -> Result<usize, SchemaError> {
    let mut classes = Vec::new();
    for input in inputs {
        let text = fs::read_to_string(input)?;
        classes.extend(parse_class_list(&text, symbols)?);
    }
    verify_hierarchy(&classes)?;
    Ok(classes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn input(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn writes_output_on_success() {
        let schema = input(r#"{ "className": "Box", "classIdentityChain": ["abox"] }"#);
        let dir = tempdir().unwrap();
        let output = dir.path().join("box.rs");

        run(Target::Accessors, schema.path(), &output, &StringTables::default()).unwrap();

        let code = fs::read_to_string(&output).unwrap();
        assert!(code.contains("pub trait BoxAccessors"));
    }

    #[test]
    fn no_output_on_unknown_field() {
        let schema = input(r#"{ "className": "Box", "classIdentityChain": ["abox"], "extra": 1 }"#);
        let dir = tempdir().unwrap();
        let output = dir.path().join("box.rs");

        let result = run(Target::Accessors, schema.path(), &output, &StringTables::default());

        assert!(matches!(result, Err(SchemaError::UnknownField { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn symbols_come_from_the_corpus() {
        let corpus = input("kAudioBoxClassID = 'abox',\n");
        let symbols = load_symbols(Some(corpus.path())).unwrap();
        let schema = input(r#"{ "className": "Box", "classIdentityChain": ["kAudioBoxClassID"] }"#);

        let code = generate(Target::Accessors, schema.path(), &symbols).unwrap();
        assert!(code.contains("pub const BOX_CLASS_ID: u32 = 0x61626f78; // kAudioBoxClassID"));
    }

    #[test]
    fn check_spans_documents() {
        let root = input(r#"{ "className": "Root", "classIdentityChain": [1] }"#);
        let leaf = input(r#"{ "className": "Leaf", "baseClassName": "Root", "classIdentityChain": [2, 1] }"#);
        let inputs = vec![root.path().to_path_buf(), leaf.path().to_path_buf()];
        assert_eq!(check(&inputs, &StringTables::default()).unwrap(), 2);

        let orphan = vec![leaf.path().to_path_buf()];
        assert!(matches!(
            check(&orphan, &StringTables::default()),
            Err(SchemaError::UnknownBaseClass { .. })
        ));
    }
}
