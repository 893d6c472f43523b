//! Generates the accessor traits of the class schemas under `schemas/`, the
//! bridge trampolines and the code-to-name lookups into `OUT_DIR`.

use propdispatch_compiler::driver::{self, Target};
use std::env;
use std::path::Path;

/// Class schemas, base classes first
const CLASSES: &[(&str, &str)] = &[
    ("Object", "object"),
    ("Control", "control"),
    ("VolumeControl", "volume_control"),
];

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();

    let out_dir = Path::new(&out_dir);
    let schemas_dir = Path::new(&manifest_dir).join("schemas");
    let shared_dir = Path::new(&manifest_dir).join("..").join("schemas");
    let constants = shared_dir.join("constants.txt");
    let bridge = shared_dir.join("bridge.json");

    println!("cargo:rerun-if-changed={}", schemas_dir.display());
    println!("cargo:rerun-if-changed={}", constants.display());
    println!("cargo:rerun-if-changed={}", bridge.display());

    let symbols = driver::load_symbols(Some(&constants)).expect("Failed to mine constants.txt");

    for (class, module) in CLASSES {
        let input = schemas_dir.join(format!("{}.json", class));
        let output = out_dir.join(format!("{}.rs", module));
        if let Err(e) = driver::run(Target::Accessors, &input, &output, &symbols) {
            panic!("{}: {}", input.display(), e);
        }
    }

    if let Err(e) = driver::run(Target::Bridge, &bridge, &out_dir.join("bridge.rs"), &symbols) {
        panic!("{}: {}", bridge.display(), e);
    }
    if let Err(e) = driver::run(Target::Strings, &constants, &out_dir.join("strings.rs"), &symbols) {
        panic!("{}: {}", constants.display(), e);
    }
}
