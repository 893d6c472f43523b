//! propdispatch-compiler
//!
//! This crate implements:
//!  1) The schema model: JSON class and bridge documents validated against a
//!     fixed field vocabulary,
//!  2) A hierarchy verifier (duplicate classes, unknown bases, cycles),
//!  3) The selector registry that mines code-to-name tables from a constant corpus,
//!  4) Code generation for typed accessors, bridge trampolines and string tables,
//!  5) Generator drivers that write output only after a clean run.

pub mod error;
pub mod types;
pub mod utils;
pub mod strings;
pub mod verifier;
pub mod parser;
pub mod gen_accessors;
pub mod gen_bridge;
pub mod gen_strings;
pub mod compiler;
pub mod driver;

pub use compiler::{compile_bridge, compile_class, compile_strings};
pub use error::SchemaError;
pub use parser::{parse_bridge, parse_class, parse_class_list, parse_classes};
pub use strings::{CodeKind, NoSymbols, StringTables, Symbols};
pub use types::{BridgeEntry, BridgeTable, ClassSchema, Code, PropertySchema};
