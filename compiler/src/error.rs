use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown {owner} field \"{field}\"")]
    UnknownField {
        owner: String,
        field: String,
    },

    #[error("missing required {owner} field \"{field}\"")]
    MissingField {
        owner: String,
        field: String,
    },

    #[error("invalid {owner} field \"{field}\": {reason}")]
    InvalidField {
        owner:  String,
        field:  String,
        reason: String,
    },

    #[error("cannot resolve code {0}")]
    UnresolvedCode(String),

    #[error("property \"{property}\" cannot be both {first} and {second}")]
    ConflictingFlags {
        property: String,
        first:    &'static str,
        second:   &'static str,
    },

    #[error("class \"{class}\" declares selector {selector} twice (\"{first}\" and \"{second}\")")]
    DuplicateSelector {
        class:    String,
        selector: String,
        first:    String,
        second:   String,
    },

    #[error("class \"{0}\" has an empty identity chain")]
    EmptyIdentityChain(String),

    #[error("class \"{0}\" is defined twice")]
    DuplicateClass(String),

    #[error("class \"{class}\" names unknown base class \"{base}\"")]
    UnknownBaseClass {
        class: String,
        base:  String,
    },

    #[error("class hierarchy through \"{0}\" is cyclic")]
    CyclicHierarchy(String),

    #[error("unknown class \"{0}\"")]
    UnknownClass(String),
}
