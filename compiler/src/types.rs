use propdispatch_schema::{HostType, WireType};
use serde::{Serialize, Serializer};

/// A protocol code (class id, selector, scope) with its symbolic name when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub value: u32,
    pub name:  Option<String>,
}

impl Code {
    pub fn new(value: u32) -> Self {
        Code { value, name: None }
    }

    pub fn named(value: u32, name: &str) -> Self {
        Code { value, name: Some(name.to_string()) }
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.value)
    }
}

/// One object class: its identity, lock, and declared properties.
///
/// Serializes back into the same JSON vocabulary it was validated from,
/// with every code in numeric form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSchema {
    pub class_name:           String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_class_name:      Option<String>,
    pub class_identity_chain: Vec<Code>,
    pub setter_lock_handle:   String,
    #[serde(serialize_with = "properties_as_map")]
    pub properties:           Vec<PropertySchema>,
}

impl ClassSchema {
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
    #[serde(skip)]
    pub name:                String,
    pub selector_code:       Code,
    pub wire_type:           WireType,
    pub host_type:           HostType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_scopes:      Option<Vec<Code>>,
    pub gettable:            bool,
    pub settable:            bool,
    pub user_settable:       bool,
    pub hand_written_setter: bool,
    pub scoped_getter:       bool,
    pub scoped_notification: bool,
    pub asynchronous_setter: bool,
    pub validated:           bool,
    pub is_array:            bool,
    pub truncatable:         bool,
    pub is_converter:        bool,
    pub is_qualified:        bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier_type:      Option<WireType>,
}

impl PropertySchema {
    /// A property with every flag at its default.
    pub fn new(name: &str, selector_code: Code, wire_type: WireType) -> Self {
        PropertySchema {
            name: name.to_string(),
            selector_code,
            wire_type,
            host_type: wire_type.natural_host(),
            allowed_scopes: None,
            gettable: true,
            settable: false,
            user_settable: false,
            hand_written_setter: false,
            scoped_getter: false,
            scoped_notification: false,
            asynchronous_setter: false,
            validated: false,
            is_array: false,
            truncatable: true,
            is_converter: false,
            is_qualified: false,
            qualifier_type: None,
        }
    }

    /// Whether a Set accessor wrapper is generated for this property.
    pub fn has_setter_wrapper(&self) -> bool {
        (self.settable || self.user_settable) && !self.hand_written_setter
    }

    /// Whether `SetPropertyData` routes to this property.
    pub fn is_write_dispatched(&self) -> bool {
        self.settable && !self.hand_written_setter
    }
}

fn properties_as_map<S: Serializer>(
    properties: &[PropertySchema],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(properties.iter().map(|p| (p.name.as_str(), p)))
}

/// One entry point of the bridge table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeEntry {
    #[serde(skip)]
    pub name:              String,
    pub owner_type:        String,
    pub return_type:       String,
    #[serde(serialize_with = "arguments_as_map")]
    pub ordered_arguments: Vec<(String, String)>,
}

impl BridgeEntry {
    /// Status-typed entries translate lookup failures into status codes.
    pub fn returns_status(&self) -> bool {
        self.return_type == "OsStatus"
    }
}

fn arguments_as_map<S: Serializer>(
    arguments: &[(String, String)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(arguments.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BridgeTable {
    pub entries: Vec<BridgeEntry>,
}
