use crate::{
    error::SchemaError,
    strings::Symbols,
    types::{BridgeEntry, BridgeTable, ClassSchema, Code, PropertySchema},
    utils::quote,
};
use propdispatch_schema::{code_to_string, fourcc, HostType, WireType};
use serde_json::{Map, Value as Json};
use std::collections::{HashMap, HashSet};

pub const CLASS_FIELDS: [&str; 5] = [
    "className",
    "baseClassName",
    "classIdentityChain",
    "setterLockHandle",
    "properties",
];

pub const PROPERTY_FIELDS: [&str; 17] = [
    "selectorCode",
    "wireType",
    "hostType",
    "allowedScopes",
    "gettable",
    "settable",
    "userSettable",
    "handWrittenSetter",
    "scopedGetter",
    "scopedNotification",
    "asynchronousSetter",
    "validated",
    "isArray",
    "truncatable",
    "isConverter",
    "isQualified",
    "qualifierType",
];

pub const BRIDGE_FIELDS: [&str; 3] = ["ownerType", "returnType", "orderedArguments"];

/// Field reader bound to one JSON object and a label used in errors.
struct Fields<'a> {
    owner:  String,
    object: &'a Map<String, Json>,
}

impl<'a> Fields<'a> {
    fn open(owner: String, json: &'a Json, vocabulary: &[&str]) -> Result<Self, SchemaError> {
        let object = json.as_object().ok_or_else(|| SchemaError::InvalidField {
            owner:  owner.clone(),
            field:  "<root>".to_string(),
            reason: "expected an object".to_string(),
        })?;

        // Unknown keys are rejected before any defaulting
        for key in object.keys() {
            if !vocabulary.contains(&key.as_str()) {
                return Err(SchemaError::UnknownField { owner, field: key.clone() });
            }
        }

        Ok(Fields { owner, object })
    }

    fn invalid(&self, field: &str, reason: &str) -> SchemaError {
        SchemaError::InvalidField {
            owner:  self.owner.clone(),
            field:  field.to_string(),
            reason: reason.to_string(),
        }
    }

    fn missing(&self, field: &str) -> SchemaError {
        SchemaError::MissingField { owner: self.owner.clone(), field: field.to_string() }
    }

    fn get(&self, field: &str) -> Option<&'a Json> {
        self.object.get(field).filter(|v| !v.is_null())
    }

    fn bool_or(&self, field: &str, default: bool) -> Result<bool, SchemaError> {
        match self.get(field) {
            None => Ok(default),
            Some(v) => v.as_bool().ok_or_else(|| self.invalid(field, "expected a boolean")),
        }
    }

    fn string(&self, field: &str) -> Result<Option<&'a str>, SchemaError> {
        match self.get(field) {
            None => Ok(None),
            Some(v) => v.as_str().map(Some).ok_or_else(|| self.invalid(field, "expected a string")),
        }
    }

    fn required_string(&self, field: &str) -> Result<&'a str, SchemaError> {
        self.string(field)?.ok_or_else(|| self.missing(field))
    }

    fn wire_type(&self, field: &str) -> Result<Option<WireType>, SchemaError> {
        match self.string(field)? {
            None => Ok(None),
            Some(name) => name
                .parse::<WireType>()
                .map(Some)
                .map_err(|_| self.invalid(field, &format!("unknown wire type {}", quote(name)))),
        }
    }

    fn host_type(&self, field: &str) -> Result<Option<HostType>, SchemaError> {
        match self.string(field)? {
            None => Ok(None),
            Some(name) => name
                .parse::<HostType>()
                .map(Some)
                .map_err(|_| self.invalid(field, &format!("unknown host type {}", quote(name)))),
        }
    }

    fn code_list(&self, field: &str, symbols: &dyn Symbols) -> Result<Option<Vec<Code>>, SchemaError> {
        match self.get(field) {
            None => Ok(None),
            Some(Json::Array(items)) => items
                .iter()
                .map(|item| resolve_code(item, symbols).map_err(|e| self.annotate(field, e)))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(self.invalid(field, "expected an array of codes")),
        }
    }

    fn annotate(&self, field: &str, err: SchemaError) -> SchemaError {
        match err {
            SchemaError::InvalidField { reason, .. } => self.invalid(field, &reason),
            other => other,
        }
    }
}

/// Resolves a code written as an integer, a four-char string or a symbolic name.
pub fn resolve_code(json: &Json, symbols: &dyn Symbols) -> Result<Code, SchemaError> {
    match json {
        Json::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Code::new)
            .ok_or_else(|| SchemaError::InvalidField {
                owner:  "code".to_string(),
                field:  n.to_string(),
                reason: "expected an unsigned 32-bit integer".to_string(),
            }),
        Json::String(s) if s.len() == 4 => fourcc(s).map(Code::new).ok_or_else(|| SchemaError::UnresolvedCode(quote(s))),
        Json::String(s) => symbols
            .code_of(s)
            .map(|value| Code::named(value, s))
            .ok_or_else(|| SchemaError::UnresolvedCode(quote(s))),
        other => Err(SchemaError::InvalidField {
            owner:  "code".to_string(),
            field:  other.to_string(),
            reason: "expected an integer or a string".to_string(),
        }),
    }
}

/// Validates one raw property object and applies defaults.
pub fn validate_property(
    name: &str,
    json: &Json,
    symbols: &dyn Symbols,
) -> Result<PropertySchema, SchemaError> {
    let fields = Fields::open(format!("property {}", quote(name)), json, &PROPERTY_FIELDS)?;

    let selector_json = fields.get("selectorCode").ok_or_else(|| fields.missing("selectorCode"))?;
    let selector_code = resolve_code(selector_json, symbols).map_err(|e| fields.annotate("selectorCode", e))?;
    let wire_type = fields.wire_type("wireType")?.ok_or_else(|| fields.missing("wireType"))?;

    let mut property = PropertySchema::new(name, selector_code, wire_type);

    if let Some(host_type) = fields.host_type("hostType")? {
        if !wire_type.carries(host_type) {
            return Err(fields.invalid(
                "hostType",
                &format!("wire type {} cannot carry host type {}", wire_type, host_type),
            ));
        }
        property.host_type = host_type;
    }

    property.allowed_scopes = fields.code_list("allowedScopes", symbols)?;
    property.gettable = fields.bool_or("gettable", true)?;
    property.settable = fields.bool_or("settable", false)?;
    property.user_settable = fields.bool_or("userSettable", false)?;
    property.hand_written_setter = fields.bool_or("handWrittenSetter", false)?;
    property.scoped_getter = fields.bool_or("scopedGetter", false)?;
    property.scoped_notification = fields.bool_or("scopedNotification", false)?;
    property.asynchronous_setter = fields.bool_or("asynchronousSetter", false)?;
    property.validated = fields.bool_or("validated", false)?;
    property.is_array = fields.bool_or("isArray", false)?;
    property.truncatable = fields.bool_or("truncatable", true)?;
    property.is_converter = fields.bool_or("isConverter", false)?;
    property.is_qualified = fields.bool_or("isQualified", false)?;
    property.qualifier_type = fields.wire_type("qualifierType")?;

    let conflicts = [
        (property.is_converter, "isConverter", property.is_qualified, "isQualified"),
        (property.hand_written_setter, "handWrittenSetter", property.asynchronous_setter, "asynchronousSetter"),
        (property.is_array, "isArray", property.is_converter, "isConverter"),
        (property.is_array, "isArray", property.is_qualified, "isQualified"),
    ];
    for (a, first, b, second) in conflicts {
        if a && b {
            return Err(SchemaError::ConflictingFlags { property: name.to_string(), first, second });
        }
    }

    match (property.is_qualified, property.qualifier_type) {
        (true, None) => return Err(fields.missing("qualifierType")),
        (false, Some(_)) => return Err(fields.invalid("qualifierType", "only meaningful with isQualified")),
        _ => {}
    }

    Ok(property)
}

/// Validates one raw class object, its properties, and applies defaults.
pub fn validate_class(json: &Json, symbols: &dyn Symbols) -> Result<ClassSchema, SchemaError> {
    let label = json
        .get("className")
        .and_then(Json::as_str)
        .map(|name| format!("class {}", quote(name)))
        .unwrap_or_else(|| "class".to_string());
    let fields = Fields::open(label, json, &CLASS_FIELDS)?;

    let class_name = fields.required_string("className")?.to_string();
    let base_class_name = fields.string("baseClassName")?.map(str::to_string);
    let class_identity_chain = fields
        .code_list("classIdentityChain", symbols)?
        .ok_or_else(|| fields.missing("classIdentityChain"))?;
    if class_identity_chain.is_empty() {
        return Err(SchemaError::EmptyIdentityChain(class_name));
    }
    let setter_lock_handle = fields
        .string("setterLockHandle")?
        .map(str::to_string)
        .unwrap_or_else(|| class_name.clone());

    let mut properties = Vec::new();
    match fields.get("properties") {
        None => {}
        Some(Json::Object(map)) => {
            for (name, raw) in map {
                properties.push(validate_property(name, raw, symbols)?);
            }
        }
        Some(_) => return Err(fields.invalid("properties", "expected an object")),
    }

    // Gettable selectors must be unique: they key the read dispatch
    let mut seen: HashMap<u32, &str> = HashMap::new();
    for property in properties.iter().filter(|p| p.gettable) {
        if let Some(first) = seen.insert(property.selector_code.value, &property.name) {
            return Err(SchemaError::DuplicateSelector {
                class:    class_name,
                selector: code_to_string(property.selector_code.value),
                first:    first.to_string(),
                second:   property.name.clone(),
            });
        }
    }

    tracing::debug!(class = %class_name, properties = properties.len(), "validated class");

    Ok(ClassSchema {
        class_name,
        base_class_name,
        class_identity_chain,
        setter_lock_handle,
        properties,
    })
}

/// Validates a bridge table object keyed by entry-point name.
pub fn validate_bridge(json: &Json) -> Result<BridgeTable, SchemaError> {
    let table = json.as_object().ok_or_else(|| SchemaError::InvalidField {
        owner:  "bridge table".to_string(),
        field:  "<root>".to_string(),
        reason: "expected an object".to_string(),
    })?;

    let mut entries = Vec::with_capacity(table.len());
    for (name, raw) in table {
        let fields = Fields::open(format!("bridge entry {}", quote(name)), raw, &BRIDGE_FIELDS)?;

        let owner_type = fields.required_string("ownerType")?.to_string();
        let return_type = fields.required_string("returnType")?.to_string();

        let mut ordered_arguments = Vec::new();
        match fields.get("orderedArguments") {
            None => return Err(fields.missing("orderedArguments")),
            Some(Json::Object(args)) => {
                for (arg, ty) in args {
                    let ty = ty
                        .as_str()
                        .ok_or_else(|| fields.invalid("orderedArguments", "argument types must be strings"))?;
                    ordered_arguments.push((arg.clone(), ty.to_string()));
                }
            }
            Some(_) => return Err(fields.invalid("orderedArguments", "expected an object")),
        }

        // Driver handle and object id come first
        if ordered_arguments.len() < 2 {
            return Err(fields.invalid(
                "orderedArguments",
                "expected at least a driver handle and an object id",
            ));
        }

        entries.push(BridgeEntry { name: name.clone(), owner_type, return_type, ordered_arguments });
    }

    Ok(BridgeTable { entries })
}

/// Checks that a set of classes forms a forest: unique names, known bases, no cycles.
pub fn verify_hierarchy(classes: &[ClassSchema]) -> Result<(), SchemaError> {
    let mut by_name: HashMap<&str, &ClassSchema> = HashMap::new();

    // 1) Check duplicate class names
    for class in classes {
        if by_name.insert(&class.class_name, class).is_some() {
            return Err(SchemaError::DuplicateClass(class.class_name.clone()));
        }
    }

    // 2) Check base references
    for class in classes {
        if let Some(ref base) = class.base_class_name {
            if !by_name.contains_key(base.as_str()) {
                return Err(SchemaError::UnknownBaseClass {
                    class: class.class_name.clone(),
                    base:  base.clone(),
                });
            }
        }
    }

    // 3) Walk every chain to its root
    for class in classes {
        let mut visited = HashSet::new();
        let mut current = Some(class);
        while let Some(c) = current {
            if !visited.insert(c.class_name.as_str()) {
                return Err(SchemaError::CyclicHierarchy(class.class_name.clone()));
            }
            current = c.base_class_name.as_deref().and_then(|b| by_name.get(b).copied());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::NoSymbols;
    use serde_json::json;

    fn class(json: Json) -> Result<ClassSchema, SchemaError> {
        validate_class(&json, &NoSymbols)
    }

    #[test]
    fn defaults_apply_to_omitted_fields() {
        let schema = class(json!({
            "className": "Volume",
            "classIdentityChain": ["vlme", "levl", "actl"],
            "properties": { "Scalar": { "selectorCode": "lcsv", "wireType": "Float32" } }
        }))
        .unwrap();

        assert_eq!(schema.setter_lock_handle, "Volume");
        assert_eq!(schema.base_class_name, None);
        let p = &schema.properties[0];
        assert!(p.gettable && p.truncatable);
        assert!(!p.settable && !p.user_settable && !p.is_array && !p.validated);
        assert_eq!(p.host_type, HostType::F32);
        assert_eq!(p.allowed_scopes, None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = class(json!({ "className": "A", "classIdentityChain": [1], "colour": 1 })).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField { ref field, .. } if field == "colour"));

        let err = class(json!({
            "className": "A",
            "classIdentityChain": [1],
            "properties": { "P": { "selectorCode": 1, "wireType": "UInt32", "gettabel": true } }
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField { ref field, .. } if field == "gettabel"));
    }

    #[test]
    fn declaration_order_is_kept() {
        let schema = class(json!({
            "className": "A",
            "classIdentityChain": [1],
            "properties": {
                "Zeta":  { "selectorCode": 3, "wireType": "UInt32" },
                "Alpha": { "selectorCode": 1, "wireType": "UInt32" },
                "Mid":   { "selectorCode": 2, "wireType": "UInt32" }
            }
        }))
        .unwrap();

        let names: Vec<_> = schema.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn required_fields() {
        assert!(matches!(
            class(json!({ "classIdentityChain": [1] })),
            Err(SchemaError::MissingField { ref field, .. }) if field == "className"
        ));
        assert!(matches!(
            class(json!({ "className": "A", "classIdentityChain": [] })),
            Err(SchemaError::EmptyIdentityChain(_))
        ));
        assert!(matches!(
            validate_property("P", &json!({ "wireType": "UInt32" }), &NoSymbols),
            Err(SchemaError::MissingField { ref field, .. }) if field == "selectorCode"
        ));
    }

    #[test]
    fn conflicting_flags() {
        let cases = [
            json!({ "selectorCode": 1, "wireType": "UInt32", "isConverter": true, "isQualified": true, "qualifierType": "UInt32" }),
            json!({ "selectorCode": 1, "wireType": "UInt32", "handWrittenSetter": true, "asynchronousSetter": true }),
            json!({ "selectorCode": 1, "wireType": "UInt32", "isArray": true, "isConverter": true }),
            json!({ "selectorCode": 1, "wireType": "UInt32", "isArray": true, "isQualified": true, "qualifierType": "UInt32" }),
        ];
        for case in cases {
            assert!(matches!(
                validate_property("P", &case, &NoSymbols),
                Err(SchemaError::ConflictingFlags { .. })
            ));
        }
    }

    #[test]
    fn qualifier_type_goes_with_is_qualified() {
        assert!(matches!(
            validate_property("P", &json!({ "selectorCode": 1, "wireType": "UInt32", "isQualified": true }), &NoSymbols),
            Err(SchemaError::MissingField { ref field, .. }) if field == "qualifierType"
        ));
        assert!(matches!(
            validate_property("P", &json!({ "selectorCode": 1, "wireType": "UInt32", "qualifierType": "UInt32" }), &NoSymbols),
            Err(SchemaError::InvalidField { ref field, .. }) if field == "qualifierType"
        ));
    }

    #[test]
    fn range_wire_needs_range_host() {
        let err = validate_property(
            "P",
            &json!({ "selectorCode": 1, "wireType": "AudioValueRange", "hostType": "f64" }),
            &NoSymbols,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidField { ref field, .. } if field == "hostType"));
    }

    #[test]
    fn codes() {
        assert_eq!(resolve_code(&json!(42), &NoSymbols).unwrap().value, 42);
        assert_eq!(resolve_code(&json!("uid "), &NoSymbols).unwrap().value, 0x7569_6420);
        assert!(matches!(
            resolve_code(&json!("kAudioObjectPropertyName"), &NoSymbols),
            Err(SchemaError::UnresolvedCode(_))
        ));
        assert!(resolve_code(&json!(-1), &NoSymbols).is_err());
    }

    #[test]
    fn duplicate_gettable_selectors() {
        let err = class(json!({
            "className": "A",
            "classIdentityChain": [1],
            "properties": {
                "First":  { "selectorCode": "dupe", "wireType": "UInt32" },
                "Second": { "selectorCode": "dupe", "wireType": "UInt32" }
            }
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateSelector { ref first, ref second, .. } if first == "First" && second == "Second"));

        // write-only duplicates do not collide
        assert!(class(json!({
            "className": "A",
            "classIdentityChain": [1],
            "properties": {
                "First":  { "selectorCode": "dupe", "wireType": "UInt32" },
                "Second": { "selectorCode": "dupe", "wireType": "UInt32", "gettable": false, "settable": true }
            }
        }))
        .is_ok());
    }

    #[test]
    fn bridge_entries_need_handle_and_object() {
        let table = validate_bridge(&json!({
            "GetVolume": {
                "ownerType": "Volume",
                "returnType": "f32",
                "orderedArguments": { "driver": "DriverRef", "objectID": "ObjectId" }
            }
        }))
        .unwrap();
        assert_eq!(table.entries[0].ordered_arguments[1].0, "objectID");

        let err = validate_bridge(&json!({
            "Broken": { "ownerType": "X", "returnType": "OsStatus", "orderedArguments": { "driver": "DriverRef" } }
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidField { ref field, .. } if field == "orderedArguments"));
    }

    fn named(name: &str, base: Option<&str>) -> ClassSchema {
        ClassSchema {
            class_name:           name.to_string(),
            base_class_name:      base.map(str::to_string),
            class_identity_chain: vec![Code::new(1)],
            setter_lock_handle:   name.to_string(),
            properties:           vec![],
        }
    }

    #[test]
    fn hierarchy_checks() {
        assert!(verify_hierarchy(&[named("Root", None), named("Leaf", Some("Root"))]).is_ok());
        assert!(matches!(
            verify_hierarchy(&[named("Root", None), named("Root", None)]),
            Err(SchemaError::DuplicateClass(_))
        ));
        assert!(matches!(
            verify_hierarchy(&[named("Leaf", Some("Missing"))]),
            Err(SchemaError::UnknownBaseClass { .. })
        ));
        assert!(matches!(
            verify_hierarchy(&[named("A", Some("B")), named("B", Some("A"))]),
            Err(SchemaError::CyclicHierarchy(_))
        ));
    }
}
