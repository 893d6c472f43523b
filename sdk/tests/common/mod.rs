#![allow(dead_code)]

use parking_lot::Mutex;
use propdispatch::compiler::{parse_classes, NoSymbols};
use propdispatch::*;
use std::collections::HashMap;
use std::sync::Arc;

pub const CLASSES: &str = r#"[
    {
        "className": "Root",
        "classIdentityChain": ["root"],
        "properties": {
            "Name":  { "selectorCode": "lnam", "wireType": "UInt32" },
            "Owned": { "selectorCode": "ownd", "wireType": "UInt32", "isArray": true },
            "Fixed": { "selectorCode": "fixd", "wireType": "UInt32", "isArray": true, "truncatable": false }
        }
    },
    {
        "className": "Mid",
        "baseClassName": "Root",
        "classIdentityChain": ["mid ", "root"],
        "properties": {
            "Scalar":    { "selectorCode": "lcsv", "wireType": "Float32", "settable": true, "validated": true,
                           "allowedScopes": ["outp"] },
            "Decibels":  { "selectorCode": "lcsd", "wireType": "Float32", "isConverter": true },
            "Translate": { "selectorCode": "trns", "wireType": "UInt32", "isQualified": true, "qualifierType": "Float32" }
        }
    },
    {
        "className": "Leaf",
        "baseClassName": "Mid",
        "classIdentityChain": ["leaf", "mid ", "root"],
        "setterLockHandle": "Mid",
        "properties": {
            "Rate":     { "selectorCode": "nsrt", "wireType": "Float64", "settable": true,
                          "asynchronousSetter": true, "validated": true },
            "Mute":     { "selectorCode": "mute", "wireType": "UInt32", "hostType": "bool", "settable": true,
                          "scopedNotification": true },
            "Channels": { "selectorCode": "chnl", "wireType": "UInt32", "isArray": true, "settable": true,
                          "scopedGetter": true },
            "Custom":   { "selectorCode": "cust", "wireType": "UInt32", "settable": true, "handWrittenSetter": true }
        }
    }
]"#;

pub fn code(text: &str) -> u32 {
    propdispatch::schema::fourcc(text).unwrap()
}

pub fn classes() -> Arc<ClassTable> {
    Arc::new(ClassTable::build(parse_classes(CLASSES, &NoSymbols).unwrap()).unwrap())
}

/// Property storage keyed by property name, with switchable hook failures.
#[derive(Default)]
pub struct MapHost {
    values:     Mutex<HashMap<String, Value>>,
    pub sets:   Mutex<Vec<(String, Value)>>,
    pub reject: Mutex<Option<OsStatus>>,
    pub fail:   Mutex<Option<OsStatus>>,
}

impl MapHost {
    pub fn new() -> Arc<MapHost> {
        Arc::new(MapHost::default())
    }

    pub fn put(&self, name: &str, value: impl Into<Value>) {
        self.values.lock().insert(name.to_string(), value.into());
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        self.values.lock().get(name).cloned()
    }

    pub fn set_count(&self) -> usize {
        self.sets.lock().len()
    }
}

impl PropertyHost for MapHost {
    fn get(&self, key: &PropertyKey, read: Read) -> Result<Value, OsStatus> {
        let values = self.values.lock();
        match read {
            // Qualified reads derive their value from the qualifier
            Read::Qualified(qualifier) => {
                let qualifier = f32::from_value(&qualifier).map_err(|_| UNSPECIFIED_ERROR)?;
                Ok(Value::U32((qualifier * 10.0) as u32))
            }
            Read::Scoped(scope) => values
                .get(&format!("{}@{:x}", key.property, scope))
                .or_else(|| values.get(key.property))
                .cloned()
                .ok_or(UNKNOWN_PROPERTY_ERROR),
            Read::Plain => values.get(key.property).cloned().ok_or(UNKNOWN_PROPERTY_ERROR),
        }
    }

    fn convert(&self, _key: &PropertyKey, input: Value) -> Result<Value, OsStatus> {
        let input = f32::from_value(&input).map_err(|_| UNSPECIFIED_ERROR)?;
        Ok(Value::F32(input * 2.0))
    }

    fn check(&self, _key: &PropertyKey, _value: &Value) -> Result<(), OsStatus> {
        match *self.reject.lock() {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }

    fn set(&self, key: &PropertyKey, value: Value) -> Result<(), OsStatus> {
        if let Some(status) = *self.fail.lock() {
            return Err(status);
        }
        self.values.lock().insert(key.property.to_string(), value.clone());
        self.sets.lock().push((key.property.to_string(), value));
        Ok(())
    }
}

/// Flattens tracer calls into strings: `begin <op>`, `message <text>`, `end <op> <status>`.
#[derive(Default)]
pub struct RecordingTracer {
    events: Mutex<Vec<String>>,
}

impl RecordingTracer {
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn contains(&self, event: &str) -> bool {
        self.events.lock().iter().any(|e| e == event)
    }
}

impl Tracer for RecordingTracer {
    fn operation_begin(&self, operation: &Operation) {
        self.events.lock().push(format!("begin {}", operation.name));
    }

    fn message(&self, message: &str) {
        self.events.lock().push(format!("message {}", message));
    }

    fn operation_end(&self, operation: &Operation, status: OsStatus) {
        self.events.lock().push(format!("end {} {}", operation.name, status));
    }
}

pub struct Fixture {
    pub context:  Arc<Context>,
    pub host:     Arc<MapHost>,
    pub tracer:   Arc<RecordingTracer>,
    pub notifier: Arc<CollectingNotifier>,
    pub queue:    Arc<TaskQueue>,
    pub object:   PropertyObject,
}

pub const ELEMENT: u32 = 3;

pub fn fixture() -> Fixture {
    fixture_with(|builder| builder)
}

/// Leaf object in the output scope on element 3, with every property populated.
pub fn fixture_with(configure: impl FnOnce(ObjectBuilder) -> ObjectBuilder) -> Fixture {
    let tracer = Arc::new(RecordingTracer::default());
    let notifier = Arc::new(CollectingNotifier::new());
    let queue = Arc::new(TaskQueue::new());
    let context = Context::builder()
        .tracer(tracer.clone())
        .notifier(notifier.clone())
        .scheduler(queue.clone())
        .build();

    let host = MapHost::new();
    host.put("Name", 7u32);
    host.put("Owned", vec![1u32, 2, 3, 4, 5]);
    host.put("Fixed", vec![1u32, 2, 3, 4, 5]);
    host.put("Scalar", 0.5f32);
    host.put("Rate", 44100.0f64);
    host.put("Mute", false);
    host.put("Channels", vec![1u32, 2]);
    host.put("Custom", 9u32);

    let builder = ObjectBuilder::new(context.clone(), classes(), "Leaf", host.clone())
        .scope(SCOPE_OUTPUT)
        .element(ELEMENT);
    let object = configure(builder).build().unwrap();

    Fixture { context, host, tracer, notifier, queue, object }
}

pub fn address(selector: &str) -> PropertyAddress {
    PropertyAddress::new(code(selector), SCOPE_OUTPUT, ELEMENT_MAIN)
}

pub fn u32s(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
