//! Runtime property objects.
//!
//! A [PropertyObject] answers the five boundary queries by walking its class
//! chain from the leaf class to the root. The first class whose own table
//! claims the selector is authoritative; if none does, the object's
//! [Fallback] answers. Every visited class level is traced as a nested
//! operation.

use crate::{
    address::{ObjectId, Pid, PropertyAddress, ELEMENT_MAIN, SCOPE_GLOBAL},
    context::Context,
    dispatcher::Object,
    fallback::{Fallback, Request},
    host::{PropertyHost, PropertyKey, Read},
    status::{status_of, DispatchError, OsStatus, SizeMismatch, NO_ERROR},
    table::{ClassTable, DispatchTable, PropertyEntry, ReadPlan, WritePlan},
    tracer::Operation,
};
use parking_lot::ReentrantMutex;
use propdispatch_compiler::SchemaError;
use propdispatch_schema::{CodecError, Value};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type SetterLock = Arc<ReentrantMutex<()>>;

/// One object instance dispatching through a compiled class chain.
#[derive(Clone)]
pub struct PropertyObject {
    shared: Arc<Shared>,
}

struct Shared {
    id:       ObjectId,
    scope:    u32,
    element:  u32,
    context:  Arc<Context>,
    classes:  Arc<ClassTable>,
    /// Class indexes, leaf first; `hosts` and `locks` are aligned with it.
    chain:    Vec<usize>,
    hosts:    Vec<Arc<dyn PropertyHost>>,
    locks:    Vec<SetterLock>,
    fallback: Arc<dyn Fallback>,
}

pub struct ObjectBuilder {
    context:    Arc<Context>,
    classes:    Arc<ClassTable>,
    class_name: String,
    host:       Arc<dyn PropertyHost>,
    overrides:  HashMap<String, Arc<dyn PropertyHost>>,
    fallback:   Option<Arc<dyn Fallback>>,
    id:         Option<ObjectId>,
    scope:      u32,
    element:    u32,
}

impl ObjectBuilder {
    /// `host` serves every class level without an override.
    pub fn new(
        context: Arc<Context>,
        classes: Arc<ClassTable>,
        class_name: &str,
        host: Arc<dyn PropertyHost>,
    ) -> Self {
        ObjectBuilder {
            context,
            classes,
            class_name: class_name.to_string(),
            host,
            overrides: HashMap::new(),
            fallback: None,
            id: None,
            scope: SCOPE_GLOBAL,
            element: ELEMENT_MAIN,
        }
    }

    /// Fixed object id; otherwise one is allocated from the dispatcher.
    pub fn id(mut self, id: ObjectId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn scope(mut self, scope: u32) -> Self {
        self.scope = scope;
        self
    }

    pub fn element(mut self, element: u32) -> Self {
        self.element = element;
        self
    }

    /// Serve the properties declared by `class_name` from `host`.
    pub fn class_host(mut self, class_name: &str, host: Arc<dyn PropertyHost>) -> Self {
        self.overrides.insert(class_name.to_string(), host);
        self
    }

    pub fn fallback(mut self, fallback: Arc<dyn Fallback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn build(self) -> Result<PropertyObject, SchemaError> {
        let classes = self.classes;

        let leaf = classes
            .index_of(&self.class_name)
            .ok_or_else(|| SchemaError::UnknownClass(self.class_name.clone()))?;
        let chain = classes.chain(leaf);

        for name in self.overrides.keys() {
            let in_chain = chain.iter().any(|&i| classes.at(i).class_name() == name);
            if !in_chain {
                return Err(SchemaError::UnknownClass(name.clone()));
            }
        }

        // One lock per distinct handle, shared by the classes naming it
        let mut by_handle: HashMap<&str, SetterLock> = HashMap::new();
        let locks = chain
            .iter()
            .map(|&i| {
                by_handle
                    .entry(classes.at(i).lock_handle())
                    .or_insert_with(|| Arc::new(ReentrantMutex::new(())))
                    .clone()
            })
            .collect();

        let hosts = chain
            .iter()
            .map(|&i| {
                self.overrides
                    .get(classes.at(i).class_name())
                    .cloned()
                    .unwrap_or_else(|| self.host.clone())
            })
            .collect();

        let id = self.id.unwrap_or_else(|| self.context.dispatcher.allocate_id());
        let fallback = self.fallback.unwrap_or_else(|| self.context.fallback.clone());

        tracing::debug!(object_id = id, class = %self.class_name, depth = chain.len(), "built property object");

        Ok(PropertyObject {
            shared: Arc::new(Shared {
                id,
                scope: self.scope,
                element: self.element,
                context: self.context,
                classes: classes.clone(),
                chain,
                hosts,
                locks,
                fallback,
            }),
        })
    }
}

/// One boundary operation, as seen at each class level.
trait Step {
    type Output;

    const METHOD: &'static str;

    /// `None` passes the query on to the base class.
    fn at_class(
        &mut self,
        object: &Arc<Shared>,
        depth: usize,
        table: &DispatchTable,
        address: &PropertyAddress,
    ) -> Option<Self::Output>;

    fn at_fallback(&mut self, object: &Shared, request: &Request) -> Self::Output;

    fn on_null_address(&self) -> Self::Output;

    fn status(output: &Self::Output) -> OsStatus;
}

struct HasProperty;

impl Step for HasProperty {
    type Output = bool;

    const METHOD: &'static str = "HasProperty";

    fn at_class(
        &mut self,
        object: &Arc<Shared>,
        _depth: usize,
        table: &DispatchTable,
        address: &PropertyAddress,
    ) -> Option<bool> {
        let entry = table.readable(address.selector)?;

        if let Some(ref scopes) = entry.schema.allowed_scopes {
            if !scopes.iter().any(|scope| scope.value == address.scope) {
                object.note(format_args!("returning HasProperty=false (disallowed scope)"));
                return Some(false);
            }
        }

        object.note(format_args!("returning HasProperty=true"));
        Some(true)
    }

    fn at_fallback(&mut self, object: &Shared, request: &Request) -> bool {
        object.fallback.has_property(request)
    }

    fn on_null_address(&self) -> bool {
        false
    }

    fn status(_output: &bool) -> OsStatus {
        NO_ERROR
    }
}

struct IsPropertySettable<'a> {
    out: Option<&'a mut bool>,
}

impl Step for IsPropertySettable<'_> {
    type Output = Result<(), DispatchError>;

    const METHOD: &'static str = "IsPropertySettable";

    fn at_class(
        &mut self,
        object: &Arc<Shared>,
        _depth: usize,
        table: &DispatchTable,
        address: &PropertyAddress,
    ) -> Option<Self::Output> {
        let entry = table.readable(address.selector)?;

        match self.out.as_deref_mut() {
            Some(out) => {
                *out = entry.schema.settable;
                object.note(format_args!("returning IsSettable={}", entry.schema.settable));
            }
            None => object.note(format_args!("output buffer is null")),
        }
        Some(Ok(()))
    }

    fn at_fallback(&mut self, object: &Shared, request: &Request) -> Self::Output {
        object.fallback.is_property_settable(request, self.out.as_deref_mut())
    }

    fn on_null_address(&self) -> Self::Output {
        Err(DispatchError::NullAddress)
    }

    fn status(output: &Self::Output) -> OsStatus {
        status_of(output)
    }
}

struct GetPropertyDataSize<'a> {
    out_size: Option<&'a mut usize>,
}

impl Step for GetPropertyDataSize<'_> {
    type Output = Result<(), DispatchError>;

    const METHOD: &'static str = "GetPropertyDataSize";

    fn at_class(
        &mut self,
        object: &Arc<Shared>,
        depth: usize,
        table: &DispatchTable,
        address: &PropertyAddress,
    ) -> Option<Self::Output> {
        let entry = table.readable(address.selector)?;
        Some(object.data_size(depth, table, entry, address, self.out_size.as_deref_mut()))
    }

    fn at_fallback(&mut self, object: &Shared, request: &Request) -> Self::Output {
        object.fallback.get_property_data_size(request, self.out_size.as_deref_mut())
    }

    fn on_null_address(&self) -> Self::Output {
        Err(DispatchError::NullAddress)
    }

    fn status(output: &Self::Output) -> OsStatus {
        status_of(output)
    }
}

struct GetPropertyData<'a> {
    qualifier: Option<&'a [u8]>,
    in_size:   usize,
    out_size:  Option<&'a mut usize>,
    out:       Option<&'a mut [u8]>,
}

impl Step for GetPropertyData<'_> {
    type Output = Result<(), DispatchError>;

    const METHOD: &'static str = "GetPropertyData";

    fn at_class(
        &mut self,
        object: &Arc<Shared>,
        depth: usize,
        table: &DispatchTable,
        address: &PropertyAddress,
    ) -> Option<Self::Output> {
        let entry = table.readable(address.selector)?;
        Some(object.read_data(
            depth,
            table,
            entry,
            address,
            self.qualifier,
            self.in_size,
            self.out_size.as_deref_mut(),
            self.out.as_deref_mut(),
        ))
    }

    fn at_fallback(&mut self, object: &Shared, request: &Request) -> Self::Output {
        object.fallback.get_property_data(
            request,
            self.in_size,
            self.out_size.as_deref_mut(),
            self.out.as_deref_mut(),
        )
    }

    fn on_null_address(&self) -> Self::Output {
        Err(DispatchError::NullAddress)
    }

    fn status(output: &Self::Output) -> OsStatus {
        status_of(output)
    }
}

struct SetPropertyData<'a> {
    in_size: usize,
    data:    Option<&'a [u8]>,
}

impl Step for SetPropertyData<'_> {
    type Output = Result<(), DispatchError>;

    const METHOD: &'static str = "SetPropertyData";

    fn at_class(
        &mut self,
        object: &Arc<Shared>,
        depth: usize,
        table: &DispatchTable,
        address: &PropertyAddress,
    ) -> Option<Self::Output> {
        let entry = table.writable(address.selector)?;
        Some(object.write_data(depth, table, entry, self.in_size, self.data))
    }

    fn at_fallback(&mut self, object: &Shared, request: &Request) -> Self::Output {
        object.fallback.set_property_data(request, self.in_size, self.data)
    }

    fn on_null_address(&self) -> Self::Output {
        Err(DispatchError::NullAddress)
    }

    fn status(output: &Self::Output) -> OsStatus {
        status_of(output)
    }
}

fn array_elements(value: &Value) -> Result<&[Value], CodecError> {
    value.as_array().ok_or_else(|| CodecError::UnexpectedValue {
        expected: "Array",
        found:    value.to_string(),
    })
}

/// Checks a value handed to a setter wrapper has the property's host type.
fn check_shape(entry: &PropertyEntry, value: &Value) -> Result<(), CodecError> {
    let expected = entry.schema.host_type;
    let elements = if entry.schema.is_array {
        array_elements(value)?
    } else {
        std::slice::from_ref(value)
    };

    match elements.iter().find(|v| v.host_type() != Some(expected)) {
        Some(bad) => Err(CodecError::UnexpectedValue { expected: expected.name(), found: bad.to_string() }),
        None => Ok(()),
    }
}

fn render(values: &[Value]) -> String {
    Value::Array(values.to_vec()).to_string()
}

impl Shared {
    fn table(&self, depth: usize) -> &DispatchTable {
        self.classes.at(self.chain[depth])
    }

    fn host(&self, depth: usize) -> &dyn PropertyHost {
        self.hosts[depth].as_ref()
    }

    fn note(&self, args: fmt::Arguments) {
        self.context.tracer.message(&args.to_string())
    }

    fn key<'a>(table: &'a DispatchTable, entry: &'a PropertyEntry) -> PropertyKey<'a> {
        PropertyKey {
            class:    table.class_name(),
            property: entry.name(),
            selector: entry.selector(),
        }
    }

    /// Getter argument for a query at `address`.
    fn read_at(entry: &PropertyEntry, address: &PropertyAddress) -> Read {
        match entry.read {
            ReadPlan::Scoped => Read::Scoped(address.scope),
            _ => Read::Plain,
        }
    }

    /// Getter argument for accessor wrappers, which use the object's own scope.
    fn own_read(&self, entry: &PropertyEntry) -> Read {
        match entry.read {
            ReadPlan::Scoped => Read::Scoped(self.scope),
            _ => Read::Plain,
        }
    }

    fn route<S: Step>(
        self: &Arc<Self>,
        step: &mut S,
        object_id: ObjectId,
        client_pid: Pid,
        address: Option<&PropertyAddress>,
        qualifier: Option<&[u8]>,
        in_size: Option<usize>,
    ) -> S::Output {
        let tracer = self.context.tracer.as_ref();
        let template = Operation {
            name: String::new(),
            object_id: Some(object_id),
            client_pid: Some(client_pid),
            address: address.copied(),
            qualifier_size: qualifier.map(<[u8]>::len),
            in_size,
        };

        let mut open: Vec<Operation> = Vec::with_capacity(self.chain.len());
        let mut output = None;

        for depth in 0..self.chain.len() {
            let table = self.table(depth);
            let op = Operation {
                name: format!("{}::{}()", table.class_name(), S::METHOD),
                ..template.clone()
            };
            tracer.operation_begin(&op);
            open.push(op);

            let address = match address {
                Some(address) => address,
                None => {
                    tracer.message("address is null");
                    output = Some(step.on_null_address());
                    break;
                }
            };

            if object_id == self.id {
                if let Some(found) = step.at_class(self, depth, table, address) {
                    output = Some(found);
                    break;
                }
            }
        }

        let output = match (output, address) {
            (Some(output), _) => output,
            (None, Some(address)) => {
                let request = Request {
                    owner: self.id,
                    object_id,
                    client_pid,
                    address,
                    qualifier,
                    tracer,
                };
                step.at_fallback(self, &request)
            }
            (None, None) => step.on_null_address(),
        };

        let status = S::status(&output);
        for op in open.iter().rev() {
            tracer.operation_end(op, status);
        }
        output
    }

    fn data_size(
        &self,
        depth: usize,
        table: &DispatchTable,
        entry: &PropertyEntry,
        address: &PropertyAddress,
        out_size: Option<&mut usize>,
    ) -> Result<(), DispatchError> {
        let out_size = match out_size {
            Some(out_size) => out_size,
            None => {
                self.note(format_args!("output buffer is null"));
                return Ok(());
            }
        };

        let element = entry.schema.wire_type.size();
        let size = if entry.schema.is_array {
            let values = self
                .host(depth)
                .get(&Self::key(table, entry), Self::read_at(entry, address))
                .map_err(DispatchError::GetterFailed)?;
            array_elements(&values)?.len() * element
        } else {
            element
        };

        *out_size = size;
        self.note(format_args!("returning PropertySize={}", size));
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn read_data(
        &self,
        depth: usize,
        table: &DispatchTable,
        entry: &PropertyEntry,
        address: &PropertyAddress,
        qualifier: Option<&[u8]>,
        in_size: usize,
        out_size: Option<&mut usize>,
        out: Option<&mut [u8]>,
    ) -> Result<(), DispatchError> {
        let schema = &entry.schema;
        let wire = schema.wire_type;
        let element = wire.size();
        let key = Self::key(table, entry);
        let host = self.host(depth);
        let codec = self.context.codec.as_ref();

        if schema.is_array {
            let values = host.get(&key, Self::read_at(entry, address)).map_err(DispatchError::GetterFailed)?;
            let values = array_elements(&values)?;

            // A data buffer shorter than in_size caps what fits
            let avail = out.as_deref().map_or(in_size, |out| in_size.min(out.len()));
            let count = if schema.truncatable {
                (avail / element).min(values.len())
            } else {
                let need = values.len() * element;
                if avail < need {
                    self.note(format_args!("not enough space: need {}, avail {}", need, avail));
                    return Err(SizeMismatch::TooSmall { need, have: avail }.into());
                }
                values.len()
            };

            match out_size {
                Some(out_size) => *out_size = count * element,
                None => self.note(format_args!("size buffer is null")),
            }

            match out {
                Some(out) => {
                    for (i, value) in values[..count].iter().enumerate() {
                        let slot = out
                            .get_mut(i * element..)
                            .ok_or(CodecError::BufferTooSmall { need: (i + 1) * element, have: avail })?;
                        codec.encode(value, wire, slot)?;
                    }
                    self.note(format_args!(
                        "returning {}={} ({}/{})",
                        schema.name,
                        render(&values[..count]),
                        count,
                        values.len()
                    ));
                }
                None => self.note(format_args!("data buffer is null")),
            }
            return Ok(());
        }

        if in_size < element {
            self.note(format_args!("not enough space: need {}, avail {}", element, in_size));
            return Err(SizeMismatch::TooSmall { need: element, have: in_size }.into());
        }

        match out_size {
            Some(out_size) => *out_size = element,
            None => self.note(format_args!("size buffer is null")),
        }

        let out = match out {
            Some(out) => out,
            None => {
                self.note(format_args!("data buffer is null"));
                return Ok(());
            }
        };

        let value = match entry.read {
            ReadPlan::Plain | ReadPlan::Scoped => host
                .get(&key, Self::read_at(entry, address))
                .map_err(DispatchError::GetterFailed)?,
            ReadPlan::Converter => {
                // The destination buffer carries the input
                let input = codec.decode(out, wire, schema.host_type)?;
                self.note(format_args!("obtained input {}={}", schema.name, input));
                host.convert(&key, input).map_err(DispatchError::GetterFailed)?
            }
            ReadPlan::Qualified { qualifier: qualifier_type } => {
                let data = qualifier.unwrap_or_default();
                if data.len() != qualifier_type.size() {
                    self.note(format_args!(
                        "invalid qualifier size: should be {}, got {}",
                        qualifier_type.size(),
                        data.len()
                    ));
                    return Err(SizeMismatch::NotEqual { need: qualifier_type.size(), have: data.len() }.into());
                }
                let qualifier = codec.decode(data, qualifier_type, qualifier_type.natural_host())?;
                self.note(format_args!("obtained qualifier {}={}", schema.name, qualifier));
                host.get(&key, Read::Qualified(qualifier)).map_err(DispatchError::GetterFailed)?
            }
        };

        codec.encode(&value, wire, out)?;
        self.note(format_args!("returning {}={}", schema.name, value));
        Ok(())
    }

    fn write_data(
        self: &Arc<Self>,
        depth: usize,
        table: &DispatchTable,
        entry: &PropertyEntry,
        in_size: usize,
        data: Option<&[u8]>,
    ) -> Result<(), DispatchError> {
        let schema = &entry.schema;
        let wire = schema.wire_type;
        let element = wire.size();
        let codec = self.context.codec.as_ref();

        let value = if schema.is_array {
            if in_size % element != 0 {
                self.note(format_args!("invalid size: {} is not a multiple of {}", in_size, element));
                return Err(SizeMismatch::NotMultiple { element, size: in_size }.into());
            }
            let data: &[u8] = match data {
                Some(data) => data,
                None if in_size == 0 => &[],
                None => {
                    self.note(format_args!("input buffer is null"));
                    return Err(DispatchError::NullBuffer(in_size));
                }
            };

            let mut elements = Vec::with_capacity(in_size / element);
            for i in 0..in_size / element {
                let bytes = data
                    .get(i * element..(i + 1) * element)
                    .ok_or(CodecError::BufferTooSmall { need: in_size, have: data.len() })?;
                elements.push(codec.decode(bytes, wire, schema.host_type)?);
            }
            Value::Array(elements)
        } else {
            if in_size != element {
                self.note(format_args!("invalid size: should be {}, got {}", element, in_size));
                return Err(SizeMismatch::NotEqual { need: element, have: in_size }.into());
            }
            let data = match data {
                Some(data) => data,
                None => {
                    self.note(format_args!("input buffer is null"));
                    return Err(DispatchError::NullBuffer(in_size));
                }
            };
            codec.decode(data, wire, schema.host_type)?
        };

        self.note(format_args!("setting {}={}", schema.name, value));

        let result = self.set_value(depth, table, entry, value);
        if result.is_err() {
            self.note(format_args!("setter failed"));
        }
        result
    }

    fn set_value(
        self: &Arc<Self>,
        depth: usize,
        table: &DispatchTable,
        entry: &PropertyEntry,
        value: Value,
    ) -> Result<(), DispatchError> {
        match entry.write {
            WritePlan::Sync => self.set_sync(depth, table, entry, value),
            WritePlan::Async => self.set_async(depth, table, entry, value),
        }
    }

    /// `Ok(false)` when `value` equals the current value.
    fn admit(
        &self,
        depth: usize,
        table: &DispatchTable,
        entry: &PropertyEntry,
        value: &Value,
    ) -> Result<bool, DispatchError> {
        let key = Self::key(table, entry);
        let host = self.host(depth);

        let current = host.get(&key, self.own_read(entry)).map_err(DispatchError::GetterFailed)?;
        if current == *value {
            self.note(format_args!("value not changed"));
            return Ok(false);
        }

        if entry.schema.validated {
            if let Err(status) = host.check(&key, value) {
                self.note(format_args!("value is invalid"));
                return Err(DispatchError::ValidationRejected(status));
            }
        }

        Ok(true)
    }

    fn notify(&self, entry: &PropertyEntry) {
        let address = if entry.schema.scoped_notification {
            PropertyAddress::new(entry.selector(), self.scope, self.element)
        } else {
            PropertyAddress::global(entry.selector())
        };
        self.context.notifier.properties_changed(self.id, &[address]);
    }

    fn set_sync(
        &self,
        depth: usize,
        table: &DispatchTable,
        entry: &PropertyEntry,
        value: Value,
    ) -> Result<(), DispatchError> {
        let lock = self.locks[depth].clone();
        let _guard = lock.lock();

        let op = Operation::new(format!("{}::Set{}()", table.class_name(), entry.name())).with_object(self.id);
        self.context.tracer.operation_begin(&op);

        let result = self.admit(depth, table, entry, &value).and_then(|changed| {
            if !changed {
                return Ok(());
            }
            self.note(format_args!("setting value to {}", value));
            if let Err(status) = self.host(depth).set(&Self::key(table, entry), value) {
                self.note(format_args!("setter failed"));
                return Err(DispatchError::MutationFailed(status));
            }
            self.notify(entry);
            Ok(())
        });

        self.context.tracer.operation_end(&op, status_of(&result));
        result
    }

    fn set_async(
        self: &Arc<Self>,
        depth: usize,
        table: &DispatchTable,
        entry: &PropertyEntry,
        value: Value,
    ) -> Result<(), DispatchError> {
        let lock = self.locks[depth].clone();
        let _guard = lock.lock();

        let op = Operation::new(format!("{}::Set{}Async()", table.class_name(), entry.name())).with_object(self.id);
        self.context.tracer.operation_begin(&op);

        let result = self.admit(depth, table, entry, &value).map(|changed| {
            if changed {
                let object = Arc::clone(self);
                let name = entry.name().to_string();
                self.context
                    .scheduler
                    .request_configuration_change(Box::new(move || object.apply(depth, &name, value)));
                self.note(format_args!("requested configuration change"));
            }
        });

        self.context.tracer.operation_end(&op, status_of(&result));
        result
    }

    /// Deferred half of an asynchronous setter. Its outcome is only traced.
    fn apply(&self, depth: usize, name: &str, value: Value) {
        let table = self.table(depth);
        let entry = match table.wrapper(name) {
            Some(entry) => entry,
            None => return,
        };

        let lock = self.locks[depth].clone();
        let _guard = lock.lock();

        let op = Operation::new(format!("{}::Set{}Impl()", table.class_name(), name)).with_object(self.id);
        self.context.tracer.operation_begin(&op);

        let key = Self::key(table, entry);
        let host = self.host(depth);

        // The value may have changed again since admission
        let result = match host.get(&key, self.own_read(entry)) {
            Err(status) => Err(DispatchError::GetterFailed(status)),
            Ok(current) if current == value => {
                self.note(format_args!("value not changed"));
                Ok(())
            }
            Ok(_) => {
                self.note(format_args!("setting value to {}", value));
                host.set(&key, value).map_err(DispatchError::MutationFailed)
            }
        };

        self.context.tracer.operation_end(&op, status_of(&result));
    }

    /// First class level, leaf first, where `find` yields an entry.
    fn find<'a>(
        &'a self,
        find: impl Fn(&'a DispatchTable) -> Option<&'a PropertyEntry>,
    ) -> Option<(usize, &'a DispatchTable, &'a PropertyEntry)> {
        (0..self.chain.len()).find_map(|depth| {
            let table = self.table(depth);
            find(table).map(|entry| (depth, table, entry))
        })
    }
}

impl PropertyObject {
    pub fn id(&self) -> ObjectId {
        self.shared.id
    }

    pub fn scope(&self) -> u32 {
        self.shared.scope
    }

    pub fn element(&self) -> u32 {
        self.shared.element
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.shared.context
    }

    pub fn class_name(&self) -> &str {
        self.shared.table(0).class_name()
    }

    pub fn class(&self) -> u32 {
        self.shared.table(0).class()
    }

    pub fn base_class(&self) -> u32 {
        self.shared.table(0).base_class()
    }

    pub fn is_instance(&self, class_id: u32) -> bool {
        self.shared.table(0).is_instance(class_id)
    }

    pub fn has_property(&self, object_id: ObjectId, client_pid: Pid, address: Option<&PropertyAddress>) -> bool {
        self.shared.route(&mut HasProperty, object_id, client_pid, address, None, None)
    }

    pub fn is_property_settable(
        &self,
        object_id: ObjectId,
        client_pid: Pid,
        address: Option<&PropertyAddress>,
        out: Option<&mut bool>,
    ) -> Result<(), DispatchError> {
        self.shared.route(&mut IsPropertySettable { out }, object_id, client_pid, address, None, None)
    }

    pub fn get_property_data_size(
        &self,
        object_id: ObjectId,
        client_pid: Pid,
        address: Option<&PropertyAddress>,
        qualifier: Option<&[u8]>,
        out_size: Option<&mut usize>,
    ) -> Result<(), DispatchError> {
        self.shared.route(
            &mut GetPropertyDataSize { out_size },
            object_id,
            client_pid,
            address,
            qualifier,
            None,
        )
    }

    /// Reads into `out`, whose declared capacity is `in_size` bytes.
    #[allow(clippy::too_many_arguments)]
    pub fn get_property_data(
        &self,
        object_id: ObjectId,
        client_pid: Pid,
        address: Option<&PropertyAddress>,
        qualifier: Option<&[u8]>,
        in_size: usize,
        out_size: Option<&mut usize>,
        out: Option<&mut [u8]>,
    ) -> Result<(), DispatchError> {
        self.shared.route(
            &mut GetPropertyData { qualifier, in_size, out_size, out },
            object_id,
            client_pid,
            address,
            qualifier,
            Some(in_size),
        )
    }

    /// Writes `in_size` bytes from `data`. An absent buffer is only valid
    /// with a zero size.
    pub fn set_property_data(
        &self,
        object_id: ObjectId,
        client_pid: Pid,
        address: Option<&PropertyAddress>,
        qualifier: Option<&[u8]>,
        in_size: usize,
        data: Option<&[u8]>,
    ) -> Result<(), DispatchError> {
        self.shared.route(
            &mut SetPropertyData { in_size, data },
            object_id,
            client_pid,
            address,
            qualifier,
            Some(in_size),
        )
    }

    /// Runs the Set accessor wrapper of `name`: locked, change-detected,
    /// validated and notified, or admitted for later application when the
    /// property has an asynchronous setter.
    pub fn set_property(&self, name: &str, value: impl Into<Value>) -> Result<(), DispatchError> {
        let value = value.into();
        let (depth, table, entry) = self
            .shared
            .find(|table| table.wrapper(name))
            .ok_or_else(|| DispatchError::NoSuchAccessor(name.to_string()))?;

        check_shape(entry, &value)?;
        self.shared.set_value(depth, table, entry, value)
    }

    /// Current value of a gettable property through its plain getter.
    pub fn get_property(&self, name: &str) -> Result<Value, DispatchError> {
        let (depth, table, entry) = self
            .shared
            .find(|table| table.getter(name))
            .ok_or_else(|| DispatchError::NoSuchAccessor(name.to_string()))?;

        self.shared
            .host(depth)
            .get(&Shared::key(table, entry), self.shared.own_read(entry))
            .map_err(DispatchError::GetterFailed)
    }
}

impl Object for PropertyObject {
    fn id(&self) -> ObjectId {
        self.shared.id
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for PropertyObject {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("PropertyObject")
            .field("id", &self.shared.id)
            .field("class", &self.class_name())
            .finish()
    }
}
