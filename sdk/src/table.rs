//! Compiled dispatch tables.
//!
//! A [DispatchTable] is the runtime form of one validated class schema:
//! selector-keyed read and write indexes plus the identity chain. A
//! [ClassTable] links the tables of a class set by base-class index so a
//! query can walk from a leaf class to its root.

use propdispatch_compiler::{verifier::verify_hierarchy, ClassSchema, PropertySchema, SchemaError};
use propdispatch_schema::WireType;
use std::collections::HashMap;

/// How a matched read obtains its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPlan {
    Plain,
    /// Getter receives the scope of the querying address.
    Scoped,
    /// Input decoded from the destination buffer, then transformed.
    Converter,
    /// Getter receives a decoded qualifier of this wire type.
    Qualified { qualifier: WireType },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePlan {
    Sync,
    /// Admit now, apply later on the scheduler.
    Async,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    pub schema: PropertySchema,
    pub read:   ReadPlan,
    pub write:  WritePlan,
}

impl PropertyEntry {
    fn compile(schema: &PropertySchema) -> Self {
        let read = if schema.is_converter {
            ReadPlan::Converter
        } else if let (true, Some(qualifier)) = (schema.is_qualified, schema.qualifier_type) {
            ReadPlan::Qualified { qualifier }
        } else if schema.scoped_getter {
            ReadPlan::Scoped
        } else {
            ReadPlan::Plain
        };

        let write = if schema.asynchronous_setter { WritePlan::Async } else { WritePlan::Sync };

        PropertyEntry { schema: schema.clone(), read, write }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn selector(&self) -> u32 {
        self.schema.selector_code.value
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchTable {
    class_name:    String,
    base_class:    Option<String>,
    identity:      Vec<u32>,
    lock_handle:   String,
    entries:       Vec<PropertyEntry>,
    read_index:    HashMap<u32, usize>,
    write_index:   HashMap<u32, usize>,
    wrapper_index: HashMap<String, usize>,
}

impl DispatchTable {
    pub fn compile(schema: &ClassSchema) -> DispatchTable {
        let entries: Vec<PropertyEntry> = schema.properties.iter().map(PropertyEntry::compile).collect();

        let mut read_index = HashMap::new();
        let mut write_index = HashMap::new();
        let mut wrapper_index = HashMap::new();

        // First declaration wins wherever keys repeat
        for (i, entry) in entries.iter().enumerate() {
            let p = &entry.schema;
            if p.gettable {
                read_index.entry(entry.selector()).or_insert(i);
            }
            if p.is_write_dispatched() {
                write_index.entry(entry.selector()).or_insert(i);
            }
            if p.has_setter_wrapper() {
                wrapper_index.entry(p.name.clone()).or_insert(i);
            }
        }

        tracing::debug!(
            class = %schema.class_name,
            readable = read_index.len(),
            writable = write_index.len(),
            "compiled dispatch table"
        );

        DispatchTable {
            class_name: schema.class_name.clone(),
            base_class: schema.base_class_name.clone(),
            identity: schema.class_identity_chain.iter().map(|c| c.value).collect(),
            lock_handle: schema.setter_lock_handle.clone(),
            entries,
            read_index,
            write_index,
            wrapper_index,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn base_class_name(&self) -> Option<&str> {
        self.base_class.as_deref()
    }

    pub fn lock_handle(&self) -> &str {
        &self.lock_handle
    }

    pub fn identity_chain(&self) -> &[u32] {
        &self.identity
    }

    /// Own class code: the first element of the identity chain.
    pub fn class(&self) -> u32 {
        self.identity.first().copied().unwrap_or_default()
    }

    /// Second element of the identity chain; a root reports itself.
    pub fn base_class(&self) -> u32 {
        self.identity.get(1).copied().unwrap_or_else(|| self.class())
    }

    pub fn is_instance(&self, class_id: u32) -> bool {
        self.identity.contains(&class_id)
    }

    pub fn entries(&self) -> &[PropertyEntry] {
        &self.entries
    }

    /// Gettable property answering `selector`.
    pub fn readable(&self, selector: u32) -> Option<&PropertyEntry> {
        self.read_index.get(&selector).map(|&i| &self.entries[i])
    }

    /// Property `SetPropertyData` routes `selector` to.
    pub fn writable(&self, selector: u32) -> Option<&PropertyEntry> {
        self.write_index.get(&selector).map(|&i| &self.entries[i])
    }

    /// Property with a Set accessor wrapper.
    pub fn wrapper(&self, name: &str) -> Option<&PropertyEntry> {
        self.wrapper_index.get(name).map(|&i| &self.entries[i])
    }

    /// Gettable property by name.
    pub fn getter(&self, name: &str) -> Option<&PropertyEntry> {
        self.entries.iter().find(|e| e.schema.gettable && e.schema.name == name)
    }
}

/// Every compiled class of a driver, linked by base-class index.
#[derive(Debug, Clone)]
pub struct ClassTable {
    tables:  Vec<DispatchTable>,
    parents: Vec<Option<usize>>,
    by_name: HashMap<String, usize>,
    by_code: HashMap<u32, usize>,
}

impl ClassTable {
    pub fn build(classes: Vec<ClassSchema>) -> Result<ClassTable, SchemaError> {
        verify_hierarchy(&classes)?;

        let tables: Vec<DispatchTable> = classes.iter().map(DispatchTable::compile).collect();

        let by_name: HashMap<String, usize> = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.class_name.clone(), i))
            .collect();

        let mut by_code = HashMap::new();
        for (i, table) in tables.iter().enumerate() {
            by_code.entry(table.class()).or_insert(i);
        }

        let parents = tables
            .iter()
            .map(|t| t.base_class_name().and_then(|b| by_name.get(b).copied()))
            .collect();

        Ok(ClassTable { tables, parents, by_name, by_code })
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DispatchTable> {
        self.tables.get(index)
    }

    /// Table at a class index obtained from this class table.
    pub(crate) fn at(&self, index: usize) -> &DispatchTable {
        &self.tables[index]
    }

    pub fn index_of(&self, class_name: &str) -> Option<usize> {
        self.by_name.get(class_name).copied()
    }

    pub fn by_name(&self, class_name: &str) -> Option<&DispatchTable> {
        self.index_of(class_name).and_then(|i| self.get(i))
    }

    /// Table of the class whose own code is `class_id`.
    pub fn by_class_id(&self, class_id: u32) -> Option<&DispatchTable> {
        self.by_code.get(&class_id).and_then(|&i| self.get(i))
    }

    /// Class indexes from `index` up to its root, following base links.
    pub fn chain(&self, index: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = Some(index);
        while let Some(i) = current {
            // verified acyclic at build; the bound only guards misuse
            if i >= self.tables.len() || chain.len() > self.tables.len() {
                break;
            }
            chain.push(i);
            current = self.parents[i];
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propdispatch_compiler::Code;

    fn property(name: &str, selector: u32) -> PropertySchema {
        PropertySchema::new(name, Code::new(selector), WireType::UInt32)
    }

    fn class(name: &str, base: Option<&str>, chain: &[u32], properties: Vec<PropertySchema>) -> ClassSchema {
        ClassSchema {
            class_name:           name.to_string(),
            base_class_name:      base.map(str::to_string),
            class_identity_chain: chain.iter().map(|&c| Code::new(c)).collect(),
            setter_lock_handle:   name.to_string(),
            properties,
        }
    }

    #[test]
    fn indexes_follow_flags() {
        let mut settable = property("Settable", 2);
        settable.settable = true;
        let mut hand_written = property("HandWritten", 3);
        hand_written.settable = true;
        hand_written.hand_written_setter = true;
        let mut user_only = property("UserOnly", 4);
        user_only.user_settable = true;
        let mut write_only = property("WriteOnly", 5);
        write_only.gettable = false;
        write_only.settable = true;

        let table = DispatchTable::compile(&class(
            "A",
            None,
            &[10],
            vec![property("Plain", 1), settable, hand_written, user_only, write_only],
        ));

        assert!(table.readable(1).is_some());
        assert!(table.readable(3).is_some());
        assert!(table.readable(5).is_none());

        assert!(table.writable(2).is_some());
        assert!(table.writable(3).is_none());
        assert!(table.writable(4).is_none());
        assert!(table.writable(5).is_some());

        assert!(table.wrapper("Settable").is_some());
        assert!(table.wrapper("UserOnly").is_some());
        assert!(table.wrapper("HandWritten").is_none());
        assert!(table.wrapper("Plain").is_none());
    }

    #[test]
    fn read_plans() {
        let mut converter = property("Converter", 1);
        converter.is_converter = true;
        let mut qualified = property("Qualified", 2);
        qualified.is_qualified = true;
        qualified.qualifier_type = Some(WireType::Float32);
        let mut scoped = property("Scoped", 3);
        scoped.scoped_getter = true;
        let mut async_set = property("Async", 4);
        async_set.settable = true;
        async_set.asynchronous_setter = true;

        let table = DispatchTable::compile(&class("A", None, &[10], vec![converter, qualified, scoped, async_set]));

        assert_eq!(table.readable(1).unwrap().read, ReadPlan::Converter);
        assert_eq!(
            table.readable(2).unwrap().read,
            ReadPlan::Qualified { qualifier: WireType::Float32 }
        );
        assert_eq!(table.readable(3).unwrap().read, ReadPlan::Scoped);
        assert_eq!(table.writable(4).unwrap().write, WritePlan::Async);
    }

    #[test]
    fn identity_queries() {
        let leaf = DispatchTable::compile(&class("Leaf", None, &[3, 2, 1], vec![]));
        assert_eq!(leaf.class(), 3);
        assert_eq!(leaf.base_class(), 2);
        assert!(leaf.is_instance(1) && leaf.is_instance(3));
        assert!(!leaf.is_instance(4));

        let root = DispatchTable::compile(&class("Root", None, &[1], vec![]));
        assert_eq!(root.base_class(), 1);
    }

    #[test]
    fn chains_walk_to_the_root() {
        let classes = ClassTable::build(vec![
            class("Leaf", Some("Mid"), &[3, 2, 1], vec![]),
            class("Root", None, &[1], vec![]),
            class("Mid", Some("Root"), &[2, 1], vec![]),
        ])
        .unwrap();

        let leaf = classes.index_of("Leaf").unwrap();
        let names: Vec<_> = classes
            .chain(leaf)
            .into_iter()
            .map(|i| classes.get(i).unwrap().class_name().to_string())
            .collect();
        assert_eq!(names, vec!["Leaf", "Mid", "Root"]);
        assert_eq!(classes.by_class_id(2).unwrap().class_name(), "Mid");
    }
}
