use crate::{
    address::{ObjectId, Pid, PropertyAddress},
    status::{status_name, OsStatus},
};
use std::cell::Cell;
use std::fmt::Write;

/// Structured record of one traced operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    pub name:           String,
    pub object_id:      Option<ObjectId>,
    pub client_pid:     Option<Pid>,
    pub address:        Option<PropertyAddress>,
    pub qualifier_size: Option<usize>,
    pub in_size:        Option<usize>,
}

impl Operation {
    pub fn new(name: impl Into<String>) -> Self {
        Operation { name: name.into(), ..Default::default() }
    }

    pub fn with_object(mut self, object_id: ObjectId) -> Self {
        self.object_id = Some(object_id);
        self
    }

    /// One-line rendering of the populated fields.
    pub fn describe(&self) -> String {
        let mut text = self.name.clone();
        if let Some(id) = self.object_id {
            let _ = write!(text, " objectID={}", id);
        }
        if let Some(pid) = self.client_pid {
            let _ = write!(text, " clientPID={}", pid);
        }
        if let Some(address) = self.address {
            let _ = write!(text, " address={}", address);
        }
        if let Some(size) = self.qualifier_size {
            let _ = write!(text, " qualifierSize={}", size);
        }
        if let Some(size) = self.in_size {
            let _ = write!(text, " inSize={}", size);
        }
        text
    }
}

/// Sink for operation begin/end records and diagnostic messages.
pub trait Tracer: Send + Sync {
    fn operation_begin(&self, operation: &Operation);

    fn message(&self, message: &str);

    fn operation_end(&self, operation: &Operation, status: OsStatus);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStyle {
    /// Nested operations are indented by depth.
    Hierarchical,
    Flat,
}

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Tracer emitting through `tracing` at debug level.
#[derive(Debug, Clone, Copy)]
pub struct LogTracer {
    style: TraceStyle,
}

impl LogTracer {
    pub fn new(style: TraceStyle) -> Self {
        LogTracer { style }
    }

    fn indent(&self) -> String {
        match self.style {
            TraceStyle::Hierarchical => "  ".repeat(DEPTH.with(Cell::get)),
            TraceStyle::Flat => String::new(),
        }
    }
}

impl Default for LogTracer {
    fn default() -> Self {
        LogTracer::new(TraceStyle::Hierarchical)
    }
}

impl Tracer for LogTracer {
    fn operation_begin(&self, operation: &Operation) {
        tracing::debug!(target: "propdispatch", "{}-> {}", self.indent(), operation.describe());
        DEPTH.with(|d| d.set(d.get() + 1));
    }

    fn message(&self, message: &str) {
        tracing::debug!(target: "propdispatch", "{}{}", self.indent(), message);
    }

    fn operation_end(&self, operation: &Operation, status: OsStatus) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
        tracing::debug!(
            target: "propdispatch",
            "{}<- {} status={}",
            self.indent(),
            operation.name,
            status_name(status)
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    fn operation_begin(&self, _operation: &Operation) {}

    fn message(&self, _message: &str) {}

    fn operation_end(&self, _operation: &Operation, _status: OsStatus) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_lists_populated_fields() {
        let mut op = Operation::new("Volume::GetPropertyData()").with_object(7);
        op.in_size = Some(4);
        assert_eq!(op.describe(), "Volume::GetPropertyData() objectID=7 inSize=4");
    }

    #[test]
    fn hierarchical_depth_is_balanced() {
        let tracer = LogTracer::default();
        let op = Operation::new("A::HasProperty()");
        tracer.operation_begin(&op);
        tracer.operation_begin(&op);
        assert_eq!(tracer.indent(), "    ");
        tracer.operation_end(&op, 0);
        tracer.operation_end(&op, 0);
        assert_eq!(tracer.indent(), "");
        assert_eq!(LogTracer::new(TraceStyle::Flat).indent(), "");
    }
}
