//! propdispatch
//!
//! Runtime for the address-based property protocol:
//!
//!  1) [DispatchTable] / [ClassTable]: class schemas compiled into selector indexes,
//!  2) [PropertyObject]: the five boundary queries routed through a class chain with fallback,
//!     plus the Set/Get accessor wrappers (locking, change detection, validation, notification),
//!  3) Capabilities: [Tracer], [Scheduler], [Notifier], [Fallback], codec (from the schema crate),
//!  4) Object and driver registries for bridge trampolines, and [IntoStatus].
//!
//! Schema parsing, the constant-table miner and the code generators live in
//! `propdispatch-compiler`, re-exported as [compiler].

pub mod address;
pub mod bridge;
pub mod context;
pub mod dispatcher;
pub mod driver;
pub mod fallback;
pub mod host;
pub mod notifier;
pub mod object;
pub mod scheduler;
pub mod status;
pub mod table;
pub mod tracer;

pub use address::*;
pub use bridge::IntoStatus;
pub use context::{Context, ContextBuilder};
pub use dispatcher::{Dispatcher, Object};
pub use driver::{Driver, DriverRef};
pub use fallback::{CustomProperties, Fallback, Request, UnknownPropertyFallback};
pub use host::{PropertyHost, PropertyKey, Read};
pub use notifier::{CollectingNotifier, NoopNotifier, Notifier};
pub use object::{ObjectBuilder, PropertyObject};
pub use scheduler::{Job, Scheduler, TaskQueue, WorkerScheduler};
pub use status::*;
pub use table::{ClassTable, DispatchTable, PropertyEntry, ReadPlan, WritePlan};
pub use tracer::{LogTracer, NoopTracer, Operation, TraceStyle, Tracer};

pub use propdispatch_compiler as compiler;
pub use propdispatch_schema as schema;
pub use propdispatch_schema::{Codec, FromValue, NativeCodec, Value, ValueRange};

/// Names generated code refers to.
pub mod prelude {
    pub use crate::{
        DispatchError, Driver, DriverRef, IntoStatus, Object, ObjectId, OsStatus, Pid, PropertyAddress,
        PropertyHost, PropertyKey, PropertyObject, Read, BAD_OBJECT_ERROR, NO_ERROR, UNKNOWN_PROPERTY_ERROR,
        UNSPECIFIED_ERROR,
    };
    pub use propdispatch_schema::{CodecError, FromValue, Value, ValueRange};
}
