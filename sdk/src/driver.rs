use crate::{context::Context, dispatcher::Dispatcher};
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Opaque handle the host passes back into every bridge entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverRef(u64);

impl DriverRef {
    /// A handle no driver is ever registered under.
    pub const NULL: DriverRef = DriverRef(0);

    pub fn from_raw(raw: u64) -> Self {
        DriverRef(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

lazy_static! {
    static ref DRIVERS: RwLock<HashMap<u64, Weak<Driver>>> = RwLock::new(HashMap::new());
}

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Root of one driver instance: its context and its handle.
///
/// Registered objects hold the context, so dropping the driver unregisters
/// them all.
pub struct Driver {
    handle:  DriverRef,
    context: Arc<Context>,
}

impl Driver {
    /// Creates a driver and registers its handle process-wide.
    pub fn new(context: Arc<Context>) -> Arc<Driver> {
        let handle = DriverRef(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));
        let driver = Arc::new(Driver { handle, context });
        DRIVERS.write().insert(handle.0, Arc::downgrade(&driver));
        tracing::debug!(handle = handle.0, "registered driver");
        driver
    }

    /// Resolves a handle to a live driver.
    pub fn from_ref(handle: DriverRef) -> Option<Arc<Driver>> {
        DRIVERS.read().get(&handle.0).and_then(Weak::upgrade)
    }

    pub fn handle(&self) -> DriverRef {
        self.handle
    }

    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.context.dispatcher
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        DRIVERS.write().remove(&self.handle.0);
        let released = self.context.dispatcher.clear();
        tracing::debug!(handle = self.handle.0, released, "dropped driver");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ObjectId;
    use crate::dispatcher::Object;
    use std::any::Any;

    struct Holder {
        id:       ObjectId,
        _context: Arc<Context>,
    }

    impl Object for Holder {
        fn id(&self) -> ObjectId {
            self.id
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn handles_resolve_while_alive() {
        let driver = Driver::new(Context::builder().build());
        let handle = driver.handle();

        assert!(Driver::from_ref(handle).is_some());
        assert!(Driver::from_ref(DriverRef::NULL).is_none());

        drop(driver);
        assert!(Driver::from_ref(handle).is_none());
    }

    #[test]
    fn dropping_driver_releases_context() {
        let context = Context::builder().build();
        let driver = Driver::new(context.clone());
        let id = driver.dispatcher().allocate_id();
        driver.dispatcher().register_object(Arc::new(Holder { id, _context: context.clone() }));

        let weak = Arc::downgrade(&context);
        drop(context);
        assert!(weak.upgrade().is_some());

        drop(driver);
        assert!(weak.upgrade().is_none());
    }
}
