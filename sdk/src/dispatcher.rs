use crate::address::{ObjectId, PLUGIN_OBJECT_ID};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Anything registered with a [Dispatcher].
pub trait Object: Send + Sync + 'static {
    fn id(&self) -> ObjectId;

    /// Downcasting hook used by bridge trampolines to reach the owner type.
    fn as_any(&self) -> &dyn Any;
}

/// Registry of live objects by id.
pub struct Dispatcher {
    objects: RwLock<HashMap<ObjectId, Arc<dyn Object>>>,
    next_id: AtomicU32,
}

impl Dispatcher {
    pub fn new() -> Self {
        Dispatcher {
            objects: RwLock::new(HashMap::new()),
            next_id: AtomicU32::new(PLUGIN_OBJECT_ID + 1),
        }
    }

    /// Returns a fresh object id, never the reserved plug-in id.
    pub fn allocate_id(&self) -> ObjectId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn register_object(&self, object: Arc<dyn Object>) {
        let id = object.id();
        if self.objects.write().insert(id, object).is_some() {
            tracing::warn!(object_id = id, "object id registered twice, replacing");
        }
    }

    pub fn unregister_object(&self, id: ObjectId) -> bool {
        self.objects.write().remove(&id).is_some()
    }

    pub fn find_object(&self, id: ObjectId) -> Option<Arc<dyn Object>> {
        self.objects.read().get(&id).cloned()
    }

    /// Unregisters every object and returns how many were dropped.
    pub fn clear(&self) -> usize {
        // Objects are released after the registry lock is let go
        let objects = std::mem::take(&mut *self.objects.write());
        objects.len()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Dispatcher::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy(ObjectId);

    impl Object for Dummy {
        fn id(&self) -> ObjectId {
            self.0
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn ids_start_above_plugin() {
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.allocate_id(), 2);
        assert_eq!(dispatcher.allocate_id(), 3);
    }

    #[test]
    fn register_find_unregister() {
        let dispatcher = Dispatcher::new();
        dispatcher.register_object(Arc::new(Dummy(7)));

        let found = dispatcher.find_object(7).unwrap();
        assert!(found.as_any().downcast_ref::<Dummy>().is_some());
        assert!(dispatcher.find_object(8).is_none());

        assert!(dispatcher.unregister_object(7));
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn clear_releases_objects() {
        let dispatcher = Dispatcher::new();
        let object: Arc<dyn Object> = Arc::new(Dummy(4));
        let weak = Arc::downgrade(&object);
        dispatcher.register_object(object);
        dispatcher.register_object(Arc::new(Dummy(5)));

        assert_eq!(dispatcher.clear(), 2);
        assert!(dispatcher.is_empty());
        assert!(weak.upgrade().is_none());
    }
}
