use crate::address::{ObjectId, PropertyAddress};
use parking_lot::Mutex;

/// Receives property-changed notifications emitted by setters.
pub trait Notifier: Send + Sync {
    fn properties_changed(&self, object_id: ObjectId, addresses: &[PropertyAddress]);
}

#[derive(Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn properties_changed(&self, _object_id: ObjectId, _addresses: &[PropertyAddress]) {}
}

/// Records every notification; useful for hosts that batch them and in tests.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    changes: Mutex<Vec<(ObjectId, PropertyAddress)>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        CollectingNotifier::default()
    }

    /// Removes and returns everything recorded so far.
    pub fn take(&self) -> Vec<(ObjectId, PropertyAddress)> {
        std::mem::take(&mut *self.changes.lock())
    }

    pub fn len(&self) -> usize {
        self.changes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for CollectingNotifier {
    fn properties_changed(&self, object_id: ObjectId, addresses: &[PropertyAddress]) {
        self.changes
            .lock()
            .extend(addresses.iter().map(|address| (object_id, *address)));
    }
}
