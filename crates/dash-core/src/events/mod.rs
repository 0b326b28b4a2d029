use std::sync::Arc;

use parking_lot::RwLock;

/// Receives "table updated" notifications
pub trait UpdateListener: Send + Sync {
    /// Called with the name of the table whose data changed
    fn table_updated(&self, table: &str);
}

/// Registration-ordered set of update listeners.
///
/// Listeners are compared by identity, so registering the same `Arc` twice
/// does not double delivery. Clones share the same underlying set.
#[derive(Clone, Default)]
pub struct ListenerSet {
    listeners: Arc<RwLock<Vec<Arc<dyn UpdateListener>>>>,
}

fn same_listener(a: &Arc<dyn UpdateListener>, b: &Arc<dyn UpdateListener>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl ListenerSet {
    /// Create an empty listener set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener; a no-op if it is already registered
    pub fn register(&self, listener: Arc<dyn UpdateListener>) {
        let mut listeners = self.listeners.write();
        if !listeners.iter().any(|l| same_listener(l, &listener)) {
            listeners.push(listener);
        }
    }

    /// Remove a listener if present
    pub fn deregister(&self, listener: &Arc<dyn UpdateListener>) {
        self.listeners.write().retain(|l| !same_listener(l, listener));
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Deliver an update to every listener in registration order
    pub fn notify(&self, table: &str) {
        // Snapshot so a callback may touch the set without deadlocking
        let listeners: Vec<_> = self.listeners.read().clone();
        tracing::debug!("Notifying {} listener(s) that '{}' was updated", listeners.len(), table);

        for listener in listeners {
            listener.table_updated(table);
        }
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet").field("len", &self.len()).finish()
    }
}

/// Helper struct for creating update listeners from closures
pub struct ClosureUpdateListener<F> {
    handler: F,
}

impl<F> UpdateListener for ClosureUpdateListener<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn table_updated(&self, table: &str) {
        (self.handler)(table);
    }
}

/// Create an update listener from a closure
pub fn listener_from_fn<F>(f: F) -> Arc<dyn UpdateListener>
where
    F: Fn(&str) + Send + Sync + 'static,
{
    Arc::new(ClosureUpdateListener { handler: f })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, Arc<dyn UpdateListener>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let listener = listener_from_fn(move |table| sink.lock().push(table.to_string()));
        (seen, listener)
    }

    #[test]
    fn test_register_twice_delivers_once() {
        let set = ListenerSet::new();
        let (seen, listener) = recorder();

        set.register(listener.clone());
        set.register(listener.clone());
        set.notify("people");

        assert_eq!(set.len(), 1);
        assert_eq!(*seen.lock(), vec!["people".to_string()]);
    }

    #[test]
    fn test_delivery_order_and_deregister() {
        let set = ListenerSet::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let order = order.clone();
            listener_from_fn(move |_| order.lock().push(1))
        };
        let second = {
            let order = order.clone();
            listener_from_fn(move |_| order.lock().push(2))
        };

        set.register(first.clone());
        set.register(second.clone());
        set.notify("t");
        assert_eq!(*order.lock(), vec![1, 2]);

        set.deregister(&first);
        set.notify("t");
        assert_eq!(*order.lock(), vec![1, 2, 2]);
        assert!(!set.is_empty());
    }
}
