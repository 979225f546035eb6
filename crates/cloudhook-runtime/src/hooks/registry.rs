use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::types::{HookFunction, HookTrigger, TriggerKey};

/// Functions known per server, keyed by function name
pub type FunctionTable = HashMap<String, HashMap<String, HookFunction>>;
/// Triggers known per server, keyed by (class, trigger type)
pub type TriggerTable = HashMap<String, HashMap<TriggerKey, HookTrigger>>;

#[derive(Debug, Default)]
struct Tables {
    functions: FunctionTable,
    triggers: TriggerTable,
}

/// Local mirror of the hooks believed registered on each backend server.
///
/// Every read and write goes through one mutex, so callers never observe a
/// partially applied update. Purely local bookkeeping: nothing here talks to
/// the network.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    inner: Arc<Mutex<Tables>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all functions
    pub async fn functions(&self) -> FunctionTable {
        self.inner.lock().await.functions.clone()
    }

    /// Snapshot of all triggers
    pub async fn triggers(&self) -> TriggerTable {
        self.inner.lock().await.triggers.clone()
    }

    /// Upsert each `(server, function)` pair
    pub async fn update_functions(&self, updates: HashMap<String, HookFunction>) {
        let mut tables = self.inner.lock().await;
        for (server, function) in updates {
            tables
                .functions
                .entry(server)
                .or_default()
                .insert(function.name.clone(), function);
        }
    }

    /// Upsert each `(server, trigger)` pair
    pub async fn update_triggers(&self, updates: HashMap<String, HookTrigger>) {
        let mut tables = self.inner.lock().await;
        for (server, trigger) in updates {
            tables
                .triggers
                .entry(server)
                .or_default()
                .insert(trigger.key(), trigger);
        }
    }

    /// Drop every function recorded for the given servers
    pub async fn remove_functions<S: AsRef<str>>(&self, servers: &[S]) {
        let mut tables = self.inner.lock().await;
        for server in servers {
            tables.functions.remove(server.as_ref());
        }
    }

    /// Drop every trigger recorded for the given servers
    pub async fn remove_triggers<S: AsRef<str>>(&self, servers: &[S]) {
        let mut tables = self.inner.lock().await;
        for server in servers {
            tables.triggers.remove(server.as_ref());
        }
    }

    /// Forget a single function on one server
    pub async fn remove_function(&self, server: &str, name: &str) -> Option<HookFunction> {
        let mut tables = self.inner.lock().await;
        let entry = tables.functions.get_mut(server)?;
        let removed = entry.remove(name);
        if entry.is_empty() {
            tables.functions.remove(server);
        }
        removed
    }

    /// Forget a single trigger on one server
    pub async fn remove_trigger(&self, server: &str, key: &TriggerKey) -> Option<HookTrigger> {
        let mut tables = self.inner.lock().await;
        let entry = tables.triggers.get_mut(server)?;
        let removed = entry.remove(key);
        if entry.is_empty() {
            tables.triggers.remove(server);
        }
        removed
    }

    pub async fn remove_all_functions(&self) {
        self.inner.lock().await.functions.clear();
    }

    pub async fn remove_all_triggers(&self) {
        self.inner.lock().await.triggers.clear();
    }

    /// Total number of hooks across all servers
    pub async fn len(&self) -> usize {
        let tables = self.inner.lock().await;
        tables.functions.values().map(HashMap::len).sum::<usize>()
            + tables.triggers.values().map(HashMap::len).sum::<usize>()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
