use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use tracing::info;

use super::client::RemoteHookClient;
use super::error::RemoteError;
use super::http_client::RestHookClient;
use super::registry::HookRegistry;
use super::synchronizer::HookSynchronizer;
use super::types::{Hook, HookFunction, HookKind, HookTrigger, HookVerb};
use crate::config::BackendConfig;

/// Ties the synchronizer to the registry for the configured server list
#[derive(Clone)]
pub struct HookService {
    synchronizer: HookSynchronizer,
    registry: HookRegistry,
    servers: Arc<Vec<String>>,
}

impl HookService {
    pub fn new(client: Arc<dyn RemoteHookClient>, servers: Vec<String>) -> Self {
        Self {
            synchronizer: HookSynchronizer::new(client),
            registry: HookRegistry::new(),
            servers: Arc::new(servers),
        }
    }

    /// Build with the REST client for the configured backends
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let client = RestHookClient::from_config(config)?;
        Ok(Self::new(Arc::new(client), config.urls.clone()))
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    pub fn synchronizer(&self) -> &HookSynchronizer {
        &self.synchronizer
    }

    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    /// Create the function on every server and record where it landed
    pub async fn register_function(&self, function: &HookFunction) -> HashMap<String, HookFunction> {
        let created = self
            .synchronizer
            .synchronize_function(HookVerb::Create, function, self.servers.as_slice())
            .await;
        self.registry.update_functions(created.clone()).await;
        created
    }

    /// Create the trigger on every server and record where it landed
    pub async fn register_trigger(&self, trigger: &HookTrigger) -> HashMap<String, HookTrigger> {
        let created = self
            .synchronizer
            .synchronize_trigger(HookVerb::Create, trigger, self.servers.as_slice())
            .await;
        self.registry.update_triggers(created.clone()).await;
        created
    }

    /// Create a hook of either kind
    pub async fn register(&self, hook: &Hook) -> usize {
        match hook {
            Hook::Function(f) => self.register_function(f).await.len(),
            Hook::Trigger(t) => self.register_trigger(t).await.len(),
        }
    }

    /// Delete every hook the registry knows about from its server, then clear it.
    ///
    /// Registrations still in flight are not seen; await them first.
    pub async fn delete_all(&self) {
        let functions = self.registry.functions().await;
        let triggers = self.registry.triggers().await;

        let mut hooks: Vec<(String, Hook)> = Vec::new();
        for (server, entries) in functions {
            hooks.extend(
                entries
                    .into_values()
                    .map(|f| (server.clone(), Hook::Function(f))),
            );
        }
        for (server, entries) in triggers {
            hooks.extend(
                entries
                    .into_values()
                    .map(|t| (server.clone(), Hook::Trigger(t))),
            );
        }

        info!(count = hooks.len(), "Deleting registered hooks");

        join_all(
            hooks
                .iter()
                .map(|(server, hook)| self.synchronizer.delete(hook, std::slice::from_ref(server))),
        )
        .await;

        self.registry.remove_all_functions().await;
        self.registry.remove_all_triggers().await;
    }

    /// List hooks of `kind` on every configured server
    pub async fn fetch_all(&self, kind: HookKind) -> Vec<(String, Result<Vec<Hook>, RemoteError>)> {
        let client = self.synchronizer.client();
        join_all(self.servers.iter().map(|server| async move {
            (server.clone(), client.fetch_all(kind, server).await)
        }))
        .await
    }
}
