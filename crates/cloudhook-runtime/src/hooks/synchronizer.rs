use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info, warn};

use super::client::RemoteHookClient;
use super::types::{Hook, HookFunction, HookTrigger, HookVerb};

/// Applies a hook verb across every target server.
///
/// Failures are isolated per server and never surface as an error for the
/// whole run; the result only lists the servers that succeeded. A Create that
/// collides with an existing hook is recovered once by deleting the remote
/// hook and creating it again.
#[derive(Clone)]
pub struct HookSynchronizer {
    client: Arc<dyn RemoteHookClient>,
}

impl HookSynchronizer {
    pub fn new(client: Arc<dyn RemoteHookClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<dyn RemoteHookClient> {
        &self.client
    }

    /// Run `verb` for `hook` on every target concurrently.
    ///
    /// Returns the remote definition per server that succeeded. Delete yields
    /// an empty map.
    pub async fn synchronize<S: AsRef<str>>(
        &self,
        verb: HookVerb,
        hook: &Hook,
        targets: &[S],
    ) -> HashMap<String, Hook> {
        let runs = targets.iter().map(|target| async move {
            let target = target.as_ref();
            let result = self.run_target(verb, hook, target).await;
            (target.to_string(), result)
        });

        join_all(runs)
            .await
            .into_iter()
            .filter_map(|(target, result)| result.map(|hook| (target, hook)))
            .collect()
    }

    /// Delete `hook` from every target, logging and swallowing failures
    pub async fn delete<S: AsRef<str>>(&self, hook: &Hook, targets: &[S]) {
        self.synchronize(HookVerb::Delete, hook, targets).await;
    }

    pub async fn synchronize_function<S: AsRef<str>>(
        &self,
        verb: HookVerb,
        function: &HookFunction,
        targets: &[S],
    ) -> HashMap<String, HookFunction> {
        let hook = Hook::Function(function.clone());
        self.synchronize(verb, &hook, targets)
            .await
            .into_iter()
            .filter_map(|(server, hook)| match hook {
                Hook::Function(f) => Some((server, f)),
                Hook::Trigger(_) => None,
            })
            .collect()
    }

    pub async fn synchronize_trigger<S: AsRef<str>>(
        &self,
        verb: HookVerb,
        trigger: &HookTrigger,
        targets: &[S],
    ) -> HashMap<String, HookTrigger> {
        let hook = Hook::Trigger(trigger.clone());
        self.synchronize(verb, &hook, targets)
            .await
            .into_iter()
            .filter_map(|(server, hook)| match hook {
                Hook::Trigger(t) => Some((server, t)),
                Hook::Function(_) => None,
            })
            .collect()
    }

    async fn run_target(&self, verb: HookVerb, hook: &Hook, target: &str) -> Option<Hook> {
        match self.client.perform(verb, hook, target).await {
            Ok(result) => {
                info!(server = %target, hook = %hook, verb = %verb, "Hook synchronized");
                result
            }
            Err(e) if verb == HookVerb::Create && e.is_conflict() => {
                warn!(
                    server = %target,
                    hook = %hook,
                    error = %e,
                    "Hook already exists, replacing it"
                );
                self.recreate(hook, target).await
            }
            Err(e) => {
                error!(server = %target, hook = %hook, verb = %verb, error = %e, "Hook synchronization failed");
                None
            }
        }
    }

    /// Delete then create once more; the second create is not recovered again
    async fn recreate(&self, hook: &Hook, target: &str) -> Option<Hook> {
        match self.client.perform(HookVerb::Delete, hook, target).await {
            Ok(_) => info!(server = %target, hook = %hook, "Stale hook deleted"),
            Err(e) => warn!(server = %target, hook = %hook, error = %e, "Stale hook delete failed"),
        }

        match self.client.perform(HookVerb::Create, hook, target).await {
            Ok(result) => {
                info!(server = %target, hook = %hook, "Hook recreated");
                result
            }
            Err(e) => {
                error!(server = %target, hook = %hook, error = %e, "Hook recreate failed");
                None
            }
        }
    }
}
