use async_trait::async_trait;

use super::error::RemoteError;
use super::types::{Hook, HookKind, HookVerb};

/// One CRUD verb for one hook definition against one backend server.
///
/// Implementations never retry; recovery policy lives in the synchronizer.
#[async_trait]
pub trait RemoteHookClient: Send + Sync {
    /// Perform `verb` for `hook` on `server`.
    ///
    /// Fetch, Create and Update return the definition as stored remotely;
    /// Delete returns `None` on success.
    async fn perform(
        &self,
        verb: HookVerb,
        hook: &Hook,
        server: &str,
    ) -> Result<Option<Hook>, RemoteError>;

    /// List every hook of `kind` registered on `server`
    async fn fetch_all(&self, kind: HookKind, server: &str) -> Result<Vec<Hook>, RemoteError>;
}
