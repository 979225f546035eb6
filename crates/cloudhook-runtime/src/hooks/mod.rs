pub mod client;
pub mod error;
pub mod http_client;
pub mod registry;
pub mod service;
pub mod synchronizer;
pub mod types;

pub use client::RemoteHookClient;
pub use error::{PathResolutionError, RemoteError, RemoteErrorKind, VerbParseError};
pub use http_client::RestHookClient;
pub use registry::{FunctionTable, HookRegistry, TriggerTable};
pub use service::HookService;
pub use synchronizer::HookSynchronizer;
pub use types::{Hook, HookFunction, HookKind, HookTrigger, HookVerb, TriggerKey, TriggerType};
