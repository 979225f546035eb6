use std::collections::HashSet;

use axum::extract::DefaultBodyLimit;
use axum::handler::Handler;
use axum::routing::post;
use axum::Router;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use cloudhook_runtime::{
    Hook, HookFunction, HookService, HookTrigger, PathResolver, ServerConfig, TriggerType,
};

use crate::server::{AppState, HEALTH_PATH};

/// A mounted hook route
#[derive(Debug, Clone)]
pub struct Route {
    /// Path the router serves the handler on
    pub path: String,
    /// External callback URL, absent when the path could not be resolved
    pub url: Option<String>,
    /// False when the path was rejected or already taken
    pub mounted: bool,
    pub hook: Hook,
}

/// Declares hook routes: mounts the handler and registers the hook with every
/// backend in the background.
///
/// Declaration never waits on the backends and never fails because of them;
/// the route is servable as soon as this returns.
pub struct RouteRegistrar {
    router: Router<AppState>,
    resolver: PathResolver,
    service: HookService,
    body_limit: usize,
    routes: Vec<Route>,
    mounted: HashSet<String>,
    tasks: Vec<JoinHandle<()>>,
}

impl RouteRegistrar {
    pub fn new(service: HookService, config: &ServerConfig) -> Self {
        Self {
            router: Router::new(),
            resolver: PathResolver::from_config(config),
            service,
            body_limit: config.body_limit_bytes,
            routes: Vec::new(),
            mounted: HashSet::from([HEALTH_PATH.to_string()]),
            tasks: Vec::new(),
        }
    }

    /// Declare a cloud function route
    pub fn function<H, T>(&mut self, name: &str, segments: &[&str], handler: H) -> Route
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        let template = Hook::Function(HookFunction::new(name, String::new()));
        self.declare(segments, template, handler)
    }

    /// Declare a trigger route; `class_name` is omitted for file and connect triggers
    pub fn trigger<H, T>(
        &mut self,
        class_name: Option<&str>,
        trigger_type: TriggerType,
        segments: &[&str],
        handler: H,
    ) -> Route
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        let template = Hook::Trigger(HookTrigger::new(class_name, trigger_type, String::new()));
        self.declare(segments, template, handler)
    }

    /// Mount `handler` for `segments` and start syncing `template` pointed at its URL
    pub fn declare<H, T>(&mut self, segments: &[&str], template: Hook, handler: H) -> Route
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        let path = match PathResolver::mount_path(segments) {
            Ok(path) => path,
            Err(e) => {
                let path = format!("/{}", segments.join("/"));
                error!(path = %path, hook = %template, error = %e, "Invalid hook route, not mounted");
                return self.record(path, None, false, template);
            }
        };

        if self.mounted.contains(&path) {
            error!(path = %path, hook = %template, "Hook route path already taken, not mounted");
            return self.record(path, None, false, template);
        }

        let url = match self.resolver.resolve(segments) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                error!(path = %path, hook = %template, error = %e, "Cannot resolve hook URL, skipping remote registration");
                None
            }
        };

        let hook = match &url {
            Some(url) => template.with_url(url.as_str()),
            None => template,
        };

        if url.is_some() {
            self.spawn_sync(hook.clone());
        }

        let router = std::mem::take(&mut self.router);
        self.router = router.route(
            &path,
            post(handler).layer(DefaultBodyLimit::max(self.body_limit)),
        );
        self.mounted.insert(path.clone());

        info!(path = %path, hook = %hook, "Hook route declared");

        self.record(path, url, true, hook)
    }

    fn record(&mut self, path: String, url: Option<String>, mounted: bool, hook: Hook) -> Route {
        let route = Route {
            path,
            url,
            mounted,
            hook,
        };
        self.routes.push(route.clone());
        route
    }

    fn spawn_sync(&mut self, hook: Hook) {
        let Ok(runtime) = Handle::try_current() else {
            warn!(hook = %hook, "No async runtime, hook will not be registered");
            return;
        };

        let service = self.service.clone();
        let handle = runtime.spawn(async move {
            let registered = service.register(&hook).await;
            let total = service.servers().len();
            if registered < total {
                warn!(hook = %hook, registered, total, "Hook registered on a subset of servers");
            } else {
                info!(hook = %hook, registered, "Hook registered on all servers");
            }
        });
        self.tasks.push(handle);
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn service(&self) -> &HookService {
        &self.service
    }

    /// Wait for every background registration started so far
    pub async fn wait_for_sync(&mut self) {
        self.take_pending().wait().await;
    }

    /// Detach the registrations started so far so they can be awaited after
    /// the router has been handed off
    pub fn take_pending(&mut self) -> PendingSync {
        PendingSync(std::mem::take(&mut self.tasks))
    }

    /// Hand the mounted routes to the application router.
    ///
    /// Outstanding registrations keep running detached.
    pub fn into_router(self) -> Router<AppState> {
        self.router
    }
}

/// Background registrations that have not been awaited yet
#[derive(Debug, Default)]
pub struct PendingSync(Vec<JoinHandle<()>>);

impl PendingSync {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub async fn wait(self) {
        for handle in self.0 {
            if let Err(e) = handle.await {
                error!(error = %e, "Hook registration task failed");
            }
        }
    }
}
