use crate::cli::{HookCommands, HookTarget, KindArg};
use anyhow::{Context, Result};
use cloudhook_runtime::{
    Config, Hook, HookFunction, HookKind, HookService, HookTrigger, HookVerb, TriggerType,
};
use serde_json::{json, Value};

pub async fn execute(action: HookCommands, config: &Config) -> Result<()> {
    let service = HookService::from_config(&config.backend)?;

    match action {
        HookCommands::List { kind } => {
            let kind = match kind {
                KindArg::Functions => HookKind::Function,
                KindArg::Triggers => HookKind::Trigger,
            };
            let mut report = serde_json::Map::new();
            for (server, result) in service.fetch_all(kind).await {
                let entry = match result {
                    Ok(hooks) => Value::Array(hooks.iter().map(hook_json).collect()),
                    Err(e) => json!({ "error": e.to_string() }),
                };
                report.insert(server, entry);
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        HookCommands::Apply { verb, target } => {
            let verb: HookVerb = verb.parse()?;
            let hook = build_hook(verb, target)?;
            let results = service
                .synchronizer()
                .synchronize(verb, &hook, service.servers())
                .await;

            let report: serde_json::Map<String, Value> = service
                .servers()
                .iter()
                .map(|server| {
                    let entry = match results.get(server) {
                        Some(hook) => hook_json(hook),
                        None if verb == HookVerb::Delete => json!("done, see logs"),
                        None => json!({ "error": "failed, see logs" }),
                    };
                    (server.clone(), entry)
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn build_hook(verb: HookVerb, target: HookTarget) -> Result<Hook> {
    let callback = |url: Option<String>| -> Result<String> {
        match url.filter(|u| !u.trim().is_empty()) {
            Some(url) => Ok(url),
            None if matches!(verb, HookVerb::Create | HookVerb::Update) => {
                anyhow::bail!("--url is required to {} a hook", verb)
            }
            None => Ok(String::new()),
        }
    };

    match target {
        HookTarget::Function { name, url } => {
            Ok(Hook::Function(HookFunction::new(name, callback(url)?)))
        }
        HookTarget::Trigger {
            class,
            trigger,
            url,
        } => {
            let trigger_type: TriggerType = trigger
                .parse()
                .context("Invalid --trigger value")?;
            Ok(Hook::Trigger(HookTrigger::new(
                class.as_deref(),
                trigger_type,
                callback(url)?,
            )))
        }
    }
}

fn hook_json(hook: &Hook) -> Value {
    match hook {
        Hook::Function(f) => json!({ "functionName": f.name, "url": f.url }),
        Hook::Trigger(t) => json!({
            "className": t.wire_class(),
            "triggerName": t.trigger_type.as_str(),
            "url": t.url,
        }),
    }
}
