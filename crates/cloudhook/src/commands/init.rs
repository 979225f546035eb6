use anyhow::Result;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# cloudhook configuration

[server]
# Where the backends reach this process
scheme = "http"
host = "localhost"
port = 8081
bind = "127.0.0.1"
body_limit_bytes = 16384

[backend]
urls = ["http://localhost:1337/parse"]
application_id = "applicationId"
# Prefer CLOUDHOOK_PRIMARY_KEY / CLOUDHOOK_WEBHOOK_KEY for secrets
primary_key = ""
# webhook_key = ""
request_timeout_secs = 10
delete_hooks_on_shutdown = true
"#;

/// Initialize a new config file
pub fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config already exists at {:?}", path);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG)?;
    println!("Created config at {:?}", path);
    Ok(())
}
