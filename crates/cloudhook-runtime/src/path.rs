use reqwest::Url;

use crate::config::ServerConfig;
use crate::hooks::PathResolutionError;

/// Turns route path segments into the callback URL the backend should call.
///
/// Holds only the configured scheme/host/port; resolution is pure and is
/// validated on every call so a bad host surfaces per route, not at startup.
#[derive(Debug, Clone)]
pub struct PathResolver {
    scheme: String,
    host: String,
    port: u16,
}

impl PathResolver {
    pub fn new(scheme: &str, host: &str, port: u16) -> Self {
        Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(&config.scheme, &config.host, config.port)
    }

    /// Router mount path for the segments, e.g. `/hooks/hello`
    pub fn mount_path(segments: &[&str]) -> Result<String, PathResolutionError> {
        if segments.is_empty() {
            return Err(PathResolutionError::Empty);
        }
        let mut path = String::new();
        for segment in segments {
            validate_segment(segment)?;
            path.push('/');
            path.push_str(segment);
        }
        Ok(path)
    }

    /// Fully-qualified external URL for the segments
    pub fn resolve(&self, segments: &[&str]) -> Result<Url, PathResolutionError> {
        let path = Self::mount_path(segments)?;
        let base = format!("{}://{}:{}", self.scheme, self.host, self.port);

        let mut url = Url::parse(&base).map_err(|e| PathResolutionError::InvalidBase {
            url: base.clone(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(PathResolutionError::InvalidBase {
                url: base,
                reason: "missing host".to_string(),
            });
        }
        url.set_path(&path);
        Ok(url)
    }
}

fn validate_segment(segment: &str) -> Result<(), PathResolutionError> {
    let illegal = |c: char| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '{' | '}' | '\\');
    // Leading `:` and `*` are route capture syntax to the router
    if segment.is_empty() || segment.starts_with([':', '*']) || segment.contains(illegal) {
        return Err(PathResolutionError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}
