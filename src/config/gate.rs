use serde::{Deserialize, Serialize};

/// Session gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    /// Path prefixes (without the leading `/`) that bypass the gate entirely.
    #[serde(default = "default_excluded_paths")]
    pub excluded_paths: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            excluded_paths: default_excluded_paths(),
        }
    }
}

impl GateConfig {
    /// Whether `path` bypasses the gate.
    pub fn is_excluded(&self, path: &str) -> bool {
        let trimmed = path.trim_start_matches('/');
        self.excluded_paths
            .iter()
            .any(|prefix| !prefix.is_empty() && trimmed.starts_with(prefix.trim_start_matches('/')))
    }
}

fn default_excluded_paths() -> Vec<String> {
    ["_next/static", "_next/image", "favicon.ico", "sitemap.xml", "robots.txt"]
        .into_iter()
        .map(String::from)
        .collect()
}
