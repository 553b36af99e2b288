use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use url::Url;

/// One declared friend site, as it appears in the links file:
///
/// ```yaml
/// Some Friend:
///   link: "https://friend.example/"
///   avatar: "https://friend.example/avatar.png"
///   description: "writes about birds"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkEntry {
    pub link: Url,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub description: String,
}

/// Load the declared friend links, keyed by display name.
pub fn load_links(path: &Path) -> Result<BTreeMap<String, LinkEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read links file {}", path.display()))?;

    let links: BTreeMap<String, LinkEntry> = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    if links.is_empty() {
        bail!("no links declared in {}", path.display());
    }

    Ok(links)
}
