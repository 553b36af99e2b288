use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::error::{CheckError, Result};

/// Anchor labels that conventionally point at a blogroll / friends page.
/// Substring match, case-insensitive.
const FRIEND_PAGE_KEYWORDS: &[&str] = &[
    "友链", "友人", "朋友", "链接", "links", "friends", "partners",
];

/// The hosts a discovered hyperlink may point at to count as a backlink.
/// Derived once per run from the CLI arguments; hosts are compared
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct TargetIdentity {
    current_host: String,
    legacy_host: Option<String>,
}

impl TargetIdentity {
    pub fn from_urls(current: &Url, legacy: Option<&Url>) -> Result<Self> {
        let current_host = current
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| CheckError::InvalidUrl(format!("{current} has no host")))?
            .to_ascii_lowercase();

        let legacy_host = legacy
            .and_then(|url| url.host_str())
            .map(|h| h.to_ascii_lowercase());

        Ok(Self {
            current_host,
            legacy_host,
        })
    }

    pub fn current_host(&self) -> &str {
        &self.current_host
    }

    /// `Some(false)` for a current-domain match, `Some(true)` for a
    /// legacy-domain match, `None` otherwise. The current domain is always
    /// tried first.
    pub fn classify(&self, host: &str) -> Option<bool> {
        if host.eq_ignore_ascii_case(&self.current_host) {
            return Some(false);
        }
        if let Some(legacy) = &self.legacy_host
            && host.eq_ignore_ascii_case(legacy)
        {
            return Some(true);
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct BacklinkMatch {
    /// Serialized markup of the matching anchor.
    pub snippet: String,
    pub legacy: bool,
}

/// Scan a parsed document for an anchor pointing back at the target.
///
/// Anchors are visited in document order through scraper's lazy selector
/// iterator and the first qualifying one wins; there is no attempt to rank
/// matches. Hrefs that do not parse as absolute URLs (including relative
/// ones, which cannot reach a foreign host anyway) are skipped.
pub fn find_backlink(document: &Html, target: &TargetIdentity) -> Option<BacklinkMatch> {
    let selector = Selector::parse("a[href]").unwrap();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(parsed) = Url::parse(href) else {
            continue;
        };
        let Some(host) = parsed.host_str() else {
            continue;
        };
        if let Some(legacy) = target.classify(host) {
            debug!("backlink anchor found: {href}");
            return Some(BacklinkMatch {
                snippet: element.html(),
                legacy,
            });
        }
    }

    None
}

/// Find the first anchor whose visible text looks like a friends-page label
/// and resolve its href against `base`. Returns the first match in document
/// order, even when a later anchor would be a better fit.
pub fn find_navigation_link(document: &Html, base: &Url) -> Option<Url> {
    let selector = Selector::parse("a").unwrap();

    for element in document.select(&selector) {
        let text = element.text().collect::<String>().to_lowercase();
        if !FRIEND_PAGE_KEYWORDS
            .iter()
            .any(|keyword| text.contains(keyword))
        {
            continue;
        }
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Ok(resolved) = base.join(href) {
            debug!("navigation link candidate: {resolved}");
            return Some(resolved);
        }
    }

    None
}
