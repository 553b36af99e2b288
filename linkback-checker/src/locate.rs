use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::fetch;

/// Conventional friends-page locations, probed in this order when the
/// homepage navigation gives us nothing to follow.
const FALLBACK_PATHS: &[&str] = &[
    "/link/",
    "/links",
    "/friends",
    "/link",
    "/友链",
    "/links.html",
    "/friends.html",
];

/// Pick the one secondary page worth scanning for a backlink.
///
/// A navigation link discovered on the homepage wins outright (no probe),
/// unless it is a `javascript:` pseudo-link. Otherwise each conventional
/// path is HEAD-probed against the homepage's final URL and the first one
/// that answers 2xx-3xx is taken; probing stops there. `None` means there
/// is nothing further to scan for this site.
pub async fn locate_candidate_page(
    client: &Client,
    navigation_link: Option<Url>,
    base: &Url,
) -> Option<Url> {
    if let Some(nav) = navigation_link {
        if nav.scheme() != "javascript" {
            return Some(nav);
        }
        debug!("navigation link {nav} is a script pseudo-link, probing fallback paths");
    }

    for path in FALLBACK_PATHS {
        let Ok(candidate) = base.join(path) else {
            continue;
        };
        info!("probing possible friends page: {candidate}");
        if fetch::probe_exists(client, &candidate).await {
            return Some(candidate);
        }
    }

    None
}
