use reqwest::Client;
use scraper::Html;
use tracing::{debug, info};
use url::Url;

use crate::error::CheckError;
use crate::fetch::{self, FetchedPage};
use crate::locate;
use crate::render::Renderer;
use crate::result::CheckOutcome;
use crate::scan::{self, BacklinkMatch, TargetIdentity};

/// Run the full backlink check for one declared friend site.
///
/// Stages run in a fixed order and the first one that finds a backlink
/// ends the check: homepage markup, then a located friends page, then that
/// page's rendered DOM. Each failure mode maps to exactly one terminal
/// outcome; nothing is retried.
pub async fn check_site(
    name: &str,
    url: &Url,
    target: &TargetIdentity,
    client: &Client,
    renderer: &Renderer,
) -> CheckOutcome {
    let FetchedPage {
        final_url, body, ..
    } = match fetch::fetch_page(client, url).await {
        Ok(page) => page,
        Err(CheckError::Transport(e)) => {
            return CheckOutcome::offline(name, url, e.to_string());
        }
        Err(CheckError::HttpStatus(code)) => {
            return CheckOutcome::http_error(name, url, code);
        }
        Err(e) => {
            // The site answered but the body was unusable.
            let mut outcome = CheckOutcome::online(name, url);
            outcome.error = Some(e.to_string());
            return outcome;
        }
    };

    let mut outcome = CheckOutcome::online(name, url);

    // The document is scanned and mined for a navigation link in one pass;
    // scraper documents cannot be held across awaits.
    let (homepage_hit, navigation_link) = {
        let homepage = Html::parse_document(&body);
        (
            scan::find_backlink(&homepage, target),
            scan::find_navigation_link(&homepage, &final_url),
        )
    };

    if let Some(hit) = homepage_hit {
        record_match(&mut outcome, hit, "Homepage", false);
        return outcome;
    }

    let Some(candidate) = locate::locate_candidate_page(client, navigation_link, &final_url).await
    else {
        // Nothing further to scan. A normal negative outcome, not a failure.
        debug!("[{name}] no friends page located");
        return outcome;
    };

    info!("[{name}] no backlink on homepage, trying friends page: {candidate}");

    let candidate_page = match fetch::fetch_page(client, &candidate).await {
        Ok(page) => page,
        Err(CheckError::Transport(e)) => {
            outcome.error = Some(format!("failed to fetch friends page: {e}"));
            return outcome;
        }
        Err(CheckError::HttpStatus(code)) => {
            outcome.error = Some(format!("friends page returned status code: {code}"));
            return outcome;
        }
        Err(e) => {
            outcome.error = Some(format!("friends page: {e}"));
            return outcome;
        }
    };

    let candidate_hit = {
        let document = Html::parse_document(&candidate_page.body);
        scan::find_backlink(&document, target)
    };
    if let Some(hit) = candidate_hit {
        record_match(&mut outcome, hit, candidate.as_str(), false);
        return outcome;
    }

    // Last resort: let the page run its scripts. Rendering is best-effort;
    // any failure here leaves the outcome a plain "not found".
    match renderer.fetch_rendered(&candidate).await {
        Ok(rendered) => {
            let rendered_hit = {
                let document = Html::parse_document(&rendered);
                scan::find_backlink(&document, target)
            };
            if let Some(hit) = rendered_hit {
                record_match(&mut outcome, hit, candidate.as_str(), true);
            }
        }
        Err(e) => {
            debug!("[{name}] rendered fetch failed: {e}");
        }
    }

    outcome
}

fn record_match(outcome: &mut CheckOutcome, hit: BacklinkMatch, location: &str, rendered: bool) {
    let mut location = location.to_string();
    if rendered {
        location.push_str(" (rendered)");
    }
    if hit.legacy {
        location.push_str(" (OLD)");
    }

    outcome.backlink_found = true;
    outcome.legacy_match = hit.legacy;
    outcome.html_snippet = Some(hit.snippet);
    outcome.backlink_location = Some(location);
}
