use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteStatus {
    Online,
    Offline,
    HttpError(u16),
}

impl SiteStatus {
    pub fn label(&self) -> String {
        match self {
            SiteStatus::Online => "Online".to_string(),
            SiteStatus::Offline => "Offline".to_string(),
            SiteStatus::HttpError(code) => format!("Error ({code})"),
        }
    }

}

/// The terminal verdict for one declared friend site. Exactly one of these
/// is produced per declared link; it is never revised once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub name: String,
    pub url: String,
    pub status: SiteStatus,
    pub backlink_found: bool,
    /// Where the backlink was spotted: "Homepage" or the friends-page URL,
    /// suffixed with " (rendered)" and/or " (OLD)" as applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backlink_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_snippet: Option<String>,
    pub legacy_match: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckOutcome {
    pub fn online(name: &str, url: &Url) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            status: SiteStatus::Online,
            backlink_found: false,
            backlink_location: None,
            html_snippet: None,
            legacy_match: false,
            error: None,
        }
    }

    pub fn offline(name: &str, url: &Url, error: String) -> Self {
        Self {
            status: SiteStatus::Offline,
            error: Some(error),
            ..Self::online(name, url)
        }
    }

    pub fn http_error(name: &str, url: &Url, code: u16) -> Self {
        Self {
            status: SiteStatus::HttpError(code),
            error: Some(format!("HTTP status code: {code}")),
            ..Self::online(name, url)
        }
    }
}
