// Report rendering: terminal table, markdown file, JSON file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use colored::Colorize;
use linkback_checker::{CheckOutcome, SiteStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Print the outcome table to the terminal. Expects the outcomes to be
/// sorted already.
pub fn print_table(outcomes: &[CheckOutcome], target_url: &str) {
    println!(
        "\nLooking for backlinks to '{}'\n",
        target_url.bright_white().bold()
    );

    println!(
        "{:<22} {:<42} {:<12} {:<11} DETAILS",
        "NAME", "URL", "STATUS", "BACKLINK"
    );
    println!("{}", "=".repeat(110));

    for outcome in outcomes {
        let status = pad_colored(&outcome.status.label(), 12, |s| match outcome.status {
            SiteStatus::Online => s.green(),
            SiteStatus::Offline => s.red(),
            SiteStatus::HttpError(_) => s.yellow(),
        });
        let backlink = if outcome.backlink_found {
            pad_colored("Found", 11, |s| s.green())
        } else {
            pad_colored("Not Found", 11, |s| s.red())
        };

        println!(
            "{:<22} {:<42} {} {} {}",
            truncate(&outcome.name, 22),
            truncate(&outcome.url, 42),
            status,
            backlink,
            describe(outcome),
        );
    }

    let found = outcomes.iter().filter(|o| o.backlink_found).count();
    println!(
        "\nSummary: {} of {} sites link back",
        found.to_string().bright_white().bold(),
        outcomes.len()
    );
    println!(
        "{}",
        "Automated checks can misjudge a page; please verify flagged sites by hand.".dimmed()
    );
}

/// Generate the markdown report body.
pub fn generate_markdown_report(outcomes: &[CheckOutcome], target_url: &str) -> String {
    let mut report = String::new();

    report.push_str("# Friend Link Check Report\n\n");
    report.push_str(&format!("**Target:** {}  \n", target_url));
    report.push_str(&format!(
        "**Generated:** {}  \n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    report.push_str(&format!("**Total links:** {}\n\n", outcomes.len()));

    report.push_str("## Results\n\n");
    report.push_str("| Name | URL | Status | Backlink | Details |\n");
    report.push_str("|------|-----|--------|----------|---------|\n");

    for outcome in outcomes {
        let status = match outcome.status {
            SiteStatus::Online => "✅ Online".to_string(),
            SiteStatus::Offline => "❌ Offline".to_string(),
            SiteStatus::HttpError(_) => format!("⚠️ {}", outcome.status.label()),
        };
        let backlink = if outcome.backlink_found {
            "✅ Found"
        } else {
            "❌ Not Found"
        };

        let details = if outcome.backlink_found {
            let location = outcome.backlink_location.as_deref().unwrap_or("");
            let snippet = flatten(outcome.html_snippet.as_deref().unwrap_or(""));
            format!(
                "Location: {}<br>Snippet: `{}`",
                escape_pipes(location),
                escape_pipes(&truncate(&snippet, 60))
            )
        } else {
            match &outcome.error {
                Some(error) => escape_pipes(&flatten(error)),
                None => "N/A".to_string(),
            }
        };

        report.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            escape_pipes(&outcome.name),
            escape_pipes(&outcome.url),
            status,
            backlink,
            details
        ));
    }

    report.push_str("\n---\n");
    report.push_str(
        "*Automated checks can misjudge a page; please verify flagged sites by hand.*\n",
    );

    report
}

/// Generate the JSON report body.
pub fn generate_json_report(
    outcomes: &[CheckOutcome],
    target_url: &str,
) -> Result<String, serde_json::Error> {
    let report = serde_json::json!({
        "report": {
            "generator": "linkback",
            "version": env!("CARGO_PKG_VERSION"),
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "target": target_url,
            "summary": {
                "total_links": outcomes.len(),
                "backlinks_found": outcomes.iter().filter(|o| o.backlink_found).count(),
                "offline": outcomes
                    .iter()
                    .filter(|o| o.status == SiteStatus::Offline)
                    .count(),
            },
            "results": outcomes,
        }
    });

    serde_json::to_string_pretty(&report)
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn describe(outcome: &CheckOutcome) -> String {
    if outcome.backlink_found {
        let location = outcome.backlink_location.as_deref().unwrap_or("");
        let snippet = flatten(outcome.html_snippet.as_deref().unwrap_or(""));
        format!(
            "On: {}  Snippet: {}",
            truncate_keeping_tail(location, 40),
            truncate(&snippet, 60)
        )
    } else {
        match &outcome.error {
            Some(error) => flatten(error),
            None => "N/A".to_string(),
        }
    }
}

/// Pad to `width` first, colorize after, so ANSI escapes do not throw the
/// column widths off.
fn pad_colored(
    label: &str,
    width: usize,
    colorize: impl Fn(&str) -> colored::ColoredString,
) -> String {
    let padded = format!("{label:<width$}");
    colorize(&padded).to_string()
}

fn flatten(s: &str) -> String {
    s.replace('\n', " ")
}

fn escape_pipes(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Char-boundary-safe truncation; declared names and snippets are often
/// not ASCII.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Truncation that keeps the end of the string; the interesting part of a
/// long URL is its path.
fn truncate_keeping_tail(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        return s.to_string();
    }
    let tail: String = s.chars().skip(count - max.saturating_sub(3)).collect();
    format!("...{tail}")
}
