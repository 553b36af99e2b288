use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use url::Url;

use linkback_core::config;
use linkback_core::report::{self, ReportFormat};
use linkback_core::run::{CheckOptions, execute_checks};

/// Expand a leading `~` in the links-file argument the way a shell would.
pub fn resolve_links_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub async fn handle_check(matches: &ArgMatches) -> Result<()> {
    tracing_subscriber::fmt::init();

    let file = matches.get_one::<String>("file").expect("defaulted");
    let target_url = matches.get_one::<Url>("url").expect("required").clone();
    let legacy_url = matches.get_one::<Url>("old-url").cloned();
    let concurrency = *matches.get_one::<usize>("concurrency").expect("defaulted");
    let output = matches
        .get_one::<PathBuf>("output")
        .expect("defaulted")
        .clone();
    let format = matches.get_one::<String>("format").expect("defaulted");
    let format = ReportFormat::from_str(format)
        .ok_or_else(|| anyhow!("unknown report format: {format}"))?;
    let quiet = matches.get_flag("quiet");

    let links_path = resolve_links_path(file);
    let links = config::load_links(&links_path)?;

    if !quiet {
        println!(
            "Checking {} declared links against {}",
            links.len(),
            target_url.as_str().bright_white()
        );
    }

    let outcomes = execute_checks(CheckOptions {
        links,
        target_url: target_url.clone(),
        legacy_url,
        concurrency,
        show_progress: !quiet,
    })
    .await?;

    report::print_table(&outcomes, target_url.as_str());

    let content = match format {
        ReportFormat::Markdown => report::generate_markdown_report(&outcomes, target_url.as_str()),
        ReportFormat::Json => report::generate_json_report(&outcomes, target_url.as_str())
            .context("failed to serialize the JSON report")?,
    };
    report::save_report(&content, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "\nReport written to {}",
        output.display().to_string().bright_white()
    );

    Ok(())
}
