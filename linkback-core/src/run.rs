use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use linkback_checker::runner::ProgressCallback;
use linkback_checker::{CheckOutcome, CheckRunner, Renderer, TargetIdentity};
use tracing::info;
use url::Url;

use crate::config::LinkEntry;

/// Options for one full check run.
pub struct CheckOptions {
    pub links: BTreeMap<String, LinkEntry>,
    pub target_url: Url,
    pub legacy_url: Option<Url>,
    pub concurrency: usize,
    pub show_progress: bool,
}

/// Check every declared link and return the outcomes sorted by name.
///
/// The shared browser, if any worker ended up launching it, is closed here
/// before returning.
pub async fn execute_checks(options: CheckOptions) -> Result<Vec<CheckOutcome>> {
    let CheckOptions {
        links,
        target_url,
        legacy_url,
        concurrency,
        show_progress,
    } = options;

    let target = TargetIdentity::from_urls(&target_url, legacy_url.as_ref())?;
    let total = links.len();
    info!(
        "starting check of {total} declared links against {}",
        target.current_host()
    );

    let progress_bar = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Checking {total} links..."));
        Some(pb)
    } else {
        None
    };

    let mut runner = CheckRunner::new(concurrency);
    if let Some(pb) = &progress_bar {
        let pb = pb.clone();
        let done = Arc::new(AtomicUsize::new(0));
        let callback: ProgressCallback = Arc::new(move |name| {
            let count = done.fetch_add(1, Ordering::Relaxed) + 1;
            pb.set_message(format!("Checked {count}/{total}: {name}"));
        });
        runner = runner.with_progress_callback(callback);
    }

    let sites: Vec<(String, Url)> = links
        .into_iter()
        .map(|(name, entry)| (name, entry.link))
        .collect();

    let renderer = Arc::new(Renderer::new());
    let mut outcomes = runner.run(sites, target, renderer.clone()).await;
    renderer.shutdown().await;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    outcomes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(outcomes)
}
