use std::sync::Arc;

use reqwest::Client;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info};
use url::Url;

use crate::check;
use crate::fetch;
use crate::render::Renderer;
use crate::result::CheckOutcome;
use crate::scan::TargetIdentity;

/// Called with the site name each time a check completes.
pub type ProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Fans the per-site check out over every declared link with bounded
/// parallelism. One outcome per input, always; a site that fails still
/// reports.
pub struct CheckRunner {
    client: Client,
    concurrency: usize,
    progress_callback: Option<ProgressCallback>,
}

impl CheckRunner {
    pub fn new(concurrency: usize) -> Self {
        Self {
            client: fetch::build_client(),
            concurrency: concurrency.max(1),
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check every site and return the outcomes in completion order; the
    /// caller sorts for presentation.
    pub async fn run(
        &self,
        sites: Vec<(String, Url)>,
        target: TargetIdentity,
        renderer: Arc<Renderer>,
    ) -> Vec<CheckOutcome> {
        let total = sites.len();
        info!(
            "checking {total} links, {} at a time",
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let (tx, mut rx) = mpsc::channel(total.max(1));
        let target = Arc::new(target);

        for (name, url) in sites {
            let semaphore = semaphore.clone();
            let client = self.client.clone();
            let target = target.clone();
            let renderer = renderer.clone();
            let tx = tx.clone();

            tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore never closes");
                debug!("[{name}] starting check");
                let outcome = check::check_site(&name, &url, &target, &client, &renderer).await;
                // Send fails only if the runner itself went away.
                let _ = tx.send(outcome).await;
            });
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = rx.recv().await {
            if let Some(callback) = &self.progress_callback {
                callback(outcome.name.clone());
            }
            outcomes.push(outcome);
        }

        debug_assert_eq!(outcomes.len(), total);
        outcomes
    }
}
