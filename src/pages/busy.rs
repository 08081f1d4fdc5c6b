//! Busy indicator.
//!
//! A blocking overlay appears as soon as an operation starts; the spinner
//! only if it is still pending after the configured delay. Both are removed
//! when the last [`BusyGuard`] drops, whether the operation succeeded,
//! failed or was cancelled.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::{SharedPage, lock_page};
use crate::dom::{Element, ids};
use crate::error::Result;

fn overlay() -> Element {
    Element::new("div").id(ids::BUSY_OVERLAY).class("uk-overlay")
}

fn spinner(label: &str) -> Element {
    Element::new("div")
        .id(ids::BUSY_SPINNER)
        .class("uk-spinner")
        .attr("role", "status")
        .text(label)
}

#[derive(Debug)]
pub struct BusyGuard {
    page: SharedPage,
    settled: Arc<AtomicBool>,
    spinner: JoinHandle<()>,
}

impl BusyGuard {
    /// Mark `page` busy until the returned guard drops.
    pub fn start(page: &SharedPage, spinner_delay: Duration, label: &str) -> Self {
        {
            let mut locked = lock_page(page);
            locked.busy_count += 1;
            if locked.busy_count == 1 {
                locked.document.append_to_body(overlay());
            }
        }

        let settled = Arc::new(AtomicBool::new(false));
        let spinner = tokio::spawn({
            let page = page.clone();
            let settled = settled.clone();
            let label = label.to_string();
            async move {
                tokio::time::sleep(spinner_delay).await;
                let mut locked = lock_page(&page);
                if !settled.load(Ordering::SeqCst)
                    && locked.busy_count > 0
                    && !locked.document.contains_id(ids::BUSY_SPINNER)
                {
                    locked.document.append_to_body(spinner(&label));
                }
            }
        });

        Self {
            page: page.clone(),
            settled,
            spinner,
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.settled.store(true, Ordering::SeqCst);
        self.spinner.abort();

        let mut locked = lock_page(&self.page);
        locked.busy_count = locked.busy_count.saturating_sub(1);
        if locked.busy_count == 0 {
            locked.document.remove_by_id(ids::BUSY_SPINNER);
            locked.document.remove_by_id(ids::BUSY_OVERLAY);
        }
    }
}

/// Run `operation` with the page marked busy.
pub async fn with_busy<T, Fut>(
    page: &SharedPage,
    spinner_delay: Duration,
    label: &str,
    operation: Fut,
) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    let _guard = BusyGuard::start(page, spinner_delay, label);
    operation.await
}
