//! Helper functions for UI operations.
//!
//! Background task spawning and browser hand-off shared by the input and
//! loop modules.

use crate::app::{App, AppEvent, FetchRequest};
use crate::feed::HttpFeedSource;
use crate::filter::fetch_filtered;
use crate::util::validate_url_for_open;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of a spawned task silently disappearing, a panic becomes
/// `Err(panic_message)` so it can be reported as a status message.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else if let Some(e) = panic.downcast_ref::<Box<dyn std::error::Error + Send>>() {
                e.to_string()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Spawn the fetch-and-filter task for `request`.
///
/// Any fetch still running is aborted first. The result comes back as
/// [`AppEvent::FetchCompleted`] tagged with the request's generation.
pub(super) fn spawn_fetch(app: &mut App, request: FetchRequest, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(handle) = app.fetch_handle.take() {
        handle.abort();
        tracing::debug!("Aborted previous fetch task");
    }

    let source = HttpFeedSource::new(app.http_client.clone()).with_events(event_tx.clone());
    let tx = event_tx.clone();
    let FetchRequest {
        generation,
        url,
        keywords,
        mode,
    } = request;

    tracing::debug!(feed = %url, keywords = %keywords, mode = %mode, generation, "Spawning fetch task");

    app.fetch_handle = Some(tokio::spawn(async move {
        let outcome = catch_task_panic(fetch_filtered(&source, &url, &keywords, mode)).await;
        let event = match outcome {
            Ok(result) => {
                if let Err(e) = &result {
                    tracing::warn!(feed = %url, error = %e, "Fetch failed");
                }
                AppEvent::FetchCompleted {
                    generation,
                    result: result.map_err(|e| e.to_string()),
                }
            }
            Err(panic_msg) => {
                tracing::error!(task = "fetch", error = %panic_msg, "Fetch task panicked");
                AppEvent::TaskPanicked {
                    task: "fetch",
                    error: panic_msg,
                }
            }
        };

        if let Err(e) = tx.send(event).await {
            tracing::warn!(error = %e, "Failed to send fetch result (receiver dropped)");
        }
    }));
}

/// Open the selected entry's link in the system browser.
pub(super) fn open_selected(app: &mut App) {
    let Some(entry) = app.selected_entry() else {
        app.set_status("No entry selected");
        return;
    };

    // Links come from the feed; only http(s) reaches the OS opener
    let message = match validate_url_for_open(&entry.link) {
        Err(e) => format!("Cannot open link: {}", e),
        Ok(url) => match open::that(url.as_str()) {
            Ok(()) => format!("Opening {}", url),
            Err(e) => format!("Failed to open browser: {}", e),
        },
    };
    app.set_status(message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catch_task_panic_passes_value_through() {
        assert_eq!(catch_task_panic(async { 42 }).await, Ok(42));
    }

    fn fail_with<P: std::any::Any + Send + 'static>(payload: P) -> u32 {
        std::panic::panic_any(payload)
    }

    #[tokio::test]
    async fn test_catch_task_panic_reports_message() {
        let result = catch_task_panic(async { fail_with("feed parser exploded") }).await;
        assert_eq!(result, Err("feed parser exploded".to_string()));

        let owned = catch_task_panic(async { fail_with(format!("{} entries", 3)) }).await;
        assert_eq!(owned, Err("3 entries".to_string()));
    }

    #[tokio::test]
    async fn test_open_selected_without_results() {
        let mut app = App::new(&crate::config::Config::default()).unwrap();
        open_selected(&mut app);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "No entry selected");
    }
}
