//! Application event handling.
//!
//! Processes results and notices sent by background tasks.

use crate::app::{App, AppEvent, FetchOutcome};

/// Apply one background event to the application state.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::FetchCompleted { generation, result } => {
            if !app.finish_fetch(generation, result) {
                return;
            }
            let summary = match &app.outcome {
                Some(FetchOutcome::Loaded { fetched, matches }) => {
                    tracing::debug!(fetched, matched = matches.len(), "Fetch results applied");
                    Some(format!("{} of {} entries matched", matches.len(), fetched))
                }
                Some(FetchOutcome::Failed(error)) => {
                    tracing::debug!(error = %error, "Fetch failure applied");
                    None
                }
                None => None,
            };
            if let Some(summary) = summary {
                app.set_status(summary);
            }
        }
        AppEvent::FeedRateLimited { delay_secs } => {
            app.set_status(format!("Rate limited by feed server (retrying in {}s)", delay_secs));
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.loading = false;
            app.fetch_handle = None;
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::feed::FeedEntry;
    use crate::filter::FilteredFeed;

    fn loading_app() -> (App, u64) {
        let mut app = App::new(&Config::default()).unwrap();
        app.keyword_input = "AGN".to_string();
        let generation = app.begin_fetch().unwrap().generation;
        (app, generation)
    }

    #[tokio::test]
    async fn test_fetch_completed_sets_outcome_and_status() {
        let (mut app, generation) = loading_app();
        let entries = vec![FeedEntry::new("AGN jets", "", "https://arxiv.org/abs/1")];
        handle_app_event(
            &mut app,
            AppEvent::FetchCompleted {
                generation,
                result: Ok(FilteredFeed { fetched: 30, entries }),
            },
        );
        assert!(!app.loading);
        assert_eq!(app.matches().len(), 1);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "1 of 30 entries matched");
    }

    #[tokio::test]
    async fn test_stale_completion_leaves_state_alone() {
        let (mut app, generation) = loading_app();
        handle_app_event(
            &mut app,
            AppEvent::FetchCompleted {
                generation: generation.wrapping_sub(1),
                result: Err("old".into()),
            },
        );
        assert!(app.loading);
        assert!(app.outcome.is_none());
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_recorded() {
        let (mut app, generation) = loading_app();
        handle_app_event(
            &mut app,
            AppEvent::FetchCompleted {
                generation,
                result: Err("Request timed out".into()),
            },
        );
        assert_eq!(app.outcome, Some(FetchOutcome::Failed("Request timed out".into())));
    }

    #[tokio::test]
    async fn test_rate_limit_notice() {
        let (mut app, _) = loading_app();
        handle_app_event(&mut app, AppEvent::FeedRateLimited { delay_secs: 4 });
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("retrying in 4s"));
        assert!(app.loading);
    }

    #[tokio::test]
    async fn test_task_panic_stops_loading() {
        let (mut app, _) = loading_app();
        handle_app_event(
            &mut app,
            AppEvent::TaskPanicked {
                task: "fetch",
                error: "boom".into(),
            },
        );
        assert!(!app.loading);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "Internal error in fetch task");
    }
}
