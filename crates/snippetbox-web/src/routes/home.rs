//! Home page listing the latest snippets.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;

use crate::error::AppError;
use crate::state::AppState;
use crate::templates::TemplateData;

/// Render the latest non-expired snippets.
pub async fn home(State(state): State<AppState>) -> Result<Response, AppError> {
    let snippets = state.store.latest().await?;

    let data = TemplateData {
        snippets,
        ..TemplateData::new()
    };

    Ok(state.templates.render("home.html", StatusCode::OK, &data)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use crate::routes::test_support::*;
    use crate::store::SnippetStore;
    use crate::test_logs::CapturedLogs;

    #[tokio::test]
    async fn empty_home() {
        let (app, _) = app();
        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("There's nothing to see here yet!"));
    }

    #[tokio::test]
    async fn lists_live_snippets_newest_first() {
        let (app, store) = app();
        store.insert("First snippet", "one", 7).await.unwrap();
        store.insert("Second snippet", "two", 7).await.unwrap();
        let now = Utc::now();
        store.insert_at(
            "Expired snippet",
            "gone",
            now - Duration::days(2),
            now - Duration::days(1),
        );

        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        let first = body.find("First snippet").unwrap();
        let second = body.find("Second snippet").unwrap();
        assert!(second < first);
        assert!(!body.contains("Expired snippet"));
        assert!(body.contains(r#"href="/snippet/view/2""#));
    }

    #[tokio::test]
    async fn store_failure_is_500() {
        let app = app_with(Arc::new(FailingStore));
        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("Internal Server Error"));
    }

    #[tokio::test]
    async fn store_failure_log_names_the_request() {
        let (logs, _guard) = CapturedLogs::install();

        let app = app_with(Arc::new(FailingStore));
        let response = app.oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let line = logs.line_containing("store error").unwrap();
        assert!(line.contains("method=GET"), "{line}");
        assert!(line.contains("uri=/"), "{line}");
        assert!(line.contains("backtrace="), "{line}");
    }
}
