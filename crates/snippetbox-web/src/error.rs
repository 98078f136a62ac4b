//! Request-level error type.
//!
//! Every failure is rendered as a small HTML page carrying only the status
//! text. Server-side failures are logged with their full detail; the client
//! never sees it. These pages are built with maud rather than the template
//! cache so they still render when the cache is what failed.

use std::backtrace::Backtrace;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use maud::{DOCTYPE, Markup, html};

use crate::store::StoreError;
use crate::templates::TemplateError;

/// Errors a handler can end a request with.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request could not be understood (malformed body or field).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Nothing to show for the requested resource.
    #[error("not found")]
    NotFound,

    /// Snippet storage failed.
    #[error("store error: {0}")]
    Store(StoreError),

    /// Page rendering failed.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::BadRequest(reason) => tracing::debug!(reason = %reason, "rejected request"),
            Self::NotFound => {}
            Self::Store(err) => {
                tracing::error!(error = %err, backtrace = %Backtrace::capture(), "store error")
            }
            Self::Template(err) => {
                tracing::error!(error = %err, backtrace = %Backtrace::capture(), "template error")
            }
        }

        (status, status_page(status)).into_response()
    }
}

/// Generic page naming only the status, e.g. "Not Found".
pub fn status_page(status: StatusCode) -> Markup {
    let text = status.canonical_reason().unwrap_or("Error");

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (text) " - Snippetbox" }
                link rel="stylesheet" href="/static/css/main.css";
            }
            body {
                main class="error-page" {
                    h1 { (text) }
                    a href="/" { "Back to Snippetbox" }
                }
            }
        }
    }
}
