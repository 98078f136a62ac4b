//! Middleware applied to every request.
//!
//! Outermost to innermost:
//!
//! 1. [`request_context`]: opens the `http_request` span carrying method, URI
//!    and remote address. It only instruments; everything below, panic
//!    recovery included, logs inside it.
//! 2. [`handle_panic`]: turns a panicking handler into a 500 and closes the
//!    connection instead of reusing it.
//! 3. Request logging: a "received request" event before the handler runs,
//!    plus tower-http's response and failure events.
//! 4. [`set_common_headers`]: fixed security headers on every response.

use std::any::Any;
use std::backtrace::Backtrace;
use std::net::SocketAddr;

use axum::Router;
use axum::body::Body;
use axum::extract::{ConnectInfo, Request};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, Level, Span};

use crate::error::status_page;

/// Content-Security-Policy for all pages. Styles and fonts come from
/// `/static` and Google Fonts; no scripts are needed.
pub const CSP_HEADER: &str =
    "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com";

/// Wrap `router` in the full middleware chain.
pub fn apply(router: Router) -> Router {
    router
        .layer(axum::middleware::map_response(set_common_headers))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(current_span)
                .on_request(log_request),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(axum::middleware::from_fn(request_context))
}

/// Run the rest of the chain inside the request's `http_request` span.
pub async fn request_context(request: Request, next: Next) -> Response {
    let span = request_span(&request);
    next.run(request).instrument(span).await
}

/// Add the fixed security headers to a response.
pub async fn set_common_headers(mut response: Response) -> Response {
    insert_common_headers(response.headers_mut());
    response
}

fn insert_common_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CSP_HEADER),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("origin-when-cross-origin"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("deny"));
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("0"));
}

fn request_span(request: &Request) -> Span {
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::span!(
        Level::INFO,
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        remote_addr = %remote_addr,
    )
}

/// The trace layer logs into the span opened by [`request_context`].
fn current_span(_request: &Request<Body>) -> Span {
    Span::current()
}

fn log_request(_request: &Request<Body>, _span: &Span) {
    tracing::info!("received request");
}

/// Convert a handler panic into a generic 500.
///
/// Runs inside the request span, so the log carries method and URI. The
/// connection is closed afterwards; keep-alive state may be corrupt.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };

    tracing::error!(
        panic = %detail,
        backtrace = %Backtrace::capture(),
        "handler panicked"
    );

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let mut response = (
        status,
        [(header::CONNECTION, "close")],
        status_page(status),
    )
        .into_response();
    insert_common_headers(response.headers_mut());
    response
}
