//! Route definitions.
//!
//! ## Routes
//!
//! - `GET /` - Latest snippets
//! - `GET /snippet/view/{id}` - One snippet
//! - `GET /snippet/create` - Creation form
//! - `POST /snippet/create` - Form submission
//! - `GET /static/*` - Stylesheets, images and other assets
//!
//! Anything else gets axum's default 404 or 405.

mod home;
mod snippets;

use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;

use crate::middleware;
use crate::state::AppState;

/// Build the complete application, middleware included.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&*state.static_dir);

    let app = Router::new()
        .route("/", get(home::home))
        .route("/snippet/view/{id}", get(snippets::snippet_view))
        .route(
            "/snippet/create",
            get(snippets::snippet_create).post(snippets::snippet_create_post),
        )
        .nest_service("/static", static_files)
        .with_state(state);

    middleware::apply(app)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, Response, header};

    use crate::state::AppState;
    use crate::store::{MemorySnippetStore, Snippet, SnippetStore, StoreError};
    use crate::templates::TemplateCache;

    /// Store whose every call fails as if the database were down.
    pub struct FailingStore;

    #[async_trait]
    impl SnippetStore for FailingStore {
        async fn insert(&self, _: &str, _: &str, _: i64) -> Result<i64, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn get(&self, _: i64) -> Result<Snippet, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }

        async fn latest(&self) -> Result<Vec<Snippet>, StoreError> {
            Err(StoreError::Database(sqlx::Error::PoolClosed))
        }
    }

    pub fn ui_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("ui")
    }

    pub fn app_with(store: Arc<dyn SnippetStore>) -> Router {
        let ui = ui_dir();
        let templates = TemplateCache::new(&ui).unwrap();
        super::router(AppState::new(store, templates, ui.join("static")))
    }

    pub fn app() -> (Router, Arc<MemorySnippetStore>) {
        let store = Arc::new(MemorySnippetStore::new());
        (app_with(store.clone()), store)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_string(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
