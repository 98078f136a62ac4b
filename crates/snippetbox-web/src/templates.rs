//! Template page cache.
//!
//! Every page under `html/pages/` is composed once at startup with the shared
//! base layout (`html/base.html`) and all partials (`html/partials/*.html`),
//! in that order. Pages `{% extends "base.html" %}` and fill the named blocks
//! it declares; partials are pulled in by the base with
//! `{% include "partials/<name>" %}`.
//!
//! The cache is read-only once built and is shared between requests without
//! locking. Template changes need a restart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use tera::{Context, Tera};

use crate::forms::SnippetCreateForm;
use crate::store::Snippet;

/// Name the base layout is registered under.
pub const BASE_TEMPLATE: &str = "base.html";

/// Pages the handlers render; startup fails if any is absent.
pub const REQUIRED_PAGES: [&str; 3] = ["home.html", "view.html", "create.html"];

const TEMPLATE_EXTENSION: &str = "html";

/// Template discovery, composition and rendering errors.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("failed to list templates in {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("required page template {0} is missing")]
    MissingPage(String),

    #[error("the template {0} does not exist")]
    UnknownPage(String),

    #[error("failed to compose {page}: {source:?}")]
    Compose {
        page: String,
        #[source]
        source: tera::Error,
    },

    #[error("failed to render {page}: {source:?}")]
    Render {
        page: String,
        #[source]
        source: tera::Error,
    },
}

/// Everything a page can draw on.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateData {
    pub current_year: i32,
    pub snippet: Option<Snippet>,
    pub snippets: Vec<Snippet>,
    pub form: Option<SnippetCreateForm>,
}

impl TemplateData {
    pub fn new() -> Self {
        Self {
            current_year: Utc::now().year(),
            snippet: None,
            snippets: Vec::new(),
            form: None,
        }
    }
}

impl Default for TemplateData {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiled pages keyed by file name (e.g. `home.html`).
#[derive(Debug)]
pub struct TemplateCache {
    pages: HashMap<String, Tera>,
}

impl TemplateCache {
    /// Discover and compile every page under `ui_dir/html`.
    pub fn new(ui_dir: &Path) -> Result<Self, TemplateError> {
        let html_dir = ui_dir.join("html");
        let base = html_dir.join(BASE_TEMPLATE);
        let partials = list_templates(&html_dir.join("partials"))?;
        let pages = list_templates(&html_dir.join("pages"))?;

        let mut cache = HashMap::with_capacity(pages.len());
        for page in &pages {
            let name = file_name(page);
            let tera = compose(&base, &partials, page).map_err(|source| {
                TemplateError::Compose {
                    page: name.clone(),
                    source,
                }
            })?;
            cache.insert(name, tera);
        }

        if let Some(missing) = REQUIRED_PAGES.iter().find(|p| !cache.contains_key(**p)) {
            return Err(TemplateError::MissingPage((*missing).to_string()));
        }

        tracing::info!(
            dir = %ui_dir.display(),
            pages = cache.len(),
            partials = partials.len(),
            "template cache built"
        );

        Ok(Self { pages: cache })
    }

    /// Names of all cached pages, sorted.
    pub fn page_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Render `page` into a complete HTML response with `status`.
    ///
    /// The page is rendered into a buffer first; a failure part way through
    /// leaves nothing written and is returned as an error instead.
    pub fn render(
        &self,
        page: &str,
        status: StatusCode,
        data: &TemplateData,
    ) -> Result<Response, TemplateError> {
        let tera = self
            .pages
            .get(page)
            .ok_or_else(|| TemplateError::UnknownPage(page.to_string()))?;

        let render_error = |source| TemplateError::Render {
            page: page.to_string(),
            source,
        };

        let context = Context::from_serialize(data).map_err(render_error)?;
        let mut buffer = Vec::new();
        tera.render_to(page, &context, &mut buffer)
            .map_err(render_error)?;

        Ok((status, Html(buffer)).into_response())
    }
}

/// Compose one page: base layout first, then partials, then the page itself.
///
/// Blocks defined by the page override same-named blocks of the base.
pub fn compose(base: &Path, partials: &[PathBuf], page: &Path) -> Result<Tera, tera::Error> {
    let mut files: Vec<(PathBuf, Option<String>)> = Vec::with_capacity(partials.len() + 2);
    files.push((base.to_path_buf(), Some(BASE_TEMPLATE.to_string())));
    for partial in partials {
        files.push((
            partial.clone(),
            Some(format!("partials/{}", file_name(partial))),
        ));
    }
    files.push((page.to_path_buf(), Some(file_name(page))));

    let mut tera = Tera::default();
    tera.register_filter("human_date", human_date_filter);
    tera.add_template_files(files)?;
    Ok(tera)
}

/// Format a timestamp the way pages display it, e.g. `02 Jan 2006 at 15:04`.
pub fn human_date(time: &DateTime<Utc>) -> String {
    time.format("%d %b %Y at %H:%M").to_string()
}

fn human_date_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let raw = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("human_date expects a timestamp string"))?;
    let time = DateTime::parse_from_rfc3339(raw)
        .map_err(|e| tera::Error::msg(format!("invalid timestamp {raw:?}: {e}")))?;
    Ok(tera::Value::String(human_date(&time.with_timezone(&Utc))))
}

/// Template files directly inside `dir`, sorted by name.
fn list_templates(dir: &Path) -> Result<Vec<PathBuf>, TemplateError> {
    let io_error = |source| TemplateError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
