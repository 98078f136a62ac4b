//! Snippetbox - share short text snippets.
//!
//! A small server-rendered web application: visitors paste a snippet, pick
//! how long it should live, and get a page for it.
//!
//! # Architecture
//!
//! - **Store**: `SnippetStore` port with SQLite and in-memory implementations
//! - **Forms**: validation of the snippet creation form
//! - **Templates**: Tera pages composed from a base layout, partials and a
//!   page body, compiled once at startup
//! - **Routes**: one handler per page, wrapped by panic recovery, request
//!   logging and security headers
//!
//! # Routes
//!
//! ```text
//! GET  /                    latest snippets
//! GET  /snippet/view/{id}   one snippet
//! GET  /snippet/create      creation form
//! POST /snippet/create      submit the form
//! GET  /static/*            assets
//! ```
//!
//! # Security
//!
//! - All dynamic content is HTML-escaped by Tera
//! - Strict Content-Security-Policy, no scripts
//! - X-Frame-Options: deny prevents clickjacking

pub mod config;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod routes;
pub mod startup;
pub mod state;
pub mod store;
pub mod templates;

#[cfg(test)]
mod test_logs;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
