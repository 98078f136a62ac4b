//! Snippet view and creation handlers.

use axum::extract::rejection::{FormRejection, PathRejection};
use axum::extract::{Form, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

use crate::error::AppError;
use crate::forms::{SnippetCreateForm, SnippetCreateInput};
use crate::state::AppState;
use crate::templates::TemplateData;

/// Show one snippet.
///
/// An id that is not a non-negative integer gets the same 404 as an id with
/// no live snippet behind it.
pub async fn snippet_view(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let id = path
        .ok()
        .and_then(|Path(raw)| raw.parse::<i64>().ok())
        .filter(|id| *id >= 0)
        .ok_or(AppError::NotFound)?;

    let snippet = state.store.get(id).await?;

    let data = TemplateData {
        snippet: Some(snippet),
        ..TemplateData::new()
    };

    Ok(state.templates.render("view.html", StatusCode::OK, &data)?)
}

/// Show a blank creation form.
pub async fn snippet_create(State(state): State<AppState>) -> Result<Response, AppError> {
    let data = TemplateData {
        form: Some(SnippetCreateForm::default()),
        ..TemplateData::new()
    };

    Ok(state.templates.render("create.html", StatusCode::OK, &data)?)
}

/// Accept a creation form.
///
/// Malformed bodies and non-integer `expires` values are rejected outright.
/// Field rule violations re-render the form with a 400, keeping what the user
/// typed. Success redirects to the new snippet.
pub async fn snippet_create_post(
    State(state): State<AppState>,
    input: Result<Form<SnippetCreateInput>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(input) = input.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let expires = input
        .expires
        .parse::<i64>()
        .map_err(|e| AppError::BadRequest(format!("expires {:?}: {e}", input.expires)))?;

    let form = SnippetCreateForm::validate(input.title, input.content, expires);
    if !form.is_valid() {
        tracing::debug!(errors = ?form.field_errors, "snippet form rejected");
        let data = TemplateData {
            form: Some(form),
            ..TemplateData::new()
        };
        return Ok(state
            .templates
            .render("create.html", StatusCode::BAD_REQUEST, &data)?);
    }

    let id = state
        .store
        .insert(&form.title, &form.content, form.expires)
        .await?;

    tracing::info!(id, expires_in_days = form.expires, "snippet created");

    Ok(Redirect::to(&format!("/snippet/view/{id}")).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{StatusCode, header};
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    use crate::routes::test_support::*;
    use crate::store::SnippetStore;

    const HAIKU: &str = "O snail\nClimb Mount Fuji,\nBut slowly, slowly!";

    #[tokio::test]
    async fn view_existing_snippet() {
        let (app, store) = app();
        let id = store.insert("0 snail", HAIKU, 7).await.unwrap();

        let response = app
            .oneshot(get(&format!("/snippet/view/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains("0 snail"));
        assert!(body.contains("Climb Mount Fuji,"));
        assert!(body.contains(&format!("#{id}")));
    }

    #[tokio::test]
    async fn view_missing_and_expired_look_identical() {
        let (app, store) = app();
        let now = Utc::now();
        let expired =
            store.insert_at("old", "old", now - Duration::days(8), now - Duration::days(1));

        let missing = app
            .clone()
            .oneshot(get("/snippet/view/999999"))
            .await
            .unwrap();
        let gone = app
            .oneshot(get(&format!("/snippet/view/{expired}")))
            .await
            .unwrap();

        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(missing).await, body_string(gone).await);
    }

    #[tokio::test]
    async fn view_malformed_ids_are_not_found() {
        let (app, _) = app();
        for id in ["-1", "abc", "1.5", "%FF"] {
            let response = app
                .clone()
                .oneshot(get(&format!("/snippet/view/{id}")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "id={id}");
        }
    }

    #[tokio::test]
    async fn view_store_failure_is_500() {
        let app = app_with(Arc::new(FailingStore));
        let response = app.oneshot(get("/snippet/view/1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn create_form_is_blank() {
        let (app, _) = app();
        let response = app.oneshot(get("/snippet/create")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_string(response).await;
        assert!(body.contains(r#"<form action="/snippet/create" method="POST">"#));
        assert!(body.contains(r#"value="365" checked"#));
    }

    #[tokio::test]
    async fn create_valid_redirects_to_new_snippet() {
        let (app, store) = app();
        let response = app
            .oneshot(post_form(
                "/snippet/create",
                "title=0+snail&content=O+snail%0AClimb+Mount+Fuji&expires=7",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/snippet/view/1");
        assert_eq!(store.len(), 1);

        let snippet = store.get(1).await.unwrap();
        assert_eq!(snippet.title, "0 snail");
        assert_eq!(snippet.content, "O snail\nClimb Mount Fuji");
        assert_eq!((snippet.expires - snippet.created).num_days(), 7);
    }

    #[tokio::test]
    async fn create_blank_title_rerenders_with_errors() {
        let (app, store) = app();
        let response = app
            .oneshot(post_form("/snippet/create", "title=&content=x&expires=7"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.is_empty());

        let body = body_string(response).await;
        assert!(body.contains(
            r#"<label class="error" for="title">This field cannot be blank</label>"#
        ));
        assert!(body.contains(">x</textarea>"));
    }

    #[tokio::test]
    async fn create_reports_every_violation_and_echoes_input() {
        let (app, store) = app();
        let long_title = "a".repeat(101);
        let response = app
            .oneshot(post_form(
                "/snippet/create",
                &format!("title={long_title}&content=+&expires=30"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.is_empty());

        let body = body_string(response).await;
        assert!(body.contains("This field cannot contain more than 100 characters"));
        assert!(body.contains("This field cannot be blank"));
        assert!(body.contains("This field must equal 1, 7, or 365"));
        assert!(body.contains(&format!(r#"value="{long_title}""#)));
    }

    #[tokio::test]
    async fn create_echo_is_html_escaped() {
        let (app, store) = app();
        let response = app
            .oneshot(post_form(
                "/snippet/create",
                "title=a%2Fb+%3Ci%3E&content=x%2Fy&expires=2",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.is_empty());

        // Tera escapes `/` as well as `<` and `>`.
        let body = body_string(response).await;
        assert!(body.contains(r#"value="a&#x2F;b &lt;i&gt;""#), "{body}");
        assert!(body.contains(">x&#x2F;y</textarea>"), "{body}");
        assert!(!body.contains("a/b <i>"));
    }

    #[tokio::test]
    async fn create_non_integer_expires_is_bad_request() {
        let (app, store) = app();
        for expires in ["seven", "", "7.0"] {
            let response = app
                .clone()
                .oneshot(post_form(
                    "/snippet/create",
                    &format!("title=t&content=c&expires={expires}"),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "expires={expires:?}");
            assert!(body_string(response).await.contains("<h1>Bad Request</h1>"));
        }
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_missing_expires_is_bad_request() {
        let (app, _) = app();
        let response = app
            .oneshot(post_form("/snippet/create", "title=t&content=c"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_wrong_content_type_is_bad_request() {
        let (app, store) = app();
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/snippet/create")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(r#"{"title":"t"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn create_store_failure_is_500() {
        let app = app_with(Arc::new(FailingStore));
        let response = app
            .oneshot(post_form("/snippet/create", "title=t&content=c&expires=1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let (app, _) = app();
        let response = app.oneshot(get("/snippet/create")).await.unwrap();
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(
            response.headers()[header::CONTENT_SECURITY_POLICY],
            crate::middleware::CSP_HEADER
        );
    }
}
