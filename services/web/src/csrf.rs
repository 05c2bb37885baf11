//! CSRF protection
//!
//! Each session carries a random token. Rendered forms embed it as the
//! hidden `csrf_token` field, and every state-changing request must send it
//! back (form field or `x-csrf-token` header) before it reaches a handler.

use axum::{
    body::{Body, Bytes},
    extract::{Form, FromRequest},
    http::{HeaderMap, Method, Request, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};
use rand::{Rng, distributions::Alphanumeric};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::warn;

use crate::error::AppError;

pub const CSRF_SESSION_KEY: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";

const TOKEN_LEN: usize = 32;
/// Largest form body buffered for token inspection
const MAX_FORM_BYTES: usize = 2 * 1024 * 1024;

/// The current session's CSRF token, available to handlers as an extension
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

#[derive(Deserialize)]
struct CsrfField {
    csrf_token: Option<String>,
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn form_token(headers: &HeaderMap, body: &Bytes) -> Option<String> {
    let mut builder = Request::builder().method(Method::POST);
    if let Some(content_type) = headers.get(CONTENT_TYPE) {
        builder = builder.header(CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body.clone())).ok()?;
    let Form(field) = Form::<CsrfField>::from_request(request, &()).await.ok()?;
    field.csrf_token
}

/// Load or create the session token and reject unsafe requests that do not
/// echo it back.
pub async fn verify_csrf(
    session: Session,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = match session.get::<String>(CSRF_SESSION_KEY).await? {
        Some(token) => token,
        None => {
            let token = generate_token();
            session.insert(CSRF_SESSION_KEY, &token).await?;
            token
        }
    };

    let mut request = if is_safe(request.method()) {
        request
    } else {
        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, MAX_FORM_BYTES)
            .await
            .map_err(|e| AppError::BadRequest(format!("Unreadable request body: {}", e)))?;

        let submitted = match header_token(&parts.headers) {
            Some(token) => Some(token),
            None => form_token(&parts.headers, &bytes).await,
        };

        let valid = submitted
            .is_some_and(|submitted| constant_time_eq(submitted.as_bytes(), token.as_bytes()));
        if !valid {
            warn!(method = %parts.method, path = %parts.uri.path(), "CSRF token missing or invalid");
            return Err(AppError::BadRequest("CSRF token missing or invalid".to_string()));
        }

        Request::from_parts(parts, Body::from(bytes))
    };

    request.extensions_mut().insert(CsrfToken(token));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Extension, Router,
        http::{StatusCode, header},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    async fn echo_token(Extension(token): Extension<CsrfToken>) -> String {
        token.0
    }

    async fn echo_body(body: String) -> String {
        body
    }

    fn app() -> Router {
        Router::new()
            .route("/", get(echo_token).post(echo_body))
            .layer(middleware::from_fn(verify_csrf))
            .layer(SessionManagerLayer::new(MemoryStore::default()).with_secure(false))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Issue a GET and return the session cookie and the token it was given
    async fn token_and_cookie(app: &Router) -> (String, String) {
        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .unwrap()
            .to_string();
        (body_string(response).await, cookie)
    }

    fn form_post(cookie: &str, body: String) -> Request<Body> {
        Request::post("/")
            .header(header::COOKIE, cookie)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn test_generated_tokens() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }

    #[tokio::test]
    async fn test_token_is_stable_within_a_session() {
        let app = app();
        let (token, cookie) = token_and_cookie(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::get("/")
                    .header(header::COOKIE, &cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_string(response).await, token);
    }

    #[tokio::test]
    async fn test_post_without_token_is_rejected() {
        let app = app();
        let (_, cookie) = token_and_cookie(&app).await;

        let response = app
            .oneshot(form_post(&cookie, "title=T".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_with_wrong_token_is_rejected() {
        let app = app();
        let (_, cookie) = token_and_cookie(&app).await;

        let response = app
            .oneshot(form_post(&cookie, "csrf_token=forged".to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_post_with_token_reaches_handler_with_body_intact() {
        let app = app();
        let (token, cookie) = token_and_cookie(&app).await;
        let body = format!("title=T&csrf_token={}", token);

        let response = app.oneshot(form_post(&cookie, body.clone())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, body);
    }

    #[tokio::test]
    async fn test_header_token_is_accepted() {
        let app = app();
        let (token, cookie) = token_and_cookie(&app).await;

        let request = Request::post("/")
            .header(header::COOKIE, &cookie)
            .header(CSRF_HEADER, &token)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
