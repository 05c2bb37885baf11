//! Request middleware: session authentication, access control and panic recovery

use std::any::Any;

use axum::{
    body::Body,
    extract::State,
    http::{
        HeaderValue, Request, StatusCode,
        header::{CACHE_CONTROL, CONNECTION},
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::{error, warn};

use crate::{error::AppError, session, state::AppState};

/// Where anonymous visitors are sent when they hit a protected route
pub const LOGIN_PATH: &str = "/user/login";

/// Who is making the request, resolved once per request
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthContext {
    pub user_id: Option<i64>,
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Authentication middleware
///
/// A session only counts as authenticated if the user it names still exists.
pub async fn authenticate(
    State(state): State<AppState>,
    session: Session,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let mut auth = AuthContext::default();

    if let Some(user_id) = session::authenticated_user_id(&session).await? {
        if state.users.exists(user_id).await? {
            auth.user_id = Some(user_id);
        } else {
            warn!(user_id, "Session refers to a user that no longer exists");
        }
    }

    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}

/// Redirect anonymous requests to the login page.
///
/// Responses behind this gate must not be cached by the browser.
pub async fn require_auth(req: Request<Body>, next: Next) -> Response {
    let authenticated = req
        .extensions()
        .get::<AuthContext>()
        .is_some_and(AuthContext::is_authenticated);

    if !authenticated {
        return Redirect::to(LOGIN_PATH).into_response();
    }

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Turn a handler panic into a plain 500 and close the connection
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic"
    };
    error!(panic = detail, "Request handler panicked");

    let mut response = (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    response
        .headers_mut()
        .insert(CONNECTION, HeaderValue::from_static("close"));
    response
}
