//! Web service routes

use axum::{
    Form, Router,
    body::Body,
    extract::{FromRequestParts, Path, State, rejection::FormRejection},
    http::{HeaderValue, Request, StatusCode, header, request::Parts},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::{Datelike, Utc};
use tower_http::{
    catch_panic::CatchPanicLayer, services::ServeDir, set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tower_sessions::{Session, SessionManagerLayer, SessionStore};
use tracing::{Level, info};

use crate::{
    config::ServerConfig,
    csrf::{CsrfToken, verify_csrf},
    error::{AppError, AppResult},
    forms::{LoginForm, LoginInput, SignupForm, SignupInput, SnippetForm, SnippetInput},
    middleware::{AuthContext, authenticate, handle_panic, require_auth},
    repositories::ModelError,
    session,
    state::AppState,
    templates::{
        CREATE_PAGE, FormState, HOME_PAGE, LOGIN_PAGE, SIGNUP_PAGE, TemplateData, VIEW_PAGE,
    },
};

const CONTENT_SECURITY_POLICY: &str =
    "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com";

/// Create the router for the web service
///
/// Layers, outermost first: panic recovery, request tracing, timeout,
/// security headers. Dynamic pages additionally run through the session,
/// CSRF and authentication middleware; `/static` and `/ping` do not.
pub fn create_router<Store>(
    state: AppState,
    sessions: SessionManagerLayer<Store>,
    server: &ServerConfig,
) -> Router
where
    Store: SessionStore + Clone,
{
    let protected_routes = Router::new()
        .route("/snippet/create", get(snippet_create).post(snippet_create_post))
        .route("/user/logout", post(user_logout_post))
        .route_layer(middleware::from_fn(require_auth));

    let dynamic_routes = Router::new()
        .route("/", get(home))
        .route("/snippet/view/{id}", get(snippet_view))
        .route("/user/signup", get(user_signup).post(user_signup_post))
        .route("/user/login", get(user_login).post(user_login_post))
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(middleware::from_fn(verify_csrf))
        .layer(sessions);

    Router::new()
        .route("/ping", get(ping))
        .nest_service("/static", ServeDir::new(&server.static_dir))
        .merge(dynamic_routes)
        .fallback(not_found)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("deny"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("0"),
        ))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        version = ?request.version(),
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// What every page needs from the request: the session, its CSRF token and
/// the authenticated user.
pub struct PageContext {
    pub session: Session,
    pub csrf_token: String,
    pub auth: AuthContext,
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| AppError::Internal(anyhow::anyhow!(message)))?;
        let csrf_token = parts
            .extensions
            .get::<CsrfToken>()
            .map(|token| token.0.clone())
            .unwrap_or_default();
        let auth = parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .unwrap_or_default();

        Ok(Self {
            session,
            csrf_token,
            auth,
        })
    }
}

impl PageContext {
    /// Template data for this request; consumes any pending flash message
    async fn template_data(&self) -> AppResult<TemplateData> {
        Ok(TemplateData {
            current_year: Utc::now().year(),
            flash: session::pop_flash(&self.session).await?,
            is_authenticated: self.auth.is_authenticated(),
            csrf_token: self.csrf_token.clone(),
            ..TemplateData::default()
        })
    }

    async fn render_form(
        &self,
        state: &AppState,
        page: &str,
        form: FormState,
    ) -> AppResult<Response> {
        let mut data = self.template_data().await?;
        data.form = form;
        state.render(StatusCode::UNPROCESSABLE_ENTITY, page, &data)
    }
}

/// Liveness probe
pub async fn ping() -> &'static str {
    "OK"
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Latest snippets
pub async fn home(State(state): State<AppState>, page: PageContext) -> AppResult<Response> {
    let snippets = state.snippets.latest().await?;

    let mut data = page.template_data().await?;
    data.snippets = snippets;
    state.render(StatusCode::OK, HOME_PAGE, &data)
}

pub async fn snippet_view(
    State(state): State<AppState>,
    page: PageContext,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = id
        .parse::<i64>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or(AppError::NotFound)?;
    let snippet = state.snippets.get(id).await?;

    let mut data = page.template_data().await?;
    data.snippet = Some(snippet);
    state.render(StatusCode::OK, VIEW_PAGE, &data)
}

pub async fn snippet_create(
    State(state): State<AppState>,
    page: PageContext,
) -> AppResult<Response> {
    let mut data = page.template_data().await?;
    data.form = FormState::Snippet(SnippetForm::default());
    state.render(StatusCode::OK, CREATE_PAGE, &data)
}

pub async fn snippet_create_post(
    State(state): State<AppState>,
    page: PageContext,
    input: Result<Form<SnippetInput>, FormRejection>,
) -> AppResult<Response> {
    let Form(input) = input?;
    let form = SnippetForm::try_from(input)
        .map_err(|e| AppError::BadRequest(format!("Invalid expires value: {}", e)))?;

    if !form.validator.is_valid() {
        return page
            .render_form(&state, CREATE_PAGE, FormState::Snippet(form))
            .await;
    }

    let id = state
        .snippets
        .insert(&form.title, &form.content, form.expires)
        .await?;
    info!(snippet_id = id, user_id = ?page.auth.user_id, "Snippet created");

    session::put_flash(&page.session, "Snippet successfully created!").await?;
    Ok(Redirect::to(&format!("/snippet/view/{}", id)).into_response())
}

pub async fn user_signup(
    State(state): State<AppState>,
    page: PageContext,
) -> AppResult<Response> {
    let mut data = page.template_data().await?;
    data.form = FormState::Signup(SignupForm::default());
    state.render(StatusCode::OK, SIGNUP_PAGE, &data)
}

pub async fn user_signup_post(
    State(state): State<AppState>,
    page: PageContext,
    input: Result<Form<SignupInput>, FormRejection>,
) -> AppResult<Response> {
    let Form(input) = input?;
    let mut form = SignupForm::from(input);

    if !form.validator.is_valid() {
        return page
            .render_form(&state, SIGNUP_PAGE, FormState::Signup(form.without_password()))
            .await;
    }

    match state
        .users
        .insert(&form.name, &form.email, &form.password)
        .await
    {
        Ok(()) => {}
        Err(ModelError::DuplicateEmail) => {
            form.validator
                .add_field_error("email", "Email address is already in use");
            return page
                .render_form(&state, SIGNUP_PAGE, FormState::Signup(form.without_password()))
                .await;
        }
        Err(e) => return Err(e.into()),
    }
    info!(email = %form.email, "User signed up");

    session::put_flash(&page.session, "Your signup was successful. Please log in.").await?;
    Ok(Redirect::to("/user/login").into_response())
}

pub async fn user_login(
    State(state): State<AppState>,
    page: PageContext,
) -> AppResult<Response> {
    let mut data = page.template_data().await?;
    data.form = FormState::Login(LoginForm::default());
    state.render(StatusCode::OK, LOGIN_PAGE, &data)
}

pub async fn user_login_post(
    State(state): State<AppState>,
    page: PageContext,
    input: Result<Form<LoginInput>, FormRejection>,
) -> AppResult<Response> {
    let Form(input) = input?;
    let mut form = LoginForm::from(input);

    if !form.validator.is_valid() {
        return page
            .render_form(&state, LOGIN_PAGE, FormState::Login(form.without_password()))
            .await;
    }

    match state.users.authenticate(&form.email, &form.password).await {
        Ok(user_id) => {
            session::login(&page.session, user_id).await?;
            Ok(Redirect::to("/snippet/create").into_response())
        }
        Err(ModelError::InvalidCredentials) => {
            form.validator
                .add_non_field_error("Email or password is incorrect");
            page.render_form(&state, LOGIN_PAGE, FormState::Login(form.without_password()))
                .await
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn user_logout_post(page: PageContext) -> AppResult<Response> {
    session::logout(&page.session).await?;
    session::put_flash(&page.session, "You've been logged out successfully!").await?;
    Ok(Redirect::to("/").into_response())
}
