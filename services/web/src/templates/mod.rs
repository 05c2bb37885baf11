//! Server-side HTML rendering.
//!
//! Pages are compile-time [maud](https://maud.lambda.xyz/) functions, so all
//! dynamic values are escaped. They are registered by name in a
//! [`TemplateCache`] built once at startup and shared read-only by every
//! request.

pub mod layout;
pub mod pages;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use maud::Markup;
use thiserror::Error;

use crate::{
    forms::{LoginForm, SignupForm, SnippetForm},
    models::Snippet,
};

pub const HOME_PAGE: &str = "home.html";
pub const VIEW_PAGE: &str = "view.html";
pub const CREATE_PAGE: &str = "create.html";
pub const SIGNUP_PAGE: &str = "signup.html";
pub const LOGIN_PAGE: &str = "login.html";

/// A renderable page
pub type PageFn = fn(&TemplateData) -> Markup;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("The template {0} does not exist")]
    NotFound(String),
}

/// The form a page is (re)displaying
#[derive(Debug, Clone, Default)]
pub enum FormState {
    #[default]
    None,
    Snippet(SnippetForm),
    Signup(SignupForm),
    Login(LoginForm),
}

/// Per-request data handed to a page
#[derive(Debug, Clone, Default)]
pub struct TemplateData {
    pub current_year: i32,
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub csrf_token: String,
    pub snippet: Option<Snippet>,
    pub snippets: Vec<Snippet>,
    pub form: FormState,
}

/// Immutable name → page lookup
pub struct TemplateCache {
    pages: HashMap<&'static str, PageFn>,
}

impl TemplateCache {
    pub fn new() -> Self {
        let mut pages: HashMap<&'static str, PageFn> = HashMap::new();
        pages.insert(HOME_PAGE, pages::home);
        pages.insert(VIEW_PAGE, pages::view);
        pages.insert(CREATE_PAGE, pages::create);
        pages.insert(SIGNUP_PAGE, pages::signup);
        pages.insert(LOGIN_PAGE, pages::login);
        Self { pages }
    }

    pub fn render(&self, name: &str, data: &TemplateData) -> Result<Markup, TemplateError> {
        let page = self
            .pages
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        Ok(page(data))
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a timestamp the way pages show it, e.g. `17 Oct 2026 at 09:05`
pub fn human_date(at: &DateTime<Utc>) -> String {
    at.format("%d %b %Y at %H:%M").to_string()
}
