//! Application state shared across handlers

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{
    error::AppResult,
    repositories::{SnippetStore, UserStore},
    templates::{TemplateCache, TemplateData},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub snippets: Arc<dyn SnippetStore>,
    pub users: Arc<dyn UserStore>,
    pub templates: Arc<TemplateCache>,
}

impl AppState {
    pub fn new(snippets: Arc<dyn SnippetStore>, users: Arc<dyn UserStore>) -> Self {
        Self {
            snippets,
            users,
            templates: Arc::new(TemplateCache::new()),
        }
    }

    /// Render `page` with `status`; the page is fully rendered before any
    /// byte is written, so a template failure still yields a clean 500.
    pub fn render(&self, status: StatusCode, page: &str, data: &TemplateData) -> AppResult<Response> {
        let markup = self.templates.render(page, data)?;
        Ok((status, Html(markup.into_string())).into_response())
    }
}
