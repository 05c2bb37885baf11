//! Page skeleton shared by every template

use maud::{DOCTYPE, Markup, html};

use super::TemplateData;

/// Hidden input carrying the session's CSRF token
pub fn csrf_field(data: &TemplateData) -> Markup {
    html! {
        input type="hidden" name="csrf_token" value=(data.csrf_token);
    }
}

/// Message shown next to an invalid field
pub fn field_error(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            label.error { (message) }
        }
    }
}

fn nav(data: &TemplateData) -> Markup {
    html! {
        nav {
            div {
                a href="/" { "Home" }
                @if data.is_authenticated {
                    a href="/snippet/create" { "Create snippet" }
                }
            }
            div {
                @if data.is_authenticated {
                    form action="/user/logout" method="POST" {
                        (csrf_field(data))
                        button { "Logout" }
                    }
                } @else {
                    a href="/user/signup" { "Signup" }
                    a href="/user/login" { "Login" }
                }
            }
        }
    }
}

pub fn base(title: &str, data: &TemplateData, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) " - Snippetbox" }
                link rel="stylesheet" href="/static/css/main.css";
            }
            body {
                header {
                    h1 { a href="/" { "Snippetbox" } }
                }
                (nav(data))
                main {
                    @if let Some(flash) = &data.flash {
                        div.flash { (flash) }
                    }
                    (content)
                }
                footer {
                    "Powered by Rust in " (data.current_year)
                }
            }
        }
    }
}
