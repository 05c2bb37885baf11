//! One function per page

use maud::{Markup, html};

use super::{
    FormState, TemplateData, human_date,
    layout::{base, csrf_field, field_error},
};
use crate::forms::{LoginForm, SignupForm, SnippetForm};

pub fn home(data: &TemplateData) -> Markup {
    let content = html! {
        h2 { "Latest Snippets" }
        @if data.snippets.is_empty() {
            p { "There's nothing to see here... yet!" }
        } @else {
            table {
                tr {
                    th { "Title" }
                    th { "Created" }
                    th { "ID" }
                }
                @for snippet in &data.snippets {
                    tr {
                        td { a href={ "/snippet/view/" (snippet.id) } { (snippet.title) } }
                        td { (human_date(&snippet.created)) }
                        td { "#" (snippet.id) }
                    }
                }
            }
        }
    };
    base("Home", data, content)
}

pub fn view(data: &TemplateData) -> Markup {
    let content = html! {
        @if let Some(snippet) = &data.snippet {
            div.snippet {
                div.metadata {
                    strong { (snippet.title) }
                    span { "#" (snippet.id) }
                }
                pre { code { (snippet.content) } }
                div.metadata {
                    time { "Created: " (human_date(&snippet.created)) }
                    time { "Expires: " (human_date(&snippet.expires)) }
                }
            }
        }
    };
    let title = data
        .snippet
        .as_ref()
        .map(|snippet| format!("Snippet #{}", snippet.id))
        .unwrap_or_else(|| "Snippet".to_string());
    base(&title, data, content)
}

pub fn create(data: &TemplateData) -> Markup {
    let form = match &data.form {
        FormState::Snippet(form) => form.clone(),
        _ => SnippetForm::default(),
    };
    let content = html! {
        form action="/snippet/create" method="POST" {
            (csrf_field(data))
            div {
                label { "Title:" }
                (field_error(form.validator.field_error("title")))
                input type="text" name="title" value=(form.title);
            }
            div {
                label { "Content:" }
                (field_error(form.validator.field_error("content")))
                textarea name="content" { (form.content) }
            }
            div {
                label { "Delete in:" }
                (field_error(form.validator.field_error("expires")))
                @for (days, label) in [(365, "One Year"), (7, "One Week"), (1, "One Day")] {
                    input type="radio" name="expires" value=(days) checked[form.expires == days];
                    " " (label) " "
                }
            }
            div {
                input type="submit" value="Publish snippet";
            }
        }
    };
    base("Create a New Snippet", data, content)
}

pub fn signup(data: &TemplateData) -> Markup {
    let form = match &data.form {
        FormState::Signup(form) => form.clone(),
        _ => SignupForm::default(),
    };
    let content = html! {
        form action="/user/signup" method="POST" novalidate {
            (csrf_field(data))
            div {
                label { "Name:" }
                (field_error(form.validator.field_error("name")))
                input type="text" name="name" value=(form.name);
            }
            div {
                label { "Email:" }
                (field_error(form.validator.field_error("email")))
                input type="email" name="email" value=(form.email);
            }
            div {
                label { "Password:" }
                (field_error(form.validator.field_error("password")))
                input type="password" name="password";
            }
            div {
                input type="submit" value="Signup";
            }
        }
    };
    base("Signup", data, content)
}

pub fn login(data: &TemplateData) -> Markup {
    let form = match &data.form {
        FormState::Login(form) => form.clone(),
        _ => LoginForm::default(),
    };
    let content = html! {
        form action="/user/login" method="POST" novalidate {
            (csrf_field(data))
            @for error in form.validator.non_field_errors() {
                div.error { (error) }
            }
            div {
                label { "Email:" }
                (field_error(form.validator.field_error("email")))
                input type="email" name="email" value=(form.email);
            }
            div {
                label { "Password:" }
                (field_error(form.validator.field_error("password")))
                input type="password" name="password";
            }
            div {
                input type="submit" value="Login";
            }
        }
    };
    base("Login", data, content)
}
