//! HTML form payloads and their validation rules

use serde::Deserialize;
use std::num::ParseIntError;

use crate::{
    models::snippet::PERMITTED_EXPIRY_DAYS,
    validation::{Validator, email_regex, matches, max_chars, min_chars, not_blank, permitted_value},
};

const BLANK: &str = "This field cannot be blank";
const INVALID_EMAIL: &str = "This field must be a valid email address";
const TITLE_MAX_CHARS: usize = 100;
const PASSWORD_MIN_CHARS: usize = 8;
const DEFAULT_EXPIRY_DAYS: i64 = 365;

/// Raw body of `POST /snippet/create`
#[derive(Debug, Deserialize)]
pub struct SnippetInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub expires: String,
}

/// Raw body of `POST /user/signup`
#[derive(Debug, Deserialize)]
pub struct SignupInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Raw body of `POST /user/login`
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SnippetForm {
    pub title: String,
    pub content: String,
    pub expires: i64,
    pub validator: Validator,
}

impl Default for SnippetForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: DEFAULT_EXPIRY_DAYS,
            validator: Validator::default(),
        }
    }
}

impl TryFrom<SnippetInput> for SnippetForm {
    type Error = ParseIntError;

    /// A non-numeric `expires` makes the whole body malformed
    fn try_from(input: SnippetInput) -> Result<Self, Self::Error> {
        let expires = input.expires.trim().parse()?;
        let mut form = Self {
            title: input.title,
            content: input.content,
            expires,
            validator: Validator::default(),
        };
        form.validate();
        Ok(form)
    }
}

impl SnippetForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.title), "title", BLANK);
        v.check_field(
            max_chars(&self.title, TITLE_MAX_CHARS),
            "title",
            "This field cannot be more than 100 characters long",
        );
        v.check_field(not_blank(&self.content), "content", BLANK);
        v.check_field(
            permitted_value(&self.expires, &PERMITTED_EXPIRY_DAYS),
            "expires",
            "This field must equal 1, 7 or 365",
        );
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub validator: Validator,
}

impl From<SignupInput> for SignupForm {
    fn from(input: SignupInput) -> Self {
        let mut form = Self {
            name: input.name,
            email: input.email,
            password: input.password,
            validator: Validator::default(),
        };
        form.validate();
        form
    }
}

impl SignupForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.name), "name", BLANK);
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(matches(&self.email, email_regex()), "email", INVALID_EMAIL);
        v.check_field(not_blank(&self.password), "password", BLANK);
        v.check_field(
            min_chars(&self.password, PASSWORD_MIN_CHARS),
            "password",
            "This field must be at least 8 characters long",
        );
    }

    /// The form as it may be echoed back to the browser
    pub fn without_password(self) -> Self {
        Self {
            password: String::new(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub validator: Validator,
}

impl From<LoginInput> for LoginForm {
    fn from(input: LoginInput) -> Self {
        let mut form = Self {
            email: input.email,
            password: input.password,
            validator: Validator::default(),
        };
        form.validate();
        form
    }
}

impl LoginForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(matches(&self.email, email_regex()), "email", INVALID_EMAIL);
        v.check_field(not_blank(&self.password), "password", BLANK);
    }

    pub fn without_password(self) -> Self {
        Self {
            password: String::new(),
            ..self
        }
    }
}
