//! Form payloads and their field-level validation.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use fragments_types::{Fragment, FragmentDraft};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// Field name -> message. Empty means the form is valid.
pub type FieldErrors = BTreeMap<&'static str, String>;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

/// Build the pattern an access code must match: the configured prefix
/// followed by at least one digit.
pub fn registration_code_pattern(prefix: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"^{}\d+$", regex::escape(prefix)))
}

fn check_length(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.insert(
            field,
            format!("Field must be between {} and {} characters long.", min, max),
        );
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub code: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm: String,
}

impl RegisterForm {
    pub fn validate(&self, code_pattern: &Regex) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.code.trim().is_empty() {
            errors.insert("code", "This field is required.".to_string());
        } else if !code_pattern.is_match(&self.code) {
            errors.insert("code", "Invalid access code.".to_string());
        }

        check_length(&mut errors, "name", &self.name, 1, 10);

        check_length(&mut errors, "email", &self.email, 3, 24);
        if !errors.contains_key("email") && !EMAIL_SHAPE.is_match(&self.email) {
            errors.insert("email", "Invalid email address.".to_string());
        }

        check_length(&mut errors, "username", &self.username, 4, 10);

        if self.password.is_empty() {
            errors.insert("password", "This field is required.".to_string());
        } else if self.password != self.confirm {
            errors.insert("password", "Passwords don't match".to_string());
        }

        errors
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Add/edit form. Every field stays a string so a rejected submission can be
/// shown back exactly as typed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FragmentForm {
    pub title: String,
    pub text: String,
    pub tags: String,
    pub date: String,
}

impl FragmentForm {
    pub fn for_new(today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            ..Self::default()
        }
    }

    pub fn from_fragment(fragment: &Fragment) -> Self {
        Self {
            title: fragment.title.clone(),
            text: fragment.text.clone(),
            tags: fragment.tags_display(),
            date: fragment.date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn validate(&self) -> Result<FragmentDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.title.trim().is_empty() {
            errors.insert("title", "This field is required.".to_string());
        }
        if self.text.trim().is_empty() {
            errors.insert("text", "This field is required.".to_string());
        }
        let date = match NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.insert("date", "Enter a date as YYYY-MM-DD.".to_string());
                None
            }
        };

        match date {
            Some(date) if errors.is_empty() => Ok(FragmentDraft {
                title: self.title.trim().to_string(),
                text: self.text.clone(),
                tags: self.tags.clone(),
                date,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_register() -> RegisterForm {
        RegisterForm {
            code: "club42".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            username: "adalove".to_string(),
            password: "secret".to_string(),
            confirm: "secret".to_string(),
        }
    }

    fn pattern() -> Regex {
        registration_code_pattern("club").unwrap()
    }

    #[test]
    fn test_valid_registration_has_no_errors() {
        assert!(valid_register().validate(&pattern()).is_empty());
    }

    #[test]
    fn test_access_code_needs_prefix_and_digits() {
        for code in ["club", "club4x", "xclub4", "CLUB4"] {
            let form = RegisterForm {
                code: code.to_string(),
                ..valid_register()
            };
            assert!(form.validate(&pattern()).contains_key("code"), "code: {}", code);
        }
    }

    #[test]
    fn test_code_prefix_is_literal() {
        let pattern = registration_code_pattern("a.b").unwrap();
        assert!(pattern.is_match("a.b1"));
        assert!(!pattern.is_match("axb1"));
    }

    #[test]
    fn test_register_field_errors() {
        let form = RegisterForm {
            code: String::new(),
            name: "Way too long name".to_string(),
            email: "not-an-email".to_string(),
            username: "abc".to_string(),
            password: "one".to_string(),
            confirm: "two".to_string(),
        };
        let errors = form.validate(&pattern());
        let fields: Vec<&str> = errors.keys().copied().collect();
        assert_eq!(fields, vec!["code", "email", "name", "password", "username"]);
        assert_eq!(errors["password"], "Passwords don't match");
    }

    #[test]
    fn test_fragment_form_produces_draft() {
        let form = FragmentForm {
            title: "  Title ".to_string(),
            text: "Body".to_string(),
            tags: "A, b".to_string(),
            date: "2024-05-06".to_string(),
        };
        let draft = form.validate().unwrap();
        assert_eq!(draft.title, "Title");
        assert_eq!(draft.normalized_tags(), vec!["a", "b"]);
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
    }

    #[test]
    fn test_fragment_form_errors() {
        let errors = FragmentForm {
            date: "06/05/2024".to_string(),
            ..FragmentForm::default()
        }
        .validate()
        .unwrap_err();
        let fields: Vec<&str> = errors.keys().copied().collect();
        assert_eq!(fields, vec!["date", "text", "title"]);
    }

    #[test]
    fn test_form_from_fragment_roundtrips_tags() {
        let fragment = Fragment {
            id: 1,
            title: "t".to_string(),
            text: "x".to_string(),
            tags: vec!["rust".to_string(), "web dev".to_string()],
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let form = FragmentForm::from_fragment(&fragment);
        assert_eq!(form.tags, "rust, web dev");
        assert_eq!(form.validate().unwrap().normalized_tags(), fragment.tags);
    }
}
