//! Rule-based form validation.
//!
//! Each field carries an ordered list of rules; the first failing rule of a field
//! produces that field's message and the remaining rules of the field are skipped.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FieldErrors;

pub const EMAIL_MAX_LENGTH: usize = 254;
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 128;
pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 50;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"))
}

/// Anything a [`Validator`] can read fields from.
pub trait Form {
    /// The field's text; `None` for an absent field. Boolean fields yield `"true"` when set.
    fn field(&self, name: &str) -> Option<&str>;
}

#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    Email,
    MinLength(usize),
    MaxLength(usize),
    /// The field must equal another field of the same form.
    Matches(&'static str),
    /// A checkbox that must be ticked.
    Accepted,
}

impl Rule {
    fn default_message(&self) -> String {
        match self {
            Rule::Required => "This field is required".to_string(),
            Rule::Email => "Please enter a valid email address".to_string(),
            Rule::MinLength(min) => format!("Must be at least {} characters long", min),
            Rule::MaxLength(max) => format!("Must be no more than {} characters long", max),
            Rule::Matches(other) => format!("Must match {}", other),
            Rule::Accepted => "This must be accepted".to_string(),
        }
    }

    fn check(&self, value: &str, form: &dyn Form) -> bool {
        match self {
            Rule::Required => !value.is_empty(),
            Rule::Email => email_regex().is_match(value),
            Rule::MinLength(min) => value.chars().count() >= *min,
            Rule::MaxLength(max) => value.chars().count() <= *max,
            Rule::Matches(other) => form.field(other).unwrap_or("") == value,
            Rule::Accepted => value == "true",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    fields: Vec<(&'static str, Vec<(Rule, String)>)>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule with its default message.
    pub fn rule(self, field: &'static str, rule: Rule) -> Self {
        let message = rule.default_message();
        self.rule_with_message(field, rule, message)
    }

    pub fn rule_with_message(
        mut self,
        field: &'static str,
        rule: Rule,
        message: impl Into<String>,
    ) -> Self {
        let entry = (rule, message.into());
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, rules)) => rules.push(entry),
            None => self.fields.push((field, vec![entry])),
        }
        self
    }

    pub fn validate(&self, form: &dyn Form) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for (field, rules) in &self.fields {
            let value = form.field(field).unwrap_or("");
            if let Some((_, message)) = rules.iter().find(|(rule, _)| !rule.check(value, form)) {
                errors.insert(field.to_string(), message.clone());
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

impl Form for LoginForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "email" => Some(self.email.as_str()),
            "password" => Some(self.password.as_str()),
            "rememberMe" => self.remember_me.then_some("true"),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub accept_terms: bool,
}

impl Form for RegisterForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(self.name.as_str()),
            "email" => Some(self.email.as_str()),
            "password" => Some(self.password.as_str()),
            "confirmPassword" => Some(self.confirm_password.as_str()),
            "acceptTerms" => self.accept_terms.then_some("true"),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl Form for ContactForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(self.name.as_str()),
            "email" => Some(self.email.as_str()),
            "subject" => Some(self.subject.as_str()),
            "message" => Some(self.message.as_str()),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl Form for ProfileForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(self.name.as_str()),
            "email" => Some(self.email.as_str()),
            _ => None,
        }
    }
}

/// Body of `POST /api/v1/users`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl From<&RegisterForm> for RegisterRequest {
    fn from(form: &RegisterForm) -> Self {
        Self {
            name: form.name.clone(),
            email: form.email.clone(),
            password: form.password.clone(),
        }
    }
}

impl Form for RegisterRequest {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(self.name.as_str()),
            "email" => Some(self.email.as_str()),
            "password" => Some(self.password.as_str()),
            _ => None,
        }
    }
}

pub const REGISTER_PASSWORD_MIN_LENGTH: usize = 6;

pub fn validate_login_form(form: &LoginForm) -> Result<(), FieldErrors> {
    Validator::new()
        .rule_with_message("email", Rule::Required, "Email is required")
        .rule("email", Rule::Email)
        .rule_with_message("password", Rule::Required, "Password is required")
        .validate(form)
}

pub fn validate_register_form(form: &RegisterForm) -> Result<(), FieldErrors> {
    Validator::new()
        .rule_with_message("name", Rule::Required, "Name is required")
        .rule_with_message(
            "name",
            Rule::MinLength(NAME_MIN_LENGTH),
            "Name must be at least 2 characters",
        )
        .rule("name", Rule::MaxLength(NAME_MAX_LENGTH))
        .rule_with_message("email", Rule::Required, "Email is required")
        .rule("email", Rule::Email)
        .rule("email", Rule::MaxLength(EMAIL_MAX_LENGTH))
        .rule_with_message("password", Rule::Required, "Password is required")
        .rule_with_message(
            "password",
            Rule::MinLength(PASSWORD_MIN_LENGTH),
            "Password must be at least 8 characters",
        )
        .rule("password", Rule::MaxLength(PASSWORD_MAX_LENGTH))
        .rule_with_message(
            "confirmPassword",
            Rule::Required,
            "Please confirm your password",
        )
        .rule_with_message(
            "confirmPassword",
            Rule::Matches("password"),
            "Passwords do not match",
        )
        .validate(form)
}

/// Server-side check of a registration request; looser than the client form.
pub fn validate_register_request(request: &RegisterRequest) -> Result<(), FieldErrors> {
    Validator::new()
        .rule_with_message("name", Rule::Required, "Name is required")
        .rule_with_message("email", Rule::Required, "Email is required")
        .rule_with_message("password", Rule::Required, "Password is required")
        .rule_with_message(
            "password",
            Rule::MinLength(REGISTER_PASSWORD_MIN_LENGTH),
            "Password must be at least 6 characters long",
        )
        .validate(request)
}

pub fn validate_contact_form(form: &ContactForm) -> Result<(), FieldErrors> {
    Validator::new()
        .rule_with_message("name", Rule::Required, "Name is required")
        .rule("name", Rule::MinLength(NAME_MIN_LENGTH))
        .rule_with_message("email", Rule::Required, "Email is required")
        .rule("email", Rule::Email)
        .rule_with_message("subject", Rule::Required, "Subject is required")
        .rule_with_message("message", Rule::Required, "Message is required")
        .rule("message", Rule::MinLength(10))
        .validate(form)
}

pub fn validate_profile_form(form: &ProfileForm) -> Result<(), FieldErrors> {
    Validator::new()
        .rule_with_message("name", Rule::Required, "Name is required")
        .rule("name", Rule::MinLength(NAME_MIN_LENGTH))
        .rule("name", Rule::MaxLength(NAME_MAX_LENGTH))
        .rule_with_message("email", Rule::Required, "Email is required")
        .rule("email", Rule::Email)
        .validate(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.into(),
            password: password.into(),
            remember_me: false,
        }
    }

    #[test]
    fn valid_login_passes() {
        assert!(validate_login_form(&login("ada@example.com", "pw")).is_ok());
    }

    #[test]
    fn empty_login_reports_required_messages() {
        let errors = validate_login_form(&login("", "")).unwrap_err();
        assert_eq!(errors["email"], "Email is required");
        assert_eq!(errors["password"], "Password is required");
    }

    #[test]
    fn first_failing_rule_wins_per_field() {
        let errors = validate_login_form(&login("not-an-email", "pw")).unwrap_err();
        assert_eq!(errors["email"], "Please enter a valid email address");
        assert!(!errors.contains_key("password"));
    }

    #[test]
    fn register_checks_password_confirmation() {
        let form = RegisterForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "longenough".into(),
            confirm_password: "different1".into(),
            accept_terms: true,
        };
        let errors = validate_register_form(&form).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["confirmPassword"], "Passwords do not match");
    }

    #[test]
    fn register_short_fields() {
        let form = RegisterForm {
            name: "A".into(),
            email: "ada@example.com".into(),
            password: "short".into(),
            confirm_password: "short".into(),
            accept_terms: false,
        };
        let errors = validate_register_form(&form).unwrap_err();
        assert_eq!(errors["name"], "Name must be at least 2 characters");
        assert_eq!(errors["password"], "Password must be at least 8 characters");
    }

    #[test]
    fn default_messages_name_the_bound() {
        let errors = Validator::new()
            .rule("bio", Rule::MaxLength(3))
            .validate(&ProfileFormWithBio("abcd"))
            .unwrap_err();
        assert_eq!(errors["bio"], "Must be no more than 3 characters long");
    }

    #[test]
    fn accepted_requires_true() {
        let mut form = RegisterForm::default();
        let validator = Validator::new().rule("acceptTerms", Rule::Accepted);
        assert!(validator.validate(&form).is_err());
        form.accept_terms = true;
        assert!(validator.validate(&form).is_ok());
    }

    #[test]
    fn contact_message_needs_some_content() {
        let form = ContactForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: "Hi".into(),
            message: "short".into(),
        };
        let errors = validate_contact_form(&form).unwrap_err();
        assert_eq!(errors["message"], "Must be at least 10 characters long");
    }

    #[test]
    fn profile_form_checks_name_bounds_and_email() {
        let ok = ProfileForm {
            name: "Ada".into(),
            email: "ada@example.com".into(),
        };
        assert!(validate_profile_form(&ok).is_ok());

        let errors = validate_profile_form(&ProfileForm::default()).unwrap_err();
        assert_eq!(errors["name"], "Name is required");
        assert_eq!(errors["email"], "Email is required");

        let long = ProfileForm {
            name: "x".repeat(NAME_MAX_LENGTH + 1),
            email: "nope".into(),
        };
        let errors = validate_profile_form(&long).unwrap_err();
        assert_eq!(errors["name"], "Must be no more than 50 characters long");
        assert_eq!(errors["email"], "Please enter a valid email address");
    }

    #[test]
    fn register_request_needs_six_character_password() {
        let request = RegisterRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "12345".into(),
        };
        let errors = validate_register_request(&request).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["password"], "Password must be at least 6 characters long");

        let missing = validate_register_request(&RegisterRequest::default()).unwrap_err();
        assert_eq!(missing.len(), 3);
    }

    struct ProfileFormWithBio(&'static str);

    impl Form for ProfileFormWithBio {
        fn field(&self, name: &str) -> Option<&str> {
            (name == "bio").then_some(self.0)
        }
    }
}
