use serde::Deserialize;
use std::collections::BTreeMap;

use crate::models::api::{AlertRuleUpdate, UserPayload};

/// Inline messages keyed by form field. A form with errors is never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub BTreeMap<&'static str, String>);

impl FieldErrors {
    fn add(&mut self, field: &'static str, msg: &str) {
        self.0.entry(field).or_insert_with(|| msg.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Present ("on") when the box is ticked.
    #[serde(default)]
    pub remember_me: Option<String>,
}

impl LoginForm {
    pub fn remember(&self) -> bool {
        self.remember_me.as_deref().is_some_and(|v| !v.is_empty() && v != "false")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserForm {
    /// Empty when creating a user.
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub is_active: Option<String>,
}

impl UserForm {
    pub fn is_new(&self) -> bool {
        self.user_id.trim().is_empty()
    }

    pub fn validate(&self) -> Result<UserPayload, FieldErrors> {
        let mut errors = FieldErrors::default();
        let username = self.username.trim();
        let full_name = self.full_name.trim();
        let email = self.email.trim();

        if username.is_empty() {
            errors.add("username", "Username is required.");
        }
        if (self.is_new() || !self.password.is_empty()) && self.password.chars().count() < 4 {
            errors.add("password", "Password must be at least 4 characters.");
        }
        if full_name.is_empty() {
            errors.add("full_name", "Full name is required.");
        }
        if email.is_empty() {
            errors.add("email", "Email is required.");
        } else if !is_valid_email(email) {
            errors.add("email", "Enter a valid email address.");
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let role = match self.role.as_str() {
            "admin" | "user" | "guest" => self.role.clone(),
            _ => "user".to_string(),
        };
        Ok(UserPayload {
            username: username.to_string(),
            password: (!self.password.is_empty()).then(|| self.password.clone()),
            full_name: full_name.to_string(),
            email: email.to_string(),
            role,
            is_active: self.is_active.as_deref().is_some_and(|v| !v.is_empty() && v != "false"),
        })
    }
}

/// `local@host.rest`: no whitespace, exactly one `@`, and a dot in the
/// domain with something on both sides of it.
pub fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub status: String,
}

impl RuleForm {
    pub fn validate(&self) -> Result<AlertRuleUpdate, FieldErrors> {
        let mut errors = FieldErrors::default();
        let fields: [(&'static str, &str, &str); 5] = [
            ("name", &self.name, "Rule name is required."),
            ("target", &self.target, "Target is required."),
            ("condition", &self.condition, "Condition is required."),
            ("severity", &self.severity, "Severity is required."),
            ("status", &self.status, "Status is required."),
        ];
        for (field, value, msg) in fields {
            if value.trim().is_empty() {
                errors.add(field, msg);
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(AlertRuleUpdate {
            name: self.name.trim().to_string(),
            target: self.target.trim().to_string(),
            condition: self.condition.trim().to_string(),
            severity: self.severity.trim().to_string(),
            status: self.status.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> UserForm {
        UserForm {
            user_id: String::new(),
            username: "kim".into(),
            password: "secret".into(),
            full_name: "Kim Lee".into(),
            email: "kim@example.com".into(),
            role: "admin".into(),
            is_active: None,
        }
    }

    #[test]
    fn new_user_needs_password() {
        let mut f = form();
        f.password = "abc".into();
        let errs = f.validate().unwrap_err();
        assert!(errs.get("password").is_some());

        f.password.clear();
        assert!(f.validate().is_err());
    }

    #[test]
    fn edit_with_empty_password_omits_it() {
        let mut f = form();
        f.user_id = "u-1".into();
        f.password.clear();
        f.is_active = Some("on".into());
        let payload = f.validate().unwrap();
        assert_eq!(payload.password, None);
        assert!(payload.is_active);

        f.password = "xy".into();
        assert!(f.validate().is_err());
    }

    #[test]
    fn active_follows_checkbox_for_new_users() {
        let payload = form().validate().unwrap();
        assert!(!payload.is_active);
        assert_eq!(payload.password.as_deref(), Some("secret"));
        assert_eq!(payload.role, "admin");

        let mut f = form();
        f.is_active = Some("on".into());
        assert!(f.validate().unwrap().is_active);
    }

    #[test]
    fn all_field_errors_reported_together() {
        let f = UserForm::default();
        let errs = f.validate().unwrap_err();
        for field in ["username", "password", "full_name", "email"] {
            assert!(errs.get(field).is_some(), "missing {}", field);
        }
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.io"));
        assert!(!is_valid_email("a b@c.io"));
        assert!(!is_valid_email("ab.io"));
        assert!(!is_valid_email("a@bio"));
        assert!(!is_valid_email("@b.io"));
        assert!(!is_valid_email("a@b@c.io"));
        assert!(!is_valid_email("a@.io"));
        assert!(is_valid_email("a@b.io."));
        assert!(is_valid_email("a@b.c.d"));
        assert!(!is_valid_email("a@b."));
    }

    #[test]
    fn rule_fields_required() {
        let errs = RuleForm {
            name: "High CPU".into(),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert!(errs.get("name").is_none());
        assert_eq!(errs.0.len(), 4);

        let ok = RuleForm {
            name: " High CPU ".into(),
            target: "all-nodes".into(),
            condition: "cpu > 80".into(),
            severity: "Warning".into(),
            status: "Active".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.name, "High CPU");
    }

    #[test]
    fn remember_checkbox() {
        let mut f = LoginForm::default();
        assert!(!f.remember());
        f.remember_me = Some("on".into());
        assert!(f.remember());
    }
}
