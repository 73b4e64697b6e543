//! ログイン・サインアップ入力チェック
//!
//! エラーはフィールドごとに保持し、入力欄の横に表示できるようにする。

use std::collections::BTreeMap;
use std::fmt;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Username,
    Password,
    ConfirmPassword,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Username => "username",
            FormField::Password => "password",
            FormField::ConfirmPassword => "confirmPassword",
        }
    }
}

/// フィールド別のエラーメッセージ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: BTreeMap<FormField, String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn insert(&mut self, field: FormField, message: &str) {
        self.errors.insert(field, message.to_string());
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field.as_str(), message))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

pub fn validate_login(username: &str, password: &str) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();

    if username.trim().is_empty() {
        errors.insert(FormField::Username, "Username is required");
    }
    if password.is_empty() {
        errors.insert(FormField::Password, "Password is required");
    }

    errors.into_result()
}

pub fn validate_signup(username: &str, password: &str, confirm_password: &str) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();

    if username.trim().is_empty() {
        errors.insert(FormField::Username, "Username is required");
    } else if username.chars().count() < MIN_USERNAME_LEN {
        errors.insert(FormField::Username, "Username must be at least 3 characters");
    }

    if password.is_empty() {
        errors.insert(FormField::Password, "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(FormField::Password, "Password must be at least 6 characters");
    }

    if confirm_password.is_empty() {
        errors.insert(FormField::ConfirmPassword, "Please confirm your password");
    } else if password != confirm_password {
        errors.insert(FormField::ConfirmPassword, "Passwords do not match");
    }

    errors.into_result()
}
