//! Self-service client registration.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{check_password_strength, hash_password, AuthError, AuthResult};
use crate::db::Database;
use crate::models::NewClient;

/// Registration form contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Registration {
    pub full_name: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    /// Optional profile picture; blank means none
    pub image_url: Option<String>,
}

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| {
        Regex::new(r"^\+?[78][-(]?\d{3}\)?-?\d{3}-?\d{2}-?\d{2}$").expect("phone pattern is valid")
    })
}

/// Check a Russian phone number, e.g. `+7(912)345-67-89` or `89123456789`.
pub fn is_valid_phone(phone: &str) -> bool {
    phone_regex().is_match(phone)
}

impl Registration {
    /// Validate the form in the order the fields are presented.
    pub fn validate(&self) -> AuthResult<()> {
        if self.full_name.trim().is_empty() {
            return Err(AuthError::MissingField("full_name"));
        }
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(AuthError::MissingField("phone"));
        }
        if !is_valid_phone(phone) {
            return Err(AuthError::InvalidPhone(phone.to_string()));
        }
        if self.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }
        check_password_strength(&self.password)?;
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        Ok(())
    }
}

/// Register a new client and return its id.
pub fn register_client(db: &Database, registration: &Registration) -> AuthResult<i64> {
    registration.validate()?;

    let phone = registration.phone.trim();
    if db.phone_exists(phone)? {
        tracing::warn!("registration rejected: phone already registered");
        return Err(AuthError::DuplicatePhone(phone.to_string()));
    }

    let mut client = NewClient::new(registration.full_name.trim().to_string(), phone.to_string());
    client.image_url = registration.image_url.clone();

    let client_id = db.insert_client(&client, &hash_password(&registration.password))?;
    Ok(client_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(phone: &str, password: &str, confirm: &str) -> Registration {
        Registration {
            full_name: "Maria Sidorova".into(),
            phone: phone.into(),
            password: password.into(),
            confirm_password: confirm.into(),
            image_url: None,
        }
    }

    #[test]
    fn test_phone_formats() {
        assert!(is_valid_phone("+79123456789"));
        assert!(is_valid_phone("89123456789"));
        assert!(is_valid_phone("+7(912)345-67-89"));
        assert!(is_valid_phone("8-912-345-67-89"));
        assert!(!is_valid_phone("+19123456789"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("+7912345678a"));
    }

    #[test]
    fn test_validation_order() {
        let mut f = form("+79123456789", "secret1", "secret1");
        f.full_name = " ".into();
        assert!(matches!(f.validate(), Err(AuthError::MissingField("full_name"))));

        assert!(matches!(
            form("", "secret1", "secret1").validate(),
            Err(AuthError::MissingField("phone"))
        ));
        assert!(matches!(
            form("555-0100", "secret1", "secret1").validate(),
            Err(AuthError::InvalidPhone(_))
        ));
        assert!(matches!(
            form("+79123456789", "", "").validate(),
            Err(AuthError::MissingField("password"))
        ));
        assert!(matches!(
            form("+79123456789", "abc", "abc").validate(),
            Err(AuthError::WeakPassword)
        ));
        assert!(matches!(
            form("+79123456789", "secret1", "secret2").validate(),
            Err(AuthError::PasswordMismatch)
        ));
        assert!(form("+79123456789", "secret1", "secret1").validate().is_ok());
    }

    #[test]
    fn test_register_stores_password() {
        let db = Database::open_in_memory().unwrap();
        let id = register_client(&db, &form("+79123456789", "secret1", "secret1")).unwrap();

        let creds = db.client_credentials(id).unwrap().unwrap();
        assert!(creds.password_hash.is_some());
        assert!(creds.password_salt.is_some());
    }

    #[test]
    fn test_register_duplicate_phone() {
        let db = Database::open_in_memory().unwrap();
        register_client(&db, &form("+79123456789", "secret1", "secret1")).unwrap();

        let result = register_client(&db, &form("+79123456789", "secret9", "secret9"));
        assert!(matches!(result, Err(AuthError::DuplicatePhone(_))));
    }
}
