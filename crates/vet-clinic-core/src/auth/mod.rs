//! Authentication and client registration.
//!
//! Login tries the client table first (login, email or phone), then the
//! employee table (login or email). A failed lookup and a wrong password
//! produce the same error.

mod password;
mod registration;

pub use password::*;
pub use registration::*;

use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{CredentialRecord, Session};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Login and password are required")]
    MissingCredentials,

    #[error("Invalid login or password")]
    InvalidCredentials,

    #[error("Required field is empty: {0}")]
    MissingField(&'static str),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Password must be at least 6 characters")]
    WeakPassword,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Phone number is already registered: {0}")]
    DuplicatePhone(String),

    #[error("Account not found: {0}")]
    AccountNotFound(i64),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Log in with a login/email/phone and password.
pub fn authenticate(db: &Database, login: &str, password: &str) -> AuthResult<Session> {
    let login = login.trim();
    if login.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    if let Some(creds) = db.find_client_credentials(login)? {
        if credentials_match(&creds, password) {
            tracing::info!(client_id = creds.account_id, "client logged in");
            return Ok(Session::Client {
                client_id: creds.account_id,
            });
        }
    }

    if let Some(creds) = db.find_employee_credentials(login)? {
        if credentials_match(&creds, password) {
            tracing::info!(
                employee_id = creds.account_id,
                role = creds.role.as_str(),
                "employee logged in"
            );
            return Ok(Session::Employee {
                employee_id: creds.account_id,
                role: creds.role,
            });
        }
    }

    tracing::warn!("rejected login attempt");
    Err(AuthError::InvalidCredentials)
}

/// Change a client's password after checking the current one.
///
/// The new password must be typed twice and pass the strength rule.
pub fn change_client_password(
    db: &Database,
    client_id: i64,
    current_password: &str,
    new_password: &str,
    confirm_password: &str,
) -> AuthResult<()> {
    let creds = db
        .client_credentials(client_id)?
        .ok_or(AuthError::AccountNotFound(client_id))?;

    if !credentials_match(&creds, current_password) {
        return Err(AuthError::InvalidCredentials);
    }
    check_password_strength(new_password)?;
    if new_password != confirm_password {
        return Err(AuthError::PasswordMismatch);
    }

    db.set_client_password(client_id, &hash_password(new_password))?;
    tracing::info!(client_id, "client password changed");
    Ok(())
}

/// Enforce the minimum password length.
pub fn check_password_strength(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

fn credentials_match(creds: &CredentialRecord, password: &str) -> bool {
    match (&creds.password_hash, &creds.password_salt) {
        (Some(hash), Some(salt)) => verify_password(password, hash, salt),
        // Accounts without a stored password cannot log in
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewEmployee, Role};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn register(db: &Database, phone: &str, password: &str) -> i64 {
        let registration = Registration {
            full_name: "Ivan Ivanov".into(),
            phone: phone.into(),
            password: password.into(),
            confirm_password: password.into(),
            image_url: None,
        };
        register_client(db, &registration).unwrap()
    }

    #[test]
    fn test_client_login_by_phone() {
        let db = setup_db();
        let id = register(&db, "+79001234567", "secret1");

        let session = authenticate(&db, " +79001234567 ", "secret1").unwrap();
        assert_eq!(session, Session::Client { client_id: id });
    }

    #[test]
    fn test_wrong_password_rejected() {
        let db = setup_db();
        register(&db, "+79001234567", "secret1");

        let result = authenticate(&db, "+79001234567", "secret2");
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn test_unknown_login_rejected() {
        let db = setup_db();
        let result = authenticate(&db, "ghost", "whatever");
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[test]
    fn test_missing_credentials() {
        let db = setup_db();
        assert!(matches!(
            authenticate(&db, "  ", "pw"),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            authenticate(&db, "user", ""),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_employee_login() {
        let db = setup_db();
        let mut vet = NewEmployee::new("Dr. Vet".into(), Role::Veterinarian, "vetpass".into());
        vet.email = Some("vet@clinic.test".into());
        let id = db.insert_employee(&vet).unwrap();

        let session = authenticate(&db, "vet@clinic.test", "vetpass").unwrap();
        assert_eq!(
            session,
            Session::Employee {
                employee_id: id,
                role: Role::Veterinarian
            }
        );
    }

    #[test]
    fn test_falls_through_to_employee_when_client_password_differs() {
        let db = setup_db();
        let mut client = crate::models::NewClient::new("Shared".into(), "+79001234567".into());
        client.email = Some("shared@clinic.test".into());
        db.insert_client(&client, &hash_password("clientpw")).unwrap();

        let mut admin = NewEmployee::new("Admin".into(), Role::Administrator, "adminpw".into());
        admin.email = Some("shared@clinic.test".into());
        db.insert_employee(&admin).unwrap();

        let session = authenticate(&db, "shared@clinic.test", "adminpw").unwrap();
        assert_eq!(session.role(), Role::Administrator);
    }

    #[test]
    fn test_change_password() {
        let db = setup_db();
        let id = register(&db, "+79001234567", "secret1");

        assert!(matches!(
            change_client_password(&db, id, "wrong", "newsecret", "newsecret"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            change_client_password(&db, id, "secret1", "short", "short"),
            Err(AuthError::WeakPassword)
        ));
        assert!(matches!(
            change_client_password(&db, id, "secret1", "newsecret", "newsecrte"),
            Err(AuthError::PasswordMismatch)
        ));
        // A mismatched confirmation leaves the old password in place
        assert!(authenticate(&db, "+79001234567", "secret1").is_ok());

        change_client_password(&db, id, "secret1", "newsecret", "newsecret").unwrap();
        assert!(authenticate(&db, "+79001234567", "newsecret").is_ok());
        assert!(authenticate(&db, "+79001234567", "secret1").is_err());
    }

    #[test]
    fn test_change_password_unknown_client() {
        let db = setup_db();
        assert!(matches!(
            change_client_password(&db, 99, "a", "bbbbbbbb", "bbbbbbbb"),
            Err(AuthError::AccountNotFound(99))
        ));
    }
}
