//! Client and staff account models.

use serde::{Deserialize, Serialize};

/// Account role. Ids match the seeded `roles` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Veterinarian,
    Administrator,
}

impl Role {
    /// Database id of the role.
    pub fn id(self) -> i64 {
        match self {
            Role::Client => 1,
            Role::Veterinarian => 2,
            Role::Administrator => 3,
        }
    }

    /// Look up a role by its database id.
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Role::Client),
            2 => Some(Role::Veterinarian),
            3 => Some(Role::Administrator),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Veterinarian => "veterinarian",
            Role::Administrator => "administrator",
        }
    }

    /// Parse a role name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "client" => Some(Role::Client),
            "veterinarian" | "vet" => Some(Role::Veterinarian),
            "administrator" | "admin" => Some(Role::Administrator),
            _ => None,
        }
    }
}

/// A registered clinic client (pet owner).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub client_id: i64,
    /// Full name as entered at registration
    pub full_name: String,
    /// Phone number, unique across clients and usable as a login
    pub phone: String,
    pub email: Option<String>,
    /// Optional explicit login name
    pub login: Option<String>,
    /// Profile picture location (path or URL)
    pub image_url: Option<String>,
    pub created_at: String,
}

/// Validated data for a new client row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewClient {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub login: Option<String>,
    pub image_url: Option<String>,
}

impl NewClient {
    pub fn new(full_name: String, phone: String) -> Self {
        Self {
            full_name,
            phone,
            email: None,
            login: None,
            image_url: None,
        }
    }
}

/// A clinic employee (veterinarian or administrator).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub employee_id: i64,
    pub full_name: String,
    pub role: Role,
    /// Job title shown to clients (e.g., "Surgeon")
    pub position: Option<String>,
    pub specialty: Option<String>,
    /// Years of practice
    pub experience_years: u32,
    pub email: Option<String>,
    pub login: Option<String>,
    pub phone: Option<String>,
    /// Date of birth (YYYY-MM-DD)
    pub birth_date: Option<String>,
    pub image_url: Option<String>,
}

impl Employee {
    /// Check if this employee can take appointments.
    pub fn is_veterinarian(&self) -> bool {
        self.role == Role::Veterinarian
    }

    /// Human-readable experience ("1 year", "7 years").
    pub fn experience_label(&self) -> String {
        match self.experience_years {
            1 => "1 year".to_string(),
            n => format!("{} years", n),
        }
    }
}

/// Data needed to create an employee account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEmployee {
    pub full_name: String,
    pub role: Role,
    pub position: Option<String>,
    pub specialty: Option<String>,
    pub experience_years: u32,
    pub email: Option<String>,
    pub login: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    /// Plaintext password; hashed before it reaches the database
    pub password: String,
}

impl NewEmployee {
    /// Create a new employee with required fields.
    pub fn new(full_name: String, role: Role, password: String) -> Self {
        Self {
            full_name,
            role,
            position: None,
            specialty: None,
            experience_years: 0,
            email: None,
            login: None,
            phone: None,
            image_url: None,
            password,
        }
    }
}

/// Editable part of a client profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Stored credentials for an account, as read during login.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialRecord {
    pub account_id: i64,
    pub role: Role,
    pub password_hash: Option<String>,
    pub password_salt: Option<String>,
}

/// Result of a successful login.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Session {
    Client { client_id: i64 },
    Employee { employee_id: i64, role: Role },
}

impl Session {
    pub fn role(&self) -> Role {
        match self {
            Session::Client { .. } => Role::Client,
            Session::Employee { role, .. } => *role,
        }
    }

    /// Id of the logged-in account in its own table.
    pub fn account_id(&self) -> i64 {
        match self {
            Session::Client { client_id } => *client_id,
            Session::Employee { employee_id, .. } => *employee_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ids_round_trip() {
        for role in [Role::Client, Role::Veterinarian, Role::Administrator] {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(42), None);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("Vet"), Some(Role::Veterinarian));
        assert_eq!(Role::parse(" admin "), Some(Role::Administrator));
        assert_eq!(Role::parse("nurse"), None);
    }

    #[test]
    fn test_experience_label() {
        let mut employee = Employee {
            employee_id: 1,
            full_name: "Anna Petrova".into(),
            role: Role::Veterinarian,
            position: None,
            specialty: None,
            experience_years: 1,
            email: None,
            login: None,
            phone: None,
            birth_date: None,
            image_url: None,
        };
        assert_eq!(employee.experience_label(), "1 year");
        employee.experience_years = 12;
        assert_eq!(employee.experience_label(), "12 years");
        assert!(employee.is_veterinarian());
    }

    #[test]
    fn test_session_accessors() {
        let session = Session::Employee {
            employee_id: 7,
            role: Role::Veterinarian,
        };
        assert_eq!(session.account_id(), 7);
        assert_eq!(session.role(), Role::Veterinarian);

        let session = Session::Client { client_id: 3 };
        assert_eq!(session.role(), Role::Client);
    }
}
