//! SQLite schema definition.

/// Complete database schema for vet-clinic.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Reference data
-- ============================================================================

CREATE TABLE IF NOT EXISTS roles (
    role_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

INSERT OR IGNORE INTO roles (role_id, name) VALUES (1, 'client');
INSERT OR IGNORE INTO roles (role_id, name) VALUES (2, 'veterinarian');
INSERT OR IGNORE INTO roles (role_id, name) VALUES (3, 'administrator');

CREATE TABLE IF NOT EXISTS animal_types (
    type_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

INSERT OR IGNORE INTO animal_types (type_id, name) VALUES (1, 'Cat');
INSERT OR IGNORE INTO animal_types (type_id, name) VALUES (2, 'Dog');
INSERT OR IGNORE INTO animal_types (type_id, name) VALUES (3, 'Rodent');
INSERT OR IGNORE INTO animal_types (type_id, name) VALUES (4, 'Bird');
INSERT OR IGNORE INTO animal_types (type_id, name) VALUES (5, 'Reptile');
INSERT OR IGNORE INTO animal_types (type_id, name) VALUES (6, 'Other');

-- ============================================================================
-- Accounts
-- ============================================================================

CREATE TABLE IF NOT EXISTS clients (
    client_id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    phone TEXT NOT NULL UNIQUE,
    email TEXT,
    login TEXT UNIQUE,
    password_hash TEXT,                          -- hex SHA-256 of salt || password
    password_salt TEXT,
    image_url TEXT,
    role_id INTEGER NOT NULL DEFAULT 1 REFERENCES roles(role_id),
    created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE INDEX IF NOT EXISTS idx_clients_email ON clients(email);

CREATE TABLE IF NOT EXISTS employees (
    employee_id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT NOT NULL,
    role_id INTEGER NOT NULL REFERENCES roles(role_id),
    position TEXT,
    specialty TEXT,
    experience_years INTEGER NOT NULL DEFAULT 0 CHECK (experience_years >= 0),
    email TEXT,
    login TEXT UNIQUE,
    phone TEXT,
    birth_date TEXT,
    password_hash TEXT,
    password_salt TEXT,
    image_url TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE INDEX IF NOT EXISTS idx_employees_role ON employees(role_id);
CREATE INDEX IF NOT EXISTS idx_employees_email ON employees(email);

-- ============================================================================
-- Pets
-- ============================================================================

CREATE TABLE IF NOT EXISTS pets (
    pet_id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id INTEGER NOT NULL REFERENCES clients(client_id) ON DELETE CASCADE,
    type_id INTEGER NOT NULL REFERENCES animal_types(type_id),
    name TEXT NOT NULL,
    breed TEXT,
    gender TEXT NOT NULL DEFAULT 'unknown' CHECK (gender IN ('male', 'female', 'unknown')),
    birth_date TEXT,
    color TEXT,
    special_marks TEXT,
    notes TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE INDEX IF NOT EXISTS idx_pets_client ON pets(client_id);

-- ============================================================================
-- Service catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS services (
    service_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
    category TEXT NOT NULL DEFAULT 'examination',
    image_url TEXT,
    duration_minutes INTEGER NOT NULL DEFAULT 30 CHECK (duration_minutes > 0),
    is_popular INTEGER NOT NULL DEFAULT 0
);

-- ============================================================================
-- Appointments
-- ============================================================================

CREATE TABLE IF NOT EXISTS appointments (
    appointment_id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id INTEGER NOT NULL REFERENCES clients(client_id) ON DELETE CASCADE,
    veterinarian_id INTEGER NOT NULL REFERENCES employees(employee_id),
    service_id INTEGER NOT NULL REFERENCES services(service_id),
    pet_id INTEGER REFERENCES pets(pet_id) ON DELETE SET NULL,
    appointment_date TEXT NOT NULL,              -- YYYY-MM-DD
    appointment_time TEXT NOT NULL,              -- HH:MM:SS
    status TEXT NOT NULL DEFAULT 'scheduled' CHECK (status IN ('scheduled', 'completed', 'cancelled')),
    notes TEXT,
    booked_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

-- A veterinarian holds at most one live appointment per slot
CREATE UNIQUE INDEX IF NOT EXISTS idx_appointments_vet_slot
    ON appointments(veterinarian_id, appointment_date, appointment_time)
    WHERE status <> 'cancelled';

CREATE INDEX IF NOT EXISTS idx_appointments_client ON appointments(client_id);
CREATE INDEX IF NOT EXISTS idx_appointments_date ON appointments(appointment_date);

-- ============================================================================
-- Medical records
-- ============================================================================

CREATE TABLE IF NOT EXISTS medical_records (
    record_id INTEGER PRIMARY KEY AUTOINCREMENT,
    pet_id INTEGER NOT NULL REFERENCES pets(pet_id) ON DELETE CASCADE,
    appointment_id INTEGER REFERENCES appointments(appointment_id) ON DELETE CASCADE,
    veterinarian_id INTEGER NOT NULL REFERENCES employees(employee_id),
    visit_date TEXT NOT NULL,
    complaints TEXT,
    diagnosis TEXT,
    recommendations TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
);

CREATE INDEX IF NOT EXISTS idx_records_pet ON medical_records(pet_id);
CREATE INDEX IF NOT EXISTS idx_records_appointment ON medical_records(appointment_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let roles: i64 = conn
            .query_row("SELECT COUNT(*) FROM roles", [], |row| row.get(0))
            .unwrap();
        assert_eq!(roles, 3);
    }

    #[test]
    fn test_vet_slot_unique_ignores_cancelled() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO clients (client_id, full_name, phone) VALUES (1, 'Ivan', '+79001112233');
            INSERT INTO employees (employee_id, full_name, role_id) VALUES (1, 'Dr. Vet', 2);
            INSERT INTO services (service_id, name, price_cents) VALUES (1, 'Exam', 1000);
            INSERT INTO appointments (client_id, veterinarian_id, service_id, appointment_date, appointment_time, status)
            VALUES (1, 1, 1, '2024-06-10', '09:00:00', 'cancelled');
            "#,
        )
        .unwrap();

        // Cancelled row does not hold the slot
        let result = conn.execute(
            "INSERT INTO appointments (client_id, veterinarian_id, service_id, appointment_date, appointment_time)
             VALUES (1, 1, 1, '2024-06-10', '09:00:00')",
            [],
        );
        assert!(result.is_ok());

        // A second live booking for the same slot is rejected
        let result = conn.execute(
            "INSERT INTO appointments (client_id, veterinarian_id, service_id, appointment_date, appointment_time)
             VALUES (1, 1, 1, '2024-06-10', '09:00:00')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_gender_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute(
            "INSERT INTO clients (client_id, full_name, phone) VALUES (1, 'Ivan', '+79001112233')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO pets (client_id, type_id, name, gender) VALUES (1, 1, 'Barsik', 'tomcat')",
            [],
        );
        assert!(result.is_err());
    }
}
