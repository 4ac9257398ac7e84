//! Vet Clinic Core Library
//!
//! Booking, medical records and clinic administration for a veterinary
//! clinic, backed by a single SQLite file.
//!
//! # Architecture
//!
//! ```text
//!   Client ──register/login──► auth ──────────────┐
//!     │                                            │
//!     ├── pets ──────────────────────────────┐     │
//!     │                                      ▼     ▼
//!     └── pick service/vet/date ──► SlotPlanner ─► Booking ──► appointments
//!                                                              + initial record
//!                                                                   │
//!   Veterinarian ◄── schedule (polled) ◄────────────────────────────┤
//!     │                                                             │
//!     ├── record_visit ──► medical_records ─────────────────────────┤
//!     │                                                             │
//!     └── statistics ◄── monthly / per-service aggregates ◄─────────┘
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite database layer
//! - [`models`]: Domain types (Client, Pet, Service, Appointment, etc.)
//! - [`auth`]: Login, registration and password hashing
//! - [`scheduling`]: Slot grid, availability and booking checks
//! - [`report`]: Statistics export (JSON/CSV)
//! - [`config`]: Clinic settings from file and environment

pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod report;
pub mod scheduling;

// Re-export commonly used types
pub use auth::{authenticate, register_client, AuthError, Registration};
pub use crate::config::{ClinicConfig, ConfigError, ScheduleConfig};
pub use db::{Database, DbError};
pub use models::{
    Appointment, AppointmentFilter, AppointmentStatus, BookingConfirmation, BookingRequest,
    Client, Employee, MedicalRecord, NewMedicalRecord, NewPet, Pet, Role, Service, ServiceQuery,
    Session,
};
pub use report::{StatisticsReport, StatisticsReporter};
pub use scheduling::{Booking, ScheduleError, SlotPlanner, TimeSlot};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VetClinicError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<DbError> for VetClinicError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(_) => VetClinicError::NotFound(e.to_string()),
            DbError::Constraint(_) => VetClinicError::InvalidInput(e.to_string()),
            DbError::SlotTaken { .. } | DbError::InvalidState(_) => {
                VetClinicError::Conflict(e.to_string())
            }
            DbError::Json(_) => VetClinicError::Serialization(e.to_string()),
            DbError::Sqlite(_) => VetClinicError::Database(e.to_string()),
        }
    }
}

impl From<AuthError> for VetClinicError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Database(db) => db.into(),
            AuthError::MissingCredentials | AuthError::InvalidCredentials => {
                VetClinicError::Authentication(e.to_string())
            }
            AuthError::DuplicatePhone(_) => VetClinicError::Conflict(e.to_string()),
            AuthError::AccountNotFound(_) => VetClinicError::NotFound(e.to_string()),
            AuthError::MissingField(_)
            | AuthError::InvalidPhone(_)
            | AuthError::WeakPassword
            | AuthError::PasswordMismatch => VetClinicError::InvalidInput(e.to_string()),
        }
    }
}

impl From<ScheduleError> for VetClinicError {
    fn from(e: ScheduleError) -> Self {
        match e {
            ScheduleError::Database(db) => db.into(),
            other => VetClinicError::InvalidInput(other.to_string()),
        }
    }
}

impl From<ConfigError> for VetClinicError {
    fn from(e: ConfigError) -> Self {
        VetClinicError::InvalidInput(e.to_string())
    }
}

impl From<serde_json::Error> for VetClinicError {
    fn from(e: serde_json::Error) -> Self {
        VetClinicError::Serialization(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for VetClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VetClinicError::Database(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a clinic database at the given path with default settings.
#[uniffi::export]
pub fn open_clinic(path: String) -> Result<Arc<VetClinicCore>, VetClinicError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(VetClinicCore::new(db, ClinicConfig::default())))
}

/// Open the clinic described by a configuration file.
#[uniffi::export]
pub fn open_clinic_with_config(config_path: String) -> Result<Arc<VetClinicCore>, VetClinicError> {
    let config = ClinicConfig::load_from(&config_path)?;
    let db = Database::open(&config.database.path)?;
    Ok(Arc::new(VetClinicCore::new(db, config)))
}

/// Create an in-memory clinic (for testing).
#[uniffi::export]
pub fn open_clinic_in_memory() -> Result<Arc<VetClinicCore>, VetClinicError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(VetClinicCore::new(db, ClinicConfig::default())))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe clinic handle for FFI.
#[derive(uniffi::Object)]
pub struct VetClinicCore {
    db: Arc<Mutex<Database>>,
    config: ClinicConfig,
}

impl VetClinicCore {
    fn new(db: Database, config: ClinicConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            config,
        }
    }
}

#[uniffi::export]
impl VetClinicCore {
    // =========================================================================
    // Accounts
    // =========================================================================

    /// Log in with login, email or phone.
    pub fn login(&self, login: String, password: String) -> Result<FfiSession, VetClinicError> {
        let db = self.db.lock()?;
        let session = authenticate(&db, &login, &password)?;
        Ok(session.into())
    }

    /// Register a client and return its id.
    pub fn register(
        &self,
        full_name: String,
        phone: String,
        password: String,
        confirm_password: String,
        image_url: Option<String>,
    ) -> Result<i64, VetClinicError> {
        let db = self.db.lock()?;
        let registration = Registration {
            full_name,
            phone,
            password,
            confirm_password,
            image_url,
        };
        Ok(register_client(&db, &registration)?)
    }

    pub fn get_client(&self, client_id: i64) -> Result<Option<FfiClient>, VetClinicError> {
        let db = self.db.lock()?;
        Ok(db.get_client(client_id)?.map(Into::into))
    }

    /// Counters for the client profile page.
    pub fn client_summary(&self, client_id: i64) -> Result<FfiClientSummary, VetClinicError> {
        let db = self.db.lock()?;
        Ok(db.client_summary(client_id)?.into())
    }

    /// Update name, phone and email of a client.
    pub fn update_profile(
        &self,
        client_id: i64,
        full_name: String,
        phone: String,
        email: Option<String>,
    ) -> Result<bool, VetClinicError> {
        let db = self.db.lock()?;
        let update = models::ProfileUpdate {
            full_name,
            phone,
            email,
        };
        Ok(db.update_client_profile(client_id, &update)?)
    }

    pub fn update_profile_image(
        &self,
        client_id: i64,
        image_url: Option<String>,
    ) -> Result<bool, VetClinicError> {
        let db = self.db.lock()?;
        Ok(db.update_client_image(client_id, image_url.as_deref())?)
    }

    pub fn change_password(
        &self,
        client_id: i64,
        current_password: String,
        new_password: String,
        confirm_password: String,
    ) -> Result<(), VetClinicError> {
        let db = self.db.lock()?;
        auth::change_client_password(
            &db,
            client_id,
            &current_password,
            &new_password,
            &confirm_password,
        )?;
        Ok(())
    }

    pub fn get_employee(&self, employee_id: i64) -> Result<Option<FfiEmployee>, VetClinicError> {
        let db = self.db.lock()?;
        Ok(db.get_employee(employee_id)?.map(Into::into))
    }

    /// Update an employee's email and birth date (`YYYY-MM-DD`).
    pub fn update_employee_profile(
        &self,
        employee_id: i64,
        email: Option<String>,
        birth_date: Option<String>,
    ) -> Result<bool, VetClinicError> {
        let birth_date = birth_date.as_deref().map(parse_date).transpose()?;
        let db = self.db.lock()?;
        Ok(db.update_employee_profile(employee_id, email.as_deref(), birth_date)?)
    }

    /// Create a veterinarian or administrator account (administration).
    pub fn add_employee(&self, employee: FfiNewEmployee) -> Result<i64, VetClinicError> {
        let role = Role::parse(&employee.role)
            .ok_or_else(|| VetClinicError::InvalidInput(format!("unknown role: {}", employee.role)))?;
        if role == Role::Client {
            return Err(VetClinicError::InvalidInput(
                "clients register themselves; employees must be veterinarians or administrators"
                    .into(),
            ));
        }
        let mut new_employee = models::NewEmployee::new(employee.full_name, role, employee.password);
        new_employee.position = employee.position;
        new_employee.specialty = employee.specialty;
        new_employee.experience_years = employee.experience_years;
        new_employee.email = employee.email;
        new_employee.login = employee.login;
        new_employee.phone = employee.phone;

        let db = self.db.lock()?;
        Ok(db.insert_employee(&new_employee)?)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List services filtered by category and search text, sorted.
    pub fn list_services(
        &self,
        category: Option<String>,
        search: String,
        sort: Option<String>,
    ) -> Result<Vec<FfiService>, VetClinicError> {
        let category = category
            .filter(|c| !c.trim().is_empty())
            .map(|c| {
                models::ServiceCategory::parse(&c)
                    .ok_or_else(|| VetClinicError::InvalidInput(format!("unknown category: {}", c)))
            })
            .transpose()?;
        let sort = sort
            .map(|s| {
                models::ServiceSort::parse(&s)
                    .ok_or_else(|| VetClinicError::InvalidInput(format!("unknown sort: {}", s)))
            })
            .transpose()?
            .unwrap_or_default();

        let db = self.db.lock()?;
        let services = db.list_services()?;
        let query = ServiceQuery {
            category,
            search,
            sort,
        };
        Ok(query.apply(&services).into_iter().map(Into::into).collect())
    }

    /// Add a catalog entry (administration).
    pub fn add_service(&self, service: FfiNewService) -> Result<i64, VetClinicError> {
        let category = models::ServiceCategory::parse(&service.category).ok_or_else(|| {
            VetClinicError::InvalidInput(format!("unknown category: {}", service.category))
        })?;
        let mut new_service = models::NewService::new(service.name, service.price_cents, category);
        new_service.description = service.description;
        new_service.image_url = service.image_url;
        new_service.duration_minutes = service.duration_minutes;
        new_service.is_popular = service.is_popular;

        let db = self.db.lock()?;
        Ok(db.insert_service(&new_service)?)
    }

    pub fn list_veterinarians(&self) -> Result<Vec<FfiEmployee>, VetClinicError> {
        let db = self.db.lock()?;
        Ok(db.list_veterinarians()?.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Pets
    // =========================================================================

    pub fn list_animal_types(&self) -> Result<Vec<FfiAnimalType>, VetClinicError> {
        let db = self.db.lock()?;
        Ok(db
            .list_animal_types()?
            .into_iter()
            .map(|t| FfiAnimalType {
                type_id: t.type_id,
                name: t.name,
            })
            .collect())
    }

    pub fn list_pets(&self, client_id: i64) -> Result<Vec<FfiPet>, VetClinicError> {
        let today = today();
        let db = self.db.lock()?;
        Ok(db
            .list_pets_for_client(client_id)?
            .into_iter()
            .map(|p| FfiPet::from_pet(p, today))
            .collect())
    }

    pub fn add_pet(&self, pet: FfiNewPet) -> Result<FfiPet, VetClinicError> {
        let mut new_pet = NewPet::new(pet.client_id, pet.type_id, pet.name);
        new_pet.breed = pet.breed;
        new_pet.gender = models::Gender::parse(&pet.gender);
        new_pet.birth_date = pet.birth_date.as_deref().map(parse_date).transpose()?;
        new_pet.color = pet.color;
        new_pet.special_marks = pet.special_marks;
        new_pet.notes = pet.notes;

        let db = self.db.lock()?;
        let stored = db.insert_pet(&new_pet)?;
        Ok(FfiPet::from_pet(stored, today()))
    }

    /// Remove a pet; only its owner may do so.
    pub fn delete_pet(&self, pet_id: i64, client_id: i64) -> Result<bool, VetClinicError> {
        let db = self.db.lock()?;
        Ok(db.delete_pet(pet_id, client_id)?)
    }

    pub fn list_medical_records(&self, pet_id: i64) -> Result<Vec<FfiMedicalRecord>, VetClinicError> {
        let db = self.db.lock()?;
        Ok(db
            .list_records_for_pet(pet_id)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    // =========================================================================
    // Booking
    // =========================================================================

    /// Free slots on a date (`YYYY-MM-DD`), for one veterinarian or any.
    pub fn available_slots(
        &self,
        date: String,
        veterinarian_id: Option<i64>,
    ) -> Result<FfiDaySlots, VetClinicError> {
        let date = parse_date(&date)?;
        let db = self.db.lock()?;
        let planner = SlotPlanner::new(&db, &self.config.schedule);
        let slots = match veterinarian_id {
            Some(vet) => planner.slots_for_vet(vet, date, today())?,
            None => planner.slots_for(date, today())?,
        };
        Ok(scheduling::group_by_day_part(&slots).into())
    }

    pub fn book_appointment(
        &self,
        request: FfiBookingRequest,
    ) -> Result<FfiBookingConfirmation, VetClinicError> {
        let request = BookingRequest {
            client_id: request.client_id,
            service_id: request.service_id,
            veterinarian_id: request.veterinarian_id,
            pet_id: request.pet_id,
            date: parse_date(&request.date)?,
            time: scheduling::parse_slot_time(&request.time)?,
            complaints: request.complaints,
            additional_info: request.additional_info,
        };

        let db = self.db.lock()?;
        let confirmation = Booking::new(&db, &self.config.schedule).book(&request, today())?;
        Ok(confirmation.into())
    }

    /// A client's appointments; `filter` is `all`, `upcoming` or `past`.
    pub fn list_appointments(
        &self,
        client_id: i64,
        filter: String,
    ) -> Result<Vec<FfiAppointment>, VetClinicError> {
        let filter = AppointmentFilter::parse(&filter)
            .ok_or_else(|| VetClinicError::InvalidInput(format!("unknown filter: {}", filter)))?;
        let now = now();

        let db = self.db.lock()?;
        let appointments = db.list_client_appointments(client_id)?;
        Ok(models::filter_appointments(&appointments, filter, now)
            .into_iter()
            .map(|a| FfiAppointment::from_appointment(a, now))
            .collect())
    }

    /// Cancel a client's own booking, at least two hours ahead of the visit.
    pub fn cancel_appointment(
        &self,
        appointment_id: i64,
        client_id: i64,
    ) -> Result<(), VetClinicError> {
        let db = self.db.lock()?;
        db.cancel_client_appointment(appointment_id, client_id, now())?;
        Ok(())
    }

    // =========================================================================
    // Veterinarian workspace
    // =========================================================================

    /// Schedule from `from` (`YYYY-MM-DD`, default all) filtered by `search`.
    pub fn vet_schedule(
        &self,
        veterinarian_id: i64,
        from: Option<String>,
        search: Option<String>,
    ) -> Result<Vec<FfiDaySchedule>, VetClinicError> {
        let from = from.as_deref().map(parse_date).transpose()?;
        let db = self.db.lock()?;
        let days = db.list_vet_schedule(veterinarian_id, from)?;
        let days = match search {
            Some(query) => models::search_schedule(&days, &query),
            None => days,
        };
        Ok(days.into_iter().map(Into::into).collect())
    }

    /// Whether the schedule changed after `since` (`YYYY-MM-DD HH:MM:SS`).
    pub fn schedule_changed_since(
        &self,
        veterinarian_id: i64,
        since: String,
    ) -> Result<bool, VetClinicError> {
        let since = NaiveDateTime::parse_from_str(since.trim(), "%Y-%m-%d %H:%M:%S")
            .map_err(|_| VetClinicError::InvalidInput(format!("invalid timestamp: {}", since)))?;
        let db = self.db.lock()?;
        Ok(db.schedule_changed_since(veterinarian_id, since)?)
    }

    /// Polling interval UI shells should use for the schedule.
    pub fn refresh_interval_seconds(&self) -> u64 {
        self.config.schedule.refresh_seconds
    }

    pub fn cancel_appointment_by_staff(&self, appointment_id: i64) -> Result<(), VetClinicError> {
        let db = self.db.lock()?;
        db.cancel_appointment_by_staff(appointment_id)?;
        Ok(())
    }

    /// Write the visit outcome and complete the appointment.
    pub fn record_visit(&self, visit: FfiVisitRecord) -> Result<i64, VetClinicError> {
        let mut record =
            NewMedicalRecord::new(visit.pet_id, visit.veterinarian_id, parse_date(&visit.visit_date)?);
        record.appointment_id = Some(visit.appointment_id);
        record.complaints = visit.complaints;
        record.diagnosis = visit.diagnosis;
        record.recommendations = visit.recommendations;

        let db = self.db.lock()?;
        Ok(db.record_visit(&record)?)
    }

    pub fn vet_patients(&self, veterinarian_id: i64) -> Result<Vec<FfiVetPatient>, VetClinicError> {
        let db = self.db.lock()?;
        Ok(db
            .vet_patients(veterinarian_id, today())?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Statistics report as JSON.
    pub fn statistics_json(&self, veterinarian_id: i64) -> Result<String, VetClinicError> {
        let report = self.statistics(veterinarian_id)?;
        Ok(report.to_json()?)
    }

    /// Statistics report as CSV.
    pub fn statistics_csv(&self, veterinarian_id: i64) -> Result<String, VetClinicError> {
        let report = self.statistics(veterinarian_id)?;
        Ok(report.to_csv())
    }
}

impl VetClinicCore {
    fn statistics(&self, veterinarian_id: i64) -> Result<StatisticsReport, VetClinicError> {
        let db = self.db.lock()?;
        let report = StatisticsReporter::new(&db).build(
            veterinarian_id,
            today(),
            self.config.statistics.window_months,
        )?;
        Ok(report)
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn parse_date(s: &str) -> Result<NaiveDate, VetClinicError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| VetClinicError::InvalidInput(format!("invalid date: {}", s)))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe login result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSession {
    /// "client", "veterinarian" or "administrator"
    pub role: String,
    pub account_id: i64,
}

impl From<Session> for FfiSession {
    fn from(session: Session) -> Self {
        Self {
            role: session.role().as_str().to_string(),
            account_id: session.account_id(),
        }
    }
}

/// FFI-safe client.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClient {
    pub client_id: i64,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub login: Option<String>,
    pub image_url: Option<String>,
}

impl From<Client> for FfiClient {
    fn from(client: Client) -> Self {
        Self {
            client_id: client.client_id,
            full_name: client.full_name,
            phone: client.phone,
            email: client.email,
            login: client.login,
            image_url: client.image_url,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiClientSummary {
    pub appointments_count: u32,
    pub pets_with_records_count: u32,
}

impl From<models::ClientSummary> for FfiClientSummary {
    fn from(summary: models::ClientSummary) -> Self {
        Self {
            appointments_count: summary.appointments_count,
            pets_with_records_count: summary.pets_with_records_count,
        }
    }
}

/// FFI-safe employee.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEmployee {
    pub employee_id: i64,
    pub full_name: String,
    pub role: String,
    pub position: Option<String>,
    pub specialty: Option<String>,
    pub experience: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub image_url: Option<String>,
}

impl From<Employee> for FfiEmployee {
    fn from(employee: Employee) -> Self {
        Self {
            experience: employee.experience_label(),
            employee_id: employee.employee_id,
            full_name: employee.full_name,
            role: employee.role.as_str().to_string(),
            position: employee.position,
            specialty: employee.specialty,
            email: employee.email,
            phone: employee.phone,
            birth_date: employee.birth_date,
            image_url: employee.image_url,
        }
    }
}

/// FFI-safe employee creation data.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewEmployee {
    pub full_name: String,
    pub role: String,
    pub password: String,
    pub position: Option<String>,
    pub specialty: Option<String>,
    pub experience_years: u32,
    pub email: Option<String>,
    pub login: Option<String>,
    pub phone: Option<String>,
}

/// FFI-safe service.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiService {
    pub service_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    /// "1500.00"
    pub price: String,
    pub category: String,
    pub image_url: Option<String>,
    pub duration_minutes: u32,
    pub is_popular: bool,
}

impl From<Service> for FfiService {
    fn from(service: Service) -> Self {
        Self {
            price: models::format_price(service.price_cents),
            service_id: service.service_id,
            name: service.name,
            description: service.description,
            price_cents: service.price_cents,
            category: service.category.as_str().to_string(),
            image_url: service.image_url,
            duration_minutes: service.duration_minutes,
            is_popular: service.is_popular,
        }
    }
}

/// FFI-safe service creation data.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewService {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category: String,
    pub image_url: Option<String>,
    pub duration_minutes: u32,
    pub is_popular: bool,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnimalType {
    pub type_id: i64,
    pub name: String,
}

/// FFI-safe pet.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPet {
    pub pet_id: i64,
    pub client_id: i64,
    pub type_id: i64,
    pub type_name: String,
    pub name: String,
    pub breed: Option<String>,
    pub gender: String,
    pub birth_date: Option<String>,
    /// "1 yr 3 mo", or "unknown"
    pub age: String,
    pub color: Option<String>,
    pub special_marks: Option<String>,
    pub notes: Option<String>,
    pub medical_records_count: u32,
}

impl FfiPet {
    fn from_pet(pet: Pet, today: NaiveDate) -> Self {
        Self {
            age: pet.formatted_age(today),
            pet_id: pet.pet_id,
            client_id: pet.client_id,
            type_id: pet.type_id,
            type_name: pet.type_name,
            name: pet.name,
            breed: pet.breed,
            gender: pet.gender.as_str().to_string(),
            birth_date: pet.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
            color: pet.color,
            special_marks: pet.special_marks,
            notes: pet.notes,
            medical_records_count: pet.medical_records_count,
        }
    }
}

/// FFI-safe pet creation data.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPet {
    pub client_id: i64,
    pub type_id: i64,
    pub name: String,
    pub breed: Option<String>,
    /// "male", "female" or "unknown"
    pub gender: String,
    pub birth_date: Option<String>,
    pub color: Option<String>,
    pub special_marks: Option<String>,
    pub notes: Option<String>,
}

/// FFI-safe medical record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicalRecord {
    pub record_id: i64,
    pub pet_id: i64,
    pub appointment_id: Option<i64>,
    pub veterinarian_name: String,
    pub service_name: Option<String>,
    pub visit_date: String,
    pub complaints: Option<String>,
    pub diagnosis: Option<String>,
    pub recommendations: Option<String>,
}

impl From<MedicalRecord> for FfiMedicalRecord {
    fn from(record: MedicalRecord) -> Self {
        Self {
            record_id: record.record_id,
            pet_id: record.pet_id,
            appointment_id: record.appointment_id,
            veterinarian_name: record.veterinarian_name,
            service_name: record.service_name,
            visit_date: record.visit_date.format("%Y-%m-%d").to_string(),
            complaints: record.complaints,
            diagnosis: record.diagnosis,
            recommendations: record.recommendations,
        }
    }
}

/// FFI-safe visit outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVisitRecord {
    pub appointment_id: i64,
    pub pet_id: i64,
    pub veterinarian_id: i64,
    pub visit_date: String,
    pub complaints: Option<String>,
    pub diagnosis: Option<String>,
    pub recommendations: Option<String>,
}

/// Free slots grouped by day part, as `HH:MM`.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDaySlots {
    pub morning: Vec<String>,
    pub afternoon: Vec<String>,
    pub evening: Vec<String>,
}

impl From<scheduling::DaySlots> for FfiDaySlots {
    fn from(slots: scheduling::DaySlots) -> Self {
        let labels = |v: Vec<TimeSlot>| -> Vec<String> { v.iter().map(TimeSlot::label).collect() };
        Self {
            morning: labels(slots.morning),
            afternoon: labels(slots.afternoon),
            evening: labels(slots.evening),
        }
    }
}

/// FFI-safe booking request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBookingRequest {
    pub client_id: i64,
    pub service_id: i64,
    pub veterinarian_id: i64,
    pub pet_id: i64,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub complaints: Option<String>,
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBookingConfirmation {
    pub appointment_id: i64,
    pub medical_record_id: i64,
    pub service_name: String,
    pub veterinarian_name: String,
    pub pet_name: String,
    pub date: String,
    pub time: String,
    pub price_cents: i64,
}

impl From<BookingConfirmation> for FfiBookingConfirmation {
    fn from(c: BookingConfirmation) -> Self {
        Self {
            appointment_id: c.appointment_id,
            medical_record_id: c.medical_record_id,
            service_name: c.service_name,
            veterinarian_name: c.veterinarian_name,
            pet_name: c.pet_name,
            date: c.date.format("%Y-%m-%d").to_string(),
            time: c.time.format("%H:%M").to_string(),
            price_cents: c.price_cents,
        }
    }
}

/// FFI-safe appointment with its derived status.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub appointment_id: i64,
    pub veterinarian_name: String,
    pub service_name: String,
    pub pet_name: Option<String>,
    pub date: String,
    pub time: String,
    /// "dd.mm.yyyy HH:MM"
    pub display_date_time: String,
    pub price_cents: i64,
    /// "Upcoming", "Completed" or "Cancelled"
    pub status: String,
}

impl FfiAppointment {
    fn from_appointment(appointment: Appointment, now: NaiveDateTime) -> Self {
        Self {
            status: appointment.status_at(now).label().to_string(),
            display_date_time: appointment.formatted_date_time(),
            date: appointment.appointment_date.format("%Y-%m-%d").to_string(),
            time: appointment.appointment_time.format("%H:%M").to_string(),
            appointment_id: appointment.appointment_id,
            veterinarian_name: appointment.veterinarian_name,
            service_name: appointment.service_name,
            pet_name: appointment.pet_name,
            price_cents: appointment.price_cents,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiScheduleEntry {
    pub appointment_id: i64,
    pub time: String,
    pub client_name: String,
    pub client_phone: String,
    pub service_name: String,
    pub pet_name: Option<String>,
    pub status: String,
    pub notes: Option<String>,
}

/// One day of a veterinarian's schedule.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDaySchedule {
    pub date: String,
    pub entries: Vec<FfiScheduleEntry>,
}

impl From<models::DaySchedule> for FfiDaySchedule {
    fn from(day: models::DaySchedule) -> Self {
        Self {
            date: day.date.format("%Y-%m-%d").to_string(),
            entries: day
                .entries
                .into_iter()
                .map(|e| FfiScheduleEntry {
                    appointment_id: e.appointment_id,
                    time: e.appointment_time.format("%H:%M").to_string(),
                    client_name: e.client_name,
                    client_phone: e.client_phone,
                    service_name: e.service_name,
                    pet_name: e.pet_name,
                    status: e.status.as_str().to_string(),
                    notes: e.notes,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVetPatient {
    pub pet_id: i64,
    pub pet_name: String,
    pub type_name: String,
    pub breed: Option<String>,
    pub age_years: Option<u32>,
    pub owner_name: String,
}

impl From<models::VetPatient> for FfiVetPatient {
    fn from(p: models::VetPatient) -> Self {
        Self {
            pet_id: p.pet_id,
            pet_name: p.pet_name,
            type_name: p.type_name,
            breed: p.breed,
            age_years: p.age_years,
            owner_name: p.owner_name,
        }
    }
}
