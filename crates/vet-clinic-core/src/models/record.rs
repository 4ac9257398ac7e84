//! Medical record models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single entry in a pet's medical card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalRecord {
    pub record_id: i64,
    pub pet_id: i64,
    /// Appointment the record was written for, if any
    pub appointment_id: Option<i64>,
    pub veterinarian_id: i64,
    pub veterinarian_name: String,
    /// Service of the linked appointment
    pub service_name: Option<String>,
    pub visit_date: NaiveDate,
    pub complaints: Option<String>,
    pub diagnosis: Option<String>,
    pub recommendations: Option<String>,
}

/// Data needed to write a medical record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMedicalRecord {
    pub pet_id: i64,
    pub appointment_id: Option<i64>,
    pub veterinarian_id: i64,
    pub visit_date: NaiveDate,
    pub complaints: Option<String>,
    pub diagnosis: Option<String>,
    pub recommendations: Option<String>,
}

impl NewMedicalRecord {
    pub fn new(pet_id: i64, veterinarian_id: i64, visit_date: NaiveDate) -> Self {
        Self {
            pet_id,
            appointment_id: None,
            veterinarian_id,
            visit_date,
            complaints: None,
            diagnosis: None,
            recommendations: None,
        }
    }
}

/// Diagnosis written on the record created together with a booking.
pub const INITIAL_DIAGNOSIS: &str = "Initial examination";
