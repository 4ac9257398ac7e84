//! Pet models.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Species/kind of animal (seeded reference table).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimalType {
    pub type_id: i64,
    pub name: String,
}

/// Pet gender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }

    /// Parse a gender tag; anything unrecognised maps to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Gender::Male,
            "female" | "f" => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

/// A pet owned by a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pet {
    pub pet_id: i64,
    /// Owning client
    pub client_id: i64,
    pub type_id: i64,
    /// Animal type name (joined from `animal_types`)
    pub type_name: String,
    pub name: String,
    pub breed: Option<String>,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub color: Option<String>,
    pub special_marks: Option<String>,
    pub notes: Option<String>,
    /// Number of medical records on file
    pub medical_records_count: u32,
}

/// Data needed to register a pet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPet {
    pub client_id: i64,
    pub type_id: i64,
    pub name: String,
    pub breed: Option<String>,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub color: Option<String>,
    pub special_marks: Option<String>,
    pub notes: Option<String>,
}

impl NewPet {
    /// Create a new pet with required fields.
    pub fn new(client_id: i64, type_id: i64, name: String) -> Self {
        Self {
            client_id,
            type_id,
            name,
            breed: None,
            gender: Gender::Unknown,
            birth_date: None,
            color: None,
            special_marks: None,
            notes: None,
        }
    }
}

/// Age broken down into whole years and remaining months.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PetAge {
    pub years: u32,
    pub months: u32,
}

impl PetAge {
    /// Compute age between a birth date and `today`. `None` if born in the future.
    pub fn between(birth_date: NaiveDate, today: NaiveDate) -> Option<Self> {
        if birth_date > today {
            return None;
        }
        let mut total_months = (today.year() - birth_date.year()) * 12
            + today.month() as i32
            - birth_date.month() as i32;
        if today.day() < birth_date.day() {
            total_months -= 1;
        }
        let total_months = total_months.max(0) as u32;
        Some(Self {
            years: total_months / 12,
            months: total_months % 12,
        })
    }

    /// Short display form: "2 yr", "5 mo", "1 yr 3 mo", "< 1 mo".
    pub fn display(&self) -> String {
        match (self.years, self.months) {
            (0, 0) => "< 1 mo".to_string(),
            (0, m) => format!("{} mo", m),
            (y, 0) => format!("{} yr", y),
            (y, m) => format!("{} yr {} mo", y, m),
        }
    }
}

impl Pet {
    /// Age of the pet on a given day, if the birth date is known.
    pub fn age_on(&self, today: NaiveDate) -> Option<PetAge> {
        self.birth_date.and_then(|b| PetAge::between(b, today))
    }

    /// Formatted age, or "unknown".
    pub fn formatted_age(&self, today: NaiveDate) -> String {
        self.age_on(today)
            .map(|age| age.display())
            .unwrap_or_else(|| "unknown".to_string())
    }
}
