//! Service catalog models.

use serde::{Deserialize, Serialize};

/// Service category used for catalog filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Examination,
    Prevention,
    Aesthetics,
    Surgery,
    Dental,
    Diagnostics,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 6] = [
        ServiceCategory::Examination,
        ServiceCategory::Prevention,
        ServiceCategory::Aesthetics,
        ServiceCategory::Surgery,
        ServiceCategory::Dental,
        ServiceCategory::Diagnostics,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceCategory::Examination => "examination",
            ServiceCategory::Prevention => "prevention",
            ServiceCategory::Aesthetics => "aesthetics",
            ServiceCategory::Surgery => "surgery",
            ServiceCategory::Dental => "dental",
            ServiceCategory::Diagnostics => "diagnostics",
        }
    }

    /// Parse a lowercase category tag.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// A bookable clinic service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub service_id: i64,
    /// Display name (e.g., "Vaccination")
    pub name: String,
    pub description: Option<String>,
    /// Price in minor currency units
    pub price_cents: i64,
    pub category: ServiceCategory,
    pub image_url: Option<String>,
    /// Expected duration in minutes
    pub duration_minutes: u32,
    /// Highlighted in the catalog
    pub is_popular: bool,
}

/// Data needed to add a service to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub category: ServiceCategory,
    pub image_url: Option<String>,
    pub duration_minutes: u32,
    pub is_popular: bool,
}

impl NewService {
    pub fn new(name: String, price_cents: i64, category: ServiceCategory) -> Self {
        Self {
            name,
            description: None,
            price_cents,
            category,
            image_url: None,
            duration_minutes: 30,
            is_popular: false,
        }
    }
}

/// Catalog sort order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServiceSort {
    /// Catalog order (by id)
    #[default]
    Popularity,
    PriceAsc,
    PriceDesc,
    Name,
}

impl ServiceSort {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "popularity" | "popular" => Some(ServiceSort::Popularity),
            "price_asc" | "price" => Some(ServiceSort::PriceAsc),
            "price_desc" => Some(ServiceSort::PriceDesc),
            "name" | "alpha" => Some(ServiceSort::Name),
            _ => None,
        }
    }
}

/// Filter, search and sort applied to the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceQuery {
    /// `None` means all categories
    pub category: Option<ServiceCategory>,
    /// Case-insensitive substring matched against name and description
    pub search: String,
    pub sort: ServiceSort,
}

impl ServiceQuery {
    /// Apply the query to a list of services.
    pub fn apply(&self, services: &[Service]) -> Vec<Service> {
        let needle = self.search.trim().to_lowercase();

        let mut result: Vec<Service> = services
            .iter()
            .filter(|s| self.category.map_or(true, |c| s.category == c))
            .filter(|s| {
                needle.is_empty()
                    || s.name.to_lowercase().contains(&needle)
                    || s.description
                        .as_ref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();

        match self.sort {
            ServiceSort::Popularity => result.sort_by_key(|s| s.service_id),
            ServiceSort::PriceAsc => result.sort_by_key(|s| s.price_cents),
            ServiceSort::PriceDesc => result.sort_by(|a, b| b.price_cents.cmp(&a.price_cents)),
            ServiceSort::Name => result.sort_by_key(|s| s.name.to_lowercase()),
        }

        result
    }
}

/// Render minor units as a decimal amount ("1500.00").
pub fn format_price(price_cents: i64) -> String {
    let sign = if price_cents < 0 { "-" } else { "" };
    let abs = price_cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}
