//! Service catalog database operations.

use rusqlite::{params, OptionalExtension};

use super::{non_empty, Database, DbError, DbResult};
use crate::models::{NewService, Service, ServiceCategory};

impl Database {
    /// Add a service to the catalog.
    pub fn insert_service(&self, service: &NewService) -> DbResult<i64> {
        validate_service(&service.name, service.price_cents, service.duration_minutes)?;
        self.conn.execute(
            r#"
            INSERT INTO services (
                name, description, price_cents, category,
                image_url, duration_minutes, is_popular
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                service.name.trim(),
                non_empty(service.description.as_deref()),
                service.price_cents,
                service.category.as_str(),
                non_empty(service.image_url.as_deref()),
                service.duration_minutes,
                service.is_popular,
            ],
        )?;
        let service_id = self.conn.last_insert_rowid();
        tracing::info!(service_id, "added service");
        Ok(service_id)
    }

    /// Get a service by ID.
    pub fn get_service(&self, service_id: i64) -> DbResult<Option<Service>> {
        self.conn
            .query_row(
                r#"
                SELECT service_id, name, description, price_cents, category,
                       image_url, duration_minutes, is_popular
                FROM services
                WHERE service_id = ?
                "#,
                [service_id],
                |row| {
                    Ok(ServiceRow {
                        service_id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        price_cents: row.get(3)?,
                        category: row.get(4)?,
                        image_url: row.get(5)?,
                        duration_minutes: row.get(6)?,
                        is_popular: row.get(7)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List the whole catalog in id order.
    pub fn list_services(&self) -> DbResult<Vec<Service>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT service_id, name, description, price_cents, category,
                   image_url, duration_minutes, is_popular
            FROM services
            ORDER BY service_id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ServiceRow {
                service_id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                price_cents: row.get(3)?,
                category: row.get(4)?,
                image_url: row.get(5)?,
                duration_minutes: row.get(6)?,
                is_popular: row.get(7)?,
            })
        })?;

        let mut services = Vec::new();
        for row in rows {
            services.push(row?.try_into()?);
        }
        Ok(services)
    }

    /// Update a catalog entry.
    pub fn update_service(&self, service: &Service) -> DbResult<bool> {
        validate_service(&service.name, service.price_cents, service.duration_minutes)?;
        let rows_affected = self.conn.execute(
            r#"
            UPDATE services SET
                name = ?2,
                description = ?3,
                price_cents = ?4,
                category = ?5,
                image_url = ?6,
                duration_minutes = ?7,
                is_popular = ?8
            WHERE service_id = ?1
            "#,
            params![
                service.service_id,
                service.name.trim(),
                non_empty(service.description.as_deref()),
                service.price_cents,
                service.category.as_str(),
                non_empty(service.image_url.as_deref()),
                service.duration_minutes,
                service.is_popular,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a service. Fails while appointments still reference it.
    pub fn delete_service(&self, service_id: i64) -> DbResult<bool> {
        let in_use: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM appointments WHERE service_id = ?)",
            [service_id],
            |row| row.get(0),
        )?;
        if in_use {
            return Err(DbError::Constraint(format!(
                "service {} has appointments",
                service_id
            )));
        }
        let rows_affected = self
            .conn
            .execute("DELETE FROM services WHERE service_id = ?", [service_id])?;
        Ok(rows_affected > 0)
    }
}

fn validate_service(name: &str, price_cents: i64, duration_minutes: u32) -> DbResult<()> {
    if name.trim().is_empty() {
        return Err(DbError::Constraint("service name is required".into()));
    }
    if price_cents < 0 {
        return Err(DbError::Constraint("price cannot be negative".into()));
    }
    if duration_minutes == 0 {
        return Err(DbError::Constraint("duration must be positive".into()));
    }
    Ok(())
}

/// Intermediate row struct for database mapping.
struct ServiceRow {
    service_id: i64,
    name: String,
    description: Option<String>,
    price_cents: i64,
    category: String,
    image_url: Option<String>,
    duration_minutes: u32,
    is_popular: bool,
}

impl TryFrom<ServiceRow> for Service {
    type Error = DbError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        let category = ServiceCategory::parse(&row.category)
            .ok_or_else(|| DbError::Constraint(format!("Unknown service category: {}", row.category)))?;

        Ok(Service {
            service_id: row.service_id,
            name: row.name,
            description: row.description,
            price_cents: row.price_cents,
            category,
            image_url: row.image_url,
            duration_minutes: row.duration_minutes,
            is_popular: row.is_popular,
        })
    }
}
