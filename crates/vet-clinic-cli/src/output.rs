//! Plain-text rendering of clinic data for the terminal.

use chrono::{NaiveDate, NaiveDateTime};
use vet_clinic_core::models::{
    format_price, Appointment, DaySchedule, Employee, MedicalRecord, Pet, Service, VetPatient,
};
use vet_clinic_core::scheduling::DaySlots;
use vet_clinic_core::TimeSlot;

/// A left-aligned text table with a header row.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render with columns padded to their widest cell.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }

        let mut out = String::new();
        out.push_str(&render_row(&self.headers, &widths));
        out.push_str(&render_row(
            &widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>(),
            &widths,
        ));
        for row in &self.rows {
            out.push_str(&render_row(row, &widths));
        }
        out
    }
}

fn render_row(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

pub fn services_table(services: &[Service]) -> Table {
    let mut table = Table::new(&["ID", "NAME", "CATEGORY", "PRICE", "MINUTES", "POPULAR"]);
    for s in services {
        table.push(vec![
            s.service_id.to_string(),
            s.name.clone(),
            s.category.as_str().to_string(),
            format_price(s.price_cents),
            s.duration_minutes.to_string(),
            if s.is_popular { "yes" } else { "" }.to_string(),
        ]);
    }
    table
}

pub fn veterinarians_table(vets: &[Employee]) -> Table {
    let mut table = Table::new(&["ID", "NAME", "POSITION", "SPECIALTY", "EXPERIENCE"]);
    for v in vets {
        table.push(vec![
            v.employee_id.to_string(),
            v.full_name.clone(),
            or_dash(v.position.as_deref()),
            or_dash(v.specialty.as_deref()),
            v.experience_label(),
        ]);
    }
    table
}

pub fn pets_table(pets: &[Pet], today: NaiveDate) -> Table {
    let mut table = Table::new(&["ID", "NAME", "TYPE", "BREED", "GENDER", "AGE", "RECORDS"]);
    for p in pets {
        table.push(vec![
            p.pet_id.to_string(),
            p.name.clone(),
            p.type_name.clone(),
            or_dash(p.breed.as_deref()),
            p.gender.as_str().to_string(),
            p.formatted_age(today),
            p.medical_records_count.to_string(),
        ]);
    }
    table
}

pub fn appointments_table(appointments: &[Appointment], now: NaiveDateTime) -> Table {
    let mut table = Table::new(&["ID", "WHEN", "SERVICE", "VETERINARIAN", "PET", "PRICE", "STATUS"]);
    for a in appointments {
        table.push(vec![
            a.appointment_id.to_string(),
            a.formatted_date_time(),
            a.service_name.clone(),
            a.veterinarian_name.clone(),
            or_dash(a.pet_name.as_deref()),
            format_price(a.price_cents),
            a.status_at(now).label().to_string(),
        ]);
    }
    table
}

pub fn records_table(records: &[MedicalRecord]) -> Table {
    let mut table = Table::new(&["ID", "DATE", "VETERINARIAN", "SERVICE", "DIAGNOSIS", "RECOMMENDATIONS"]);
    for r in records {
        table.push(vec![
            r.record_id.to_string(),
            r.visit_date.format("%d.%m.%Y").to_string(),
            r.veterinarian_name.clone(),
            or_dash(r.service_name.as_deref()),
            or_dash(r.diagnosis.as_deref()),
            or_dash(r.recommendations.as_deref()),
        ]);
    }
    table
}

pub fn patients_table(patients: &[VetPatient]) -> Table {
    let mut table = Table::new(&["ID", "PET", "TYPE", "BREED", "AGE", "OWNER"]);
    for p in patients {
        table.push(vec![
            p.pet_id.to_string(),
            p.pet_name.clone(),
            p.type_name.clone(),
            or_dash(p.breed.as_deref()),
            p.age_years.map_or_else(|| "-".to_string(), |y| y.to_string()),
            p.owner_name.clone(),
        ]);
    }
    table
}

/// Schedule rendered day by day, each day as its own table.
pub fn schedule_text(days: &[DaySchedule]) -> String {
    let mut out = String::new();
    for day in days {
        out.push_str(&format!("{}\n", day.date.format("%A, %d.%m.%Y")));
        let mut table = Table::new(&["ID", "TIME", "CLIENT", "PHONE", "SERVICE", "PET", "STATUS"]);
        for e in &day.entries {
            table.push(vec![
                e.appointment_id.to_string(),
                e.appointment_time.format("%H:%M").to_string(),
                e.client_name.clone(),
                e.client_phone.clone(),
                e.service_name.clone(),
                or_dash(e.pet_name.as_deref()),
                e.status.as_str().to_string(),
            ]);
        }
        out.push_str(&table.render());
        out.push('\n');
    }
    out
}

/// Free slots listed under their day part headings.
pub fn slots_text(slots: &DaySlots) -> String {
    let sections = [
        ("Morning", &slots.morning),
        ("Afternoon", &slots.afternoon),
        ("Evening", &slots.evening),
    ];

    let mut out = String::new();
    for (title, section) in sections {
        if section.is_empty() {
            continue;
        }
        let labels: Vec<String> = section.iter().map(TimeSlot::label).collect();
        out.push_str(&format!("{}: {}\n", title, labels.join(" ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use vet_clinic_core::models::ServiceCategory;

    fn slot(h: u32, m: u32) -> TimeSlot {
        TimeSlot::new(NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    #[test]
    fn test_table_pads_columns() {
        let mut table = Table::new(&["ID", "NAME"]);
        table.push(vec!["1".to_string(), "Barsik".to_string()]);
        table.push(vec!["12".to_string(), "Rex".to_string()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "ID  NAME");
        assert_eq!(lines[1], "--  ------");
        assert_eq!(lines[2], "1   Barsik");
        assert_eq!(lines[3], "12  Rex");
    }

    #[test]
    fn test_services_table_formats_price() {
        let service = Service {
            service_id: 3,
            name: "Vaccination".to_string(),
            description: None,
            price_cents: 120_050,
            category: ServiceCategory::Prevention,
            image_url: None,
            duration_minutes: 20,
            is_popular: true,
        };

        let rendered = services_table(&[service]).render();
        assert!(rendered.contains("1200.50"));
        assert!(rendered.contains("yes"));
    }

    #[test]
    fn test_slots_text_skips_empty_parts() {
        let slots = DaySlots {
            morning: vec![slot(9, 0), slot(9, 30)],
            afternoon: Vec::new(),
            evening: vec![slot(18, 0)],
        };

        assert_eq!(slots_text(&slots), "Morning: 09:00 09:30\nEvening: 18:00\n");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("  ")), "-");
        assert_eq!(or_dash(Some("Persian")), "Persian");
    }
}
