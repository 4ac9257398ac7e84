//! vet-clinic command-line front end.
//!
//! Operator access to the clinic database: accounts, catalog, pets,
//! booking, schedules and statistics. Logs go to stderr so command
//! output on stdout can be piped.

mod output;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vet_clinic_core::auth::{authenticate, register_client, Registration};
use vet_clinic_core::models::{
    filter_appointments, search_schedule, AppointmentFilter, BookingRequest, Gender, NewEmployee,
    NewPet, NewService, Role, ServiceCategory, ServiceQuery, ServiceSort,
};
use vet_clinic_core::scheduling::{group_by_day_part, parse_slot_time};
use vet_clinic_core::{Booking, ClinicConfig, Database, SlotPlanner, StatisticsReporter};

#[derive(Parser, Debug)]
#[command(name = "vet-clinic")]
#[command(about = "Veterinary clinic booking and records")]
#[command(version)]
struct Cli {
    /// Configuration file (default: config/vet_clinic.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overrides the configured path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database and seed reference data
    Init,

    /// Check credentials and print the session
    Login {
        /// Login, email or phone
        #[arg(long)]
        login: String,
        #[arg(long)]
        password: String,
    },

    /// Register a new client
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        image_url: Option<String>,
    },

    /// Browse the service catalog
    Services {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "")]
        search: String,
        /// popularity, price_asc, price_desc or name
        #[arg(long)]
        sort: Option<String>,
    },

    /// List veterinarians
    Vets,

    /// Free booking slots on a date
    Slots {
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        /// Only consider this veterinarian's bookings
        #[arg(long)]
        vet: Option<i64>,
    },

    /// List a client's pets
    Pets {
        #[arg(long)]
        client: i64,
    },

    /// Add a pet to a client
    AddPet {
        #[arg(long)]
        client: i64,
        /// Animal type id
        #[arg(long = "type")]
        type_id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        breed: Option<String>,
        /// male, female or unknown
        #[arg(long, default_value = "unknown")]
        gender: String,
        #[arg(long, value_parser = parse_date)]
        birth_date: Option<NaiveDate>,
        #[arg(long)]
        color: Option<String>,
    },

    /// Book an appointment
    Book {
        #[arg(long)]
        client: i64,
        #[arg(long)]
        service: i64,
        #[arg(long)]
        vet: i64,
        #[arg(long)]
        pet: i64,
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        /// HH:MM
        #[arg(long, value_parser = parse_time)]
        time: NaiveTime,
        #[arg(long)]
        complaints: Option<String>,
        #[arg(long)]
        info: Option<String>,
    },

    /// A client's appointments
    Appointments {
        #[arg(long)]
        client: i64,
        /// all, upcoming or past
        #[arg(long, default_value = "all")]
        filter: String,
    },

    /// Cancel an appointment (as its client, or as staff when no client is given)
    Cancel {
        #[arg(long)]
        appointment: i64,
        #[arg(long)]
        client: Option<i64>,
    },

    /// A pet's medical records
    Records {
        #[arg(long)]
        pet: i64,
    },

    /// A veterinarian's schedule
    Schedule {
        #[arg(long)]
        vet: i64,
        /// First day to show
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long)]
        search: Option<String>,
    },

    /// Pets a veterinarian has seen
    Patients {
        #[arg(long)]
        vet: i64,
    },

    /// Statistics report for a veterinarian
    Stats {
        #[arg(long)]
        vet: i64,
        #[arg(long, value_enum, default_value_t = StatsFormat::Json)]
        format: StatsFormat,
    },

    /// Add a service to the catalog
    AddService {
        #[arg(long)]
        name: String,
        /// Price in minor units
        #[arg(long)]
        price_cents: i64,
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = 30)]
        duration: u32,
        #[arg(long)]
        popular: bool,
    },

    /// Create an employee account
    AddEmployee {
        #[arg(long)]
        name: String,
        /// veterinarian or administrator
        #[arg(long)]
        role: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        login: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        specialty: Option<String>,
        #[arg(long, default_value_t = 0)]
        experience: u32,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum StatsFormat {
    Json,
    Csv,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| format!("expected YYYY-MM-DD, got {}", s))
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    parse_slot_time(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vet_clinic_core=info,vet_clinic=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::debug!(path = %config.database.path.display(), "opening database");

    let db = Database::open(&config.database.path)
        .with_context(|| format!("failed to open {}", config.database.path.display()))?;

    run(&cli, &db, &config)
}

fn load_config(cli: &Cli) -> Result<ClinicConfig> {
    let mut config = match &cli.config {
        Some(path) => ClinicConfig::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ClinicConfig::load().context("failed to load config")?,
    };
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    Ok(config)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table(table: output::Table, empty_message: &str) {
    if table.is_empty() {
        println!("{}", empty_message);
    } else {
        print!("{}", table.render());
    }
}

fn run(cli: &Cli, db: &Database, config: &ClinicConfig) -> Result<()> {
    let today = Local::now().date_naive();

    match &cli.command {
        Commands::Init => {
            println!("Database ready at {}", config.database.path.display());
        }

        Commands::Login { login, password } => {
            let session = authenticate(db, login, password)?;
            if cli.json {
                print_json(&session)?;
            } else {
                println!(
                    "Logged in as {} #{}",
                    session.role().as_str(),
                    session.account_id()
                );
            }
        }

        Commands::Register {
            name,
            phone,
            password,
            image_url,
        } => {
            let registration = Registration {
                full_name: name.clone(),
                phone: phone.clone(),
                password: password.clone(),
                confirm_password: password.clone(),
                image_url: image_url.clone(),
            };
            let client_id = register_client(db, &registration)?;
            println!("Registered client #{}", client_id);
        }

        Commands::Services {
            category,
            search,
            sort,
        } => {
            let category = category
                .as_deref()
                .map(|c| ServiceCategory::parse(c).ok_or_else(|| anyhow!("unknown category: {}", c)))
                .transpose()?;
            let sort = sort
                .as_deref()
                .map(|s| ServiceSort::parse(s).ok_or_else(|| anyhow!("unknown sort: {}", s)))
                .transpose()?
                .unwrap_or_default();
            let query = ServiceQuery {
                category,
                search: search.clone(),
                sort,
            };
            let services = query.apply(&db.list_services()?);
            if cli.json {
                print_json(&services)?;
            } else {
                print_table(output::services_table(&services), "No services match");
            }
        }

        Commands::Vets => {
            let vets = db.list_veterinarians()?;
            if cli.json {
                print_json(&vets)?;
            } else {
                print_table(output::veterinarians_table(&vets), "No veterinarians");
            }
        }

        Commands::Slots { date, vet } => {
            let planner = SlotPlanner::new(db, &config.schedule);
            let slots = match vet {
                Some(vet) => planner.slots_for_vet(*vet, *date, today)?,
                None => planner.slots_for(*date, today)?,
            };
            let slots = group_by_day_part(&slots);
            if cli.json {
                print_json(&slots)?;
            } else if slots.is_empty() {
                println!("No free slots on {}", date.format("%d.%m.%Y"));
            } else {
                print!("{}", output::slots_text(&slots));
            }
        }

        Commands::Pets { client } => {
            let pets = db.list_pets_for_client(*client)?;
            if cli.json {
                print_json(&pets)?;
            } else {
                print_table(output::pets_table(&pets, today), "No pets yet");
            }
        }

        Commands::AddPet {
            client,
            type_id,
            name,
            breed,
            gender,
            birth_date,
            color,
        } => {
            let mut pet = NewPet::new(*client, *type_id, name.clone());
            pet.breed = breed.clone();
            pet.gender = Gender::parse(gender);
            pet.birth_date = *birth_date;
            pet.color = color.clone();
            let stored = db.insert_pet(&pet)?;
            if cli.json {
                print_json(&stored)?;
            } else {
                println!("Added {} #{}", stored.name, stored.pet_id);
            }
        }

        Commands::Book {
            client,
            service,
            vet,
            pet,
            date,
            time,
            complaints,
            info,
        } => {
            let request = BookingRequest {
                client_id: *client,
                service_id: *service,
                veterinarian_id: *vet,
                pet_id: *pet,
                date: *date,
                time: *time,
                complaints: complaints.clone(),
                additional_info: info.clone(),
            };
            let confirmation = Booking::new(db, &config.schedule).book(&request, today)?;
            if cli.json {
                print_json(&confirmation)?;
            } else {
                println!(
                    "Booked #{}: {} with {} for {} on {} at {}",
                    confirmation.appointment_id,
                    confirmation.service_name,
                    confirmation.veterinarian_name,
                    confirmation.pet_name,
                    confirmation.date.format("%d.%m.%Y"),
                    confirmation.time.format("%H:%M"),
                );
            }
        }

        Commands::Appointments { client, filter } => {
            let filter = AppointmentFilter::parse(filter)
                .ok_or_else(|| anyhow!("unknown filter: {}", filter))?;
            let now = Local::now().naive_local();
            let appointments = filter_appointments(&db.list_client_appointments(*client)?, filter, now);
            if cli.json {
                print_json(&appointments)?;
            } else {
                print_table(
                    output::appointments_table(&appointments, now),
                    filter.empty_message(),
                );
            }
        }

        Commands::Cancel {
            appointment,
            client,
        } => {
            match client {
                Some(client) => db.cancel_client_appointment(
                    *appointment,
                    *client,
                    Local::now().naive_local(),
                )?,
                None => db.cancel_appointment_by_staff(*appointment)?,
            }
            println!("Cancelled appointment #{}", appointment);
        }

        Commands::Records { pet } => {
            let records = db.list_records_for_pet(*pet)?;
            if cli.json {
                print_json(&records)?;
            } else {
                print_table(output::records_table(&records), "No medical records");
            }
        }

        Commands::Schedule { vet, from, search } => {
            let days = db.list_vet_schedule(*vet, *from)?;
            let days = match search {
                Some(query) => search_schedule(&days, query),
                None => days,
            };
            if cli.json {
                print_json(&days)?;
            } else if days.is_empty() {
                println!("No appointments scheduled");
            } else {
                print!("{}", output::schedule_text(&days));
            }
        }

        Commands::Patients { vet } => {
            let patients = db.vet_patients(*vet, today)?;
            if cli.json {
                print_json(&patients)?;
            } else {
                print_table(output::patients_table(&patients), "No patients yet");
            }
        }

        Commands::Stats { vet, format } => {
            let report =
                StatisticsReporter::new(db).build(*vet, today, config.statistics.window_months)?;
            match format {
                StatsFormat::Json => println!("{}", report.to_json()?),
                StatsFormat::Csv => print!("{}", report.to_csv()),
            }
        }

        Commands::AddService {
            name,
            price_cents,
            category,
            description,
            duration,
            popular,
        } => {
            let category = ServiceCategory::parse(category)
                .ok_or_else(|| anyhow!("unknown category: {}", category))?;
            let mut service = NewService::new(name.clone(), *price_cents, category);
            service.description = description.clone();
            service.duration_minutes = *duration;
            service.is_popular = *popular;
            let service_id = db.insert_service(&service)?;
            println!("Added service #{}", service_id);
        }

        Commands::AddEmployee {
            name,
            role,
            password,
            login,
            email,
            position,
            specialty,
            experience,
        } => {
            let role = Role::parse(role).ok_or_else(|| anyhow!("unknown role: {}", role))?;
            if role == Role::Client {
                bail!("clients register with the `register` command");
            }
            let mut employee = NewEmployee::new(name.clone(), role, password.clone());
            employee.login = login.clone();
            employee.email = email.clone();
            employee.position = position.clone();
            employee.specialty = specialty.clone();
            employee.experience_years = *experience;
            let employee_id = db.insert_employee(&employee)?;
            println!("Added {} #{}", role.as_str(), employee_id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "vet-clinic",
            "slots",
            "--date",
            "2024-06-20",
            "--db",
            "clinic.db",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.db, Some(PathBuf::from("clinic.db")));
        assert!(cli.json);
        match cli.command {
            Commands::Slots { date, vet } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
                assert_eq!(vet, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_book_parses_time() {
        let cli = Cli::try_parse_from([
            "vet-clinic", "book", "--client", "1", "--service", "2", "--vet", "3", "--pet", "4",
            "--date", "2024-06-20", "--time", "09:30",
        ])
        .unwrap();

        match cli.command {
            Commands::Book { time, .. } => {
                assert_eq!(time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_rejected() {
        let result = Cli::try_parse_from(["vet-clinic", "slots", "--date", "20.06.2024"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_stats_format_defaults_to_json() {
        let cli = Cli::try_parse_from(["vet-clinic", "stats", "--vet", "2"]).unwrap();
        match cli.command {
            Commands::Stats { format, .. } => assert_eq!(format, StatsFormat::Json),
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["vet-clinic", "stats", "--vet", "2", "--format", "csv"]).unwrap();
        match cli.command {
            Commands::Stats { format, .. } => assert_eq!(format, StatsFormat::Csv),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_against_in_memory_database() {
        let cli = Cli::try_parse_from(["vet-clinic", "vets"]).unwrap();
        let db = Database::open_in_memory().unwrap();
        run(&cli, &db, &ClinicConfig::default()).unwrap();
    }

    #[test]
    fn test_add_employee_rejects_client_role() {
        let cli = Cli::try_parse_from([
            "vet-clinic", "add-employee", "--name", "X", "--role", "client", "--password", "secret1",
        ])
        .unwrap();
        let db = Database::open_in_memory().unwrap();
        assert!(run(&cli, &db, &ClinicConfig::default()).is_err());
    }
}
