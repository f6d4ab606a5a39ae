//! Meteo Database Seeder
//!
//! Fills a database with operators, their stations and a history of readings
//! so the API has something to serve during development.
//!
//! Usage:
//!   `cargo run --bin seed_database -- --operators 3 --stations 4 --readings 48`
//!
//! Every operator gets the password `<username>-pw`; every station API key is
//! printed in the summary.

use anyhow::{Context, Result, bail};
use chrono::{Duration, DurationRound, Utc};
use clap::{Arg, Command, value_parser};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use meteo_api::common::auth::{PlaintextVerifier, Principal, resolve_principal};
use meteo_api::operators::services::{RegisterOperatorOutcome, register_operator};
use meteo_api::readings::models::ReadingCreate;
use meteo_api::readings::services::{IngestOutcome, ingest_reading};
use meteo_api::stations::models::StationCreate;
use meteo_api::stations::services::{AddStationOutcome, add_station};
use migration::{Migrator, MigratorTrait};
use rand::Rng;
use sea_orm::{Database, DatabaseConnection};

/// Base coordinate the generated stations are scattered around
const BASE_LONGITUDE: f64 = 6.5668;
const BASE_LATITUDE: f64 = 46.5191;

#[derive(Debug, Default)]
struct SeedSummary {
    operators: Vec<String>,
    stations: Vec<(i32, String)>,
    readings: usize,
    skipped: usize,
}

/// Generate a random coordinate within approximately 5km of the base coordinate
fn generate_nearby_coordinate() -> (f64, f64) {
    let mut rng = rand::rng();

    let lat_per_km = 0.009;
    let lon_per_km = 0.009 / BASE_LATITUDE.to_radians().cos();

    let angle = rng.random::<f64>() * 2.0 * std::f64::consts::PI;
    let radius = 5.0 * rng.random::<f64>().sqrt();

    (
        BASE_LONGITUDE + lon_per_km * radius * angle.cos(),
        BASE_LATITUDE + lat_per_km * radius * angle.sin(),
    )
}

fn generate_reading(hours_ago: i64) -> ReadingCreate {
    let mut rng = rand::rng();
    let now = Utc::now()
        .duration_trunc(Duration::hours(1))
        .unwrap_or_else(|_| Utc::now());

    ReadingCreate {
        time: now - Duration::hours(hours_ago),
        battery_percentage: Some(rng.random_range(20.0..100.0)),
        temperature: Some(rng.random_range(-10.0..30.0)),
        humidity: Some(rng.random_range(30.0..100.0)),
        pressure: Some(rng.random_range(980.0..1040.0)),
        station_id: None,
    }
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} {msg}")?
            .progress_chars("##-"),
    );
    Ok(pb)
}

async fn seed_operators(db: &DatabaseConnection, count: u32, summary: &mut SeedSummary) -> Result<Vec<Principal>> {
    println!("{} Registering operators...", style("[1/3]").bold().dim());

    let pb = progress_bar(u64::from(count))?;
    let mut principals = Vec::new();
    for index in 1..=count {
        let username = format!("operator{index}");
        pb.set_message(format!("Registering: {username}"));

        match register_operator(db, &PlaintextVerifier, &username, &format!("{username}-pw")).await? {
            RegisterOperatorOutcome::Registered(_) => summary.operators.push(username.clone()),
            RegisterOperatorOutcome::AlreadyExists => summary.skipped += 1,
        }
        let principal = resolve_principal(db, &PlaintextVerifier, Some(&format!("Bearer {username}"))).await?;
        principals.push(principal);
        pb.inc(1);
    }

    pb.finish_with_message("Operators ready!");
    Ok(principals)
}

async fn seed_stations(
    db: &DatabaseConnection,
    operators: &[Principal],
    per_operator: u32,
    summary: &mut SeedSummary,
) -> Result<Vec<Principal>> {
    println!("{} Installing stations...", style("[2/3]").bold().dim());

    let total = u64::try_from(operators.len())? * u64::from(per_operator);
    let pb = progress_bar(total)?;
    let mut stations = Vec::new();
    for operator in operators {
        for _ in 0..per_operator {
            let (longitude, latitude) = generate_nearby_coordinate();
            let api_key = uuid::Uuid::new_v4().simple().to_string();
            let data = StationCreate {
                longitude,
                latitude,
                api_key: api_key.clone(),
            };

            match add_station(db, &PlaintextVerifier, operator, data).await? {
                AddStationOutcome::Created(station) => {
                    pb.set_message(format!("Station {}", station.station_id));
                    summary.stations.push((station.station_id, api_key.clone()));
                    stations.push(
                        resolve_principal(db, &PlaintextVerifier, Some(&format!("Bearer {api_key}"))).await?,
                    );
                }
                AddStationOutcome::AlreadyExists => summary.skipped += 1,
                AddStationOutcome::Unauthenticated => bail!("operator could not be authenticated"),
            }
            pb.inc(1);
        }
    }

    pb.finish_with_message("Stations installed!");
    Ok(stations)
}

async fn seed_readings(
    db: &DatabaseConnection,
    stations: &[Principal],
    per_station: u32,
    summary: &mut SeedSummary,
) -> Result<()> {
    println!("{} Recording readings...", style("[3/3]").bold().dim());

    let total = u64::try_from(stations.len())? * u64::from(per_station);
    let pb = progress_bar(total)?;
    for station in stations {
        for hours_ago in 0..i64::from(per_station) {
            match ingest_reading(db, station, generate_reading(hours_ago)).await? {
                IngestOutcome::Ingested(_) => summary.readings += 1,
                IngestOutcome::AlreadyExists => summary.skipped += 1,
                IngestOutcome::Invalid { field, message } => bail!("generated reading rejected: {field} {message}"),
                IngestOutcome::Unauthenticated => bail!("station could not be authenticated"),
            }
            pb.inc(1);
        }
    }

    pb.finish_with_message("Readings recorded!");
    Ok(())
}

fn display_summary(summary: &SeedSummary) {
    println!();
    println!("{}", style("Database Seeding Complete!").bold().green());
    println!("{}", style("═".repeat(50)).dim());

    for (name, count) in [
        ("Operators", summary.operators.len()),
        ("Stations", summary.stations.len()),
        ("Readings", summary.readings),
        ("Skipped", summary.skipped),
    ] {
        println!("{:.<20} {}", style(name).cyan(), style(count).bold().green());
    }

    if !summary.operators.is_empty() {
        println!();
        println!("{}", style("Operator logins").bold());
        for username in &summary.operators {
            println!("  {} {username} / {username}-pw", style("•").dim());
        }
    }
    if !summary.stations.is_empty() {
        println!();
        println!("{}", style("Station API keys").bold());
        for (station_id, api_key) in &summary.stations {
            println!("  {} station {station_id}: {api_key}", style("•").dim());
        }
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let matches = Command::new("Meteo Database Seeder")
        .version("1.0")
        .about("Seeds the meteo database with operators, stations and readings")
        .arg(
            Arg::new("db-url")
                .short('d')
                .long("db-url")
                .value_name("URL")
                .help("Database URL, defaults to DB_URL from the environment"),
        )
        .arg(
            Arg::new("operators")
                .long("operators")
                .value_parser(value_parser!(u32))
                .default_value("2")
                .help("Number of operators to register"),
        )
        .arg(
            Arg::new("stations")
                .long("stations")
                .value_parser(value_parser!(u32))
                .default_value("3")
                .help("Stations per operator"),
        )
        .arg(
            Arg::new("readings")
                .long("readings")
                .value_parser(value_parser!(u32))
                .default_value("24")
                .help("Hourly readings per station"),
        )
        .get_matches();

    dotenvy::dotenv().ok();
    let db_url = match matches.get_one::<String>("db-url") {
        Some(url) => url.clone(),
        None => std::env::var("DB_URL").context("pass --db-url or set DB_URL")?,
    };
    let operators = matches.get_one::<u32>("operators").copied().unwrap_or(2);
    let stations = matches.get_one::<u32>("stations").copied().unwrap_or(3);
    let readings = matches.get_one::<u32>("readings").copied().unwrap_or(24);

    println!("{}", style("Meteo Database Seeder v1.0").bold());
    println!("{}", style("━".repeat(40)).dim());

    let db = Database::connect(&db_url)
        .await
        .context("Failed to connect to database")?;
    Migrator::up(&db, None)
        .await
        .context("Failed to run database migrations")?;

    let mut summary = SeedSummary::default();
    let operator_principals = seed_operators(&db, operators, &mut summary).await?;
    let station_principals = seed_stations(&db, &operator_principals, stations, &mut summary).await?;
    seed_readings(&db, &station_principals, readings, &mut summary).await?;

    display_summary(&summary);
    Ok(())
}
