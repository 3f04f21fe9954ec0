//! Synthetic data generator for the flight-ticket dataset
//!
//! Creates a set of airports, directed routes between them, and randomized
//! orders over a date window, writing everything straight into SurrealDB.
//!
//! Usage:
//!   cargo run --release --bin seed -- [OPTIONS]
//!
//! Options:
//!   --airports <N>   Number of airports (default: 40)
//!   --routes <N>     Number of directed routes (default: 300)
//!   --orders <N>     Number of orders (default: 20000)
//!   --start/--end    Departure date window
//!   --seed <N>       Random seed for reproducibility (optional)
//!   --db <PATH>      Database path (default: data/flights.db)

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use flight_sales::db;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::HashSet;
use tracing::info;

/// Synthetic data generator for the flight-ticket sales demo
#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Generate synthetic airports, routes and orders")]
struct Args {
    /// Number of airports to create
    #[arg(long, default_value = "40")]
    airports: usize,

    /// Number of directed routes between airports
    #[arg(long, default_value = "300")]
    routes: usize,

    /// Number of orders to generate
    #[arg(long, default_value = "20000")]
    orders: usize,

    /// First departure date (YYYY-MM-DD)
    #[arg(long, default_value = "2023-03-10")]
    start: NaiveDate,

    /// Last departure date (YYYY-MM-DD)
    #[arg(long, default_value = "2023-04-09")]
    end: NaiveDate,

    /// Fraction of routes with no recorded flight time (0.0 - 1.0)
    #[arg(long, default_value = "0.15")]
    missing_flight_time_rate: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Database path
    #[arg(long, default_value = "data/flights.db")]
    db: String,
}

fn random_code(rng: &mut StdRng) -> String {
    (0..3)
        .map(|_| (b'A' + rng.gen_range(0..26)) as char)
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let args = Args::parse();
    if args.airports < 2 {
        anyhow::bail!("need at least 2 airports to build routes");
    }
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    info!("Connecting to SurrealDB at {}", args.db);
    let db = db::connect(&args.db).await?;

    info!("Initializing schema...");
    db::init_schema(&db).await?;

    // Airports: unique 3-letter codes
    let mut codes: HashSet<String> = HashSet::new();
    while codes.len() < args.airports {
        codes.insert(random_code(&mut rng));
    }
    let codes: Vec<String> = codes.into_iter().collect();

    info!("Inserting {} airports...", codes.len());
    for code in &codes {
        db.query("CREATE type::thing('airport', $code) SET code = $code")
            .bind(("code", code.clone()))
            .await?
            .check()?;
    }

    // Routes: unique directed pairs with distance and a sometimes-missing
    // flight time, so the optimized route query has something to filter out.
    let mut pairs: HashSet<(String, String)> = HashSet::new();
    let max_pairs = codes.len() * (codes.len() - 1);
    while pairs.len() < args.routes.min(max_pairs) {
        let origin = codes[rng.gen_range(0..codes.len())].clone();
        let destination = codes[rng.gen_range(0..codes.len())].clone();
        if origin != destination {
            pairs.insert((origin, destination));
        }
    }

    info!("Inserting {} routes...", pairs.len());
    let pairs: Vec<(String, String)> = pairs.into_iter().collect();
    for (origin, destination) in &pairs {
        let distance_km = rng.gen_range(200.0_f64..8000.0).round();
        let flight_time_hr = if rng.gen_bool(args.missing_flight_time_rate) {
            None
        } else {
            Some(((distance_km / 800.0 + rng.gen_range(0.2..0.8)) * 10.0).round() / 10.0)
        };
        db.query(
            r#"
            RELATE (type::thing('airport', $origin))->connected_to->(type::thing('airport', $destination))
            SET distance_km = $distance_km, flight_time_hr = $flight_time_hr
            "#,
        )
        .bind(("origin", origin.clone()))
        .bind(("destination", destination.clone()))
        .bind(("distance_km", distance_km))
        .bind(("flight_time_hr", flight_time_hr))
        .await?
        .check()?;
    }

    // Orders: random route, random day in the window, random price
    let window_days = (args.end - args.start).num_days().max(0);
    info!("Inserting {} orders...", args.orders);
    for i in 0..args.orders {
        let (origin, destination) = &pairs[rng.gen_range(0..pairs.len())];
        let date = args.start + chrono::Duration::days(rng.gen_range(0..=window_days));
        let hour = rng.gen_range(5..22);
        let price = rng.gen_range(30.0_f64..500.0).round();

        db.query(
            r#"
            CREATE orders CONTENT {
                order_id: $order_id,
                passenger: $passenger,
                origin: $origin,
                destination: $destination,
                depart_date: <datetime>$depart_date,
                total_price: $total_price
            }
            "#,
        )
        .bind(("order_id", format!("ORD-{:06}", i)))
        .bind(("passenger", format!("passenger-{:05}", rng.gen_range(0..10000))))
        .bind(("origin", origin.clone()))
        .bind(("destination", destination.clone()))
        .bind(("depart_date", format!("{date}T{hour:02}:00:00Z")))
        .bind(("total_price", price))
        .await?
        .check()?;

        if (i + 1) % 5000 == 0 {
            info!("Inserted {}/{} orders...", i + 1, args.orders);
        }
    }

    let order_total: Option<i64> = db
        .query("SELECT count() FROM orders GROUP ALL")
        .await?
        .take("count")?;
    info!(
        "Seed complete: {} airports, {} routes, {:?} orders",
        codes.len(),
        pairs.len(),
        order_total
    );

    Ok(())
}
