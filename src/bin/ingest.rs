use anyhow::Result;
use csv::ReaderBuilder;
use flight_sales::{db, models::CsvOrder};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let csv_path = PathBuf::from(
        std::env::args()
            .nth(1)
            .unwrap_or_else(|| "raw-data/orders.csv".to_string()),
    );
    let db_path =
        std::env::var("FLIGHTS_DB_PATH").unwrap_or_else(|_| "data/flights.db".to_string());

    info!("Connecting to SurrealDB at {}", db_path);
    let db = db::connect(&db_path).await?;

    info!("Initializing schema...");
    db::init_schema(&db).await?;

    info!("Reading CSV from {:?}", csv_path);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(&csv_path)?;

    let records: Vec<CsvOrder> = reader
        .deserialize()
        .filter_map(|r| r.ok())
        .collect();

    info!("Parsed {} records from CSV", records.len());

    // Airports are implied by the order rows; routes come from the seed or
    // a separate route file, so only register the airport codes here.
    let mut airports: HashSet<String> = HashSet::new();
    for record in &records {
        airports.insert(record.origin.clone());
        airports.insert(record.destination.clone());
    }

    info!("Inserting {} airports...", airports.len());
    for code in &airports {
        db.query("UPSERT type::thing('airport', $code) SET code = $code")
            .bind(("code", code.clone()))
            .await?
            .check()?;
    }

    let mut order_count = 0;
    let mut error_count = 0;

    info!("Inserting orders...");
    for (i, record) in records.iter().enumerate() {
        match record.to_order() {
            Ok(order) => {
                let result = db
                    .query(
                        r#"
                        CREATE orders CONTENT {
                            order_id: $order_id,
                            passenger: $passenger,
                            origin: $origin,
                            destination: $destination,
                            depart_date: <datetime>$depart_date,
                            total_price: $total_price
                        };
                        "#,
                    )
                    .bind(("order_id", order.order_id.clone()))
                    .bind(("passenger", order.passenger.clone()))
                    .bind(("origin", order.origin.clone()))
                    .bind(("destination", order.destination.clone()))
                    .bind((
                        "depart_date",
                        order.depart_date.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
                    ))
                    .bind(("total_price", order.total_price))
                    .await;

                match result {
                    Ok(mut response) => match response.check() {
                        Ok(_) => order_count += 1,
                        Err(e) => {
                            if error_count < 5 {
                                warn!("Query check failed for record {}: {}", i, e);
                            }
                            error_count += 1;
                        }
                    },
                    Err(e) => {
                        if error_count < 5 {
                            warn!("Query error for record {}: {}", i, e);
                        }
                        error_count += 1;
                    }
                }
            }
            Err(e) => {
                if error_count < 5 {
                    warn!("Failed to parse record {}: {}", i, e);
                }
                error_count += 1;
            }
        }

        if (i + 1) % 5000 == 0 {
            info!("Processed {}/{} records...", i + 1, records.len());
        }
    }

    info!(
        "Ingestion complete: {} orders, {} errors",
        order_count, error_count
    );

    let order_total: Option<i64> = db
        .query("SELECT count() FROM orders GROUP ALL")
        .await?
        .take("count")?;
    let airport_total: Option<i64> = db
        .query("SELECT count() FROM airport GROUP ALL")
        .await?
        .take("count")?;

    info!("Database totals:");
    info!("  Orders: {:?}", order_total);
    info!("  Airports: {:?}", airport_total);

    Ok(())
}
