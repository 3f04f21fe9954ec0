use anyhow::Result;
use flight_sales::{config::Config, db};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let config = Config::from_env()?;
    let db = db::connect(&config.db_path).await?;

    info!("Connected to SurrealDB");

    info!("=== Database Statistics ===");

    let order_total: Option<i64> = db
        .query("SELECT count() FROM orders GROUP ALL")
        .await?
        .take("count")?;
    info!("Orders: {:?}", order_total);

    let airport_total: Option<i64> = db
        .query("SELECT count() FROM airport GROUP ALL")
        .await?
        .take("count")?;
    info!("Airports: {:?}", airport_total);

    let route_total: Option<i64> = db
        .query("SELECT count() FROM connected_to GROUP ALL")
        .await?
        .take("count")?;
    info!("Routes: {:?}", route_total);

    // Top 5 origins by order volume
    let top_origins: Vec<serde_json::Value> = db
        .query(
            r#"
            SELECT origin, count() as orders
            FROM orders
            GROUP BY origin
            ORDER BY orders DESC
            LIMIT 5
            "#,
        )
        .await?
        .take(0)?;
    info!("Top 5 Origins: {:?}", top_origins);

    // Monthly sales volume
    let monthly: Vec<serde_json::Value> = db
        .query(
            r#"
            SELECT
                time::format(depart_date, "%Y-%m") as month,
                math::sum(total_price) as sales,
                count() as orders
            FROM orders
            GROUP BY month
            ORDER BY month ASC
            "#,
        )
        .await?
        .take(0)?;
    info!("Monthly Sales: {:?}", monthly);

    Ok(())
}
